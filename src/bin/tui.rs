use std::time::Duration;

use anyhow::Result;
use crossterm::{event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind}, execute, terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen}};
use ratatui::{backend::CrosstermBackend, Terminal, Frame, widgets::{Block, Borders, List, ListItem, Paragraph, ListState, Wrap}, layout::{Layout, Constraint, Direction, Rect}, style::{Style, Modifier, Color}};

use todo_api::client::api::{TodoChanges, TodoClient};
use todo_api::client::state::{Board, Draft, Field, LoadState};
use todo_api::config::api_url_from_env;
use todo_api::domain::todo::{Todo, TodoId};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let base_url = api_url_from_env();
    let client = TodoClient::new(base_url.clone());

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, App::new(client, base_url)).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    res
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode { View, Create, Edit(TodoId), ConfirmDelete(TodoId) }

struct App {
    client: TodoClient,
    base_url: String,
    board: Board,
    selected: usize,
    list_state: ListState,
    mode: Mode,
    draft: Draft,
    // Last mutation failure from view mode.
    notice: Option<String>,
    fetch_pending: bool,
}

impl App {
    fn new(client: TodoClient, base_url: String) -> Self {
        Self { client, base_url, board: Board::default(), selected: 0, list_state: ListState::default(), mode: Mode::View, draft: Draft::default(), notice: None, fetch_pending: true }
    }

    fn refresh(&mut self) {
        self.board.begin_fetch();
        self.fetch_pending = true;
    }

    async fn fetch(&mut self) {
        self.fetch_pending = false;
        match self.client.list().await {
            Ok(todos) => self.board.fetch_succeeded(todos),
            Err(e) => self.board.fetch_failed(e.to_string()),
        }
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let len = self.board.todos.len();
        if len == 0 { self.selected = 0; self.list_state.select(None); }
        else { if self.selected >= len { self.selected = len - 1; } self.list_state.select(Some(self.selected)); }
    }

    fn selected_todo(&self) -> Option<&Todo> { self.board.todos.get(self.selected) }

    async fn toggle_selected(&mut self) {
        let Some(todo) = self.selected_todo() else { return };
        let (id, completed) = (todo.id, todo.completed);
        let changes = TodoChanges { completed: Some(!completed), ..TodoChanges::default() };
        match self.client.update(id, &changes).await {
            Ok(todo) => { self.board.updated(todo); self.notice = None; }
            Err(e) => self.notice = Some(e.to_string()),
        }
    }

    async fn submit_draft(&mut self) {
        if !self.draft.validate() { return; }
        let title = self.draft.title.trim().to_string();
        let description = self.draft.description().map(str::to_string);
        let result = match self.mode {
            Mode::Create => self.client.create(&title, description.as_deref()).await,
            Mode::Edit(id) => {
                let changes = TodoChanges { title: Some(title), description: Some(description), completed: None };
                self.client.update(id, &changes).await
            }
            Mode::View | Mode::ConfirmDelete(_) => return,
        };
        match result {
            Ok(todo) => {
                if self.mode == Mode::Create { self.board.created(todo); self.selected = 0; }
                else { self.board.updated(todo); }
                self.mode = Mode::View;
                self.draft = Draft::default();
                self.clamp_selection();
            }
            Err(e) => self.draft.fail(e.to_string()),
        }
    }

    async fn delete(&mut self, id: TodoId) {
        match self.client.delete(id).await {
            Ok(()) => { self.board.deleted(id); self.notice = None; }
            Err(e) => self.notice = Some(e.to_string()),
        }
        self.mode = Mode::View;
        self.clamp_selection();
    }
}

async fn run_app(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>, mut app: App) -> Result<()> {
    let tick_rate = Duration::from_millis(200);

    loop {
        terminal.draw(|f| draw(f, &mut app))?;

        if app.fetch_pending {
            app.fetch().await;
            continue;
        }

        if !event::poll(tick_rate)? { continue; }
        let Event::Key(key) = event::read()? else { continue };
        // Only act on key presses; ignore repeats and releases to prevent duplicate input
        if key.kind != KeyEventKind::Press { continue; }

        match app.mode {
            Mode::View => match key.code {
                KeyCode::Char('q') => break,
                KeyCode::Up => { if app.selected > 0 { app.selected -= 1; } }
                KeyCode::Down => { if app.selected + 1 < app.board.todos.len() { app.selected += 1; } }
                KeyCode::Enter | KeyCode::Char(' ') => app.toggle_selected().await,
                KeyCode::Char('r') => app.refresh(),
                KeyCode::Char('n') => { app.mode = Mode::Create; app.draft = Draft::default(); }
                KeyCode::Char('e') => {
                    if let Some(todo) = app.selected_todo().cloned() {
                        app.draft = Draft::for_edit(&todo);
                        app.mode = Mode::Edit(todo.id);
                    }
                }
                KeyCode::Char('d') => {
                    if let Some(id) = app.selected_todo().map(|t| t.id) { app.mode = Mode::ConfirmDelete(id); }
                }
                _ => {}
            },
            Mode::ConfirmDelete(id) => match key.code {
                KeyCode::Char('y') => app.delete(id).await,
                _ => app.mode = Mode::View,
            },
            Mode::Create | Mode::Edit(_) => match key.code {
                KeyCode::Esc => { app.mode = Mode::View; app.draft = Draft::default(); }
                KeyCode::Enter => app.submit_draft().await,
                KeyCode::Backspace => app.draft.pop(),
                KeyCode::Tab => app.draft.switch_field(),
                KeyCode::Char(c) => app.draft.push(c),
                _ => {}
            },
        }
        app.clamp_selection();
    }
    Ok(())
}

fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1), Constraint::Length(4)])
        .split(f.size());

    let header = Paragraph::new("Todos (Space/Enter: toggle, n: new, e: edit, d: delete, r: refresh, q: quit)  |  New/Edit: Tab switches field, Enter saves, Esc cancels")
        .block(Block::default().borders(Borders::ALL).title("todo-tui"));
    f.render_widget(header, chunks[0]);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);

    draw_list(f, app, middle[0]);

    let detail = match app.selected_todo() {
        Some(t) => format!(
            "Title:\n{}\n\nStatus: {}\n\nDescription:\n{}\n\nCreated: {}\nUpdated: {}",
            t.title,
            if t.completed { "Done" } else { "Pending" },
            t.description.as_deref().unwrap_or("(no description)"),
            t.created_at.format("%Y-%m-%d %H:%M:%S"),
            t.updated_at.format("%Y-%m-%d %H:%M:%S"),
        ),
        None => String::new(),
    };
    let details = Paragraph::new(detail)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("details"));
    f.render_widget(details, middle[1]);

    draw_footer(f, app, chunks[2]);
}

fn draw_list(f: &mut Frame, app: &mut App, area: Rect) {
    let refreshing = if app.board.is_loading() { " (refreshing)" } else { "" };
    let block = Block::default().borders(Borders::ALL).title(format!("items [{}]{refreshing}", app.board.todos.len()));
    let message = match &app.board.load {
        _ if app.board.is_loading() && app.board.todos.is_empty() => Some(("Loading todos...".to_string(), Color::Gray)),
        LoadState::Failed(error) => Some((format!("{error}\n\nPress r to try again."), Color::Red)),
        _ if app.board.todos.is_empty() => Some(("No todos yet. Press n to create your first todo!".to_string(), Color::Gray)),
        _ => None,
    };
    if let Some((text, color)) = message {
        f.render_widget(Paragraph::new(text).style(Style::default().fg(color)).wrap(Wrap { trim: false }).block(block), area);
        return;
    }

    let items: Vec<ListItem> = app.board.todos.iter().map(|t| {
        let mark = if t.completed { "[x]" } else { "[ ]" };
        let style = if t.completed { Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT) } else { Style::default() };
        ListItem::new(format!("{} {}", mark, t.title)).style(style)
    }).collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD | Modifier::REVERSED))
        .highlight_symbol(">> ");
    f.render_stateful_widget(list, area, &mut app.list_state);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let (title, text, error) = match app.mode {
        Mode::View => ("info", format!("API={}", app.base_url), app.notice.clone()),
        Mode::ConfirmDelete(_) => ("delete", "Are you sure you want to delete this todo? (y/n)".to_string(), None),
        Mode::Create | Mode::Edit(_) => {
            let label = match app.draft.field { Field::Title => "Title", Field::Description => "Desc" };
            let title = if app.mode == Mode::Create { "create" } else { "edit" };
            (title, format!("{}: {}_", label, app.draft.active()), app.draft.error.clone())
        }
    };
    let mut lines = text;
    if let Some(error) = error { lines.push('\n'); lines.push_str(&error); }
    let style = if app.notice.is_some() || app.draft.error.is_some() { Style::default().fg(Color::Red) } else { Style::default() };
    let footer = Paragraph::new(lines)
        .style(style)
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(footer, area);
}
