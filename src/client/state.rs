//! View state for the terminal client, updated only from server responses.

use crate::domain::todo::{Todo, TodoId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Loaded,
    /// The list fetch failed; the message is shown with a retry prompt.
    Failed(String),
}

/// The client's advisory copy of the list, valid until the next fetch or mutation response.
#[derive(Debug, Clone)]
pub struct Board {
    pub todos: Vec<Todo>,
    pub load: LoadState,
}

impl Default for Board {
    fn default() -> Self { Self { todos: Vec::new(), load: LoadState::Loading } }
}

impl Board {
    pub fn begin_fetch(&mut self) { self.load = LoadState::Loading; }

    pub fn fetch_succeeded(&mut self, todos: Vec<Todo>) {
        self.todos = todos;
        self.load = LoadState::Loaded;
    }

    /// Keeps whatever was shown before so the list does not blank out on a failed refresh.
    pub fn fetch_failed(&mut self, message: impl Into<String>) {
        self.load = LoadState::Failed(message.into());
    }

    pub fn created(&mut self, todo: Todo) { self.todos.insert(0, todo); }

    pub fn updated(&mut self, todo: Todo) {
        if let Some(slot) = self.todos.iter_mut().find(|t| t.id == todo.id) {
            *slot = todo;
        }
    }

    pub fn deleted(&mut self, id: TodoId) { self.todos.retain(|t| t.id != id); }

    pub fn is_loading(&self) -> bool { self.load == LoadState::Loading }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Field { #[default] Title, Description }

/// In-progress form input for creating or editing a todo.
#[derive(Debug, Clone, Default)]
pub struct Draft {
    pub title: String,
    pub description: String,
    pub field: Field,
    pub error: Option<String>,
}

impl Draft {
    pub fn for_edit(todo: &Todo) -> Self {
        Self { title: todo.title.clone(), description: todo.description.clone().unwrap_or_default(), ..Self::default() }
    }

    pub fn push(&mut self, c: char) { self.active_mut().push(c); }

    pub fn pop(&mut self) { self.active_mut().pop(); }

    pub fn switch_field(&mut self) {
        self.field = match self.field { Field::Title => Field::Description, Field::Description => Field::Title };
    }

    pub fn active(&self) -> &str {
        match self.field { Field::Title => &self.title, Field::Description => &self.description }
    }

    /// Checks the draft locally before a request is sent, recording the message on failure.
    pub fn validate(&mut self) -> bool {
        if self.title.trim().is_empty() {
            self.error = Some("Title is required".to_string());
            return false;
        }
        self.error = None;
        true
    }

    /// Records a failed submission; the typed input is kept for another attempt.
    pub fn fail(&mut self, message: impl Into<String>) { self.error = Some(message.into()); }

    pub fn description(&self) -> Option<&str> {
        Some(self.description.trim()).filter(|d| !d.is_empty())
    }

    fn active_mut(&mut self) -> &mut String {
        match self.field { Field::Title => &mut self.title, Field::Description => &mut self.description }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::todo::timestamp;

    fn todo(id: i64, title: &str) -> Todo {
        let now = timestamp();
        Todo { id: TodoId(id), title: title.into(), description: None, completed: false, created_at: now, updated_at: now }
    }

    #[test]
    fn fetch_transitions() {
        let mut board = Board::default();
        assert!(board.is_loading());
        board.fetch_succeeded(vec![todo(1, "a")]);
        assert_eq!(board.load, LoadState::Loaded);
        board.begin_fetch();
        board.fetch_failed("Failed to fetch todos");
        assert_eq!(board.load, LoadState::Failed("Failed to fetch todos".into()));
        assert_eq!(board.todos.len(), 1);
    }

    #[test]
    fn merges_mutation_responses() {
        let mut board = Board::default();
        board.fetch_succeeded(vec![todo(2, "b"), todo(1, "a")]);

        board.created(todo(3, "c"));
        assert_eq!(board.todos[0].id, TodoId(3));

        let mut done = todo(1, "a");
        done.completed = true;
        board.updated(done);
        assert!(board.todos.iter().find(|t| t.id == TodoId(1)).unwrap().completed);

        board.deleted(TodoId(2));
        let ids: Vec<_> = board.todos.iter().map(|t| t.id.0).collect();
        assert_eq!(ids, [3, 1]);
    }

    #[test]
    fn draft_requires_title_and_keeps_input_on_failure() {
        let mut draft = Draft::default();
        draft.push(' ');
        assert!(!draft.validate());
        assert_eq!(draft.error.as_deref(), Some("Title is required"));

        draft.pop();
        for c in "Walk dog".chars() { draft.push(c); }
        draft.switch_field();
        draft.push('x');
        assert!(draft.validate());
        assert_eq!(draft.error, None);

        draft.fail("Failed to create todo");
        assert_eq!(draft.title, "Walk dog");
        assert_eq!(draft.description(), Some("x"));
    }

    #[test]
    fn blank_description_is_none() {
        let draft = Draft { title: "t".into(), description: "  ".into(), ..Draft::default() };
        assert_eq!(draft.description(), None);
    }
}
