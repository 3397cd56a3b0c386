use std::net::SocketAddr;

use todo_api::application::todo_service::TodoServiceImpl;
use todo_api::config::{ServerConfig, StoreKind};
use todo_api::domain::repository::TodoRepository;
use todo_api::http::routing;
use todo_api::http::routes::todos;
use todo_api::infrastructure::{memory_repo::InMemoryTodoRepository, sqlite_repo::SqliteTodoRepository};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = ServerConfig::from_env()?;
    match config.store {
        StoreKind::Sqlite => {
            let repo = SqliteTodoRepository::connect(&config.database_url, config.max_connections).await?;
            tracing::info!(database_url = %config.database_url, "using sqlite store");
            serve(repo, config.addr).await
        }
        StoreKind::Memory => {
            tracing::warn!("using in-memory store, todos are lost on exit");
            serve(InMemoryTodoRepository::default(), config.addr).await
        }
    }
}

async fn serve<R: TodoRepository + Clone>(repo: R, addr: SocketAddr) -> anyhow::Result<()> {
    repo.init().await?;
    let service = TodoServiceImpl::new(repo);
    let router = routing::app(todos::router(todos::AppState { service }));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal::ctrl_c;
    let _ = ctrl_c().await;
    tracing::info!("shutdown");
}
