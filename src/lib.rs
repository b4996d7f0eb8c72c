use config::Config;
use session::SessionStore;
use sqlx::PgPool;

pub mod config;
pub mod error;
pub mod identity;
pub mod middleware;
pub mod session;

pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub sessions: SessionStore,
}
