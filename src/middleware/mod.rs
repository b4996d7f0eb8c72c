mod auth;
mod error_handler;
mod session;

pub use auth::{AuthUser, require_admin, require_faculty_or_admin};
pub use error_handler::log_errors;
pub use session::session_middleware;
