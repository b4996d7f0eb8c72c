mod handler;
pub mod model;

pub use handler::{get_all_users, get_dashboard_stats, update_user_role};
