mod handler;
pub mod model;

pub use handler::{approve_feedback, delete_feedback, get_feedback_by_box, submit_feedback};
