pub mod admin;
pub mod anonymous;
pub mod auth;
pub mod feedback;
pub mod feedback_box;
