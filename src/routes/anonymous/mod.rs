mod handler;
mod model;

pub use handler::get_anonymous_token;
