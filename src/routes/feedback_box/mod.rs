mod handler;
pub mod model;

pub use handler::{
    create_feedback_box, delete_feedback_box, get_all_feedback_boxes, get_feedback_box,
    update_feedback_box,
};
