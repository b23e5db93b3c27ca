mod review;

pub use review::{CommentRow, ReviewRow};
