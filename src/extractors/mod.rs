pub mod document;
pub mod post_id;
