//! Client side mirror of the post collection.

mod action;
mod reducer;

pub use action::PostAction;
pub use reducer::{PostList, reduce};
