pub mod content_item;
pub mod like;
pub mod user;
