pub mod auth;
pub mod content;
pub mod engagement;
pub mod shared;
