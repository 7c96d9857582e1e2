pub mod assets;
pub mod auth;
pub mod content;
pub mod engagement;
pub mod moderation;
