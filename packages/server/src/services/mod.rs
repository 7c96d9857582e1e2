//! Core catalog operations. Each takes the acting identity explicitly and
//! returns a typed [`AppError`](crate::error::AppError) on failure.

pub mod assets;
pub mod content;
pub mod engagement;
pub mod identity;
pub mod moderation;
