//! Shared building blocks for the catalog server.
//!
//! At the moment this is only the content-addressed blob storage used for
//! thumbnails and video payloads.

pub mod storage;
