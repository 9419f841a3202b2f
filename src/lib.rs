//! ya-sites - news with moderated comments and personal notes
//!
//! One axum application hosting two small sites: a news feed where
//! logged-in readers leave comments, and a private notebook where each
//! user sees only their own notes.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod templates;
