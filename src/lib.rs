//! Blogicum — a multi-user blogging platform
//!
//! Users register, author posts organized by category and location,
//! schedule their publication, and comment on each other's posts. All
//! pages are server-rendered.
//!
//! Layering, bottom up:
//! - [`models`]: entities and read models
//! - [`policy`]: the pure visibility and ownership rules
//! - [`db`]: pool, migrations, repositories
//! - [`services`]: business logic (accounts, feeds, posts, comments)
//! - [`web`]: axum handlers and routing

pub mod config;
pub mod db;
pub mod models;
pub mod policy;
pub mod services;
pub mod web;
