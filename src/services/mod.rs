//! Domain services used by HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own validation, business logic and persistence concerns so
//! route handlers can stay focused on request parsing and auth plumbing.
//! The pure modules (`money`, `period`, `summary`, `export`) never touch the
//! database and are shared by several route groups.

pub mod auth;
pub mod budget;
pub mod category;
pub mod expense;
pub mod export;
pub mod money;
pub mod page;
pub mod password;
pub mod period;
pub mod session;
pub mod summary;
