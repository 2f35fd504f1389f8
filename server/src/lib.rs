//! Staff Admin Server
//!
//! User, role and permission administration behind role-scoped JWT auth.

pub mod admin;
pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod permissions;
pub mod profile;
