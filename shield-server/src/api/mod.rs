//! HTTP handlers, one module per route group

pub mod admin;
pub mod auth;
pub mod extract;
pub mod files;
pub mod health;
pub mod public;
pub mod shields;
