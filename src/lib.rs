//! Storefront Backend Library
//!
//! Exposes core modules for use by the server binary and tests.

pub mod auth;
pub mod catalog;
pub mod config;
