// lib.rs
//! Rust client for the eero cloud REST API (mesh router management).
//!
//! All requests go through one hardened pipeline: requests are built against
//! a configurable, path-prefixed base URL (or resolved against its cached
//! origin for server-supplied relative URLs, with a same-host guard), the
//! response envelope is classified into a structured [`ApiError`], and the
//! session cookie is managed through a shared [`SessionJar`].

mod client;
mod constants;
mod error;
mod models;
mod origin;
mod session_jar;
mod timestamp;

pub use client::{EeroClient, EeroClientBuilder};
pub use constants::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT, SESSION_COOKIE_NAME};
pub use error::{ApiError, EeroError};
pub use models::*;
pub use session_jar::SessionJar;
