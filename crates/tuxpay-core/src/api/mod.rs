//! REST API client module for the TuxPay server.
//!
//! This module provides the `ApiClient`, which wraps every request in the
//! same pipeline: bearer token attachment, error-to-notification mapping
//! and warning extraction.
//!
//! The server authenticates admin endpoints with a JWT bearer token
//! obtained from `POST /api/authenticate`.

pub mod body;
pub mod client;
pub mod error;

pub use body::{ResponseBody, ResponseKind, Warnings};
pub use client::{ApiClient, DEFAULT_PAGE_LIMIT};
pub use error::ApiError;
