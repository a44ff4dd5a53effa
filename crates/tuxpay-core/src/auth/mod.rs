//! Authentication module for managing the admin session.
//!
//! This module provides:
//! - `Session`: bearer token held in a durable or ephemeral slot
//! - `TokenStore`: the slot abstraction, with file, memory and keychain backends
//! - `token`: claims decoding for admin and short invoice tokens
//!
//! A session is authenticated exactly when its token decodes and its `exp`
//! claim lies in the future.

pub mod credentials;
pub mod session;
pub mod store;
pub mod token;

pub use credentials::KeyringStore;
pub use session::{Session, SharedSession, TOKEN_KEY};
pub use store::{FileStore, MemoryStore, TokenStore};
pub use token::{decode_claims, Claims};
