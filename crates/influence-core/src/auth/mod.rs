//! Authentication module for credentials and the process-wide session.
//!
//! This module provides:
//! - `SecureStorage` backends: OS keychain, file fallback, in-memory
//! - `CredentialStore`: access/refresh token persistence
//! - `SessionStore`: session state with login, register, logout and
//!   restore-on-start transitions

pub mod credentials;
pub mod session;
pub mod storage;

pub use credentials::{CredentialStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
pub use session::{SessionState, SessionStore};
pub use storage::{
    FileStorage, KeyringStorage, MemoryStorage, SecureStorage, StorageBackend, StorageError,
    StorageResult,
};
