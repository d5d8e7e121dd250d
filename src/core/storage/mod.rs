//! Local persistence

mod config;
mod credentials;

pub use config::ConfigStorage;
pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
