pub mod commands;
pub mod core;
pub mod error;
pub mod state;

pub use error::{AdminError, AdminResult};
pub use state::AdminState;
