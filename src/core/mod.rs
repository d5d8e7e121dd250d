//! Core module
//! Session handling, the request gateway and the admin API services,
//! independent of the front end driving them

pub mod logger;
pub mod models;
pub mod services;
pub mod storage;
pub mod traits;

// Re-export commonly used types
pub use traits::{
    Clock, DefaultStorageConfig, ManualClock, Notice, NoticeLevel, NoticeLog, Notifier,
    StorageConfig, SystemClock,
};
