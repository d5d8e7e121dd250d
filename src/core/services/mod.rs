//! Service layer
//! Session lifecycle, the request gateway and the admin API wrappers

pub mod config;
pub mod gateway;
pub mod http;
pub mod import;
pub mod keys;
pub mod session;
pub mod stats;

pub use config::ConfigService;
pub use gateway::{Gateway, RequestOptions};
pub use http::HttpEndpoint;
pub use import::parse_import;
pub use keys::{KeyService, Page};
pub use session::SessionController;
pub use stats::{summarize, StatsService};
