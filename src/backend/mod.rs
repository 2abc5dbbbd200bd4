//! Client for the external game backend: the contract, its HTTP
//! implementation, and the shared error taxonomy.

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod models;

pub use api::{GameBackend, RoomAuth};
pub use config::BackendConfig;
pub use error::{BackendError, BackendResult};
pub use http::HttpGameBackend;
