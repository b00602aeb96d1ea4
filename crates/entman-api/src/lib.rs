// entman-api: Async Rust client for the Home Assistant entity_manager integration

pub mod client;
pub mod error;
pub mod rest;
pub mod services;
pub mod transport;
pub mod types;

pub use client::EntityManagerClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
