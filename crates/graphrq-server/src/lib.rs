//! The GraphRQ HTTP server: configuration, schema loading and the axum router.

#![cfg_attr(test, allow(unused_crate_dependencies))]

mod config;
mod error;
mod graph;
mod server;

pub use config::{Config, DirectivesConfig, GraphConfig, HealthConfig, NetworkConfig};
pub use error::Error;
pub use graph::GraphDefinition;
pub use server::{executable_schema, router, serve, ServerConfig};

pub type Result<T> = std::result::Result<T, Error>;
