use std::path::PathBuf;

/// The GraphRQ server error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A configuration, schema or seed file cannot be read
    #[error("reading {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The TOML configuration is invalid
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
    /// The seed document is not valid JSON
    #[error("invalid seed data: {0}")]
    Seed(#[source] serde_json::Error),
    /// The schema cannot be built
    #[error(transparent)]
    Schema(#[from] graphrq_directives::Error),
    /// Cannot start the HTTP server
    #[error("starting server: {0}")]
    Server(#[source] std::io::Error),
}
