use std::{fs, net::SocketAddr, path::Path};

use graphrq_directives::{
    CachePolicy, DefaultDirectives, DirectivesNil, LengthDirective, StringFormatDirective, UpperDirective,
    LENGTH_DIRECTIVE, STRING_FORMAT_DIRECTIVE, UPPERCASE_DIRECTIVE,
};

use crate::Error;

#[derive(Clone, Debug, Default, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
/// Configuration of the GraphRQ server, read from `graphrq.toml`.
pub struct Config {
    /// Server bind settings
    pub network: NetworkConfig,
    /// GraphQL endpoint settings
    pub graph: GraphConfig,
    /// Health check endpoint settings
    pub health: HealthConfig,
    /// Names and caching of the schema directives
    pub directives: DirectivesConfig,
}

impl Config {
    /// Reads the configuration file. A missing file yields the defaults.
    pub fn load(path: &Path) -> crate::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| Error::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(toml::from_str(&content)?)
    }
}

#[derive(Clone, Debug, Default, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkConfig {
    pub listen_address: Option<SocketAddr>,
}

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GraphConfig {
    pub path: Option<String>,
    pub introspection: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            path: None,
            introspection: true,
        }
    }
}

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HealthConfig {
    pub enabled: bool,
    pub path: String,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/health".to_string(),
        }
    }
}

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DirectivesConfig {
    /// Name of the length directive. Default: `length`.
    pub length: String,
    /// Name of the string format directive. Default: `stringFormat`.
    pub string_format: String,
    /// Name of the uppercase directive. Default: `uppercase`.
    pub uppercase: String,
    /// What happens when the same length-checked scalar is requested twice.
    pub length_cache_policy: CachePolicy,
    /// What happens when the same format-checked scalar is requested twice.
    pub string_format_cache_policy: CachePolicy,
}

impl Default for DirectivesConfig {
    fn default() -> Self {
        Self {
            length: LENGTH_DIRECTIVE.to_string(),
            string_format: STRING_FORMAT_DIRECTIVE.to_string(),
            uppercase: UPPERCASE_DIRECTIVE.to_string(),
            length_cache_policy: CachePolicy::default(),
            string_format_cache_policy: CachePolicy::default(),
        }
    }
}

impl DirectivesConfig {
    pub fn directives(&self) -> DefaultDirectives {
        DirectivesNil
            .with(LengthDirective::new(&self.length).with_cache_policy(self.length_cache_policy))
            .with(StringFormatDirective::new(&self.string_format).with_cache_policy(self.string_format_cache_policy))
            .with(UpperDirective::new(&self.uppercase))
    }
}
