use thiserror::Error;

/// Configuration errors raised during validation (spec.md §7.1). Message
/// text for `UnknownApiGroup`/`UnknownResource` matches
/// `original_source/config_test.go`'s expected substrings verbatim, so
/// downstream log lines and tests can match on them.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid group/version {0:?}: expected \"v1\" or \"<group>/<version>\"")]
    InvalidGroupVersion(String),

    #[error("api group {0} not found")]
    UnknownApiGroup(String),

    #[error("api resource {resource} not found in api group {api_group}")]
    UnknownResource { resource: String, api_group: String },

    #[error("invalid mode {0:?}: expected \"pull\" or \"watch\"")]
    InvalidMode(String),

    #[error("interval must be greater than zero for pull mode (resource {0})")]
    InvalidInterval(String),

    #[error("discovery unavailable: {0}")]
    DiscoveryUnavailable(String),
}
