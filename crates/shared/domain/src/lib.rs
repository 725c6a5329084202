//! # Domain
//!
//! Shared domain types for the setup tool: the immutable [`SetupConfig`]
//! value assembled once per run, platform family classification, and the
//! local agent endpoint resolution (port secret + protocol probe).
//!
//! Nothing here touches package managers or services; those live behind
//! the capability traits in `mkit-platform`.

pub mod config;
pub mod endpoint;
mod error;
pub mod platform;

pub use crate::config::{
    AgentConfig, EndpointConfig, Paths, PathsConfig, PluginSetting, RetrySettings, SetupConfig,
    SetupConfigInner, default_hostname, default_plugins, load_config,
};
pub use crate::endpoint::{AgentEndpoint, PORT_ENV, ProtocolVersion, resolve_port};
pub use crate::error::{ConfigError, ConfigErrorExt};
pub use crate::platform::{PlatformKind, classify_os_release};
