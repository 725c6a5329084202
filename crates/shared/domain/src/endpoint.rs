use crate::config::EndpointConfig;
use crate::error::ConfigError;
use std::fmt;

/// Environment variable consulted for the agent port when the config does
/// not pin one explicitly.
pub const PORT_ENV: &str = "MKIT_AGENT_PORT";

/// Wire protocol generation of the local agent's ingest endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolVersion {
    V1,
    V2,
}

impl ProtocolVersion {
    /// Selects the protocol generation from the agent's `--version` output.
    ///
    /// The first integer in the string is taken as the major version; major
    /// 2 and above speak v2. Unparsable output conservatively falls back to
    /// v1, which every agent generation accepts.
    #[must_use]
    pub fn from_version_output(output: &str) -> Self {
        let major = output
            .split(|c: char| !c.is_ascii_digit())
            .find(|chunk| !chunk.is_empty())
            .and_then(|chunk| chunk.parse::<u32>().ok());

        match major {
            Some(v) if v >= 2 => Self::V2,
            _ => Self::V1,
        }
    }

    /// Maps an explicit config override to a protocol generation.
    #[must_use]
    pub const fn from_override(value: u8) -> Self {
        if value >= 2 { Self::V2 } else { Self::V1 }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V1 => write!(f, "v1"),
            Self::V2 => write!(f, "v2"),
        }
    }
}

/// The fully resolved local agent push target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentEndpoint {
    pub port: u16,
    pub namespace: String,
    pub version: ProtocolVersion,
}

impl AgentEndpoint {
    /// Renders the push URL handed to the write plugin.
    #[must_use]
    pub fn push_url(&self) -> String {
        format!("http://127.0.0.1:{}/{}/{}", self.port, self.namespace, self.version)
    }
}

/// Resolves the agent port from its secret sources, in order: explicit
/// config value, the `MKIT_AGENT_PORT` environment variable, then the
/// first line of the configured port file.
///
/// # Errors
/// Returns [`ConfigError::Port`] when no source yields a parsable port.
pub fn resolve_port(cfg: &EndpointConfig) -> Result<u16, ConfigError> {
    if let Some(port) = cfg.port {
        return Ok(port);
    }

    if let Ok(value) = std::env::var(PORT_ENV) {
        return value.trim().parse::<u16>().map_err(|_| ConfigError::Port {
            message: format!("{PORT_ENV} holds an invalid port: {value:?}").into(),
            context: None,
        });
    }

    let Some(port_file) = &cfg.port_file else {
        return Err(ConfigError::Port {
            message: "no port configured, no environment override, no port file".into(),
            context: None,
        });
    };

    let content = std::fs::read_to_string(port_file).map_err(|e| ConfigError::Port {
        message: format!("cannot read {}: {e}", port_file.display()).into(),
        context: None,
    })?;

    content
        .lines()
        .next()
        .unwrap_or_default()
        .trim()
        .parse::<u16>()
        .map_err(|_| ConfigError::Port {
            message: format!("{} does not start with a port number", port_file.display()).into(),
            context: None,
        })
}
