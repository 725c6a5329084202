use crate::error::{ConfigError, ConfigErrorExt};
use crate::platform::PlatformKind;
use config::{Config, Environment, File};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Top-level setup configuration, assembled once at the start of a run and
/// threaded through every component.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SetupConfigInner {
    pub agent: AgentConfig,
    pub paths: PathsConfig,
    pub endpoint: EndpointConfig,
    pub retry: RetrySettings,
    #[serde(default = "default_plugins")]
    pub plugins: Vec<PluginSetting>,
}

impl Default for SetupConfigInner {
    fn default() -> Self {
        Self {
            agent: AgentConfig::default(),
            paths: PathsConfig::default(),
            endpoint: EndpointConfig::default(),
            retry: RetrySettings::default(),
            plugins: default_plugins(),
        }
    }
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct SetupConfig {
    #[serde(flatten, default)]
    inner: Arc<SetupConfigInner>,
}

impl Deref for SetupConfig {
    type Target = SetupConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for SetupConfig {
    fn deref_mut(&mut self) -> &mut SetupConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// Identity and polling settings written into the agent's main config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Hostname recorded in the generated config; falls back to the kernel
    /// hostname when unset.
    pub hostname: Option<String>,
    pub fqdn_lookup: bool,
    /// Polling interval in seconds.
    pub interval: u32,
    pub read_threads: u32,
    /// Service unit and package name of the monitoring agent.
    pub service: String,
    pub package: String,
    /// Packages removed before the agent is installed (stale pins,
    /// conflicting distro builds).
    pub conflicts: Vec<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            hostname: None,
            fqdn_lookup: false,
            interval: 10,
            read_threads: 5,
            service: "collectd".to_owned(),
            package: "collectd".to_owned(),
            conflicts: Vec::new(),
        }
    }
}

/// Optional path overrides; anything unset falls back to the detected
/// platform family's conventional locations via [`Paths::resolve`].
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub config_file: Option<PathBuf>,
    pub fragment_dir: Option<PathBuf>,
    pub thresholds_file: Option<PathBuf>,
    pub collection_file: Option<PathBuf>,
    pub base_dir: Option<PathBuf>,
    pub plugin_dir: Option<PathBuf>,
    pub types_db: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
}

/// Fully resolved artifact locations for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub config_file: PathBuf,
    pub fragment_dir: PathBuf,
    pub thresholds_file: PathBuf,
    pub collection_file: PathBuf,
    pub base_dir: PathBuf,
    pub plugin_dir: PathBuf,
    pub types_db: PathBuf,
    pub data_dir: PathBuf,
}

impl Paths {
    /// Applies platform-family defaults underneath any explicit overrides.
    #[must_use]
    pub fn resolve(overrides: &PathsConfig, kind: PlatformKind) -> Self {
        let pick = |set: &Option<PathBuf>, default: &str| {
            set.clone().unwrap_or_else(|| PathBuf::from(default))
        };

        let (config_file, fragment_dir, collection_file, plugin_dir) = match kind {
            PlatformKind::RedHat => (
                "/etc/collectd.conf",
                "/etc/collectd.d",
                "/etc/collection.conf",
                "/usr/lib64/collectd",
            ),
            // Debian layout also serves as the fallback for tests.
            _ => (
                "/etc/collectd/collectd.conf",
                "/etc/collectd/collectd.conf.d",
                "/etc/collectd/collection.conf",
                "/usr/lib/collectd",
            ),
        };

        let config_file = pick(&overrides.config_file, config_file);
        // Sibling of the main config, so the fragment include glob does not
        // load it a second time.
        let thresholds_default = config_file
            .parent()
            .map_or_else(|| PathBuf::from("thresholds.conf"), |dir| dir.join("thresholds.conf"));

        Self {
            thresholds_file: overrides
                .thresholds_file
                .clone()
                .unwrap_or(thresholds_default),
            fragment_dir: pick(&overrides.fragment_dir, fragment_dir),
            config_file,
            collection_file: pick(&overrides.collection_file, collection_file),
            base_dir: pick(&overrides.base_dir, "/var/lib/collectd"),
            plugin_dir: pick(&overrides.plugin_dir, plugin_dir),
            types_db: pick(&overrides.types_db, "/usr/share/collectd/types.db"),
            data_dir: pick(&overrides.data_dir, "/var/lib/collectd/rrd"),
        }
    }
}

/// Where the local agent push endpoint comes from.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Metric namespace segment of the push URL.
    pub namespace: String,
    /// Explicit port override; wins over the environment and the port file.
    pub port: Option<u16>,
    /// Secret file whose first line holds the agent port.
    pub port_file: Option<PathBuf>,
    /// Explicit protocol version override (1 or 2); otherwise probed from
    /// the installed agent's version string.
    pub protocol: Option<u8>,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            namespace: "metrics".to_owned(),
            port: None,
            port_file: Some(PathBuf::from("/var/run/mkit-agent.port")),
            protocol: None,
        }
    }
}

/// Retry budget for privileged package-manager operations.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub wait_secs: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self { max_attempts: 5, wait_secs: 15 }
    }
}

/// One monitored plugin: a name plus pre-serialized option lines, kept
/// opaque and ordered.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PluginSetting {
    pub name: String,
    #[serde(default)]
    pub options: Vec<String>,
}

impl PluginSetting {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), options: Vec::new() }
    }

    #[must_use = "with_options() returns the extended setting"]
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }
}

/// The conventional baseline plugin set, used when the config names none.
#[must_use]
pub fn default_plugins() -> Vec<PluginSetting> {
    ["cpu", "df", "disk", "interface", "load", "memory", "swap", "uptime"]
        .into_iter()
        .map(PluginSetting::new)
        .collect()
}

/// Environment variable prefix for configuration overrides.
const ENV_PREFIX: &str = "MKIT";

/// Loads the run configuration, layering `MKIT__`-prefixed environment
/// variables over an optional TOML file.
///
/// When `path` is given the file must exist; without it the loader falls
/// back to `mkit` in the working directory and tolerates its absence,
/// producing a default-valued configuration modified only by environment
/// overrides (e.g. `MKIT__AGENT__INTERVAL=30` maps to `agent.interval`).
///
/// # Errors
/// Returns [`ConfigError::Config`] if the file is missing (when required),
/// malformed, or does not deserialize into `T`.
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    load_layered(path, environment())
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .convert_case(config::Case::Snake)
        .try_parsing(true)
}

fn load_layered<T>(path: Option<impl AsRef<Path>>, env: Environment) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let required = path.is_some();
    let effective_path =
        path.map_or_else(|| PathBuf::from("mkit"), |p| p.as_ref().to_path_buf());

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(required))
        .add_source(env);

    info!("Loading config from {}", effective_path.display());

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}

/// Kernel hostname fallback for the generated `Hostname` field.
#[must_use]
pub fn default_hostname() -> String {
    std::fs::read_to_string("/proc/sys/kernel/hostname")
        .map(|s| s.trim().to_owned())
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "localhost".to_owned())
}
