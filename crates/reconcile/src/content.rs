use crate::fragment::GENERATED_HEADER;
use mkit_domain::{AgentConfig, Paths, default_hostname};
use std::fmt::Write;

/// Renders the main agent configuration file.
///
/// Globals first, then `Include` directives pulling in the per-plugin
/// fragment directory and the thresholds file.
#[must_use]
pub fn main_config(agent: &AgentConfig, paths: &Paths) -> Vec<u8> {
    let hostname = agent.hostname.clone().unwrap_or_else(default_hostname);

    let mut out = String::from(GENERATED_HEADER);
    let _ = writeln!(out, "Hostname \"{hostname}\"");
    let _ = writeln!(out, "FQDNLookup {}", agent.fqdn_lookup);
    let _ = writeln!(out, "BaseDir \"{}\"", paths.base_dir.display());
    let _ = writeln!(out, "PluginDir \"{}\"", paths.plugin_dir.display());
    let _ = writeln!(out, "TypesDB \"{}\"", paths.types_db.display());
    let _ = writeln!(out, "Interval {}", agent.interval);
    let _ = writeln!(out, "ReadThreads {}", agent.read_threads);
    out.push('\n');
    let _ = writeln!(out, "Include \"{}/*.conf\"", paths.fragment_dir.display());
    let _ = writeln!(out, "Include \"{}\"", paths.thresholds_file.display());
    out.into_bytes()
}

/// Renders the collection front-end configuration.
#[must_use]
pub fn collection_config(paths: &Paths) -> Vec<u8> {
    let mut out = String::from(GENERATED_HEADER);
    let _ = writeln!(out, "datadir: \"{}\"", paths.data_dir.display());
    let _ = writeln!(out, "libdir: \"{}\"", paths.plugin_dir.display());
    out.into_bytes()
}

/// Renders the thresholds file. The template ships entirely commented out,
/// operators enable individual rules via configuration management of their
/// own once they know their baselines.
#[must_use]
pub fn thresholds_config() -> Vec<u8> {
    let mut out = String::from(GENERATED_HEADER);
    out.push_str(
        "# Uncomment and adjust to raise notifications on metric thresholds.\n\
         #<Threshold>\n\
         #  <Plugin \"load\">\n\
         #    <Type \"load\">\n\
         #      DataSource \"midterm\"\n\
         #      WarningMax 4.0\n\
         #      FailureMax 8.0\n\
         #    </Type>\n\
         #  </Plugin>\n\
         #</Threshold>\n",
    );
    out.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mkit_domain::{PathsConfig, PlatformKind};

    fn debian_paths() -> Paths {
        Paths::resolve(&PathsConfig::default(), PlatformKind::Debian)
    }

    #[test]
    fn main_config_carries_every_global_and_both_includes() {
        let agent = AgentConfig {
            hostname: Some("abc-123".to_owned()),
            ..AgentConfig::default()
        };
        let text = String::from_utf8(main_config(&agent, &debian_paths())).unwrap();

        assert!(text.contains("Hostname \"abc-123\"\n"));
        assert!(text.contains("FQDNLookup false\n"));
        assert!(text.contains("BaseDir \"/var/lib/collectd\"\n"));
        assert!(text.contains("PluginDir \"/usr/lib/collectd\"\n"));
        assert!(text.contains("TypesDB \"/usr/share/collectd/types.db\"\n"));
        assert!(text.contains("Interval 10\n"));
        assert!(text.contains("ReadThreads 5\n"));
        assert!(text.contains("Include \"/etc/collectd/collectd.conf.d/*.conf\"\n"));
        assert!(text.contains("Include \"/etc/collectd/thresholds.conf\"\n"));
    }

    #[test]
    fn unset_hostname_falls_back_to_the_local_one() {
        let text =
            String::from_utf8(main_config(&AgentConfig::default(), &debian_paths())).unwrap();
        assert!(!text.contains("Hostname \"\""), "hostname must never be empty");
    }

    #[test]
    fn collection_config_points_at_data_and_plugin_dirs() {
        let text = String::from_utf8(collection_config(&debian_paths())).unwrap();
        assert!(text.contains("datadir: \"/var/lib/collectd/rrd\"\n"));
        assert!(text.contains("libdir: \"/usr/lib/collectd\"\n"));
    }

    #[test]
    fn thresholds_template_is_fully_commented_out() {
        let text = String::from_utf8(thresholds_config()).unwrap();
        assert!(text.lines().all(|l| l.is_empty() || l.starts_with('#')));
    }
}
