use mkit_domain::{AgentEndpoint, PluginSetting};
use std::fmt::Write;

/// Header placed at the top of every generated file so an operator knows
/// manual edits will not survive the next run.
pub(crate) const GENERATED_HEADER: &str = "# Managed by mkit-setup, do not edit by hand.\n";

/// Renders one plugin's configuration fragment.
///
/// The output is a header comment, a `LoadPlugin` directive and, when the
/// plugin carries options, one `<Plugin>` block holding every option line
/// verbatim in declaration order. Option lines are opaque to the builder,
/// it never parses them.
#[must_use]
pub fn build(plugin: &PluginSetting) -> Vec<u8> {
    let mut out = String::from(GENERATED_HEADER);
    let _ = writeln!(out, "LoadPlugin {}", plugin.name);

    if !plugin.options.is_empty() {
        let _ = writeln!(out, "<Plugin \"{}\">", plugin.name);
        for option in &plugin.options {
            out.push_str(option);
            out.push('\n');
        }
        out.push_str("</Plugin>\n");
    }

    out.into_bytes()
}

/// Plugin fragment pushing collected values to the local agent endpoint.
#[must_use]
pub fn push_target(endpoint: &AgentEndpoint) -> PluginSetting {
    PluginSetting::new("write_http").with_options([
        format!("URL \"{}\"", endpoint.push_url()),
        "Format \"JSON\"".to_owned(),
        "StoreRates true".to_owned(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use mkit_domain::ProtocolVersion;

    fn rendered(plugin: &PluginSetting) -> String {
        String::from_utf8(build(plugin)).unwrap()
    }

    #[test]
    fn bare_plugin_emits_only_the_load_directive() {
        let text = rendered(&PluginSetting::new("cpu"));

        assert!(text.starts_with("# "));
        assert!(text.contains("LoadPlugin cpu\n"));
        assert!(!text.contains("<Plugin"), "no block markers without options");
        assert!(!text.contains("</Plugin>"));
    }

    #[test]
    fn options_are_emitted_verbatim_in_input_order() {
        let plugin = PluginSetting::new("df").with_options([
            "MountPoint \"/\"".to_owned(),
            "IgnoreSelected false".to_owned(),
        ]);
        let text = rendered(&plugin);

        let block_start = text.find("<Plugin \"df\">\n").unwrap();
        let block_end = text.find("</Plugin>\n").unwrap();
        assert_eq!(
            &text[block_start..block_end],
            "<Plugin \"df\">\nMountPoint \"/\"\nIgnoreSelected false\n"
        );
        assert_eq!(text.matches("LoadPlugin df").count(), 1);
    }

    #[test]
    fn push_target_points_at_the_local_agent() {
        let endpoint = AgentEndpoint {
            port: 9103,
            namespace: "metrics".to_owned(),
            version: ProtocolVersion::V2,
        };
        let text = rendered(&push_target(&endpoint));

        assert!(text.contains("LoadPlugin write_http"));
        assert!(text.contains("URL \"http://127.0.0.1:9103/metrics/v2\""));
    }
}
