use strum_macros::{Display, EnumString};

/// Host platform family, detected once at startup.
///
/// The two supported families differ in package manager, artifact layout,
/// and bootstrap packages; everything downstream branches on this value
/// exactly once, when the capability implementations are selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum PlatformKind {
    Debian,
    RedHat,
    Unsupported,
}

impl PlatformKind {
    #[must_use]
    pub const fn is_supported(self) -> bool {
        !matches!(self, Self::Unsupported)
    }
}

/// Classifies an `/etc/os-release` document into a platform family.
///
/// `ID=` is consulted first, then `ID_LIKE=`; quoting is tolerated. Anything
/// that matches neither family is [`PlatformKind::Unsupported`].
#[must_use]
pub fn classify_os_release(content: &str) -> PlatformKind {
    let field = |key: &str| {
        content.lines().find_map(|line| {
            line.strip_prefix(key).map(|v| v.trim().trim_matches('"').to_ascii_lowercase())
        })
    };

    let id = field("ID=").unwrap_or_default();
    let id_like = field("ID_LIKE=").unwrap_or_default();

    let mentions = |needle: &str| {
        id == needle || id_like.split_whitespace().any(|token| token == needle)
    };

    if mentions("debian") || mentions("ubuntu") {
        PlatformKind::Debian
    } else if mentions("rhel") || mentions("fedora") || mentions("centos") {
        PlatformKind::RedHat
    } else {
        PlatformKind::Unsupported
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ubuntu_is_debian_family() {
        let os_release = "NAME=\"Ubuntu\"\nID=ubuntu\nID_LIKE=debian\nVERSION_ID=\"24.04\"\n";
        assert_eq!(classify_os_release(os_release), PlatformKind::Debian);
    }

    #[test]
    fn rocky_is_redhat_family_via_id_like() {
        let os_release = "NAME=\"Rocky Linux\"\nID=\"rocky\"\nID_LIKE=\"rhel centos fedora\"\n";
        assert_eq!(classify_os_release(os_release), PlatformKind::RedHat);
    }

    #[test]
    fn plain_debian_id() {
        assert_eq!(classify_os_release("ID=debian\n"), PlatformKind::Debian);
    }

    #[test]
    fn unknown_distro_is_unsupported() {
        let os_release = "NAME=\"Alpine Linux\"\nID=alpine\n";
        assert_eq!(classify_os_release(os_release), PlatformKind::Unsupported);
        assert!(!classify_os_release(os_release).is_supported());
    }

    #[test]
    fn empty_document_is_unsupported() {
        assert_eq!(classify_os_release(""), PlatformKind::Unsupported);
    }

    #[test]
    fn display_is_lowercase() {
        assert_eq!(PlatformKind::RedHat.to_string(), "redhat");
    }
}
