//! Redirect-loop prevention
//!
//! Handing playback to a sibling add-on is only safe when that add-on is a
//! genuinely different player. An installed sibling by the same maintainer
//! is assumed to route playback straight back here, so the guard rejects it
//! before a deep link is ever built.

use std::sync::Arc;

use crate::errors::{ResolveError, ResolveResult};

/// Identity record for an installed add-on
#[derive(Debug, Clone)]
pub struct AddonInfo {
    pub id: String,
    pub author: String,
}

/// Host-provided view of installed add-ons
pub trait AddonDirectory: Send + Sync {
    /// Look up an installed add-on; `None` when it is not installed
    fn lookup(&self, addon_id: &str) -> Option<AddonInfo>;
}

/// Fixed in-memory directory, used by the CLI (empty) and by tests
#[derive(Debug, Default)]
pub struct StaticAddonDirectory {
    addons: Vec<AddonInfo>,
}

impl StaticAddonDirectory {
    pub fn new(addons: Vec<AddonInfo>) -> Self {
        Self { addons }
    }
}

impl AddonDirectory for StaticAddonDirectory {
    fn lookup(&self, addon_id: &str) -> Option<AddonInfo> {
        self.addons.iter().find(|a| a.id == addon_id).cloned()
    }
}

/// Policy check run before any sibling deep link is returned
pub struct RedirectGuard {
    directory: Arc<dyn AddonDirectory>,
    own_author: String,
}

impl RedirectGuard {
    pub fn new(directory: Arc<dyn AddonDirectory>, own_author: impl Into<String>) -> Self {
        Self {
            directory,
            own_author: own_author.into(),
        }
    }

    /// Fail when the target is installed and self-identifies as authored by
    /// this add-on's own maintainer; absent or differently-authored targets
    /// pass silently.
    pub fn assert_safe(&self, addon_id: &str) -> ResolveResult<()> {
        if self.own_author.is_empty() {
            return Ok(());
        }
        match self.directory.lookup(addon_id) {
            Some(info) if info.author.eq_ignore_ascii_case(&self.own_author) => {
                Err(ResolveError::RedirectLoop {
                    addon_id: addon_id.to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard_with(addons: Vec<AddonInfo>, own_author: &str) -> RedirectGuard {
        RedirectGuard::new(Arc::new(StaticAddonDirectory::new(addons)), own_author)
    }

    #[test]
    fn same_maintainer_is_rejected() {
        let guard = guard_with(
            vec![AddonInfo {
                id: "plugin.video.youtube".to_string(),
                author: "Acme Media".to_string(),
            }],
            "acme media",
        );
        assert!(matches!(
            guard.assert_safe("plugin.video.youtube"),
            Err(ResolveError::RedirectLoop { addon_id }) if addon_id == "plugin.video.youtube"
        ));
    }

    #[test]
    fn absent_addon_passes() {
        let guard = guard_with(vec![], "acme media");
        assert!(guard.assert_safe("plugin.video.youtube").is_ok());
    }

    #[test]
    fn different_maintainer_passes() {
        let guard = guard_with(
            vec![AddonInfo {
                id: "plugin.video.youtube".to_string(),
                author: "someone else".to_string(),
            }],
            "acme media",
        );
        assert!(guard.assert_safe("plugin.video.youtube").is_ok());
    }
}
