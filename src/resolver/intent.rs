//! Host-facing side-effect seams
//!
//! App-intent launches and user notifications are host facilities; the
//! resolver only ever talks to these traits. The logging implementations
//! back the CLI binary, where there is no media-center host to hand off to.

use async_trait::async_trait;
use tracing::info;

/// Intent action used for watch-URL handoff
pub const INTENT_ACTION_VIEW: &str = "android.intent.action.VIEW";

/// Launches an external application via an OS-level intent
#[async_trait]
pub trait IntentLauncher: Send + Sync {
    /// Fire-and-forget: the external application takes over playback
    async fn launch(&self, app_id: &str, action: &str, data_url: &str);
}

/// Emits a user-visible notification
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str);
}

/// Logs the launch it would have performed
pub struct LoggingIntentLauncher;

#[async_trait]
impl IntentLauncher for LoggingIntentLauncher {
    async fn launch(&self, app_id: &str, action: &str, data_url: &str) {
        info!(
            target = "resolver.intent",
            app_id, action, url = data_url, "launching external application"
        );
    }
}

/// Logs notifications instead of displaying them
pub struct LoggingNotifier;

#[async_trait]
impl Notifier for LoggingNotifier {
    async fn notify(&self, message: &str) {
        info!(target = "resolver.notify", "{}", message);
    }
}
