//! User-facing side effects the controller needs from the rendering layer.

/// Blocking dialogs and navigation, supplied by whatever renders the screen.
///
/// Calls are made from the controller task, so implementations must not
/// block for long; a GUI would typically forward them to its own thread.
pub trait UserPrompt: Send + Sync + 'static {
    /// Asks the user to confirm a destructive action.
    fn confirm(&self, message: &str) -> bool;
    /// Shows a blocking error.
    fn alert(&self, message: &str);
    /// Shows a success confirmation.
    fn notice(&self, message: &str) {
        self.alert(message);
    }
    /// Opens `url` in a new viewing context.
    fn open_url(&self, url: &str);
}

/// Headless prompt: confirms everything and routes messages to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogPrompt;

impl UserPrompt for LogPrompt {
    fn confirm(&self, message: &str) -> bool {
        tracing::info!(prompt = message, "auto-confirmed");
        true
    }

    fn alert(&self, message: &str) {
        tracing::warn!(prompt = message, "alert");
    }

    fn notice(&self, message: &str) {
        tracing::info!(prompt = message, "notice");
    }

    fn open_url(&self, url: &str) {
        tracing::info!(url, "open url");
    }
}
