//! Navigation hook for forced logouts.

/// Host-side navigation the gateway triggers when credentials are unusable.
pub trait Navigator: Send + Sync {
    fn redirect_to_login(&self, login_path: &str);
}

/// Navigator for headless hosts: only logs the redirect.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn redirect_to_login(&self, login_path: &str) {
        tracing::warn!(login_path, "Session ended, login required");
    }
}
