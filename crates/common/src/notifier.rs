use async_trait::async_trait;
use tracing::info;

use crate::Result;

/// Destination for signal reports.
///
/// Delivery is best-effort: callers log a failed `notify` and carry on.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Short name used in log lines.
    fn name(&self) -> &str;

    async fn notify(&self, message: &str) -> Result<()>;
}

/// Fallback used when no notification channel is configured.
/// Reports end up in the log only.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn notify(&self, message: &str) -> Result<()> {
        info!(notifier = "log", "{message}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_notifier_always_succeeds() {
        let notifier = LogNotifier;
        assert_eq!(notifier.name(), "log");
        assert!(notifier.notify("hello").await.is_ok());
    }
}
