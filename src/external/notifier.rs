use crate::error::AppResult;
use async_trait::async_trait;

/// Outbound notification seam. Actual mail delivery lives outside this
/// service; the engine only reports what happened.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Announce a new subscription and the personal discount code that was
    /// issued with it.
    async fn send_welcome(
        &self,
        email: &str,
        first_name: Option<&str>,
        personal_code: &str,
    ) -> AppResult<()>;
}

/// Dispatcher that only logs. Used when no mail transport is configured.
pub struct LogNotifier;

#[async_trait]
impl NotificationDispatcher for LogNotifier {
    async fn send_welcome(
        &self,
        email: &str,
        first_name: Option<&str>,
        personal_code: &str,
    ) -> AppResult<()> {
        log::info!(
            "Welcome notification for {} ({}): personal code {}",
            email,
            first_name.unwrap_or("unnamed"),
            personal_code
        );
        Ok(())
    }
}
