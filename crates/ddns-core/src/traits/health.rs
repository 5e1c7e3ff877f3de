// # Health Notifier Trait
//
// Best-effort signal sent after each successful reconciliation cycle,
// typically a ping to an external uptime monitor.

use async_trait::async_trait;

/// Trait for health-check notifiers
///
/// `notify` has no error channel: implementations log their own
/// failures and the outcome never influences reconciliation.
#[async_trait]
pub trait HealthNotifier: Send + Sync {
    /// Signal that a reconciliation cycle completed
    async fn notify(&self);
}

/// Notifier used when no health-check URL is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHealthNotifier;

#[async_trait]
impl HealthNotifier for NoopHealthNotifier {
    async fn notify(&self) {}
}
