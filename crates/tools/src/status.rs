use async_trait::async_trait;

/// Receives human-readable progress updates while a tool runs.
///
/// Implementations swallow and log their own failures; a status update
/// never changes the outcome of a tool call.
#[async_trait]
pub trait StatusSink: Send + Sync {
    async fn set_status(&self, status: &str);
}

/// Sink used when nobody is listening.
pub struct NoopStatus;

#[async_trait]
impl StatusSink for NoopStatus {
    async fn set_status(&self, _status: &str) {}
}
