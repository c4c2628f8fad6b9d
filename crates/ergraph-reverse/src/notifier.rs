use std::fmt;

/// Progress milestones reported during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    EngineeringSchema,
    EngineeringTable,
    EngineeringRelation,
    EngineeringFinished,
}

impl ProgressEvent {
    pub fn key(self) -> &'static str {
        match self {
            ProgressEvent::EngineeringSchema => "engineering_schema",
            ProgressEvent::EngineeringTable => "engineering_table",
            ProgressEvent::EngineeringRelation => "engineering_relation",
            ProgressEvent::EngineeringFinished => "engineering_finished",
        }
    }
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Receives progress notifications. Called synchronously on the engine's
/// task, so implementations must return quickly.
pub trait Notifier: Send + Sync {
    fn notify(&self, event: ProgressEvent, parameter: &str);
}

/// Notifier discarding every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _event: ProgressEvent, _parameter: &str) {}
}

/// Notifier forwarding events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, event: ProgressEvent, parameter: &str) {
        tracing::info!(event = "progress", step = %event, target_name = %parameter);
    }
}

impl<F> Notifier for F
where
    F: Fn(ProgressEvent, &str) + Send + Sync,
{
    fn notify(&self, event: ProgressEvent, parameter: &str) {
        self(event, parameter)
    }
}
