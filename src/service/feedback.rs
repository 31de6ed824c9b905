use tracing::{info, warn};

/// Sink for short user-facing messages (the toast of a UI front end).
pub trait Feedback: Send + Sync {
    fn success(&self, title: &str, message: &str);
    fn error(&self, title: &str, message: &str);
}

/// Writes feedback to the log; used when no interactive front end is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingFeedback;

impl Feedback for TracingFeedback {
    fn success(&self, title: &str, message: &str) {
        info!(title, "{}", message);
    }

    fn error(&self, title: &str, message: &str) {
        warn!(title, "{}", message);
    }
}
