//! RAII-based timing utilities for measuring and logging operation durations.
//!
//! # Example
//!
//! ```rust,ignore
//! use vagent_util::timing::TimingGuard;
//!
//! async fn execute_tool(name: &str) {
//!     let _timing = TimingGuard::tool(name);
//!     // ... tool execution ...
//!     // Duration is logged when _timing is dropped
//! }
//! ```

use std::time::Instant;
use tracing::{debug, info, warn};

/// RAII guard that measures and logs the duration of an operation.
///
/// When dropped, logs the elapsed time since creation.
pub struct TimingGuard {
    /// Type of operation (e.g., "tool", "model_step", "research")
    operation_type: &'static str,
    /// Name of the specific operation (e.g., "run_shell", "fetch_paper")
    operation_name: String,
    start: Instant,
    /// Durations below this are logged at debug level
    info_threshold_ms: u64,
    /// Minimum duration to log at warn level (for slow operations)
    warn_threshold_ms: u64,
}

impl TimingGuard {
    /// Create a new timing guard.
    pub fn new(operation_type: &'static str, operation_name: impl Into<String>) -> Self {
        let operation_name = operation_name.into();
        debug!(
            operation_type = operation_type,
            operation_name = %operation_name,
            "Starting operation"
        );
        Self {
            operation_type,
            operation_name,
            start: Instant::now(),
            info_threshold_ms: 100,
            warn_threshold_ms: 5000,
        }
    }

    /// Create a timing guard for tool execution.
    pub fn tool(name: impl Into<String>) -> Self {
        Self::new("tool", name)
    }

    /// Create a timing guard for one model round-trip.
    ///
    /// Model steps are routinely slow, so the warn threshold is raised.
    pub fn model_step(model_id: impl Into<String>) -> Self {
        Self::new("model_step", model_id).with_warn_threshold(60_000)
    }

    /// Create a timing guard for a research backend call.
    pub fn research(name: impl Into<String>) -> Self {
        Self::new("research", name)
    }

    /// Set the threshold for warn-level logging (in milliseconds).
    pub fn with_warn_threshold(mut self, ms: u64) -> Self {
        self.warn_threshold_ms = ms;
        self
    }

    /// Get the elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> u128 {
        self.start.elapsed().as_millis()
    }
}

impl Drop for TimingGuard {
    fn drop(&mut self) {
        let duration_ms = self.start.elapsed().as_millis();

        let duration_str = if duration_ms < 1000 {
            format!("{duration_ms}ms")
        } else if duration_ms < 60_000 {
            format!("{:.2}s", duration_ms as f64 / 1000.0)
        } else {
            let mins = duration_ms / 60_000;
            let secs = (duration_ms % 60_000) as f64 / 1000.0;
            format!("{mins}m {secs:.1}s")
        };

        if duration_ms >= self.warn_threshold_ms as u128 {
            warn!(
                operation_type = self.operation_type,
                operation_name = %self.operation_name,
                duration_ms = duration_ms as u64,
                duration = %duration_str,
                "Slow operation completed"
            );
        } else if duration_ms >= self.info_threshold_ms as u128 {
            info!(
                operation_type = self.operation_type,
                operation_name = %self.operation_name,
                duration_ms = duration_ms as u64,
                duration = %duration_str,
                "Operation completed"
            );
        } else {
            debug!(
                operation_type = self.operation_type,
                operation_name = %self.operation_name,
                duration_ms = duration_ms as u64,
                duration = %duration_str,
                "Operation completed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_timing_guard_tool() {
        let guard = TimingGuard::tool("run_shell");
        sleep(Duration::from_millis(5));
        assert!(guard.elapsed_ms() >= 5);
    }

    #[test]
    fn test_model_step_raises_warn_threshold() {
        let guard = TimingGuard::model_step("openai/gpt-4.1-mini");
        assert_eq!(guard.warn_threshold_ms, 60_000);
        assert_eq!(guard.operation_type, "model_step");
    }

    #[test]
    fn test_timing_guard_thresholds() {
        let guard = TimingGuard::research("search_papers").with_warn_threshold(1000);
        assert_eq!(guard.info_threshold_ms, 100);
        assert_eq!(guard.warn_threshold_ms, 1000);
        drop(guard);
    }
}
