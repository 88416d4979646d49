// file: src/utils/telemetry.rs
// description: stage timing helpers for supervised scan invocations
// reference: Production observability best practices

use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Operation timer for performance tracking
pub struct OperationTimer {
    operation: String,
    start: Instant,
}

impl OperationTimer {
    pub fn new(operation: &str) -> Self {
        info!("Starting {}", operation);
        Self {
            operation: operation.to_string(),
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn finish(self) -> Duration {
        let elapsed = self.elapsed();
        info!(
            "Completed {} in {}",
            self.operation,
            format_duration(elapsed)
        );
        elapsed
    }

    pub fn fail(self, reason: &str) -> Duration {
        let elapsed = self.elapsed();
        warn!(
            "{} stopped after {}: {}",
            self.operation,
            format_duration(elapsed),
            reason
        );
        elapsed
    }
}

/// Renders a duration as `1h02m03s`, `4m05s` or `6.7s`.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{}h{:02}m{:02}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m{:02}s", minutes, seconds)
    } else {
        format!("{:.1}s", duration.as_secs_f64())
    }
}
