//! Build phase timing.

use std::time::{Duration, Instant};

/// Measures one build phase and reports it when finished.
pub struct Timer {
    phase: String,
    start: Instant,
}

impl Timer {
    pub fn start(phase: &str) -> Self {
        Self {
            phase: phase.to_string(),
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Print the elapsed time and return it.
    pub fn finish(self) -> Duration {
        let elapsed = self.elapsed();
        println!("  [{}] {}", format_duration(elapsed), self.phase);
        tracing::debug!(phase = %self.phase, secs = elapsed.as_secs_f64(), "phase finished");
        elapsed
    }
}

/// Seconds below a minute, minutes above.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs >= 60.0 {
        format!("{:.1}m", secs / 60.0)
    } else {
        format!("{:.1}s", secs)
    }
}
