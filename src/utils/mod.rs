use std::time::{Duration, Instant};
use tracing::info;

/// Logs start, finish and elapsed wall-clock time of a command.
pub struct Timer {
    label: String,
    start: Instant,
}

impl Timer {
    pub fn start(label: impl Into<String>) -> Self {
        let label = label.into();
        info!("⏱  Starting: {}", label);
        Self {
            label,
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        info!("⏱  Finished: {} (took {:.2?})", self.label, self.elapsed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_elapsed_grows() {
        let t = Timer::start("scrape");
        let first = t.elapsed();
        std::thread::sleep(Duration::from_millis(5));
        assert!(t.elapsed() > first);
    }
}
