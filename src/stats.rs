//! Frame-rate tracking over a sliding window of frames.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Number of frames averaged
const WINDOW: usize = 60;

/// Rolling frame-time statistics, reported once per second
pub struct FrameStats {
    frame_times: VecDeque<Duration>,
    last_frame: Option<Instant>,
    last_report: Option<Instant>,
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameStats {
    pub fn new() -> Self {
        Self {
            frame_times: VecDeque::with_capacity(WINDOW),
            last_frame: None,
            last_report: None,
        }
    }

    /// Record a frame presented at `now`
    pub fn record_frame(&mut self, now: Instant) {
        if let Some(last) = self.last_frame {
            self.frame_times.push_back(now.saturating_duration_since(last));
            if self.frame_times.len() > WINDOW {
                self.frame_times.pop_front();
            }
        }
        self.last_frame = Some(now);

        let report_due = self
            .last_report
            .map_or(true, |last| now.saturating_duration_since(last) >= Duration::from_secs(1));
        if report_due {
            if let Some((min, avg, max)) = self.fps() {
                log::debug!("FPS - Min: {:.1}, Avg: {:.1}, Max: {:.1}", min, avg, max);
            }
            self.last_report = Some(now);
        }
    }

    /// (min, avg, max) frames per second over the window
    pub fn fps(&self) -> Option<(f32, f32, f32)> {
        let rates: Vec<f32> = self
            .frame_times
            .iter()
            .filter(|t| !t.is_zero())
            .map(|t| 1.0 / t.as_secs_f32())
            .collect();
        if rates.is_empty() {
            return None;
        }

        let min = rates.iter().copied().fold(f32::MAX, f32::min);
        let max = rates.iter().copied().fold(0.0, f32::max);
        let total: Duration = self.frame_times.iter().sum();
        let avg = self.frame_times.len() as f32 / total.as_secs_f32();
        Some((min, avg, max))
    }
}
