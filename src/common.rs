//! Helpers for console programs that poll the gyroscope

use std::time::Instant;

use crate::l3gd20h::{DataAvailability, GyroReading};

/// Running tally of read outcomes
#[derive(Debug, Clone, Copy)]
pub struct ReadStats {
    start: Instant,
    pub fresh: u64,
    pub not_yet_available: u64,
    pub overwritten: u64,
    pub unknown: u64,
    pub bus_errors: u64,
}

impl ReadStats {
    /// Start counting now
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            fresh: 0,
            not_yet_available: 0,
            overwritten: 0,
            unknown: 0,
            bus_errors: 0,
        }
    }

    pub fn record(&mut self, reading: &GyroReading) {
        match reading.status {
            DataAvailability::Fresh => self.fresh += 1,
            DataAvailability::NotYetAvailable => self.not_yet_available += 1,
            DataAvailability::Overwritten => self.overwritten += 1,
            DataAvailability::Unknown => self.unknown += 1,
        }
    }

    pub fn record_bus_error(&mut self) {
        self.bus_errors += 1;
    }

    /// Successful reads, whatever their freshness
    pub fn reads(&self) -> u64 {
        self.fresh + self.not_yet_available + self.overwritten + self.unknown
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    /// Successful reads per second since creation
    pub fn poll_rate(&self) -> f64 {
        let elapsed = self.elapsed_secs();
        if elapsed > 0.0 {
            self.reads() as f64 / elapsed
        } else {
            0.0
        }
    }
}

impl Default for ReadStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a horizontal bar graph for a raw count
///
/// # Arguments
/// * `value` - The count to display
/// * `max_value` - Count at which the bar is full
/// * `width` - Total width of the bar in characters
///
/// # Example
/// ```
/// use l3gd20h_interface::create_bar;
///
/// // Half of positive full scale on a 40-char bar
/// let bar = create_bar(16384, 32768, 40);
/// println!("[{}]", bar);
/// ```
pub fn create_bar(value: i16, max_value: i32, width: usize) -> String {
    let normalized = (value as f32 / max_value as f32).clamp(-1.0, 1.0);
    let center = width / 2;
    let bar_length = ((normalized.abs() * center as f32) as usize).min(center);

    let (left, right) = if normalized < 0.0 {
        (" ".repeat(center - bar_length) + &"█".repeat(bar_length), " ".repeat(center))
    } else {
        (" ".repeat(center), "█".repeat(bar_length) + &" ".repeat(center - bar_length))
    };

    format!("{}|{}", left, right)
}
