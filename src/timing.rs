// Copyright (c) 2024 Marc Pabst
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::io::Write;

use web_time::{Duration, Instant};

use crate::errors::PsyshapeError;

/// The final part of a wait that is spent spinning instead of sleeping.
pub const SPIN_PERIOD: Duration = Duration::from_millis(200);

/// Refresh rate assumed when the display does not report one.
pub const DEFAULT_REFRESH_RATE_HZ: f64 = 60.0;

pub(crate) fn duration_from_secs(secs: f64) -> Result<Duration, PsyshapeError> {
    Duration::try_from_secs_f64(secs).map_err(|_| PsyshapeError::InvalidDuration(secs))
}

/// Block the current thread for `secs` seconds. The last [`SPIN_PERIOD`] of
/// the wait is spent spinning for precise wake-up.
pub fn wait(secs: f64) -> Result<Duration, PsyshapeError> {
    let duration = duration_from_secs(secs)?;
    let start = Instant::now();
    spin_sleep::SpinSleeper::new(SPIN_PERIOD.as_nanos() as u32).sleep(duration);
    Ok(start.elapsed())
}

/// Records the time between consecutive buffer flips.
#[derive(Debug, Clone)]
pub struct FrameIntervalRecorder {
    enabled: bool,
    last_flip: Option<Instant>,
    intervals: Vec<Duration>,
    /// Intervals longer than this count as dropped frames.
    pub refresh_threshold: Duration,
}

impl Default for FrameIntervalRecorder {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_RATE_HZ)
    }
}

impl FrameIntervalRecorder {
    /// Create a disabled recorder for a display refreshing at
    /// `refresh_rate_hz`.
    pub fn new(refresh_rate_hz: f64) -> Self {
        let rate = if refresh_rate_hz.is_finite() && refresh_rate_hz > 0.0 {
            refresh_rate_hz
        } else {
            DEFAULT_REFRESH_RATE_HZ
        };
        Self {
            enabled: false,
            last_flip: None,
            intervals: Vec::new(),
            refresh_threshold: Duration::from_secs_f64(1.2 / rate),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Start or stop recording. Starting resets the reference flip so the
    /// first interval is measured from the next flip on.
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled && !self.enabled {
            self.last_flip = None;
        }
        self.enabled = enabled;
    }

    /// Record a flip happening at `now`.
    pub fn record(&mut self, now: Instant) {
        if !self.enabled {
            return;
        }
        if let Some(last) = self.last_flip {
            let interval = now.saturating_duration_since(last);
            if interval > self.refresh_threshold {
                log::debug!("Dropped frame: {:?} since last flip", interval);
            }
            self.intervals.push(interval);
        }
        self.last_flip = Some(now);
    }

    pub fn intervals(&self) -> &[Duration] {
        &self.intervals
    }

    pub fn mean_interval(&self) -> Option<Duration> {
        if self.intervals.is_empty() {
            return None;
        }
        let total: Duration = self.intervals.iter().sum();
        Some(total / self.intervals.len() as u32)
    }

    /// Number of intervals longer than the refresh threshold.
    pub fn dropped_frames(&self) -> usize {
        self.intervals
            .iter()
            .filter(|i| **i > self.refresh_threshold)
            .count()
    }

    pub fn clear(&mut self) {
        self.intervals.clear();
        self.last_flip = None;
    }

    /// Write the intervals in seconds as a single-column CSV.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), PsyshapeError> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(["interval_s"])?;
        for interval in &self.intervals {
            wtr.write_record([interval.as_secs_f64().to_string()])?;
        }
        wtr.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wait_rejects_invalid_durations() {
        assert!(matches!(wait(-1.0), Err(PsyshapeError::InvalidDuration(_))));
        assert!(matches!(wait(f64::NAN), Err(PsyshapeError::InvalidDuration(_))));
        assert!(matches!(wait(f64::INFINITY), Err(PsyshapeError::InvalidDuration(_))));
        // finite, but longer than a Duration can hold
        assert!(matches!(wait(1e20), Err(PsyshapeError::InvalidDuration(s)) if s == 1e20));
        assert!(matches!(duration_from_secs(1e20), Err(PsyshapeError::InvalidDuration(_))));
        assert_eq!(duration_from_secs(0.0).unwrap(), Duration::ZERO);
    }

    #[test]
    fn wait_blocks_at_least_the_requested_time() {
        let elapsed = wait(0.01).unwrap();
        assert!(elapsed >= Duration::from_millis(10));
    }

    #[test]
    fn disabled_recorder_ignores_flips() {
        let mut rec = FrameIntervalRecorder::default();
        let t0 = Instant::now();
        rec.record(t0);
        rec.record(t0 + Duration::from_millis(16));
        assert!(rec.intervals().is_empty());
        assert_eq!(rec.mean_interval(), None);
    }

    #[test]
    fn records_intervals_between_flips() {
        let mut rec = FrameIntervalRecorder::new(60.0);
        rec.set_enabled(true);
        let t0 = Instant::now();
        rec.record(t0);
        rec.record(t0 + Duration::from_millis(16));
        rec.record(t0 + Duration::from_millis(32));
        rec.record(t0 + Duration::from_millis(82));

        assert_eq!(
            rec.intervals(),
            &[
                Duration::from_millis(16),
                Duration::from_millis(16),
                Duration::from_millis(50)
            ]
        );
        assert_eq!(rec.mean_interval(), Some(Duration::from_millis(82) / 3));
        assert_eq!(rec.dropped_frames(), 1);

        rec.clear();
        assert!(rec.intervals().is_empty());
    }

    #[test]
    fn threshold_follows_refresh_rate() {
        let threshold = FrameIntervalRecorder::new(120.0).refresh_threshold;
        assert!(threshold > Duration::from_micros(9_990) && threshold < Duration::from_micros(10_010));
        // unknown rates fall back to 60 Hz
        assert_eq!(
            FrameIntervalRecorder::new(0.0).refresh_threshold,
            FrameIntervalRecorder::new(60.0).refresh_threshold
        );
    }

    #[test]
    fn writes_csv() {
        let mut rec = FrameIntervalRecorder::default();
        rec.set_enabled(true);
        let t0 = Instant::now();
        rec.record(t0);
        rec.record(t0 + Duration::from_millis(250));

        let mut out = Vec::new();
        rec.write_csv(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "interval_s\n0.25\n");
    }
}
