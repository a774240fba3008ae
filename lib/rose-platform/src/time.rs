use std::time::{Duration, Instant};

use histo::Histogram;

use crate::circbuffer::CircBuffer;
use crate::config::TimingConfig;

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct FrameTime {
    /// Number of the frame being processed, starting at 1.
    pub frame: u64,
    pub elapsed: Duration,
    pub delta: Duration,
}

impl FrameTime {
    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }
}

#[derive(Debug, Clone)]
pub struct FrameStats {
    delta_circ: CircBuffer<f32>,
    delta_hist: Histogram,
    samples: u64,
}

impl FrameStats {
    pub fn new(history: usize) -> Self {
        Self {
            delta_circ: CircBuffer::new(history),
            delta_hist: Histogram::with_buckets(100),
            samples: 0,
        }
    }

    /// Lower bound, in microseconds, of the histogram bucket holding the `pc`th
    /// percentile of frame deltas.
    pub fn percentile_micros(&self, pc: u64) -> u64 {
        if self.samples == 0 {
            return 0;
        }
        let target = self.samples * pc.min(100) / 100;
        let mut seen = 0;
        for bucket in self.delta_hist.buckets() {
            seen += bucket.count();
            if seen >= target && bucket.count() > 0 {
                return bucket.start();
            }
        }
        0
    }

    /// Mean frame delta in seconds over the retained history.
    pub fn average_delta(&self) -> f32 {
        if self.delta_circ.is_empty() {
            return 0.;
        }
        self.delta_circ.iter().sum::<f32>() / self.delta_circ.len() as f32
    }

    /// Most recent frame delta in seconds.
    pub fn latest_delta(&self) -> f32 {
        self.delta_circ.latest().copied().unwrap_or(0.)
    }

    pub fn fps_average(&self) -> f32 {
        let avg = self.average_delta();
        if avg > 0. {
            avg.recip()
        } else {
            0.
        }
    }

    pub fn delta_history(&self) -> impl '_ + Iterator<Item = f32> {
        self.delta_circ.iter().copied()
    }

    fn add_frame_delta(&mut self, delta: Duration) {
        self.delta_hist.add(delta.as_micros() as _);
        self.samples += 1;
        self.delta_circ.add(delta.as_secs_f32());
    }
}

/// Stamps frames. With a fixed delta configured, time advances by exactly that amount per
/// frame regardless of the wall clock.
#[derive(Debug, Clone)]
pub(crate) struct FrameClock {
    start: Instant,
    last_tick: Option<Instant>,
    fixed_delta: Option<Duration>,
    current: FrameTime,
    stats: FrameStats,
}

impl FrameClock {
    pub(crate) fn new(config: &TimingConfig) -> Self {
        Self {
            start: Instant::now(),
            last_tick: None,
            fixed_delta: config.fixed_delta.and_then(|secs| {
                let fixed = Duration::try_from_secs_f32(secs).ok();
                if fixed.is_none() {
                    tracing::warn!(secs, "Ignoring invalid fixed delta, using the wall clock");
                }
                fixed
            }),
            current: FrameTime::default(),
            stats: FrameStats::new(config.history),
        }
    }

    pub(crate) fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let (elapsed, delta) = match self.fixed_delta {
            Some(fixed) => (self.current.elapsed + fixed, fixed),
            None => (
                now - self.start,
                self.last_tick.map_or(Duration::ZERO, |last| now - last),
            ),
        };
        self.last_tick = Some(now);
        self.current = FrameTime {
            frame: self.current.frame + 1,
            elapsed,
            delta,
        };
        if self.current.frame > 1 {
            self.stats.add_frame_delta(delta);
        }
        self.current
    }

    pub(crate) fn current(&self) -> FrameTime {
        self.current
    }

    pub(crate) fn stats(&self) -> &FrameStats {
        &self.stats
    }
}
