use crate::srt::{SubtitleEntry, SubtitleTrack};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Source of elapsed playback time.
pub trait Clock {
    /// Time since the shared start instant.
    fn elapsed(&self) -> Duration;

    fn sleep(&self, duration: Duration);
}

/// Wall clock anchored at the instant playback started.
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn start_now() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Interrupted,
}

/// Emits each entry of a track once its start time has elapsed.
pub struct SyncPlayer<C> {
    clock: C,
    poll_interval: Duration,
    interrupted: Arc<AtomicBool>,
}

impl<C: Clock> SyncPlayer<C> {
    pub fn new(clock: C, interrupted: Arc<AtomicBool>) -> Self {
        Self {
            clock,
            poll_interval: DEFAULT_POLL_INTERVAL,
            interrupted,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    /// Runs through `track` in order, calling `emit` exactly once per entry.
    ///
    /// Every entry that is due at a poll is emitted back-to-back before the clock is read
    /// again, so a late poll never drops lines. The interruption flag is checked before
    /// each poll and each emission; once it is set nothing more is emitted.
    pub fn run<F, E>(&self, track: &SubtitleTrack, mut emit: F) -> Result<Outcome, E>
    where
        F: FnMut(&SubtitleEntry) -> Result<(), E>,
    {
        let mut index = 0;
        while index < track.len() {
            if self.is_interrupted() {
                return Ok(Outcome::Interrupted);
            }

            let elapsed = self.clock.elapsed();
            if track[index].start() > elapsed {
                self.clock.sleep(self.poll_interval);
                continue;
            }

            while index < track.len() && track[index].start() <= elapsed {
                if self.is_interrupted() {
                    return Ok(Outcome::Interrupted);
                }
                let entry = &track[index];
                log::trace!(
                    "{:.3}s: line due at {:.3}s: {}",
                    elapsed.as_secs_f64(),
                    entry.start_seconds(),
                    entry.text()
                );
                emit(entry)?;
                index += 1;
            }
        }

        if self.is_interrupted() {
            Ok(Outcome::Interrupted)
        } else {
            Ok(Outcome::Completed)
        }
    }
}
