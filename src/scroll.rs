//! Adaptive scroll-to-bottom loop for lazily loaded lists
//!
//! Lazy lists only render more items once the viewport approaches their end,
//! and load latency varies, so a fixed number of scroll steps is unreliable.
//! The loop instead keeps stepping until the container's content height has
//! stayed the same for longer than an idle timeout.
//!
//! The loop is a two-state machine ([`ScrollPhase`]): `Loading` right after a
//! height change, `IdleTimingOut` while the height holds still. Height reads
//! and time are injected through [`ScrollTarget`] and [`Clock`], so the
//! termination rules can be exercised without a browser.

use std::fmt::Display;
use std::time::{Duration, Instant};

/// Something that can be scrolled and measured, usually a page element
pub trait ScrollTarget {
    type Error: Display;

    /// Advance the scroll offset by `step` pixels and return the new offset
    fn scroll_by(&mut self, step: u32) -> Result<u64, Self::Error>;

    /// Total scrollable extent of the target
    fn content_height(&mut self) -> Result<u64, Self::Error>;
}

/// Time source for the loop
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

/// Wall clock with blocking sleeps
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Tunables for [`scroll_until_idle`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollOptions {
    /// Pixels added to the scroll offset per step
    pub step: u32,
    /// Wait between a step and the following height read
    pub delay: Duration,
    /// How long the height may stay unchanged before the list counts as loaded
    pub idle_timeout: Duration,
    /// Hard bound on the number of steps
    pub max_steps: Option<u64>,
    /// Whether a shrinking height counts as new content
    pub shrink_resets_timer: bool,
}

impl Default for ScrollOptions {
    fn default() -> Self {
        Self {
            step: 100,
            delay: Duration::from_millis(100),
            idle_timeout: Duration::from_secs(40),
            max_steps: None,
            shrink_resets_timer: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollPhase {
    /// The last read showed a height change
    Loading,
    /// Height unchanged since `since`
    IdleTimingOut { since: Instant },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Continue,
    Exhausted,
}

/// Mutable loop state, discarded when the loop exits
#[derive(Debug, Clone)]
pub struct ScrollState {
    pub current_offset: u64,
    pub last_observed_height: u64,
    pub last_change: Instant,
    pub phase: ScrollPhase,
}

impl ScrollState {
    /// Fresh state: no height seen yet (0) and the idle timer starting at `started`
    pub fn new(started: Instant) -> Self {
        Self {
            current_offset: 0,
            last_observed_height: 0,
            last_change: started,
            phase: ScrollPhase::Loading,
        }
    }

    /// Feed one height reading taken at `now` and decide whether to go on.
    pub fn observe(&mut self, height: u64, now: Instant, options: &ScrollOptions) -> Verdict {
        if height != self.last_observed_height {
            let shrank = height < self.last_observed_height;
            self.last_observed_height = height;
            if !shrank || options.shrink_resets_timer {
                self.last_change = now;
                self.phase = ScrollPhase::Loading;
                return Verdict::Continue;
            }
        }

        self.phase = ScrollPhase::IdleTimingOut {
            since: self.last_change,
        };
        if self.idle_for(now) > options.idle_timeout {
            Verdict::Exhausted
        } else {
            Verdict::Continue
        }
    }

    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_change)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrollOutcome {
    /// Height held still for longer than the idle timeout
    Exhausted,
    /// `max_steps` reached
    StepLimit,
    /// Scrolling or measuring failed; whatever loaded so far stays
    Aborted(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollReport {
    pub outcome: ScrollOutcome,
    pub steps: u64,
    pub final_offset: u64,
    pub final_height: u64,
    pub elapsed: Duration,
}

/// Scroll `target` until its content stops growing.
///
/// Errors from the target are logged and end the loop early; they are never
/// returned. A target whose height never changes is scrolled for the full
/// idle timeout.
pub fn scroll_until_idle<T, C>(target: &mut T, clock: &C, options: &ScrollOptions) -> ScrollReport
where
    T: ScrollTarget + ?Sized,
    C: Clock + ?Sized,
{
    let started = clock.now();
    let mut state = ScrollState::new(started);
    let mut steps = 0u64;

    let outcome = loop {
        if options.max_steps.is_some_and(|max| steps >= max) {
            log::info!("Stopped scrolling after {} steps", steps);
            break ScrollOutcome::StepLimit;
        }

        match target.scroll_by(options.step) {
            Ok(offset) => state.current_offset = offset,
            Err(e) => {
                log::error!("An error occurred while scrolling: {}", e);
                break ScrollOutcome::Aborted(e.to_string());
            }
        }
        steps += 1;

        clock.sleep(options.delay);

        let height = match target.content_height() {
            Ok(height) => height,
            Err(e) => {
                log::error!("An error occurred while measuring the scroll container: {}", e);
                break ScrollOutcome::Aborted(e.to_string());
            }
        };
        log::debug!("Scrolled to position: {}/{}", state.current_offset, height);

        let now = clock.now();
        if state.observe(height, now, options) == Verdict::Exhausted {
            log::info!(
                "Content height stayed at {} for {:?}; reached the end of the scrollable container",
                height,
                state.idle_for(now)
            );
            break ScrollOutcome::Exhausted;
        }
    };

    ScrollReport {
        outcome,
        steps,
        final_offset: state.current_offset,
        final_height: state.last_observed_height,
        elapsed: clock.now().saturating_duration_since(started),
    }
}
