//! Countdown state shared by the controller and the progress animator.
//!
//! [`TimerState`] is a plain value: it is copied into observers, into the
//! render [`Snapshot`](crate::app::Snapshot) and into the progress target
//! computation. Only [`crate::timer::Model`] mutates it.

use std::fmt;

/// Duration a fresh timer starts with.
pub const DEFAULT_TOTAL_SECONDS: u32 = 60;

/// The countdown's complete state.
///
/// # Invariants
///
/// - `total_seconds >= 1`
/// - `seconds_remaining <= total_seconds`
/// - `running` implies `seconds_remaining > 0`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerState {
    /// Whether the countdown is ticking.
    pub running: bool,
    /// Configured duration in seconds.
    pub total_seconds: u32,
    /// Seconds left before the countdown finishes.
    pub seconds_remaining: u32,
}

/// Coarse classification of a [`TimerState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Not running, remaining equals total.
    Idle,
    /// Counting down.
    Running,
    /// Not running, remaining is zero.
    Finished,
    /// Not running with `0 < remaining < total`.
    ///
    /// No controller operation produces this: stopping always resets.
    /// It only exists so a stop-without-reset path would be visible here.
    PausedDrift,
}

/// What the single GO/RESET control currently does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleLabel {
    /// Pressing starts the countdown.
    Go,
    /// Pressing stops and/or restores the full duration.
    Reset,
}

impl TimerState {
    /// Creates an idle state with the given duration, clamped to at least one second.
    pub fn idle(total_seconds: u32) -> Self {
        let total_seconds = total_seconds.max(1);
        Self {
            running: false,
            total_seconds,
            seconds_remaining: total_seconds,
        }
    }

    /// Returns true when the remaining time differs from the configured duration.
    pub fn drifted(&self) -> bool {
        self.seconds_remaining != self.total_seconds
    }

    pub fn phase(&self) -> Phase {
        if self.running {
            Phase::Running
        } else if !self.drifted() {
            Phase::Idle
        } else if self.seconds_remaining == 0 {
            Phase::Finished
        } else {
            Phase::PausedDrift
        }
    }

    pub fn is_finished(&self) -> bool {
        self.phase() == Phase::Finished
    }

    /// The label for the GO/RESET control.
    pub fn label(&self) -> ToggleLabel {
        if self.running || self.drifted() {
            ToggleLabel::Reset
        } else {
            ToggleLabel::Go
        }
    }

    /// Duration adjustments are only accepted while stopped.
    pub fn can_adjust_duration(&self) -> bool {
        !self.running
    }

    /// Remaining time as `M:SS`. Minutes are not wrapped into hours.
    pub fn formatted_remaining(&self) -> String {
        format_seconds(self.seconds_remaining)
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::idle(DEFAULT_TOTAL_SECONDS)
    }
}

impl fmt::Display for ToggleLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToggleLabel::Go => f.write_str("GO"),
            ToggleLabel::Reset => f.write_str("RESET"),
        }
    }
}

/// Formats a second count as `M:SS`.
///
/// ```rust
/// use bubbletea_countdown::state::format_seconds;
///
/// assert_eq!(format_seconds(65), "1:05");
/// assert_eq!(format_seconds(7200), "120:00");
/// ```
pub fn format_seconds(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
