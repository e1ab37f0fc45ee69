//! # bubbletea-countdown
//!
//! A single-screen countdown timer for [bubbletea-rs](https://github.com/whit3rabbit/bubbletea-rs)
//! applications: set a duration in minute and second steps, press GO, and
//! watch the indicator sweep down to zero.
//!
//! ## Components
//!
//! - [`timer`]: the countdown controller. Owns the [`state::TimerState`],
//!   handles the five commands and drives the one second tick.
//! - [`progress`]: the indicator. [`progress::target_fraction`] and
//!   [`progress::interpolate`] are pure; [`progress::Model`] animates and
//!   renders them as a ring or a bar.
//! - [`key`] and [`help`]: key bindings and the help line.
//! - [`app`]: all of the above as one Bubble Tea model.
//!
//! ## GO / RESET
//!
//! One control does three things depending on the state:
//!
//! | State | Press | Result |
//! |-------|-------|--------|
//! | Running | RESET | stops and restores the full duration |
//! | Finished | RESET | restores the full duration, stays stopped |
//! | Idle | GO | starts counting down |
//!
//! ```rust
//! use bubbletea_countdown::timer::new;
//! use bubbletea_countdown::state::{Phase, ToggleLabel};
//!
//! let mut timer = new(3);
//! let _tick = timer.toggle();
//! while timer.tick() {}
//! assert_eq!(timer.phase(), Phase::Finished);
//! assert_eq!(timer.label(), ToggleLabel::Reset);
//!
//! assert!(timer.toggle().is_none());
//! assert_eq!(timer.phase(), Phase::Idle);
//! assert_eq!(timer.view(), "0:03");
//! ```
//!
//! ## Integration with bubbletea-rs
//!
//! ```rust,no_run
//! use bubbletea_countdown::App;
//! use bubbletea_rs::Program;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let program = Program::<App>::builder().alt_screen(true).build()?;
//! program.run().await?;
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod config;
pub mod error;
pub mod help;
pub mod key;
pub mod observer;
pub mod progress;
pub mod state;
pub mod timer;

pub use app::{App, Snapshot};
pub use config::{Config, IndicatorStyle};
pub use error::{Error, Result};
pub use key::{Binding, CountdownKeyMap, KeyMap, KeyPress};
pub use progress::{interpolate, target_fraction, Model as Progress};
pub use state::{Phase, TimerState, ToggleLabel};
pub use timer::{
    new as timer_new, new_with_interval as timer_new_with_interval, Command,
    CommandMsg as TimerCommandMsg, FinishedMsg as TimerFinishedMsg, Model as Timer,
    TickMsg as TimerTickMsg,
};

/// Prelude module for convenient imports.
///
/// ```rust
/// use bubbletea_countdown::prelude::*;
///
/// let mut timer = timer_new(90);
/// timer.apply(Command::IncrementSeconds);
/// assert_eq!(timer.state().total_seconds, 91);
/// ```
pub mod prelude {
    pub use crate::app::{App, Snapshot};
    pub use crate::key::{Binding, CountdownKeyMap, KeyMap};
    pub use crate::progress::{interpolate, target_fraction, Model as Progress};
    pub use crate::state::{Phase, TimerState, ToggleLabel};
    pub use crate::timer::{new as timer_new, Command, Model as Timer};
}
