//! The countdown screen as a single Bubble Tea model.
//!
//! [`App`] wires key presses to the [`timer`](crate::timer) controller,
//! keeps the [`progress`](crate::progress) indicator aimed at
//! [`target_fraction`] of the current state, and greys out the duration
//! keys while the countdown runs.
//!
//! Everything the screen shows is captured in a [`Snapshot`]. Callbacks
//! registered with [`App::subscribe`] receive a new snapshot whenever any
//! part of it changes, including every animation frame of the indicator.

use crate::config::{self, Config, IndicatorStyle};
use crate::help;
use crate::key::CountdownKeyMap;
use crate::observer::Observers;
use crate::progress::{self, target_fraction, FrameMsg};
use crate::state::{format_seconds, ToggleLabel};
use crate::timer::{self, Command, FinishedMsg};
use bubbletea_rs::{batch, quit, Cmd, KeyMsg, Model as BubbleTeaModel, Msg, WindowSizeMsg};
use lipgloss_extras::lipgloss;
use lipgloss_extras::prelude::*;
use tracing::{debug, info};

/// Everything the presentation layer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Remaining time as `M:SS`.
    pub formatted_time: String,
    /// Indicator fill currently on screen, in `[0, 1]`.
    pub progress_fraction: f64,
    pub running: bool,
    pub can_adjust_duration: bool,
    pub label: ToggleLabel,
}

#[derive(Debug)]
pub struct App {
    pub timer: timer::Model,
    pub progress: progress::Model,
    pub keys: CountdownKeyMap,
    pub help: help::Model,

    observers: Observers<Snapshot>,
    last_snapshot: Snapshot,
    quitting: bool,
}

/// Builds the screen from `config`, idle with a full indicator.
pub fn new(config: &Config) -> App {
    let timer = timer::new(config.duration);
    let mut progress = match config.style {
        IndicatorStyle::Ring => progress::new(&[
            progress::with_default_ring(),
            progress::with_default_gradient(),
            progress::without_percentage(),
        ]),
        IndicatorStyle::Bar => progress::new(&[
            progress::with_width(config.width),
            progress::with_default_gradient(),
        ]),
    };
    progress.jump_to(target_fraction(&timer.state()));

    let mut app = App {
        timer,
        progress,
        keys: CountdownKeyMap::default(),
        help: help::Model::new(),
        observers: Observers::new(),
        last_snapshot: Snapshot {
            formatted_time: String::new(),
            progress_fraction: 0.0,
            running: false,
            can_adjust_duration: true,
            label: ToggleLabel::Go,
        },
        quitting: false,
    };
    app.last_snapshot = app.snapshot();
    app
}

impl App {
    pub fn snapshot(&self) -> Snapshot {
        let state = self.timer.state();
        Snapshot {
            formatted_time: state.formatted_remaining(),
            progress_fraction: self.progress.shown(),
            running: state.running,
            can_adjust_duration: state.can_adjust_duration(),
            label: state.label(),
        }
    }

    /// Registers a render callback.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&Snapshot) + Send + 'static,
    {
        self.observers.subscribe(callback);
    }

    pub fn quitting(&self) -> bool {
        self.quitting
    }

    /// Runs a controller command and refreshes everything derived from it.
    pub fn handle_command(&mut self, command: Command) -> Option<Cmd> {
        debug!(?command, "command");
        let timer_cmd = self.timer.apply(command);
        let frame_cmd = self.refresh();
        combine(timer_cmd, frame_cmd)
    }

    /// Brings the key map, the indicator target and subscribers up to date
    /// with the timer. Returns the first animation frame if the target moved.
    pub fn refresh(&mut self) -> Option<Cmd> {
        let state = self.timer.state();
        self.keys.set_running(state.running);
        let cmd = self.progress.set_target(target_fraction(&state));
        self.publish();
        cmd
    }

    fn publish(&mut self) {
        let snapshot = self.snapshot();
        if snapshot != self.last_snapshot {
            self.observers.notify(&snapshot);
            self.last_snapshot = snapshot;
        }
    }

    pub fn update(&mut self, msg: Msg) -> Option<Cmd> {
        if let Some(key_msg) = msg.downcast_ref::<KeyMsg>() {
            if self.keys.quit.matches(key_msg) {
                info!("quitting");
                self.timer.cancel();
                self.quitting = true;
                return Some(quit());
            }
            if let Some(command) = self.keys.command_for(key_msg) {
                return self.handle_command(command);
            }
            if self.keys.show_full_help.matches(key_msg) {
                self.help.show_all = !self.help.show_all;
            }
            return None;
        }

        if let Some(size) = msg.downcast_ref::<WindowSizeMsg>() {
            self.help.width = size.width as usize;
            return None;
        }

        if let Some(done) = msg.downcast_ref::<FinishedMsg>() {
            info!(
                total = %format_seconds(done.total_seconds),
                "countdown finished"
            );
            return None;
        }

        if msg.is::<FrameMsg>() {
            let cmd = self.progress.update(msg);
            self.publish();
            return cmd;
        }

        let timer_cmd = self.timer.update(msg);
        let frame_cmd = self.refresh();
        combine(timer_cmd, frame_cmd)
    }

    pub fn view(&self) -> String {
        let snapshot = self.snapshot();
        let time_style = Style::new().bold(true);
        let button_style = Style::new()
            .bold(true)
            .foreground(lipgloss::Color::from("#EE6FF8"));
        let muted = Style::new().foreground(lipgloss::Color::from("#626262"));

        let mut lines = Vec::new();
        match self.progress.shape {
            progress::Shape::Ring(_) => {
                lines.push(
                    self.progress
                        .view_as(snapshot.progress_fraction, &snapshot.formatted_time),
                );
            }
            progress::Shape::Bar => {
                lines.push(time_style.render(&snapshot.formatted_time));
                lines.push(self.progress.view());
            }
        }

        lines.push(String::new());
        lines.push(button_style.render(&format!("[ {} ]", snapshot.label)));
        lines.push(muted.render(&format!(
            "duration {}",
            format_seconds(self.timer.state().total_seconds)
        )));
        lines.push(String::new());
        lines.push(self.help.view(&self.keys));

        lines.join("\n")
    }
}

fn combine(a: Option<Cmd>, b: Option<Cmd>) -> Option<Cmd> {
    match (a, b) {
        (Some(a), Some(b)) => Some(batch(vec![a, b])),
        (a, None) => a,
        (None, b) => b,
    }
}

impl BubbleTeaModel for App {
    fn init() -> (Self, Option<Cmd>) {
        let config = config::current();
        info!(duration = config.duration, style = ?config.style, "countdown ready");
        (new(&config), None)
    }

    fn update(&mut self, msg: Msg) -> Option<Cmd> {
        self.update(msg)
    }

    fn view(&self) -> String {
        self.view()
    }
}

impl Default for App {
    fn default() -> Self {
        new(&Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Phase;
    use crossterm::event::{KeyCode, KeyModifiers};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn key(code: KeyCode) -> Msg {
        Box::new(KeyMsg {
            key: code,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn test_new_app_is_idle_and_full() {
        let app = App::default();
        let snapshot = app.snapshot();
        assert_eq!(snapshot.formatted_time, "1:00");
        assert_eq!(snapshot.progress_fraction, 1.0);
        assert!(!snapshot.running);
        assert!(snapshot.can_adjust_duration);
        assert_eq!(snapshot.label, ToggleLabel::Go);
    }

    #[test]
    fn test_start_retargets_indicator() {
        let mut app = App::default();
        let cmd = app.update(key(KeyCode::Enter));
        assert!(cmd.is_some());
        assert_eq!(app.timer.phase(), Phase::Running);
        assert!((app.progress.target() - 59.0 / 60.0).abs() < 1e-9);
        assert_eq!(app.progress.shown(), 1.0);

        app.progress.advance(Duration::from_millis(500));
        let halfway = 1.0 - (1.0 / 60.0) / 2.0;
        assert!((app.progress.shown() - halfway).abs() < 1e-9);
    }

    #[test]
    fn test_adjust_keys_ignored_while_running() {
        let mut app = App::default();
        let _ = app.update(key(KeyCode::Enter));
        let _ = app.update(key(KeyCode::Char('s')));
        let _ = app.update(key(KeyCode::Right));
        assert_eq!(app.timer.state().total_seconds, 60);
        assert!(!app.snapshot().can_adjust_duration);
    }

    #[test]
    fn test_adjust_keys_change_duration_when_idle() {
        let mut app = App::default();
        let _ = app.update(key(KeyCode::Char('s')));
        let _ = app.update(key(KeyCode::Char('m')));
        assert_eq!(app.snapshot().formatted_time, "2:01");
        let _ = app.update(key(KeyCode::Char('M')));
        let _ = app.update(key(KeyCode::Char('M')));
        assert_eq!(app.snapshot().formatted_time, "0:01");
        // Idle indicator stays full, so no animation is scheduled.
        assert_eq!(app.progress.target(), 1.0);
    }

    #[test]
    fn test_quit_cancels_timer() {
        let mut app = App::default();
        let _ = app.update(key(KeyCode::Enter));
        let cmd = app.update(key(KeyCode::Char('q')));
        assert!(cmd.is_some());
        assert!(app.quitting());
        assert!(!app.timer.running());
    }

    #[test]
    fn test_subscribers_receive_changes() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut app = App::default();
        app.subscribe(move |s: &Snapshot| sink.lock().unwrap().push(s.clone()));

        let _ = app.update(key(KeyCode::Char('x'))); // unbound
        let _ = app.update(key(KeyCode::Enter));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].running);
        assert_eq!(seen[0].label, ToggleLabel::Reset);
    }

    #[test]
    fn test_tick_messages_drive_the_countdown() {
        let mut app = new(&Config {
            duration: 3,
            ..Config::default()
        });
        let _ = app.update(key(KeyCode::Enter));
        let stale = app.timer.pending_tick();

        let cmd = app.update(Box::new(app.timer.pending_tick()));
        assert!(cmd.is_some());
        assert_eq!(app.snapshot().formatted_time, "0:02");
        assert!((app.progress.target() - 1.0 / 3.0).abs() < 1e-9);

        // GO/RESET twice restarts; the tick armed by the first run is dropped.
        let _ = app.update(key(KeyCode::Enter));
        let _ = app.update(key(KeyCode::Enter));
        assert!(app.update(Box::new(stale)).is_none());
        assert_eq!(app.timer.state().seconds_remaining, 3);

        let _ = app.update(Box::new(app.timer.pending_tick()));
        let _ = app.update(Box::new(app.timer.pending_tick()));
        let cmd = app.update(Box::new(app.timer.pending_tick()));
        assert!(cmd.is_some());
        assert_eq!(app.timer.phase(), Phase::Finished);
        assert_eq!(app.snapshot().label, ToggleLabel::Reset);
        assert!(app.keys.increment_seconds.enabled());
    }

    #[test]
    fn test_frame_messages_animate_snapshots() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut app = App::default();
        app.subscribe(move |s: &Snapshot| sink.lock().unwrap().push(s.progress_fraction));

        let _ = app.update(key(KeyCode::Enter));
        let stale = app.progress.pending_frame();

        let mut frames = 0;
        while app.update(Box::new(app.progress.pending_frame())).is_some() {
            frames += 1;
            assert!(frames < 120, "animation never settled");
        }
        assert!(frames > 1);
        assert!((app.progress.shown() - 59.0 / 60.0).abs() < 1e-9);

        let seen = seen.lock().unwrap();
        assert!(seen.len() > 2);
        assert!(seen.windows(2).all(|w| w[1] < w[0]));
        assert!((seen[seen.len() - 1] - 59.0 / 60.0).abs() < 1e-9);
        drop(seen);

        // Resetting retargets, so frames from the finished animation are ignored.
        let _ = app.update(key(KeyCode::Enter));
        let shown = app.progress.shown();
        assert!(app.update(Box::new(stale)).is_none());
        assert_eq!(app.progress.shown(), shown);
    }

    #[test]
    fn test_help_toggle_and_window_size() {
        let mut app = App::default();
        let _ = app.update(key(KeyCode::Char('?')));
        assert!(app.help.show_all);
        let _ = app.update(key(KeyCode::Char('?')));
        assert!(!app.help.show_all);
        assert_eq!(app.timer.state().total_seconds, 60);
        let _ = app.update(key(KeyCode::Char('?')));
        assert!(app.help.show_all);
        let _ = app.update(Box::new(WindowSizeMsg {
            width: 30,
            height: 20,
        }));
        assert_eq!(app.help.width, 30);
    }

    #[test]
    fn test_view_shows_time_and_label() {
        let mut app = App::default();
        let view = String::from_utf8(strip_ansi_escapes::strip(app.view())).unwrap();
        assert!(view.contains("1:00"));
        assert!(view.contains("[ GO ]"));

        let _ = app.update(key(KeyCode::Enter));
        let view = String::from_utf8(strip_ansi_escapes::strip(app.view())).unwrap();
        assert!(view.contains("[ RESET ]"));
    }

    #[test]
    fn test_bar_style_view() {
        let config = Config {
            style: IndicatorStyle::Bar,
            width: 20,
            ..Config::default()
        };
        let app = new(&config);
        let view = String::from_utf8(strip_ansi_escapes::strip(app.view())).unwrap();
        assert!(view.contains(" 100%"));
    }
}
