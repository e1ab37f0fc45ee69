//! Key bindings for the countdown.
//!
//! A [`Binding`] groups the key presses that trigger one action together
//! with the text shown for it in the help line. Disabled bindings never
//! match and are skipped by [`crate::help`].
//!
//! ```rust
//! use bubbletea_countdown::key::Binding;
//! use bubbletea_rs::KeyMsg;
//! use crossterm::event::{KeyCode, KeyModifiers};
//!
//! let quit = Binding::new(vec![KeyCode::Char('q')]).with_help("q", "quit");
//! let msg = KeyMsg { key: KeyCode::Char('q'), modifiers: KeyModifiers::NONE };
//! assert!(quit.matches(&msg));
//! ```

use crate::timer::Command;
use bubbletea_rs::KeyMsg;
use crossterm::event::{KeyCode, KeyModifiers};

/// A single key with the modifiers it requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyPress {
    /// Keys declared without modifiers still match when shift is held, so
    /// `Char('S')` works however the terminal reports it. Control and alt
    /// must match exactly.
    fn matches(&self, msg: &KeyMsg) -> bool {
        if self.code != msg.key {
            return false;
        }
        let strict = KeyModifiers::CONTROL | KeyModifiers::ALT;
        msg.modifiers.intersection(strict) == self.modifiers.intersection(strict)
            && msg.modifiers.contains(self.modifiers)
    }
}

impl From<KeyCode> for KeyPress {
    fn from(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }
}

impl From<(KeyCode, KeyModifiers)> for KeyPress {
    fn from((code, modifiers): (KeyCode, KeyModifiers)) -> Self {
        Self { code, modifiers }
    }
}

/// Help text for a binding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Help {
    pub key: String,
    pub desc: String,
}

#[derive(Debug, Clone)]
pub struct Binding {
    keys: Vec<KeyPress>,
    help: Help,
    enabled: bool,
}

impl Binding {
    pub fn new<K: Into<KeyPress>>(keys: Vec<K>) -> Self {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            help: Help::default(),
            enabled: true,
        }
    }

    pub fn with_help(mut self, key: impl Into<String>, desc: impl Into<String>) -> Self {
        self.help = Help {
            key: key.into(),
            desc: desc.into(),
        };
        self
    }

    pub fn help(&self) -> &Help {
        &self.help
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn matches(&self, msg: &KeyMsg) -> bool {
        self.enabled && self.keys.iter().any(|k| k.matches(msg))
    }
}

/// Supplies bindings to the help view.
pub trait KeyMap {
    fn short_help(&self) -> Vec<&Binding>;
    fn full_help(&self) -> Vec<Vec<&Binding>>;
}

/// Bindings for the five countdown commands and quitting.
#[derive(Debug, Clone)]
pub struct CountdownKeyMap {
    pub increment_seconds: Binding,
    pub decrement_seconds: Binding,
    pub increment_minutes: Binding,
    pub decrement_minutes: Binding,
    pub toggle: Binding,
    pub show_full_help: Binding,
    pub quit: Binding,
}

impl Default for CountdownKeyMap {
    fn default() -> Self {
        Self {
            increment_seconds: Binding::new(vec![KeyCode::Char('s'), KeyCode::Char('+')])
                .with_help("s/+", "+1 sec"),
            decrement_seconds: Binding::new(vec![KeyCode::Char('S'), KeyCode::Char('-')])
                .with_help("S/-", "-1 sec"),
            increment_minutes: Binding::new(vec![KeyCode::Char('m'), KeyCode::Right])
                .with_help("m/→", "+1 min"),
            decrement_minutes: Binding::new(vec![KeyCode::Char('M'), KeyCode::Left])
                .with_help("M/←", "-1 min"),
            toggle: Binding::new(vec![KeyCode::Enter, KeyCode::Char(' ')])
                .with_help("enter", "go/reset"),
            show_full_help: Binding::new(vec![KeyCode::Char('?')]).with_help("?", "more"),
            quit: Binding::new(vec![
                KeyPress::from(KeyCode::Char('q')),
                KeyPress::from(KeyCode::Esc),
                KeyPress::from((KeyCode::Char('c'), KeyModifiers::CONTROL)),
            ])
            .with_help("q", "quit"),
        }
    }
}

impl CountdownKeyMap {
    /// Enables or disables the duration bindings to follow the countdown.
    pub fn set_running(&mut self, running: bool) {
        for binding in [
            &mut self.increment_seconds,
            &mut self.decrement_seconds,
            &mut self.increment_minutes,
            &mut self.decrement_minutes,
        ] {
            binding.set_enabled(!running);
        }
    }

    /// The controller command bound to `msg`, if any.
    pub fn command_for(&self, msg: &KeyMsg) -> Option<Command> {
        if self.toggle.matches(msg) {
            Some(Command::Toggle)
        } else if self.increment_seconds.matches(msg) {
            Some(Command::IncrementSeconds)
        } else if self.decrement_seconds.matches(msg) {
            Some(Command::DecrementSeconds)
        } else if self.increment_minutes.matches(msg) {
            Some(Command::IncrementMinutes)
        } else if self.decrement_minutes.matches(msg) {
            Some(Command::DecrementMinutes)
        } else {
            None
        }
    }
}

impl KeyMap for CountdownKeyMap {
    fn short_help(&self) -> Vec<&Binding> {
        vec![
            &self.toggle,
            &self.increment_seconds,
            &self.decrement_seconds,
            &self.increment_minutes,
            &self.decrement_minutes,
            &self.quit,
            &self.show_full_help,
        ]
    }

    fn full_help(&self) -> Vec<Vec<&Binding>> {
        vec![
            vec![&self.increment_seconds, &self.decrement_seconds],
            vec![&self.increment_minutes, &self.decrement_minutes],
            vec![&self.toggle, &self.quit, &self.show_full_help],
        ]
    }
}
