//! Progress indicator for the countdown.
//!
//! Two layers live here:
//!
//! - Pure functions. [`target_fraction`] derives the fill fraction a
//!   [`TimerState`] should show, and [`interpolate`] moves linearly from a
//!   previous value toward a target over [`ANIMATION_DURATION`].
//! - [`Model`], an animated indicator that re-runs the interpolation on
//!   [`FrameMsg`] frames whenever its target changes and renders either a
//!   horizontal bar or a ring of segments.
//!
//! # Basic Usage
//!
//! ```rust
//! use bubbletea_countdown::progress::{new, with_width, with_ring};
//!
//! let bar = new(&[with_width(50)]);
//! let ring = new(&[with_ring(24)]);
//! ```
//!
//! # Animation
//!
//! ```rust
//! use bubbletea_countdown::progress::{new, target_fraction};
//! use bubbletea_countdown::state::TimerState;
//!
//! let mut progress = new(&[]);
//! progress.jump_to(1.0);
//!
//! let running = TimerState { running: true, total_seconds: 60, seconds_remaining: 60 };
//! let cmd = progress.set_target(target_fraction(&running));
//! assert!(cmd.is_some());
//! assert!(progress.is_animating());
//! ```

use crate::state::TimerState;
use bubbletea_rs::{tick as bubbletea_tick, Cmd, Model as BubbleTeaModel, Msg};
use lipgloss_extras::lipgloss;
use lipgloss_extras::lipgloss::blending::blend_1d;
use lipgloss_extras::lipgloss::{Color as LGColor, Style};
use std::f64::consts::PI;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;
use tracing::trace;
use unicode_width::UnicodeWidthStr;

// Internal ID management for progress instances
static LAST_ID: AtomicI64 = AtomicI64::new(0);

fn next_id() -> i64 {
    LAST_ID.fetch_add(1, Ordering::SeqCst) + 1
}

const FPS: u32 = 60;
const DEFAULT_WIDTH: i32 = 40;
const DEFAULT_RING_SEGMENTS: usize = 24;
const RING_RADIUS_X: f64 = 10.0;
const RING_RADIUS_Y: f64 = 5.0;

/// Time the indicator takes to reach a new target.
pub const ANIMATION_DURATION: Duration = Duration::from_secs(1);

/// The fraction the indicator should settle on for `state`.
///
/// Idle shows a full indicator and finished shows an empty one. While
/// running the fraction is one second ahead of the displayed time, so the
/// sweep reaches empty exactly when the last tick fires.
pub fn target_fraction(state: &TimerState) -> f64 {
    if !state.running {
        if state.drifted() {
            return 0.0;
        }
        return 1.0;
    }
    let ahead = state.seconds_remaining.saturating_sub(1) as f64;
    (ahead / state.total_seconds.max(1) as f64).clamp(0.0, 1.0)
}

/// Linear interpolation from `previous` to `target` over [`ANIMATION_DURATION`].
pub fn interpolate(previous: f64, target: f64, elapsed: Duration) -> f64 {
    interpolate_over(previous, target, elapsed, ANIMATION_DURATION)
}

/// Linear interpolation from `previous` to `target` over `duration`.
///
/// The result never leaves the segment between the two endpoints, nor
/// `[0, 1]`, and equals `target` once `elapsed >= duration`.
pub fn interpolate_over(previous: f64, target: f64, elapsed: Duration, duration: Duration) -> f64 {
    let previous = previous.clamp(0.0, 1.0);
    let target = target.clamp(0.0, 1.0);
    if duration.is_zero() || elapsed >= duration {
        return target;
    }

    let t = elapsed.as_secs_f64() / duration.as_secs_f64();
    let value = previous + (target - previous) * t;
    let (lo, hi) = if previous <= target {
        (previous, target)
    } else {
        (target, previous)
    };
    value.clamp(lo, hi)
}

/// How the indicator is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// A horizontal bar `width` cells wide.
    Bar,
    /// A ring of the given number of segments, filled clockwise from the top.
    Ring(usize),
}

/// Configuration options for the indicator.
pub enum ProgressOption {
    WithDefaultGradient,
    WithGradient(String, String),
    WithSolidFill(String),
    WithFillCharacters(char, char),
    WithoutPercentage,
    WithWidth(i32),
    WithRing(usize),
    WithAnimationDuration(Duration),
}

impl ProgressOption {
    fn apply(&self, m: &mut Model) {
        match self {
            ProgressOption::WithDefaultGradient => {
                m.set_ramp("#5A56E0".to_string(), "#EE6FF8".to_string());
            }
            ProgressOption::WithGradient(color_a, color_b) => {
                m.set_ramp(color_a.clone(), color_b.clone());
            }
            ProgressOption::WithSolidFill(color) => {
                m.full_color = color.clone();
                m.use_ramp = false;
            }
            ProgressOption::WithFillCharacters(full, empty) => {
                m.full = *full;
                m.empty = *empty;
            }
            ProgressOption::WithoutPercentage => {
                m.show_percentage = false;
            }
            ProgressOption::WithWidth(width) => {
                m.width = *width;
            }
            ProgressOption::WithRing(segments) => {
                m.shape = Shape::Ring((*segments).max(1));
            }
            ProgressOption::WithAnimationDuration(duration) => {
                m.duration = *duration;
            }
        }
    }
}

pub fn with_default_gradient() -> ProgressOption {
    ProgressOption::WithDefaultGradient
}

pub fn with_gradient(color_a: String, color_b: String) -> ProgressOption {
    ProgressOption::WithGradient(color_a, color_b)
}

pub fn with_solid_fill(color: String) -> ProgressOption {
    ProgressOption::WithSolidFill(color)
}

pub fn with_fill_characters(full: char, empty: char) -> ProgressOption {
    ProgressOption::WithFillCharacters(full, empty)
}

pub fn without_percentage() -> ProgressOption {
    ProgressOption::WithoutPercentage
}

pub fn with_width(w: i32) -> ProgressOption {
    ProgressOption::WithWidth(w)
}

/// Draws a ring of `segments` instead of a bar.
pub fn with_ring(segments: usize) -> ProgressOption {
    ProgressOption::WithRing(segments)
}

pub fn with_default_ring() -> ProgressOption {
    ProgressOption::WithRing(DEFAULT_RING_SEGMENTS)
}

pub fn with_animation_duration(duration: Duration) -> ProgressOption {
    ProgressOption::WithAnimationDuration(duration)
}

/// One animation frame for the indicator with the matching id.
#[derive(Debug, Clone)]
pub struct FrameMsg {
    id: i64,
    tag: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cell {
    Blank,
    Full,
    Empty,
}

/// The animated indicator.
#[derive(Debug, Clone)]
pub struct Model {
    id: i64,

    // Bumped on every retarget so frames from an older animation are dropped.
    tag: i64,

    pub width: i32,
    pub shape: Shape,

    pub full: char,
    pub full_color: String,

    pub empty: char,
    pub empty_color: String,

    pub show_percentage: bool,
    pub percentage_style: Style,

    duration: Duration,
    from: f64,
    shown: f64,
    target: f64,
    elapsed: Duration,

    use_ramp: bool,
    ramp_color_a: String,
    ramp_color_b: String,
}

/// Creates an indicator showing 0 with the given options applied.
pub fn new(opts: &[ProgressOption]) -> Model {
    let mut m = Model {
        id: next_id(),
        tag: 0,
        width: DEFAULT_WIDTH,
        shape: Shape::Bar,
        full: '█',
        full_color: "#7571F9".to_string(),
        empty: '░',
        empty_color: "#606060".to_string(),
        show_percentage: true,
        percentage_style: Style::new(),
        duration: ANIMATION_DURATION,
        from: 0.0,
        shown: 0.0,
        target: 0.0,
        elapsed: Duration::ZERO,
        use_ramp: false,
        ramp_color_a: String::new(),
        ramp_color_b: String::new(),
    };

    for opt in opts {
        opt.apply(&mut m);
    }

    m
}

impl Model {
    pub fn id(&self) -> i64 {
        self.id
    }

    /// The value currently displayed.
    pub fn shown(&self) -> f64 {
        self.shown
    }

    /// The value being animated toward.
    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Starts animating from the displayed value toward `p`.
    ///
    /// Returns `None` when `p` is already the target.
    pub fn set_target(&mut self, p: f64) -> Option<Cmd> {
        let p = p.clamp(0.0, 1.0);
        if p == self.target {
            return None;
        }

        self.from = self.shown;
        self.target = p;
        self.elapsed = Duration::ZERO;
        self.tag += 1;
        trace!(id = self.id, from = self.from, target = p, "progress retargeted");
        Some(self.next_frame())
    }

    /// Shows `p` immediately, cancelling any running animation.
    pub fn jump_to(&mut self, p: f64) {
        let p = p.clamp(0.0, 1.0);
        self.from = p;
        self.shown = p;
        self.target = p;
        self.elapsed = self.duration;
        self.tag += 1;
    }

    /// Advances the animation by `dt` without going through the runtime.
    pub fn advance(&mut self, dt: Duration) {
        if !self.is_animating() {
            return;
        }
        self.elapsed = self.elapsed.saturating_add(dt);
        self.shown = interpolate_over(self.from, self.target, self.elapsed, self.duration);
    }

    pub fn is_animating(&self) -> bool {
        self.shown != self.target
    }

    pub fn update(&mut self, msg: Msg) -> Option<Cmd> {
        if let Some(frame_msg) = msg.downcast_ref::<FrameMsg>() {
            if frame_msg.id != self.id || frame_msg.tag != self.tag {
                return None;
            }

            if !self.is_animating() {
                return None;
            }

            self.advance(frame_interval());
            if self.is_animating() {
                return Some(self.next_frame());
            }
        }

        None
    }

    pub fn view(&self) -> String {
        self.view_as(self.shown, "")
    }

    /// Renders `percent`, placing `label` in the middle of a ring.
    ///
    /// Bars ignore the label.
    pub fn view_as(&self, percent: f64, label: &str) -> String {
        let percent = percent.clamp(0.0, 1.0);
        match self.shape {
            Shape::Bar => {
                let percent_view = self.percentage_view(percent);
                let percent_width = lipgloss::width_visible(&percent_view) as i32;
                let bar_view = self.bar_view(percent, percent_width);
                format!("{}{}", bar_view, percent_view)
            }
            Shape::Ring(segments) => self.ring_view(percent, segments, label),
        }
    }

    fn next_frame(&self) -> Cmd {
        let id = self.id;
        let tag = self.tag;
        bubbletea_tick(frame_interval(), move |_| Box::new(FrameMsg { id, tag }) as Msg)
    }

    /// The frame the runtime would deliver next for the current animation.
    #[cfg(test)]
    pub(crate) fn pending_frame(&self) -> FrameMsg {
        FrameMsg {
            id: self.id,
            tag: self.tag,
        }
    }

    fn fill_colors(&self, count: usize) -> Vec<LGColor> {
        if self.use_ramp {
            let start = LGColor::from(self.ramp_color_a.as_str());
            let end = LGColor::from(self.ramp_color_b.as_str());
            blend_1d(count.max(2), vec![start, end])
        } else {
            vec![LGColor::from(self.full_color.as_str()); count.max(1)]
        }
    }

    fn bar_view(&self, percent: f64, text_width: i32) -> String {
        let tw = std::cmp::max(0, self.width - text_width); // total width
        let fw = std::cmp::max(0, std::cmp::min(tw, ((tw as f64) * percent).round() as i32)); // filled width

        let mut result = String::new();
        let colors = self.fill_colors(tw as usize);
        for i in 0..fw as usize {
            let color = colors[std::cmp::min(i, colors.len() - 1)].clone();
            result.push_str(&Style::new().foreground(color).render(&self.full.to_string()));
        }

        let empty_styled = Style::new()
            .foreground(LGColor::from(self.empty_color.as_str()))
            .render(&self.empty.to_string());
        let n = std::cmp::max(0, tw - fw);
        result.push_str(&empty_styled.repeat(n as usize));

        result
    }

    fn ring_cells(percent: f64, segments: usize) -> Vec<Vec<(Cell, usize)>> {
        let rows = (RING_RADIUS_Y * 2.0) as usize + 1;
        let cols = (RING_RADIUS_X * 2.0) as usize + 1;
        let mut grid = vec![vec![(Cell::Blank, 0usize); cols]; rows];
        let filled = ((segments as f64) * percent).round() as usize;

        // Empty segments first so a filled one wins when two share a cell.
        let mut order: Vec<usize> = (filled..segments).collect();
        order.extend(0..filled.min(segments));
        for i in order {
            let angle = 2.0 * PI * (i as f64) / (segments as f64) - PI / 2.0;
            let x = (RING_RADIUS_X + RING_RADIUS_X * angle.cos()).round() as usize;
            let y = (RING_RADIUS_Y + RING_RADIUS_Y * angle.sin()).round() as usize;
            let cell = if i < filled { Cell::Full } else { Cell::Empty };
            grid[y.min(rows - 1)][x.min(cols - 1)] = (cell, i);
        }
        grid
    }

    fn ring_view(&self, percent: f64, segments: usize, label: &str) -> String {
        let grid = Self::ring_cells(percent, segments);
        let colors = self.fill_colors(segments);
        let empty_style = Style::new().foreground(LGColor::from(self.empty_color.as_str()));
        let center_row = grid.len() / 2;
        let label_width = UnicodeWidthStr::width(label);
        let label_start = (grid[0].len().saturating_sub(label_width)) / 2;

        let mut lines = Vec::with_capacity(grid.len());
        for (y, row) in grid.iter().enumerate() {
            let mut line = String::new();
            let mut x = 0;
            while x < row.len() {
                if y == center_row && label_width > 0 && x == label_start {
                    line.push_str(label);
                    x += label_width;
                    continue;
                }
                let (cell, index) = row[x];
                match cell {
                    Cell::Blank => line.push(' '),
                    Cell::Full => {
                        let color = colors[std::cmp::min(index, colors.len() - 1)].clone();
                        line.push_str(&Style::new().foreground(color).render(&self.full.to_string()));
                    }
                    Cell::Empty => line.push_str(&empty_style.render(&self.empty.to_string())),
                }
                x += 1;
            }
            lines.push(line.trim_end().to_string());
        }

        if self.show_percentage {
            lines.push(self.percentage_view(percent));
        }
        lines.join("\n")
    }

    fn percentage_view(&self, percent: f64) -> String {
        if !self.show_percentage {
            return String::new();
        }

        let percent = percent.clamp(0.0, 1.0);
        let percentage = format!(" {:3.0}%", percent * 100.0);
        self.percentage_style.render(&percentage)
    }

    fn set_ramp(&mut self, color_a: String, color_b: String) {
        self.use_ramp = true;
        self.ramp_color_a = color_a;
        self.ramp_color_b = color_b;
    }
}

fn frame_interval() -> Duration {
    Duration::from_nanos(1_000_000_000 / FPS as u64)
}

impl BubbleTeaModel for Model {
    fn init() -> (Self, Option<Cmd>) {
        (new(&[]), None)
    }

    fn update(&mut self, msg: Msg) -> Option<Cmd> {
        self.update(msg)
    }

    fn view(&self) -> String {
        self.view()
    }
}

impl Default for Model {
    fn default() -> Self {
        new(&[])
    }
}
