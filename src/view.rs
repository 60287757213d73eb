//! Text rendering of the cassette.
//!
//! Everything here is a pure function of [`SessionState`] and the viewport so
//! the terminal layer only has to paint the returned string.

use crate::session::{SessionState, FRAME_COUNT};
use std::time::Duration;
use unicode_width::UnicodeWidthStr;

const MAX_MINUTES: f64 = 999.0;
const SIDE_WIDTH: usize = 4;
/// Shown when the label does not fit on the cassette's side sticker.
pub const SIDE_OVERFLOW: &str = "ZZZZ";

/// Dotted tape on the top/bottom of the window, one pair per frame.
const SPOOL_FRAMES: [[&str; 2]; FRAME_COUNT] = [
    ["·····", "     "],
    [" ····", "    ·"],
    ["  ···", "   ··"],
    ["   ··", "  ···"],
    ["    ·", " ····"],
    ["     ", "·····"],
    ["·    ", "···· "],
    ["··   ", "···  "],
    ["···  ", "··   "],
    ["···· ", "·    "],
];

/// Terminal size in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Spool pattern for `frame`; anything out of range shows the first frame.
pub fn spool_frame(frame: usize) -> [&'static str; 2] {
    SPOOL_FRAMES.get(frame).copied().unwrap_or(SPOOL_FRAMES[0])
}

/// Minutes rounded to the nearest whole number (ties to even), right-justified
/// to three columns and capped at 999.
pub fn format_minutes(elapsed: Duration) -> String {
    let minutes = (elapsed.as_secs_f64() / 60.0)
        .round_ties_even()
        .min(MAX_MINUTES);
    format!("{minutes:>3.0}")
}

/// Label without its extension, padded to the sticker width.
pub fn side_label(label: &str, extension: &str) -> String {
    let side = label.strip_suffix(extension).unwrap_or(label);
    if side.chars().count() > SIDE_WIDTH {
        return SIDE_OVERFLOW.to_string();
    }
    format!("{side:<SIDE_WIDTH$}")
}

/// The cassette, one string per row.
pub fn tape_lines(state: &SessionState, extension: &str) -> Vec<String> {
    let [top, bottom] = spool_frame(state.frame_index());
    let minutes = format_minutes(state.elapsed());
    let side = side_label(state.label(), extension);
    vec![
        r".------------------------.".to_string(),
        format!(r"|\\////////      {minutes} min |"),
        r"| \/  __  ______  __     |".to_string(),
        format!(r"|    /  \|\{top}|/  \    |"),
        format!(r"|    \  /|/{bottom}|\  /    |"),
        format!("| {side}‾‾  ‾‾‾‾‾‾  ‾‾     |"),
        r"|    ________________    |".to_string(),
        r"|___/_._o________o_._\___|".to_string(),
    ]
}

/// Tape centered in the viewport, or nothing until the size is known.
pub fn render(state: &SessionState, extension: &str, viewport: Option<Viewport>) -> String {
    let Some(viewport) = viewport else {
        return String::new();
    };
    place_center(&tape_lines(state, extension), viewport)
}

fn place_center(lines: &[String], viewport: Viewport) -> String {
    let content_width = lines
        .iter()
        .map(|line| UnicodeWidthStr::width(line.as_str()))
        .max()
        .unwrap_or(0);
    let left = usize::from(viewport.width).saturating_sub(content_width) / 2;
    let top = usize::from(viewport.height).saturating_sub(lines.len()) / 2;

    let mut out = String::new();
    for _ in 0..top {
        out.push('\n');
    }
    let indent = " ".repeat(left);
    let body: Vec<String> = lines.iter().map(|line| format!("{indent}{line}")).collect();
    out.push_str(&body.join("\n"));
    out
}
