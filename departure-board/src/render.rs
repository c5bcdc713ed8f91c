//! Presentation boundary.
//!
//! The scheduler decides what is on the board; a [`Renderer`] only draws it
//! and reports whether the user asked to quit.

use std::io::Write;

use chrono::NaiveTime;
use tracing::warn;

use crate::domain::{Crs, DepartureRecord};
use crate::source::Board;
use crate::weather::Temperature;

/// Everything needed to draw one frame.
#[derive(Debug, Clone, Copy)]
pub struct BoardFrame<'a> {
    pub station_code: Crs,
    pub station_name: &'a str,
    /// Platforms of the page on display.
    pub page: &'a [String],
    pub page_index: usize,
    pub page_count: usize,
    /// Departures for this page; `None` until a fetch for it succeeds.
    pub board: Option<&'a Board>,
    pub temperature: Temperature,
    pub clock: NaiveTime,
}

/// What the loop should do after a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Continue,
    Quit,
}

/// Draws frames.
pub trait Renderer {
    fn draw(&mut self, frame: &BoardFrame<'_>) -> RenderOutcome;
}

const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";
/// Clear the screen and home the cursor.
const CLEAR: &str = "\x1b[2J\x1b[H";

/// Plain-text renderer for terminals and logs.
///
/// Writes a snapshot of the board whenever its text changes. The clock is
/// shown to the minute, so an unchanged board is reprinted once a minute.
/// In fullscreen mode each snapshot replaces the previous one instead of
/// scrolling below it.
pub struct TextRenderer<W> {
    out: W,
    color: bool,
    fullscreen: bool,
    last: Option<String>,
}

impl<W: Write> TextRenderer<W> {
    /// `color` highlights delayed departures with ANSI escapes.
    pub fn new(out: W, color: bool) -> Self {
        Self {
            out,
            color,
            fullscreen: false,
            last: None,
        }
    }

    /// Redraw in place, taking over the whole terminal.
    pub fn with_fullscreen(mut self, fullscreen: bool) -> Self {
        self.fullscreen = fullscreen;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn snapshot(&self, frame: &BoardFrame<'_>) -> String {
        let mut text = format!(
            "== {} ({}) ==  page {}/{}\n",
            frame.station_name,
            frame.station_code,
            frame.page_index + 1,
            frame.page_count.max(1)
        );

        match frame.board {
            None => text.push_str("  Fetching departures...\n"),
            Some(board) => {
                for slot in board.platforms() {
                    text.push_str(&format!("Platform {}\n", slot.platform));
                    if slot.departures.is_empty() {
                        text.push_str("  No departures\n");
                    }
                    for record in &slot.departures {
                        self.push_record(&mut text, record);
                    }
                }
            }
        }

        text.push_str(&format!(
            "{}  {}\n",
            frame.clock.format("%H:%M"),
            frame.temperature
        ));
        text
    }

    fn push_record(&self, text: &mut String, record: &DepartureRecord) {
        let status = if self.color && record.status.is_alert() {
            format!("{RED}{}{RESET}", record.status)
        } else {
            record.status.to_string()
        };

        text.push_str(&format!(
            "  {:<5}  {:<24}  Plat {:<3}  {}",
            record.departure_time, record.destination, record.platform, status
        ));
        if let Some(operator) = &record.operator {
            text.push_str(&format!("  ({operator})"));
        }
        text.push('\n');
        if record.has_calling_points() {
            text.push_str(&format!("         Calling at: {}\n", record.calling_at));
        }
    }
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn draw(&mut self, frame: &BoardFrame<'_>) -> RenderOutcome {
        let text = self.snapshot(frame);
        if self.last.as_deref() == Some(text.as_str()) {
            return RenderOutcome::Continue;
        }

        let written = if self.fullscreen {
            write!(self.out, "{CLEAR}{text}")
        } else {
            writeln!(self.out, "{text}")
        }
        .and_then(|()| self.out.flush());

        match written {
            Ok(()) => self.last = Some(text),
            Err(e) => warn!(station = %frame.station_code, error = %e, "failed to draw board"),
        }
        RenderOutcome::Continue
    }
}
