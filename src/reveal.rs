// Copyright (c) 2026 rezky_nightky

use std::time::{Duration, Instant};

use crate::cell::Cell;
use crate::frame::Frame;
use crate::palette::{lerp_u8, resolve_gray, ColorMode};
use crate::timeline::{Action, Timeline};

#[derive(Clone, Copy, Debug)]
pub struct RevealConfig {
    /// Delay before the first header word, in ms from timeline start.
    pub initial_delay: u64,
    /// Stagger between consecutive words of one block.
    pub per_word: u64,
    /// Extra gap inserted after each header block.
    pub block_gap: u64,
    /// Brightness ramp applied to a word after its flip.
    pub ramp: Duration,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            initial_delay: 150,
            per_word: 36,
            block_gap: 50,
            ramp: Duration::from_millis(450),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnitKind {
    /// Word of the numbered header block.
    Header(usize),
    /// Word of the subheader line.
    Subheader,
    /// The whole tagline, revealed as one unit.
    Tagline,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Unit {
    pub text: String,
    pub delay_ms: u64,
    pub kind: UnitKind,
}

/// Flatten the boot text into `(unit, delay)` pairs. Words within a block
/// stagger by `per_word`; the cursor advances past each header block by its
/// word span plus `block_gap`; the subheader starts exactly at the final
/// cursor and the tagline shares that same instant as a single unit.
pub fn build_schedule(
    headers: &[String],
    subheader: &str,
    tagline: &str,
    cfg: &RevealConfig,
) -> Vec<Unit> {
    let mut units = Vec::new();
    let mut cursor = cfg.initial_delay;

    for (block, text) in headers.iter().enumerate() {
        let words: Vec<&str> = text.split_whitespace().collect();
        for (i, word) in words.iter().enumerate() {
            units.push(Unit {
                text: (*word).to_string(),
                delay_ms: cursor + i as u64 * cfg.per_word,
                kind: UnitKind::Header(block),
            });
        }
        cursor += words.len() as u64 * cfg.per_word + cfg.block_gap;
    }

    for (i, word) in subheader.split_whitespace().enumerate() {
        units.push(Unit {
            text: word.to_string(),
            delay_ms: cursor + i as u64 * cfg.per_word,
            kind: UnitKind::Subheader,
        });
    }

    let tagline = tagline.trim();
    if !tagline.is_empty() {
        units.push(Unit {
            text: tagline.to_string(),
            delay_ms: cursor,
            kind: UnitKind::Tagline,
        });
    }

    units
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    /// Painting the all-hidden state; holds the number of frame boundaries
    /// observed since the schedule was built.
    AwaitPaint(u8),
    Armed,
}

/// Runs a built schedule: paints the hidden state on two successive frame
/// boundaries, then arms one one-shot timer per unit. Each unit flips to
/// revealed exactly once and brightens over a short ramp.
pub struct Reveal {
    cfg: RevealConfig,
    units: Vec<Unit>,
    revealed: Vec<Option<Instant>>,
    layout: Vec<(u16, u16)>,
    phase: Phase,
    cols: u16,
    rows: u16,
}

impl Reveal {
    pub fn new(cfg: RevealConfig) -> Self {
        Self {
            cfg,
            units: Vec::new(),
            revealed: Vec::new(),
            layout: Vec::new(),
            phase: Phase::Idle,
            cols: 0,
            rows: 0,
        }
    }

    /// Accept a schedule and enter the hidden-paint phase. No timer is armed
    /// here; that happens only after two painted frames, so a fast renderer
    /// cannot collapse the hidden state and the first flip into one frame.
    pub fn begin(&mut self, units: Vec<Unit>, cols: u16, rows: u16) {
        self.revealed = vec![None; units.len()];
        self.units = units;
        self.cols = cols;
        self.rows = rows;
        self.layout = compute_layout(&self.units, cols, rows);
        self.phase = Phase::AwaitPaint(0);
    }

    /// A frame boundary has passed with the current state painted.
    pub fn on_frame(&mut self, now: Instant, tl: &mut Timeline) {
        if let Phase::AwaitPaint(n) = self.phase {
            let n = n + 1;
            if n >= 2 {
                for (i, unit) in self.units.iter().enumerate() {
                    tl.after(now, Duration::from_millis(unit.delay_ms), Action::Reveal(i));
                }
                self.phase = Phase::Armed;
            } else {
                self.phase = Phase::AwaitPaint(n);
            }
        }
    }

    /// One-way flip; a duplicate timer for an already-revealed unit is a no-op.
    pub fn on_unit_due(&mut self, idx: usize, now: Instant) {
        if let Some(slot) = self.revealed.get_mut(idx) {
            if slot.is_none() {
                *slot = Some(now);
            }
        }
    }

    pub fn relayout(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
        self.layout = compute_layout(&self.units, cols, rows);
    }

    pub fn is_armed(&self) -> bool {
        self.phase == Phase::Armed
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed.iter().filter(|r| r.is_some()).count()
    }

    pub fn draw(&self, frame: &mut Frame, now: Instant, mode: ColorMode) {
        for (i, unit) in self.units.iter().enumerate() {
            let Some(at) = self.revealed[i] else {
                continue;
            };
            let (x, y) = self.layout[i];

            let t = if self.cfg.ramp.is_zero() {
                1.0
            } else {
                (now.saturating_duration_since(at).as_secs_f32() / self.cfg.ramp.as_secs_f32())
                    .clamp(0.0, 1.0)
            };
            let fg = resolve_gray(mode, lerp_u8(96, 255, t));

            for (j, ch) in unit.text.chars().enumerate() {
                let mut cell = Cell::glyph(ch, fg);
                match unit.kind {
                    UnitKind::Header(_) => cell.bold = true,
                    UnitKind::Subheader => {}
                    UnitKind::Tagline => cell.dim = true,
                }
                frame.set(x.saturating_add(j as u16), y, cell);
            }
        }
    }
}

/// Center each text line; words are joined by a single space regardless of the
/// source whitespace. Returns the top-left position of every unit.
fn compute_layout(units: &[Unit], cols: u16, rows: u16) -> Vec<(u16, u16)> {
    let mut kinds: Vec<UnitKind> = Vec::new();
    for u in units {
        if kinds.last() != Some(&u.kind) {
            kinds.push(u.kind);
        }
    }
    let header_lines = kinds
        .iter()
        .filter(|k| matches!(k, UnitKind::Header(_)))
        .count() as u16;

    let base_row = rows / 3;
    let row_of = |kind: UnitKind| -> u16 {
        match kind {
            UnitKind::Header(b) => base_row.saturating_add(b as u16),
            UnitKind::Subheader => base_row.saturating_add(header_lines).saturating_add(1),
            UnitKind::Tagline => base_row.saturating_add(header_lines).saturating_add(3),
        }
    };

    let mut layout = vec![(0u16, 0u16); units.len()];
    for kind in kinds {
        let line: Vec<(usize, &Unit)> = units
            .iter()
            .enumerate()
            .filter(|(_, u)| u.kind == kind)
            .collect();
        let width: usize = line.iter().map(|(_, u)| u.text.chars().count()).sum::<usize>()
            + line.len().saturating_sub(1);
        let start = (cols as usize).saturating_sub(width) / 2;
        let row = row_of(kind);

        let mut x = start;
        for (i, u) in line {
            layout[i] = (x.min(u16::MAX as usize) as u16, row);
            x += u.text.chars().count() + 1;
        }
    }
    layout
}
