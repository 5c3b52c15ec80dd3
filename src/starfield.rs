// Copyright (c) 2026 rezky_nightky

use std::f32::consts::TAU;
use std::time::{Duration, Instant};

use rand::{
    distr::{Distribution, Uniform},
    rngs::StdRng,
    SeedableRng,
};

use crate::cell::Cell;
use crate::frame::Frame;
use crate::palette::{resolve_gray, ColorMode};
use crate::timeline::{Action, Timeline, TimerId};

#[derive(Clone, Copy, Debug)]
pub struct StarfieldConfig {
    pub count: usize,
    /// Max drift per reference frame, in surface units per axis.
    pub drift: f32,
    pub radius: (f32, f32),
    pub opacity: (f32, f32),
    pub twinkle_ms: (f32, f32),
    /// Vertical band the stars live in, as fractions of the surface height.
    /// Stars never spawn in (or wrap into) the strip below `floor_frac`.
    pub ceiling_frac: f32,
    pub floor_frac: f32,
    /// Minimum visible brightness fraction of a star's peak opacity.
    pub twinkle_floor: f32,
    /// Wrap margin beyond the surface edges.
    pub pad: f32,
    /// Exponential smoothing factor chasing the pointer target.
    pub ease: f32,
    /// Max parallax offset magnitude, surface units.
    pub max_offset: f32,
    pub ref_delta_ms: f32,
    /// Deltas above this (backgrounded host) collapse to the reference delta.
    pub max_delta_ms: f32,
    pub debounce: Duration,
    /// Vertical sub-cell resolution: simulation rows per terminal row.
    pub vscale: f32,
    pub enabled: bool,
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        Self {
            count: 90,
            drift: 0.035,
            radius: (0.2, 1.6),
            opacity: (0.3, 1.0),
            twinkle_ms: (1800.0, 4200.0),
            ceiling_frac: 0.0,
            floor_frac: 0.85,
            twinkle_floor: 0.25,
            pad: 2.0,
            ease: 0.08,
            max_offset: 2.5,
            ref_delta_ms: 1000.0 / 60.0,
            max_delta_ms: 100.0,
            debounce: Duration::from_millis(150),
            vscale: 2.0,
            enabled: true,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Star {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub radius: f32,
    pub max_opacity: f32,
    pub twinkle_ms: f32,
    pub phase: f32,
    last_cell: Option<(u16, u16)>,
}

/// Teleport `v` to the far edge once it drifts past either margin. Wrap, not
/// reflection: a star leaving on the right re-enters on the left.
pub fn wrap(v: f32, lo: f32, hi: f32) -> f32 {
    if v > hi {
        lo
    } else if v < lo {
        hi
    } else {
        v
    }
}

/// Sinusoidal twinkle. The floor fraction keeps every star visibly lit at the
/// bottom of its cycle; the result stays within
/// `[floor * max_opacity, max_opacity]` for any phase.
pub fn twinkle_opacity(t_ms: f32, twinkle_ms: f32, phase: f32, max_opacity: f32, floor: f32) -> f32 {
    let p = (t_ms / twinkle_ms) * TAU + phase;
    let normalized = (p.sin() + 1.0) / 2.0;
    max_opacity * (floor + (1.0 - floor) * normalized)
}

const GLYPHS_UNICODE: [char; 3] = ['·', '•', '✦'];
const GLYPHS_ASCII: [char; 3] = ['.', '+', '*'];

/// The star pool and everything that animates it: drift, twinkle, pointer
/// parallax and debounced resize adaptation. All randomness comes from one
/// seedable source so a seeded field is fully deterministic.
pub struct Starfield {
    cfg: StarfieldConfig,
    stars: Vec<Star>,
    w: f32,
    h: f32,
    offset: (f32, f32),
    target: (f32, f32),
    rng: StdRng,
    epoch: Option<Instant>,
    last_tick: Option<Instant>,
    paused: bool,
    pending_resize: Option<(u16, u16)>,
    resize_timer: Option<TimerId>,
    glyphs: [char; 3],

    rand_x: Uniform<f32>,
    rand_y: Uniform<f32>,
    rand_v: Uniform<f32>,
    rand_radius: Uniform<f32>,
    rand_opacity: Uniform<f32>,
    rand_twinkle: Uniform<f32>,
    rand_phase: Uniform<f32>,
}

impl Starfield {
    pub fn new(cfg: StarfieldConfig, seed: u64, ascii: bool) -> Self {
        let w = 80.0;
        let h = 24.0 * cfg.vscale;
        let (band_lo, band_hi) = band(&cfg, h);
        Self {
            stars: Vec::new(),
            w,
            h,
            offset: (0.0, 0.0),
            target: (0.0, 0.0),
            rng: StdRng::seed_from_u64(seed),
            epoch: None,
            last_tick: None,
            paused: false,
            pending_resize: None,
            resize_timer: None,
            glyphs: if ascii { GLYPHS_ASCII } else { GLYPHS_UNICODE },
            rand_x: Uniform::new(0.0, w).expect("valid range"),
            rand_y: Uniform::new(band_lo, band_hi).expect("valid range"),
            rand_v: Uniform::new_inclusive(-cfg.drift, cfg.drift).expect("valid range"),
            rand_radius: Uniform::new(cfg.radius.0, cfg.radius.1).expect("valid range"),
            rand_opacity: Uniform::new(cfg.opacity.0, cfg.opacity.1).expect("valid range"),
            rand_twinkle: Uniform::new(cfg.twinkle_ms.0, cfg.twinkle_ms.1).expect("valid range"),
            rand_phase: Uniform::new(0.0, TAU).expect("valid range"),
            cfg,
        }
    }

    /// Adopt the surface dimensions and build the pool.
    pub fn start(&mut self, now: Instant, cols: u16, rows: u16) {
        self.set_dims(cols, rows);
        self.epoch = Some(now);
        self.last_tick = None;
        self.respawn();
    }

    /// Rebuild the whole pool with fresh samples. Used at start and on demand;
    /// resize deliberately does not call this (bounds are remapped instead).
    pub fn respawn(&mut self) {
        if !self.cfg.enabled {
            self.stars.clear();
            return;
        }
        self.stars = (0..self.cfg.count)
            .map(|_| Star {
                x: self.rand_x.sample(&mut self.rng),
                y: self.rand_y.sample(&mut self.rng),
                vx: self.rand_v.sample(&mut self.rng),
                vy: self.rand_v.sample(&mut self.rng),
                radius: self.rand_radius.sample(&mut self.rng),
                max_opacity: self.rand_opacity.sample(&mut self.rng),
                twinkle_ms: self.rand_twinkle.sample(&mut self.rng),
                phase: self.rand_phase.sample(&mut self.rng),
                last_cell: None,
            })
            .collect();
    }

    fn set_dims(&mut self, cols: u16, rows: u16) {
        self.w = (cols.max(1)) as f32;
        self.h = (rows.max(1)) as f32 * self.cfg.vscale;
        let (band_lo, band_hi) = band(&self.cfg, self.h);
        self.rand_x = Uniform::new(0.0, self.w).expect("valid range");
        self.rand_y = Uniform::new(band_lo, band_hi).expect("valid range");
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        if !self.paused {
            // Resume from a clean reference step instead of a giant delta.
            self.last_tick = None;
        }
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn offset(&self) -> (f32, f32) {
        self.offset
    }

    pub fn target(&self) -> (f32, f32) {
        self.target
    }

    /// Pointer moved: retarget the parallax offset. Positions are untouched;
    /// the per-frame smoothing chases the new target.
    pub fn pointer_moved(&mut self, col: u16, row: u16) {
        let nx = ((col as f32 / self.w.max(1.0)) * 2.0 - 1.0).clamp(-1.0, 1.0);
        let ny = ((row as f32 * self.cfg.vscale / self.h.max(1.0)) * 2.0 - 1.0).clamp(-1.0, 1.0);
        self.target = (-nx * self.cfg.max_offset, -ny * self.cfg.max_offset);
    }

    /// Note a resize and (re)arm the debounce timer. Rapid events coalesce:
    /// only the quiet period after the last one triggers a recompute.
    pub fn viewport_resized(&mut self, cols: u16, rows: u16, now: Instant, tl: &mut Timeline) {
        self.pending_resize = Some((cols, rows));
        if let Some(id) = self.resize_timer.take() {
            tl.cancel(id);
        }
        self.resize_timer = Some(tl.after(now, self.cfg.debounce, Action::ResizeSettle));
    }

    /// The debounce quiet period elapsed: adopt the pending dimensions and
    /// remap star positions proportionally, preserving twinkle continuity.
    pub fn on_resize_settle(&mut self) -> Option<(u16, u16)> {
        let (cols, rows) = self.pending_resize.take()?;
        self.resize_timer = None;

        let (old_w, old_h) = (self.w, self.h);
        self.set_dims(cols, rows);
        if old_w > 0.0 && old_h > 0.0 {
            for s in &mut self.stars {
                s.x = s.x / old_w * self.w;
                s.y = s.y / old_h * self.h;
                s.last_cell = None;
            }
        }
        Some((cols, rows))
    }

    /// Steps 1-4 of the frame update: delta, scale, offset smoothing, drift
    /// and wrapping. Kept separate from rendering so the simulation can be
    /// driven without a surface.
    pub fn advance(&mut self, now: Instant) {
        if self.epoch.is_none() || self.paused {
            return;
        }

        let raw_ms = match self.last_tick {
            Some(t) => now.saturating_duration_since(t).as_secs_f32() * 1000.0,
            None => self.cfg.ref_delta_ms,
        };
        self.last_tick = Some(now);
        let delta_ms = if raw_ms > self.cfg.max_delta_ms {
            self.cfg.ref_delta_ms
        } else {
            raw_ms
        };
        let scale = delta_ms / self.cfg.ref_delta_ms;

        self.offset.0 += (self.target.0 - self.offset.0) * self.cfg.ease * scale;
        self.offset.1 += (self.target.1 - self.offset.1) * self.cfg.ease * scale;

        let pad = self.cfg.pad;
        let (band_lo, band_hi) = band(&self.cfg, self.h);
        for s in &mut self.stars {
            s.x += s.vx * scale;
            s.y += s.vy * scale;
            s.x = wrap(s.x, -pad, self.w + pad);
            s.y = wrap(s.y, band_lo - pad, band_hi + pad);
        }
    }

    /// Steps 5-6: twinkle opacity and disc drawing at the parallax-shifted
    /// position. State was already advanced; a non-positive opacity skips the
    /// draw only.
    pub fn render(&mut self, now: Instant, frame: &mut Frame, mode: ColorMode) {
        let Some(epoch) = self.epoch else {
            return;
        };
        let t_ms = now.saturating_duration_since(epoch).as_secs_f32() * 1000.0;

        // Clear pass first so a star vacating a cell another star now holds
        // cannot blank it for a frame.
        let mut moved: Vec<(usize, Option<(u16, u16)>)> = Vec::with_capacity(self.stars.len());
        for (i, s) in self.stars.iter().enumerate() {
            let cell = self.cell_of(s);
            if s.last_cell != cell {
                if let Some((cx, cy)) = s.last_cell {
                    frame.clear_cell(cx, cy);
                }
                moved.push((i, cell));
            }
        }
        for (i, cell) in moved {
            self.stars[i].last_cell = cell;
        }

        for s in &self.stars {
            let opacity = twinkle_opacity(
                t_ms,
                s.twinkle_ms,
                s.phase,
                s.max_opacity,
                self.cfg.twinkle_floor,
            );
            if opacity <= 0.0 {
                if let Some((cx, cy)) = s.last_cell {
                    frame.clear_cell(cx, cy);
                }
                continue;
            }
            let Some((cx, cy)) = s.last_cell else {
                continue;
            };

            let glyph = self.glyph_for(s.radius);
            let mut cell = Cell::glyph(glyph, resolve_gray(mode, (opacity.min(1.0) * 255.0) as u8));
            cell.dim = opacity < 0.4;
            frame.set(cx, cy, cell);
        }
    }

    pub fn on_frame(&mut self, now: Instant, frame: &mut Frame, mode: ColorMode) {
        self.advance(now);
        self.render(now, frame, mode);
    }

    fn cell_of(&self, s: &Star) -> Option<(u16, u16)> {
        let px = s.x + self.offset.0;
        let py = (s.y + self.offset.1) / self.cfg.vscale;
        let cx = px.round();
        let cy = py.round();
        if cx < 0.0 || cy < 0.0 || cx >= self.w || cy * self.cfg.vscale >= self.h {
            return None;
        }
        Some((cx as u16, cy as u16))
    }

    fn glyph_for(&self, radius: f32) -> char {
        let (lo, hi) = self.cfg.radius;
        let span = (hi - lo).max(f32::EPSILON);
        let t = (radius - lo) / span;
        if t < 0.33 {
            self.glyphs[0]
        } else if t < 0.72 {
            self.glyphs[1]
        } else {
            self.glyphs[2]
        }
    }
}

fn band(cfg: &StarfieldConfig, h: f32) -> (f32, f32) {
    let lo = cfg.ceiling_frac * h;
    let mut hi = cfg.floor_frac * h;
    if hi <= lo {
        hi = lo + 1.0;
    }
    (lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> Starfield {
        let mut sf = Starfield::new(StarfieldConfig::default(), 42, false);
        sf.start(Instant::now(), 80, 24);
        sf
    }

    #[test]
    fn spawn_fills_the_band_and_fixes_per_star_constants() {
        let sf = field();
        assert_eq!(sf.stars().len(), 90);
        let h = 24.0 * 2.0;
        for s in sf.stars() {
            assert!(s.x >= 0.0 && s.x < 80.0);
            assert!(s.y >= 0.0 && s.y < 0.85 * h);
            assert!(s.radius >= 0.2 && s.radius < 1.6);
            assert!(s.max_opacity >= 0.3 && s.max_opacity < 1.0);
            assert!(s.twinkle_ms >= 1800.0 && s.twinkle_ms < 4200.0);
            assert!(s.phase >= 0.0 && s.phase < TAU);
        }
    }

    #[test]
    fn seeded_fields_are_identical() {
        let a = field();
        let mut b = Starfield::new(StarfieldConfig::default(), 42, false);
        b.start(Instant::now(), 80, 24);
        for (x, y) in a.stars().iter().zip(b.stars()) {
            assert_eq!(x.x, y.x);
            assert_eq!(x.vy, y.vy);
            assert_eq!(x.phase, y.phase);
        }
    }

    #[test]
    fn wrap_teleports_past_the_margin_and_never_clamps() {
        let w = 100.0;
        let pad = 10.0;
        assert_eq!(wrap(w + 15.0, -pad, w + pad), -pad);
        assert_eq!(wrap(-25.0, -pad, w + pad), w + pad);
        assert_eq!(wrap(50.0, -pad, w + pad), 50.0);
        // Exactly on the margin is still inside.
        assert_eq!(wrap(w + pad, -pad, w + pad), w + pad);
    }

    #[test]
    fn twinkle_stays_within_the_floor_and_peak() {
        let max = 0.9;
        let floor = 0.25;
        for i in 0..1000 {
            let t = i as f32 * 7.3;
            let o = twinkle_opacity(t, 2600.0, 1.1, max, floor);
            assert!(o >= floor * max - 1e-5, "below floor at t={}", t);
            assert!(o <= max + 1e-5, "above peak at t={}", t);
        }
    }

    #[test]
    fn a_huge_delta_collapses_to_the_reference_step() {
        let mut sf = field();
        let t0 = Instant::now();
        sf.advance(t0);
        let before: Vec<f32> = sf.stars().iter().map(|s| s.x).collect();
        let speeds: Vec<f32> = sf.stars().iter().map(|s| s.vx).collect();

        // 5 seconds of stall must step exactly one reference frame (scale 1).
        sf.advance(t0 + Duration::from_millis(5000));
        for ((s, bx), vx) in sf.stars().iter().zip(before).zip(speeds) {
            let expect_x = wrap(bx + vx, -2.0, 82.0);
            assert!((s.x - expect_x).abs() < 1e-4);
        }
    }

    #[test]
    fn mouse_offset_converges_monotonically() {
        let mut sf = field();
        let t0 = Instant::now();
        sf.pointer_moved(0, 0);
        let target = sf.target();
        assert!(target.0 > 0.0 && target.1 > 0.0, "left/top pushes right/down");

        let mut prev_dist = (target.0 - sf.offset().0).abs();
        let mut now = t0;
        for _ in 0..400 {
            now += Duration::from_micros(16_667);
            sf.advance(now);
            let dist = (target.0 - sf.offset().0).abs();
            assert!(dist <= prev_dist + 1e-6, "x offset must not oscillate");
            prev_dist = dist;
        }
        assert!(prev_dist < 1e-3, "offset should reach the target");
        assert!((target.1 - sf.offset().1).abs() < 1e-3);
    }

    #[test]
    fn pointer_at_center_targets_zero_offset() {
        let mut sf = field();
        sf.pointer_moved(40, 12);
        let (tx, ty) = sf.target();
        assert!(tx.abs() < 0.1);
        assert!(ty.abs() < 0.1);
    }

    #[test]
    fn rapid_resizes_coalesce_into_one_settle() {
        let mut sf = field();
        let mut tl = Timeline::new();
        let t0 = Instant::now();

        let mut last = t0;
        for i in 0..10 {
            last = t0 + Duration::from_millis(i * 5);
            sf.viewport_resized(100 + i as u16, 30, last, &mut tl);
        }

        let mut fired = Vec::new();
        tl.fire_due(last + Duration::from_millis(149), &mut fired);
        assert!(fired.is_empty(), "no settle inside the quiet period");
        tl.fire_due(last + Duration::from_millis(150), &mut fired);
        assert_eq!(fired, vec![Action::ResizeSettle]);
        assert!(tl.is_empty());

        assert_eq!(sf.on_resize_settle(), Some((109, 30)));
        assert_eq!(sf.on_resize_settle(), None, "settle applies once");
    }

    #[test]
    fn resize_remaps_positions_instead_of_respawning() {
        let mut sf = field();
        let mut tl = Timeline::new();
        let t0 = Instant::now();
        let phases: Vec<f32> = sf.stars().iter().map(|s| s.phase).collect();
        let xs: Vec<f32> = sf.stars().iter().map(|s| s.x).collect();

        sf.viewport_resized(160, 24, t0, &mut tl);
        sf.on_resize_settle();

        for ((s, phase), x) in sf.stars().iter().zip(phases).zip(xs) {
            assert_eq!(s.phase, phase, "twinkle continuity preserved");
            assert!((s.x - x * 2.0).abs() < 1e-3, "x scaled into new bounds");
        }
    }

    #[test]
    fn paused_field_does_not_drift() {
        let mut sf = field();
        let t0 = Instant::now();
        sf.advance(t0);
        sf.toggle_pause();
        let before: Vec<f32> = sf.stars().iter().map(|s| s.x).collect();
        sf.advance(t0 + Duration::from_millis(32));
        for (s, b) in sf.stars().iter().zip(before) {
            assert_eq!(s.x, b);
        }
    }

    #[test]
    fn disabled_field_spawns_nothing() {
        let cfg = StarfieldConfig {
            enabled: false,
            ..StarfieldConfig::default()
        };
        let mut sf = Starfield::new(cfg, 1, false);
        sf.start(Instant::now(), 80, 24);
        assert!(sf.stars().is_empty());
    }
}
