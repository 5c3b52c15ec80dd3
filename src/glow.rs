// Copyright (c) 2026 rezky_nightky

use std::time::{Duration, Instant};

use crossterm::style::Color;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::palette::{lerp_rgb, resolve, scale_rgb, ColorMode};
use crate::timeline::{Action, Timeline};

#[derive(Clone, Copy, Debug)]
pub struct GlowConfig {
    /// Delay from start until the reveal is allowed to begin.
    pub overlap: Duration,
    /// How long each color is held before the next pick.
    pub hold: Duration,
    /// Entrance fade from dark to the first color.
    pub entrance: Duration,
    /// Crossfade between consecutive colors.
    pub crossfade: Duration,
    /// Backdrop brightness, 0..=1. The glow sits behind text and stars.
    pub intensity: f32,
    pub enabled: bool,
}

impl Default for GlowConfig {
    fn default() -> Self {
        Self {
            overlap: Duration::from_millis(600),
            hold: Duration::from_millis(4000),
            entrance: Duration::from_millis(1000),
            crossfade: Duration::from_millis(900),
            intensity: 0.35,
            enabled: true,
        }
    }
}

/// Uniform pick from `0..len` excluding `exclude`. Short-circuits for a
/// single-entry palette instead of rejection sampling, so it can never loop.
pub fn pick_excluding<R: Rng>(rng: &mut R, len: usize, exclude: usize) -> usize {
    if len <= 1 {
        return 0;
    }
    let i = rng.random_range(0..len - 1);
    if i >= exclude.min(len - 1) {
        i + 1
    } else {
        i
    }
}

/// The backdrop color cycle. Owns the active/previous palette indices and the
/// glow's timers; everything downstream only ever sees the blended color.
pub struct GlowCycle {
    colors: Vec<(u8, u8, u8)>,
    cfg: GlowConfig,
    rng: StdRng,
    active: usize,
    previous: Option<usize>,
    started: bool,
    /// Set on the first frame tick after start; the entrance fade is anchored
    /// here so the committed dark state is painted at least once first.
    entrance_from: Option<Instant>,
    switched_at: Option<Instant>,
}

impl GlowCycle {
    pub fn new(colors: Vec<(u8, u8, u8)>, cfg: GlowConfig, seed: u64) -> Self {
        Self {
            colors,
            cfg,
            rng: StdRng::seed_from_u64(seed),
            active: 0,
            previous: None,
            started: false,
            entrance_from: None,
            switched_at: None,
        }
    }

    /// Commit a random initial color and arm the overlap and hold timers.
    /// A disabled or empty backdrop degrades gracefully: the overlap signal
    /// fires immediately so the rest of the boot sequence is never blocked.
    pub fn start(&mut self, now: Instant, tl: &mut Timeline) {
        if !self.cfg.enabled || self.colors.is_empty() {
            tl.after(now, Duration::ZERO, Action::OverlapElapsed);
            return;
        }
        self.active = self.rng.random_range(0..self.colors.len());
        self.started = true;
        tl.after(now, self.cfg.overlap, Action::OverlapElapsed);
        tl.every(now, self.cfg.hold, Action::GlowHold);
    }

    /// One rendered frame has observed the current state.
    pub fn on_frame(&mut self, now: Instant) {
        if self.started && self.entrance_from.is_none() {
            self.entrance_from = Some(now);
        }
    }

    /// Hold interval elapsed: move to a new color, never the one just shown.
    pub fn on_hold(&mut self, now: Instant) {
        if !self.started || self.colors.len() <= 1 {
            return;
        }
        let next = pick_excluding(&mut self.rng, self.colors.len(), self.active);
        self.previous = Some(self.active);
        self.active = next;
        self.switched_at = Some(now);
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn previous_index(&self) -> Option<usize> {
        self.previous
    }

    /// Current backdrop color: active color, crossfaded from the previous one
    /// and scaled by the entrance fade and intensity.
    pub fn backdrop(&self, now: Instant, mode: ColorMode) -> Option<Color> {
        if !self.cfg.enabled || !self.started || self.colors.is_empty() {
            return None;
        }

        let mut rgb = self.colors[self.active];
        if let (Some(prev), Some(at)) = (self.previous, self.switched_at) {
            let t = fraction_since(at, now, self.cfg.crossfade);
            if t < 1.0 {
                rgb = lerp_rgb(self.colors[prev], rgb, t);
            }
        }

        let entrance = match self.entrance_from {
            Some(at) => fraction_since(at, now, self.cfg.entrance),
            None => 0.0,
        };

        resolve(mode, scale_rgb(rgb, entrance * self.cfg.intensity))
    }
}

fn fraction_since(from: Instant, now: Instant, span: Duration) -> f32 {
    if span.is_zero() {
        return 1.0;
    }
    (now.saturating_duration_since(from).as_secs_f32() / span.as_secs_f32()).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colors(n: usize) -> Vec<(u8, u8, u8)> {
        (0..n).map(|i| (i as u8 * 40, 10, 10)).collect()
    }

    #[test]
    fn pick_excluding_never_repeats_for_larger_palettes() {
        let mut rng = StdRng::seed_from_u64(7);
        for len in 2..6 {
            let mut prev = 0usize;
            for _ in 0..200 {
                let next = pick_excluding(&mut rng, len, prev);
                assert_ne!(next, prev, "len {}", len);
                assert!(next < len);
                prev = next;
            }
        }
    }

    #[test]
    fn pick_excluding_returns_the_only_entry_without_looping() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(pick_excluding(&mut rng, 1, 0), 0);
    }

    #[test]
    fn start_arms_overlap_and_hold() {
        let now = Instant::now();
        let mut tl = Timeline::new();
        let mut glow = GlowCycle::new(colors(3), GlowConfig::default(), 1);
        glow.start(now, &mut tl);

        let mut fired = Vec::new();
        tl.fire_due(now + Duration::from_millis(599), &mut fired);
        assert!(fired.is_empty(), "overlap must not fire early");
        tl.fire_due(now + Duration::from_millis(600), &mut fired);
        assert_eq!(fired, vec![Action::OverlapElapsed]);
    }

    #[test]
    fn disabled_backdrop_fires_overlap_immediately() {
        let now = Instant::now();
        let mut tl = Timeline::new();
        let cfg = GlowConfig {
            enabled: false,
            ..GlowConfig::default()
        };
        let mut glow = GlowCycle::new(colors(3), cfg, 1);
        glow.start(now, &mut tl);

        let mut fired = Vec::new();
        tl.fire_due(now, &mut fired);
        assert_eq!(fired, vec![Action::OverlapElapsed]);
        assert!(glow.backdrop(now, ColorMode::TrueColor).is_none());
    }

    #[test]
    fn hold_tick_switches_away_from_the_active_color() {
        let now = Instant::now();
        let mut tl = Timeline::new();
        let mut glow = GlowCycle::new(colors(4), GlowConfig::default(), 3);
        glow.start(now, &mut tl);

        for i in 0..50 {
            let before = glow.active_index();
            glow.on_hold(now + Duration::from_millis(i * 10));
            assert_ne!(glow.active_index(), before);
            assert_eq!(glow.previous_index(), Some(before));
        }
    }

    #[test]
    fn single_color_palette_never_switches() {
        let now = Instant::now();
        let mut tl = Timeline::new();
        let mut glow = GlowCycle::new(colors(1), GlowConfig::default(), 3);
        glow.start(now, &mut tl);
        glow.on_hold(now);
        assert_eq!(glow.active_index(), 0);
        assert_eq!(glow.previous_index(), None);
    }

    #[test]
    fn entrance_waits_for_the_first_observed_frame() {
        let now = Instant::now();
        let mut tl = Timeline::new();
        let mut glow = GlowCycle::new(vec![(200, 200, 200)], GlowConfig::default(), 1);
        glow.start(now, &mut tl);

        // Committed but not yet observed: backdrop stays dark.
        let c = glow.backdrop(now, ColorMode::TrueColor);
        assert_eq!(c, Some(Color::Rgb { r: 0, g: 0, b: 0 }));

        glow.on_frame(now);
        let later = now + Duration::from_millis(2000);
        let c = glow.backdrop(later, ColorMode::TrueColor);
        assert_ne!(c, Some(Color::Rgb { r: 0, g: 0, b: 0 }));
    }
}
