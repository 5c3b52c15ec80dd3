// Copyright (c) 2026 rezky_nightky

use std::time::Instant;

use crate::frame::Frame;
use crate::glow::GlowCycle;
use crate::palette::ColorMode;
use crate::reveal::{build_schedule, Reveal, RevealConfig};
use crate::starfield::Starfield;
use crate::timeline::{Action, Timeline};

/// Source text for the reveal, held until the overlap signal asks for it.
#[derive(Clone, Debug)]
pub struct BootText {
    pub headers: Vec<String>,
    pub subheader: String,
    pub tagline: String,
}

/// Wires the boot sequence together: glow and star field start at once, the
/// reveal is built only when the glow's overlap delay elapses. Owns the
/// timeline so `stop` can tear down every pending deadline.
pub struct Boot {
    pub glow: GlowCycle,
    pub stars: Starfield,
    pub reveal: Reveal,
    timeline: Timeline,
    text: BootText,
    rcfg: RevealConfig,
    mode: ColorMode,
    cols: u16,
    rows: u16,
    running: bool,
    settled_resize: Option<(u16, u16)>,
    fired: Vec<Action>,
}

impl Boot {
    pub fn new(
        glow: GlowCycle,
        stars: Starfield,
        text: BootText,
        rcfg: RevealConfig,
        mode: ColorMode,
    ) -> Self {
        Self {
            glow,
            stars,
            reveal: Reveal::new(rcfg),
            timeline: Timeline::new(),
            text,
            rcfg,
            mode,
            cols: 0,
            rows: 0,
            running: false,
            settled_resize: None,
            fired: Vec::new(),
        }
    }

    pub fn start(&mut self, now: Instant, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
        self.glow.start(now, &mut self.timeline);
        self.stars.start(now, cols, rows);
        self.running = true;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Tear down every recurring timer and pending one-shot. The frame loop
    /// stops driving the components once this runs.
    pub fn stop(&mut self) {
        self.timeline.clear();
        self.running = false;
    }

    pub fn next_wake(&self) -> Option<Instant> {
        self.timeline.next_due()
    }

    pub fn pointer_moved(&mut self, col: u16, row: u16) {
        self.stars.pointer_moved(col, row);
    }

    pub fn viewport_resized(&mut self, cols: u16, rows: u16, now: Instant) {
        self.stars
            .viewport_resized(cols, rows, now, &mut self.timeline);
    }

    /// New surface dimensions applied by the last `handle_timers`, if any.
    /// The caller rebuilds its frame to match.
    pub fn take_settled_resize(&mut self) -> Option<(u16, u16)> {
        self.settled_resize.take()
    }

    /// Drain due timers and route each signal to its component.
    pub fn handle_timers(&mut self, now: Instant) {
        if !self.running {
            return;
        }
        self.fired.clear();
        self.timeline.fire_due(now, &mut self.fired);
        let fired = std::mem::take(&mut self.fired);
        for action in &fired {
            match *action {
                Action::GlowHold => self.glow.on_hold(now),
                Action::OverlapElapsed => {
                    let units = build_schedule(
                        &self.text.headers,
                        &self.text.subheader,
                        &self.text.tagline,
                        &self.rcfg,
                    );
                    self.reveal.begin(units, self.cols, self.rows);
                }
                Action::Reveal(idx) => self.reveal.on_unit_due(idx, now),
                Action::ResizeSettle => {
                    if let Some((cols, rows)) = self.stars.on_resize_settle() {
                        self.cols = cols;
                        self.rows = rows;
                        self.reveal.relayout(cols, rows);
                        self.settled_resize = Some((cols, rows));
                    }
                }
            }
        }
        self.fired = fired;
    }

    /// One frame boundary: fixed order — glow state, backdrop commit, star
    /// smoothing/physics/draw, text draw, then the paint notifications that
    /// drive the entrance and the two-frame reveal protocol.
    pub fn on_frame(&mut self, now: Instant, frame: &mut Frame) {
        if !self.running {
            return;
        }
        frame.set_bg(self.glow.backdrop(now, self.mode));
        self.stars.on_frame(now, frame, self.mode);
        self.reveal.draw(frame, now, self.mode);

        self.glow.on_frame(now);
        self.reveal.on_frame(now, &mut self.timeline);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::glow::GlowConfig;
    use crate::starfield::{Starfield, StarfieldConfig};

    fn boot() -> Boot {
        let glow = GlowCycle::new(vec![(10, 20, 30), (40, 50, 60)], GlowConfig::default(), 5);
        let stars = Starfield::new(StarfieldConfig::default(), 5, true);
        let text = BootText {
            headers: vec!["A B".into(), "C".into()],
            subheader: "x y".into(),
            tagline: "go".into(),
        };
        Boot::new(glow, stars, text, RevealConfig::default(), ColorMode::Mono)
    }

    fn step(b: &mut Boot, frame: &mut Frame, now: Instant) {
        b.handle_timers(now);
        b.on_frame(now, frame);
    }

    #[test]
    fn reveal_cannot_start_before_the_overlap_delay() {
        let mut b = boot();
        let mut frame = Frame::new(80, 24);
        let t0 = Instant::now();
        b.start(t0, 80, 24);

        // Many frames inside the overlap window: nothing armed, nothing shown.
        for i in 0..30 {
            step(&mut b, &mut frame, t0 + Duration::from_millis(i * 16));
        }
        assert!(!b.reveal.is_armed());
        assert_eq!(b.reveal.revealed_count(), 0);

        // Overlap elapses, then two painted frames, then timers arm.
        let t1 = t0 + Duration::from_millis(600);
        step(&mut b, &mut frame, t1);
        assert!(!b.reveal.is_armed(), "schedule built, still painting hidden");
        step(&mut b, &mut frame, t1 + Duration::from_millis(16));
        assert!(b.reveal.is_armed());

        // First word is due initial_delay after arming.
        let t2 = t1 + Duration::from_millis(16 + 150);
        step(&mut b, &mut frame, t2);
        assert_eq!(b.reveal.revealed_count(), 1);
    }

    #[test]
    fn stars_run_independently_of_the_other_components() {
        let mut b = boot();
        let t0 = Instant::now();
        b.start(t0, 80, 24);
        assert!(!b.stars.stars().is_empty(), "field spawns at boot");
        let mut frame = Frame::new(80, 24);
        step(&mut b, &mut frame, t0 + Duration::from_millis(16));
        // Well before the overlap delay the field is already animating.
        assert!(b.stars.stars().iter().any(|s| s.vx != 0.0));
    }

    #[test]
    fn stop_tears_down_all_pending_timers() {
        let mut b = boot();
        let t0 = Instant::now();
        b.start(t0, 80, 24);
        assert!(b.next_wake().is_some());
        b.stop();
        assert!(b.next_wake().is_none());
        assert!(!b.is_running());
    }

    #[test]
    fn settled_resize_is_reported_once_for_the_frame_rebuild() {
        let mut b = boot();
        let mut frame = Frame::new(80, 24);
        let t0 = Instant::now();
        b.start(t0, 80, 24);

        b.viewport_resized(120, 40, t0 + Duration::from_millis(5));
        b.viewport_resized(100, 30, t0 + Duration::from_millis(10));
        step(&mut b, &mut frame, t0 + Duration::from_millis(200));

        assert_eq!(b.take_settled_resize(), Some((100, 30)));
        assert_eq!(b.take_settled_resize(), None);
    }
}
