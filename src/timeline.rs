// Copyright (c) 2026 rezky_nightky

use std::time::{Duration, Instant};

/// What a fired timer means to the boot sequence. Timers carry plain values
/// instead of callbacks so the whole schedule stays single-threaded and
/// inspectable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// The glow's recurring hold interval elapsed; pick the next color.
    GlowHold,
    /// The fixed overlap delay after glow start elapsed; start the reveal.
    OverlapElapsed,
    /// A reveal unit's delay elapsed; flip it to visible.
    Reveal(usize),
    /// The resize debounce quiet period elapsed; recompute the surface.
    ResizeSettle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Clone, Debug)]
struct Entry {
    id: TimerId,
    due: Instant,
    every: Option<Duration>,
    action: Action,
}

/// Deadline set driving all waiting in the engine: one-shot reveal delays,
/// the overlap delay, the recurring glow hold, the resize debounce. The main
/// loop sleeps until `next_due` and then drains `fire_due`.
#[derive(Debug, Default)]
pub struct Timeline {
    entries: Vec<Entry>,
    next_id: u64,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, due: Instant, every: Option<Duration>, action: Action) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.entries.push(Entry {
            id,
            due,
            every,
            action,
        });
        id
    }

    pub fn after(&mut self, now: Instant, delay: Duration, action: Action) -> TimerId {
        self.push(now + delay, None, action)
    }

    pub fn every(&mut self, now: Instant, period: Duration, action: Action) -> TimerId {
        self.push(now + period, Some(period), action)
    }

    pub fn cancel(&mut self, id: TimerId) {
        self.entries.retain(|e| e.id != id);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.entries.iter().map(|e| e.due).min()
    }

    /// Append every action due at `now` to `fired`, earliest deadline first.
    /// Recurring entries are re-armed; a period that was entirely missed
    /// (stalled host) fires once and realigns from `now`.
    pub fn fire_due(&mut self, now: Instant, fired: &mut Vec<Action>) {
        loop {
            let next = self
                .entries
                .iter()
                .enumerate()
                .filter(|(_, e)| e.due <= now)
                .min_by_key(|(_, e)| e.due)
                .map(|(i, _)| i);
            let Some(i) = next else {
                return;
            };

            fired.push(self.entries[i].action);
            match self.entries[i].every {
                Some(period) => {
                    let mut due = self.entries[i].due + period;
                    if due <= now {
                        due = now + period;
                    }
                    self.entries[i].due = due;
                }
                None => {
                    self.entries.swap_remove(i);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(tl: &mut Timeline, now: Instant) -> Vec<Action> {
        let mut fired = Vec::new();
        tl.fire_due(now, &mut fired);
        fired
    }

    #[test]
    fn one_shot_fires_once_in_deadline_order() {
        let t0 = Instant::now();
        let mut tl = Timeline::new();
        tl.after(t0, Duration::from_millis(30), Action::Reveal(1));
        tl.after(t0, Duration::from_millis(10), Action::Reveal(0));

        assert!(drain(&mut tl, t0).is_empty());
        let fired = drain(&mut tl, t0 + Duration::from_millis(40));
        assert_eq!(fired, vec![Action::Reveal(0), Action::Reveal(1)]);
        assert!(tl.is_empty());
    }

    #[test]
    fn recurring_rearms_and_realigns_after_stall() {
        let t0 = Instant::now();
        let mut tl = Timeline::new();
        tl.every(t0, Duration::from_millis(100), Action::GlowHold);

        let fired = drain(&mut tl, t0 + Duration::from_millis(350));
        assert_eq!(fired, vec![Action::GlowHold]);
        let due = tl.next_due().expect("still armed");
        assert_eq!(due, t0 + Duration::from_millis(450));
    }

    #[test]
    fn cancel_removes_a_pending_timer() {
        let t0 = Instant::now();
        let mut tl = Timeline::new();
        let id = tl.after(t0, Duration::from_millis(10), Action::ResizeSettle);
        tl.after(t0, Duration::from_millis(20), Action::OverlapElapsed);
        tl.cancel(id);

        let fired = drain(&mut tl, t0 + Duration::from_millis(30));
        assert_eq!(fired, vec![Action::OverlapElapsed]);
    }

    #[test]
    fn next_due_reports_the_earliest_deadline() {
        let t0 = Instant::now();
        let mut tl = Timeline::new();
        assert!(tl.next_due().is_none());
        tl.after(t0, Duration::from_millis(50), Action::Reveal(0));
        tl.after(t0, Duration::from_millis(20), Action::Reveal(1));
        assert_eq!(tl.next_due(), Some(t0 + Duration::from_millis(20)));
    }
}
