//! Cue-point scheduling core.
//!
//! A [`CueRuntime`] owns cue points and the cooperative timer queue backing
//! them. The host calls [`CueRuntime::advance`] as host time passes and
//! [`CueRuntime::on_time_update`] on every media `timeupdate` notification;
//! triggers transition `Idle -> Armed -> Active -> Idle` in response.
//!
//! Media time updates arrive at coarse, irregular intervals (typically every
//! 200-250 ms), so a trigger cannot fire off the updates alone without
//! skipping over its in-time. Instead, the first update inside the pre-roll
//! window `[in_time - 0.5s, in_time)` arms a precise one-shot timer for the
//! remaining delta; the timer, not the update, fires the start transition.

use tracing::{debug, warn};

use crate::cue::timer::{TimerId, TimerQueue};
use crate::cue::transport::MediaTransport;
use crate::foundation::error::{MetascoreError, MetascoreResult};

/// Pre-roll window ahead of a trigger's in-time within which its precise
/// start timer is armed.
pub const PRE_ROLL_SECONDS: f64 = 0.5;

/// Poll period used by active triggers to detect window exit between media
/// time updates.
pub(crate) const ACTIVE_POLL_SECONDS: f64 = 0.1;

/// Callback invoked on a trigger transition.
pub type TriggerCallback = Box<dyn FnMut(&mut dyn MediaTransport) -> MetascoreResult<()>>;

/// One registered time window with transition callbacks.
///
/// Built with [`Trigger::at`] plus the chainable setters.
pub struct Trigger {
    /// Window start in media seconds.
    pub in_time: f64,
    /// Window end in media seconds; `None` leaves the window open-ended.
    pub out_time: Option<f64>,
    /// Invoked when the window is entered.
    pub on_start: Option<TriggerCallback>,
    /// Invoked when the trigger returns to idle.
    pub on_stop: Option<TriggerCallback>,
    /// Invoked when playback crosses the window end.
    pub on_seekout: Option<TriggerCallback>,
    /// Remove the trigger after its first seek-out.
    pub single_shot: bool,
}

impl Trigger {
    /// A trigger entering at `in_time`, with no end, callbacks, or teardown.
    pub fn at(in_time: f64) -> Self {
        Self {
            in_time,
            out_time: None,
            on_start: None,
            on_stop: None,
            on_seekout: None,
            single_shot: false,
        }
    }

    /// Close the window at `out_time` (exclusive).
    pub fn until(mut self, out_time: f64) -> Self {
        self.out_time = Some(out_time);
        self
    }

    /// Remove the trigger after its first seek-out.
    pub fn single_shot(mut self) -> Self {
        self.single_shot = true;
        self
    }

    /// Set the start callback.
    pub fn on_start(mut self, f: TriggerCallback) -> Self {
        self.on_start = Some(f);
        self
    }

    /// Set the stop callback.
    pub fn on_stop(mut self, f: TriggerCallback) -> Self {
        self.on_stop = Some(f);
        self
    }

    /// Set the seek-out callback.
    pub fn on_seekout(mut self, f: TriggerCallback) -> Self {
        self.on_seekout = Some(f);
        self
    }

    fn contains(&self, time: f64) -> bool {
        time >= self.in_time && self.out_time.is_none_or(|out| time < out)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TriggerState {
    Idle,
    Armed,
    Active,
}

struct TriggerSlot {
    trigger: Trigger,
    state: TriggerState,
    timer: Option<TimerId>,
    interval: Option<TimerId>,
}

/// Identifier of a cue point within a [`CueRuntime`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CuePointId(u32);

/// A runtime object tracking an ordered set of time-window triggers against
/// the media clock. Trigger indices are stable for the trigger's lifetime.
struct CuePoint {
    slots: Vec<Option<TriggerSlot>>,
}

#[derive(Clone, Copy, Debug)]
struct TimerPayload {
    cue: CuePointId,
    index: usize,
    kind: TimerKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TimerKind {
    Start,
    Poll,
}

enum Exit {
    Stay,
    SeekOut,
    Before,
}

/// Owns cue points and their timers.
///
/// Within one time update, triggers are evaluated in registration order.
/// Backward seeks are tolerated by re-evaluating window membership from the
/// current time rather than assuming monotonic entry.
pub struct CueRuntime {
    timers: TimerQueue<TimerPayload>,
    cue_points: Vec<Option<CuePoint>>,
}

impl CueRuntime {
    /// Create an empty runtime at host time zero.
    pub fn new() -> Self {
        Self {
            timers: TimerQueue::new(),
            cue_points: Vec::new(),
        }
    }

    /// Host time in seconds, as of the last [`CueRuntime::advance`].
    pub fn host_now(&self) -> f64 {
        self.timers.now()
    }

    /// Register an empty cue point.
    pub fn create_cue_point(&mut self) -> CuePointId {
        let id = CuePointId(self.cue_points.len() as u32);
        self.cue_points.push(Some(CuePoint { slots: Vec::new() }));
        id
    }

    /// Remove a cue point, synchronously clearing every pending timer owned
    /// by its triggers. No callbacks are invoked.
    pub fn remove_cue_point(&mut self, id: CuePointId) {
        let Some(entry) = self.cue_points.get_mut(id.0 as usize) else {
            return;
        };
        if let Some(mut cp) = entry.take() {
            for slot in cp.slots.iter_mut().filter_map(Option::take) {
                clear_slot_timers(&mut self.timers, slot);
            }
        }
    }

    /// Add a trigger to a cue point; the returned index is stable for the
    /// trigger's lifetime.
    pub fn add_trigger(&mut self, cue: CuePointId, trigger: Trigger) -> MetascoreResult<usize> {
        if let Some(out) = trigger.out_time
            && out < trigger.in_time
        {
            return Err(MetascoreError::validation(
                "trigger out_time must be >= in_time",
            ));
        }
        let cp = self
            .cue_points
            .get_mut(cue.0 as usize)
            .and_then(Option::as_mut)
            .ok_or_else(|| MetascoreError::validation("unknown cue point"))?;
        cp.slots.push(Some(TriggerSlot {
            trigger,
            state: TriggerState::Idle,
            timer: None,
            interval: None,
        }));
        Ok(cp.slots.len() - 1)
    }

    /// Remove a trigger by index, synchronously clearing its pending timer
    /// and interval. When the trigger is active and `fire_stop` is set, its
    /// stop callback runs before teardown.
    pub fn remove_trigger(
        &mut self,
        cue: CuePointId,
        index: usize,
        fire_stop: bool,
        media: &mut dyn MediaTransport,
    ) {
        let Some(cp) = self
            .cue_points
            .get_mut(cue.0 as usize)
            .and_then(Option::as_mut)
        else {
            return;
        };
        let Some(mut slot) = cp.slots.get_mut(index).and_then(Option::take) else {
            return;
        };
        if slot.state == TriggerState::Active && fire_stop {
            run_callback(&mut slot.trigger.on_stop, media, "on_stop");
        }
        clear_slot_timers(&mut self.timers, slot);
    }

    /// Evaluate every trigger against the current media time.
    ///
    /// Call on each media `timeupdate` notification and after seeks. A
    /// callback failure is isolated to its trigger; the remaining triggers in
    /// the tick are still evaluated.
    pub fn on_time_update(&mut self, media: &mut dyn MediaTransport) {
        let time = media.current_time();
        for ci in 0..self.cue_points.len() {
            let cue = CuePointId(ci as u32);
            let Some(cp) = self.cue_points[ci].as_mut() else {
                continue;
            };
            let mut removals = Vec::new();
            for index in 0..cp.slots.len() {
                let Some(slot) = cp.slots[index].as_mut() else {
                    continue;
                };
                let payload = TimerPayload {
                    cue,
                    index,
                    kind: TimerKind::Start,
                };
                match slot.state {
                    TriggerState::Idle => {
                        if time >= slot.trigger.in_time - PRE_ROLL_SECONDS
                            && time < slot.trigger.in_time
                        {
                            let delay = slot.trigger.in_time - time;
                            slot.timer = Some(self.timers.set_timeout(delay, payload));
                            slot.state = TriggerState::Armed;
                            debug!(cue = ci, index, delay, "armed trigger");
                        } else if slot.trigger.contains(time) {
                            // A seek can land inside the window without ever
                            // crossing the pre-roll; start immediately.
                            start_slot(&mut self.timers, slot, payload, media);
                        }
                    }
                    TriggerState::Armed => {
                        let seeked_away = time < slot.trigger.in_time - PRE_ROLL_SECONDS
                            || slot.trigger.out_time.is_some_and(|out| time >= out);
                        if slot.trigger.contains(time) {
                            // Overdue: the precise timer has not fired yet but
                            // media time is already inside the window.
                            start_slot(&mut self.timers, slot, payload, media);
                        } else if seeked_away {
                            disarm_slot(&mut self.timers, slot);
                        }
                    }
                    TriggerState::Active => {
                        if apply_exit(&mut self.timers, slot, time, media) {
                            removals.push(index);
                        }
                    }
                }
            }
            for index in removals {
                if let Some(slot) = cp.slots[index].take() {
                    clear_slot_timers(&mut self.timers, slot);
                }
            }
        }
    }

    /// Advance host time, firing due trigger timers and polls.
    pub fn advance(&mut self, now: f64, media: &mut dyn MediaTransport) {
        let mut fired = Vec::new();
        self.timers.advance(now, &mut fired);
        for (id, payload) in fired {
            let Some(cp) = self
                .cue_points
                .get_mut(payload.cue.0 as usize)
                .and_then(Option::as_mut)
            else {
                continue;
            };
            let Some(slot) = cp.slots.get_mut(payload.index).and_then(Option::as_mut) else {
                continue;
            };
            let remove = match payload.kind {
                TimerKind::Start => {
                    if slot.state == TriggerState::Armed && slot.timer == Some(id) {
                        slot.timer = None;
                        start_slot(&mut self.timers, slot, payload, media);
                    }
                    false
                }
                TimerKind::Poll => {
                    slot.state == TriggerState::Active
                        && apply_exit(&mut self.timers, slot, media.current_time(), media)
                }
            };
            if remove && let Some(slot) = cp.slots[payload.index].take() {
                clear_slot_timers(&mut self.timers, slot);
            }
        }
    }
}

impl Default for CueRuntime {
    fn default() -> Self {
        Self::new()
    }
}

fn clear_slot_timers(timers: &mut TimerQueue<TimerPayload>, mut slot: TriggerSlot) {
    if let Some(id) = slot.timer.take() {
        timers.clear(id);
    }
    if let Some(id) = slot.interval.take() {
        timers.clear(id);
    }
}

fn disarm_slot(timers: &mut TimerQueue<TimerPayload>, slot: &mut TriggerSlot) {
    if let Some(id) = slot.timer.take() {
        timers.clear(id);
    }
    slot.state = TriggerState::Idle;
}

fn start_slot(
    timers: &mut TimerQueue<TimerPayload>,
    slot: &mut TriggerSlot,
    payload: TimerPayload,
    media: &mut dyn MediaTransport,
) {
    if let Some(id) = slot.timer.take() {
        timers.clear(id);
    }
    slot.state = TriggerState::Active;
    if slot.trigger.out_time.is_some() {
        slot.interval = Some(timers.set_interval(
            ACTIVE_POLL_SECONDS,
            TimerPayload {
                kind: TimerKind::Poll,
                ..payload
            },
        ));
    }
    debug!(cue = payload.cue.0, index = payload.index, "trigger start");
    run_callback(&mut slot.trigger.on_start, media, "on_start");
}

/// Evaluate an active trigger's exit condition and apply it. Returns whether
/// the slot must be removed (single-shot trigger past its seek-out).
fn apply_exit(
    timers: &mut TimerQueue<TimerPayload>,
    slot: &mut TriggerSlot,
    time: f64,
    media: &mut dyn MediaTransport,
) -> bool {
    let exit = match slot.trigger.out_time {
        Some(out) if time >= out => Exit::SeekOut,
        _ if time < slot.trigger.in_time => Exit::Before,
        _ => Exit::Stay,
    };
    match exit {
        Exit::Stay => false,
        Exit::SeekOut => {
            if let Some(id) = slot.interval.take() {
                timers.clear(id);
            }
            slot.state = TriggerState::Idle;
            run_callback(&mut slot.trigger.on_seekout, media, "on_seekout");
            run_callback(&mut slot.trigger.on_stop, media, "on_stop");
            slot.trigger.single_shot
        }
        Exit::Before => {
            if let Some(id) = slot.interval.take() {
                timers.clear(id);
            }
            slot.state = TriggerState::Idle;
            run_callback(&mut slot.trigger.on_stop, media, "on_stop");
            false
        }
    }
}

fn run_callback(
    callback: &mut Option<TriggerCallback>,
    media: &mut dyn MediaTransport,
    what: &'static str,
) {
    if let Some(f) = callback.as_mut()
        && let Err(err) = f(media)
    {
        warn!(callback = what, error = %err, "trigger callback failed; continuing tick");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cue/engine.rs"]
mod tests;
