//! Media transport seam and ranged playback.

use tracing::debug;

use crate::cue::engine::{CuePointId, CueRuntime, Trigger};
use crate::foundation::error::MetascoreResult;

/// Media playback transport and clock, implemented by the host player.
///
/// The engine only reads the clock and drives the transport; rendering and
/// codec concerns stay on the host side of this seam.
pub trait MediaTransport {
    /// Current playback position in seconds.
    fn current_time(&self) -> f64;
    /// Total media duration in seconds.
    fn duration(&self) -> f64;
    /// Seek to an absolute position in seconds.
    fn seek(&mut self, time: f64);
    /// Begin or resume playback.
    fn play(&mut self);
    /// Pause playback.
    fn pause(&mut self);
    /// Whether the transport is currently playing.
    fn is_playing(&self) -> bool;
}

/// Completion callback for ranged playback.
pub type ThenCallback = Box<dyn FnMut()>;

/// Transport facade layering ranged playback on top of the cue runtime.
///
/// Ranged playback is a composition, not a transport feature: a single-shot
/// cue point over `[from, to)` whose seek-out pauses the media, invokes the
/// completion callback, and tears itself down.
#[derive(Default)]
pub struct MediaController {
    range_cue: Option<CuePointId>,
}

impl MediaController {
    /// Create a controller with no active range.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start playback, optionally over the range `[from, to)`.
    ///
    /// Any previous range is torn down first. When `to` is given, a
    /// single-shot cue point is registered whose seek-out pauses the media
    /// and invokes `then` exactly once. When `from` is given, the transport
    /// seeks there before starting. `play()` is always invoked at the end of
    /// setup, range or not.
    pub fn play(
        &mut self,
        cues: &mut CueRuntime,
        media: &mut dyn MediaTransport,
        from: Option<f64>,
        to: Option<f64>,
        then: Option<ThenCallback>,
    ) -> MetascoreResult<()> {
        self.clear_range(cues);

        if let Some(to) = to {
            let cue = cues.create_cue_point();
            let mut then = then;
            let trigger = Trigger::at(from.unwrap_or(0.0))
                .until(to)
                .single_shot()
                .on_seekout(Box::new(move |media| {
                    media.pause();
                    if let Some(f) = then.as_mut() {
                        f();
                    }
                    Ok(())
                }));
            cues.add_trigger(cue, trigger)?;
            self.range_cue = Some(cue);
            debug!(from = from.unwrap_or(0.0), to, "registered playback range");
        }

        if let Some(from) = from {
            media.seek(from);
        }
        media.play();
        Ok(())
    }

    /// Pause playback, keeping any active range registered.
    pub fn pause(&self, media: &mut dyn MediaTransport) {
        media.pause();
    }

    /// Stop playback: tear down any active range, pause, and rewind.
    pub fn stop(&mut self, cues: &mut CueRuntime, media: &mut dyn MediaTransport) {
        self.clear_range(cues);
        media.pause();
        media.seek(0.0);
    }

    /// Tear down the active playback range, if any. No callbacks fire.
    pub fn clear_range(&mut self, cues: &mut CueRuntime) {
        if let Some(cue) = self.range_cue.take() {
            cues.remove_cue_point(cue);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cue/transport.rs"]
mod tests;
