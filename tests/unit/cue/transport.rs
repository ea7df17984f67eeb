use super::*;
use std::cell::Cell;
use std::rc::Rc;

struct StubMedia {
    time: f64,
    playing: bool,
    seeks: Vec<f64>,
    pauses: u32,
    plays: u32,
}

impl StubMedia {
    fn new() -> Self {
        Self {
            time: 0.0,
            playing: false,
            seeks: Vec::new(),
            pauses: 0,
            plays: 0,
        }
    }
}

impl MediaTransport for StubMedia {
    fn current_time(&self) -> f64 {
        self.time
    }
    fn duration(&self) -> f64 {
        60.0
    }
    fn seek(&mut self, time: f64) {
        self.time = time;
        self.seeks.push(time);
    }
    fn play(&mut self) {
        self.playing = true;
        self.plays += 1;
    }
    fn pause(&mut self) {
        self.playing = false;
        self.pauses += 1;
    }
    fn is_playing(&self) -> bool {
        self.playing
    }
}

fn tick(rt: &mut CueRuntime, media: &mut StubMedia, time: f64) {
    media.time = time;
    rt.advance(time, media);
    rt.on_time_update(media);
}

#[test]
fn ranged_playback_seeks_plays_and_completes_once() {
    let mut rt = CueRuntime::new();
    let mut media = StubMedia::new();
    let mut ctl = MediaController::new();

    let thens = Rc::new(Cell::new(0u32));
    let inner = Rc::clone(&thens);
    ctl.play(
        &mut rt,
        &mut media,
        Some(5.0),
        Some(8.0),
        Some(Box::new(move || inner.set(inner.get() + 1))),
    )
    .unwrap();

    assert_eq!(media.seeks, vec![5.0]);
    assert_eq!(media.plays, 1);
    assert!(media.is_playing());

    for t in [5.0, 5.2, 6.0, 7.0, 7.9, 8.0] {
        tick(&mut rt, &mut media, t);
    }
    assert_eq!(media.pauses, 1, "pause on reaching the range end");
    assert_eq!(thens.get(), 1, "completion callback fires once");

    // The cue point is torn down: a second pass over the boundary is silent.
    tick(&mut rt, &mut media, 4.0);
    for t in [7.9, 8.0, 8.2] {
        tick(&mut rt, &mut media, t);
    }
    assert_eq!(thens.get(), 1);
    assert_eq!(media.pauses, 1);
}

#[test]
fn play_without_a_range_still_plays_unconditionally() {
    let mut rt = CueRuntime::new();
    let mut media = StubMedia::new();
    let mut ctl = MediaController::new();

    ctl.play(&mut rt, &mut media, None, None, None).unwrap();
    assert!(media.seeks.is_empty());
    assert_eq!(media.plays, 1);

    ctl.play(&mut rt, &mut media, Some(3.0), None, None).unwrap();
    assert_eq!(media.seeks, vec![3.0]);
    assert_eq!(media.plays, 2);
}

#[test]
fn a_new_range_replaces_the_previous_one() {
    let mut rt = CueRuntime::new();
    let mut media = StubMedia::new();
    let mut ctl = MediaController::new();

    let first = Rc::new(Cell::new(0u32));
    let inner = Rc::clone(&first);
    ctl.play(
        &mut rt,
        &mut media,
        Some(0.0),
        Some(3.0),
        Some(Box::new(move || inner.set(inner.get() + 1))),
    )
    .unwrap();

    ctl.play(&mut rt, &mut media, Some(10.0), Some(12.0), None)
        .unwrap();

    // Crossing the first range end no longer fires its callback.
    for t in [10.5, 11.0] {
        tick(&mut rt, &mut media, t);
    }
    media.seek(3.5);
    rt.on_time_update(&mut media);
    assert_eq!(first.get(), 0);
}

#[test]
fn stop_rewinds_and_clears_the_range() {
    let mut rt = CueRuntime::new();
    let mut media = StubMedia::new();
    let mut ctl = MediaController::new();

    ctl.play(&mut rt, &mut media, Some(5.0), Some(8.0), None)
        .unwrap();
    tick(&mut rt, &mut media, 5.0);
    ctl.stop(&mut rt, &mut media);

    assert!(!media.is_playing());
    assert_eq!(media.seeks.last(), Some(&0.0));

    // The old range's boundary is inert after stop.
    let pauses_before = media.pauses;
    for t in [7.9, 8.0, 8.1] {
        tick(&mut rt, &mut media, t);
    }
    assert_eq!(media.pauses, pauses_before);
}
