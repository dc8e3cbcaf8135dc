use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

use calloop::EventLoop;
use glide::prelude::*;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn setup() -> (Compositor, ManualClock, SurfaceId) {
    init_logging();
    let clock = ManualClock::new(1000);
    let mut compositor = Compositor::with_clock(CompositorConfig::default(), clock.clone());
    let surface = compositor.add_surface(Surface::new(Geometry::new(10.0, 10.0, 300.0, 200.0)));
    (compositor, clock, surface)
}

fn done_counter() -> (Rc<RefCell<Vec<AnimationId>>>, impl Fn() -> Option<glide::animation::DoneCallback>) {
    let finished = Rc::new(RefCell::new(Vec::new()));
    let sink = finished.clone();
    let make = move || {
        let sink = sink.clone();
        let callback: glide::animation::DoneCallback = Box::new(move |id| sink.borrow_mut().push(id));
        Some(callback)
    };
    (finished, make)
}

#[test]
fn test_zoom_runs_to_completion() {
    let (mut compositor, clock, surface) = setup();
    let (finished, done) = done_counter();

    let zoom = compositor
        .zoom_run(surface, 0.3, 1.0, done())
        .expect("surface exists");

    let mut frames = 0;
    while compositor.animations().contains(zoom) {
        clock.advance(16);
        compositor.repaint();

        let s = compositor.scene().get(surface).expect("surface alive");
        assert!(s.alpha <= 1.0);
        frames += 1;
        assert!(frames < 200, "zoom never finished");
    }

    let s = compositor.scene().get(surface).expect("surface alive");
    assert_eq!(s.transform_count(), 0);
    assert!(s.destroy_signal().is_empty());
    assert!(s.geometry.dirty);
    assert_eq!(*finished.borrow(), vec![zoom]);
}

#[test]
fn test_zoom_keeps_surface_center_fixed() {
    let (mut compositor, clock, surface) = setup();
    compositor
        .zoom_run(surface, 0.5, 1.0, None)
        .expect("surface exists");

    clock.advance(100);
    compositor.repaint();

    let s = compositor.scene().get(surface).expect("surface alive");
    let (cx, cy) = s.transform().transform_point(150.0, 100.0);
    assert!((cx - 150.0).abs() < 1e-3);
    assert!((cy - 100.0).abs() < 1e-3);

    // Corner moves inwards while the zoom is below full scale.
    let (x, y) = s.transform().transform_point(0.0, 0.0);
    assert!(x > 0.0 && y > 0.0);
}

#[test]
fn test_surface_destroyed_mid_flight_tears_down_once() {
    let (mut compositor, clock, surface) = setup();
    let (finished, done) = done_counter();

    let zoom = compositor
        .zoom_run(surface, 0.3, 1.0, done())
        .expect("surface exists");
    let fade = compositor.fade_run(surface, done()).expect("surface exists");

    clock.advance(48);
    compositor.repaint();
    assert_eq!(compositor.animations().len(), 2);

    let removed = compositor.destroy_surface(surface).expect("surface exists");
    assert_eq!(removed.transform_count(), 0);
    assert!(removed.destroy_signal().is_empty());
    assert!(compositor.animations().is_empty());
    assert_eq!(*finished.borrow(), vec![zoom, fade]);

    // Later frames find nothing left to tear down.
    clock.advance(5000);
    compositor.repaint();
    assert_eq!(finished.borrow().len(), 2);
}

#[test]
fn test_animation_on_missing_surface_fails_cleanly() {
    let (mut compositor, _clock, surface) = setup();
    compositor.destroy_surface(surface).expect("surface exists");

    let result = compositor.fade_run(surface, None);
    assert!(matches!(result, Err(Error::UnknownSurface(id)) if id == surface));
    assert!(compositor.animations().is_empty());
}

#[test]
fn test_event_loop_drives_animations() {
    let (mut compositor, clock, surface) = setup();
    let mut event_loop: EventLoop<Compositor> = EventLoop::try_new().expect("event loop");
    compositor
        .attach_repaint_source(&event_loop.handle())
        .expect("repaint source");

    let fade = compositor.fade_run(surface, None).expect("surface exists");

    clock.advance(5000);
    event_loop
        .dispatch(Some(Duration::ZERO), &mut compositor)
        .expect("dispatch");

    assert!(!compositor.animations().contains(fade));
    let s = compositor.scene().get(surface).expect("surface alive");
    assert!(s.geometry.dirty);
}

/// System clock that counts reads; each frame reads it once.
struct CountingClock {
    inner: MonotonicClock,
    reads: Rc<Cell<u32>>,
}

impl Clock for CountingClock {
    fn now_ms(&self) -> u32 {
        self.reads.set(self.reads.get() + 1);
        self.inner.now_ms()
    }
}

#[test]
fn test_event_loop_paces_frames_while_animating() {
    init_logging();
    let reads = Rc::new(Cell::new(0));
    let clock = CountingClock {
        inner: MonotonicClock::new(),
        reads: reads.clone(),
    };
    let config = CompositorConfig::new().frame_interval(Duration::from_millis(16));
    let mut compositor = Compositor::with_clock(config, clock);
    let surface = compositor.add_surface(Surface::new(Geometry::new(0.0, 0.0, 300.0, 200.0)));

    let mut event_loop: EventLoop<Compositor> = EventLoop::try_new().expect("event loop");
    compositor
        .attach_repaint_source(&event_loop.handle())
        .expect("repaint source");
    let fade = compositor.fade_run(surface, None).expect("surface exists");
    let before = reads.get();

    let window = Duration::from_millis(160);
    let started = Instant::now();
    while started.elapsed() < window {
        event_loop
            .dispatch(Some(window.saturating_sub(started.elapsed())), &mut compositor)
            .expect("dispatch");
    }

    // About one frame per 16ms, with room for timer jitter
    let frames = reads.get() - before;
    assert!(frames >= 2, "only {} frames in {:?}", frames, window);
    assert!(frames <= 30, "{} frames in {:?}", frames, window);
    assert!(compositor.animations().contains(fade));
    assert!(compositor.repaint_scheduler().is_pacing());
}
