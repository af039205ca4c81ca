//! Resize scheduling driven by a simulated event loop.
//!
//! The host below queues paint callbacks and timers against a logical clock,
//! the way a browser would deliver `requestAnimationFrame` and `setTimeout`.
//! Tests pump the loop and check what the controller produced.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use imagescale::*;

#[derive(Default)]
struct EventLoop {
    now: Duration,
    frames: Vec<SessionHandle>,
    timers: Vec<(Duration, SessionHandle)>,
    reports: Vec<(SessionHandle, Diagnostic)>,
}

impl Host for EventLoop {
    fn request_frame(&mut self, session: SessionHandle) -> bool {
        self.frames.push(session);
        true
    }

    fn start_timer(&mut self, session: SessionHandle, after: Duration) {
        self.timers.push((self.now + after, session));
    }

    fn report(&mut self, session: SessionHandle, diagnostic: &Diagnostic) {
        self.reports.push((session, diagnostic.clone()));
    }
}

struct Parent {
    outer: Size,
    inner: Size,
    src: &'static str,
}

impl Parent {
    fn new(w: f64, h: f64) -> Self {
        Self {
            outer: Size::new(w, h),
            inner: Size::new(w, h),
            src: "photo.jpg",
        }
    }
}

impl Surface for Parent {
    fn outer_size(&self) -> Size {
        self.outer
    }
    fn inner_size(&self) -> Size {
        self.inner
    }
    fn client_size(&self) -> Size {
        self.inner
    }
    fn source(&self) -> Option<&str> {
        Some(self.src)
    }
}

/// Deliver every queued paint callback.
fn paint(ctl: &mut ScaleController<EventLoop>, parent: &Parent) -> Vec<ScaleOutcome> {
    let frames: Vec<_> = ctl.host_mut().frames.drain(..).collect();
    frames
        .into_iter()
        .map(|s| ctl.frame_ready(s, parent).unwrap())
        .collect()
}

/// Advance the logical clock, firing due timers.
fn advance(ctl: &mut ScaleController<EventLoop>, by: Duration) {
    let host = ctl.host_mut();
    host.now += by;
    let now = host.now;
    let (due, later): (Vec<_>, Vec<_>) = host.timers.drain(..).partition(|(at, _)| *at <= now);
    host.timers = later;
    for (_, s) in due {
        ctl.timer_fired(s).unwrap();
    }
}

fn bind(ctl: &mut ScaleController<EventLoop>, options: ScaleOptions) -> SessionHandle {
    ctl.bind(
        Element::new(Size::new(100.0, 50.0)).source("photo.jpg"),
        options,
    ).unwrap()
}

#[test]
fn resize_burst_recomputes_once_per_paint() {
    let mut ctl = ScaleController::new(EventLoop::default());
    let img = bind(
        &mut ctl,
        ScaleOptions::default()
            .scale(ScalePolicy::BestFit)
            .rescale_on_resize(true),
    );
    assert!(ctl.wants_resize(img));

    let mut parent = Parent::new(200.0, 200.0);
    ctl.request_scale(img, &parent, ScaleRequest::initial())
        .unwrap();

    // Five resize events before the next paint.
    parent = Parent::new(400.0, 300.0);
    let scheduled: Vec<_> = (0..5)
        .map(|_| ctl.schedule_recompute(img, &parent).unwrap())
        .collect();
    assert_eq!(scheduled[0], RecomputeOutcome::Deferred);
    assert!(
        scheduled[1..]
            .iter()
            .all(|r| *r == RecomputeOutcome::AlreadyPending)
    );

    let out = paint(&mut ctl, &parent);
    assert_eq!(out.len(), 1);
    let placement = out[0].placement().unwrap();
    assert_eq!(placement.frame, Frame::new(0.0, 50.0, 400.0, 200.0));
    assert!(!placement.first_time);

    // A further paint with nothing scheduled does nothing.
    assert!(paint(&mut ctl, &parent).is_empty());
}

#[test]
fn resize_during_deferred_window_schedules_exactly_one_more() {
    let mut ctl = ScaleController::new(EventLoop::default());
    let img = bind(&mut ctl, ScaleOptions::default().rescale_on_resize(true));
    let parent = Parent::new(200.0, 200.0);
    ctl.request_scale(img, &parent, ScaleRequest::initial())
        .unwrap();

    let bigger = Parent::new(300.0, 300.0);
    ctl.schedule_recompute(img, &bigger).unwrap();
    let out = paint(&mut ctl, &bigger);
    assert!(out[0].placement().is_some());

    let smaller = Parent::new(250.0, 250.0);
    assert_eq!(
        ctl.schedule_recompute(img, &smaller).unwrap(),
        RecomputeOutcome::Deferred
    );
    assert_eq!(
        ctl.schedule_recompute(img, &smaller).unwrap(),
        RecomputeOutcome::AlreadyPending
    );
    assert_eq!(ctl.host().frames.len(), 1);
}

#[test]
fn window_resize_without_container_change_is_suppressed() {
    let mut ctl = ScaleController::new(EventLoop::default());
    let img = bind(&mut ctl, ScaleOptions::default().rescale_on_resize(true));
    let parent = Parent::new(200.0, 200.0);
    ctl.request_scale(img, &parent, ScaleRequest::initial())
        .unwrap();

    ctl.schedule_recompute(img, &parent).unwrap();
    let out = paint(&mut ctl, &parent);
    assert_eq!(
        out,
        vec![ScaleOutcome::Suppressed(Suppression::ContainerUnchanged)]
    );
}

#[test]
fn transition_window_expires_on_the_logical_clock() {
    let mut ctl = ScaleController::new(EventLoop::default());
    let img = bind(&mut ctl, ScaleOptions::default().rescale_on_resize(true));
    let parent = Parent::new(200.0, 200.0);
    ctl.request_scale(img, &parent, ScaleRequest::initial())
        .unwrap();

    let req = ScaleRequest::explicit()
        .scale(ScalePolicy::BestFit)
        .transition(Duration::from_millis(300));
    let out = ctl.request_scale(img, &parent, req).unwrap();
    assert_eq!(
        out.placement().unwrap().transition,
        Some(Duration::from_millis(300))
    );

    // Resizes during the window are swallowed.
    let resized = Parent::new(500.0, 500.0);
    ctl.schedule_recompute(img, &resized).unwrap();
    assert_eq!(
        paint(&mut ctl, &resized),
        vec![ScaleOutcome::Suppressed(Suppression::Transition)]
    );

    advance(&mut ctl, Duration::from_millis(299));
    assert_eq!(ctl.state(img), Some(SessionState::Suppressed));
    advance(&mut ctl, Duration::from_millis(1));
    assert_eq!(ctl.state(img), Some(SessionState::Warm));

    // The swallowed resize was never observed, so the next one computes.
    ctl.schedule_recompute(img, &resized).unwrap();
    let out = paint(&mut ctl, &resized);
    assert_eq!(
        out[0].placement().unwrap().frame,
        Frame::new(-250.0, 0.0, 1000.0, 500.0)
    );
}

#[test]
fn source_swap_requires_rebind() {
    let mut ctl = ScaleController::new(EventLoop::default());
    let img = bind(&mut ctl, ScaleOptions::default().rescale_on_resize(true));
    let mut parent = Parent::new(200.0, 200.0);
    ctl.request_scale(img, &parent, ScaleRequest::initial())
        .unwrap();

    parent = Parent {
        src: "other.jpg",
        ..Parent::new(300.0, 300.0)
    };
    ctl.schedule_recompute(img, &parent).unwrap();
    assert_eq!(paint(&mut ctl, &parent), vec![ScaleOutcome::SourceChanged]);
    assert!(!ctl.wants_resize(img));

    let rebound = ctl.bind(
        Element::new(Size::new(300.0, 300.0)).source("other.jpg"),
        ScaleOptions::default(),
    ).unwrap();
    assert_ne!(rebound, img);
    let out = ctl
        .request_scale(rebound, &parent, ScaleRequest::initial())
        .unwrap();
    assert!(out.placement().unwrap().first_time);
}

#[test]
fn did_scale_runs_after_each_frame() {
    let count = Rc::new(Cell::new(0));
    let seen = Rc::clone(&count);
    let mut ctl = ScaleController::new(EventLoop::default());
    let img = bind(
        &mut ctl,
        ScaleOptions::default().did_scale(move |_, _| {
            seen.set(seen.get() + 1);
            Ok(())
        }),
    );
    let parent = Parent::new(200.0, 200.0);
    ctl.request_scale(img, &parent, ScaleRequest::initial())
        .unwrap();
    ctl.schedule_recompute(img, &parent).unwrap();
    paint(&mut ctl, &parent);
    // The suppressed resize did not call back.
    assert_eq!(count.get(), 1);

    ctl.schedule_recompute(img, &Parent::new(120.0, 80.0)).unwrap();
    paint(&mut ctl, &Parent::new(120.0, 80.0));
    assert_eq!(count.get(), 2);
}

#[test]
fn diagnostics_respect_log_level() {
    let mut ctl = ScaleController::new(EventLoop::default());
    let quiet = ctl.bind(
        Element::new(Size::new(0.0, 10.0)).scale_attr("huge"),
        ScaleOptions::default().log_level(LogLevel::Errors),
    ).unwrap();
    let loud = ctl.bind(
        Element::new(Size::new(0.0, 10.0)).scale_attr("huge"),
        ScaleOptions::default().log_level(LogLevel::from_u8(3)),
    ).unwrap();
    let parent = Parent::new(100.0, 100.0);
    for s in [quiet, loud] {
        let r = ctl.request_scale(s, &parent, ScaleRequest::initial());
        assert!(matches!(r, Err(ScaleError::InvalidGeometry(_))));
    }

    let reports = &ctl.host().reports;
    let quiet_reports: Vec<_> = reports.iter().filter(|(s, _)| *s == quiet).collect();
    let loud_reports: Vec<_> = reports.iter().filter(|(s, _)| *s == loud).collect();
    assert_eq!(quiet_reports.len(), 1);
    assert!(matches!(
        quiet_reports[0].1,
        Diagnostic::InvalidGeometry { .. }
    ));
    assert_eq!(loud_reports.len(), 2);
    assert_eq!(loud_reports[0].1.severity(), Severity::Warning);
    assert_eq!(loud_reports[1].1.severity(), Severity::Error);
}
