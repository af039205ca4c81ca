//! Scale sessions: caching, suppression and resize scheduling.
//!
//! A [`ScaleController`] owns one session per bound element. All session
//! state is mutated through `&mut self`, so a controller has a single writer
//! by construction; hosts running several threads keep the controller on one
//! of them and forward events to it.
//!
//! The host drives everything:
//!
//! - [`Surface`] measures the container and reports the current image source.
//! - [`Host`] provides the next-frame and timer primitives, and receives
//!   diagnostics.
//!
//! ```text
//!     resize ─► schedule_recompute ─► Host::request_frame
//!                                           │
//!             frame callback ─► frame_ready ┴─► request_scale ─► Placement
//! ```
//!
//! # Example
//!
//! ```
//! use core::time::Duration;
//! use imagescale::*;
//!
//! struct Parent;
//! impl Surface for Parent {
//!     fn outer_size(&self) -> Size { Size::new(200.0, 200.0) }
//!     fn inner_size(&self) -> Size { Size::new(200.0, 200.0) }
//!     fn client_size(&self) -> Size { Size::new(200.0, 200.0) }
//! }
//!
//! struct NoFrames;
//! impl Host for NoFrames {
//!     fn request_frame(&mut self, _: SessionHandle) -> bool { false }
//!     fn start_timer(&mut self, _: SessionHandle, _: Duration) {}
//! }
//!
//! let mut ctl = ScaleController::new(NoFrames);
//! let img = ctl.bind(
//!     Element::new(Size::new(100.0, 50.0)),
//!     ScaleOptions::default().scale(ScalePolicy::BestFit),
//! ).unwrap();
//! let out = ctl.request_scale(img, &Parent, ScaleRequest::initial()).unwrap();
//! let placement = out.placement().unwrap();
//! assert_eq!(placement.frame, Frame::new(0.0, 50.0, 200.0, 100.0));
//! assert!(placement.first_time);
//! ```

use alloc::vec::Vec;
use core::time::Duration;

use crate::diagnostic::{self, Diagnostic};
use crate::element::{Element, PolicyWarning};
use crate::fit::{AlignPolicy, FitError, Frame, ScalePolicy, Size, compute_frame};
use crate::options::{CallbackError, ScaleOptions};

/// Host view of a bound element and the container it is scaled within.
pub trait Surface {
    /// Container border-box size (content + padding + border).
    fn outer_size(&self) -> Size;
    /// Container content-box size.
    fn inner_size(&self) -> Size;
    /// Container client size, used only to detect real resizes.
    fn client_size(&self) -> Size;
    /// Current image source, when the host tracks it.
    fn source(&self) -> Option<&str> {
        None
    }
}

/// Scheduling and reporting primitives supplied by the host.
pub trait Host {
    /// Ask for [`ScaleController::frame_ready`] at the next paint
    /// opportunity. Return `false` when no such facility exists; the
    /// recompute then runs immediately.
    fn request_frame(&mut self, session: SessionHandle) -> bool;

    /// Call [`ScaleController::timer_fired`] after `after` has elapsed.
    fn start_timer(&mut self, session: SessionHandle, after: Duration);

    /// Receive a diagnostic the session's log level admits.
    fn report(&mut self, session: SessionHandle, diagnostic: &Diagnostic) {
        diagnostic::trace(session, diagnostic);
    }
}

/// Identifies a session within its controller.
///
/// Slots are reused after a session ends; the generation tells a stale
/// handle apart from the session now occupying its slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionHandle {
    index: u32,
    generation: u32,
}

impl SessionHandle {
    /// Slot the session occupies.
    pub const fn index(self) -> u32 {
        self.index
    }

    /// How many sessions held this slot before this one.
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

/// What caused a scale request.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// First scale after bind.
    Initial,
    /// Container may have resized.
    Resize,
    /// Caller-initiated rescale (new policy, new destination, transition).
    Explicit,
}

/// Per-call parameters for [`ScaleController::request_scale`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScaleRequest {
    pub trigger: Trigger,
    /// Overrides the element attribute and the configured default.
    pub scale: Option<ScalePolicy>,
    /// Overrides the element attribute and the configured default.
    pub align: Option<AlignPolicy>,
    /// Replaces both measured container sizes.
    pub dest: Option<Size>,
    /// Animate to the new frame; requests are suppressed meanwhile.
    pub transition: Option<Duration>,
}

impl ScaleRequest {
    const fn with_trigger(trigger: Trigger) -> Self {
        Self {
            trigger,
            scale: None,
            align: None,
            dest: None,
            transition: None,
        }
    }

    pub const fn initial() -> Self {
        Self::with_trigger(Trigger::Initial)
    }

    pub const fn resize() -> Self {
        Self::with_trigger(Trigger::Resize)
    }

    pub const fn explicit() -> Self {
        Self::with_trigger(Trigger::Explicit)
    }

    pub fn scale(mut self, scale: ScalePolicy) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn align(mut self, align: AlignPolicy) -> Self {
        self.align = Some(align);
        self
    }

    pub fn dest(mut self, dest: Size) -> Self {
        self.dest = Some(dest);
        self
    }

    /// Zero disables the transition.
    pub fn transition(mut self, duration: Duration) -> Self {
        self.transition = (!duration.is_zero()).then_some(duration);
        self
    }

    pub fn is_first_time(&self) -> bool {
        self.trigger == Trigger::Initial
    }
}

/// A frame plus the presentation hints the host applies with it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Placement {
    /// Absolute position and size, relative to the container's padding box.
    pub frame: Frame,
    pub first_time: bool,
    /// Clip the container (first scale only).
    pub hide_parent_overflow: bool,
    /// Fade the element in (first scale only).
    pub fade_in: Option<Duration>,
    /// Animate to `frame` over this duration.
    pub transition: Option<Duration>,
}

/// Why a request produced no frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Suppression {
    /// Session was unbound or its source changed.
    Destroyed,
    /// A transition window is active.
    Transition,
    /// Resize notification, but the container client size did not change.
    ContainerUnchanged,
    /// Resize with the same destination and policies as the last frame.
    Unchanged,
}

/// Result of a scale request that did not fail.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ScaleOutcome {
    Scaled(Placement),
    Suppressed(Suppression),
    /// The image source changed. The session is destroyed; bind again.
    SourceChanged,
}

impl ScaleOutcome {
    /// The placement, if a frame was produced.
    pub fn placement(&self) -> Option<&Placement> {
        match self {
            Self::Scaled(p) => Some(p),
            _ => None,
        }
    }
}

/// Result of [`ScaleController::schedule_recompute`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RecomputeOutcome {
    /// A frame was requested; `frame_ready` will run the recompute.
    Deferred,
    /// A recompute was already pending. Nothing queued.
    AlreadyPending,
    /// No frame facility; the recompute ran synchronously.
    Immediate(ScaleOutcome),
    /// Session is destroyed.
    Destroyed,
}

/// Scale request failure.
///
/// Only [`Callback`](Self::Callback) carries a frame: the session already
/// recorded it as applied, so the host must still place the element.
#[derive(Debug, thiserror::Error)]
pub enum ScaleError {
    #[error("unknown session {0:?}")]
    UnknownSession(SessionHandle),
    #[error("session slots exhausted")]
    TooManySessions,
    #[error("no scale policy is set")]
    NoScalePolicy,
    #[error(transparent)]
    InvalidGeometry(#[from] FitError),
    #[error("did_scale callback failed")]
    Callback {
        placement: Placement,
        #[source]
        source: CallbackError,
    },
}

impl ScaleError {
    /// The frame computed before the failure, if any.
    pub fn placement(&self) -> Option<&Placement> {
        match self {
            Self::Callback { placement, .. } => Some(placement),
            _ => None,
        }
    }
}

/// Observable session state.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Bound, no frame produced yet.
    Cold,
    /// At least one frame produced.
    Warm,
    /// Inside a transition window.
    Suppressed,
    Destroyed,
}

struct ScaleSession {
    element: Element,
    options: ScaleOptions,
    /// Outer size and policies of the last computed frame.
    cached: Option<(Size, ScalePolicy, AlignPolicy)>,
    last_client: Option<Size>,
    in_transition: bool,
    pending_recompute: bool,
    warm: bool,
}

impl ScaleSession {
    fn new(element: Element, options: ScaleOptions) -> Self {
        Self {
            element,
            options,
            cached: None,
            last_client: None,
            in_transition: false,
            pending_recompute: false,
            warm: false,
        }
    }

    fn state(&self) -> SessionState {
        if self.in_transition {
            SessionState::Suppressed
        } else if self.warm {
            SessionState::Warm
        } else {
            SessionState::Cold
        }
    }

    fn report<H: Host>(&self, host: &mut H, handle: SessionHandle, diagnostic: Diagnostic) {
        if self.options.log_level.admits(diagnostic.severity()) {
            host.report(handle, &diagnostic);
        }
    }

    fn warn<H: Host>(&self, host: &mut H, handle: SessionHandle, warning: Option<PolicyWarning>) {
        if let Some(w) = warning {
            self.report(host, handle, Diagnostic::Unrecognized(w));
        }
    }

    /// Records the client size; returns whether it differs from the last one.
    fn observe_client(&mut self, client: Size) -> bool {
        let changed = self.last_client != Some(client);
        self.last_client = Some(client);
        changed
    }

    fn resolve_scale<H: Host>(
        &self,
        host: &mut H,
        handle: SessionHandle,
        request: &ScaleRequest,
    ) -> Option<ScalePolicy> {
        if let Some(p) = request.scale {
            return Some(p);
        }
        if let Some((p, warning)) = self.element.scale_override() {
            self.warn(host, handle, warning);
            return Some(p);
        }
        self.options.scale
    }

    fn resolve_align<H: Host>(
        &self,
        host: &mut H,
        handle: SessionHandle,
        request: &ScaleRequest,
    ) -> AlignPolicy {
        if let Some(a) = request.align {
            return a;
        }
        if let Some((a, warning)) = self.element.align_override() {
            self.warn(host, handle, warning);
            return a;
        }
        self.options.align
    }

    fn scale<H: Host, S: Surface + ?Sized>(
        &mut self,
        handle: SessionHandle,
        host: &mut H,
        surface: &S,
        request: ScaleRequest,
    ) -> Result<ScaleOutcome, ScaleError> {
        if self.in_transition {
            return Ok(ScaleOutcome::Suppressed(Suppression::Transition));
        }

        let first_time = request.is_first_time();
        if !first_time
            && let (Some(bound), Some(current)) = (self.element.source.as_deref(), surface.source())
            && bound != current
        {
            tracing::debug!(session = handle.index(), "image source changed, rebind required");
            return Ok(ScaleOutcome::SourceChanged);
        }

        match request.trigger {
            Trigger::Resize => {
                if !self.observe_client(surface.client_size()) {
                    return Ok(ScaleOutcome::Suppressed(Suppression::ContainerUnchanged));
                }
            }
            Trigger::Initial => {
                self.observe_client(surface.client_size());
            }
            Trigger::Explicit => {}
        }

        let transition = match request.trigger {
            Trigger::Explicit => request.transition.or(self.options.transition),
            _ => request.transition,
        };
        if let Some(window) = transition {
            self.in_transition = true;
            host.start_timer(handle, window);
        }

        let (outer, inner) = match request.dest {
            Some(dest) => (dest, dest),
            None => (surface.outer_size(), surface.inner_size()),
        };
        let width_offset = outer.width - inner.width;
        let height_offset = outer.height - inner.height;

        let Some(scale) = self.resolve_scale(host, handle, &request) else {
            self.report(host, handle, Diagnostic::NoScalePolicy);
            return Err(ScaleError::NoScalePolicy);
        };
        let align = self.resolve_align(host, handle, &request);

        if let Some((cached_dest, cached_scale, cached_align)) = self.cached
            && cached_dest == outer
        {
            self.report(
                host,
                handle,
                Diagnostic::DestinationUnchanged {
                    dest_size: outer,
                    scale,
                },
            );
            if request.trigger == Trigger::Resize
                && cached_scale == scale
                && cached_align == align
            {
                return Ok(ScaleOutcome::Suppressed(Suppression::Unchanged));
            }
        }

        let source = self.element.intrinsic;
        let frame = match compute_frame(scale, align, source, outer) {
            Ok(frame) => frame,
            Err(e) => {
                self.report(
                    host,
                    handle,
                    Diagnostic::InvalidGeometry {
                        source_size: source,
                        dest_size: outer,
                    },
                );
                return Err(e.into());
            }
        };
        self.cached = Some((outer, scale, align));
        self.warm = true;

        let placement = Placement {
            frame: frame.translate(-width_offset / 2.0, -height_offset / 2.0),
            first_time,
            hide_parent_overflow: first_time && self.options.hide_parent_overflow,
            fade_in: if first_time { self.options.fade_in } else { None },
            transition,
        };

        if let Some(did_scale) = self.options.did_scale.as_mut()
            && let Err(source) = did_scale(first_time, &request)
        {
            return Err(ScaleError::Callback { placement, source });
        }

        Ok(ScaleOutcome::Scaled(placement))
    }
}

struct Slot {
    generation: u32,
    session: Option<ScaleSession>,
}

/// The live session behind `handle`, `None` once it has ended.
fn entry(slots: &mut [Slot], handle: SessionHandle) -> Result<Option<&mut ScaleSession>, ScaleError> {
    match slots.get_mut(handle.index as usize) {
        Some(slot) if slot.generation == handle.generation => Ok(slot.session.as_mut()),
        Some(slot) if slot.generation > handle.generation => Ok(None),
        _ => Err(ScaleError::UnknownSession(handle)),
    }
}

/// Owns scale sessions and the host they report to.
pub struct ScaleController<H: Host> {
    host: H,
    slots: Vec<Slot>,
    /// Vacant slot indices, reused by `bind`.
    free: Vec<u32>,
}

impl<H: Host> ScaleController<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    /// Start a session for `element`. The first request always computes.
    pub fn bind(
        &mut self,
        element: Element,
        options: ScaleOptions,
    ) -> Result<SessionHandle, ScaleError> {
        let session = ScaleSession::new(element, options);
        let handle = if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.session = Some(session);
            SessionHandle {
                index,
                generation: slot.generation,
            }
        } else {
            let index =
                u32::try_from(self.slots.len()).map_err(|_| ScaleError::TooManySessions)?;
            self.slots.push(Slot {
                generation: 0,
                session: Some(session),
            });
            SessionHandle {
                index,
                generation: 0,
            }
        };
        tracing::debug!(
            session = handle.index(),
            generation = handle.generation(),
            "bound"
        );
        Ok(handle)
    }

    /// End a session. Later requests and pending recomputes are suppressed.
    pub fn unbind(&mut self, handle: SessionHandle) -> Result<(), ScaleError> {
        entry(&mut self.slots, handle)?;
        self.retire(handle);
        tracing::debug!(session = handle.index(), "unbound");
        Ok(())
    }

    /// Number of sessions currently bound.
    pub fn live_sessions(&self) -> usize {
        self.slots.iter().filter(|s| s.session.is_some()).count()
    }

    /// `None` for a handle this controller never issued.
    pub fn state(&self, handle: SessionHandle) -> Option<SessionState> {
        if let Some(session) = self.live(handle) {
            return Some(session.state());
        }
        self.slots
            .get(handle.index as usize)
            .is_some_and(|s| s.generation >= handle.generation)
            .then_some(SessionState::Destroyed)
    }

    /// Whether the host should forward resize notifications for `handle`.
    pub fn wants_resize(&self, handle: SessionHandle) -> bool {
        self.live(handle)
            .is_some_and(|s| s.options.rescale_on_resize)
    }

    pub fn options(&self, handle: SessionHandle) -> Option<&ScaleOptions> {
        self.live(handle).map(|s| &s.options)
    }

    /// Compute and return the placement for `handle` inside `surface`.
    pub fn request_scale<S: Surface + ?Sized>(
        &mut self,
        handle: SessionHandle,
        surface: &S,
        request: ScaleRequest,
    ) -> Result<ScaleOutcome, ScaleError> {
        let Some(session) = entry(&mut self.slots, handle)? else {
            return Ok(ScaleOutcome::Suppressed(Suppression::Destroyed));
        };
        let outcome = session.scale(handle, &mut self.host, surface, request);
        if matches!(outcome, Ok(ScaleOutcome::SourceChanged)) {
            self.retire(handle);
        }
        outcome
    }

    /// Schedule one resize recompute for the next paint opportunity.
    ///
    /// At most one recompute is pending per session; further calls before
    /// [`frame_ready`](Self::frame_ready) are dropped.
    pub fn schedule_recompute<S: Surface + ?Sized>(
        &mut self,
        handle: SessionHandle,
        surface: &S,
    ) -> Result<RecomputeOutcome, ScaleError> {
        let Some(session) = entry(&mut self.slots, handle)? else {
            return Ok(RecomputeOutcome::Destroyed);
        };
        if session.pending_recompute {
            return Ok(RecomputeOutcome::AlreadyPending);
        }

        session.pending_recompute = true;
        if self.host.request_frame(handle) {
            return Ok(RecomputeOutcome::Deferred);
        }
        session.pending_recompute = false;
        let outcome = session.scale(handle, &mut self.host, surface, ScaleRequest::resize());
        if matches!(outcome, Ok(ScaleOutcome::SourceChanged)) {
            self.retire(handle);
        }
        outcome.map(RecomputeOutcome::Immediate)
    }

    /// Run the recompute deferred by [`schedule_recompute`](Self::schedule_recompute).
    ///
    /// The pending flag clears before the request runs, so a resize arriving
    /// from here on schedules exactly one more.
    pub fn frame_ready<S: Surface + ?Sized>(
        &mut self,
        handle: SessionHandle,
        surface: &S,
    ) -> Result<ScaleOutcome, ScaleError> {
        let Some(session) = entry(&mut self.slots, handle)? else {
            return Ok(ScaleOutcome::Suppressed(Suppression::Destroyed));
        };
        session.pending_recompute = false;
        self.request_scale(handle, surface, ScaleRequest::resize())
    }

    /// End the transition window started by a request.
    pub fn timer_fired(&mut self, handle: SessionHandle) -> Result<(), ScaleError> {
        if let Some(session) = entry(&mut self.slots, handle)? {
            session.in_transition = false;
        }
        Ok(())
    }

    fn live(&self, handle: SessionHandle) -> Option<&ScaleSession> {
        self.slots
            .get(handle.index as usize)
            .filter(|s| s.generation == handle.generation)
            .and_then(|s| s.session.as_ref())
    }

    /// Drop the session behind `handle` and free its slot.
    fn retire(&mut self, handle: SessionHandle) {
        let Some(slot) = self.slots.get_mut(handle.index as usize) else {
            return;
        };
        if slot.generation != handle.generation || slot.session.take().is_none() {
            return;
        }
        // A slot whose generation would wrap stays vacant for good.
        if let Some(next) = slot.generation.checked_add(1) {
            slot.generation = next;
            self.free.push(handle.index);
        }
    }
}
