//! Image fitting and alignment inside a container, with resize-driven rescheduling.
//!
//! The fitter is pure geometry: no state, no allocations, `no_std` compatible.
//! The controller needs `alloc`.
//!
//! # Modules
//!
//! - [`fit`]: Scale policies, alignment anchors and frame computation
//! - [`element`]: Bound element, attribute overrides, policy-name fallback
//! - [`options`]: Per-session configuration
//! - [`diagnostic`]: Leveled diagnostics routed to the host
//! - [`controller`]: Sessions, caching, transition suppression, resize scheduling

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod fit;

#[cfg(feature = "alloc")]
pub mod controller;
#[cfg(feature = "alloc")]
pub mod diagnostic;
#[cfg(feature = "alloc")]
pub mod element;
#[cfg(feature = "alloc")]
pub mod options;

pub use fit::{AlignPolicy, FitError, Frame, ScalePolicy, Size, compute_frame};

#[cfg(feature = "alloc")]
pub use controller::{
    Host, Placement, RecomputeOutcome, ScaleController, ScaleError, ScaleOutcome, ScaleRequest,
    SessionHandle, SessionState, Surface, Suppression, Trigger,
};
#[cfg(feature = "alloc")]
pub use diagnostic::{Diagnostic, LogLevel, Severity};
#[cfg(feature = "alloc")]
pub use element::{Element, PolicyWarning, resolve_align, resolve_scale};
#[cfg(feature = "alloc")]
pub use options::{CallbackError, ContainerRef, DidScale, ScaleOptions};
