//! Per-session configuration.

use alloc::boxed::Box;
use core::fmt;
use core::time::Duration;

use crate::controller::ScaleRequest;
use crate::diagnostic::LogLevel;
use crate::fit::{AlignPolicy, ScalePolicy};

/// Error returned by a [`DidScale`] callback.
pub type CallbackError = Box<dyn core::error::Error + Send + Sync>;

/// Called after each successful scale with `(first_time, request)`.
pub type DidScale = Box<dyn FnMut(bool, &ScaleRequest) -> Result<(), CallbackError>>;

/// Opaque host reference to the container an element is scaled within.
///
/// `None` in [`ScaleOptions::parent`] means the element's direct parent.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ContainerRef(pub u64);

/// Options for one bound element.
///
/// Defaults: best-fill, centered, parent overflow hidden, no fade-in, no
/// resize tracking, silent.
///
/// ```
/// use imagescale::{AlignPolicy, LogLevel, ScaleOptions, ScalePolicy};
///
/// let opts = ScaleOptions::default()
///     .scale(ScalePolicy::BestFit)
///     .align(AlignPolicy::Top)
///     .rescale_on_resize(true)
///     .log_level(LogLevel::Warnings);
/// assert_eq!(opts.scale, Some(ScalePolicy::BestFit));
/// ```
pub struct ScaleOptions {
    /// Default scale policy. `None` makes every request fail with
    /// `NoScalePolicy` unless the element or request names one.
    pub scale: Option<ScalePolicy>,
    pub align: AlignPolicy,
    /// Host should forward resize notifications to `schedule_recompute`.
    pub rescale_on_resize: bool,
    /// Clip the container on the first scale.
    pub hide_parent_overflow: bool,
    /// Fade the element in after the first scale.
    pub fade_in: Option<Duration>,
    /// Transition for explicit requests that don't carry their own.
    pub transition: Option<Duration>,
    pub log_level: LogLevel,
    pub parent: Option<ContainerRef>,
    pub did_scale: Option<DidScale>,
}

impl Default for ScaleOptions {
    fn default() -> Self {
        Self {
            scale: Some(ScalePolicy::BestFill),
            align: AlignPolicy::Center,
            rescale_on_resize: false,
            hide_parent_overflow: true,
            fade_in: None,
            transition: None,
            log_level: LogLevel::Silent,
            parent: None,
            did_scale: None,
        }
    }
}

impl fmt::Debug for ScaleOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScaleOptions")
            .field("scale", &self.scale)
            .field("align", &self.align)
            .field("rescale_on_resize", &self.rescale_on_resize)
            .field("hide_parent_overflow", &self.hide_parent_overflow)
            .field("fade_in", &self.fade_in)
            .field("transition", &self.transition)
            .field("log_level", &self.log_level)
            .field("parent", &self.parent)
            .field("did_scale", &self.did_scale.as_ref().map(|_| ".."))
            .finish()
    }
}

impl ScaleOptions {
    /// Set the default scale policy.
    pub fn scale(mut self, scale: ScalePolicy) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Clear the default scale policy.
    pub fn no_scale(mut self) -> Self {
        self.scale = None;
        self
    }

    /// Set the default alignment.
    pub fn align(mut self, align: AlignPolicy) -> Self {
        self.align = align;
        self
    }

    pub fn rescale_on_resize(mut self, enabled: bool) -> Self {
        self.rescale_on_resize = enabled;
        self
    }

    pub fn hide_parent_overflow(mut self, enabled: bool) -> Self {
        self.hide_parent_overflow = enabled;
        self
    }

    /// Fade in over `duration` after the first scale. Zero disables it.
    pub fn fade_in(mut self, duration: Duration) -> Self {
        self.fade_in = (!duration.is_zero()).then_some(duration);
        self
    }

    /// Default transition for explicit requests. Zero disables it.
    pub fn transition(mut self, duration: Duration) -> Self {
        self.transition = (!duration.is_zero()).then_some(duration);
        self
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    pub fn parent(mut self, parent: ContainerRef) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Install the post-scale callback.
    pub fn did_scale<F>(mut self, callback: F) -> Self
    where
        F: FnMut(bool, &ScaleRequest) -> Result<(), CallbackError> + 'static,
    {
        self.did_scale = Some(Box::new(callback));
        self
    }
}
