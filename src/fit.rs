//! Frame fitting: scale policies, alignment anchors and frame computation.
//!
//! Maps a source size onto a destination size under a [`ScalePolicy`] and an
//! [`AlignPolicy`]. Pure geometry with no state and no allocations; `no_std`
//! compatible.
//!
//! # Example
//!
//! ```
//! use imagescale::{AlignPolicy, Frame, ScalePolicy, Size, compute_frame};
//!
//! let frame = compute_frame(
//!     ScalePolicy::BestFit,
//!     AlignPolicy::Center,
//!     Size::new(100.0, 50.0),
//!     Size::new(200.0, 200.0),
//! )
//! .unwrap();
//!
//! // Letterboxed: full width, centered vertically.
//! assert_eq!(frame, Frame::new(0.0, 50.0, 200.0, 100.0));
//! ```

use core::fmt;

use num_traits::Float;

/// How to scale the source into the destination.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ScalePolicy {
    /// Keep the natural size. May overflow or underfill.
    None,
    /// Stretch to exact destination dimensions, ignoring aspect ratio.
    Fill,
    /// Scale to cover the destination, preserving aspect ratio.
    /// Overflow on one axis is expected (the host crops it).
    BestFill,
    /// Scale to fit entirely inside the destination, preserving aspect ratio.
    /// Upscales or downscales as needed; may letterbox.
    BestFit,
    /// Like [`BestFit`](Self::BestFit), but never upscales.
    BestFitDownOnly,
}

impl ScalePolicy {
    /// Every policy, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::None,
        Self::Fill,
        Self::BestFill,
        Self::BestFit,
        Self::BestFitDownOnly,
    ];

    /// Attribute name for this policy (`best-fit`, `best-fit-down`, ...).
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Fill => "fill",
            Self::BestFill => "best-fill",
            Self::BestFit => "best-fit",
            Self::BestFitDownOnly => "best-fit-down",
        }
    }

    /// Look up a policy by attribute name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for ScalePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where to anchor the scaled source within the destination.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum AlignPolicy {
    /// Center on both axes.
    #[default]
    Center,
    /// Left edge, centered vertically.
    Left,
    /// Right edge, centered vertically.
    Right,
    /// Top edge, centered horizontally.
    Top,
    /// Bottom edge, centered horizontally.
    Bottom,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Anchor along a single axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Anchor {
    Near,
    Middle,
    Far,
}

impl AlignPolicy {
    /// Every alignment, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Center,
        Self::Left,
        Self::Right,
        Self::Top,
        Self::Bottom,
        Self::TopLeft,
        Self::TopRight,
        Self::BottomLeft,
        Self::BottomRight,
    ];

    /// Attribute name for this alignment (`top-left`, `center`, ...).
    pub const fn name(self) -> &'static str {
        match self {
            Self::Center => "center",
            Self::Left => "left",
            Self::Right => "right",
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::TopLeft => "top-left",
            Self::TopRight => "top-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomRight => "bottom-right",
        }
    }

    /// Look up an alignment by attribute name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Split into (horizontal, vertical) anchors.
    const fn anchors(self) -> (Anchor, Anchor) {
        match self {
            Self::Center => (Anchor::Middle, Anchor::Middle),
            Self::Left => (Anchor::Near, Anchor::Middle),
            Self::Right => (Anchor::Far, Anchor::Middle),
            Self::Top => (Anchor::Middle, Anchor::Near),
            Self::Bottom => (Anchor::Middle, Anchor::Far),
            Self::TopLeft => (Anchor::Near, Anchor::Near),
            Self::TopRight => (Anchor::Far, Anchor::Near),
            Self::BottomLeft => (Anchor::Near, Anchor::Far),
            Self::BottomRight => (Anchor::Far, Anchor::Far),
        }
    }
}

impl fmt::Display for AlignPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Width × height in CSS pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Size {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl Size {
    /// Create a new size.
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both dimensions finite and strictly positive.
    pub fn is_usable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Output rectangle relative to the destination's top-left corner.
///
/// `width`/`height` are whole pixels; `x`/`y` keep sub-pixel offsets and go
/// negative when the scaled source overflows the destination.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Frame {
    /// Create a new frame.
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Frame extent as a [`Size`].
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Move the frame by `(dx, dy)`.
    pub fn translate(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }
}

/// Frame computation error.
#[derive(Copy, Clone, Debug, PartialEq, thiserror::Error)]
pub enum FitError {
    /// Source or destination has a zero, negative or non-finite dimension.
    #[error("invalid geometry: source {source_size:?}, destination {dest_size:?}")]
    InvalidGeometry { source_size: Size, dest_size: Size },
}

/// Compute the frame placing `source` inside `dest`.
///
/// [`ScalePolicy::Fill`] returns the destination rectangle as-is. Every other
/// policy preserves the source aspect ratio, rounds the scaled extent to
/// whole pixels and positions it by `align`.
///
/// Alignment uses the rounded extent, so a centered frame shares the
/// destination's center exactly and far anchors end flush with the edge.
/// Browser-side image-scale scripts usually align with the unrounded extent
/// instead; the two differ by under half a pixel (2×1 into 2.5×10 with
/// best-fit, centered, gives `x = -0.25` here and `x = 0` unrounded).
///
/// Because of the rounding, a best-fit frame can exceed a fractional
/// destination by up to half a pixel on its touching axis (1×1 into
/// 100.6×100.6 is 101×101). Integer destinations never overflow.
pub fn compute_frame(
    scale: ScalePolicy,
    align: AlignPolicy,
    source: Size,
    dest: Size,
) -> Result<Frame, FitError> {
    if !source.is_usable() || !dest.is_usable() {
        return Err(FitError::InvalidGeometry {
            source_size: source,
            dest_size: dest,
        });
    }

    if scale == ScalePolicy::Fill {
        return Ok(Frame::new(0.0, 0.0, dest.width, dest.height));
    }

    let factor = scale_factor(scale, source, dest);
    let width = Float::round(source.width * factor);
    let height = Float::round(source.height * factor);

    let (h, v) = align.anchors();
    Ok(Frame {
        x: anchor_offset(dest.width, width, h),
        y: anchor_offset(dest.height, height, v),
        width,
        height,
    })
}

/// Uniform scale factor applied to both source axes.
fn scale_factor(scale: ScalePolicy, source: Size, dest: Size) -> f64 {
    let scale_x = dest.width / source.width;
    let scale_y = dest.height / source.height;
    match scale {
        ScalePolicy::BestFitDownOnly => {
            if source.width > dest.width || source.height > dest.height {
                scale_x.min(scale_y)
            } else {
                1.0
            }
        }
        ScalePolicy::BestFit => scale_x.min(scale_y),
        ScalePolicy::None => 1.0,
        // Fill never reaches here; treat it like cover if it ever does.
        ScalePolicy::BestFill | ScalePolicy::Fill => scale_x.max(scale_y),
    }
}

fn anchor_offset(space: f64, extent: f64, anchor: Anchor) -> f64 {
    match anchor {
        Anchor::Near => 0.0,
        Anchor::Middle => (space / 2.0) - (extent / 2.0),
        Anchor::Far => space - extent,
    }
}
