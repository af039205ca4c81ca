//! The bound element: intrinsic size, image source and attribute overrides.
//!
//! Attribute values arrive as raw strings (`data-scale="best-fit"`). Unknown
//! names never fail; they fall back to a documented default and hand back a
//! [`PolicyWarning`] so the caller decides whether to surface it.

use alloc::string::String;

use crate::fit::{AlignPolicy, ScalePolicy, Size};

/// Non-fatal warning from policy-name resolution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyWarning {
    /// Scale name not understood; [`ScalePolicy::BestFill`] was used.
    #[error("the scale {0:?} was not understood")]
    UnrecognizedScale(String),
    /// Align name not understood; [`AlignPolicy::Center`] was used.
    #[error("the align {0:?} was not understood")]
    UnrecognizedAlign(String),
}

/// Resolve a scale name, falling back to [`ScalePolicy::BestFill`].
pub fn resolve_scale(name: &str) -> (ScalePolicy, Option<PolicyWarning>) {
    match ScalePolicy::from_name(name) {
        Some(p) => (p, None),
        None => (
            ScalePolicy::BestFill,
            Some(PolicyWarning::UnrecognizedScale(String::from(name))),
        ),
    }
}

/// Resolve an align name, falling back to [`AlignPolicy::Center`].
pub fn resolve_align(name: &str) -> (AlignPolicy, Option<PolicyWarning>) {
    match AlignPolicy::from_name(name) {
        Some(a) => (a, None),
        None => (
            AlignPolicy::Center,
            Some(PolicyWarning::UnrecognizedAlign(String::from(name))),
        ),
    }
}

/// What the controller knows about the element it scales.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    /// Natural source dimensions.
    pub intrinsic: Size,
    /// Image source at bind time. A different source later forces a rebind.
    pub source: Option<String>,
    /// Raw `data-scale` attribute.
    pub scale_attr: Option<String>,
    /// Raw `data-align` attribute.
    pub align_attr: Option<String>,
}

impl Element {
    /// Element with the given natural size and no attributes.
    pub fn new(intrinsic: Size) -> Self {
        Self {
            intrinsic,
            source: None,
            scale_attr: None,
            align_attr: None,
        }
    }

    /// Set the image source.
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set the `data-scale` override.
    pub fn scale_attr(mut self, value: impl Into<String>) -> Self {
        self.scale_attr = Some(value.into());
        self
    }

    /// Set the `data-align` override.
    pub fn align_attr(mut self, value: impl Into<String>) -> Self {
        self.align_attr = Some(value.into());
        self
    }

    /// Scale from the attribute, if one is set. Empty counts as unset.
    pub fn scale_override(&self) -> Option<(ScalePolicy, Option<PolicyWarning>)> {
        non_empty(&self.scale_attr).map(resolve_scale)
    }

    /// Alignment from the attribute, if one is set. Empty counts as unset.
    pub fn align_override(&self) -> Option<(AlignPolicy, Option<PolicyWarning>)> {
        non_empty(&self.align_attr).map(resolve_align)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}
