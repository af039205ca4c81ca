//! Leveled diagnostics.
//!
//! Nothing in the controller panics or throws for bad input. Each condition
//! becomes a [`Diagnostic`] that is routed to the host when the session's
//! [`LogLevel`] admits its [`Severity`].

use core::fmt;

use crate::controller::SessionHandle;
use crate::element::PolicyWarning;
use crate::fit::{ScalePolicy, Size};

/// How much a session reports.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    /// Report nothing.
    #[default]
    Silent = 0,
    /// Errors only.
    Errors = 1,
    /// Errors and warnings.
    Warnings = 2,
    /// Everything, including debug notices.
    Verbose = 3,
}

impl LogLevel {
    /// Map the numeric `0..=3` scale; anything above 3 is verbose.
    pub const fn from_u8(level: u8) -> Self {
        match level {
            0 => Self::Silent,
            1 => Self::Errors,
            2 => Self::Warnings,
            _ => Self::Verbose,
        }
    }

    /// Whether a diagnostic of `severity` passes this level.
    pub fn admits(self, severity: Severity) -> bool {
        let needed = match severity {
            Severity::Error => Self::Errors,
            Severity::Warning => Self::Warnings,
            Severity::Verbose => Self::Verbose,
        };
        self >= needed
    }
}

/// Severity of a [`Diagnostic`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Verbose,
}

/// A reportable condition raised while serving a scale request.
#[derive(Clone, Debug, PartialEq)]
pub enum Diagnostic {
    /// A source or destination dimension was zero or unusable.
    InvalidGeometry { source_size: Size, dest_size: Size },
    /// Neither the request, the element nor the options named a scale.
    NoScalePolicy,
    /// A policy name fell back to its default.
    Unrecognized(PolicyWarning),
    /// The destination has the same size as the last applied one.
    DestinationUnchanged { dest_size: Size, scale: ScalePolicy },
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Self::InvalidGeometry { .. } | Self::NoScalePolicy => Severity::Error,
            Self::Unrecognized(_) => Severity::Warning,
            Self::DestinationUnchanged { .. } => Severity::Verbose,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidGeometry {
                source_size,
                dest_size,
            } => write!(
                f,
                "the dimensions are incorrect: source width: {} - source height: {} - dest width: {} - dest height: {}",
                source_size.width, source_size.height, dest_size.width, dest_size.height
            ),
            Self::NoScalePolicy => f.write_str("the scale property is not set"),
            Self::Unrecognized(w) => write!(f, "{w}"),
            Self::DestinationUnchanged { dest_size, scale } => write!(
                f,
                "the parent size hasn't changed: dest width: {} - dest height: {} ({scale})",
                dest_size.width, dest_size.height
            ),
        }
    }
}

/// Emit a diagnostic through `tracing` at the matching level.
pub fn trace(session: SessionHandle, diagnostic: &Diagnostic) {
    let session = session.index();
    match diagnostic.severity() {
        Severity::Error => tracing::error!(session, "{diagnostic}"),
        Severity::Warning => tracing::warn!(session, "{diagnostic}"),
        Severity::Verbose => tracing::debug!(session, "{diagnostic}"),
    }
}
