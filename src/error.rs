//! Error taxonomy for layout optimization.
//!
//! Only unusable input is fatal. Degraded-but-valid outcomes (partial
//! placement, unreachable boxes, cancellation) are reported as flags on
//! the result instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayoutError {
    /// The floor plan geometry cannot be optimized against: degenerate
    /// outline, self-intersection, malformed wall or zone.
    #[error("invalid plan geometry: {message}")]
    InvalidGeometry { message: String },

    /// The box specification or density target is out of range.
    #[error("invalid optimization spec: {message}")]
    InvalidSpec { message: String },
}

/// Coarse error classification, stable across message changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Geometry,
    Spec,
}

impl LayoutError {
    pub fn geometry(message: impl Into<String>) -> Self {
        LayoutError::InvalidGeometry {
            message: message.into(),
        }
    }

    pub fn spec(message: impl Into<String>) -> Self {
        LayoutError::InvalidSpec {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            LayoutError::InvalidGeometry { .. } => ErrorKind::Geometry,
            LayoutError::InvalidSpec { .. } => ErrorKind::Spec,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(LayoutError::geometry("bad outline").kind(), ErrorKind::Geometry);
        assert_eq!(LayoutError::spec("density 0").kind(), ErrorKind::Spec);
    }

    #[test]
    fn display_includes_message() {
        let err = LayoutError::geometry("outline has 2 points");
        assert!(err.to_string().contains("outline has 2 points"));
    }
}
