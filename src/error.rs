// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Error surface of the trace session. Precondition failures are reported
// before any mutation; invariant failures indicate a tracer bug, never bad
// input, and leave the session's inputs intact.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContourError {
    #[error("mesh must be at least 2x2 points, got {imax}x{jmax}")]
    MeshTooSmall { imax: usize, jmax: usize },

    #[error("{name} array has length {len}, expected imax*jmax = {expected}")]
    ShapeMismatch {
        name: &'static str,
        len: usize,
        expected: usize,
    },

    #[error("contour level {level} is not finite")]
    NonFiniteLevel { level: f64 },

    #[error("expected 1 or 2 contour levels, got {count}")]
    BadLevelCount { count: usize },

    #[error("contour levels must be ascending, got [{lower}, {upper}]")]
    DescendingLevels { lower: f64, upper: f64 },

    #[error("pass 2 emitted {emitted} points but pass 1 counted {counted}")]
    Pass2Overflow { emitted: usize, counted: usize },

    #[error("negative curve length in pass 2")]
    Pass2NegativeCount,

    #[error("reorder failed for part {part}: {reason}")]
    Reorder { part: usize, reason: &'static str },
}
