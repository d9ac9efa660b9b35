// cntr-rust: Pure Rust port of the GIST/mpl2005 contour tracer
// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)

pub mod error;
pub mod line_type;
pub mod mesh;
pub mod state;
pub mod trace;

pub use error::ContourError;
pub use line_type::{LineType, CLOSEPOLY, LINETO, MOVETO};
pub use state::Real;
pub use trace::{ContourTracer, TraceOutput};
