// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Port of line_type.h/cpp and the path kind codes.

use std::fmt;

/// Output layouts for line contours, with their canonical numeric tags.
/// The reorder step emits the "code" layouts; "offset" layouts replace the
/// code array with per-subpath offsets into the concatenated coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum LineType {
    Separate = 101,
    SeparateCode = 102,
    ChunkCombinedCode = 103,
    ChunkCombinedOffset = 104,
}

impl fmt::Display for LineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineType::Separate => write!(f, "Separate"),
            LineType::SeparateCode => write!(f, "SeparateCode"),
            LineType::ChunkCombinedCode => write!(f, "ChunkCombinedCode"),
            LineType::ChunkCombinedOffset => write!(f, "ChunkCombinedOffset"),
        }
    }
}

// Path codes, matching the host renderer's convention.
pub const MOVETO: u8 = 1;
pub const LINETO: u8 = 2;
pub const CLOSEPOLY: u8 = 79;
