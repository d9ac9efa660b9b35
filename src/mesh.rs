// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Port of the gcntr.c mesh conventions and mask_zones.
//
// All arrays are Fortran-style: the "i" index varies fastest, so a point
// is addressed as ij = i + j*imax and the logical array shape is
// z[jmax][imax]. Each ij names one point, one zone, one i-edge and one
// j-edge:
//
//            (ij-1)-------(ij)-------(ij)
//               |                     |
//               |                     |
//            (ij-1)       (ij)       (ij)
//               |                     |
//               |                     |
//          (ij-imax-1)--(ij-imax)--(ij-imax)
//
// The zone labelled ij is the quadrilateral whose upper-right corner is
// point ij; the i-edge at ij runs from ij-imax to ij, the j-edge from
// ij-1 to ij.

use crate::error::ContourError;
use crate::state::Real;

/// Length of the state and region arrays for an imax-by-jmax mesh: one
/// guard row above the grid plus one tail word.
#[inline]
pub fn grid_len(imax: usize, jmax: usize) -> usize {
    imax * (jmax + 1) + 1
}

/// A borrowed view of the mesh: coordinates and field values, validated
/// once at construction. The tracer never mutates these.
#[derive(Clone, Copy)]
pub struct Mesh<'a> {
    pub imax: usize,
    pub jmax: usize,
    pub x: &'a [Real],
    pub y: &'a [Real],
    pub z: &'a [Real],
}

impl<'a> Mesh<'a> {
    pub fn new(
        imax: usize,
        jmax: usize,
        x: &'a [Real],
        y: &'a [Real],
        z: &'a [Real],
    ) -> Result<Self, ContourError> {
        if imax < 2 || jmax < 2 {
            return Err(ContourError::MeshTooSmall { imax, jmax });
        }
        let expected = imax * jmax;
        for (name, len) in [("x", x.len()), ("y", y.len()), ("z", z.len())] {
            if len != expected {
                return Err(ContourError::ShapeMismatch {
                    name,
                    len,
                    expected,
                });
            }
        }
        Ok(Mesh { imax, jmax, x, y, z })
    }
}

/// Translate a per-point mask into the per-zone existence region.
///
/// The mask is true where a point is bad; the region is non-zero where a
/// zone exists. All four zones sharing a bad point are marked
/// non-existent. Entries with i == 0 or j == 0 are cleared regardless of
/// the mask: in this index scheme no zone is anchored on the first row or
/// column, and the initializer relies on those entries being zero.
pub fn mask_zones(imax: usize, jmax: usize, mask: &[bool]) -> Vec<u8> {
    let nreg = grid_len(imax, jmax);
    let mut reg = vec![0u8; nreg];

    for r in reg.iter_mut().take(imax * jmax).skip(imax + 1) {
        *r = 1;
    }

    let mut ij = 0;
    for j in 0..jmax {
        for i in 0..imax {
            if i == 0 || j == 0 {
                reg[ij] = 0;
            }
            if mask[ij] {
                reg[ij] = 0;
                reg[ij + 1] = 0;
                reg[ij + imax] = 0;
                reg[ij + imax + 1] = 0;
            }
            ij += 1;
        }
    }
    // Guard row and tail stay zero.
    reg
}
