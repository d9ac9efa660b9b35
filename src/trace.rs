// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Port of the GIST/mpl2005 contour tracer (gcntr.c core + cntr.c glue).
//
// This module is the complete tracer: public session API + the two-pass
// edge-based state machine. In the C code the traversal routines and the
// interface glue share one mutable Csite; they stay merged here as methods
// on the session struct for the same reason. All pointer arithmetic from
// the C is replaced by signed index arithmetic on Vec arenas.
//
// How a trace works: every mesh point is classified 0/1/2 against the
// level(s) and every zone either exists or not; from those bits alone the
// curve connectivity follows. Tracing is edge-based: either you sit on a
// cut edge about to cross a zone (zone_crosser), or you are drawing a
// boundary edge CCW around an existing zone (edge_walker, two-level case
// only). Curves keep the filled region on their left. A first pass makes
// the connectivity decisions, prunes redundant start markers and computes
// sizes; a second pass retraces and emits coordinates. For the two-level
// case, closed contours around holes are joined to their enclosing curve
// by a zero-width slit (slit_cutter) so each traced part stays connected,
// and saddle zones are disambiguated by the zone-centre value, cached so
// later passes agree with earlier ones.

mod reorder;

use crate::error::ContourError;
use crate::line_type::LineType;
use crate::mesh::{grid_len, mask_zones, Mesh};
use crate::state::{
    forward, is_jedge, point0, point1, start_mark, Cdata, Index, Real, ALL_DONE, ANY_START,
    I0_START, I1_START, I_BNDY, J0_START, J1_START, J_BNDY, KIND_EDGE1, KIND_EDGE2,
    KIND_SLIT_DOWN, KIND_SLIT_UP, KIND_START_SLIT, KIND_ZONE, OPEN_END, SADDLE_GT0, SADDLE_GT1,
    SADDLE_SET, SLIT_DN, SLIT_DN_VISITED, SLIT_UP, START_ROW, ZONE_EX, Z_VALUE,
};

/// One traced level set: per-part vertex and code arrays. `codes[p]` and
/// `verts[p]` have equal length; codes are MOVETO/LINETO/CLOSEPOLY.
#[derive(Debug, Clone, Default)]
pub struct TraceOutput {
    pub verts: Vec<Vec<[Real; 2]>>,
    pub codes: Vec<Vec<u8>>,
}

impl TraceOutput {
    pub fn part_count(&self) -> usize {
        self.verts.len()
    }
}

/// A contour trace session over one mesh. Borrows the coordinate and field
/// arrays for its lifetime; re-usable across level sets (`trace` fully
/// re-initializes the state grid each call).
#[derive(Debug)]
pub struct ContourTracer<'a> {
    imax: Index,
    jmax: Index,
    x: &'a [Real],
    y: &'a [Real],
    z: &'a [Real],
    reg: Option<Vec<u8>>,
    i_chunk_size: Index,
    j_chunk_size: Index,

    // Packed per-point state, one guard row plus a tail word.
    data: Vec<Cdata>,
    // One byte per zone, populated lazily on first saddle entry.
    saddle: Vec<u8>,

    // Site: the traversal cursor shared by the driver and traversers.
    edge: Index,
    left: Index,
    n: Index,
    count: Index,
    edge0: Index,
    left0: Index,
    edge00: Index,
    level0: i32,
    zlevel: [Real; 2],

    // Second-pass output buffers; cp0 is the current curve's base offset.
    xcp: Vec<Real>,
    ycp: Vec<Real>,
    kcp: Vec<u8>,
    cp0: usize,
}

impl<'a> ContourTracer<'a> {
    /// Create a session for one mesh. `mask` is true where a point is bad;
    /// chunk sizes of 0 (or larger than dimension-1) mean unchunked.
    pub fn new(
        imax: usize,
        jmax: usize,
        x: &'a [Real],
        y: &'a [Real],
        z: &'a [Real],
        mask: Option<&[bool]>,
        i_chunk_size: usize,
        j_chunk_size: usize,
    ) -> Result<Self, ContourError> {
        let mesh = Mesh::new(imax, jmax, x, y, z)?;
        let reg = match mask {
            Some(m) => {
                if m.len() != imax * jmax {
                    return Err(ContourError::ShapeMismatch {
                        name: "mask",
                        len: m.len(),
                        expected: imax * jmax,
                    });
                }
                Some(mask_zones(imax, jmax, m))
            }
            None => None,
        };

        // Chunking applies to filled contours only; data_init forces full
        // chunks for the single level case.
        let i_chunk_size = if i_chunk_size == 0 || i_chunk_size > imax - 1 {
            imax - 1
        } else {
            i_chunk_size
        };
        let j_chunk_size = if j_chunk_size == 0 || j_chunk_size > jmax - 1 {
            jmax - 1
        } else {
            j_chunk_size
        };

        Ok(ContourTracer {
            imax: mesh.imax as Index,
            jmax: mesh.jmax as Index,
            x: mesh.x,
            y: mesh.y,
            z: mesh.z,
            reg,
            i_chunk_size: i_chunk_size as Index,
            j_chunk_size: j_chunk_size as Index,
            data: vec![0; grid_len(imax, jmax)],
            saddle: vec![0; imax * jmax],
            edge: 0,
            left: 0,
            n: 0,
            count: 0,
            edge0: 0,
            left0: 0,
            edge00: 0,
            level0: 0,
            zlevel: [0.0, 0.0],
            xcp: Vec::new(),
            ycp: Vec::new(),
            kcp: Vec::new(),
            cp0: 0,
        })
    }

    // ─────── Accessors ────────────────────────────────────────────────────────

    pub fn imax(&self) -> usize {
        self.imax as usize
    }
    pub fn jmax(&self) -> usize {
        self.jmax as usize
    }
    pub fn i_chunk_size(&self) -> usize {
        self.i_chunk_size as usize
    }
    pub fn j_chunk_size(&self) -> usize {
        self.j_chunk_size as usize
    }

    /// The layout `trace` emits: one vertex array and one code array per part.
    pub fn default_line_type() -> LineType {
        LineType::SeparateCode
    }

    /// This tracer produces separate parts only; the chunk-combined layouts
    /// belong to the other generators in the surrounding ecosystem.
    pub fn supports_line_type(line_type: LineType) -> bool {
        matches!(line_type, LineType::Separate | LineType::SeparateCode)
    }

    // ─────── Trace driver ─────────────────────────────────────────────────────

    /// Trace one level (iso-lines) or a pair of levels (filled polygons).
    /// Equal levels degrade to line mode. Runs the initializer, the sizing
    /// pass, the emission pass and the reorder.
    pub fn trace(&mut self, levels: &[Real]) -> Result<TraceOutput, ContourError> {
        let (z0, z1) = match *levels {
            [z0] => (z0, z0),
            [z0, z1] => (z0, z1),
            _ => {
                return Err(ContourError::BadLevelCount {
                    count: levels.len(),
                })
            }
        };
        for &level in levels {
            if !level.is_finite() {
                return Err(ContourError::NonFiniteLevel { level });
            }
        }
        if z1 < z0 {
            return Err(ContourError::DescendingLevels {
                lower: z0,
                upper: z1,
            });
        }

        self.zlevel = [z0, z1];
        self.data_init();
        self.log_state();

        // First pass computes the sizes required for the second pass. A
        // negative length marks a curve that the second pass will merge
        // into another (slit closures and single-level open curves).
        let mut nparts = 0usize;
        let mut ntotal: Index = 0;
        loop {
            let n = self.curve_tracer(false);
            if n == 0 {
                break;
            }
            if n > 0 {
                nparts += 1;
                ntotal += n;
            } else {
                ntotal -= n;
            }
        }
        log::trace!(
            "pass 1: {} parts, {} points, levels [{}, {}]",
            nparts,
            ntotal,
            z0,
            z1
        );

        self.xcp = vec![0.0; ntotal as usize];
        self.ycp = vec![0.0; ntotal as usize];
        self.kcp = vec![0; ntotal as usize];
        self.cp0 = 0;

        let mut np: Vec<usize> = Vec::with_capacity(nparts);
        let mut ntotal2: Index = 0;
        let result = loop {
            let n = self.curve_tracer(true);
            if ntotal2 + n > ntotal {
                break Err(ContourError::Pass2Overflow {
                    emitted: (ntotal2 + n) as usize,
                    counted: ntotal as usize,
                });
            }
            if n == 0 {
                break Ok(());
            }
            if n > 0 {
                np.push(n as usize);
                self.cp0 += n as usize;
                ntotal2 += n;
            } else {
                break Err(ContourError::Pass2NegativeCount);
            }
        };

        let out = result.and_then(|()| {
            reorder::build_parts(&self.xcp, &self.ycp, &self.kcp, &np, self.nlevels())
        });

        // The output buffers are per-trace; drop them either way.
        self.xcp = Vec::new();
        self.ycp = Vec::new();
        self.kcp = Vec::new();
        self.cp0 = 0;

        out
    }

    #[inline]
    fn two_levels(&self) -> bool {
        self.zlevel[1] > self.zlevel[0]
    }

    #[inline]
    fn nlevels(&self) -> usize {
        if self.two_levels() {
            2
        } else {
            1
        }
    }

    // ─────── Initializer ──────────────────────────────────────────────────────

    /// Single sweep filling the state grid from the mesh, levels, region
    /// and chunk sizes, and counting candidate start markers. Access to z
    /// and reg is strictly sequential; the data array is touched two rows
    /// (+-imax) at a time.
    fn data_init(&mut self) {
        let imax = self.imax as usize;
        let jmax = self.jmax as usize;
        let ijmax = imax * jmax;
        let zlev0 = self.zlevel[0];
        let zlev1 = self.zlevel[1];
        let two_levels = self.two_levels();
        let mut count: Index = 0;
        let mut started = false;

        let mut i_chunk_size = self.i_chunk_size as usize;
        let mut j_chunk_size = self.j_chunk_size as usize;
        if !two_levels {
            // Chunking not used for lines as start points are not correct.
            i_chunk_size = imax - 1;
            j_chunk_size = jmax - 1;
        }

        self.data[0] = if self.z[0] > zlev0 {
            if two_levels && self.z[0] > zlev1 {
                2
            } else {
                1
            }
        } else {
            0
        };

        let mut jchunk = 0usize;
        let mut ij = 0usize;
        for j in 0..jmax {
            let mut ichunk = 0usize;
            let mut i_was_chunk = false;
            for i in 0..imax {
                // Zonal existence for the next row, so that points and
                // j-edges of this row can be classified.
                self.data[ij + imax + 1] = 0;
                match &self.reg {
                    Some(reg) => {
                        if reg[ij + imax + 1] != 0 {
                            self.data[ij + imax + 1] = ZONE_EX;
                        }
                    }
                    None => {
                        if i < imax - 1 && j < jmax - 1 {
                            self.data[ij + imax + 1] = ZONE_EX;
                        }
                    }
                }

                // Translate z values to 0/1/2 class flags.
                if ij < imax {
                    self.data[ij + 1] = 0;
                }
                if ij < ijmax - 1 && self.z[ij + 1] > zlev0 {
                    self.data[ij + 1] |= if two_levels && self.z[ij + 1] > zlev1 {
                        2
                    } else {
                        1
                    };
                }

                // Edge boundary marks.
                let ibndy = i == ichunk
                    || (self.data[ij] & ZONE_EX) != (self.data[ij + 1] & ZONE_EX);
                let jbndy = j == jchunk
                    || (self.data[ij] & ZONE_EX) != (self.data[ij + imax] & ZONE_EX);
                if ibndy {
                    self.data[ij] |= I_BNDY;
                }
                if jbndy {
                    self.data[ij] |= J_BNDY;
                }

                // i-edge start marks. Only cut i-edges are marked, and an
                // interior mark is unnecessary when the fill on that side is
                // already reachable from an adjacent cut j-edge.
                if j > 0 {
                    let v0 = self.data[ij] & Z_VALUE;
                    let vb = self.data[ij - imax] & Z_VALUE;
                    if v0 != vb {
                        if ibndy {
                            if self.data[ij] & ZONE_EX != 0 {
                                self.data[ij] |= I0_START;
                                count += 1;
                            }
                            if self.data[ij + 1] & ZONE_EX != 0 {
                                self.data[ij] |= I1_START;
                                count += 1;
                            }
                        } else {
                            let va = self.data[ij - 1] & Z_VALUE;
                            let vc = self.data[ij + 1] & Z_VALUE;
                            let vd = self.data[ij - imax + 1] & Z_VALUE;
                            if v0 != 1
                                && va != v0
                                && (vc != v0 || vd != v0)
                                && self.data[ij] & ZONE_EX != 0
                            {
                                self.data[ij] |= I0_START;
                                count += 1;
                            }
                            if vb != 1
                                && va == vb
                                && (vc == vb || vd == vb)
                                && self.data[ij + 1] & ZONE_EX != 0
                            {
                                self.data[ij] |= I1_START;
                                count += 1;
                            }
                        }
                    }
                }

                // j-edge start marks. Only boundary j-edges are marked; all
                // cut ones, plus a few uncut ones for the two level case to
                // anchor boundary walks.
                if i > 0 && jbndy {
                    let v0 = self.data[ij] & Z_VALUE;
                    let vb = self.data[ij - 1] & Z_VALUE;
                    if v0 != vb {
                        if self.data[ij] & ZONE_EX != 0 {
                            self.data[ij] |= J0_START;
                            count += 1;
                        }
                        if self.data[ij + imax] & ZONE_EX != 0 {
                            self.data[ij] |= J1_START;
                            count += 1;
                        }
                    } else if two_levels && v0 == 1 {
                        if self.data[ij + imax] & ZONE_EX != 0 {
                            if i_was_chunk || self.data[ij + imax - 1] & ZONE_EX == 0 {
                                // Lower left is a drawn part of the boundary.
                                self.data[ij] |= J1_START;
                                count += 1;
                            }
                        } else if self.data[ij] & ZONE_EX != 0
                            && self.data[ij + imax - 1] & ZONE_EX != 0
                        {
                            // Weird case of an open hole at lower left.
                            self.data[ij] |= J0_START;
                            count += 1;
                        }
                    }
                }

                i_was_chunk = i == ichunk;
                if i_was_chunk {
                    ichunk += i_chunk_size;
                }
                ij += 1;
            }

            if j == jchunk {
                jchunk += j_chunk_size;
            }

            // First row containing any start marker gets the START_ROW seed.
            if count > 0 && !started {
                self.data[ij - imax] |= START_ROW;
                started = true;
            }
        }

        if count == 0 {
            self.data[0] |= ALL_DONE;
        } else {
            self.saddle.fill(0);
        }

        self.edge0 = 0;
        self.edge00 = 0;
        self.edge = 0;
        self.left0 = 0;
        self.left = 0;
        self.n = 0;
        self.count = count;
    }

    // ─────── Curve driver ─────────────────────────────────────────────────────

    /// Find the next start point and trace one full curve. Returns the
    /// number of points on the curve, 0 when no curves remain, or a
    /// negative count on the first pass for a curve the second pass will
    /// merge into another (slit closure or single-level open curve).
    fn curve_tracer(&mut self, pass2: bool) -> Index {
        let imax = self.imax;
        let mut edge0 = self.edge0;
        let mut left0 = self.left0;
        let edge00 = self.edge00;
        let two_levels = self.two_levels();

        // A single i-edge can serve as two actual start points, one to
        // each side: a doubly cut edge or a chunking boundary on the first
        // two-level pass, a missing-corner zone with both boundary edges
        // cut, or a junction of chunk cuts. Check in order i1, i0, j1, j0.
        let two_starts = if left0 == 1 {
            self.data[edge0 as usize] & (I0_START | J1_START | J0_START) != 0
        } else if left0 == -1 {
            self.data[edge0 as usize] & (J1_START | J0_START) != 0
        } else if left0 == imax {
            self.data[edge0 as usize] & J0_START != 0
        } else {
            false
        };

        if pass2 || edge0 == 0 {
            // Zip up to the row marked on the first pass (or by data_init
            // when edge0 == 0) -- but not for the double start case.
            if !two_starts {
                let first = edge0 == 0 && !pass2;
                let e0 = edge0;
                if self.data[edge0 as usize] & ALL_DONE != 0 {
                    return 0;
                }
                while self.data[edge0 as usize] & START_ROW == 0 {
                    edge0 += imax;
                }
                if e0 == edge0 {
                    edge0 += 1; // two starts handled specially
                }
                if first {
                    // Remove the START_ROW seed placed by data_init.
                    let row = edge0 - edge0 % imax;
                    self.data[row as usize] &= !START_ROW;
                }
            }
        } else {
            // First pass ends when all potential start points are visited.
            if self.count <= 0 {
                self.data[edge00 as usize] |= ALL_DONE;
                self.edge0 = 0;
                self.edge00 = 0;
                self.left0 = 0;
                return 0;
            }
            if !two_starts {
                edge0 += 1;
            }
        }

        let mut level: i32;
        if two_starts {
            // Trace the second curve with this start immediately.
            if left0 == 1 && self.data[edge0 as usize] & I0_START != 0 {
                left0 = -1;
                level = if self.data[edge0 as usize] & I_BNDY != 0 { 2 } else { 0 };
            } else if (left0 == 1 || left0 == -1) && self.data[edge0 as usize] & J1_START != 0 {
                left0 = imax;
                level = 2;
            } else {
                left0 = -imax;
                level = 2;
            }
        } else {
            // Scan for the next start marker. On the second pass this is at
            // most one row of mesh; the first pass hits nearly every point,
            // since it cannot know in advance which marks get removed.
            while self.data[edge0 as usize] & ANY_START == 0 {
                edge0 += 1;
            }

            if self.data[edge0 as usize] & I1_START != 0 {
                left0 = 1;
            } else if self.data[edge0 as usize] & I0_START != 0 {
                left0 = -1;
            } else if self.data[edge0 as usize] & J1_START != 0 {
                left0 = imax;
            } else {
                left0 = -imax;
            }

            if self.data[edge0 as usize] & (I1_START | I0_START) != 0 {
                level = if self.data[edge0 as usize] & I_BNDY != 0 { 2 } else { 0 };
            } else {
                level = 2;
            }
        }

        // This start marker is never unmarked, but it has been visited.
        if !pass2 {
            self.count -= 1;
        }

        // A curve starting on a non-boundary i-edge needs its level index.
        if level == 0 && two_levels {
            level = if left0 > 0 {
                ((self.data[(edge0 - imax) as usize] & Z_VALUE) != 0) as i32
            } else {
                ((self.data[edge0 as usize] & Z_VALUE) != 0) as i32
            };
        }

        self.edge = edge0;
        self.edge0 = edge0;
        self.left = left0;
        self.left0 = left0;
        self.level0 = level;
        let level0 = level;

        // Single level case only ever crosses zones.
        if !two_levels {
            level = 0;
        }

        // Alternate between zone_crosser and edge_walker until closure (or
        // a boundary hit in the single level case).
        self.n = 0;
        loop {
            if level < 2 {
                level = self.zone_crosser(level, pass2);
            } else if level < 3 {
                level = self.edge_walker(pass2);
            } else {
                break;
            }
        }
        let mut n = self.n;

        // The single level case may have ended on a boundary rather than
        // closing: place the OPEN_END mark for zone_crosser, remove this
        // start marker, skip the START_ROW mark and negate the count. A two
        // level curve that closed through slit_cutter is handled the same
        // way minus the OPEN_END mark.
        let mark_row;
        if !pass2 && level > 3 && (two_levels || level0 == 0) {
            if !two_levels {
                self.data[edge0 as usize] |= OPEN_END;
            }
            self.data[edge0 as usize] &= !(if left0 > 0 { I1_START } else { I0_START });
            mark_row = false;
            n = -n;
        } else if two_levels {
            mark_row = !two_starts;
        } else {
            mark_row = true;
        }

        // Apply the START_ROW mark in the column above the previous start
        // marker -- skipped right after the second of a two start case.
        if !pass2 && mark_row {
            let row = edge0 - (edge0 - edge00) % imax;
            self.data[row as usize] |= START_ROW;
            self.edge00 = edge0;
        }

        n
    }

    // ─────── Zone crosser ─────────────────────────────────────────────────────

    /// Assumes the site sits on a cut edge about to cross the zone on its
    /// left. Always marks the initial point, crosses at least one zone and
    /// marks the final point. On non-boundary i-edges it removes start
    /// markers on the first pass. `level` is the level index (0 or 1).
    ///
    /// Returns 2 on a boundary hit (two level case), 3 on closure, 4 on a
    /// single-level boundary/open end, or tail-calls slit_cutter when the
    /// step arrived on a slit stroke.
    fn zone_crosser(&mut self, level: i32, pass2: bool) -> i32 {
        let imax = self.imax;
        let mut edge = self.edge;
        let mut left = self.left;
        let mut n = self.n;
        let mut fwd = forward(left, imax);
        let mut jedge = is_jedge(left);
        let edge0 = self.edge0;
        let left0 = self.left0;
        let level0 = self.level0 == level;
        let two_levels = self.two_levels();

        let zlevel = self.zlevel[level as usize];
        // Class value this level cuts against: 0 for the lower level, 2 for
        // the upper.
        let level = if level != 0 { 2 } else { 0 };

        let mut done = 0;
        let mut n_kind: usize;

        loop {
            n_kind = 0;
            let p0 = point0(edge, fwd);
            let p1 = point1(edge, fwd);

            // Always mark the cut on the current edge; the second pass
            // computes and stores the interpolated point.
            if pass2 {
                let zp0 = self.z[p0 as usize];
                let zp1 = self.z[p1 as usize];
                // A cut edge has endpoints in different classes.
                debug_assert!(zp1 != zp0);
                let zcp = (zlevel - zp0) / (zp1 - zp0);
                let at = self.cp0 + n as usize;
                self.xcp[at] = zcp * (self.x[p1 as usize] - self.x[p0 as usize])
                    + self.x[p0 as usize];
                self.ycp[at] = zcp * (self.y[p1 as usize] - self.y[p0 as usize])
                    + self.y[p0 as usize];
                self.kcp[at] = KIND_ZONE;
                n_kind = n as usize;
            }

            if done == 0 && !jedge && n != 0 {
                // Not the first point on the curve, not done, on an i-edge.
                if !two_levels && !pass2 && self.data[edge as usize] & OPEN_END != 0 {
                    // Reached an OPEN_END mark; skip the point count bump.
                    done = 4;
                    break;
                }

                // Check for curve closure; if not, erase any start mark.
                if edge == edge0 && left == left0 {
                    if level0 {
                        // May signal closure on a downstroke.
                        done = if !pass2 && two_levels && left < 0 { 5 } else { 3 };
                    }
                } else if !pass2 {
                    let start =
                        self.data[edge as usize] & if fwd > 0 { I0_START } else { I1_START };
                    if start != 0 {
                        self.data[edge as usize] &= !start;
                        self.count -= 1;
                    }
                    if !two_levels {
                        let start =
                            self.data[edge as usize] & if fwd > 0 { I1_START } else { I0_START };
                        if start != 0 {
                            self.data[edge as usize] &= !start;
                            self.count -= 1;
                        }
                    }
                }
            }
            n += 1;
            if done != 0 {
                break;
            }

            // Cross the current zone to another cut edge. The four class
            // bits around the zone determine the turn; z0 is set when the
            // fill lies toward p0 (the level is known to cut this edge).
            let z0 = (self.data[p0 as usize] & Z_VALUE) as i32 != level;
            let z1 = !z0;
            let z2 = (self.data[(p1 + left) as usize] & Z_VALUE) as i32 != level;
            let z3 = (self.data[(p0 + left) as usize] & Z_VALUE) as i32 != level;

            let forward_bend = if z0 == z2 {
                if z1 == z3 {
                    // Saddle zone: turn by the zone-centre value, computed
                    // once and cached so all passes agree.
                    let zone = edge + if left > 0 { left } else { 0 };
                    if self.saddle[zone as usize] & SADDLE_SET == 0 {
                        self.saddle[zone as usize] = SADDLE_SET;
                        let zcentre = (self.z[p0 as usize]
                            + self.z[(p0 + left) as usize]
                            + self.z[p1 as usize]
                            + self.z[(p1 + left) as usize])
                            / 4.0;
                        if zcentre > self.zlevel[0] {
                            self.saddle[zone as usize] |=
                                if two_levels && zcentre > self.zlevel[1] {
                                    SADDLE_GT0 | SADDLE_GT1
                                } else {
                                    SADDLE_GT0
                                };
                        }
                    }
                    let mut turn_right = if level == 2 {
                        self.saddle[zone as usize] & SADDLE_GT1 != 0
                    } else {
                        self.saddle[zone as usize] & SADDLE_GT0 != 0
                    };
                    if z1 != (level == 2) {
                        turn_right = !turn_right;
                    }
                    Some(turn_right)
                } else {
                    Some(true)
                }
            } else if z1 == z3 {
                Some(false)
            } else {
                None
            };

            match forward_bend {
                Some(true) => {
                    // Bend forward (right along the curve).
                    jedge = !jedge;
                    edge = p1 + if left > 0 { left } else { 0 };
                    let tmp = fwd;
                    fwd = -left;
                    left = tmp;
                }
                Some(false) => {
                    // Bend backward (left along the curve).
                    jedge = !jedge;
                    edge = p0 + if left > 0 { left } else { 0 };
                    let tmp = fwd;
                    fwd = left;
                    left = -tmp;
                }
                None => {
                    // Straight across to the opposite edge.
                    edge += left;
                }
            }
            // edge/left/fwd is now CCW relative to the next zone.

            // Taking the step before testing for a slit downstroke avoids a
            // race with the upstroke test above.
            if pass2 && two_levels && !jedge {
                if left > 0 {
                    if self.data[edge as usize] & SLIT_UP != 0 {
                        done = 6;
                    }
                } else if self.data[edge as usize] & SLIT_DN != 0 {
                    done = 5;
                }
            }

            if done == 0 {
                // Finally, check whether this edge is a boundary.
                let bndy = if jedge { J_BNDY } else { I_BNDY };
                if self.data[edge as usize] & bndy != 0 {
                    done = if two_levels { 2 } else { 4 };
                    // Flip back into the zone that exists.
                    left = -left;
                    fwd = -fwd;
                    if !pass2 && (edge != edge0 || left != left0) {
                        let start = self.data[edge as usize] & start_mark(left);
                        if start != 0 {
                            self.data[edge as usize] &= !start;
                            self.count -= 1;
                        }
                    }
                }
            }
        }

        self.edge = edge;
        self.n = n;
        self.left = left;
        if done <= 4 {
            return done;
        }
        if pass2 && n_kind != 0 {
            self.kcp[self.cp0 + n_kind] += KIND_START_SLIT;
        }
        self.slit_cutter(done == 6, pass2)
    }

    // ─────── Edge walker ──────────────────────────────────────────────────────

    /// Walks a boundary CCW around the existing zone, with the filled
    /// region to the left; only boundary edges are ever drawn, so no edge
    /// is drawn CW. Marks corner points whose class is 1; when the first
    /// point of the walk is not between the levels, marks the cut that
    /// zone_crosser will re-mark on closure. Exits back to zone_crosser
    /// (returning the nearest level index) when the next endpoint leaves
    /// the between class. Never called for the single level case.
    fn edge_walker(&mut self, pass2: bool) -> i32 {
        let imax = self.imax;
        let mut edge = self.edge;
        let mut left = self.left;
        let mut n = self.n;
        let mut fwd = forward(left, imax);
        let mut p0 = point0(edge, fwd);
        let mut p1 = point1(edge, fwd);
        let mut jedge = is_jedge(left);
        let edge0 = self.edge0;
        let left0 = self.left0;
        let level0 = self.level0 == 2;
        let mut heads_up = false;

        loop {
            let z0 = (self.data[p0 as usize] & Z_VALUE) as i32;
            let z1 = (self.data[p1 as usize] & Z_VALUE) as i32;
            let mut marked = false;
            let mut n_kind = 0usize;

            if z0 == 1 {
                // Mark the current boundary corner.
                if pass2 {
                    let at = self.cp0 + n as usize;
                    self.xcp[at] = self.x[p0 as usize];
                    self.ycp[at] = self.y[p0 as usize];
                    self.kcp[at] = KIND_EDGE1;
                    n_kind = n as usize;
                }
                marked = true;
            } else if n == 0 {
                // First point of the curve lies outside the levels: do the
                // zone_crosser's job and mark the first cut here, so that it
                // is marked again as the curve closes.
                if pass2 {
                    let zlev = self.zlevel[(z0 != 0) as usize];
                    let zp0 = self.z[p0 as usize];
                    let zp1 = self.z[p1 as usize];
                    debug_assert!(zp1 != zp0);
                    let zcp = (zlev - zp0) / (zp1 - zp0);
                    let at = self.cp0 + n as usize;
                    self.xcp[at] = zcp * (self.x[p1 as usize] - self.x[p0 as usize])
                        + self.x[p0 as usize];
                    self.ycp[at] = zcp * (self.y[p1 as usize] - self.y[p0 as usize])
                        + self.y[p0 as usize];
                    self.kcp[at] = KIND_EDGE2;
                    n_kind = n as usize;
                }
                marked = true;
            }

            if n != 0 {
                if level0 && edge == edge0 && left == left0 {
                    // Closure. Closing on a hole needs a downslit to splice
                    // this curve into the one enclosing it.
                    self.edge = edge;
                    self.left = left;
                    self.n = n + marked as Index;
                    let bndy = if jedge { J_BNDY } else { I_BNDY };
                    if fwd < 0 && self.data[edge as usize] & bndy == 0 {
                        if n_kind != 0 {
                            self.kcp[self.cp0 + n_kind] += KIND_START_SLIT;
                        }
                        return self.slit_cutter(false, pass2);
                    }
                    if fwd < 0 && level0 && left < 0 {
                        // This boundary edge is already included by the
                        // upward slit from the contour line below; its
                        // J0_START must not seed another curve.
                        self.data[edge as usize] &= !J0_START;
                        if n_kind != 0 {
                            self.kcp[self.cp0 + n_kind] += KIND_START_SLIT;
                        }
                        return self.slit_cutter(false, pass2);
                    }
                    return 3;
                } else if pass2 {
                    if heads_up || (fwd < 0 && self.data[edge as usize] & SLIT_DN != 0) {
                        // A slit downstroke is consumed on its second visit;
                        // the first visit only flags it.
                        if !heads_up && self.data[edge as usize] & SLIT_DN_VISITED == 0 {
                            self.data[edge as usize] |= SLIT_DN_VISITED;
                        } else {
                            self.edge = edge;
                            self.left = left;
                            self.n = n + marked as Index;
                            if n_kind != 0 {
                                self.kcp[self.cp0 + n_kind] += KIND_START_SLIT;
                            }
                            return self.slit_cutter(heads_up, pass2);
                        }
                    }
                } else {
                    // Not the first point: clear this edge's start mark.
                    let start = self.data[edge as usize] & start_mark(left);
                    if start != 0 {
                        self.data[edge as usize] &= !start;
                        self.count -= 1;
                    }
                }
            }
            if marked {
                n += 1;
            }

            // If the next endpoint is not between the levels, exit to
            // zone_crosser at the level nearest p1.
            if z1 != 1 {
                self.edge = edge;
                self.left = left;
                self.n = n;
                return (z1 != 0) as i32;
            }

            // Step to p1 and find the next edge: turn left if possible,
            // else straight, else right, each guarded by the corresponding
            // boundary flag; watch for an upward slit beginning here.
            edge = p1 + if left > 0 { left } else { 0 };
            if pass2 && jedge && fwd > 0 && self.data[edge as usize] & SLIT_UP != 0 {
                jedge = !jedge;
                heads_up = true;
            } else if self.data[edge as usize] & (if jedge { I_BNDY } else { J_BNDY }) != 0 {
                let tmp = fwd;
                fwd = left;
                left = -tmp;
                jedge = !jedge;
            } else {
                edge = p1 + if fwd > 0 { fwd } else { 0 };
                if pass2 && !jedge && fwd > 0 && self.data[edge as usize] & SLIT_UP != 0 {
                    heads_up = true;
                } else if self.data[edge as usize] & (if jedge { J_BNDY } else { I_BNDY }) == 0 {
                    edge = p1 - if left < 0 { left } else { 0 };
                    jedge = !jedge;
                    let tmp = fwd;
                    fwd = -left;
                    left = tmp;
                }
            }
            p0 = p1;
            p1 = point1(edge, fwd);
        }
    }

    // ─────── Slit cutter ──────────────────────────────────────────────────────

    /// Cut a zero-width slit joining an inner closed curve to the curve
    /// enclosing it, so every emitted part stays simply connected while it
    /// is traced. The downstroke runs on both passes (the first pass lays
    /// the SLIT_DN/SLIT_UP marks and counts both strokes); the upstroke
    /// only ever runs on the second pass. Never called for the single
    /// level case.
    fn slit_cutter(&mut self, up: bool, pass2: bool) -> i32 {
        let imax = self.imax;
        let mut n = self.n;

        if up && pass2 {
            // Upstroke: proceed up the left side of the slit until a
            // boundary or a point not between the contour levels.
            let mut p1 = self.edge;
            loop {
                let z1 = (self.data[p1 as usize] & Z_VALUE) as i32;
                if z1 != 1 {
                    self.edge = p1;
                    self.left = -1;
                    self.n = n;
                    return (z1 != 0) as i32;
                } else if self.data[p1 as usize] & J_BNDY != 0 {
                    // Very unusual case of closing on a mesh hole.
                    self.edge = p1;
                    self.left = -imax;
                    self.n = n;
                    return 2;
                }
                let at = self.cp0 + n as usize;
                self.xcp[at] = self.x[p1 as usize];
                self.ycp[at] = self.y[p1 as usize];
                self.kcp[at] = KIND_SLIT_UP;
                n += 1;
                p1 += imax;
            }
        } else {
            // Downstroke: proceed down the right side of the slit until a
            // boundary or a point not between the contour levels.
            let mut p0 = self.edge;
            self.data[p0 as usize] |= SLIT_DN;
            p0 -= imax;
            loop {
                let z0 = (self.data[p0 as usize] & Z_VALUE) as i32;
                if !pass2 {
                    if z0 != 1
                        || self.data[p0 as usize] & I_BNDY != 0
                        || self.data[(p0 + 1) as usize] & J_BNDY != 0
                    {
                        // Mark the final i-edge with SLIT_UP; one extra
                        // count splices this curve into the outer one.
                        self.data[(p0 + imax) as usize] |= SLIT_UP;
                        self.n = n + 1;
                        return 4; // same special value as for OPEN_END
                    }
                } else {
                    if z0 != 1 {
                        self.edge = p0 + imax;
                        self.left = 1;
                        self.n = n;
                        return (z0 != 0) as i32;
                    } else if self.data[(p0 + 1) as usize] & J_BNDY != 0 {
                        self.edge = p0 + 1;
                        self.left = imax;
                        self.n = n;
                        return 2;
                    } else if self.data[p0 as usize] & I_BNDY != 0 {
                        self.edge = p0;
                        self.left = 1;
                        self.n = n;
                        return 2;
                    }
                }
                if pass2 {
                    let at = self.cp0 + n as usize;
                    self.xcp[at] = self.x[p0 as usize];
                    self.ycp[at] = self.y[p0 as usize];
                    self.kcp[at] = KIND_SLIT_DOWN;
                    n += 1;
                } else {
                    // The first pass counts the upstroke as well.
                    n += 2;
                }
                p0 -= imax;
            }
        }
    }

    // ─────── Diagnostics ──────────────────────────────────────────────────────

    /// Trace-level dump of the site and the packed state grid, top row
    /// first. Gated so the formatting work is skipped entirely when trace
    /// logging is off.
    fn log_state(&self) {
        if !log::log_enabled!(log::Level::Trace) {
            return;
        }
        log::trace!("zlevels: {:8.2} {:8.2}", self.zlevel[0], self.zlevel[1]);
        log::trace!(
            "edge {}, left {}, n {}, count {}, edge0 {}, left0 {}",
            self.edge,
            self.left,
            self.n,
            self.count,
            self.edge0,
            self.left0
        );
        log::trace!("  level0 {}, edge00 {}", self.level0, self.edge00);
        let imax = self.imax as usize;
        for j in (0..=self.jmax as usize).rev() {
            let row: Vec<String> = (0..imax)
                .map(|i| format!("{:04x}", self.data[i + j * imax]))
                .collect();
            log::trace!("{}", row.join(" "));
        }
    }
}
