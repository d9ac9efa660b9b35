// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Port of the cntr.c reorder step.
//
// The second pass emits each part as a flat run of points tagged with
// kind codes; slit strokes are embedded in the run so the trace stays
// connected. Reorder strips the slits back out: it splits the run into
// segments at slit points, merges segments whose endpoints coincide
// bitwise into subpaths, and emits MOVETO/LINETO/CLOSEPOLY codes. A part
// with an interior hole therefore comes out as one outer subpath plus one
// closed subpath per hole.

use super::TraceOutput;
use crate::error::ContourError;
use crate::line_type::{CLOSEPOLY, LINETO, MOVETO};
use crate::state::{Real, KIND_SLIT_UP};

/// Reorder every part of a trace. `np` gives each part's raw point count
/// into the shared buffers; `nlevels` is 1 for lines, 2 for filled.
pub(crate) fn build_parts(
    xp: &[Real],
    yp: &[Real],
    kp: &[u8],
    np: &[usize],
    nlevels: usize,
) -> Result<TraceOutput, ContourError> {
    let mut out = TraceOutput {
        verts: Vec::with_capacity(np.len()),
        codes: Vec::with_capacity(np.len()),
    };
    let mut base = 0usize;
    for (part, &npts) in np.iter().enumerate() {
        let (v, c) = reorder(
            &xp[base..base + npts],
            &yp[base..base + npts],
            &kp[base..base + npts],
            nlevels,
        )
        .map_err(|reason| ContourError::Reorder { part, reason })?;
        out.verts.push(v);
        out.codes.push(c);
        base += npts;
    }
    Ok(out)
}

/// Reorder a single part. The emitted arrays never exceed the raw count;
/// they shrink when segment joints drop duplicate points and slit strokes
/// are removed.
fn reorder(
    xpp: &[Real],
    ypp: &[Real],
    kpp: &[u8],
    nlevels: usize,
) -> Result<(Vec<[Real; 2]>, Vec<u8>), &'static str> {
    let npts = xpp.len();
    let maxnsegs = npts / 2 + 1;
    let mut i0 = vec![0usize; maxnsegs];
    let mut i1 = vec![0usize; maxnsegs];

    // Find the segments: a segment begins at an ordinary point and ends at
    // the next slit point (plain or start-marked) or at the part's end.
    let mut iseg = 0usize;
    let mut started = false;
    for i in 0..npts {
        if started {
            if kpp[i] >= KIND_SLIT_UP || i == npts - 1 {
                i1[iseg] = i;
                started = false;
                iseg += 1;
                if iseg == maxnsegs {
                    return Err("segment count exceeds npts/2 + 1");
                }
            }
        } else if kpp[i] < KIND_SLIT_UP && i < npts - 1 {
            i0[iseg] = i;
            started = true;
        }
    }
    let nsegs = iseg;

    // Find the subpaths as sets of connected segments: for each segment not
    // yet assigned, chain forward through segments whose first point equals
    // the current end point exactly.
    let mut subp = vec![-1i32; nsegs];
    let mut nsp = 0usize;
    for iseg in 0..nsegs {
        let mut xend = xpp[i1[iseg]];
        let mut yend = ypp[i1[iseg]];
        if subp[iseg] >= 0 {
            continue;
        }
        subp[iseg] = nsp as i32;
        nsp += 1;
        if iseg == nsegs - 1 {
            continue;
        }
        for isegplus in iseg + 1..nsegs {
            if subp[isegplus] >= 0 {
                continue;
            }
            if xend == xpp[i0[isegplus]] && yend == ypp[i0[isegplus]] {
                subp[isegplus] = subp[iseg];
                xend = xpp[i1[isegplus]];
                yend = ypp[i1[isegplus]];
            }
        }
    }

    // Generate the verts and codes from the subpaths. Later segments of a
    // subpath skip their first point, a duplicate of the previous segment's
    // last.
    let mut verts: Vec<[Real; 2]> = Vec::with_capacity(npts);
    let mut codes: Vec<u8> = Vec::with_capacity(npts);
    for isp in 0..nsp {
        let mut first = true;
        let kstart = verts.len();
        for iseg in 0..nsegs {
            if subp[iseg] != isp as i32 {
                continue;
            }
            let iend = i1[iseg];
            let istart = if first { i0[iseg] } else { i0[iseg] + 1 };
            for i in istart..=iend {
                verts.push([xpp[i], ypp[i]]);
                codes.push(if first { MOVETO } else { LINETO });
                first = false;
                if verts.len() > npts {
                    return Err("emitted points exceed part size");
                }
            }
        }
        let k = verts.len();
        if nlevels == 2 || verts[kstart] == verts[k - 1] {
            codes[k - 1] = CLOSEPOLY;
        }
    }

    Ok((verts, codes))
}
