// Copyright 2025 Lars Brubaker
// Shared test utilities for cntr-rust tests.

#![allow(dead_code)]

use cntr_rust::{ContourTracer, Real, TraceOutput, CLOSEPOLY, LINETO, MOVETO};

/// Regular grid coordinates: x[ij] = i, y[ij] = j.
pub fn grid_xy(imax: usize, jmax: usize) -> (Vec<Real>, Vec<Real>) {
    let mut x = Vec::with_capacity(imax * jmax);
    let mut y = Vec::with_capacity(imax * jmax);
    for j in 0..jmax {
        for i in 0..imax {
            x.push(i as Real);
            y.push(j as Real);
        }
    }
    (x, y)
}

/// z = i + j, a plane sloping up to the upper right.
pub fn ramp(imax: usize, jmax: usize) -> Vec<Real> {
    let mut z = Vec::with_capacity(imax * jmax);
    for j in 0..jmax {
        for i in 0..imax {
            z.push((i + j) as Real);
        }
    }
    z
}

/// z = max(|i-c|, |j-c|), a square cone with its apex at the grid centre.
/// Level sets are concentric squares with cut corners; a level pair picks
/// out a square annulus.
pub fn square_cone(n: usize) -> Vec<Real> {
    let c = ((n - 1) / 2) as Real;
    let mut z = Vec::with_capacity(n * n);
    for j in 0..n {
        for i in 0..n {
            let di = (i as Real - c).abs();
            let dj = (j as Real - c).abs();
            z.push(di.max(dj));
        }
    }
    z
}

/// Trace iso-lines of z on the regular grid.
pub fn trace_lines(imax: usize, jmax: usize, z: &[Real], level: Real) -> TraceOutput {
    let (x, y) = grid_xy(imax, jmax);
    let mut t = ContourTracer::new(imax, jmax, &x, &y, z, None, 0, 0).unwrap();
    t.trace(&[level]).unwrap()
}

/// Trace the filled region between two levels on the regular grid.
pub fn trace_filled(
    imax: usize,
    jmax: usize,
    z: &[Real],
    lower: Real,
    upper: Real,
) -> TraceOutput {
    let (x, y) = grid_xy(imax, jmax);
    let mut t = ContourTracer::new(imax, jmax, &x, &y, z, None, 0, 0).unwrap();
    t.trace(&[lower, upper]).unwrap()
}

/// Split one part into its subpaths at each MOVETO.
pub fn subpaths(verts: &[[Real; 2]], codes: &[u8]) -> Vec<(Vec<[Real; 2]>, Vec<u8>)> {
    let mut out = Vec::new();
    let mut start = 0usize;
    for i in 1..codes.len() {
        if codes[i] == MOVETO {
            out.push((verts[start..i].to_vec(), codes[start..i].to_vec()));
            start = i;
        }
    }
    if start < codes.len() {
        out.push((verts[start..].to_vec(), codes[start..].to_vec()));
    }
    out
}

/// Signed area of a polygon; a duplicated closing vertex is ignored.
/// Positive means CCW.
pub fn signed_area(path: &[[Real; 2]]) -> Real {
    let mut pts = path;
    if pts.len() > 1 && pts[0] == pts[pts.len() - 1] {
        pts = &pts[..pts.len() - 1];
    }
    let n = pts.len();
    if n < 3 {
        return 0.0;
    }
    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += pts[i][0] * pts[j][1] - pts[j][0] * pts[i][1];
    }
    0.5 * area
}

/// Total signed area across all parts and subpaths of a trace, so holes
/// (CW subpaths) subtract from their enclosing polygons.
pub fn total_signed_area(out: &TraceOutput) -> Real {
    let mut total = 0.0;
    for (v, c) in out.verts.iter().zip(&out.codes) {
        for (sv, _) in subpaths(v, c) {
            total += signed_area(&sv);
        }
    }
    total
}

/// Verify structural validity: lengths match, every subpath begins with
/// MOVETO, codes are from the path alphabet, coordinates are finite.
pub fn verify_valid_output(out: &TraceOutput) {
    assert_eq!(out.verts.len(), out.codes.len(), "parts mismatch");
    for (p, (v, c)) in out.verts.iter().zip(&out.codes).enumerate() {
        assert_eq!(v.len(), c.len(), "part {} length mismatch", p);
        if let Some(&first) = c.first() {
            assert_eq!(first, MOVETO, "part {} must start with MOVETO", p);
        }
        for (i, &code) in c.iter().enumerate() {
            assert!(
                code == MOVETO || code == LINETO || code == CLOSEPOLY,
                "part {} has unknown code {} at {}",
                p,
                code,
                i
            );
        }
        for (i, pt) in v.iter().enumerate() {
            assert!(
                pt[0].is_finite() && pt[1].is_finite(),
                "part {} vertex {} is not finite: {:?}",
                p,
                i,
                pt
            );
        }
    }
}

/// Verify that every subpath of a filled trace is closed: endpoints
/// coincide and the final code is CLOSEPOLY.
pub fn verify_filled_closure(out: &TraceOutput) {
    for (p, (v, c)) in out.verts.iter().zip(&out.codes).enumerate() {
        for (s, (sv, sc)) in subpaths(v, c).into_iter().enumerate() {
            assert_eq!(
                sv.first(),
                sv.last(),
                "part {} subpath {} endpoints differ",
                p,
                s
            );
            assert_eq!(
                *sc.last().unwrap(),
                CLOSEPOLY,
                "part {} subpath {} does not close",
                p,
                s
            );
        }
    }
}

/// Drop consecutive duplicate vertices (a cut landing exactly on a grid
/// point is recorded once per incident edge).
pub fn dedup_consecutive(path: &[[Real; 2]]) -> Vec<[Real; 2]> {
    let mut out: Vec<[Real; 2]> = Vec::with_capacity(path.len());
    for &pt in path {
        if out.last() != Some(&pt) {
            out.push(pt);
        }
    }
    out
}

fn orient(a: [Real; 2], b: [Real; 2], c: [Real; 2]) -> Real {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

/// True if segments ab and cd properly cross (shared endpoints excluded).
pub fn segments_cross(a: [Real; 2], b: [Real; 2], c: [Real; 2], d: [Real; 2]) -> bool {
    let o1 = orient(a, b, c);
    let o2 = orient(a, b, d);
    let o3 = orient(c, d, a);
    let o4 = orient(c, d, b);
    o1 * o2 < 0.0 && o3 * o4 < 0.0
}

/// Count codes of one kind across all parts.
pub fn count_code(out: &TraceOutput, code: u8) -> usize {
    out.codes
        .iter()
        .flat_map(|c| c.iter())
        .filter(|&&c| c == code)
        .count()
}

/// Affine-transform grid coordinates for the equivariance law tests.
pub fn affine_xy(x: &[Real], y: &[Real], sx: Real, tx: Real, sy: Real, ty: Real) -> (Vec<Real>, Vec<Real>) {
    (
        x.iter().map(|&v| sx * v + tx).collect(),
        y.iter().map(|&v| sy * v + ty).collect(),
    )
}
