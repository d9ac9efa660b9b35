// Copyright 2025 Lars Brubaker
// Masked points: the four zones sharing a bad point vanish and contours
// stop on the resulting hole boundary.

mod helpers;

use cntr_rust::{ContourError, ContourTracer, Real};
use helpers::{grid_xy, ramp, trace_lines, verify_filled_closure, verify_valid_output};

fn trace_lines_masked(
    imax: usize,
    jmax: usize,
    z: &[Real],
    mask: &[bool],
    level: Real,
) -> cntr_rust::TraceOutput {
    let (x, y) = grid_xy(imax, jmax);
    let mut t = ContourTracer::new(imax, jmax, &x, &y, z, Some(mask), 0, 0).unwrap();
    t.trace(&[level]).unwrap()
}

#[test]
fn masked_point_never_appears_on_a_curve() {
    // Mask the interior point (1,1) of a 4x4 ramp. The diagonal line at
    // level 2.5 would otherwise pass through the zones around it.
    let z = ramp(4, 4);
    let mut mask = [false; 16];
    mask[5] = true;
    let out = trace_lines_masked(4, 4, &z, &mask, 2.5);
    verify_valid_output(&out);
    assert!(out.part_count() > 0);
    for v in &out.verts {
        for p in v {
            assert_ne!(*p, [1.0, 1.0], "vertex at the masked point");
        }
    }
}

#[test]
fn masking_changes_the_trace() {
    let z = ramp(4, 4);
    let unmasked = trace_lines(4, 4, &z, 2.5);
    let mut mask = [false; 16];
    mask[5] = true;
    let masked = trace_lines_masked(4, 4, &z, &mask, 2.5);
    let total_unmasked: usize = unmasked.verts.iter().map(Vec::len).sum();
    let total_masked: usize = masked.verts.iter().map(Vec::len).sum();
    assert_ne!(total_unmasked, total_masked);
}

#[test]
fn curves_terminate_on_the_hole_boundary() {
    // Masking point (1,1) removes the four zones covering [0,2]x[0,2].
    // Every open curve must end either on the mesh boundary or on the
    // boundary of that square hole.
    let z = ramp(4, 4);
    let mut mask = [false; 16];
    mask[5] = true;
    let out = trace_lines_masked(4, 4, &z, &mask, 2.5);
    for v in &out.verts {
        for p in [v.first().unwrap(), v.last().unwrap()] {
            let on_mesh = p[0] == 0.0 || p[0] == 3.0 || p[1] == 0.0 || p[1] == 3.0;
            let on_hole = (p[0] == 2.0 && p[1] <= 2.0) || (p[1] == 2.0 && p[0] <= 2.0);
            assert!(on_mesh || on_hole, "endpoint {:?} is interior", p);
        }
    }
    // Nothing at all inside the hole.
    for v in &out.verts {
        for p in v {
            assert!(
                !(p[0] < 2.0 && p[1] < 2.0),
                "vertex {:?} inside the masked square",
                p
            );
        }
    }
}

#[test]
fn filled_trace_walks_around_the_hole() {
    let z = ramp(4, 4);
    let mut mask = [false; 16];
    mask[5] = true;
    let (x, y) = grid_xy(4, 4);
    let mut t = ContourTracer::new(4, 4, &x, &y, &z, Some(&mask), 0, 0).unwrap();
    let out = t.trace(&[1.5, 3.5]).unwrap();
    verify_valid_output(&out);
    verify_filled_closure(&out);
    assert!(out.part_count() > 0);
    // The filled band may border the hole but never enters it.
    for v in &out.verts {
        for p in v {
            assert!(
                !(p[0] < 2.0 && p[1] < 2.0),
                "vertex {:?} inside the masked square",
                p
            );
        }
    }
}

#[test]
fn mask_shape_is_validated() {
    let z = ramp(4, 4);
    let (x, y) = grid_xy(4, 4);
    let mask = [false; 15];
    let err = ContourTracer::new(4, 4, &x, &y, &z, Some(&mask), 0, 0).unwrap_err();
    assert!(matches!(
        err,
        ContourError::ShapeMismatch { name: "mask", .. }
    ));
}
