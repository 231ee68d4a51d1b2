//! 3x3 homogeneous transform matrices used to map between raw pixel space
//! and the symbol's own unit-square coordinate space. Ported from
//! `utils/dmtxmatrix3.c`.

use crate::vector2::Vector2;
use log::warn;

pub type Matrix3 = [[f64; 3]; 3];

pub fn identity() -> Matrix3 {
    [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]
}

pub fn translate(tx: f64, ty: f64) -> Matrix3 {
    let mut m = identity();
    m[2][0] = tx;
    m[2][1] = ty;
    m
}

pub fn rotate(angle: f64) -> Matrix3 {
    let (sin_a, cos_a) = angle.sin_cos();
    let mut m = identity();
    m[0][0] = cos_a;
    m[0][1] = sin_a;
    m[1][0] = -sin_a;
    m[1][1] = cos_a;
    m
}

pub fn scale(sx: f64, sy: f64) -> Matrix3 {
    let mut m = identity();
    m[0][0] = sx;
    m[1][1] = sy;
    m
}

pub fn shear(shx: f64, shy: f64) -> Matrix3 {
    let mut m = identity();
    m[1][0] = shx;
    m[0][1] = shy;
    m
}

pub fn line_skew_top(b0: f64, b1: f64, sz: f64) -> Matrix3 {
    debug_assert!(b0 >= crate::vector2::ALMOST_ZERO);
    let mut m = identity();
    m[0][0] = b1 / b0;
    m[1][1] = sz / b0;
    m[0][2] = (b1 - b0) / (sz * b0);
    m
}

pub fn line_skew_top_inv(b0: f64, b1: f64, sz: f64) -> Matrix3 {
    debug_assert!(b1 >= crate::vector2::ALMOST_ZERO);
    let mut m = identity();
    m[0][0] = b0 / b1;
    m[1][1] = b0 / sz;
    m[0][2] = (b0 - b1) / (sz * b1);
    m
}

pub fn line_skew_side(b0: f64, b1: f64, sz: f64) -> Matrix3 {
    debug_assert!(b0 >= crate::vector2::ALMOST_ZERO);
    let mut m = identity();
    m[0][0] = sz / b0;
    m[1][1] = b1 / b0;
    m[1][2] = (b1 - b0) / (sz * b0);
    m
}

pub fn line_skew_side_inv(b0: f64, b1: f64, sz: f64) -> Matrix3 {
    debug_assert!(b1 >= crate::vector2::ALMOST_ZERO);
    let mut m = identity();
    m[0][0] = b0 / sz;
    m[1][1] = b0 / b1;
    m[1][2] = (b0 - b1) / (sz * b1);
    m
}

pub fn multiply(m0: &Matrix3, m1: &Matrix3) -> Matrix3 {
    let mut out = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            let mut val = 0.0;
            for k in 0..3 {
                val += m0[i][k] * m1[k][j];
            }
            out[i][j] = val;
        }
    }
    out
}

pub fn multiply_by(m0: &mut Matrix3, m1: &Matrix3) {
    *m0 = multiply(m0, m1);
}

/// Applies homogeneous transform `m` to `v_in`, returning `None` (the
/// original's `DmtxFail`) when the homogeneous divisor collapses to zero.
pub fn v_multiply(v_in: &Vector2, m: &Matrix3) -> Option<Vector2> {
    let w = v_in.x * m[0][2] + v_in.y * m[1][2] + m[2][2];
    if w.abs() <= crate::vector2::ALMOST_ZERO {
        warn!("matrix3 v_multiply: homogeneous divisor collapsed to zero");
        return None;
    }

    Some(Vector2::new(
        (v_in.x * m[0][0] + v_in.y * m[1][0] + m[2][0]) / w,
        (v_in.x * m[0][1] + v_in.y * m[1][1] + m[2][1]) / w,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_leaves_points_unchanged() {
        let m = identity();
        let v = Vector2::new(3.0, -2.0);
        let out = v_multiply(&v, &m).unwrap();
        assert!((out.x - 3.0).abs() < 1e-9);
        assert!((out.y + 2.0).abs() < 1e-9);
    }

    #[test]
    fn translate_shifts_points() {
        let m = translate(5.0, -1.0);
        let out = v_multiply(&Vector2::new(0.0, 0.0), &m).unwrap();
        assert!((out.x - 5.0).abs() < 1e-9);
        assert!((out.y + 1.0).abs() < 1e-9);
    }

    #[test]
    fn multiply_composes_transforms() {
        let t = translate(1.0, 0.0);
        let s = scale(2.0, 2.0);
        let combined = multiply(&t, &s);
        let out = v_multiply(&Vector2::new(1.0, 1.0), &combined).unwrap();
        // translate-then-scale: (1+1, 1+0) * 2 = (4, 2)
        assert!((out.x - 4.0).abs() < 1e-9);
        assert!((out.y - 2.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_homogeneous_divisor_fails() {
        let mut m = identity();
        m[0][2] = 1.0;
        m[1][2] = 0.0;
        m[2][2] = -1.0;
        assert!(v_multiply(&Vector2::new(1.0, 0.0), &m).is_none());
    }
}
