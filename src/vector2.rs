//! 2D vector and ray math used by the detector's line fitting and homography
//! code. Ported from `utils/dmtxvector2.c`.

pub const ALMOST_ZERO: f64 = 0.000000001;

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    pub fn new(x: f64, y: f64) -> Self {
        Vector2 { x, y }
    }

    pub fn add(&self, other: &Vector2) -> Vector2 {
        Vector2::new(self.x + other.x, self.y + other.y)
    }

    pub fn sub(&self, other: &Vector2) -> Vector2 {
        Vector2::new(self.x - other.x, self.y - other.y)
    }

    pub fn scale(&self, s: f64) -> Vector2 {
        Vector2::new(self.x * s, self.y * s)
    }

    pub fn cross(&self, other: &Vector2) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn dot(&self, other: &Vector2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn mag(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Normalizes in place and returns the prior magnitude, or `-1.0` if the
    /// vector is too small to normalize.
    pub fn norm(&mut self) -> f64 {
        let mag = self.mag();
        if mag <= ALMOST_ZERO {
            return -1.0;
        }
        *self = self.scale(1.0 / mag);
        mag
    }
}

/// A ray defined by origin `p` and (ideally unit-length) direction `v`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ray2 {
    pub p: Vector2,
    pub v: Vector2,
}

/// Perpendicular distance from `q` to the infinite line through ray `r`.
pub fn distance_from_ray2(r: &Ray2, q: &Vector2) -> f64 {
    let mag = r.v.mag();
    debug_assert!(mag.abs() > ALMOST_ZERO);
    r.v.cross(&q.sub(&r.p)) / mag
}

/// Signed distance along `r`'s direction from `r.p` to the projection of `q`.
pub fn distance_along_ray2(r: &Ray2, q: &Vector2) -> f64 {
    q.sub(&r.p).dot(&r.v)
}

/// Intersects two rays as infinite lines. Fails (returns `None`) when the
/// rays are parallel (or nearly so).
pub fn ray2_intersect(p0: &Ray2, p1: &Ray2) -> Option<Vector2> {
    let denom = p1.v.cross(&p0.v);
    if denom.abs() <= ALMOST_ZERO {
        return None;
    }

    let w = p1.p.sub(&p0.p);
    let numer = p1.v.cross(&w);

    Some(point_along_ray2(p0, numer / denom))
}

/// The point `p + t*v` along ray `r`.
pub fn point_along_ray2(r: &Ray2, t: f64) -> Vector2 {
    r.p.add(&r.v.scale(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perpendicular_axes_intersect_at_origin() {
        let horiz = Ray2 {
            p: Vector2::new(0.0, 0.0),
            v: Vector2::new(1.0, 0.0),
        };
        let vert = Ray2 {
            p: Vector2::new(5.0, -5.0),
            v: Vector2::new(0.0, 1.0),
        };
        let pt = ray2_intersect(&horiz, &vert).unwrap();
        assert!((pt.x - 5.0).abs() < 1e-9);
        assert!((pt.y - 0.0).abs() < 1e-9);
    }

    #[test]
    fn parallel_rays_do_not_intersect() {
        let a = Ray2 {
            p: Vector2::new(0.0, 0.0),
            v: Vector2::new(1.0, 0.0),
        };
        let b = Ray2 {
            p: Vector2::new(0.0, 1.0),
            v: Vector2::new(1.0, 0.0),
        };
        assert!(ray2_intersect(&a, &b).is_none());
    }

    #[test]
    fn distance_from_ray_is_signed() {
        let r = Ray2 {
            p: Vector2::new(0.0, 0.0),
            v: Vector2::new(1.0, 0.0),
        };
        assert!(distance_from_ray2(&r, &Vector2::new(3.0, 2.0)) < 0.0);
        assert!(distance_from_ray2(&r, &Vector2::new(3.0, -2.0)) > 0.0);
    }

    #[test]
    fn norm_scales_to_unit_length() {
        let mut v = Vector2::new(3.0, 4.0);
        let mag = v.norm();
        assert!((mag - 5.0).abs() < 1e-9);
        assert!((v.mag() - 1.0).abs() < 1e-9);
    }
}
