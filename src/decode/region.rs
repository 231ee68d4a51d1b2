//! Barcode region detection: edge seeking, trail blazing, Hough line
//! fitting, orientation assignment, homography construction, and symbol
//! size determination. Ported from `dmtxregion.c`; the point-flow, corner
//! homography (`dmtxRegionUpdateCorners`/`Xfrms`), and size-determination
//! routines are close to line-for-line, while the Hough accumulator and
//! trail blaze are condensed to a floating-point equivalent of the
//! original's 180-bin integer table (same `DMTX_HOUGH_RES` resolution and
//! acceptance thresholds, without the fixed-point sub-bin widening trick).

use crate::matrix3::{self, Matrix3};
use crate::symbol::{self, SizeIdx, SizeRequest};
use crate::vector2::{self, Ray2, Vector2};

pub const HOUGH_RES: i32 = 180;

const PATTERN_X: [i32; 8] = [-1, 0, 1, 1, 1, 0, -1, -1];
const PATTERN_Y: [i32; 8] = [-1, -1, -1, 0, 1, 1, 1, 0];
const NEIGHBOR_NONE: i32 = 8;

/// Minimal image access the detector needs: per-channel pixel sampling over
/// a rectangular pixel grid. `channel_count` is 1 for grayscale, 3 for RGB.
pub trait DecodeImage {
    fn width(&self) -> i32;
    fn height(&self) -> i32;
    fn channel_count(&self) -> usize;
    /// Returns `None` for out-of-bounds coordinates.
    fn pixel_value(&self, x: i32, y: i32, plane: usize) -> Option<i32>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PixelLoc {
    pub x: i32,
    pub y: i32,
}

#[derive(Clone, Copy, Debug)]
pub struct PointFlow {
    pub plane: usize,
    pub arrive: i32,
    pub depart: i32,
    pub mag: i32,
    pub loc: PixelLoc,
}

fn blank_edge() -> PointFlow {
    PointFlow {
        plane: 0,
        arrive: 0,
        depart: 0,
        mag: -1,
        loc: PixelLoc { x: -1, y: -1 },
    }
}

/// Computes the point-flow (Sobel-like 8-compass edge strength) at `loc`.
pub fn get_point_flow(img: &dyn DecodeImage, plane: usize, loc: PixelLoc, arrive: i32) -> PointFlow {
    const COEFFICIENT: [i32; 8] = [0, 1, 2, 1, 0, -1, -2, -1];

    let mut color_pattern = [0i32; 8];
    for i in 0..8 {
        match img.pixel_value(loc.x + PATTERN_X[i], loc.y + PATTERN_Y[i], plane) {
            Some(c) => color_pattern[i] = c,
            None => return blank_edge(),
        }
    }

    let mut mag = [0i32; 4];
    let mut compass_max = 0usize;
    for compass in 0..4 {
        for pattern_idx in 0..8 {
            let coefficient_idx = ((pattern_idx as i32 - compass as i32 + 8) % 8) as usize;
            let c = COEFFICIENT[coefficient_idx];
            if c == 0 {
                continue;
            }
            mag[compass] += c * color_pattern[pattern_idx];
        }
        if compass != 0 && mag[compass].abs() > mag[compass_max].abs() {
            compass_max = compass;
        }
    }

    PointFlow {
        plane,
        arrive,
        depart: if mag[compass_max] > 0 { compass_max as i32 + 4 } else { compass_max as i32 },
        mag: mag[compass_max].abs(),
        loc,
    }
}

/// Finds the strongest unoccupied neighbor in the direction implied by
/// `center`'s departure heading and `sign` (+1 forward, -1 backward).
pub fn find_strongest_neighbor(img: &dyn DecodeImage, visited: &dyn Fn(i32, i32) -> bool, center: PointFlow, sign: i32) -> PointFlow {
    let attempt = if sign < 0 { center.depart } else { (center.depart + 4) % 8 };

    let mut occupied = 0;
    let mut strong_idx: Option<usize> = None;
    let mut flow = [blank_edge(); 8];

    for i in 0..8 {
        let loc = PixelLoc {
            x: center.loc.x + PATTERN_X[i],
            y: center.loc.y + PATTERN_Y[i],
        };
        if loc.x < 0 || loc.y < 0 || loc.x >= img.width() || loc.y >= img.height() {
            continue;
        }

        if visited(loc.x, loc.y) {
            occupied += 1;
            if occupied > 2 {
                return blank_edge();
            }
            continue;
        }

        let arrive = (i as i32 + 4) % 8;
        flow[i] = get_point_flow(img, center.plane, loc, arrive);

        if flow[i].mag < 10 {
            continue;
        }

        let diff = (flow[i].depart - attempt).abs();
        if diff > 4 {
            continue;
        }

        match strong_idx {
            None => strong_idx = Some(i),
            Some(best) if flow[i].mag > flow[best].mag => strong_idx = Some(i),
            _ => {}
        }
    }

    match strong_idx {
        Some(i) => flow[i],
        None => blank_edge(),
    }
}

/// Seeds a region search at `loc`: finds the strongest colour plane and
/// validates that the neighbour chase closes back onto the seed.
pub fn seek_edge(img: &dyn DecodeImage, visited: &dyn Fn(i32, i32) -> bool, loc: PixelLoc, edge_thresh: f64) -> Option<PointFlow> {
    let channel_count = img.channel_count();
    let mut planes = Vec::with_capacity(channel_count);
    for plane in 0..channel_count {
        planes.push(get_point_flow(img, plane, loc, NEIGHBOR_NONE));
    }

    let strong_idx = (0..channel_count).max_by_key(|&i| planes[i].mag)?;
    if planes[strong_idx].mag < 10 {
        return None;
    }

    let flow = planes[strong_idx];
    if (flow.mag as f64) < edge_thresh * 7.65 {
        return None;
    }

    let flow_pos = find_strongest_neighbor(img, visited, flow, 1);
    let flow_neg = find_strongest_neighbor(img, visited, flow, -1);
    if flow_pos.mag != 0 && flow_neg.mag != 0 {
        let flow_pos_back = find_strongest_neighbor(img, visited, flow_pos, -1);
        let flow_neg_back = find_strongest_neighbor(img, visited, flow_neg, 1);
        if flow_pos.arrive == (flow_pos_back.arrive + 4) % 8 && flow_neg.arrive == (flow_neg_back.arrive + 4) % 8 {
            let mut seed = flow;
            seed.arrive = NEIGHBOR_NONE;
            return Some(seed);
        }
    }

    None
}

/// A trail blazed continuously in both directions from a seed point.
pub struct Trail {
    pub points: Vec<PixelLoc>,
    pub bound_min: PixelLoc,
    pub bound_max: PixelLoc,
}

/// Walks the point-flow chain both directions from `seed`, stopping on weak
/// magnitude, a visited cell, the image edge, or a bounding box that exceeds
/// `max_diagonal` (when set).
pub fn trail_blaze(img: &dyn DecodeImage, seed: PointFlow, max_diagonal: Option<i32>) -> Trail {
    let mut points = vec![seed.loc];
    let mut visited_set = std::collections::HashSet::new();
    visited_set.insert((seed.loc.x, seed.loc.y));
    let visited = |x: i32, y: i32| visited_set.contains(&(x, y));

    let mut bound_min = seed.loc;
    let mut bound_max = seed.loc;

    for &sign in &[1i32, -1i32] {
        let mut current = seed;
        loop {
            let next = find_strongest_neighbor(img, &visited, current, sign);
            if next.mag < 50 {
                break;
            }
            if visited_set.contains(&(next.loc.x, next.loc.y)) {
                break;
            }

            bound_min.x = bound_min.x.min(next.loc.x);
            bound_min.y = bound_min.y.min(next.loc.y);
            bound_max.x = bound_max.x.max(next.loc.x);
            bound_max.y = bound_max.y.max(next.loc.y);

            if let Some(max_diag) = max_diagonal {
                let dx = bound_max.x - bound_min.x;
                let dy = bound_max.y - bound_min.y;
                if dx * dx + dy * dy > max_diag * max_diag {
                    break;
                }
            }

            visited_set.insert((next.loc.x, next.loc.y));
            points.push(next.loc);
            current = next;
        }
    }

    Trail { points, bound_min, bound_max }
}

/// A line fit through a subset of a trail, in the Hough-angle parameterization.
#[derive(Clone, Copy, Debug, Default)]
pub struct BestLine {
    pub angle: i32,
    pub mag: i32,
    pub dist_sq: f64,
    pub devn: f64,
    pub loc_beg: Vector2,
    pub loc_pos: Vector2,
    pub loc_neg: Vector2,
    pub step_pos: i32,
    pub step_neg: i32,
}

/// Fits the strongest line through `trail`'s points using a 180-bin angle
/// accumulator (the same resolution as `DMTX_HOUGH_RES`), optionally masking
/// out a +/-30 degree band around `avoid_angle` (used when fitting a second,
/// necessarily non-parallel edge).
pub fn find_best_solid_line(trail: &Trail, avoid_angle: Option<i32>) -> BestLine {
    let seed = trail.points[0];
    let seed_v = Vector2::new(seed.x as f64, seed.y as f64);

    let mut hough = [0i32; HOUGH_RES as usize];
    for &p in &trail.points {
        let x_diff = (p.x - seed.x) as f64;
        let y_diff = (p.y - seed.y) as f64;
        for angle in 0..HOUGH_RES {
            if let Some(avoid) = avoid_angle {
                let delta = (angle - avoid).rem_euclid(HOUGH_RES);
                if delta <= 30 || delta >= HOUGH_RES - 30 {
                    continue;
                }
            }
            let radians = angle as f64 * std::f64::consts::PI / HOUGH_RES as f64;
            let h_vx = radians.cos();
            let h_vy = radians.sin();
            let d_h = h_vx * y_diff - h_vy * x_diff;
            if d_h.abs() <= 1.5 {
                hough[angle as usize] += 1;
            }
        }
    }

    let (angle_best, mag_best) = hough
        .iter()
        .enumerate()
        .max_by_key(|&(_, &m)| m)
        .map(|(a, &m)| (a as i32, m))
        .unwrap_or((0, 0));

    let radians = angle_best as f64 * std::f64::consts::PI / HOUGH_RES as f64;
    let direction = Vector2::new(radians.cos(), radians.sin());
    let ray = Ray2 { p: seed_v, v: direction };

    let mut loc_pos = seed_v;
    let mut loc_neg = seed_v;
    let mut step_pos = 0;
    let mut step_neg = 0;
    let mut max_devn = 0.0f64;

    for (i, &p) in trail.points.iter().enumerate() {
        let q = Vector2::new(p.x as f64, p.y as f64);
        let travel = vector2::distance_along_ray2(&ray, &q);
        let wander = vector2::distance_from_ray2(&ray, &q).abs();

        if wander > max_devn {
            max_devn = wander;
        }
        if wander <= 3.0 {
            if travel >= 0.0 && travel > vector2::distance_along_ray2(&ray, &loc_pos) {
                loc_pos = q;
                step_pos = i as i32;
            }
            if travel <= 0.0 && travel < vector2::distance_along_ray2(&ray, &loc_neg) {
                loc_neg = q;
                step_neg = i as i32;
            }
        }
    }

    let dist_sq = loc_pos.sub(&loc_neg).mag().powi(2);

    BestLine {
        angle: angle_best,
        mag: mag_best,
        dist_sq,
        devn: max_devn,
        loc_beg: seed_v,
        loc_pos,
        loc_neg,
        step_pos,
        step_neg,
    }
}

pub fn line_is_acceptable(line: &BestLine) -> bool {
    line.dist_sq >= 100.0 && line.devn * 10.0 < line.dist_sq.sqrt()
}

/// A detected region: the two fitted edges (left/bottom as the coarse
/// frame), polarity, and (once [`update_xfrms`] succeeds) the raw<->fit
/// homographies.
#[derive(Clone, Debug, Default)]
pub struct Region {
    pub polarity: i32,
    pub loc_r: Vector2,
    pub step_r: i32,
    pub loc_t: Vector2,
    pub step_t: i32,
    pub left_loc: Vector2,
    pub left_angle: i32,
    pub bottom_loc: Vector2,
    pub bottom_angle: i32,
    pub top_loc: Option<Vector2>,
    pub top_angle: i32,
    pub right_loc: Option<Vector2>,
    pub right_angle: i32,
    pub raw_to_fit: Matrix3,
    pub fit_to_raw: Matrix3,
    pub size_idx: Option<SizeIdx>,
    pub on_color: i32,
    pub off_color: i32,
}

/// Assigns polarity and left/bottom edges from two independently fitted
/// lines by the sign of their direction-vector cross product (the four
/// L-finder corner cases from `matrixRegionOrientation`).
pub fn assign_orientation(line1: &BestLine, line2: &BestLine) -> Region {
    let mut reg = Region::default();

    let cross = (line1.loc_pos.x - line1.loc_neg.x) * (line2.loc_pos.y - line2.loc_neg.y)
        - (line1.loc_pos.y - line1.loc_neg.y) * (line2.loc_pos.x - line2.loc_neg.x);

    if cross > 0.0 {
        reg.polarity = 1;
        reg.loc_r = line2.loc_pos;
        reg.step_r = line2.step_pos;
        reg.loc_t = line1.loc_neg;
        reg.step_t = line1.step_neg;
        reg.left_loc = line1.loc_beg;
        reg.left_angle = line1.angle;
        reg.bottom_loc = line2.loc_beg;
        reg.bottom_angle = line2.angle;
    } else {
        reg.polarity = -1;
        reg.loc_r = line1.loc_neg;
        reg.step_r = line1.step_neg;
        reg.loc_t = line2.loc_pos;
        reg.step_t = line2.step_pos;
        reg.left_loc = line2.loc_beg;
        reg.left_angle = line2.angle;
        reg.bottom_loc = line1.loc_beg;
        reg.bottom_angle = line1.angle;
    }

    reg
}

fn right_angle_trueness(c0: Vector2, c1: Vector2, c2: Vector2, angle: f64) -> f64 {
    let mut v_a = c0.sub(&c1);
    v_a.norm();
    let mut v_b = c2.sub(&c1);
    v_b.norm();

    let m = matrix3::rotate(angle);
    let v_b = matrix3::v_multiply(&v_b, &m).unwrap_or(v_b);

    v_a.dot(&v_b)
}

/// Validates the quadrilateral formed by the four corners and builds the
/// raw<->fit homographies, ported from `dmtxRegionUpdateCorners`.
pub fn update_corners(
    reg: &mut Region,
    p00: Vector2,
    p10: Vector2,
    p11: Vector2,
    p01: Vector2,
    x_max: f64,
    y_max: f64,
    square_devn: f64,
) -> bool {
    if p00.x < 0.0 || p00.y < 0.0 || p00.x > x_max || p00.y > y_max {
        return false;
    }
    if p01.x < 0.0 || p01.y < 0.0 || p01.x > x_max || p01.y > y_max {
        return false;
    }
    if p10.x < 0.0 || p10.y < 0.0 || p10.x > x_max || p10.y > y_max {
        return false;
    }

    let v_ot = p01.sub(&p00);
    let v_or = p10.sub(&p00);
    let v_tx = p11.sub(&p01);
    let v_rx = p11.sub(&p10);

    let dim_ot = v_ot.mag();
    let dim_or = v_or.mag();
    let dim_tx = v_tx.mag();
    let dim_rx = v_rx.mag();

    if dim_ot <= 8.0 || dim_or <= 8.0 || dim_tx <= 8.0 || dim_rx <= 8.0 {
        return false;
    }

    let ratio = dim_ot / dim_rx;
    if ratio <= 0.5 || ratio >= 2.0 {
        return false;
    }
    let ratio = dim_or / dim_tx;
    if ratio <= 0.5 || ratio >= 2.0 {
        return false;
    }

    if v_or.cross(&v_rx) <= 0.0 || v_ot.cross(&v_tx) >= 0.0 {
        return false;
    }

    if right_angle_trueness(p00, p10, p11, std::f64::consts::FRAC_PI_2) <= square_devn {
        return false;
    }
    if right_angle_trueness(p10, p11, p01, std::f64::consts::FRAC_PI_2) <= square_devn {
        return false;
    }

    let tx = -p00.x;
    let ty = -p00.y;
    let m_txy = matrix3::translate(tx, ty);

    let phi = v_ot.x.atan2(v_ot.y);
    let m_phi = matrix3::rotate(phi);
    let mut m = matrix3::multiply(&m_txy, &m_phi);

    let v_tmp = matrix3::v_multiply(&p10, &m).unwrap_or_default();
    let shx = -v_tmp.y / v_tmp.x;
    let m_shx = matrix3::shear(0.0, shx);
    matrix3::multiply_by(&mut m, &m_shx);

    let scx = 1.0 / v_tmp.x;
    let m_scx = matrix3::scale(scx, 1.0);
    matrix3::multiply_by(&mut m, &m_scx);

    let v_tmp = matrix3::v_multiply(&p11, &m).unwrap_or_default();
    let scy = 1.0 / v_tmp.y;
    let m_scy = matrix3::scale(1.0, scy);
    matrix3::multiply_by(&mut m, &m_scy);

    let v_tmp = matrix3::v_multiply(&p11, &m).unwrap_or_default();
    let skx = v_tmp.x;
    let m_skx = matrix3::line_skew_side(1.0, skx, 1.0);
    matrix3::multiply_by(&mut m, &m_skx);

    let v_tmp = matrix3::v_multiply(&p01, &m).unwrap_or_default();
    let sky = v_tmp.y;
    let m_sky = matrix3::line_skew_top(sky, 1.0, 1.0);
    reg.raw_to_fit = matrix3::multiply(&m, &m_sky);

    let m_sky_inv = matrix3::line_skew_top_inv(sky, 1.0, 1.0);
    let m_skx_inv = matrix3::line_skew_side_inv(1.0, skx, 1.0);
    let mut m = matrix3::multiply(&m_sky_inv, &m_skx_inv);

    let m_scxy = matrix3::scale(1.0 / scx, 1.0 / scy);
    matrix3::multiply_by(&mut m, &m_scxy);

    let m_shx_inv = matrix3::shear(0.0, -shx);
    matrix3::multiply_by(&mut m, &m_shx_inv);

    let m_phi_inv = matrix3::rotate(-phi);
    matrix3::multiply_by(&mut m, &m_phi_inv);

    let m_txy_inv = matrix3::translate(-tx, -ty);
    reg.fit_to_raw = matrix3::multiply(&m, &m_txy_inv);

    true
}

/// Rebuilds the left/bottom/top/right edge rays and intersects them to
/// produce the four region corners, then calls [`update_corners`]. Ported
/// from `dmtxRegionUpdateXfrms`.
pub fn update_xfrms(reg: &mut Region, x_max: f64, y_max: f64, square_devn: f64) -> bool {
    let ray_from = |loc: Vector2, angle: i32| -> Ray2 {
        let radians = angle as f64 * std::f64::consts::PI / HOUGH_RES as f64;
        let mut v = Vector2::new(radians.cos(), radians.sin());
        v.norm();
        Ray2 { p: loc, v }
    };

    let r_left = ray_from(reg.left_loc, reg.left_angle);
    let r_bottom = ray_from(reg.bottom_loc, reg.bottom_angle);

    let r_top = match reg.top_loc {
        Some(loc) => ray_from(loc, reg.top_angle),
        None => ray_from(reg.loc_t, reg.bottom_angle),
    };
    let r_right = match reg.right_loc {
        Some(loc) => ray_from(loc, reg.right_angle),
        None => ray_from(reg.loc_r, reg.left_angle),
    };

    let p00 = match vector2::ray2_intersect(&r_left, &r_bottom) {
        Some(p) => p,
        None => return false,
    };
    let p10 = match vector2::ray2_intersect(&r_bottom, &r_right) {
        Some(p) => p,
        None => return false,
    };
    let p11 = match vector2::ray2_intersect(&r_right, &r_top) {
        Some(p) => p,
        None => return false,
    };
    let p01 = match vector2::ray2_intersect(&r_top, &r_left) {
        Some(p) => p,
        None => return false,
    };

    update_corners(reg, p00, p10, p11, p01, x_max, y_max, square_devn)
}

pub(crate) fn read_module_color(img: &dyn DecodeImage, reg: &Region, symbol_row: i32, symbol_col: i32, size_idx: SizeIdx, plane: usize) -> i32 {
    const SAMPLE_X: [f64; 5] = [0.5, 0.4, 0.5, 0.6, 0.5];
    const SAMPLE_Y: [f64; 5] = [0.5, 0.5, 0.4, 0.5, 0.6];

    let attrs = symbol::attributes(size_idx);
    let symbol_rows = attrs.symbol_rows as f64;
    let symbol_cols = attrs.symbol_cols as f64;

    let mut color_sum = 0i32;
    for i in 0..5 {
        let p = Vector2::new(
            (1.0 / symbol_cols) * (symbol_col as f64 + SAMPLE_X[i]),
            (1.0 / symbol_rows) * (symbol_row as f64 + SAMPLE_Y[i]),
        );
        let p = matrix3::v_multiply(&p, &reg.fit_to_raw).unwrap_or(p);
        color_sum += img.pixel_value((p.x + 0.5) as i32, (p.y + 0.5) as i32, plane).unwrap_or(0);
    }

    color_sum / 5
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Direction {
    Right,
    Up,
}

fn count_jump_tally(img: &dyn DecodeImage, reg: &Region, size_idx: SizeIdx, plane: usize, x_start: i32, y_start: i32, dir: Direction) -> i32 {
    let attrs = symbol::attributes(size_idx);
    let (x_inc, y_inc) = if dir == Direction::Right { (1, 0) } else { (0, 1) };

    let mut module_on = x_start != -1 && x_start != attrs.symbol_cols && y_start != -1 && y_start != attrs.symbol_rows;

    let dark_on_light = reg.off_color > reg.on_color;
    let jump_threshold = (0.4 * (reg.on_color - reg.off_color) as f64 + 0.5).abs() as i32;

    let color = read_module_color(img, reg, y_start, x_start, size_idx, plane);
    let mut t_module = if dark_on_light { reg.off_color - color } else { color - reg.off_color };

    let mut jump_count = 0;
    let mut x = x_start + x_inc;
    let mut y = y_start + y_inc;
    while (dir == Direction::Right && x < attrs.symbol_cols) || (dir == Direction::Up && y < attrs.symbol_rows) {
        let t_prev = t_module;
        let color = read_module_color(img, reg, y, x, size_idx, plane);
        t_module = if dark_on_light { reg.off_color - color } else { color - reg.off_color };

        if !module_on {
            if t_module > t_prev + jump_threshold {
                jump_count += 1;
                module_on = true;
            }
        } else if t_module < t_prev - jump_threshold {
            jump_count += 1;
            module_on = false;
        }

        x += x_inc;
        y += y_inc;
    }

    jump_count
}

/// Tests each candidate size (filtered by `request`) for calibration-bar
/// contrast, keeps the highest-contrast candidate, then verifies it via
/// jump tallies on the calibration/finder bars and surrounding quiet zone.
pub fn find_size(img: &dyn DecodeImage, reg: &mut Region, request: SizeRequest, plane: usize) -> bool {
    let (beg, end) = match request {
        SizeRequest::Specific(idx) => (idx, idx + 1),
        SizeRequest::AutoSquare => (0, 24),
        SizeRequest::AutoRect => (24, symbol::SYMBOL_COUNT),
        SizeRequest::AutoAny => (0, symbol::SYMBOL_COUNT),
    };

    let mut best: Option<(SizeIdx, i32, i32, i32)> = None;

    for size_idx in beg..end {
        let attrs = symbol::attributes(size_idx);
        let (symbol_rows, symbol_cols) = (attrs.symbol_rows, attrs.symbol_cols);

        let mut color_on_avg = 0i32;
        let mut color_off_avg = 0i32;

        let row = symbol_rows - 1;
        for col in 0..symbol_cols {
            let color = read_module_color(img, reg, row, col, size_idx, plane);
            if col & 1 != 0 {
                color_off_avg += color;
            } else {
                color_on_avg += color;
            }
        }

        let col = symbol_cols - 1;
        for row in 0..symbol_rows {
            let color = read_module_color(img, reg, row, col, size_idx, plane);
            if row & 1 != 0 {
                color_off_avg += color;
            } else {
                color_on_avg += color;
            }
        }

        let denom = symbol_rows + symbol_cols;
        let color_on_avg = (color_on_avg * 2) / denom;
        let color_off_avg = (color_off_avg * 2) / denom;
        let contrast = (color_on_avg - color_off_avg).abs();

        if contrast < 20 {
            continue;
        }
        if best.map(|(_, _, _, c)| contrast > c).unwrap_or(true) {
            best = Some((size_idx, color_on_avg, color_off_avg, contrast));
        }
    }

    let (size_idx, on_avg, off_avg, contrast) = match best {
        Some(b) => b,
        None => return false,
    };
    if contrast < 20 {
        return false;
    }

    reg.size_idx = Some(size_idx);
    reg.on_color = on_avg;
    reg.off_color = off_avg;

    let attrs = symbol::attributes(size_idx);

    let jump = count_jump_tally(img, reg, size_idx, plane, 0, attrs.symbol_rows - 1, Direction::Right);
    if (1 + jump - attrs.symbol_cols).abs() > 2 {
        return false;
    }
    let jump = count_jump_tally(img, reg, size_idx, plane, attrs.symbol_cols - 1, 0, Direction::Up);
    if (1 + jump - attrs.symbol_rows).abs() > 2 {
        return false;
    }
    let jump = count_jump_tally(img, reg, size_idx, plane, 0, 0, Direction::Right);
    if !(0..=2).contains(&jump) {
        return false;
    }
    let jump = count_jump_tally(img, reg, size_idx, plane, 0, 0, Direction::Up);
    if !(0..=2).contains(&jump) {
        return false;
    }
    let jump = count_jump_tally(img, reg, size_idx, plane, 0, -1, Direction::Right);
    if !(0..=2).contains(&jump) {
        return false;
    }
    let jump = count_jump_tally(img, reg, size_idx, plane, -1, 0, Direction::Up);
    if !(0..=2).contains(&jump) {
        return false;
    }
    let jump = count_jump_tally(img, reg, size_idx, plane, 0, attrs.symbol_rows, Direction::Right);
    if !(0..=2).contains(&jump) {
        return false;
    }
    let jump = count_jump_tally(img, reg, size_idx, plane, attrs.symbol_cols, 0, Direction::Up);
    if !(0..=2).contains(&jump) {
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SolidImage {
        w: i32,
        h: i32,
    }

    impl DecodeImage for SolidImage {
        fn width(&self) -> i32 {
            self.w
        }
        fn height(&self) -> i32 {
            self.h
        }
        fn channel_count(&self) -> usize {
            1
        }
        fn pixel_value(&self, x: i32, y: i32, _plane: usize) -> Option<i32> {
            if x < 0 || y < 0 || x >= self.w || y >= self.h {
                None
            } else {
                Some(if (x + y) % 2 == 0 { 255 } else { 0 })
            }
        }
    }

    #[test]
    fn seek_edge_returns_none_on_blank_image() {
        let img = SolidImage { w: 50, h: 50 };
        let visited = |_: i32, _: i32| false;
        // A checkerboard has strong local flow everywhere but no closure
        // around any single seed location in general; just confirm this
        // doesn't panic and produces a deterministic in/out-of-range result.
        let _ = seek_edge(&img, &visited, PixelLoc { x: 25, y: 25 }, 40.0);
    }

    #[test]
    fn hough_fit_finds_horizontal_line() {
        let points: Vec<PixelLoc> = (0..40).map(|x| PixelLoc { x, y: 10 }).collect();
        let trail = Trail {
            points,
            bound_min: PixelLoc { x: 0, y: 10 },
            bound_max: PixelLoc { x: 39, y: 10 },
        };
        let line = find_best_solid_line(&trail, None);
        // angle 0 or HOUGH_RES/2 both correspond to a horizontal direction
        // depending on sign convention; just check it's near one of them.
        let near_zero = line.angle.min(HOUGH_RES - line.angle) < 5;
        assert!(near_zero, "expected near-horizontal angle, got {}", line.angle);
    }

    #[test]
    fn identity_homography_accepts_unit_square() {
        let mut reg = Region::default();
        let ok = update_corners(
            &mut reg,
            Vector2::new(0.0, 0.0),
            Vector2::new(20.0, 0.0),
            Vector2::new(20.0, 20.0),
            Vector2::new(0.0, 20.0),
            100.0,
            100.0,
            0.0,
        );
        assert!(ok);
    }
}
