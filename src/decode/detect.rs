//! Top-level decode orchestration: scans an image for a Data Matrix region,
//! fits its two strongest edges, determines orientation and homography,
//! calibrates symbol size, samples codewords, corrects errors, and inverts
//! the encodation scheme back to bytes.
//!
//! Ported in spirit from `dmtxdecode.c`'s `dmtxRegionFindNext` loop. The
//! original additionally re-fits `top`/`right` edges against a second,
//! gapped trail blaze along the calibration bars
//! (`matrixRegionAlignCalibEdge`) before calling `UpdateXfrms`; that source
//! was not retrieved, and spec.md's Open Question 3 explicitly sanctions
//! relying on `update_xfrms`'s existing loc_t/loc_r fallback (reusing the
//! coarse corner estimate as the missing edge's anchor) instead, so this
//! loop calls `update_xfrms` directly with `top_loc`/`right_loc` left unset.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::callbacks::DecodeCallbacks;
use crate::decode::codegrid;
use crate::decode::correct::correct_and_extract_data;
use crate::decode::region::{self, DecodeImage, PixelLoc as RegionLoc};
use crate::decode::scangrid::ScanGrid;
use crate::decode::scheme::decode_data_stream;
use crate::error::DecodeError;
use crate::symbol::{self, SizeRequest};

/// An optional wall-clock budget for the region search loop. `None` means no
/// limit, matching the original decoder's default of scanning to exhaustion.
#[derive(Clone, Copy, Debug)]
pub struct Deadline(pub Option<Instant>);

impl Deadline {
    pub fn none() -> Self {
        Deadline(None)
    }

    pub fn after(duration: Duration) -> Self {
        Deadline(Some(Instant::now() + duration))
    }

    fn expired(&self) -> bool {
        matches!(self.0, Some(t) if Instant::now() >= t)
    }
}

/// A region-of-interest restricting the scan grid to a sub-rectangle of the
/// image, in raw pixel coordinates (inclusive bounds).
#[derive(Clone, Copy, Debug)]
pub struct ScanRegion {
    pub x_min: i32,
    pub x_max: i32,
    pub y_min: i32,
    pub y_max: i32,
}

impl ScanRegion {
    pub fn full_image(img: &dyn DecodeImage) -> Self {
        ScanRegion {
            x_min: 0,
            x_max: img.width() - 1,
            y_min: 0,
            y_max: img.height() - 1,
        }
    }
}

/// One decoded symbol: its payload bytes plus the size it was read at.
pub struct DecodedSymbol {
    pub size_idx: symbol::SizeIdx,
    pub data: Vec<u8>,
}

/// Scans `img` for a decodable region and returns the first symbol found,
/// honouring `roi`'s bounds and `deadline`'s time budget. `smallest_feature`
/// is the scan grid's finest cross arm length in raw pixels (the caller
/// divides its `scanGap` property by any image `scale` factor before
/// passing it in here, per spec §4.6). `edge_thresh` is the minimum
/// point-flow magnitude (in the original's un-scaled units; `seek_edge`
/// applies the `*7.65` conversion) a seed pixel must clear.
pub fn locate_and_decode(
    img: &dyn DecodeImage,
    size_request: SizeRequest,
    fnc1: Option<u8>,
    roi: ScanRegion,
    smallest_feature: i32,
    edge_thresh: f64,
    deadline: Deadline,
    callbacks: &DecodeCallbacks,
) -> Result<DecodedSymbol, DecodeError> {
    if roi.x_max <= roi.x_min || roi.y_max <= roi.y_min {
        return Err(DecodeError::RegionNotFound);
    }

    let mut grid = ScanGrid::new(roi.x_min, roi.x_max, roi.y_min, roi.y_max, smallest_feature.max(1));
    let mut visited: HashSet<(i32, i32)> = HashSet::new();
    let max_diagonal = (roi.x_max - roi.x_min).max(roi.y_max - roi.y_min);

    while let Some(loc) = grid.pop_location() {
        if deadline.expired() {
            return Err(DecodeError::RegionNotFound);
        }

        if visited.contains(&(loc.x, loc.y)) {
            continue;
        }

        let visited_fn = |x: i32, y: i32| visited.contains(&(x, y));
        let seed = match region::seek_edge(img, &visited_fn, RegionLoc { x: loc.x, y: loc.y }, edge_thresh) {
            Some(s) => s,
            None => {
                visited.insert((loc.x, loc.y));
                continue;
            }
        };

        let trail = region::trail_blaze(img, seed, Some(max_diagonal));
        for (i, p) in trail.points.iter().enumerate() {
            visited.insert((p.x, p.y));
            callbacks.notify_plot_point(crate::callbacks::PlottedPoint {
                x: p.x,
                y: p.y,
                hue: (i as f32) / (trail.points.len().max(1) as f32),
                pane: 0,
                display: seed.plane as i32,
            });
        }
        if trail.points.len() < 10 {
            continue;
        }

        let line1 = region::find_best_solid_line(&trail, None);
        if !region::line_is_acceptable(&line1) {
            continue;
        }
        let line2 = region::find_best_solid_line(&trail, Some(line1.angle));
        if !region::line_is_acceptable(&line2) {
            continue;
        }

        let mut reg = region::assign_orientation(&line1, &line2);
        let x_max = (img.width() - 1) as f64;
        let y_max = (img.height() - 1) as f64;
        if !region::update_xfrms(&mut reg, x_max, y_max, 0.2) {
            continue;
        }
        callbacks.notify_build_matrix_region(&reg);
        callbacks.notify_build_matrix(&reg.fit_to_raw);

        if let Ok(symbol) = decode_fitted_region(img, &reg, size_request, seed.plane, fnc1) {
            callbacks.notify_final(&reg);
            return Ok(symbol);
        }
    }

    Err(DecodeError::RegionNotFound)
}

/// The part of the pipeline downstream of a fitted homography: size
/// calibration, codeword sampling, Reed-Solomon correction, and scheme
/// inversion. Split out from [`locate_and_decode`] so it can be exercised
/// directly against a region built without running the edge/Hough search.
pub fn decode_fitted_region(
    img: &dyn DecodeImage,
    reg: &region::Region,
    size_request: SizeRequest,
    plane: usize,
    fnc1: Option<u8>,
) -> Result<DecodedSymbol, DecodeError> {
    let mut reg = reg.clone();
    if !region::find_size(img, &mut reg, size_request, plane) {
        return Err(DecodeError::SizeNotFound);
    }
    let size_idx = reg.size_idx.unwrap();

    let codewords = codegrid::decode_codewords(img, &reg, size_idx, plane);
    let data_codewords =
        correct_and_extract_data(&codewords, size_idx).map_err(|_| DecodeError::ReedSolomonUncorrectable)?;

    let bytes = decode_data_stream(&data_codewords, data_codewords.len(), fnc1)?;
    Ok(DecodedSymbol { size_idx, data: bytes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::codegrid::test_support::{identity_region, RenderedSymbol};
    use crate::encode::{add_error_correction, encode_single_scheme, Scheme};
    use crate::symbol::SizeRequest;

    /// Exercises size calibration, codeword sampling, RS correction, and
    /// scheme inversion against a region fitted by construction rather than
    /// by the real edge/Hough search, the same way `codegrid`'s own test
    /// isolates the sampling stage from region detection.
    #[test]
    fn decode_fitted_region_round_trips_ascii_message() {
        let encoded = encode_single_scheme(b"HELLO", Scheme::Ascii, SizeRequest::AutoSquare, None).unwrap();
        let full = add_error_correction(&encoded.codewords, encoded.size_idx);

        let module_px = 4;
        let img = RenderedSymbol::from_codewords(&full, encoded.size_idx, module_px);
        let reg = identity_region(encoded.size_idx, module_px);

        let result = decode_fitted_region(&img, &reg, SizeRequest::Specific(encoded.size_idx), 0, None).unwrap();
        assert_eq!(result.data, b"HELLO");
        assert_eq!(result.size_idx, encoded.size_idx);
    }

    #[test]
    fn locate_and_decode_fails_closed_on_a_blank_roi() {
        struct Blank;
        impl DecodeImage for Blank {
            fn width(&self) -> i32 {
                60
            }
            fn height(&self) -> i32 {
                60
            }
            fn channel_count(&self) -> usize {
                1
            }
            fn pixel_value(&self, _x: i32, _y: i32, _plane: usize) -> Option<i32> {
                Some(255)
            }
        }

        let img = Blank;
        let roi = ScanRegion::full_image(&img);
        let result = locate_and_decode(
            &img,
            SizeRequest::AutoSquare,
            None,
            roi,
            8,
            40.0,
            Deadline::none(),
            &DecodeCallbacks::new(),
        );
        assert!(result.is_err());
    }
}
