//! ECC 200 Data Matrix encoding and decoding.
//!
//! [`encode`] turns a byte string into a rendered module bitmap; [`decode`]
//! (and [`Decoder`], for callers who want to install diagnostic callbacks or
//! reuse a deadline across calls) locates a Data Matrix symbol inside a
//! raster image and recovers its payload. The module layout mirrors the
//! pipeline itself: [`encode`] (module) holds the six codeword schemes and
//! the scheme optimiser, [`decode`] (module) holds the region detector and
//! codeword sampler, and [`gf256`]/[`placement`]/[`symbol`] are the shared
//! building blocks both directions consume.

pub mod bitmap;
pub mod callbacks;
pub mod config;
pub mod decode;
pub mod encode;
pub mod error;
pub mod gf256;
pub mod matrix3;
pub mod placement;
pub mod symbol;
pub mod vector2;

use image::GrayImage;

pub use callbacks::DecodeCallbacks;
pub use config::{DecodeProperties, EncodeProperties, RoiBox, SchemeRequest};
pub use decode::{Deadline, DecodedSymbol};
pub use error::{DecodeError, DmtxError};
pub use symbol::{SizeIdx, SizeRequest};

/// Encodes `data` under `props` and renders the result to a grayscale image:
/// `0x00` modules are dark, `0xff` are light, with a `props.margin_size()`
/// module quiet zone and `props.module_size()` pixels per module.
pub fn encode(data: &[u8], props: &EncodeProperties) -> Result<GrayImage, DmtxError> {
    let message = match props.get_scheme() {
        SchemeRequest::Fixed(scheme) => {
            let encoded = encode::encode_single_scheme(data, scheme, props.get_size_request(), props.get_fnc1())
                .ok_or(DmtxError::MessageTooLarge)?;
            encode::EncodedMessage {
                size_idx: encoded.size_idx,
                codewords: encode::add_error_correction(&encoded.codewords, encoded.size_idx),
            }
        }
        SchemeRequest::AutoFast | SchemeRequest::AutoBest => {
            encode::encode_auto(data, props.get_size_request(), props.get_fnc1())?
        }
    };

    let bmp = bitmap::from_codewords(&message.codewords, message.size_idx, placement::MODULE_ON_RGB);
    Ok(bmp.to_image(props.get_module_size(), props.get_margin_size()))
}

/// Adapts a borrowed [`image::GrayImage`] to the [`decode::region::DecodeImage`]
/// interface the detector consumes (spec §6.1). Only the 8bpp grey packing
/// is implemented directly here; other packings are the caller's
/// responsibility to demultiplex into a single grey plane before decoding,
/// per spec §1's framing of pixel-format handling as an external collaborator.
struct GrayImageSource<'a> {
    img: &'a GrayImage,
}

impl<'a> decode::region::DecodeImage for GrayImageSource<'a> {
    fn width(&self) -> i32 {
        self.img.width() as i32
    }

    fn height(&self) -> i32 {
        self.img.height() as i32
    }

    fn channel_count(&self) -> usize {
        1
    }

    fn pixel_value(&self, x: i32, y: i32, _plane: usize) -> Option<i32> {
        if x < 0 || y < 0 || x >= self.width() || y >= self.height() {
            return None;
        }
        Some(self.img.get_pixel(x as u32, y as u32).0[0] as i32)
    }
}

fn roi_to_scan_region(roi: &RoiBox, width: i32, height: i32) -> decode::ScanRegion {
    decode::ScanRegion {
        x_min: roi.x_min.map(|v| v as i32).unwrap_or(0),
        x_max: roi.x_max.map(|v| v as i32).unwrap_or(width - 1),
        y_min: roi.y_min.map(|v| v as i32).unwrap_or(0),
        y_max: roi.y_max.map(|v| v as i32).unwrap_or(height - 1),
    }
}

/// Locates and decodes a single Data Matrix symbol in `img` under `props`,
/// with no callbacks installed and no deadline.
pub fn decode(img: &GrayImage, props: &DecodeProperties) -> Result<DecodedSymbol, DecodeError> {
    Decoder::new().decode(img, props)
}

/// A reusable decode entry point carrying the process-wide-in-spirit but
/// per-call-scoped debug callbacks (spec §5: two decodes on disjoint images
/// are safe as long as they don't share a callback/logging sink; here each
/// `Decoder` owns its own, so that's true by construction).
#[derive(Default)]
pub struct Decoder {
    callbacks: DecodeCallbacks,
}

impl Decoder {
    pub fn new() -> Self {
        Decoder::default()
    }

    pub fn with_callbacks(callbacks: DecodeCallbacks) -> Self {
        Decoder { callbacks }
    }

    /// Locates and decodes a single symbol, honouring `props`'s ROI, scan
    /// gap, scale and expected-size tunables, with no time budget.
    pub fn decode(&self, img: &GrayImage, props: &DecodeProperties) -> Result<DecodedSymbol, DecodeError> {
        self.decode_with_deadline(img, props, Deadline::none())
    }

    /// As [`Decoder::decode`], but gives up and returns
    /// [`DecodeError::RegionNotFound`] once `deadline` passes, per spec §5's
    /// cooperative-cancellation contract (partial work is discarded, not an
    /// error in its own right).
    pub fn decode_with_deadline(
        &self,
        img: &GrayImage,
        props: &DecodeProperties,
        deadline: Deadline,
    ) -> Result<DecodedSymbol, DecodeError> {
        let source = GrayImageSource { img };
        let roi = roi_to_scan_region(&props.get_roi(), source.width(), source.height());
        let smallest_feature = (props.get_scan_gap() as i32 / props.get_scale() as i32).max(1);

        decode::locate_and_decode(
            &source,
            props.size_request(),
            None,
            roi,
            smallest_feature,
            props.get_edge_thresh() as f64,
            deadline,
            &self.callbacks,
        )
    }

    /// As [`Decoder::decode`], but also returns an RGB rendering of `img`
    /// with every edge-trace pixel visited during the search tinted by its
    /// trail-blaze hue. Gated behind the `diagnostics` feature so production
    /// builds never pay for the `plot_point` bookkeeping (spec §5's note
    /// that debug callbacks must compile out to zero overhead when unused).
    #[cfg(feature = "diagnostics")]
    pub fn decode_with_diagnostic_overlay(
        &self,
        img: &GrayImage,
        props: &DecodeProperties,
    ) -> (Result<DecodedSymbol, DecodeError>, image::RgbImage) {
        use std::cell::RefCell;
        use std::rc::Rc;

        let visited: Rc<RefCell<Vec<callbacks::PlottedPoint>>> = Rc::new(RefCell::new(Vec::new()));
        let recorder = visited.clone();
        let diag_callbacks = DecodeCallbacks::new().on_plot_point(move |p| recorder.borrow_mut().push(p));

        let source = GrayImageSource { img };
        let roi = roi_to_scan_region(&props.get_roi(), source.width(), source.height());
        let smallest_feature = (props.get_scan_gap() as i32 / props.get_scale() as i32).max(1);

        let result = decode::locate_and_decode(
            &source,
            props.size_request(),
            None,
            roi,
            smallest_feature,
            props.get_edge_thresh() as f64,
            Deadline::none(),
            &diag_callbacks,
        );

        let mut overlay = image::RgbImage::from_fn(img.width(), img.height(), |x, y| {
            let v = img.get_pixel(x, y).0[0];
            image::Rgb([v, v, v])
        });
        for p in visited.borrow().iter() {
            if p.x >= 0 && p.y >= 0 && (p.x as u32) < overlay.width() && (p.y as u32) < overlay.height() {
                let hue = (p.hue.rem_euclid(1.0) * 255.0) as u8;
                overlay.put_pixel(p.x as u32, p.y as u32, image::Rgb([255, 255 - hue, hue]));
            }
        }

        (result, overlay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DecodeProperties, EncodeProperties};

    #[test]
    fn encode_then_decode_round_trips_ascii_payload() {
        let props = EncodeProperties::new().module_size(4).margin_size(2);
        let img = encode(b"libdmtx", &props).unwrap();

        let decoded = decode(&img, &DecodeProperties::new()).unwrap();
        assert_eq!(decoded.data, b"libdmtx");
    }

    #[test]
    fn encode_then_decode_round_trips_forced_c40_scheme() {
        let props = EncodeProperties::new()
            .scheme(SchemeRequest::Fixed(encode::Scheme::C40))
            .module_size(4)
            .margin_size(2);
        let img = encode(b"ABCDEF123456", &props).unwrap();

        let decoded = decode(&img, &DecodeProperties::new()).unwrap();
        assert_eq!(decoded.data, b"ABCDEF123456");
    }

    #[test]
    fn decode_reports_region_not_found_on_a_blank_image() {
        let blank = GrayImage::from_pixel(64, 64, image::Luma([255u8]));
        let result = decode(&blank, &DecodeProperties::new());
        assert!(result.is_err());
    }

    #[test]
    fn roi_restricted_to_a_blank_corner_misses_a_symbol_placed_elsewhere() {
        let props = EncodeProperties::new().module_size(4).margin_size(2);
        let img = encode(b"HELLO", &props).unwrap();

        let mut canvas = GrayImage::from_pixel(img.width() * 3, img.height() * 3, image::Luma([255u8]));
        image::imageops::overlay(&mut canvas, &img, img.width(), img.height());

        let roi = RoiBox {
            x_min: Some(0),
            x_max: Some(img.width() - 1),
            y_min: Some(0),
            y_max: Some(img.height() - 1),
        };
        let decoded = decode(&canvas, &DecodeProperties::new().roi(roi));
        assert!(decoded.is_err());

        let found = decode(&canvas, &DecodeProperties::new());
        assert_eq!(found.unwrap().data, b"HELLO");
    }
}
