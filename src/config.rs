//! Tunable properties for the encoder and decoder, builder-style the way
//! `dmtxEncodeSetProp`/`dmtxDecodeSetProp` exposed them upstream, but as two
//! plain structs with setter methods rather than an opaque property-id enum.

use crate::encode::Scheme;
use crate::symbol::SizeRequest;

/// Which encodation scheme to request. `AutoBest` runs the dynamic-programming
/// optimiser (`encode::encode_auto`) that tries every scheme transition and
/// keeps the shortest resulting codeword count. `AutoFast` names the
/// original's greedy, non-backtracking scheme selector; no distinct fast-path
/// algorithm was available to port (see DESIGN.md), so it currently runs the
/// same optimiser as `AutoBest` rather than guessing at a cheaper heuristic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchemeRequest {
    AutoFast,
    AutoBest,
    Fixed(Scheme),
}

impl Default for SchemeRequest {
    fn default() -> Self {
        SchemeRequest::AutoBest
    }
}

/// Encoder tunables (spec §6.4): which scheme to use, what symbol size to
/// target, the quiet-zone margin and module size used when rendering a
/// bitmap, and an optional FNC1 byte for GS1 framing.
#[derive(Clone, Copy, Debug)]
pub struct EncodeProperties {
    scheme: SchemeRequest,
    size_request: SizeRequest,
    margin_size: u32,
    module_size: u32,
    fnc1: Option<u8>,
}

impl Default for EncodeProperties {
    fn default() -> Self {
        EncodeProperties {
            scheme: SchemeRequest::default(),
            size_request: SizeRequest::AutoSquare,
            margin_size: 10,
            module_size: 5,
            fnc1: None,
        }
    }
}

impl EncodeProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scheme(mut self, scheme: SchemeRequest) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn size_request(mut self, size_request: SizeRequest) -> Self {
        self.size_request = size_request;
        self
    }

    pub fn margin_size(mut self, pixels: u32) -> Self {
        self.margin_size = pixels;
        self
    }

    pub fn module_size(mut self, pixels: u32) -> Self {
        self.module_size = pixels;
        self
    }

    pub fn fnc1(mut self, byte: u8) -> Self {
        self.fnc1 = Some(byte);
        self
    }

    pub fn get_scheme(&self) -> SchemeRequest {
        self.scheme
    }

    pub fn get_size_request(&self) -> SizeRequest {
        self.size_request
    }

    pub fn get_margin_size(&self) -> u32 {
        self.margin_size
    }

    pub fn get_module_size(&self) -> u32 {
        self.module_size
    }

    pub fn get_fnc1(&self) -> Option<u8> {
        self.fnc1
    }
}

/// A region of interest restricting where the decoder searches, in raw
/// pixel coordinates. `None` bounds mean "use the image edge".
#[derive(Clone, Copy, Debug, Default)]
pub struct RoiBox {
    pub x_min: Option<u32>,
    pub x_max: Option<u32>,
    pub y_min: Option<u32>,
    pub y_max: Option<u32>,
}

/// Decoder tunables (spec §6.4): edge-detection thresholds, the expected
/// symbol size (if known in advance), a region of interest, and an integer
/// downsample factor for scanning large images.
#[derive(Clone, Copy, Debug)]
pub struct DecodeProperties {
    edge_min: u32,
    edge_max: u32,
    scan_gap: u32,
    square_devn: f64,
    size_idx_expected: Option<crate::symbol::SizeIdx>,
    edge_thresh: u32,
    roi: RoiBox,
    scale: u32,
}

impl Default for DecodeProperties {
    fn default() -> Self {
        DecodeProperties {
            edge_min: 0,
            edge_max: 0,
            scan_gap: 2,
            square_devn: 50.0_f64.to_radians(),
            size_idx_expected: None,
            edge_thresh: 40,
            roi: RoiBox::default(),
            scale: 1,
        }
    }
}

impl DecodeProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn edge_min(mut self, value: u32) -> Self {
        self.edge_min = value;
        self
    }

    pub fn edge_max(mut self, value: u32) -> Self {
        self.edge_max = value;
        self
    }

    pub fn scan_gap(mut self, value: u32) -> Self {
        self.scan_gap = value;
        self
    }

    pub fn square_devn_radians(mut self, value: f64) -> Self {
        self.square_devn = value;
        self
    }

    pub fn size_idx_expected(mut self, size_idx: crate::symbol::SizeIdx) -> Self {
        self.size_idx_expected = Some(size_idx);
        self
    }

    pub fn edge_thresh(mut self, value: u32) -> Self {
        self.edge_thresh = value;
        self
    }

    pub fn roi(mut self, roi: RoiBox) -> Self {
        self.roi = roi;
        self
    }

    pub fn scale(mut self, factor: u32) -> Self {
        self.scale = factor.max(1);
        self
    }

    pub fn get_edge_min(&self) -> u32 {
        self.edge_min
    }

    pub fn get_edge_max(&self) -> u32 {
        self.edge_max
    }

    pub fn get_scan_gap(&self) -> u32 {
        self.scan_gap
    }

    pub fn get_square_devn_radians(&self) -> f64 {
        self.square_devn
    }

    pub fn get_size_idx_expected(&self) -> Option<crate::symbol::SizeIdx> {
        self.size_idx_expected
    }

    pub fn get_edge_thresh(&self) -> u32 {
        self.edge_thresh
    }

    pub fn get_roi(&self) -> RoiBox {
        self.roi
    }

    pub fn get_scale(&self) -> u32 {
        self.scale
    }

    /// Resolves this decoder's size constraint into the [`SizeRequest`] the
    /// size-calibration step expects.
    pub fn size_request(&self) -> SizeRequest {
        match self.size_idx_expected {
            Some(idx) => SizeRequest::Specific(idx),
            None => SizeRequest::AutoAny,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::SizeRequest;

    #[test]
    fn encode_properties_default_is_auto_best_square() {
        let props = EncodeProperties::new();
        assert_eq!(props.get_scheme(), SchemeRequest::AutoBest);
        assert_eq!(props.get_size_request(), SizeRequest::AutoSquare);
    }

    #[test]
    fn encode_properties_builder_chains() {
        let props = EncodeProperties::new()
            .scheme(SchemeRequest::Fixed(Scheme::C40))
            .module_size(8)
            .margin_size(20)
            .fnc1(0xe8);
        assert_eq!(props.get_scheme(), SchemeRequest::Fixed(Scheme::C40));
        assert_eq!(props.get_module_size(), 8);
        assert_eq!(props.get_margin_size(), 20);
        assert_eq!(props.get_fnc1(), Some(0xe8));
    }

    #[test]
    fn decode_properties_size_request_reflects_expected_size() {
        let free = DecodeProperties::new();
        assert_eq!(free.size_request(), SizeRequest::AutoAny);

        let pinned = DecodeProperties::new().size_idx_expected(5);
        assert_eq!(pinned.size_request(), SizeRequest::Specific(5));
    }

    #[test]
    fn decode_properties_scale_is_never_zero() {
        let props = DecodeProperties::new().scale(0);
        assert_eq!(props.get_scale(), 1);
    }
}
