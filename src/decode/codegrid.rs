//! Bridges the region detector's module-colour sampling to the placement
//! walk: samples every mapping-matrix cell's colour through `reg.fit_to_raw`,
//! builds an already-`MODULE_ASSIGNED` [`MappingMatrix`], then replays the
//! same diagonal walk [`crate::placement`] uses for encoding to read the
//! codeword stream back out. Ported in spirit from how `dmtxdecode.c`
//! combines `readModuleColor` with `ModulePlacementEcc200` in decode mode
//! (the defining translation unit was not retrieved, so the glue here is a
//! reconstruction from `dmtxregion.c`'s sampling primitives plus
//! `dmtxplacemod.c`'s shared walk).

use crate::decode::region::{read_module_color, DecodeImage, Region};
use crate::placement::{self, MappingMatrix, MODULE_ON_RED};
use crate::symbol::{self, SizeIdx};

/// Samples every interior mapping-matrix cell from the image and marks it
/// `MODULE_ASSIGNED`, so that [`placement::read_codewords`] run over the
/// result replays the placement walk in its decode direction.
pub fn sample_mapping_matrix(img: &dyn DecodeImage, reg: &Region, size_idx: SizeIdx, plane: usize) -> MappingMatrix {
    let attrs = symbol::attributes(size_idx);
    let mut matrix = MappingMatrix::new(attrs.mapping_rows(), attrs.mapping_cols());

    let midpoint = (reg.on_color + reg.off_color) / 2;
    let dark_on_light = reg.off_color > reg.on_color;

    for row in 0..matrix.rows {
        for col in 0..matrix.cols {
            let (symbol_row, symbol_col) = symbol::mapping_to_symbol(row, col, size_idx);
            let color = read_module_color(img, reg, symbol_row, symbol_col, size_idx, plane);
            let on = if dark_on_light { color < midpoint } else { color > midpoint };
            matrix.set_sampled(row, col, on);
        }
    }

    matrix
}

/// Samples the mapping matrix and reads back the full codeword stream
/// (data + error words) for `size_idx`.
pub fn decode_codewords(img: &dyn DecodeImage, reg: &Region, size_idx: SizeIdx, plane: usize) -> Vec<u8> {
    let attrs = symbol::attributes(size_idx);
    let mut matrix = sample_mapping_matrix(img, reg, size_idx, plane);
    let count = (attrs.symbol_data_words + attrs.symbol_error_words) as usize;
    placement::read_codewords(&mut matrix, count, MODULE_ON_RED)
}

/// Synthetic `DecodeImage` builders shared by this module's tests and by
/// `decode::detect`'s tests, which exercise the pipeline stages downstream
/// of a fitted [`Region`] without running the real edge/Hough search.
#[cfg(test)]
pub(crate) mod test_support {
    use crate::decode::region::{DecodeImage, Region};
    use crate::matrix3;
    use crate::placement::{place_codewords, MODULE_ON_RGB};
    use crate::symbol::{self, attributes, SizeIdx};

    /// A synthetic `DecodeImage` that renders a symbol bitmap's modules as
    /// uniform 255/0 blocks at a fixed module pixel size, no quiet zone.
    pub(crate) struct RenderedSymbol {
        size_idx: SizeIdx,
        module_px: i32,
        on_grid: Vec<bool>,
    }

    impl RenderedSymbol {
        pub(crate) fn from_codewords(codewords: &[u8], size_idx: SizeIdx, module_px: i32) -> Self {
            let attrs = attributes(size_idx);
            let matrix = place_codewords(codewords, size_idx, MODULE_ON_RGB);
            let mut on_grid = vec![false; (attrs.symbol_rows * attrs.symbol_cols) as usize];

            for row in 0..matrix.rows {
                for col in 0..matrix.cols {
                    let (sr, sc) = symbol::mapping_to_symbol(row, col, size_idx);
                    let on = matrix.get(row, col) & MODULE_ON_RGB != 0;
                    on_grid[(sr * attrs.symbol_cols + sc) as usize] = on;
                }
            }
            // Stamp a solid bottom/left border and a simple alternating top/right
            // calibration track so `find_size`-style sampling sees real contrast,
            // matching the bottom-left L / top-right calibration bars of an
            // actual symbol closely enough for unit-level module sampling tests.
            for c in 0..attrs.symbol_cols {
                on_grid[(0 * attrs.symbol_cols + c) as usize] = true;
                on_grid[((attrs.symbol_rows - 1) * attrs.symbol_cols + c) as usize] = c % 2 == 0;
            }
            for r in 0..attrs.symbol_rows {
                on_grid[(r * attrs.symbol_cols + 0) as usize] = true;
                on_grid[(r * attrs.symbol_cols + (attrs.symbol_cols - 1)) as usize] = r % 2 == 0;
            }

            RenderedSymbol { size_idx, module_px, on_grid }
        }
    }

    impl DecodeImage for RenderedSymbol {
        fn width(&self) -> i32 {
            attributes(self.size_idx).symbol_cols * self.module_px
        }
        fn height(&self) -> i32 {
            attributes(self.size_idx).symbol_rows * self.module_px
        }
        fn channel_count(&self) -> usize {
            1
        }
        fn pixel_value(&self, x: i32, y: i32, _plane: usize) -> Option<i32> {
            if x < 0 || y < 0 || x >= self.width() || y >= self.height() {
                return None;
            }
            // Image y grows downward; symbol row 0 is the bottom row.
            let attrs = attributes(self.size_idx);
            let col = x / self.module_px;
            let row = attrs.symbol_rows - 1 - (y / self.module_px);
            let on = self.on_grid[(row * attrs.symbol_cols + col) as usize];
            Some(if on { 0 } else { 255 })
        }
    }

    /// A `Region` whose `fit_to_raw` is the exact inverse of `RenderedSymbol`'s
    /// rendering, bypassing the edge/Hough search entirely.
    pub(crate) fn identity_region(size_idx: SizeIdx, module_px: i32) -> Region {
        let attrs = attributes(size_idx);
        let mut reg = Region::default();
        reg.on_color = 0;
        reg.off_color = 255;
        reg.size_idx = Some(size_idx);
        // fit_to_raw maps unit-square fit coordinates to raw pixel coordinates,
        // with fit y=0 at the bottom (module row 0) the same way `reg.loc_r`
        // et al. are defined in raw/fit space elsewhere in this crate.
        let w = (attrs.symbol_cols * module_px) as f64;
        let h = (attrs.symbol_rows * module_px) as f64;
        // fit (u, v) -> raw (u*w, h - v*h): raster y grows downward while
        // fit v=0 is the bottom row, so v must flip before scaling to pixels.
        reg.fit_to_raw = matrix3::multiply(&matrix3::scale(w, -h), &matrix3::translate(0.0, h));
        reg
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{identity_region, RenderedSymbol};
    use super::*;

    #[test]
    fn decode_codewords_round_trips_identity_stream() {
        let size_idx = 0; // 10x10
        let attrs = symbol::attributes(size_idx);
        let total = (attrs.symbol_data_words + attrs.symbol_error_words) as usize;
        let identity: Vec<u8> = (0..total).map(|i| (i % 256) as u8).collect();

        let module_px = 4;
        let img = RenderedSymbol::from_codewords(&identity, size_idx, module_px);
        let reg = identity_region(size_idx, module_px);

        let decoded = decode_codewords(&img, &reg, size_idx, 0);
        assert_eq!(decoded, identity);
    }
}
