//! Renders a placed [`MappingMatrix`] into the full ECC 200 symbol grid
//! (finder border + clock track stamped around every data region block, data
//! modules copied in from the mapping matrix) and from there into a raster
//! image with quiet zone and per-module pixel scaling.
//!
//! Grounded on `dmtxplacemod.c`'s block geometry (used here through
//! [`symbol::mapping_to_symbol`]) and on the solid/dashed border convention
//! `dmtxregion.c::matrixRegionFindSize` checks for on decode (solid finder
//! bar along each block's bottom row and left column, dashed clock track
//! along its top row and right column); the teacher's `serialization.rs`
//! stamps its own finder/timing patterns the same way, module by module,
//! onto a `GrayImage` canvas with `image::imageops::overlay`.

use image::{GrayImage, Luma};

use crate::placement::MappingMatrix;
use crate::symbol::{self, SizeIdx};

const ON: Luma<u8> = Luma([0u8]);
const OFF: Luma<u8> = Luma([255u8]);

/// A fully-stamped ECC 200 symbol grid: finder/timing border plus data
/// modules, `symbol_rows * symbol_cols` in size, row 0 at the bottom.
pub struct SymbolBitmap {
    pub size_idx: SizeIdx,
    pub rows: i32,
    pub cols: i32,
    on_grid: Vec<bool>,
}

impl SymbolBitmap {
    fn new(size_idx: SizeIdx) -> Self {
        let attrs = symbol::attributes(size_idx);
        SymbolBitmap {
            size_idx,
            rows: attrs.symbol_rows,
            cols: attrs.symbol_cols,
            on_grid: vec![false; (attrs.symbol_rows * attrs.symbol_cols) as usize],
        }
    }

    fn idx(&self, row: i32, col: i32) -> usize {
        (row * self.cols + col) as usize
    }

    pub fn get(&self, row: i32, col: i32) -> bool {
        self.on_grid[self.idx(row, col)]
    }

    fn set(&mut self, row: i32, col: i32, on: bool) {
        let i = self.idx(row, col);
        self.on_grid[i] = on;
    }

    /// Stamps the solid finder bar (bottom row + left column of every data
    /// region block) and the dashed clock track (top row + right column),
    /// matching the parity `countJumpTally` expects on decode.
    fn stamp_border(&mut self) {
        let attrs = symbol::attributes(self.size_idx);
        let row_period = attrs.data_region_rows + 2;
        let col_period = attrs.data_region_cols + 2;

        for br in 0..attrs.vert_data_regions {
            for bc in 0..attrs.horiz_data_regions {
                let base_row = br * row_period;
                let base_col = bc * col_period;

                for c in 0..col_period {
                    self.set(base_row, base_col + c, true);
                    let dashed = c % 2 == 0;
                    self.set(base_row + row_period - 1, base_col + c, dashed);
                }
                for r in 0..row_period {
                    self.set(base_row + r, base_col, true);
                    let dashed = r % 2 == 0;
                    self.set(base_row + r, base_col + col_period - 1, dashed);
                }
            }
        }
    }

    /// Renders to a grayscale image with a `quiet_zone` modules wide margin
    /// of white on every side, each module drawn as a `module_px` square.
    pub fn to_image(&self, module_px: u32, quiet_zone: u32) -> GrayImage {
        let side_modules = (self.cols as u32 + 2 * quiet_zone, self.rows as u32 + 2 * quiet_zone);
        let width = side_modules.0 * module_px;
        let height = side_modules.1 * module_px;

        GrayImage::from_fn(width, height, |x, y| {
            let mod_col = x / module_px;
            let mod_row_from_top = y / module_px;

            if mod_col < quiet_zone
                || mod_row_from_top < quiet_zone
                || mod_col >= quiet_zone + self.cols as u32
                || mod_row_from_top >= quiet_zone + self.rows as u32
            {
                return OFF;
            }

            let col = (mod_col - quiet_zone) as i32;
            // image y grows downward; symbol row 0 is the bottom row.
            let row = self.rows - 1 - (mod_row_from_top - quiet_zone) as i32;
            if self.get(row, col) {
                ON
            } else {
                OFF
            }
        })
    }
}

/// Stamps a single already-placed mapping matrix (one color plane) into a
/// full symbol bitmap.
pub fn from_mapping_matrix(matrix: &MappingMatrix, size_idx: SizeIdx, on_mask: u8) -> SymbolBitmap {
    let mut bmp = SymbolBitmap::new(size_idx);
    bmp.stamp_border();

    for row in 0..matrix.rows {
        for col in 0..matrix.cols {
            let (sr, sc) = symbol::mapping_to_symbol(row, col, size_idx);
            let on = matrix.get(row, col) & on_mask != 0;
            bmp.set(sr, sc, on);
        }
    }

    bmp
}

/// Places `codewords` and renders the result straight to a symbol bitmap.
pub fn from_codewords(codewords: &[u8], size_idx: SizeIdx, on_mask: u8) -> SymbolBitmap {
    let matrix = crate::placement::place_codewords(codewords, size_idx, on_mask);
    from_mapping_matrix(&matrix, size_idx, on_mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::MODULE_ON_RGB;

    #[test]
    fn border_is_solid_on_bottom_and_left_dashed_on_top_and_right() {
        let matrix = MappingMatrix::new(symbol::attributes(0).mapping_rows(), symbol::attributes(0).mapping_cols());
        let bmp = from_mapping_matrix(&matrix, 0, MODULE_ON_RGB);

        for c in 0..bmp.cols {
            assert!(bmp.get(0, c), "bottom finder bar must be solid dark at col {}", c);
        }
        for r in 0..bmp.rows {
            assert!(bmp.get(r, 0), "left finder bar must be solid dark at row {}", r);
        }
        assert!(bmp.get(bmp.rows - 1, 1), "dashed top bar starts dark");
        assert!(!bmp.get(bmp.rows - 1, 2), "dashed top bar alternates");
    }

    #[test]
    fn to_image_applies_quiet_zone_margin() {
        let matrix = MappingMatrix::new(symbol::attributes(0).mapping_rows(), symbol::attributes(0).mapping_cols());
        let bmp = from_mapping_matrix(&matrix, 0, MODULE_ON_RGB);
        let img = bmp.to_image(2, 4);

        assert_eq!(img.dimensions(), ((bmp.cols as u32 + 8) * 2, (bmp.rows as u32 + 8) * 2));
        // top-left corner sits in the quiet zone and must be white.
        assert_eq!(img.get_pixel(0, 0), &OFF);
    }

    #[test]
    fn multi_region_symbol_borders_every_block() {
        // 32x32 has a 2x2 grid of data-region blocks, each with its own border.
        let size_idx = 9;
        let matrix = MappingMatrix::new(symbol::attributes(size_idx).mapping_rows(), symbol::attributes(size_idx).mapping_cols());
        let bmp = from_mapping_matrix(&matrix, size_idx, MODULE_ON_RGB);

        let attrs = symbol::attributes(size_idx);
        let row_period = attrs.data_region_rows + 2;
        // second block's bottom finder bar starts at row_period, not just row 0.
        for c in 0..attrs.data_region_cols + 2 {
            assert!(bmp.get(row_period, c));
        }
    }
}
