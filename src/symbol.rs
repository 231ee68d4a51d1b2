//! Static per-size metadata for the 30 ECC 200 symbol sizes.
//!
//! Values come from the ECC 200 standard (ISO/IEC 16022 Annex), not from any
//! particular implementation; they are reproduced here as a lookup table the
//! way `dmtxsymbol.c` tabulated them upstream.

use lazy_static::lazy_static;

/// Identifies one of the 30 standard ECC 200 sizes, square or rectangular.
pub type SizeIdx = usize;

pub const SYMBOL_COUNT: usize = 30;

/// Request passed to [`find_symbol_size`] describing which shapes are acceptable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SizeRequest {
    Specific(SizeIdx),
    AutoSquare,
    AutoRect,
    AutoAny,
}

#[derive(Clone, Copy, Debug)]
pub struct SymbolAttributes {
    pub symbol_rows: i32,
    pub symbol_cols: i32,
    pub data_region_rows: i32,
    pub data_region_cols: i32,
    pub horiz_data_regions: i32,
    pub vert_data_regions: i32,
    pub interleaved_blocks: i32,
    pub block_error_words: i32,
    pub block_max_correctable: i32,
    pub symbol_data_words: i32,
    pub symbol_error_words: i32,
}

impl SymbolAttributes {
    pub fn mapping_rows(&self) -> i32 {
        self.symbol_rows - 2 * self.vert_data_regions
    }

    pub fn mapping_cols(&self) -> i32 {
        self.symbol_cols - 2 * self.horiz_data_regions
    }

    pub fn is_square(&self) -> bool {
        self.symbol_rows == self.symbol_cols
    }
}

macro_rules! attr {
    ($sr:expr, $sc:expr, $drr:expr, $drc:expr, $hr:expr, $vr:expr, $blocks:expr, $be:expr, $bm:expr, $dw:expr, $ew:expr) => {
        SymbolAttributes {
            symbol_rows: $sr,
            symbol_cols: $sc,
            data_region_rows: $drr,
            data_region_cols: $drc,
            horiz_data_regions: $hr,
            vert_data_regions: $vr,
            interleaved_blocks: $blocks,
            block_error_words: $be,
            block_max_correctable: $bm,
            symbol_data_words: $dw,
            symbol_error_words: $ew,
        }
    };
}

lazy_static! {
    /// Index order matches the ECC 200 standard's enumeration: the 24 square
    /// sizes (ascending) followed by the 6 rectangular sizes (ascending).
    /// Equal-capacity ties in size selection resolve by this order.
    pub static ref SYMBOL_ATTRIBUTES: [SymbolAttributes; SYMBOL_COUNT] = [
        attr!(10, 10, 8, 8, 1, 1, 1, 5, 2, 3, 5),
        attr!(12, 12, 10, 10, 1, 1, 1, 7, 3, 5, 7),
        attr!(14, 14, 12, 12, 1, 1, 1, 10, 5, 8, 10),
        attr!(16, 16, 14, 14, 1, 1, 1, 12, 6, 12, 12),
        attr!(18, 18, 16, 16, 1, 1, 1, 14, 7, 18, 14),
        attr!(20, 20, 18, 18, 1, 1, 1, 18, 9, 22, 18),
        attr!(22, 22, 20, 20, 1, 1, 1, 20, 10, 30, 20),
        attr!(24, 24, 22, 22, 1, 1, 1, 24, 12, 36, 24),
        attr!(26, 26, 24, 24, 1, 1, 1, 28, 14, 44, 28),
        attr!(32, 32, 14, 14, 2, 2, 1, 36, 18, 62, 36),
        attr!(36, 36, 16, 16, 2, 2, 1, 42, 21, 86, 42),
        attr!(40, 40, 18, 18, 2, 2, 1, 48, 24, 114, 48),
        attr!(44, 44, 20, 20, 2, 2, 1, 56, 28, 144, 56),
        attr!(48, 48, 22, 22, 2, 2, 1, 68, 34, 174, 68),
        attr!(52, 52, 24, 24, 2, 2, 2, 42, 21, 204, 84),
        attr!(64, 64, 14, 14, 4, 4, 2, 56, 28, 280, 112),
        attr!(72, 72, 16, 16, 4, 4, 4, 36, 18, 368, 144),
        attr!(80, 80, 18, 18, 4, 4, 4, 48, 24, 456, 192),
        attr!(88, 88, 20, 20, 4, 4, 4, 56, 28, 576, 224),
        attr!(96, 96, 22, 22, 4, 4, 4, 68, 34, 696, 272),
        attr!(104, 104, 24, 24, 4, 4, 6, 56, 28, 816, 336),
        attr!(120, 120, 18, 18, 6, 6, 6, 68, 34, 1050, 408),
        attr!(132, 132, 20, 20, 6, 6, 8, 62, 31, 1304, 496),
        attr!(144, 144, 22, 22, 6, 6, 10, 62, 31, 1558, 620),
        attr!(8, 18, 6, 16, 1, 1, 1, 7, 3, 5, 7),
        attr!(8, 32, 6, 14, 1, 2, 1, 11, 5, 10, 11),
        attr!(12, 26, 10, 24, 1, 1, 1, 14, 7, 16, 14),
        attr!(12, 36, 10, 16, 1, 2, 1, 18, 9, 22, 18),
        attr!(16, 36, 14, 16, 1, 2, 1, 24, 12, 32, 24),
        attr!(16, 48, 14, 22, 1, 2, 1, 28, 14, 49, 28),
    ];
}

/// Converts a mapping-matrix cell (interior data coordinates) to its
/// position in the full symbol grid, inserting the 1-cell finder/timing
/// border that surrounds every `data_region_rows x data_region_cols` block.
/// Each block occupies `data_region_size + 2` symbol cells per axis, with
/// the data interior offset by one from the block's start.
pub fn mapping_to_symbol(row: i32, col: i32, size_idx: SizeIdx) -> (i32, i32) {
    let attrs = attributes(size_idx);
    let row_period = attrs.data_region_rows + 2;
    let col_period = attrs.data_region_cols + 2;
    let symbol_row = (row / attrs.data_region_rows) * row_period + 1 + (row % attrs.data_region_rows);
    let symbol_col = (col / attrs.data_region_cols) * col_period + 1 + (col % attrs.data_region_cols);
    (symbol_row, symbol_col)
}

pub fn attributes(size_idx: SizeIdx) -> &'static SymbolAttributes {
    &SYMBOL_ATTRIBUTES[size_idx]
}

/// Smallest size whose `symbol_data_words >= codeword_count` and whose shape
/// matches `request`, tie-broken by the fixed enumeration order above.
pub fn find_symbol_size(codeword_count: i32, request: SizeRequest) -> Option<SizeIdx> {
    if let SizeRequest::Specific(idx) = request {
        let attr = attributes(idx);
        return if attr.symbol_data_words >= codeword_count {
            Some(idx)
        } else {
            None
        };
    }

    SYMBOL_ATTRIBUTES
        .iter()
        .enumerate()
        .filter(|(_, attr)| attr.symbol_data_words >= codeword_count)
        .filter(|(_, attr)| match request {
            SizeRequest::AutoSquare => attr.is_square(),
            SizeRequest::AutoRect => !attr.is_square(),
            SizeRequest::AutoAny => true,
            SizeRequest::Specific(_) => unreachable!(),
        })
        .min_by_key(|(_, attr)| attr.symbol_data_words)
        .map(|(idx, _)| idx)
}

/// Remaining unused data codewords once `used` codewords have been written,
/// for the given size.
pub fn remaining_symbol_capacity(used: i32, size_idx: SizeIdx) -> i32 {
    attributes(size_idx).symbol_data_words - used
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_to_symbol_inserts_single_block_border() {
        // 10x10: one data region, mapping (0,0) sits just inside the border.
        assert_eq!(mapping_to_symbol(0, 0, 0), (1, 1));
        assert_eq!(mapping_to_symbol(7, 7, 0), (8, 8));
    }

    #[test]
    fn mapping_to_symbol_skips_interior_region_borders() {
        // 32x32: two vertical/horizontal regions of 14x14 data each.
        assert_eq!(mapping_to_symbol(0, 0, 9), (1, 1));
        assert_eq!(mapping_to_symbol(13, 13, 9), (14, 14));
        assert_eq!(mapping_to_symbol(14, 14, 9), (17, 17));
        assert_eq!(mapping_to_symbol(27, 27, 9), (30, 30));
    }

    #[test]
    fn mapping_dims_match_standard_for_smallest_square() {
        let a = attributes(0);
        assert_eq!(a.mapping_rows(), 8);
        assert_eq!(a.mapping_cols(), 8);
    }

    #[test]
    fn mapping_dims_account_for_multiple_regions() {
        // 32x32 has 2x2 regions of 14x14 data area each.
        let a = attributes(9);
        assert_eq!(a.mapping_rows(), 28);
        assert_eq!(a.mapping_cols(), 28);
    }

    #[test]
    fn find_symbol_size_picks_smallest_fitting_square() {
        assert_eq!(find_symbol_size(3, SizeRequest::AutoSquare), Some(0));
        assert_eq!(find_symbol_size(4, SizeRequest::AutoSquare), Some(1));
    }

    #[test]
    fn find_symbol_size_respects_shape_request() {
        // 5 data words fits both 10x10 (square, idx 0) and 8x18 (rect, idx 24).
        assert_eq!(find_symbol_size(5, SizeRequest::AutoSquare), Some(0));
        assert_eq!(find_symbol_size(5, SizeRequest::AutoRect), Some(24));
    }

    #[test]
    fn find_symbol_size_none_when_too_large() {
        assert_eq!(find_symbol_size(10_000, SizeRequest::AutoAny), None);
    }

    #[test]
    fn every_size_has_consistent_block_word_totals() {
        for attr in SYMBOL_ATTRIBUTES.iter() {
            let total_error = attr.interleaved_blocks * attr.block_error_words;
            assert_eq!(total_error, attr.symbol_error_words);
        }
    }
}
