//! ECC 200 module placement: the diagonal walk that maps a codeword stream
//! onto the interior mapping-matrix cells, including the four irregular
//! corner patterns. Ported from `dmtxplacemod.c` (`ModulePlacementEcc200`
//! and friends); this same walk runs in reverse to decode.

use crate::symbol::{attributes, SizeIdx};

pub const MODULE_ON_RED: u8 = 1 << 0;
pub const MODULE_ON_GREEN: u8 = 1 << 1;
pub const MODULE_ON_BLUE: u8 = 1 << 2;
pub const MODULE_ON_RGB: u8 = MODULE_ON_RED | MODULE_ON_GREEN | MODULE_ON_BLUE;
pub const MODULE_DATA: u8 = 1 << 3;
pub const MODULE_ASSIGNED: u8 = 1 << 4;
pub const MODULE_VISITED: u8 = 1 << 5;

/// The mapping-matrix cell grid, row-major, `mapping_rows * mapping_cols` in size.
#[derive(Clone, Debug)]
pub struct MappingMatrix {
    pub rows: i32,
    pub cols: i32,
    pub cells: Vec<u8>,
}

impl MappingMatrix {
    pub fn new(rows: i32, cols: i32) -> Self {
        MappingMatrix {
            rows,
            cols,
            cells: vec![0u8; (rows * cols) as usize],
        }
    }

    fn idx(&self, row: i32, col: i32) -> usize {
        (row * self.cols + col) as usize
    }

    pub fn get(&self, row: i32, col: i32) -> u8 {
        self.cells[self.idx(row, col)]
    }

    fn get_mut(&mut self, row: i32, col: i32) -> &mut u8 {
        let i = self.idx(row, col);
        &mut self.cells[i]
    }

    /// Marks a cell as already sampled from an image during decode: carries
    /// `MODULE_ASSIGNED` so [`place_module`] reads it instead of writing, and
    /// `MODULE_ON_RED` when the sampled module was dark.
    pub fn set_sampled(&mut self, row: i32, col: i32, on: bool) {
        let cell = self.get_mut(row, col);
        *cell |= MODULE_ASSIGNED;
        if on {
            *cell |= MODULE_ON_RED;
        }
    }
}

/// Places `codewords` onto a fresh mapping matrix for `size_idx` and returns it.
pub fn place_codewords(codewords: &[u8], size_idx: SizeIdx, on_color: u8) -> MappingMatrix {
    let attrs = attributes(size_idx);
    let mut matrix = MappingMatrix::new(attrs.mapping_rows(), attrs.mapping_cols());
    let mut encode_buf = codewords.to_vec();
    walk(&mut matrix, &mut encode_buf, on_color, true);
    matrix
}

/// Reads codewords back out of an already-assigned mapping matrix (decode path).
pub fn read_codewords(matrix: &mut MappingMatrix, codeword_count: usize, on_color: u8) -> Vec<u8> {
    let mut buf = vec![0u8; codeword_count.max(1)];
    walk(matrix, &mut buf, on_color, false);
    buf.truncate(codeword_count);
    buf
}

/// Places three independent codeword streams into one mapping matrix using
/// the red/green/blue `ON` planes, so a single finder pattern carries three
/// overlaid monochrome messages (`DmtxFormatMosaic` in the original).
/// All three streams must already be sized (padded + error-corrected) for
/// `size_idx`.
pub fn place_codewords_mosaic(red: &[u8], green: &[u8], blue: &[u8], size_idx: SizeIdx) -> MappingMatrix {
    let attrs = attributes(size_idx);
    let mut combined = MappingMatrix::new(attrs.mapping_rows(), attrs.mapping_cols());

    for (codewords, color) in [(red, MODULE_ON_RED), (green, MODULE_ON_GREEN), (blue, MODULE_ON_BLUE)] {
        let mut plane = MappingMatrix::new(attrs.mapping_rows(), attrs.mapping_cols());
        let mut buf = codewords.to_vec();
        walk(&mut plane, &mut buf, color, true);
        for (c, p) in combined.cells.iter_mut().zip(plane.cells.iter()) {
            *c |= p & (MODULE_ON_RGB | MODULE_DATA);
        }
    }

    combined
}

/// Shared encode/decode walk. `encoding` selects whether `PlaceModule` reads
/// from or writes into `codewords[chr]`; `PlaceModule` itself auto-detects
/// based on whether the target cell already carries `MODULE_ASSIGNED`, but we
/// track `encoding` here too so callers can size `codewords` up front.
fn walk(matrix: &mut MappingMatrix, codewords: &mut [u8], on_color: u8, encoding: bool) {
    let mapping_rows = matrix.rows;
    let mapping_cols = matrix.cols;

    let mut chr = 0usize;
    let mut row = 4;
    let mut col = 0;

    loop {
        if row == mapping_rows && col == 0 {
            pattern_shape_special_1(matrix, &mut codewords[chr], on_color);
            chr += 1;
        } else if row == mapping_rows - 2 && col == 0 && mapping_cols % 4 != 0 {
            pattern_shape_special_2(matrix, &mut codewords[chr], on_color);
            chr += 1;
        } else if row == mapping_rows - 2 && col == 0 && mapping_cols % 8 == 4 {
            pattern_shape_special_3(matrix, &mut codewords[chr], on_color);
            chr += 1;
        } else if row == mapping_rows + 4 && col == 2 && mapping_cols % 8 == 0 {
            pattern_shape_special_4(matrix, &mut codewords[chr], on_color);
            chr += 1;
        }

        loop {
            if row < mapping_rows && col >= 0 && matrix.get(row, col) & MODULE_VISITED == 0 {
                pattern_shape_standard(matrix, row, col, &mut codewords[chr], on_color);
                chr += 1;
            }
            row -= 2;
            col += 2;
            if !(row >= 0 && col < mapping_cols) {
                break;
            }
        }
        row += 1;
        col += 3;

        loop {
            if row >= 0 && col < mapping_cols && matrix.get(row, col) & MODULE_VISITED == 0 {
                pattern_shape_standard(matrix, row, col, &mut codewords[chr], on_color);
                chr += 1;
            }
            row += 2;
            col -= 2;
            if !(row < mapping_rows && col >= 0) {
                break;
            }
        }
        row += 3;
        col += 1;

        if !(row < mapping_rows || col < mapping_cols) {
            break;
        }
    }

    if matrix.get(mapping_rows - 1, mapping_cols - 1) & MODULE_VISITED == 0 {
        *matrix.get_mut(mapping_rows - 1, mapping_cols - 1) |= on_color;
        *matrix.get_mut(mapping_rows - 2, mapping_cols - 2) |= on_color;
    }

    let _ = encoding;
}

const BIT1: u8 = 1 << 7;
const BIT2: u8 = 1 << 6;
const BIT3: u8 = 1 << 5;
const BIT4: u8 = 1 << 4;
const BIT5: u8 = 1 << 3;
const BIT6: u8 = 1 << 2;
const BIT7: u8 = 1 << 1;
const BIT8: u8 = 1 << 0;

fn place_module(matrix: &mut MappingMatrix, row: i32, col: i32, codeword: &mut u8, mask: u8, on_color: u8) {
    let mapping_rows = matrix.rows;
    let mapping_cols = matrix.cols;

    let (mut row, mut col) = (row, col);
    if row < 0 {
        row += mapping_rows;
        col += 4 - ((mapping_rows + 4) % 8);
    }
    if col < 0 {
        col += mapping_cols;
        row += 4 - ((mapping_cols + 4) % 8);
    }

    let cell = matrix.get(row, col);
    if cell & MODULE_ASSIGNED != 0 {
        if cell & on_color != 0 {
            *codeword |= mask;
        } else {
            *codeword &= !mask;
        }
    } else {
        if *codeword & mask != 0 {
            *matrix.get_mut(row, col) |= on_color;
        }
        *matrix.get_mut(row, col) |= MODULE_ASSIGNED;
    }

    *matrix.get_mut(row, col) |= MODULE_VISITED;
}

fn pattern_shape_standard(matrix: &mut MappingMatrix, row: i32, col: i32, codeword: &mut u8, on_color: u8) {
    place_module(matrix, row - 2, col - 2, codeword, BIT1, on_color);
    place_module(matrix, row - 2, col - 1, codeword, BIT2, on_color);
    place_module(matrix, row - 1, col - 2, codeword, BIT3, on_color);
    place_module(matrix, row - 1, col - 1, codeword, BIT4, on_color);
    place_module(matrix, row - 1, col, codeword, BIT5, on_color);
    place_module(matrix, row, col - 2, codeword, BIT6, on_color);
    place_module(matrix, row, col - 1, codeword, BIT7, on_color);
    place_module(matrix, row, col, codeword, BIT8, on_color);
}

fn pattern_shape_special_1(matrix: &mut MappingMatrix, codeword: &mut u8, on_color: u8) {
    let (mr, mc) = (matrix.rows, matrix.cols);
    place_module(matrix, mr - 1, 0, codeword, BIT1, on_color);
    place_module(matrix, mr - 1, 1, codeword, BIT2, on_color);
    place_module(matrix, mr - 1, 2, codeword, BIT3, on_color);
    place_module(matrix, 0, mc - 2, codeword, BIT4, on_color);
    place_module(matrix, 0, mc - 1, codeword, BIT5, on_color);
    place_module(matrix, 1, mc - 1, codeword, BIT6, on_color);
    place_module(matrix, 2, mc - 1, codeword, BIT7, on_color);
    place_module(matrix, 3, mc - 1, codeword, BIT8, on_color);
}

fn pattern_shape_special_2(matrix: &mut MappingMatrix, codeword: &mut u8, on_color: u8) {
    let (mr, mc) = (matrix.rows, matrix.cols);
    place_module(matrix, mr - 3, 0, codeword, BIT1, on_color);
    place_module(matrix, mr - 2, 0, codeword, BIT2, on_color);
    place_module(matrix, mr - 1, 0, codeword, BIT3, on_color);
    place_module(matrix, 0, mc - 4, codeword, BIT4, on_color);
    place_module(matrix, 0, mc - 3, codeword, BIT5, on_color);
    place_module(matrix, 0, mc - 2, codeword, BIT6, on_color);
    place_module(matrix, 0, mc - 1, codeword, BIT7, on_color);
    place_module(matrix, 1, mc - 1, codeword, BIT8, on_color);
}

fn pattern_shape_special_3(matrix: &mut MappingMatrix, codeword: &mut u8, on_color: u8) {
    let (mr, mc) = (matrix.rows, matrix.cols);
    place_module(matrix, mr - 3, 0, codeword, BIT1, on_color);
    place_module(matrix, mr - 2, 0, codeword, BIT2, on_color);
    place_module(matrix, mr - 1, 0, codeword, BIT3, on_color);
    place_module(matrix, 0, mc - 2, codeword, BIT4, on_color);
    place_module(matrix, 0, mc - 1, codeword, BIT5, on_color);
    place_module(matrix, 1, mc - 1, codeword, BIT6, on_color);
    place_module(matrix, 2, mc - 1, codeword, BIT7, on_color);
    place_module(matrix, 3, mc - 1, codeword, BIT8, on_color);
}

fn pattern_shape_special_4(matrix: &mut MappingMatrix, codeword: &mut u8, on_color: u8) {
    let (mr, mc) = (matrix.rows, matrix.cols);
    place_module(matrix, mr - 1, 0, codeword, BIT1, on_color);
    place_module(matrix, mr - 1, mc - 1, codeword, BIT2, on_color);
    place_module(matrix, 0, mc - 3, codeword, BIT3, on_color);
    place_module(matrix, 0, mc - 2, codeword, BIT4, on_color);
    place_module(matrix, 0, mc - 1, codeword, BIT5, on_color);
    place_module(matrix, 1, mc - 3, codeword, BIT6, on_color);
    place_module(matrix, 1, mc - 2, codeword, BIT7, on_color);
    place_module(matrix, 1, mc - 1, codeword, BIT8, on_color);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placement_is_a_bijection_for_every_size() {
        for size_idx in 0..crate::symbol::SYMBOL_COUNT {
            let attrs = attributes(size_idx);
            let cell_count = attrs.symbol_data_words + attrs.symbol_error_words;
            let identity: Vec<u8> = (0..cell_count).map(|i| (i % 256) as u8).collect();

            let mut matrix = place_codewords(&identity, size_idx, MODULE_ON_RGB);
            let readback = read_codewords(&mut matrix, identity.len(), MODULE_ON_RGB);

            assert_eq!(readback, identity, "size_idx {} failed round-trip", size_idx);
        }
    }

    #[test]
    fn every_non_corner_cell_ends_up_assigned() {
        let size_idx = 0;
        let attrs = attributes(size_idx);
        let cell_count = (attrs.symbol_data_words + attrs.symbol_error_words) as usize;
        let identity: Vec<u8> = (0..cell_count).map(|i| (i % 256) as u8).collect();
        let matrix = place_codewords(&identity, size_idx, MODULE_ON_RGB);

        let unassigned = matrix.cells.iter().filter(|&&c| c & MODULE_ASSIGNED == 0).count();
        // Only the two fixed bottom-right cells are filled without MODULE_ASSIGNED.
        assert!(unassigned <= 2);
    }
}
