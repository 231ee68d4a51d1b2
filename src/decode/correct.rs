//! Bridges a freshly-sampled codeword stream (data codewords followed by
//! error codewords, per [`crate::encode::add_error_correction`]'s layout) to
//! per-block Reed-Solomon correction, returning the corrected data codewords
//! in their original (pre-interleave) order.

use crate::gf256::{self, RsError};
use crate::symbol::{attributes, SizeIdx};

/// Splits a sampled codeword stream into its `interleaved_blocks` RS blocks
/// (each `block_data_words + block_error_words` long), corrects each block,
/// and reassembles the corrected data codewords.
pub fn correct_and_extract_data(codewords: &[u8], size_idx: SizeIdx) -> Result<Vec<u8>, RsError> {
    let attrs = attributes(size_idx);
    let blocks = attrs.interleaved_blocks as usize;
    let block_error_words = attrs.block_error_words as usize;
    let block_max_correctable = attrs.block_max_correctable as usize;

    if blocks == 1 {
        let mut block = codewords.to_vec();
        gf256::rs_correct_block(&mut block, block_error_words, block_max_correctable)?;
        let data_len = block.len() - block_error_words;
        return Ok(block[..data_len].to_vec());
    }

    let data_len = attrs.symbol_data_words as usize;
    let (data_codewords, error_codewords) = codewords.split_at(data_len);
    let data_blocks = gf256::deinterleave(data_codewords, blocks, 0);
    let error_blocks = gf256::deinterleave(error_codewords, blocks, 0);

    let mut corrected_data_blocks = Vec::with_capacity(blocks);
    for (mut data_block, error_block) in data_blocks.into_iter().zip(error_blocks.into_iter()) {
        let block_data_len = data_block.len();
        data_block.extend(error_block);
        gf256::rs_correct_block(&mut data_block, block_error_words, block_max_correctable)?;
        data_block.truncate(block_data_len);
        corrected_data_blocks.push(data_block);
    }

    Ok(gf256::interleave(&corrected_data_blocks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::add_error_correction;

    #[test]
    fn corrects_single_block_with_no_errors() {
        let size_idx = 0;
        let attrs = attributes(size_idx);
        let data: Vec<u8> = (0..attrs.symbol_data_words).map(|i| i as u8).collect();
        let full = add_error_correction(&data, size_idx);

        let corrected = correct_and_extract_data(&full, size_idx).unwrap();
        assert_eq!(corrected, data);
    }

    #[test]
    fn corrects_single_block_with_one_flipped_byte() {
        let size_idx = 0;
        let attrs = attributes(size_idx);
        let data: Vec<u8> = (0..attrs.symbol_data_words).map(|i| i as u8).collect();
        let mut full = add_error_correction(&data, size_idx);
        full[1] ^= 0xFF;

        let corrected = correct_and_extract_data(&full, size_idx).unwrap();
        assert_eq!(corrected, data);
    }

    #[test]
    fn corrects_multi_block_symbol_with_one_error_per_block() {
        // size_idx 14 (52x52) has 2 interleaved blocks.
        let size_idx = 14;
        let attrs = attributes(size_idx);
        let data: Vec<u8> = (0..attrs.symbol_data_words).map(|i| (i * 7) as u8).collect();
        let mut full = add_error_correction(&data, size_idx);
        full[0] ^= 0x55;
        full[1] ^= 0xAA;

        let corrected = correct_and_extract_data(&full, size_idx).unwrap();
        assert_eq!(corrected, data);
    }
}
