//! The encoding pipeline: six codeword-generating schemes, the stream type
//! they share, and the dynamic-programming optimiser that picks the best mix.

pub mod ascii;
pub mod base256;
pub mod c40text;
pub mod edifact;
pub mod optimize;
pub mod stream;

pub use stream::{EncodeStatus, EncodeStream, Scheme, UnlatchKind};

use crate::error::DmtxError;
use crate::gf256::rs_encode_block;
use crate::symbol::{attributes, find_symbol_size, SizeIdx, SizeRequest};

/// Performs a scheme transition: writes whatever latch/unlatch codeword the
/// move requires, then updates `current_scheme` and resets the chain
/// counters. Reconstructed from the `encodeChangeScheme` signature in
/// `dmtxstatic.h` (the defining translation unit was not retrieved).
pub fn encode_change_scheme(stream: &mut EncodeStream, target: Scheme, unlatch: UnlatchKind) {
    if stream.current_scheme == target {
        return;
    }

    match stream.current_scheme {
        Scheme::Ascii => {
            let latch = match target {
                Scheme::C40 => ascii::LATCH_C40,
                Scheme::Text => ascii::LATCH_TEXT,
                Scheme::X12 => ascii::LATCH_X12,
                Scheme::Edifact => ascii::LATCH_EDIFACT,
                Scheme::Base256 => ascii::LATCH_BASE256,
                Scheme::Ascii => unreachable!(),
            };
            stream.output_chain_append(latch);
            if !stream.is_alive() {
                return;
            }
            stream.current_scheme = target;
            stream.reset_chain();
        }
        Scheme::C40 | Scheme::Text | Scheme::X12 => {
            debug_assert_eq!(target, Scheme::Ascii);
            if unlatch == UnlatchKind::Explicit {
                stream.output_chain_append(c40text::UNLATCH_VALUE);
                if !stream.is_alive() {
                    return;
                }
            }
            stream.current_scheme = Scheme::Ascii;
            stream.reset_chain();
        }
        Scheme::Edifact => {
            debug_assert_eq!(target, Scheme::Ascii);
            if unlatch == UnlatchKind::Explicit {
                edifact::append_value_edifact(stream, edifact::UNLATCH_VALUE);
                if !stream.is_alive() {
                    return;
                }
            }
            stream.current_scheme = Scheme::Ascii;
            stream.reset_chain();
        }
        Scheme::Base256 => {
            debug_assert_eq!(target, Scheme::Ascii);
            // The chain's length header already reflects exactly how many
            // bytes were written; no codeword marks the exit.
            stream.current_scheme = Scheme::Ascii;
            stream.reset_chain();
        }
    }
}

/// Result of a full encode attempt: the padded data codewords for `size_idx`
/// plus interleaved Reed-Solomon error codewords appended per block.
pub struct EncodedMessage {
    pub size_idx: SizeIdx,
    pub codewords: Vec<u8>,
}

/// Forces the entire input through a single scheme (used by test harnesses
/// and callers who set an explicit `scheme` property instead of `auto`).
pub fn encode_single_scheme(input: &[u8], scheme: Scheme, size_request: SizeRequest, fnc1: Option<u8>) -> Option<EncodedMessage> {
    let mut stream = EncodeStream::new(input.to_vec(), fnc1);

    if scheme != Scheme::Ascii {
        encode_change_scheme(&mut stream, scheme, UnlatchKind::Implicit);
        if !stream.is_alive() {
            return None;
        }
    }

    while stream.input_has_next() && stream.is_alive() {
        match scheme {
            Scheme::Ascii => ascii::encode_next_chunk_ascii(&mut stream, ascii::AsciiOption::Normal),
            Scheme::C40 => c40text::encode_next_chunk_ctx(&mut stream, c40text::CtxMode::C40),
            Scheme::Text => c40text::encode_next_chunk_ctx(&mut stream, c40text::CtxMode::Text),
            Scheme::X12 => c40text::encode_next_chunk_ctx(&mut stream, c40text::CtxMode::X12),
            Scheme::Edifact => edifact::encode_next_chunk_edifact(&mut stream),
            Scheme::Base256 => base256::encode_next_chunk_base256(&mut stream),
        }
        if !stream.is_alive() {
            break;
        }
        match scheme {
            Scheme::Ascii => ascii::complete_if_done_ascii(&mut stream, size_request),
            Scheme::C40 => c40text::complete_if_done_ctx(&mut stream, c40text::CtxMode::C40, size_request),
            Scheme::Text => c40text::complete_if_done_ctx(&mut stream, c40text::CtxMode::Text, size_request),
            Scheme::X12 => c40text::complete_if_done_ctx(&mut stream, c40text::CtxMode::X12, size_request),
            Scheme::Edifact => complete_if_done_edifact_wrapper(&mut stream, size_request),
            Scheme::Base256 => base256::complete_if_done_base256(&mut stream, size_request),
        }
    }

    if !stream.input_has_next() && stream.status != EncodeStatus::Complete {
        match scheme {
            Scheme::Ascii => ascii::complete_if_done_ascii(&mut stream, size_request),
            Scheme::C40 => c40text::complete_if_done_ctx(&mut stream, c40text::CtxMode::C40, size_request),
            Scheme::Text => c40text::complete_if_done_ctx(&mut stream, c40text::CtxMode::Text, size_request),
            Scheme::X12 => c40text::complete_if_done_ctx(&mut stream, c40text::CtxMode::X12, size_request),
            Scheme::Edifact => complete_if_done_edifact_wrapper(&mut stream, size_request),
            Scheme::Base256 => base256::complete_if_done_base256(&mut stream, size_request),
        }
    }

    if stream.status == EncodeStatus::Complete {
        Some(EncodedMessage {
            size_idx: stream.size_idx.unwrap(),
            codewords: stream.output,
        })
    } else {
        None
    }
}

fn complete_if_done_edifact_wrapper(stream: &mut EncodeStream, size_request: SizeRequest) {
    edifact::complete_if_done_edifact(stream, size_request);
}

/// Runs the optimiser across all six schemes and appends Reed-Solomon error
/// codewords (with block interleaving) to the winning data codeword stream.
pub fn encode_auto(input: &[u8], size_request: SizeRequest, fnc1: Option<u8>) -> Result<EncodedMessage, DmtxError> {
    let (codewords, size_idx) = optimize::encode_optimize_best(input, size_request, fnc1)
        .ok_or(DmtxError::MessageTooLarge)?;
    Ok(EncodedMessage {
        size_idx,
        codewords: add_error_correction(&codewords, size_idx),
    })
}

/// Appends RS error codewords to a complete, padded data codeword stream.
pub fn add_error_correction(data_codewords: &[u8], size_idx: SizeIdx) -> Vec<u8> {
    let attrs = attributes(size_idx);
    let blocks = attrs.interleaved_blocks as usize;
    let block_error_words = attrs.block_error_words as usize;

    if blocks == 1 {
        return rs_encode_block(data_codewords, block_error_words);
    }

    let data_blocks = crate::gf256::deinterleave(data_codewords, blocks, block_error_words);
    let encoded_blocks: Vec<Vec<u8>> = data_blocks
        .iter()
        .map(|block| rs_encode_block(block, block_error_words))
        .collect();

    let data_part = crate::gf256::interleave(
        &encoded_blocks
            .iter()
            .map(|b| b[..b.len() - block_error_words].to_vec())
            .collect::<Vec<_>>(),
    );
    let error_part = crate::gf256::interleave(
        &encoded_blocks
            .iter()
            .map(|b| b[b.len() - block_error_words..].to_vec())
            .collect::<Vec<_>>(),
    );

    let mut out = data_part;
    out.extend(error_part);
    out
}

/// Finds the smallest symbol size that fits `n` data codewords.
pub fn size_for_length(n: usize, request: SizeRequest) -> Option<SizeIdx> {
    find_symbol_size(n as i32, request)
}

/// Encodes three independent messages for `DmtxFormatMosaic`: each message is
/// optimised on its own, then the largest of the three required sizes is
/// picked as the shared size and all three are re-encoded against it, so
/// [`crate::placement::place_codewords_mosaic`] can place them onto one
/// mapping matrix.
pub fn encode_mosaic(inputs: [&[u8]; 3], size_request: SizeRequest, fnc1: Option<u8>) -> Result<(SizeIdx, [Vec<u8>; 3]), DmtxError> {
    let mut shared_idx: Option<SizeIdx> = None;
    for input in &inputs {
        let (_, size_idx) = optimize::encode_optimize_best(input, size_request, fnc1).ok_or(DmtxError::MessageTooLarge)?;
        shared_idx = Some(match shared_idx {
            None => size_idx,
            Some(current) => {
                if attributes(size_idx).symbol_data_words > attributes(current).symbol_data_words {
                    size_idx
                } else {
                    current
                }
            }
        });
    }
    let shared_idx = shared_idx.unwrap();

    let mut out: [Vec<u8>; 3] = [Vec::new(), Vec::new(), Vec::new()];
    for (i, input) in inputs.iter().enumerate() {
        let (codewords, size_idx) =
            optimize::encode_optimize_best(input, SizeRequest::Specific(shared_idx), fnc1).ok_or(DmtxError::MessageTooLarge)?;
        debug_assert_eq!(size_idx, shared_idx);
        out[i] = add_error_correction(&codewords, size_idx);
    }

    Ok((shared_idx, out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_encode_roundtrip_size_matches_ascii() {
        let result = encode_auto(b"30Q324343430794<OQQ", SizeRequest::AutoSquare, None).unwrap();
        assert!(result.codewords.len() > 0);
        let attrs = attributes(result.size_idx);
        assert_eq!(
            result.codewords.len() as i32,
            attrs.symbol_data_words + attrs.symbol_error_words
        );
    }

    #[test]
    fn encode_single_scheme_ascii_matches_optimizer_for_plain_text() {
        let forced = encode_single_scheme(b"HELLO", Scheme::Ascii, SizeRequest::AutoSquare, None).unwrap();
        assert!(forced.codewords.len() > 0);
    }

    #[test]
    fn encode_mosaic_shares_one_size_across_three_messages() {
        let (size_idx, planes) = encode_mosaic([b"A", b"HELLO WORLD", b"12"], SizeRequest::AutoSquare, None).unwrap();
        let attrs = attributes(size_idx);
        for plane in &planes {
            assert_eq!(plane.len() as i32, attrs.symbol_data_words + attrs.symbol_error_words);
        }
    }
}
