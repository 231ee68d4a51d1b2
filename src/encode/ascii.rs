//! ASCII encodation scheme. Default scheme; also the landing scheme every
//! latch/unlatch transition passes through. Ported from `dmtxencodeascii.c`.

use super::stream::{randomize_253_state, pad_remaining_in_ascii, EncodeStream, Scheme};
use crate::error::DmtxError;
use crate::symbol::{find_symbol_size, SizeRequest};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AsciiOption {
    /// Opportunistically pairs two consecutive digits into one codeword.
    Normal,
    /// Must pair digits; marks the stream invalid if it can't.
    Compact,
    /// Never pairs digits, even when both are present.
    Full,
}

const VALUE_UPPER_SHIFT: u8 = 235;
const VALUE_PAD: u8 = 129;

pub const LATCH_C40: u8 = 230;
pub const LATCH_BASE256: u8 = 231;
pub const LATCH_X12: u8 = 238;
pub const LATCH_TEXT: u8 = 239;
pub const LATCH_EDIFACT: u8 = 240;

fn is_digit(b: u8) -> bool {
    b.is_ascii_digit()
}

pub fn append_value_ascii(stream: &mut EncodeStream, value: u8) {
    check_scheme(stream, Scheme::Ascii);
    if !stream.is_alive() {
        return;
    }
    stream.output_chain_append(value);
    stream.output_chain_value_count += 1;
}

fn check_scheme(stream: &mut EncodeStream, expected: Scheme) {
    if stream.current_scheme != expected {
        stream.mark_fatal(DmtxError::UnexpectedScheme);
    }
}

/// Consumes one input chunk (one or two bytes under `Normal`/`Compact`) and
/// appends the resulting ASCII codeword(s).
pub fn encode_next_chunk_ascii(stream: &mut EncodeStream, option: AsciiOption) {
    if !stream.input_has_next() {
        return;
    }

    let v0 = stream.input_advance_next();
    if !stream.is_alive() {
        return;
    }

    let mut v1 = 0u8;
    let mut compact_digits = false;

    match option {
        AsciiOption::Normal | AsciiOption::Compact if stream.input_has_next() => {
            v1 = stream.input_peek_next();
            if !stream.is_alive() {
                return;
            }
            if let Some(fnc1) = stream.fnc1 {
                if v1 == fnc1 {
                    v1 = 0;
                    compact_digits = false;
                } else {
                    compact_digits = is_digit(v0) && is_digit(v1);
                }
            } else {
                compact_digits = is_digit(v0) && is_digit(v1);
            }
        }
        _ => {
            v1 = 0;
            compact_digits = false;
        }
    }

    if compact_digits {
        stream.input_advance_next();
        if !stream.is_alive() {
            return;
        }
        append_value_ascii(stream, 10 * (v0 - b'0') + (v1 - b'0') + 130);
    } else if option == AsciiOption::Compact {
        stream.mark_invalid(DmtxError::CantCompactNonDigits);
    } else if let Some(fnc1) = stream.fnc1 {
        if v0 == fnc1 {
            append_value_ascii(stream, crate::encode::stream::AsciiSentinel::Fnc1.codeword());
        } else if v0 < 128 {
            append_value_ascii(stream, v0 + 1);
        } else {
            append_value_ascii(stream, VALUE_UPPER_SHIFT);
            if stream.is_alive() {
                append_value_ascii(stream, v0 - 127);
            }
        }
    } else if v0 < 128 {
        append_value_ascii(stream, v0 + 1);
    } else {
        append_value_ascii(stream, VALUE_UPPER_SHIFT);
        if stream.is_alive() {
            append_value_ascii(stream, v0 - 127);
        }
    }
}

pub fn complete_if_done_ascii(stream: &mut EncodeStream, size_request: SizeRequest) {
    use super::stream::EncodeStatus;
    if stream.status == EncodeStatus::Complete {
        return;
    }
    if !stream.input_has_next() {
        match find_symbol_size(stream.output.len() as i32, size_request) {
            Some(size_idx) => {
                pad_remaining_in_ascii(stream, size_idx);
            }
            None => stream.mark_invalid(DmtxError::MessageTooLarge),
        }
    }
}

/// Encodes the stream's remaining input as a standalone ASCII copy into a
/// fresh buffer, used by the optimiser to measure the ASCII-tail cost of
/// ending a chain early. Does not touch `stream`.
pub fn encode_tmp_remaining_in_ascii(stream: &EncodeStream, capacity: usize) -> (Vec<u8>, bool) {
    let mut tmp = EncodeStream {
        input: stream.input.clone(),
        input_next: stream.input_next,
        output: Vec::new(),
        current_scheme: Scheme::Ascii,
        output_chain_value_count: 0,
        output_chain_word_count: 0,
        size_idx: None,
        status: super::stream::EncodeStatus::Encoding,
        reason: None,
        fnc1: stream.fnc1,
        pending_ctx_values: Vec::new(),
    };

    while tmp.output.len() < capacity {
        if tmp.input_has_next() {
            encode_next_chunk_ascii(&mut tmp, AsciiOption::Normal);
        } else {
            break;
        }
    }

    let ok = !matches!(
        tmp.status,
        super::stream::EncodeStatus::Invalid | super::stream::EncodeStatus::Fatal
    );
    (tmp.output, ok)
}

pub use randomize_253_state as randomize_pad;

#[cfg(test)]
mod tests {
    use super::*;

    fn stream_of(bytes: &[u8]) -> EncodeStream {
        EncodeStream::new(bytes.to_vec(), None)
    }

    #[test]
    fn single_ascii_byte_becomes_value_plus_one() {
        let mut s = stream_of(b"A");
        encode_next_chunk_ascii(&mut s, AsciiOption::Normal);
        assert_eq!(s.output, vec![b'A' + 1]);
    }

    #[test]
    fn digit_pair_packs_into_one_codeword() {
        let mut s = stream_of(b"42");
        encode_next_chunk_ascii(&mut s, AsciiOption::Normal);
        assert_eq!(s.output, vec![10 * 4 + 2 + 130]);
    }

    #[test]
    fn extended_ascii_uses_upper_shift_pair() {
        let mut s = stream_of(&[200]);
        encode_next_chunk_ascii(&mut s, AsciiOption::Normal);
        assert_eq!(s.output, vec![VALUE_UPPER_SHIFT, 200 - 127]);
    }

    #[test]
    fn compact_mode_rejects_non_digits() {
        let mut s = stream_of(b"4A");
        encode_next_chunk_ascii(&mut s, AsciiOption::Compact);
        assert_eq!(s.status, super::super::stream::EncodeStatus::Invalid);
    }

    #[test]
    fn full_mode_never_pairs_digits() {
        let mut s = stream_of(b"42");
        encode_next_chunk_ascii(&mut s, AsciiOption::Full);
        assert_eq!(s.output, vec![b'4' + 1]);
    }

    #[test]
    fn pad_first_is_unrandomized() {
        let mut s = stream_of(b"A");
        encode_next_chunk_ascii(&mut s, AsciiOption::Normal);
        complete_if_done_ascii(&mut s, SizeRequest::AutoSquare);
        assert_eq!(s.output[1], VALUE_PAD);
    }
}
