//! EDIFACT encodation scheme: 6-bit values packed 4-values-into-3-codewords.
//! Ported from `dmtxencodeedifact.c`.

use super::ascii::{append_value_ascii, encode_tmp_remaining_in_ascii};
use super::{encode_change_scheme, UnlatchKind};
use super::stream::{pad_remaining_in_ascii, EncodeStream, Scheme};
use crate::error::DmtxError;
use crate::symbol::{find_symbol_size, remaining_symbol_capacity, SizeRequest};

pub const UNLATCH_VALUE: u8 = 0x1F;

fn check_scheme(stream: &mut EncodeStream) {
    if stream.current_scheme != Scheme::Edifact {
        stream.mark_fatal(DmtxError::UnexpectedScheme);
    }
}

pub fn encode_next_chunk_edifact(stream: &mut EncodeStream) {
    if !stream.input_has_next() {
        return;
    }

    let value = stream.input_peek_next();
    if !stream.is_alive() {
        return;
    }

    if !(32..=94).contains(&value) {
        stream.mark_invalid(DmtxError::UnsupportedCharacter);
        return;
    }

    if let Some(fnc1) = stream.fnc1 {
        if value == fnc1 {
            encode_change_scheme(stream, Scheme::Ascii, UnlatchKind::Explicit);
            if !stream.is_alive() {
                return;
            }
            stream.input_advance_next();
            if !stream.is_alive() {
                return;
            }
            append_value_ascii(stream, crate::encode::stream::AsciiSentinel::Fnc1.codeword());
            return;
        }
    }

    let value = stream.input_advance_next();
    if !stream.is_alive() {
        return;
    }
    append_value_edifact(stream, value);
}

pub fn append_value_edifact(stream: &mut EncodeStream, value: u8) {
    check_scheme(stream);
    if !stream.is_alive() {
        return;
    }

    if !(31..=94).contains(&value) {
        stream.mark_invalid(DmtxError::UnsupportedCharacter);
        return;
    }

    let edifact_value = (value & 0x3f) << 2;

    match stream.output_chain_value_count % 4 {
        0 => stream.output_chain_append(edifact_value),
        1 => {
            let previous = stream.output_chain_remove_last();
            if !stream.is_alive() {
                return;
            }
            stream.output_chain_append(previous | (edifact_value >> 6));
            stream.output_chain_append(edifact_value << 2);
        }
        2 => {
            let previous = stream.output_chain_remove_last();
            if !stream.is_alive() {
                return;
            }
            stream.output_chain_append(previous | (edifact_value >> 4));
            stream.output_chain_append(edifact_value << 4);
        }
        3 => {
            let previous = stream.output_chain_remove_last();
            if !stream.is_alive() {
                return;
            }
            stream.output_chain_append(previous | (edifact_value >> 2));
        }
        _ => unreachable!(),
    }

    stream.output_chain_value_count += 1;
}

pub fn complete_if_done_edifact(stream: &mut EncodeStream, size_request: SizeRequest) {
    use super::stream::EncodeStatus;
    if stream.status == EncodeStatus::Complete {
        return;
    }

    let clean_boundary = stream.output_chain_value_count % 4 == 0;

    if clean_boundary {
        let (tmp, ok) = encode_tmp_remaining_in_ascii(stream, 3);
        if !ok {
            stream.mark_fatal(DmtxError::Unknown);
            return;
        }

        if tmp.len() < 3 {
            let size_idx = match find_symbol_size(
                (stream.output.len() + tmp.len()) as i32,
                size_request,
            ) {
                Some(idx) => idx,
                None => {
                    stream.mark_invalid(DmtxError::MessageTooLarge);
                    return;
                }
            };

            let symbol_remaining = remaining_symbol_capacity(stream.output.len() as i32, size_idx);

            if symbol_remaining < 3 && (tmp.len() as i32) <= symbol_remaining {
                encode_change_scheme(stream, Scheme::Ascii, UnlatchKind::Implicit);
                if !stream.is_alive() {
                    return;
                }
                for byte in tmp {
                    append_value_ascii(stream, byte);
                    if !stream.is_alive() {
                        return;
                    }
                }
                stream.input_next = stream.input.len();
                pad_remaining_in_ascii(stream, size_idx);
                return;
            }
        }
    }

    if !stream.input_has_next() {
        let size_idx = match find_symbol_size(stream.output.len() as i32, size_request) {
            Some(idx) => idx,
            None => {
                stream.mark_invalid(DmtxError::MessageTooLarge);
                return;
            }
        };
        let symbol_remaining = remaining_symbol_capacity(stream.output.len() as i32, size_idx);

        let mut final_size_idx = size_idx;
        if !clean_boundary || symbol_remaining > 0 {
            encode_change_scheme(stream, Scheme::Ascii, UnlatchKind::Explicit);
            if !stream.is_alive() {
                return;
            }
            final_size_idx = match find_symbol_size(stream.output.len() as i32, size_request) {
                Some(idx) => idx,
                None => {
                    stream.mark_invalid(DmtxError::MessageTooLarge);
                    return;
                }
            };
            pad_remaining_in_ascii(stream, final_size_idx);
        }

        stream.mark_complete(final_size_idx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_values_pack_into_three_codewords() {
        let mut s = EncodeStream::new(b"abcd".to_vec(), None);
        s.current_scheme = Scheme::Edifact;
        for _ in 0..4 {
            encode_next_chunk_edifact(&mut s);
        }
        assert_eq!(s.output.len(), 3);
    }

    #[test]
    fn rejects_out_of_range_byte() {
        let mut s = EncodeStream::new(vec![200], None);
        s.current_scheme = Scheme::Edifact;
        encode_next_chunk_edifact(&mut s);
        assert_eq!(s.status, super::super::stream::EncodeStatus::Invalid);
    }
}
