//! Base-256 encodation scheme: length-prefixed raw byte passthrough, mixed
//! with the "255-state" randomizer. Ported from `dmtxencodebase256.c`.

use super::ascii::append_value_ascii;
use super::{encode_change_scheme, UnlatchKind};
use super::stream::{pad_remaining_in_ascii, EncodeStream, Scheme};
use crate::error::DmtxError;
use crate::symbol::{find_symbol_size, remaining_symbol_capacity, SizeRequest};

fn check_scheme(stream: &mut EncodeStream) {
    if stream.current_scheme != Scheme::Base256 {
        stream.mark_fatal(DmtxError::UnexpectedScheme);
    }
}

pub fn randomize_255_state(value: u8, position: i32) -> u8 {
    let pseudo_random = ((149 * position) % 255) + 1;
    let tmp = value as i32 + pseudo_random;
    (if tmp <= 255 { tmp } else { tmp - 256 }) as u8
}

pub fn unrandomize_255_state(value: u8, position: i32) -> u8 {
    let pseudo_random = ((149 * position) % 255) + 1;
    let mut tmp = value as i32 - pseudo_random;
    if tmp < 0 {
        tmp += 256;
    }
    tmp as u8
}

pub fn encode_next_chunk_base256(stream: &mut EncodeStream) {
    if !stream.input_has_next() {
        return;
    }

    let value = stream.input_peek_next();
    if !stream.is_alive() {
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
    append_value_base256(stream, value);
}

pub fn append_value_base256(stream: &mut EncodeStream, value: u8) {
    check_scheme(stream);
    if !stream.is_alive() {
        return;
    }

    let position = stream.output.len() as i32 + 1;
    stream.output_chain_append(randomize_255_state(value, position));
    if !stream.is_alive() {
        return;
    }
    stream.output_chain_value_count += 1;

    update_base256_chain_header(stream, None);
}

/// Recomputes and rewrites the one- or two-byte length header at the start of
/// the current Base-256 chain. `perfect_size_idx` is set only when the caller
/// has confirmed the chain runs exactly to the end of the symbol.
pub fn update_base256_chain_header(stream: &mut EncodeStream, perfect_size_idx: Option<usize>) {
    let output_length = stream.output_chain_value_count;
    let header_index = stream.output.len() as i32 - stream.output_chain_word_count;
    let mut header_byte_count = stream.output_chain_word_count - stream.output_chain_value_count;
    let perfect_fit = perfect_size_idx.is_some();

    if let Some(size_idx) = perfect_size_idx {
        let symbol_data_words = crate::symbol::attributes(size_idx).symbol_data_words;
        if symbol_data_words != stream.output.len() as i32 - 1 {
            stream.mark_fatal(DmtxError::Unknown);
            return;
        }
    }

    if header_byte_count == 0 && stream.output_chain_word_count == 0 {
        stream.output_chain_append(0);
        if !stream.is_alive() {
            return;
        }
        header_byte_count += 1;
    } else if !perfect_fit && header_byte_count == 1 && output_length > 249 {
        base256_output_chain_insert_first(stream);
        if !stream.is_alive() {
            return;
        }
        header_byte_count += 1;
    } else if perfect_fit && header_byte_count == 2 {
        base256_output_chain_remove_first(stream);
        if !stream.is_alive() {
            return;
        }
        header_byte_count -= 1;
    }

    let header_index = header_index.max(0) as usize;

    if !perfect_fit && header_byte_count == 1 && output_length <= 249 {
        let header_value = randomize_255_state(output_length as u8, header_index as i32 + 1);
        stream.output_set(header_index, header_value);
    } else if !perfect_fit && header_byte_count == 2 && output_length > 249 {
        let header_value_0 = randomize_255_state((output_length / 250 + 249) as u8, header_index as i32 + 1);
        stream.output_set(header_index, header_value_0);
        if !stream.is_alive() {
            return;
        }
        let header_value_1 = randomize_255_state((output_length % 250) as u8, header_index as i32 + 2);
        stream.output_set(header_index + 1, header_value_1);
    } else if perfect_fit && header_byte_count == 1 {
        let header_value = randomize_255_state(0, header_index as i32 + 1);
        stream.output_set(header_index, header_value);
    } else {
        stream.mark_fatal(DmtxError::Unknown);
    }
}

fn base256_output_chain_insert_first(stream: &mut EncodeStream) {
    let chain_start = stream.output.len() as i32 - stream.output_chain_word_count;
    stream.output_chain_append(0);
    if !stream.is_alive() {
        return;
    }

    let mut i = stream.output.len() as i32 - 1;
    while i > chain_start {
        let value = unrandomize_255_state(stream.output[(i - 1) as usize], i);
        stream.output[i as usize] = randomize_255_state(value, i + 1);
        i -= 1;
    }
}

fn base256_output_chain_remove_first(stream: &mut EncodeStream) {
    let chain_start = stream.output.len() as i32 - stream.output_chain_word_count;

    let mut i = chain_start;
    while i < stream.output.len() as i32 - 1 {
        let value = unrandomize_255_state(stream.output[(i + 1) as usize], i + 2);
        stream.output[i as usize] = randomize_255_state(value, i + 1);
        i += 1;
    }

    stream.output_chain_remove_last();
}

pub fn complete_if_done_base256(stream: &mut EncodeStream, size_request: SizeRequest) {
    use super::stream::EncodeStatus;
    if stream.status == EncodeStatus::Complete {
        return;
    }

    if !stream.input_has_next() {
        let header_byte_count = stream.output_chain_word_count - stream.output_chain_value_count;
        debug_assert!(header_byte_count == 1 || header_byte_count == 2);

        if header_byte_count == 2 {
            let output_length = stream.output.len() as i32 - 1;
            if let Some(size_idx) = find_symbol_size(output_length, size_request) {
                let symbol_remaining = remaining_symbol_capacity(output_length, size_idx);
                if symbol_remaining == 0 {
                    update_base256_chain_header(stream, Some(size_idx));
                    if !stream.is_alive() {
                        return;
                    }
                    stream.mark_complete(size_idx);
                    return;
                }
            }
        }

        let size_idx = match find_symbol_size(stream.output.len() as i32, size_request) {
            Some(idx) => idx,
            None => {
                stream.mark_invalid(DmtxError::MessageTooLarge);
                return;
            }
        };
        encode_change_scheme(stream, Scheme::Ascii, UnlatchKind::Implicit);
        if !stream.is_alive() {
            return;
        }
        pad_remaining_in_ascii(stream, size_idx);
        stream.mark_complete(size_idx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn randomize_unrandomize_roundtrip() {
        for position in 1..300 {
            for value in [0u8, 1, 127, 200, 255] {
                let mixed = randomize_255_state(value, position);
                assert_eq!(unrandomize_255_state(mixed, position), value);
            }
        }
    }

    #[test]
    fn single_byte_chain_gets_one_header_byte() {
        let mut s = EncodeStream::new(vec![65, 66, 67], None);
        s.current_scheme = Scheme::Base256;
        for _ in 0..3 {
            encode_next_chunk_base256(&mut s);
        }
        assert_eq!(s.output.len(), 4); // 1 header + 3 payload bytes
    }
}
