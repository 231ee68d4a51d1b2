//! The scheme optimiser: a 17-state dynamic-programming search across every
//! scheme-switching path, advancing one input byte at a time. Ported from
//! `dmtxencodeoptimize.c`.

use super::ascii::{
    complete_if_done_ascii, encode_next_chunk_ascii, AsciiOption,
};
use super::c40text::{
    complete_if_done_ctx, encode_next_chunk_ctx, values_for_byte_count, CtxMode,
};
use super::edifact::{complete_if_done_edifact, encode_next_chunk_edifact};
use super::base256::{complete_if_done_base256, encode_next_chunk_base256};
use super::stream::{EncodeStatus, EncodeStream, Scheme};
use super::{encode_change_scheme, UnlatchKind};
use crate::symbol::SizeRequest;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(usize)]
enum SchemeState {
    AsciiFull = 0,
    AsciiCompactOffset0,
    AsciiCompactOffset1,
    C40Offset0,
    C40Offset1,
    C40Offset2,
    TextOffset0,
    TextOffset1,
    TextOffset2,
    X12Offset0,
    X12Offset1,
    X12Offset2,
    EdifactOffset0,
    EdifactOffset1,
    EdifactOffset2,
    EdifactOffset3,
    Base256,
}

const STATE_COUNT: usize = 17;
const ALL_STATES: [SchemeState; STATE_COUNT] = [
    SchemeState::AsciiFull,
    SchemeState::AsciiCompactOffset0,
    SchemeState::AsciiCompactOffset1,
    SchemeState::C40Offset0,
    SchemeState::C40Offset1,
    SchemeState::C40Offset2,
    SchemeState::TextOffset0,
    SchemeState::TextOffset1,
    SchemeState::TextOffset2,
    SchemeState::X12Offset0,
    SchemeState::X12Offset1,
    SchemeState::X12Offset2,
    SchemeState::EdifactOffset0,
    SchemeState::EdifactOffset1,
    SchemeState::EdifactOffset2,
    SchemeState::EdifactOffset3,
    SchemeState::Base256,
];

fn scheme_of(state: SchemeState) -> Scheme {
    match state {
        SchemeState::AsciiFull | SchemeState::AsciiCompactOffset0 | SchemeState::AsciiCompactOffset1 => {
            Scheme::Ascii
        }
        SchemeState::C40Offset0 | SchemeState::C40Offset1 | SchemeState::C40Offset2 => Scheme::C40,
        SchemeState::TextOffset0 | SchemeState::TextOffset1 | SchemeState::TextOffset2 => Scheme::Text,
        SchemeState::X12Offset0 | SchemeState::X12Offset1 | SchemeState::X12Offset2 => Scheme::X12,
        SchemeState::EdifactOffset0
        | SchemeState::EdifactOffset1
        | SchemeState::EdifactOffset2
        | SchemeState::EdifactOffset3 => Scheme::Edifact,
        SchemeState::Base256 => Scheme::Base256,
    }
}

fn valid_state_switch(from: SchemeState, to: SchemeState) -> bool {
    let from_scheme = scheme_of(from);
    let to_scheme = scheme_of(to);
    !(from_scheme == to_scheme && from != to && from != SchemeState::AsciiFull && to != SchemeState::AsciiFull)
}

/// Drives a single byte through `target_scheme` using `option`, performing
/// whatever latch/unlatch is needed to get there first, then checks for
/// completion. Generic dispatch matching the original's `encodeNextChunk`.
fn encode_next_chunk(stream: &mut EncodeStream, target_scheme: Scheme, option: AsciiOption, size_request: SizeRequest) {
    if stream.current_scheme != target_scheme {
        if stream.current_scheme != Scheme::Ascii {
            encode_change_scheme(stream, Scheme::Ascii, UnlatchKind::Explicit);
            if !stream.is_alive() {
                return;
            }
        }
        if target_scheme != Scheme::Ascii {
            encode_change_scheme(stream, target_scheme, UnlatchKind::Implicit);
            if !stream.is_alive() {
                return;
            }
        }
    }

    match target_scheme {
        Scheme::Ascii => encode_next_chunk_ascii(stream, option),
        Scheme::C40 => encode_next_chunk_ctx(stream, CtxMode::C40),
        Scheme::Text => encode_next_chunk_ctx(stream, CtxMode::Text),
        Scheme::X12 => encode_next_chunk_ctx(stream, CtxMode::X12),
        Scheme::Edifact => encode_next_chunk_edifact(stream),
        Scheme::Base256 => encode_next_chunk_base256(stream),
    }
    if !stream.is_alive() {
        return;
    }

    match target_scheme {
        Scheme::Ascii => complete_if_done_ascii(stream, size_request),
        Scheme::C40 => complete_if_done_ctx(stream, CtxMode::C40, size_request),
        Scheme::Text => complete_if_done_ctx(stream, CtxMode::Text, size_request),
        Scheme::X12 => complete_if_done_ctx(stream, CtxMode::X12, size_request),
        Scheme::Edifact => complete_if_done_edifact(stream, size_request),
        Scheme::Base256 => complete_if_done_base256(stream, size_request),
    }
}

fn ascii_option_for(state: SchemeState) -> AsciiOption {
    match state {
        SchemeState::AsciiFull => AsciiOption::Full,
        SchemeState::AsciiCompactOffset0 | SchemeState::AsciiCompactOffset1 => AsciiOption::Compact,
        _ => AsciiOption::Normal,
    }
}

/// Tries every alive "best" state as an entry point into `target`, keeping
/// whichever arrival produces the shortest (or first, for ties on the first
/// candidate) output.
fn stream_advance_from_best(
    streams_next: &mut [EncodeStream; STATE_COUNT],
    streams_best: &[EncodeStream; STATE_COUNT],
    target: SchemeState,
    size_request: SizeRequest,
) {
    let target_scheme = scheme_of(target);
    let option = ascii_option_for(target);
    let mut best: Option<EncodeStream> = None;

    for &from in ALL_STATES.iter() {
        let from_stream = &streams_best[from as usize];
        if from_stream.status != EncodeStatus::Encoding || !valid_state_switch(from, target) {
            continue;
        }

        let mut candidate = from_stream.clone();
        encode_next_chunk(&mut candidate, target_scheme, option, size_request);

        let better = match &best {
            None => true,
            Some(current) => candidate.status != EncodeStatus::Invalid && candidate.output.len() < current.output.len(),
        };
        if better {
            best = Some(candidate);
        }
    }

    if let Some(candidate) = best {
        streams_next[target as usize] = candidate;
    }
}

fn advance_ascii_compact(
    streams_next: &mut [EncodeStream; STATE_COUNT],
    streams_best: &[EncodeStream; STATE_COUNT],
    target: SchemeState,
    input_next: usize,
    size_request: SizeRequest,
) {
    let is_start_state = match target {
        SchemeState::AsciiCompactOffset0 => input_next % 2 == 0,
        SchemeState::AsciiCompactOffset1 => input_next % 2 == 1,
        _ => unreachable!(),
    };

    let current = streams_best[target as usize].clone();

    if input_next < current.input_next {
        streams_next[target as usize] = current;
    } else if is_start_state {
        stream_advance_from_best(streams_next, streams_best, target, size_request);
    } else {
        let mut invalidated = current;
        invalidated.status = EncodeStatus::Invalid;
        streams_next[target as usize] = invalidated;
    }
}

fn advance_ctx(
    streams_next: &mut [EncodeStream; STATE_COUNT],
    streams_best: &[EncodeStream; STATE_COUNT],
    target: SchemeState,
    input_next: usize,
    ctx_value_count: i64,
    size_request: SizeRequest,
) {
    let offset = ctx_value_count.rem_euclid(3);
    let is_start_state = match target {
        SchemeState::C40Offset0 | SchemeState::TextOffset0 | SchemeState::X12Offset0 => offset == 0,
        SchemeState::C40Offset1 | SchemeState::TextOffset1 | SchemeState::X12Offset1 => offset == 1,
        SchemeState::C40Offset2 | SchemeState::TextOffset2 | SchemeState::X12Offset2 => offset == 2,
        _ => unreachable!(),
    };

    let current = streams_best[target as usize].clone();

    if input_next < current.input_next {
        streams_next[target as usize] = current;
    } else if is_start_state {
        stream_advance_from_best(streams_next, streams_best, target, size_request);
    } else {
        let mut invalidated = current;
        invalidated.status = EncodeStatus::Invalid;
        streams_next[target as usize] = invalidated;
    }
}

fn advance_edifact(
    streams_next: &mut [EncodeStream; STATE_COUNT],
    streams_best: &[EncodeStream; STATE_COUNT],
    target: SchemeState,
    input_next: usize,
    size_request: SizeRequest,
) {
    let is_start_state = match target {
        SchemeState::EdifactOffset0 => input_next % 4 == 0,
        SchemeState::EdifactOffset1 => input_next % 4 == 1,
        SchemeState::EdifactOffset2 => input_next % 4 == 2,
        SchemeState::EdifactOffset3 => input_next % 4 == 3,
        _ => unreachable!(),
    };

    if is_start_state {
        stream_advance_from_best(streams_next, streams_best, target, size_request);
    } else {
        let current = streams_best[target as usize].clone();
        let alive_edifact = current.status == EncodeStatus::Encoding && current.current_scheme == Scheme::Edifact;
        let mut candidate = current;
        if alive_edifact {
            encode_next_chunk(&mut candidate, Scheme::Edifact, AsciiOption::Normal, size_request);
        } else {
            candidate.status = EncodeStatus::Invalid;
        }
        streams_next[target as usize] = candidate;
    }
}

/// Runs the full optimiser over `input`, returning `(codewords, size_idx)` of
/// the shortest scheme-switching path that reaches `Complete`, or `None` if
/// no state could complete (message too large / unsupported characters).
pub fn encode_optimize_best(input: &[u8], size_request: SizeRequest, fnc1: Option<u8>) -> Option<(Vec<u8>, usize)> {
    let make_stream = || EncodeStream::new(input.to_vec(), fnc1);
    let mut streams_best: [EncodeStream; STATE_COUNT] = std::array::from_fn(|_| make_stream());
    let mut streams_temp: [EncodeStream; STATE_COUNT] = std::array::from_fn(|_| make_stream());

    let mut c40_value_count: i64 = 0;
    let mut text_value_count: i64 = 0;
    let mut x12_value_count: i64 = 0;

    for input_next in 0..input.len() {
        stream_advance_from_best(&mut streams_temp, &streams_best, SchemeState::AsciiFull, size_request);

        advance_ascii_compact(&mut streams_temp, &streams_best, SchemeState::AsciiCompactOffset0, input_next, size_request);
        advance_ascii_compact(&mut streams_temp, &streams_best, SchemeState::AsciiCompactOffset1, input_next, size_request);

        advance_ctx(&mut streams_temp, &streams_best, SchemeState::C40Offset0, input_next, c40_value_count, size_request);
        advance_ctx(&mut streams_temp, &streams_best, SchemeState::C40Offset1, input_next, c40_value_count, size_request);
        advance_ctx(&mut streams_temp, &streams_best, SchemeState::C40Offset2, input_next, c40_value_count, size_request);

        advance_ctx(&mut streams_temp, &streams_best, SchemeState::TextOffset0, input_next, text_value_count, size_request);
        advance_ctx(&mut streams_temp, &streams_best, SchemeState::TextOffset1, input_next, text_value_count, size_request);
        advance_ctx(&mut streams_temp, &streams_best, SchemeState::TextOffset2, input_next, text_value_count, size_request);

        advance_ctx(&mut streams_temp, &streams_best, SchemeState::X12Offset0, input_next, x12_value_count, size_request);
        advance_ctx(&mut streams_temp, &streams_best, SchemeState::X12Offset1, input_next, x12_value_count, size_request);
        advance_ctx(&mut streams_temp, &streams_best, SchemeState::X12Offset2, input_next, x12_value_count, size_request);

        advance_edifact(&mut streams_temp, &streams_best, SchemeState::EdifactOffset0, input_next, size_request);
        advance_edifact(&mut streams_temp, &streams_best, SchemeState::EdifactOffset1, input_next, size_request);
        advance_edifact(&mut streams_temp, &streams_best, SchemeState::EdifactOffset2, input_next, size_request);
        advance_edifact(&mut streams_temp, &streams_best, SchemeState::EdifactOffset3, input_next, size_request);

        stream_advance_from_best(&mut streams_temp, &streams_best, SchemeState::Base256, size_request);

        for &state in ALL_STATES.iter() {
            if streams_best[state as usize].status != EncodeStatus::Complete {
                streams_best[state as usize] = streams_temp[state as usize].clone();
            }
        }

        let byte = input[input_next];
        c40_value_count += values_for_byte_count(CtxMode::C40, byte);
        text_value_count += values_for_byte_count(CtxMode::Text, byte);
        x12_value_count += values_for_byte_count(CtxMode::X12, byte);
    }

    ALL_STATES
        .iter()
        .map(|&s| &streams_best[s as usize])
        .filter(|s| s.status == EncodeStatus::Complete)
        .min_by_key(|s| s.output.len())
        .and_then(|winner| winner.size_idx.map(|idx| (winner.output.clone(), idx)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optimizer_completes_plain_ascii_message() {
        let result = encode_optimize_best(b"HELLO", SizeRequest::AutoSquare, None);
        assert!(result.is_some());
    }

    #[test]
    fn optimizer_completes_numeric_message_compactly() {
        let ascii = encode_optimize_best(b"123456789012", SizeRequest::AutoSquare, None).unwrap();
        // Digit pairing should make this shorter than one codeword per byte.
        assert!(ascii.0.len() < 12);
    }

    #[test]
    fn optimizer_handles_mixed_content() {
        let result = encode_optimize_best(b"ABC123!!!", SizeRequest::AutoSquare, None);
        assert!(result.is_some());
    }
}
