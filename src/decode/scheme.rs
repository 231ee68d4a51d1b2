//! Inverse of the six encodation schemes: turns a decoded (and
//! error-corrected) codeword stream back into the original byte sequence.
//! Ported from `decode/dmtxdecodescheme.c`.

use crate::encode::base256::unrandomize_255_state;
use crate::error::DecodeError;

const UNLATCH_C40_TEXT_X12: u8 = 254;
const UNLATCH_EDIFACT: u8 = 0x1F;
const UPPER_SHIFT: u8 = 235;
const PAD: u8 = 129;
const C40_LATCH: u8 = 230;
const TEXT_LATCH: u8 = 239;
const X12_LATCH: u8 = 238;
const EDIFACT_LATCH: u8 = 240;
const BASE256_LATCH: u8 = 231;
const FNC1: u8 = 232;
const MACRO_05: u8 = 236;
const MACRO_06: u8 = 237;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Scheme {
    Ascii,
    C40,
    Text,
    X12,
    Edifact,
    Base256,
}

fn encodation_scheme(cw: u8) -> Scheme {
    match cw {
        C40_LATCH => Scheme::C40,
        TEXT_LATCH => Scheme::Text,
        X12_LATCH => Scheme::X12,
        EDIFACT_LATCH => Scheme::Edifact,
        BASE256_LATCH => Scheme::Base256,
        _ => Scheme::Ascii,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum C40TextShift {
    Basic,
    Shift1,
    Shift2,
    Shift3,
}

/// Decodes `code[..symbol_data_words]` into its original byte sequence.
/// `fnc1` is the optional configured FNC1 byte used to resolve the FNC1
/// sentinel back to a literal value (left out of the output when unset, the
/// same way the original leaves `msg->fnc1 == DmtxUndefined` silent).
pub fn decode_data_stream(code: &[u8], symbol_data_words: usize, fnc1: Option<u8>) -> Result<Vec<u8>, DecodeError> {
    let data_end = symbol_data_words.min(code.len());
    let mut output = Vec::new();
    let mut ptr = 0usize;

    let macro_header = data_end > 0 && (code[0] == MACRO_05 || code[0] == MACRO_06);
    if macro_header {
        push_macro_header(&mut output, code[0]);
    }

    while ptr < data_end {
        let scheme = encodation_scheme(code[ptr]);
        if scheme != Scheme::Ascii {
            ptr += 1;
        }

        ptr = match scheme {
            Scheme::Ascii => decode_ascii(code, ptr, data_end, fnc1, &mut output)?,
            Scheme::C40 => decode_c40_text(code, ptr, data_end, true, fnc1, &mut output)?,
            Scheme::Text => decode_c40_text(code, ptr, data_end, false, fnc1, &mut output)?,
            Scheme::X12 => decode_x12(code, ptr, data_end, &mut output)?,
            Scheme::Edifact => decode_edifact(code, ptr, data_end, &mut output)?,
            Scheme::Base256 => decode_base256(code, ptr, data_end, &mut output)?,
        };
    }

    if macro_header {
        push_macro_trailer(&mut output);
    }

    Ok(output)
}

fn push_macro_header(output: &mut Vec<u8>, macro_type: u8) {
    output.extend_from_slice(b"[)>");
    output.push(30); // ASCII RS
    output.push(b'0');
    output.push(if macro_type == MACRO_05 { b'5' } else { b'6' });
    output.push(29); // ASCII GS
}

fn push_macro_trailer(output: &mut Vec<u8>) {
    output.push(30); // ASCII RS
    output.push(4); // ASCII EOT
}

fn decode_ascii(
    code: &[u8],
    mut ptr: usize,
    data_end: usize,
    fnc1: Option<u8>,
    output: &mut Vec<u8>,
) -> Result<usize, DecodeError> {
    let mut upper_shift = false;

    while ptr < data_end {
        let codeword = code[ptr];
        if encodation_scheme(codeword) != Scheme::Ascii {
            return Ok(ptr);
        }
        ptr += 1;

        if upper_shift {
            let pushword = codeword as i32 + 127;
            if !(0..256).contains(&pushword) {
                return Err(DecodeError::MalformedCodewordStream);
            }
            output.push(pushword as u8);
            upper_shift = false;
        } else if codeword == UPPER_SHIFT {
            upper_shift = true;
        } else if codeword == PAD {
            return Ok(data_end);
        } else if codeword == 0 || codeword >= 242 {
            return Ok(ptr);
        } else if codeword <= 128 {
            output.push(codeword - 1);
        } else if codeword <= 229 {
            let digits = codeword as i32 - 130;
            output.push((digits / 10) as u8 + b'0');
            output.push((digits - (digits / 10) * 10) as u8 + b'0');
        } else if codeword == FNC1 {
            if let Some(value) = fnc1 {
                output.push(value);
            }
        }
    }

    Ok(ptr)
}

fn decode_c40_text(
    code: &[u8],
    mut ptr: usize,
    data_end: usize,
    is_c40: bool,
    fnc1: Option<u8>,
    output: &mut Vec<u8>,
) -> Result<usize, DecodeError> {
    let mut shift = C40TextShift::Basic;
    let mut upper_shift = false;

    if data_end.saturating_sub(ptr) < 2 {
        return Ok(ptr);
    }

    while ptr < data_end {
        let packed = ((code[ptr] as i32) << 8) | code[ptr + 1] as i32;
        let values = [
            (packed - 1) / 1600,
            ((packed - 1) / 40) % 40,
            (packed - 1) % 40,
        ];
        ptr += 2;

        for &v in &values {
            let mut push = |output: &mut Vec<u8>, value: u8, upper_shift: &mut bool, shift: &mut C40TextShift| {
                let final_value = if *upper_shift { value as u16 + 128 } else { value as u16 };
                output.push(final_value as u8);
                *shift = C40TextShift::Basic;
                *upper_shift = false;
            };

            match shift {
                C40TextShift::Basic => {
                    if v <= 2 {
                        shift = match v {
                            0 => C40TextShift::Shift1,
                            1 => C40TextShift::Shift2,
                            _ => C40TextShift::Shift3,
                        };
                    } else if v == 3 {
                        push(output, b' ', &mut upper_shift, &mut shift);
                    } else if v <= 13 {
                        push(output, (v - 13 + b'9' as i32) as u8, &mut upper_shift, &mut shift);
                    } else if v <= 39 {
                        let base = if is_c40 { b'Z' as i32 } else { b'z' as i32 };
                        push(output, (v - 39 + base) as u8, &mut upper_shift, &mut shift);
                    }
                }
                C40TextShift::Shift1 => {
                    push(output, v as u8, &mut upper_shift, &mut shift);
                }
                C40TextShift::Shift2 => {
                    if v <= 14 {
                        push(output, (v + 33) as u8, &mut upper_shift, &mut shift);
                    } else if v <= 21 {
                        push(output, (v + 43) as u8, &mut upper_shift, &mut shift);
                    } else if v <= 26 {
                        push(output, (v + 69) as u8, &mut upper_shift, &mut shift);
                    } else if v == 27 {
                        if let Some(value) = fnc1 {
                            push(output, value, &mut upper_shift, &mut shift);
                        } else {
                            shift = C40TextShift::Basic;
                        }
                    } else if v == 30 {
                        upper_shift = true;
                        shift = C40TextShift::Basic;
                    }
                }
                C40TextShift::Shift3 => {
                    if is_c40 {
                        push(output, (v + 96) as u8, &mut upper_shift, &mut shift);
                    } else if v == 0 {
                        push(output, (v + 96) as u8, &mut upper_shift, &mut shift);
                    } else if v <= 26 {
                        push(output, (v - 26 + b'Z' as i32) as u8, &mut upper_shift, &mut shift);
                    } else {
                        push(output, (v - 31 + 127) as u8, &mut upper_shift, &mut shift);
                    }
                }
            }
        }

        if ptr < data_end && code[ptr] == UNLATCH_C40_TEXT_X12 {
            return Ok(ptr + 1);
        }
        if data_end.saturating_sub(ptr) < 2 {
            return Ok(ptr);
        }
    }

    Ok(ptr)
}

fn decode_x12(code: &[u8], mut ptr: usize, data_end: usize, output: &mut Vec<u8>) -> Result<usize, DecodeError> {
    if data_end.saturating_sub(ptr) < 2 {
        return Ok(ptr);
    }

    while ptr < data_end {
        let packed = ((code[ptr] as i32) << 8) | code[ptr + 1] as i32;
        let values = [
            (packed - 1) / 1600,
            ((packed - 1) / 40) % 40,
            (packed - 1) % 40,
        ];
        ptr += 2;

        for &v in &values {
            if v == 0 {
                output.push(13);
            } else if v == 1 {
                output.push(42);
            } else if v == 2 {
                output.push(62);
            } else if v == 3 {
                output.push(32);
            } else if v <= 13 {
                output.push((v + 44) as u8);
            } else if v <= 90 {
                output.push((v + 51) as u8);
            }
        }

        if ptr < data_end && code[ptr] == UNLATCH_C40_TEXT_X12 {
            return Ok(ptr + 1);
        }
        if data_end.saturating_sub(ptr) < 2 {
            return Ok(ptr);
        }
    }

    Ok(ptr)
}

fn decode_edifact(code: &[u8], mut ptr: usize, data_end: usize, output: &mut Vec<u8>) -> Result<usize, DecodeError> {
    if data_end.saturating_sub(ptr) < 3 {
        return Ok(ptr);
    }

    while ptr < data_end {
        let unpacked = [
            (code[ptr] & 0xfc) >> 2,
            (code[ptr] & 0x03) << 4 | (code[ptr + 1] & 0xf0) >> 4,
            (code[ptr + 1] & 0x0f) << 2 | (code[ptr + 2] & 0xc0) >> 6,
            code[ptr + 2] & 0x3f,
        ];

        for (i, &value) in unpacked.iter().enumerate() {
            if i < 3 {
                ptr += 1;
            }

            if value == UNLATCH_EDIFACT {
                return Ok(ptr);
            }

            output.push(value ^ (((value & 0x20) ^ 0x20) << 1));
        }

        if data_end.saturating_sub(ptr) < 3 {
            return Ok(ptr);
        }
    }

    Ok(ptr)
}

fn decode_base256(code: &[u8], mut ptr: usize, data_end: usize, output: &mut Vec<u8>) -> Result<usize, DecodeError> {
    let mut idx = ptr + 1;

    let d0 = unrandomize_255_state(code[ptr], idx as i32);
    ptr += 1;
    idx += 1;

    let ptr_end = if d0 == 0 {
        data_end
    } else if d0 <= 249 {
        ptr + d0 as usize
    } else {
        let d1 = unrandomize_255_state(code[ptr], idx as i32);
        ptr += 1;
        idx += 1;
        ptr + (d0 as usize - 249) * 250 + d1 as usize
    };

    if ptr_end > data_end {
        return Err(DecodeError::MalformedCodewordStream);
    }

    while ptr < ptr_end {
        output.push(unrandomize_255_state(code[ptr], idx as i32));
        ptr += 1;
        idx += 1;
    }

    Ok(ptr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_ascii_digits_round_trip() {
        // '3'=0x33 -> codeword 0x33+1=0x34; decode subtracts 1 back.
        let code = vec![b'A' as u8 + 1, b'B' as u8 + 1, b'C' as u8 + 1, PAD, PAD];
        let out = decode_data_stream(&code, 5, None).unwrap();
        assert_eq!(out, b"ABC");
    }

    #[test]
    fn ascii_digit_pair_decodes_to_two_digit_chars() {
        // digits "42" => codeword 130+42=172
        let code = vec![172u8, PAD];
        let out = decode_data_stream(&code, 2, None).unwrap();
        assert_eq!(out, b"42");
    }

    #[test]
    fn base256_with_short_header_round_trips() {
        use crate::encode::base256::randomize_255_state;
        // header byte at position 1 (1-based) encodes length 3 unrandomized,
        // then 3 payload bytes randomized at positions 2,3,4.
        let header = randomize_255_state(3, 1);
        let payload = [
            randomize_255_state(10, 2),
            randomize_255_state(20, 3),
            randomize_255_state(30, 4),
        ];
        let mut code = vec![header];
        code.extend_from_slice(&payload);
        code.push(PAD);
        let out = decode_data_stream(&code, code.len(), None).unwrap();
        assert_eq!(out, vec![10, 20, 30]);
    }
}
