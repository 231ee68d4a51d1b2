//! Error taxonomy shared by the encoder and decoder.
//!
//! Matches the original's `DmtxErrorMessage` table one-for-one; kept as a
//! plain enum with a hand-written `Display`, the way the teacher crate
//! favours plain enums and explicit match arms over a derive-macro crate.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DmtxError {
    UnsupportedCharacter,
    NotOnByteBoundary,
    IllegalParameterValue,
    EmptyList,
    OutOfBounds,
    MessageTooLarge,
    CantCompactNonDigits,
    UnexpectedScheme,
    IncompleteValueList,
    Unknown,
}

impl fmt::Display for DmtxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            DmtxError::UnsupportedCharacter => "input character not supported by current scheme",
            DmtxError::NotOnByteBoundary => "encodation chain ended mid-pack, not on a byte boundary",
            DmtxError::IllegalParameterValue => "parameter value out of range",
            DmtxError::EmptyList => "attempted to read from an empty list",
            DmtxError::OutOfBounds => "index out of bounds",
            DmtxError::MessageTooLarge => "message too large for requested symbol size",
            DmtxError::CantCompactNonDigits => "compact ASCII mode requires paired digits",
            DmtxError::UnexpectedScheme => "stream scheme assertion failed",
            DmtxError::IncompleteValueList => "optimiser could not find a completing path",
            DmtxError::Unknown => "unknown internal error",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for DmtxError {}

/// Decode-side failures; these never panic, they surface as `None`/`Err` at
/// the public boundary the way the detector's boolean pass/fail steps do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeError {
    RegionNotFound,
    SizeNotFound,
    ReedSolomonUncorrectable,
    MalformedCodewordStream,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            DecodeError::RegionNotFound => "no Data Matrix region found in image",
            DecodeError::SizeNotFound => "symbol size could not be determined",
            DecodeError::ReedSolomonUncorrectable => "Reed-Solomon correction failed",
            DecodeError::MalformedCodewordStream => "codeword stream did not decode to a valid message",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for DecodeError {}
