//! Wire decoding errors.

use crate::error::{ErrorSeverity, GameError};

/// A frame that cannot be turned back into a command.
///
/// The stream is untrusted input; any of these means the frame is discarded
/// whole and nothing it describes is applied.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("frame truncated at `{field}`: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof {
        field: &'static str,
        needed: usize,
        remaining: usize,
    },

    #[error("unknown action type {0}")]
    UnknownActionType(u32),

    #[error("{0} trailing bytes after the last parameter")]
    TrailingBytes(usize),

    #[error("field `{field}` holds {value}, expected a boolean byte")]
    InvalidBool { field: &'static str, value: u8 },
}

impl GameError for CodecError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            CodecError::UnexpectedEof { .. } => "CODEC_UNEXPECTED_EOF",
            CodecError::UnknownActionType(_) => "CODEC_UNKNOWN_ACTION_TYPE",
            CodecError::TrailingBytes(_) => "CODEC_TRAILING_BYTES",
            CodecError::InvalidBool { .. } => "CODEC_INVALID_BOOL",
        }
    }
}
