//! Error handling for irkit
//!
//! Numbering consistency errors and the type-shape violations that a
//! malformed IR tree produces during type inference or rendering.

use crate::types::Type;
use thiserror::Error;

/// Error type shared by type inference, numbering and rendering
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IrError {
    /// A pre-existing numeric local name disagrees with the running counter
    #[error("invalid local ID in function {func}, expected %{expected}, got %{got}")]
    LocalIdMismatch {
        func: String,
        expected: String,
        got: String,
    },

    /// An operand does not have the structural type its use requires
    #[error("invalid {context} type; expected {expected} type, got {got}")]
    UnexpectedType {
        context: String,
        expected: &'static str,
        got: Type,
    },

    #[error("basic block {block} has no terminator")]
    MissingTerminator { block: String },

    #[error("branch in basic block {block} targets a block that no longer exists")]
    DanglingBranch { block: String },
}

pub type IrResult<T> = Result<T, IrError>;

impl IrError {
    pub fn unexpected_type(context: impl Into<String>, expected: &'static str, got: &Type) -> Self {
        IrError::UnexpectedType {
            context: context.into(),
            expected,
            got: got.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_local_id_mismatch_message() {
        let err = IrError::LocalIdMismatch {
            func: "@f".to_string(),
            expected: "3".to_string(),
            got: "5".to_string(),
        };
        assert_eq!(err.to_string(), "invalid local ID in function @f, expected %3, got %5");
    }

    #[test]
    fn test_unexpected_type_message() {
        let err = IrError::unexpected_type("load source", "pointer", &Type::i32());
        assert_eq!(err.to_string(), "invalid load source type; expected pointer type, got i32");
    }
}
