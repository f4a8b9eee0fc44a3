//! irkit - Common Types and Utilities
//! 
//! This crate contains the pieces of the IR toolkit that do not depend on
//! the value graph: the LLVM type system, identifier escaping and the
//! shared error type.

pub mod enc;
pub mod error;
pub mod types;

pub use error::{IrError, IrResult};
pub use types::*;
