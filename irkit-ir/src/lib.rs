//! irkit - In-memory LLVM IR
//!
//! This crate models functions, basic blocks and memory instructions of
//! LLVM IR, infers instruction result types lazily and renders everything
//! back into the textual assembly form.
//!
//! ## Architecture
//!
//! The crate is structured as follows:
//! - `values` - Value, Named and Constant traits
//! - `typeres` - Type resolution used by inference rules
//! - `attrs` - Linkage, calling conventions, orderings and other keywords
//! - `constants` - Literal constants
//! - `params` - Function parameters
//! - `instructions` - Memory instructions
//! - `blocks` - Basic blocks and terminators
//! - `function` - Function declarations and definitions
//! - `numbering` - Local ID assignment
//!
//! The model is single-threaded: names and type caches use `RefCell` and
//! `unsync::OnceCell`, so none of the types are `Send` or `Sync`.

// Public exports - clean API surface
pub use self::values::{Constant, ConstantRef, Named, NamedRef, Value, ValueRef};
pub use self::attrs::{
    AtomicOp, AtomicOrdering, CallingConv, DllStorageClass, FuncAttr, Linkage, ParamAttr,
    Preemption, UnnamedAddr, Visibility,
};
pub use self::constants::Const;
pub use self::params::Param;
pub use self::instructions::{
    Inst, InstAlloca, InstAtomicRMW, InstCmpXchg, InstFence, InstGetElementPtr, InstLoad, InstStore,
};
pub use self::blocks::{BasicBlock, Term};
pub use self::function::{ComdatRef, Function};
pub use self::numbering::LocalIds;
pub use irkit_common::{IrError, IrResult, Type};

pub mod typeres;

mod values;
mod attrs;
mod constants;
mod params;
mod instructions;
mod blocks;
mod function;
mod numbering;
