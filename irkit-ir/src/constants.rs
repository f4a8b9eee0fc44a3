//! Simple constants
//!
//! Literal operands. Constants carry no name and are never numbered.

use crate::values::{Constant, Value};
use irkit_common::{IntType, IrResult, PointerType, Type};

#[derive(Debug, Clone, PartialEq)]
pub enum Const {
    /// Integer literal; `i1` renders as `true`/`false`
    Int { ty: IntType, value: i64 },

    /// Null pointer
    Null(PointerType),

    Undef(Type),

    ZeroInitializer(Type),
}

impl Const {
    pub fn int(ty: IntType, value: i64) -> Self {
        Const::Int { ty, value }
    }

    pub fn i32(value: i64) -> Self {
        Const::int(IntType { bits: 32 }, value)
    }

    pub fn i64(value: i64) -> Self {
        Const::int(IntType { bits: 64 }, value)
    }

    pub fn bool(value: bool) -> Self {
        Const::int(IntType { bits: 1 }, value as i64)
    }
}

impl Value for Const {
    fn ty(&self) -> IrResult<Type> {
        Ok(match self {
            Const::Int { ty, .. } => Type::Int(*ty),
            Const::Null(ptr) => Type::Pointer(ptr.clone()),
            Const::Undef(ty) | Const::ZeroInitializer(ty) => ty.clone(),
        })
    }

    fn ident(&self) -> String {
        match self {
            Const::Int { ty, value } if ty.bits == 1 => {
                if *value != 0 { "true".to_string() } else { "false".to_string() }
            }
            Const::Int { value, .. } => value.to_string(),
            Const::Null(_) => "null".to_string(),
            Const::Undef(_) => "undef".to_string(),
            Const::ZeroInitializer(_) => "zeroinitializer".to_string(),
        }
    }
}

impl Constant for Const {}
