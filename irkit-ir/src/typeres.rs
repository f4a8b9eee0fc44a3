//! Type resolution
//!
//! Thin layer over the type system used by inference rules. Nothing here
//! caches; callers store the results.

use crate::values::Value;
use irkit_common::{IrError, IrResult, PointerType, StructType, Type};

pub fn type_of(value: &dyn Value) -> IrResult<Type> {
    value.ty()
}

/// Views `ty` as a pointer type; `context` names the operand for errors
pub fn as_pointer<'a>(ty: &'a Type, context: &str) -> IrResult<&'a PointerType> {
    match ty {
        Type::Pointer(ptr) => Ok(ptr),
        other => Err(IrError::unexpected_type(context, "pointer", other)),
    }
}

pub fn as_struct<'a>(ty: &'a Type, context: &str) -> IrResult<&'a StructType> {
    match ty {
        Type::Struct(st) => Ok(st),
        other => Err(IrError::unexpected_type(context, "struct", other)),
    }
}

/// Pointer to `elem` in the default address space
pub fn new_pointer(elem: Type) -> Type {
    Type::Pointer(PointerType::new(elem))
}

pub fn new_struct(fields: Vec<Type>) -> Type {
    Type::Struct(StructType::new(fields))
}

pub fn types_equal(a: &Type, b: &Type) -> bool {
    a == b
}

/// Pointee type of `value`'s pointer type
pub fn pointee_of(value: &dyn Value, context: &str) -> IrResult<Type> {
    let ty = type_of(value)?;
    let ptr = as_pointer(&ty, context)?;
    Ok((*ptr.elem).clone())
}
