//! LLVM type system
//!
//! Defines the first-class and aggregate types values can carry, together
//! with their canonical textual form.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Floating-point kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FloatKind {
    Half,
    Float,
    Double,
    Fp128,
}

impl fmt::Display for FloatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind_str = match self {
            FloatKind::Half => "half",
            FloatKind::Float => "float",
            FloatKind::Double => "double",
            FloatKind::Fp128 => "fp128",
        };
        write!(f, "{}", kind_str)
    }
}

/// Integer type with an arbitrary bit width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntType {
    pub bits: u32,
}

impl fmt::Display for IntType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "i{}", self.bits)
    }
}

/// Pointer type `T*`, optionally in a non-default address space
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PointerType {
    pub elem: Box<Type>,
    pub addr_space: u32,
}

impl PointerType {
    /// Pointer to `elem` in the default address space
    pub fn new(elem: Type) -> Self {
        Self {
            elem: Box::new(elem),
            addr_space: 0,
        }
    }
}

impl fmt::Display for PointerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.addr_space != 0 {
            write!(f, "{} addrspace({})*", self.elem, self.addr_space)
        } else {
            write!(f, "{}*", self.elem)
        }
    }
}

/// Array type `[N x T]`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArrayType {
    pub len: u64,
    pub elem: Box<Type>,
}

impl fmt::Display for ArrayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} x {}]", self.len, self.elem)
    }
}

/// Literal struct type `{ T1, T2 }`, or `<{ T1, T2 }>` when packed
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructType {
    pub fields: Vec<Type>,
    pub packed: bool,
}

impl StructType {
    pub fn new(fields: Vec<Type>) -> Self {
        Self { fields, packed: false }
    }
}

impl fmt::Display for StructType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.packed {
            write!(f, "<")?;
        }
        if self.fields.is_empty() {
            write!(f, "{{}}")?;
        } else {
            write!(f, "{{ ")?;
            for (i, field) in self.fields.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{field}")?;
            }
            write!(f, " }}")?;
        }
        if self.packed {
            write!(f, ">")?;
        }
        Ok(())
    }
}

/// Function signature type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FuncType {
    pub ret: Box<Type>,
    pub params: Vec<Type>,
    pub variadic: bool,
}

impl FuncType {
    pub fn new(ret: Type, params: Vec<Type>) -> Self {
        Self {
            ret: Box::new(ret),
            params,
            variadic: false,
        }
    }
}

impl fmt::Display for FuncType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (", self.ret)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{param}")?;
        }
        if self.variadic {
            if !self.params.is_empty() {
                write!(f, ", ")?;
            }
            write!(f, "...")?;
        }
        write!(f, ")")
    }
}

/// IR type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    /// Void type (instructions without a result)
    Void,

    /// Label type (basic blocks)
    Label,

    Int(IntType),
    Float(FloatKind),
    Pointer(PointerType),
    Array(ArrayType),
    Struct(StructType),
    Func(FuncType),
}

impl Type {
    pub fn int(bits: u32) -> Self {
        Type::Int(IntType { bits })
    }

    pub fn i1() -> Self {
        Type::int(1)
    }

    pub fn i8() -> Self {
        Type::int(8)
    }

    pub fn i16() -> Self {
        Type::int(16)
    }

    pub fn i32() -> Self {
        Type::int(32)
    }

    pub fn i64() -> Self {
        Type::int(64)
    }

    /// Pointer to `elem` in address space 0
    pub fn ptr(elem: Type) -> Self {
        Type::Pointer(PointerType::new(elem))
    }

    pub fn ptr_in(elem: Type, addr_space: u32) -> Self {
        Type::Pointer(PointerType {
            elem: Box::new(elem),
            addr_space,
        })
    }

    pub fn array(len: u64, elem: Type) -> Self {
        Type::Array(ArrayType { len, elem: Box::new(elem) })
    }

    pub fn struct_of(fields: Vec<Type>) -> Self {
        Type::Struct(StructType::new(fields))
    }

    pub fn packed_struct(fields: Vec<Type>) -> Self {
        Type::Struct(StructType { fields, packed: true })
    }

    pub fn func(ret: Type, params: Vec<Type>) -> Self {
        Type::Func(FuncType::new(ret, params))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, Type::Pointer(_))
    }

    pub fn is_struct(&self) -> bool {
        matches!(self, Type::Struct(_))
    }

    /// Pointee type, if this is a pointer
    pub fn pointee(&self) -> Option<&Type> {
        match self {
            Type::Pointer(ptr) => Some(&ptr.elem),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => write!(f, "void"),
            Type::Label => write!(f, "label"),
            Type::Int(int) => write!(f, "{int}"),
            Type::Float(kind) => write!(f, "{kind}"),
            Type::Pointer(ptr) => write!(f, "{ptr}"),
            Type::Array(array) => write!(f, "{array}"),
            Type::Struct(st) => write!(f, "{st}"),
            Type::Func(sig) => write!(f, "{sig}"),
        }
    }
}

impl From<IntType> for Type {
    fn from(int: IntType) -> Self {
        Type::Int(int)
    }
}

impl From<PointerType> for Type {
    fn from(ptr: PointerType) -> Self {
        Type::Pointer(ptr)
    }
}

impl From<StructType> for Type {
    fn from(st: StructType) -> Self {
        Type::Struct(st)
    }
}

impl From<FuncType> for Type {
    fn from(sig: FuncType) -> Self {
        Type::Func(sig)
    }
}
