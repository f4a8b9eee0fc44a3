//! Value and named-value model
//!
//! Every IR entity that can appear as an operand implements [`Value`];
//! entities with a bare name that the numbering pass may assign also
//! implement [`Named`].

use irkit_common::{IrResult, Type};
use std::fmt;
use std::rc::Rc;

/// Anything with a type that can be used as an operand
pub trait Value: fmt::Debug {
    /// Type of the value
    fn ty(&self) -> IrResult<Type>;

    /// Identifier (or literal) used when the value appears as an operand
    fn ident(&self) -> String;

    /// Type-value pair, e.g. `i32* %2`
    fn type_value(&self) -> IrResult<String> {
        Ok(format!("{} {}", self.ty()?, self.ident()))
    }
}

/// Value with a bare name; an empty name means unnamed
pub trait Named: Value {
    fn name(&self) -> String;

    /// Replaces the bare name. No uniqueness check happens here.
    fn set_name(&self, name: &str);
}

/// Marker for values usable as function prefix, prologue or personality
pub trait Constant: Value {}

/// Shared, non-owning operand reference
pub type ValueRef = Rc<dyn Value>;

pub type NamedRef = Rc<dyn Named>;

pub type ConstantRef = Rc<dyn Constant>;
