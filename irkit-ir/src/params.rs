//! Function parameters

use crate::attrs::ParamAttr;
use crate::values::{Named, Value};
use irkit_common::{enc, IrResult, Type};
use std::cell::RefCell;

/// Function parameter
#[derive(Debug)]
pub struct Param {
    local_name: RefCell<String>,
    pub ty: Type,
    pub attrs: Vec<ParamAttr>,
}

impl Param {
    /// Parameter of type `ty`; an empty name leaves it unnamed
    pub fn new(name: &str, ty: Type) -> Self {
        Self {
            local_name: RefCell::new(name.to_string()),
            ty,
            attrs: Vec::new(),
        }
    }

    pub fn with_attr(mut self, attr: ParamAttr) -> Self {
        self.attrs.push(attr);
        self
    }

    /// Parameter definition as written in a function header, e.g.
    /// `i8* nonnull %p`. Unnamed parameters render without an identifier.
    pub fn def(&self) -> String {
        let mut buf = self.ty.to_string();
        for attr in &self.attrs {
            buf.push_str(&format!(" {attr}"));
        }
        if !self.local_name.borrow().is_empty() {
            buf.push_str(&format!(" {}", self.ident()));
        }
        buf
    }
}

impl Value for Param {
    fn ty(&self) -> IrResult<Type> {
        Ok(self.ty.clone())
    }

    fn ident(&self) -> String {
        enc::local(&self.local_name.borrow())
    }
}

impl Named for Param {
    fn name(&self) -> String {
        self.local_name.borrow().clone()
    }

    fn set_name(&self, name: &str) {
        *self.local_name.borrow_mut() = name.to_string();
    }
}
