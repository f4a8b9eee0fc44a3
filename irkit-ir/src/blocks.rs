//! Basic Block Management
//!
//! Basic blocks own their instructions and a single terminator. Blocks are
//! handed out as `Rc` so instructions and branches can refer to them while
//! the function keeps ownership of the list.

use crate::attrs::{AtomicOp, AtomicOrdering};
use crate::instructions::{
    Inst, InstAlloca, InstAtomicRMW, InstCmpXchg, InstFence, InstGetElementPtr, InstLoad, InstStore,
};
use crate::values::{Named, NamedRef, Value, ValueRef};
use irkit_common::{enc, IrError, IrResult, Type};
use std::cell::{Ref, RefCell};
use std::rc::{Rc, Weak};

/// Block terminator
#[derive(Debug)]
pub enum Term {
    /// `ret void` or `ret T %x`
    Ret(Option<ValueRef>),

    /// `br label %target`
    Br(Weak<BasicBlock>),

    Unreachable,
}

impl Term {
    /// Terminator result that takes part in local numbering. None of the
    /// current terminators yield a value.
    pub fn named_result(&self) -> Option<NamedRef> {
        match self {
            Term::Ret(_) | Term::Br(_) | Term::Unreachable => None,
        }
    }

    /// Textual form; `block` identifies the owner in errors
    pub fn def(&self, block: &str) -> IrResult<String> {
        match self {
            Term::Ret(None) => Ok("ret void".to_string()),
            Term::Ret(Some(value)) => Ok(format!("ret {}", value.type_value()?)),
            Term::Br(target) => {
                let target = target.upgrade().ok_or_else(|| IrError::DanglingBranch {
                    block: block.to_string(),
                })?;
                Ok(format!("br {}", target.type_value()?))
            }
            Term::Unreachable => Ok("unreachable".to_string()),
        }
    }
}

/// Basic Block - a sequence of instructions ending in one terminator
#[derive(Debug, Default)]
pub struct BasicBlock {
    local_name: RefCell<String>,
    insts: RefCell<Vec<Rc<Inst>>>,
    term: RefCell<Option<Term>>,
}

impl BasicBlock {
    /// New empty block; an empty name leaves it unnamed
    pub fn new(name: &str) -> Self {
        Self {
            local_name: RefCell::new(name.to_string()),
            ..Default::default()
        }
    }

    /// Non-terminator instructions in order
    pub fn insts(&self) -> Ref<'_, Vec<Rc<Inst>>> {
        self.insts.borrow()
    }

    pub fn term(&self) -> Ref<'_, Option<Term>> {
        self.term.borrow()
    }

    pub fn has_terminator(&self) -> bool {
        self.term.borrow().is_some()
    }

    /// Appends an instruction and returns it for use as an operand
    pub fn push(&self, inst: impl Into<Inst>) -> Rc<Inst> {
        let inst = Rc::new(inst.into());
        self.insts.borrow_mut().push(Rc::clone(&inst));
        inst
    }

    /// Sets the terminator, replacing any previous one
    pub fn set_term(&self, term: Term) {
        *self.term.borrow_mut() = Some(term);
    }

    pub fn new_alloca(&self, elem_type: Type) -> Rc<Inst> {
        self.push(InstAlloca::new(elem_type))
    }

    pub fn new_load(&self, src: ValueRef) -> Rc<Inst> {
        self.push(InstLoad::new(src))
    }

    pub fn new_store(&self, src: ValueRef, dst: ValueRef) -> Rc<Inst> {
        self.push(InstStore::new(src, dst))
    }

    pub fn new_fence(&self, ordering: AtomicOrdering) -> Rc<Inst> {
        self.push(InstFence::new(ordering))
    }

    pub fn new_cmpxchg(
        &self,
        ptr: ValueRef,
        cmp: ValueRef,
        new_value: ValueRef,
        success: AtomicOrdering,
        failure: AtomicOrdering,
    ) -> Rc<Inst> {
        self.push(InstCmpXchg::new(ptr, cmp, new_value, success, failure))
    }

    pub fn new_atomic_rmw(
        &self,
        op: AtomicOp,
        dst: ValueRef,
        x: ValueRef,
        ordering: AtomicOrdering,
    ) -> Rc<Inst> {
        self.push(InstAtomicRMW::new(op, dst, x, ordering))
    }

    pub fn new_getelementptr(
        &self,
        elem_type: Type,
        src: ValueRef,
        indices: Vec<ValueRef>,
    ) -> Rc<Inst> {
        self.push(InstGetElementPtr::new(elem_type, src, indices))
    }

    pub fn new_ret(&self, value: Option<ValueRef>) {
        self.set_term(Term::Ret(value));
    }

    pub fn new_br(&self, target: &Rc<BasicBlock>) {
        self.set_term(Term::Br(Rc::downgrade(target)));
    }

    pub fn new_unreachable(&self) {
        self.set_term(Term::Unreachable);
    }

    /// Block definition: label line, then one tab-indented line per
    /// instruction and the terminator
    pub fn def(&self) -> IrResult<String> {
        let ident = self.ident();
        let term = self.term.borrow();
        let term = term
            .as_ref()
            .ok_or_else(|| IrError::MissingTerminator { block: ident.clone() })?;

        let mut buf = enc::label(&self.local_name.borrow());
        buf.push('\n');
        for inst in self.insts.borrow().iter() {
            buf.push_str(&format!("\t{}\n", inst.def()?));
        }
        buf.push_str(&format!("\t{}", term.def(&ident)?));
        Ok(buf)
    }
}

impl Value for BasicBlock {
    fn ty(&self) -> IrResult<Type> {
        Ok(Type::Label)
    }

    fn ident(&self) -> String {
        enc::local(&self.local_name.borrow())
    }
}

impl Named for BasicBlock {
    fn name(&self) -> String {
        self.local_name.borrow().clone()
    }

    fn set_name(&self, name: &str) {
        *self.local_name.borrow_mut() = name.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::Const;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_basic_block() {
        let block = BasicBlock::new("entry");
        assert!(block.insts().is_empty());
        assert!(!block.has_terminator());

        block.new_alloca(Type::i32());
        assert_eq!(block.insts().len(), 1);
        assert!(!block.has_terminator());

        block.new_ret(None);
        assert!(block.has_terminator());
    }

    #[test]
    fn test_block_def() {
        let block = BasicBlock::new("entry");
        let slot = block.new_alloca(Type::i32());
        slot.set_name("slot");
        block.new_store(Rc::new(Const::i32(5)), slot.clone());
        let value = block.new_load(slot);
        value.set_name("v");
        block.new_ret(Some(value));

        let expected = indoc! {"
            entry:
            \t%slot = alloca i32
            \tstore i32 5, i32* %slot
            \t%v = load i32, i32* %slot
            \tret i32 %v"};
        assert_eq!(block.def().unwrap(), expected);
    }

    #[test]
    fn test_block_without_terminator() {
        let block = BasicBlock::new("dangling");
        block.new_fence(AtomicOrdering::SeqCst);
        assert_eq!(
            block.def().unwrap_err(),
            IrError::MissingTerminator { block: "%dangling".to_string() }
        );
    }

    #[test]
    fn test_branch_terminator() {
        let exit = Rc::new(BasicBlock::new("exit"));
        exit.new_unreachable();
        let entry = BasicBlock::new("entry");
        entry.new_br(&exit);
        assert_eq!(entry.def().unwrap(), "entry:\n\tbr label %exit");
        assert_eq!(exit.def().unwrap(), "exit:\n\tunreachable");

        drop(exit);
        assert_eq!(
            entry.def().unwrap_err(),
            IrError::DanglingBranch { block: "%entry".to_string() }
        );
    }
}
