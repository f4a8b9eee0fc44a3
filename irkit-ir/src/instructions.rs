//! Memory instructions
//!
//! Each instruction owns its flags and a lazily computed result type. The
//! type is inferred from the operands on first query and cached for the
//! lifetime of the instruction; operands are shared references and are never
//! re-inspected once the cache is filled.

use crate::attrs::{AtomicOp, AtomicOrdering};
use crate::typeres::{new_pointer, new_struct, pointee_of, type_of};
use crate::values::{Named, Value, ValueRef};
use irkit_common::{enc, IrResult, Type};
use log::warn;
use once_cell::unsync::OnceCell;
use std::cell::RefCell;

macro_rules! impl_named {
    ($($inst:ty),* $(,)?) => {$(
        impl Named for $inst {
            fn name(&self) -> String {
                self.local_name.borrow().clone()
            }

            fn set_name(&self, name: &str) {
                *self.local_name.borrow_mut() = name.to_string();
            }
        }
    )*};
}

fn push_sync_scope(buf: &mut String, sync_scope: &Option<String>) {
    if let Some(scope) = sync_scope {
        buf.push_str(&format!(" syncscope({})", enc::quote(scope)));
    }
}

fn push_align(buf: &mut String, align: Option<u32>) {
    if let Some(align) = align {
        buf.push_str(&format!(", align {align}"));
    }
}

// ===== alloca =====

/// Stack allocation: `%x = alloca T`
#[derive(Debug)]
pub struct InstAlloca {
    local_name: RefCell<String>,
    pub elem_type: Type,
    /// Number of elements; a single element when absent
    pub nelems: Option<ValueRef>,
    typ: OnceCell<Type>,
    pub in_alloca: bool,
    pub swift_error: bool,
    pub align: Option<u32>,
}

impl InstAlloca {
    pub fn new(elem_type: Type) -> Self {
        Self {
            local_name: RefCell::default(),
            elem_type,
            nelems: None,
            typ: OnceCell::new(),
            in_alloca: false,
            swift_error: false,
            align: None,
        }
    }

    pub fn def(&self) -> IrResult<String> {
        let mut buf = format!("{} = alloca", self.ident());
        if self.in_alloca {
            buf.push_str(" inalloca");
        }
        if self.swift_error {
            buf.push_str(" swifterror");
        }
        buf.push_str(&format!(" {}", self.elem_type));
        if let Some(nelems) = &self.nelems {
            buf.push_str(&format!(", {}", nelems.type_value()?));
        }
        push_align(&mut buf, self.align);
        Ok(buf)
    }
}

impl Value for InstAlloca {
    fn ty(&self) -> IrResult<Type> {
        Ok(self.typ.get_or_init(|| new_pointer(self.elem_type.clone())).clone())
    }

    fn ident(&self) -> String {
        enc::local(&self.local_name.borrow())
    }
}

// ===== load =====

/// Load: `%x = load T, T* %src`
#[derive(Debug)]
pub struct InstLoad {
    local_name: RefCell<String>,
    pub src: ValueRef,
    typ: OnceCell<Type>,
    pub atomic: bool,
    pub volatile: bool,
    pub sync_scope: Option<String>,
    pub ordering: Option<AtomicOrdering>,
    pub align: Option<u32>,
}

impl InstLoad {
    pub fn new(src: ValueRef) -> Self {
        Self {
            local_name: RefCell::default(),
            src,
            typ: OnceCell::new(),
            atomic: false,
            volatile: false,
            sync_scope: None,
            ordering: None,
            align: None,
        }
    }

    pub fn def(&self) -> IrResult<String> {
        let mut buf = format!("{} = load", self.ident());
        if self.atomic {
            buf.push_str(" atomic");
        }
        if self.volatile {
            buf.push_str(" volatile");
        }
        buf.push_str(&format!(" {}, {}", self.ty()?, self.src.type_value()?));
        push_sync_scope(&mut buf, &self.sync_scope);
        if let Some(ordering) = self.ordering {
            buf.push_str(&format!(" {ordering}"));
        }
        push_align(&mut buf, self.align);
        Ok(buf)
    }
}

impl Value for InstLoad {
    fn ty(&self) -> IrResult<Type> {
        self.typ
            .get_or_try_init(|| pointee_of(self.src.as_ref(), "load source"))
            .cloned()
    }

    fn ident(&self) -> String {
        enc::local(&self.local_name.borrow())
    }
}

// ===== store =====

/// Store: `store T %src, T* %dst`; produces no value
#[derive(Debug)]
pub struct InstStore {
    pub src: ValueRef,
    pub dst: ValueRef,
    pub atomic: bool,
    pub volatile: bool,
    pub sync_scope: Option<String>,
    pub ordering: Option<AtomicOrdering>,
    pub align: Option<u32>,
}

impl InstStore {
    pub fn new(src: ValueRef, dst: ValueRef) -> Self {
        Self {
            src,
            dst,
            atomic: false,
            volatile: false,
            sync_scope: None,
            ordering: None,
            align: None,
        }
    }

    pub fn def(&self) -> IrResult<String> {
        let mut buf = String::from("store");
        if self.atomic {
            buf.push_str(" atomic");
        }
        if self.volatile {
            buf.push_str(" volatile");
        }
        buf.push_str(&format!(" {}, {}", self.src.type_value()?, self.dst.type_value()?));
        push_sync_scope(&mut buf, &self.sync_scope);
        if let Some(ordering) = self.ordering {
            buf.push_str(&format!(" {ordering}"));
        }
        push_align(&mut buf, self.align);
        Ok(buf)
    }
}

// ===== fence =====

/// Fence: `fence seq_cst`; produces no value
#[derive(Debug)]
pub struct InstFence {
    pub ordering: AtomicOrdering,
    pub sync_scope: Option<String>,
}

impl InstFence {
    pub fn new(ordering: AtomicOrdering) -> Self {
        Self { ordering, sync_scope: None }
    }

    pub fn def(&self) -> String {
        let mut buf = String::from("fence");
        push_sync_scope(&mut buf, &self.sync_scope);
        buf.push_str(&format!(" {}", self.ordering));
        buf
    }
}

// ===== cmpxchg =====

/// Compare-exchange. The result is `{ T, i1 }`: the old value and a
/// success flag.
#[derive(Debug)]
pub struct InstCmpXchg {
    local_name: RefCell<String>,
    pub ptr: ValueRef,
    pub cmp: ValueRef,
    pub new_value: ValueRef,
    pub success: AtomicOrdering,
    pub failure: AtomicOrdering,
    typ: OnceCell<Type>,
    pub weak: bool,
    pub volatile: bool,
    pub sync_scope: Option<String>,
}

impl InstCmpXchg {
    pub fn new(
        ptr: ValueRef,
        cmp: ValueRef,
        new_value: ValueRef,
        success: AtomicOrdering,
        failure: AtomicOrdering,
    ) -> Self {
        Self {
            local_name: RefCell::default(),
            ptr,
            cmp,
            new_value,
            success,
            failure,
            typ: OnceCell::new(),
            weak: false,
            volatile: false,
            sync_scope: None,
        }
    }

    pub fn def(&self) -> IrResult<String> {
        let mut buf = format!("{} = cmpxchg", self.ident());
        if self.weak {
            buf.push_str(" weak");
        }
        if self.volatile {
            buf.push_str(" volatile");
        }
        buf.push_str(&format!(
            " {}, {}, {}",
            self.ptr.type_value()?,
            self.cmp.type_value()?,
            self.new_value.type_value()?
        ));
        push_sync_scope(&mut buf, &self.sync_scope);
        buf.push_str(&format!(" {} {}", self.success, self.failure));
        Ok(buf)
    }
}

impl Value for InstCmpXchg {
    fn ty(&self) -> IrResult<Type> {
        self.typ
            .get_or_try_init(|| {
                let old_type = type_of(self.new_value.as_ref())?;
                Ok(new_struct(vec![old_type, Type::i1()]))
            })
            .cloned()
    }

    fn ident(&self) -> String {
        enc::local(&self.local_name.borrow())
    }
}

// ===== atomicrmw =====

/// Atomic read-modify-write; yields the value previously at `dst`
#[derive(Debug)]
pub struct InstAtomicRMW {
    local_name: RefCell<String>,
    pub op: AtomicOp,
    pub dst: ValueRef,
    pub x: ValueRef,
    pub ordering: AtomicOrdering,
    typ: OnceCell<Type>,
    pub volatile: bool,
    pub sync_scope: Option<String>,
}

impl InstAtomicRMW {
    pub fn new(op: AtomicOp, dst: ValueRef, x: ValueRef, ordering: AtomicOrdering) -> Self {
        Self {
            local_name: RefCell::default(),
            op,
            dst,
            x,
            ordering,
            typ: OnceCell::new(),
            volatile: false,
            sync_scope: None,
        }
    }

    pub fn def(&self) -> IrResult<String> {
        let mut buf = format!("{} = atomicrmw", self.ident());
        if self.volatile {
            buf.push_str(" volatile");
        }
        buf.push_str(&format!(
            " {} {}, {}",
            self.op,
            self.dst.type_value()?,
            self.x.type_value()?
        ));
        push_sync_scope(&mut buf, &self.sync_scope);
        buf.push_str(&format!(" {}", self.ordering));
        Ok(buf)
    }
}

impl Value for InstAtomicRMW {
    fn ty(&self) -> IrResult<Type> {
        self.typ
            .get_or_try_init(|| pointee_of(self.dst.as_ref(), "atomicrmw destination"))
            .cloned()
    }

    fn ident(&self) -> String {
        enc::local(&self.local_name.borrow())
    }
}

// ===== getelementptr =====

/// Address computation over `src` with the given indices
#[derive(Debug)]
pub struct InstGetElementPtr {
    local_name: RefCell<String>,
    pub elem_type: Type,
    pub src: ValueRef,
    pub indices: Vec<ValueRef>,
    typ: OnceCell<Type>,
    pub in_bounds: bool,
}

impl InstGetElementPtr {
    pub fn new(elem_type: Type, src: ValueRef, indices: Vec<ValueRef>) -> Self {
        Self {
            local_name: RefCell::default(),
            elem_type,
            src,
            indices,
            typ: OnceCell::new(),
            in_bounds: false,
        }
    }

    pub fn def(&self) -> IrResult<String> {
        let mut buf = format!("{} = getelementptr", self.ident());
        if self.in_bounds {
            buf.push_str(" inbounds");
        }
        buf.push_str(&format!(" {}, {}", self.elem_type, self.src.type_value()?));
        for index in &self.indices {
            buf.push_str(&format!(", {}", index.type_value()?));
        }
        Ok(buf)
    }
}

impl Value for InstGetElementPtr {
    fn ty(&self) -> IrResult<Type> {
        Ok(self.typ.get_or_init(|| new_pointer(self.elem_type.clone())).clone())
    }

    fn ident(&self) -> String {
        enc::local(&self.local_name.borrow())
    }
}

impl_named!(InstAlloca, InstLoad, InstCmpXchg, InstAtomicRMW, InstGetElementPtr);

// ===== instruction sum type =====

/// Non-terminator instruction
#[derive(Debug)]
pub enum Inst {
    Alloca(InstAlloca),
    Load(InstLoad),
    Store(InstStore),
    Fence(InstFence),
    CmpXchg(InstCmpXchg),
    AtomicRMW(InstAtomicRMW),
    GetElementPtr(InstGetElementPtr),
}

impl Inst {
    pub fn opcode(&self) -> &'static str {
        match self {
            Inst::Alloca(_) => "alloca",
            Inst::Load(_) => "load",
            Inst::Store(_) => "store",
            Inst::Fence(_) => "fence",
            Inst::CmpXchg(_) => "cmpxchg",
            Inst::AtomicRMW(_) => "atomicrmw",
            Inst::GetElementPtr(_) => "getelementptr",
        }
    }

    /// Reports whether the instruction produces no value
    pub fn is_void(&self) -> bool {
        matches!(self, Inst::Store(_) | Inst::Fence(_))
    }

    /// Result-producing view of the instruction
    pub fn as_named(&self) -> Option<&dyn Named> {
        match self {
            Inst::Alloca(inst) => Some(inst),
            Inst::Load(inst) => Some(inst),
            Inst::CmpXchg(inst) => Some(inst),
            Inst::AtomicRMW(inst) => Some(inst),
            Inst::GetElementPtr(inst) => Some(inst),
            Inst::Store(_) | Inst::Fence(_) => None,
        }
    }

    /// Textual form of the instruction, without indentation
    pub fn def(&self) -> IrResult<String> {
        match self {
            Inst::Alloca(inst) => inst.def(),
            Inst::Load(inst) => inst.def(),
            Inst::Store(inst) => inst.def(),
            Inst::Fence(inst) => Ok(inst.def()),
            Inst::CmpXchg(inst) => inst.def(),
            Inst::AtomicRMW(inst) => inst.def(),
            Inst::GetElementPtr(inst) => inst.def(),
        }
    }
}

impl Value for Inst {
    fn ty(&self) -> IrResult<Type> {
        match self.as_named() {
            Some(named) => named.ty(),
            None => Ok(Type::Void),
        }
    }

    /// Void instructions have no identifier and render as an empty string
    fn ident(&self) -> String {
        self.as_named().map(|named| named.ident()).unwrap_or_default()
    }
}

impl Named for Inst {
    fn name(&self) -> String {
        self.as_named().map(|named| named.name()).unwrap_or_default()
    }

    fn set_name(&self, name: &str) {
        match self.as_named() {
            Some(named) => named.set_name(name),
            None => warn!("ignoring name {:?} on void {} instruction", name, self.opcode()),
        }
    }
}

impl From<InstAlloca> for Inst {
    fn from(inst: InstAlloca) -> Self {
        Inst::Alloca(inst)
    }
}

impl From<InstLoad> for Inst {
    fn from(inst: InstLoad) -> Self {
        Inst::Load(inst)
    }
}

impl From<InstStore> for Inst {
    fn from(inst: InstStore) -> Self {
        Inst::Store(inst)
    }
}

impl From<InstFence> for Inst {
    fn from(inst: InstFence) -> Self {
        Inst::Fence(inst)
    }
}

impl From<InstCmpXchg> for Inst {
    fn from(inst: InstCmpXchg) -> Self {
        Inst::CmpXchg(inst)
    }
}

impl From<InstAtomicRMW> for Inst {
    fn from(inst: InstAtomicRMW) -> Self {
        Inst::AtomicRMW(inst)
    }
}

impl From<InstGetElementPtr> for Inst {
    fn from(inst: InstGetElementPtr) -> Self {
        Inst::GetElementPtr(inst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::Const;
    use crate::params::Param;
    use irkit_common::IrError;
    use pretty_assertions::assert_eq;
    use std::rc::Rc;

    fn param(name: &str, ty: Type) -> ValueRef {
        Rc::new(Param::new(name, ty))
    }

    fn named<T: Named>(inst: T, name: &str) -> T {
        inst.set_name(name);
        inst
    }

    #[test]
    fn test_alloca_type_and_def() {
        let mut alloca = named(InstAlloca::new(Type::i32()), "x");
        assert_eq!(alloca.ty().unwrap(), Type::ptr(Type::i32()));
        assert_eq!(alloca.type_value().unwrap(), "i32* %x");
        assert_eq!(alloca.def().unwrap(), "%x = alloca i32");

        alloca.nelems = Some(Rc::new(Const::i32(4)));
        alloca.align = Some(16);
        alloca.in_alloca = true;
        assert_eq!(alloca.def().unwrap(), "%x = alloca inalloca i32, i32 4, align 16");
    }

    #[test]
    fn test_load_infers_pointee() {
        let src = param("p", Type::ptr(Type::array(3, Type::i8())));
        let load = named(InstLoad::new(src), "v");
        assert_eq!(load.ty().unwrap(), Type::array(3, Type::i8()));
        assert_eq!(load.def().unwrap(), "%v = load [3 x i8], [3 x i8]* %p");
    }

    #[test]
    fn test_load_from_alloca() {
        let alloca: Rc<Inst> = Rc::new(named(InstAlloca::new(Type::i64()), "slot").into());
        let load = named(InstLoad::new(alloca), "v");
        assert_eq!(load.ty().unwrap(), Type::i64());
    }

    #[test]
    fn test_load_of_non_pointer_is_an_error() {
        let load = InstLoad::new(param("n", Type::i32()));
        assert_eq!(
            load.ty().unwrap_err(),
            IrError::unexpected_type("load source", "pointer", &Type::i32())
        );
        assert!(load.def().is_err());
    }

    #[test]
    fn test_load_type_is_cached() {
        let mut load = InstLoad::new(param("p", Type::ptr(Type::i32())));
        assert_eq!(load.ty().unwrap(), Type::i32());

        load.src = param("q", Type::ptr(Type::i8()));
        assert_eq!(load.ty().unwrap(), Type::i32());
        assert_eq!(load.ty().unwrap(), load.ty().unwrap());
    }

    #[test]
    fn test_atomic_load_def() {
        let mut load = named(InstLoad::new(param("p", Type::ptr(Type::i32()))), "v");
        load.atomic = true;
        load.volatile = true;
        load.sync_scope = Some("singlethread".to_string());
        load.ordering = Some(AtomicOrdering::Acquire);
        load.align = Some(4);
        assert_eq!(
            load.def().unwrap(),
            "%v = load atomic volatile i32, i32* %p syncscope(\"singlethread\") acquire, align 4"
        );
    }

    #[test]
    fn test_store_def() {
        let mut store = InstStore::new(Rc::new(Const::i32(7)), param("p", Type::ptr(Type::i32())));
        assert_eq!(store.def().unwrap(), "store i32 7, i32* %p");

        store.atomic = true;
        store.ordering = Some(AtomicOrdering::Release);
        store.align = Some(4);
        assert_eq!(store.def().unwrap(), "store atomic i32 7, i32* %p release, align 4");
    }

    #[test]
    fn test_fence_def() {
        let mut fence = InstFence::new(AtomicOrdering::SeqCst);
        assert_eq!(fence.def(), "fence seq_cst");

        fence.sync_scope = Some("agent".to_string());
        assert_eq!(fence.def(), "fence syncscope(\"agent\") seq_cst");
    }

    #[test]
    fn test_cmpxchg_result_shape() {
        for ty in [Type::i8(), Type::i64(), Type::ptr(Type::i32())] {
            let ptr = param("p", Type::ptr(ty.clone()));
            let cmp = param("c", ty.clone());
            let new_value = param("n", ty.clone());
            let inst = InstCmpXchg::new(
                ptr,
                cmp,
                new_value,
                AtomicOrdering::SeqCst,
                AtomicOrdering::Monotonic,
            );

            let result = inst.ty().unwrap();
            let fields = &crate::typeres::as_struct(&result, "cmpxchg result").unwrap().fields;
            assert_eq!(fields.len(), 2);
            assert_eq!(fields[0], ty);
            assert_eq!(fields[1], Type::i1());
        }
    }

    #[test]
    fn test_cmpxchg_def() {
        let mut inst = named(
            InstCmpXchg::new(
                param("p", Type::ptr(Type::i32())),
                param("old", Type::i32()),
                Rc::new(Const::i32(1)),
                AtomicOrdering::AcqRel,
                AtomicOrdering::Monotonic,
            ),
            "r",
        );
        assert_eq!(inst.def().unwrap(), "%r = cmpxchg i32* %p, i32 %old, i32 1 acq_rel monotonic");

        inst.weak = true;
        inst.volatile = true;
        inst.sync_scope = Some("singlethread".to_string());
        assert_eq!(
            inst.def().unwrap(),
            "%r = cmpxchg weak volatile i32* %p, i32 %old, i32 1 syncscope(\"singlethread\") acq_rel monotonic"
        );
        assert_eq!(inst.type_value().unwrap(), "{ i32, i1 } %r");
    }

    #[test]
    fn test_atomicrmw() {
        let dst = param("counter", Type::ptr(Type::i64()));
        let inst = named(
            InstAtomicRMW::new(AtomicOp::Add, dst, Rc::new(Const::i64(1)), AtomicOrdering::SeqCst),
            "old",
        );
        assert_eq!(inst.ty().unwrap(), Type::i64());
        assert_eq!(inst.def().unwrap(), "%old = atomicrmw add i64* %counter, i64 1 seq_cst");

        let bad = InstAtomicRMW::new(
            AtomicOp::Xchg,
            param("v", Type::i64()),
            Rc::new(Const::i64(1)),
            AtomicOrdering::SeqCst,
        );
        assert!(matches!(bad.ty(), Err(IrError::UnexpectedType { .. })));
    }

    #[test]
    fn test_getelementptr() {
        let st = Type::struct_of(vec![Type::i32(), Type::i64()]);
        let mut gep = named(
            InstGetElementPtr::new(
                st.clone(),
                param("s", Type::ptr(st)),
                vec![Rc::new(Const::i32(0)) as ValueRef, Rc::new(Const::i32(1))],
            ),
            "f",
        );
        gep.in_bounds = true;
        assert_eq!(gep.ty().unwrap(), Type::ptr(Type::struct_of(vec![Type::i32(), Type::i64()])));
        assert_eq!(
            gep.def().unwrap(),
            "%f = getelementptr inbounds { i32, i64 }, { i32, i64 }* %s, i32 0, i32 1"
        );
    }

    #[test]
    fn test_inst_sum_type() {
        let store: Inst =
            InstStore::new(Rc::new(Const::i32(0)), param("p", Type::ptr(Type::i32()))).into();
        assert!(store.is_void());
        assert_eq!(store.ty().unwrap(), Type::Void);
        assert_eq!(store.name(), "");
        store.set_name("ignored");
        assert_eq!(store.name(), "");

        let alloca: Inst = InstAlloca::new(Type::i8()).into();
        assert!(!alloca.is_void());
        alloca.set_name("buf");
        assert_eq!(alloca.ident(), "%buf");
        assert_eq!(alloca.opcode(), "alloca");
        assert_eq!(alloca.def().unwrap(), "%buf = alloca i8");
    }
}
