//! Function Definitions
//!
//! A function owns its signature, parameters and basic blocks together with
//! the optional header attributes. With no basic blocks it renders as a
//! declaration; appending the first block turns it into a definition.

use crate::attrs::{
    CallingConv, DllStorageClass, FuncAttr, Linkage, ParamAttr, Preemption, UnnamedAddr, Visibility,
};
use crate::blocks::BasicBlock;
use crate::numbering::{self, LocalIds};
use crate::params::Param;
use crate::typeres::new_pointer;
use crate::values::{Constant, ConstantRef, Named, Value};
use irkit_common::{enc, FuncType, IrResult, Type};
use log::debug;
use once_cell::unsync::OnceCell;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Comdat reference, rendered as `comdat($name)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComdatRef {
    pub name: String,
}

impl fmt::Display for ComdatRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "comdat({})", enc::comdat(&self.name))
    }
}

/// Function in IR
#[derive(Debug)]
pub struct Function {
    global_name: RefCell<String>,
    sig: FuncType,
    params: Vec<Rc<Param>>,
    blocks: Vec<Rc<BasicBlock>>,
    typ: OnceCell<Type>,

    pub linkage: Option<Linkage>,
    pub preemption: Option<Preemption>,
    pub visibility: Option<Visibility>,
    pub dll_storage_class: Option<DllStorageClass>,
    pub calling_conv: Option<CallingConv>,
    pub return_attrs: Vec<ParamAttr>,
    pub unnamed_addr: Option<UnnamedAddr>,
    pub func_attrs: Vec<FuncAttr>,
    pub section: Option<String>,
    pub comdat: Option<ComdatRef>,
    /// Garbage collector strategy
    pub gc: Option<String>,
    pub prefix: Option<ConstantRef>,
    pub prologue: Option<ConstantRef>,
    pub personality: Option<ConstantRef>,
}

impl Function {
    /// New function declaration; the signature is derived from the return
    /// type and the parameter types
    pub fn new(name: &str, ret_type: Type, params: Vec<Param>) -> Self {
        let param_types = params.iter().map(|param| param.ty.clone()).collect();
        Self {
            global_name: RefCell::new(name.to_string()),
            sig: FuncType::new(ret_type, param_types),
            params: params.into_iter().map(Rc::new).collect(),
            blocks: Vec::new(),
            typ: OnceCell::new(),
            linkage: None,
            preemption: None,
            visibility: None,
            dll_storage_class: None,
            calling_conv: None,
            return_attrs: Vec::new(),
            unnamed_addr: None,
            func_attrs: Vec::new(),
            section: None,
            comdat: None,
            gc: None,
            prefix: None,
            prologue: None,
            personality: None,
        }
    }

    /// Marks the signature as variadic and drops any cached type
    pub fn variadic(mut self) -> Self {
        self.sig.variadic = true;
        self.typ = OnceCell::new();
        self
    }

    pub fn sig(&self) -> &FuncType {
        &self.sig
    }

    pub fn params(&self) -> &[Rc<Param>] {
        &self.params
    }

    pub fn blocks(&self) -> &[Rc<BasicBlock>] {
        &self.blocks
    }

    pub fn is_declaration(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn append_block(&mut self, block: BasicBlock) -> Rc<BasicBlock> {
        let block = Rc::new(block);
        if self.blocks.is_empty() {
            debug!("{} becomes a definition", self.ident());
        }
        self.blocks.push(Rc::clone(&block));
        block
    }

    /// Appends a new empty block; an empty name leaves it unnamed
    pub fn new_block(&mut self, name: &str) -> Rc<BasicBlock> {
        self.append_block(BasicBlock::new(name))
    }

    /// Assigns sequential IDs to unnamed parameters, blocks and
    /// instructions
    pub fn assign_ids(&self) -> IrResult<LocalIds> {
        numbering::assign_ids(self)
    }

    /// Textual declaration or definition of the function
    pub fn def(&self) -> IrResult<String> {
        let mut buf = String::new();
        if self.is_declaration() {
            buf.push_str("declare");
            if let Some(linkage) = self.linkage.filter(Linkage::is_external_only) {
                buf.push_str(&format!(" {linkage}"));
            }
            buf.push_str(&self.header()?);
            return Ok(buf);
        }
        buf.push_str("define");
        if let Some(linkage) = self.linkage {
            buf.push_str(&format!(" {linkage}"));
        }
        buf.push_str(&self.header()?);
        buf.push_str(&format!(" {}", self.body()?));
        Ok(buf)
    }

    fn header(&self) -> IrResult<String> {
        let mut buf = String::new();
        if let Some(preemption) = self.preemption {
            buf.push_str(&format!(" {preemption}"));
        }
        if let Some(visibility) = self.visibility {
            buf.push_str(&format!(" {visibility}"));
        }
        if let Some(dll_storage_class) = self.dll_storage_class {
            buf.push_str(&format!(" {dll_storage_class}"));
        }
        if let Some(calling_conv) = self.calling_conv {
            buf.push_str(&format!(" {calling_conv}"));
        }
        for attr in &self.return_attrs {
            buf.push_str(&format!(" {attr}"));
        }
        buf.push_str(&format!(" {} {}(", self.sig.ret, self.ident()));
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                buf.push_str(", ");
            }
            buf.push_str(&param.def());
        }
        if self.sig.variadic {
            if !self.params.is_empty() {
                buf.push_str(", ");
            }
            buf.push_str("...");
        }
        buf.push(')');
        if let Some(unnamed_addr) = self.unnamed_addr {
            buf.push_str(&format!(" {unnamed_addr}"));
        }
        for attr in &self.func_attrs {
            buf.push_str(&format!(" {attr}"));
        }
        if let Some(section) = &self.section {
            buf.push_str(&format!(" section {}", enc::quote(section)));
        }
        if let Some(comdat) = &self.comdat {
            buf.push_str(&format!(" {comdat}"));
        }
        if let Some(gc) = &self.gc {
            buf.push_str(&format!(" gc {}", enc::quote(gc)));
        }
        if let Some(prefix) = &self.prefix {
            buf.push_str(&format!(" prefix {}", prefix.type_value()?));
        }
        if let Some(prologue) = &self.prologue {
            buf.push_str(&format!(" prologue {}", prologue.type_value()?));
        }
        if let Some(personality) = &self.personality {
            buf.push_str(&format!(" personality {}", personality.type_value()?));
        }
        Ok(buf)
    }

    fn body(&self) -> IrResult<String> {
        let mut buf = String::from("{\n");
        for block in &self.blocks {
            buf.push_str(&block.def()?);
            buf.push('\n');
        }
        buf.push('}');
        Ok(buf)
    }
}

impl Value for Function {
    /// Pointer to the function signature
    fn ty(&self) -> IrResult<Type> {
        Ok(self.typ.get_or_init(|| new_pointer(Type::Func(self.sig.clone()))).clone())
    }

    fn ident(&self) -> String {
        enc::global(&self.global_name.borrow())
    }
}

impl Named for Function {
    fn name(&self) -> String {
        self.global_name.borrow().clone()
    }

    fn set_name(&self, name: &str) {
        *self.global_name.borrow_mut() = name.to_string();
    }
}

impl Constant for Function {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::Const;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_function() {
        let function = Function::new(
            "add",
            Type::i32(),
            vec![Param::new("a", Type::i32()), Param::new("b", Type::i32())],
        );
        assert_eq!(function.params().len(), 2);
        assert_eq!(*function.sig().ret, Type::i32());
        assert!(function.is_declaration());
        assert_eq!(function.type_value().unwrap(), "i32 (i32, i32)* @add");
    }

    #[test]
    fn test_plain_declaration() {
        let function =
            Function::new("puts", Type::i32(), vec![Param::new("", Type::ptr(Type::i8()))]);
        assert_eq!(function.def().unwrap(), "declare i32 @puts(i8*)");
    }

    #[test]
    fn test_unnamed_params_get_ids_in_definitions() {
        let mut function = Function::new("id", Type::i32(), vec![Param::new("", Type::i32())]);
        let x = function.params()[0].clone();
        function.new_block("entry").new_ret(Some(x));
        function.assign_ids().unwrap();
        assert_eq!(function.def().unwrap(), "define i32 @id(i32 %0) {\nentry:\n\tret i32 %0\n}");
    }

    #[test]
    fn test_variadic_declaration() {
        let printf = Function::new(
            "printf",
            Type::i32(),
            vec![Param::new("fmt", Type::ptr(Type::i8()))],
        )
        .variadic();
        assert_eq!(printf.def().unwrap(), "declare i32 @printf(i8* %fmt, ...)");

        let bare = Function::new("f", Type::Void, vec![]).variadic();
        assert_eq!(bare.def().unwrap(), "declare void @f(...)");
        assert_eq!(bare.ty().unwrap(), Type::ptr(Type::Func(bare.sig().clone())));
    }

    #[test]
    fn test_variadic_after_type_query() {
        let function =
            Function::new("log", Type::Void, vec![Param::new("fmt", Type::ptr(Type::i8()))]);
        let fixed = function.ty().unwrap();
        assert_eq!(fixed.to_string(), "void (i8*)*");

        let function = function.variadic();
        assert_eq!(function.ty().unwrap(), Type::ptr(Type::Func(function.sig().clone())));
        assert_eq!(function.type_value().unwrap(), "void (i8*, ...)* @log");
        assert_eq!(function.def().unwrap(), "declare void @log(i8* %fmt, ...)");
    }

    #[test]
    fn test_declaration_linkage() {
        let mut function = Function::new("ext", Type::Void, vec![]);
        function.linkage = Some(Linkage::ExternWeak);
        assert_eq!(function.def().unwrap(), "declare extern_weak void @ext()");

        function.linkage = Some(Linkage::Internal);
        assert_eq!(function.def().unwrap(), "declare void @ext()");
    }

    #[test]
    fn test_header_order() {
        let mut function = Function::new("hot", Type::ptr(Type::i8()), vec![]);
        function.gc = Some("shadow-stack".to_string());
        function.section = Some(".text.hot".to_string());
        function.personality = Some(Rc::new(Const::i32(0)));
        function.prologue = Some(Rc::new(Const::i32(2)));
        function.prefix = Some(Rc::new(Const::i32(1)));
        function.comdat = Some(ComdatRef { name: "hot".to_string() });
        function.func_attrs = vec![FuncAttr::NoUnwind, FuncAttr::Group(0)];
        function.unnamed_addr = Some(UnnamedAddr::UnnamedAddr);
        function.return_attrs = vec![ParamAttr::NonNull];
        function.calling_conv = Some(CallingConv::Fast);
        function.dll_storage_class = Some(DllStorageClass::DllExport);
        function.visibility = Some(Visibility::Hidden);
        function.preemption = Some(Preemption::DsoLocal);
        function.linkage = Some(Linkage::External);

        assert_eq!(
            function.def().unwrap(),
            "declare external dso_local hidden dllexport fastcc nonnull i8* @hot() unnamed_addr nounwind #0 \
             section \".text.hot\" comdat($hot) gc \"shadow-stack\" prefix i32 1 prologue i32 2 personality i32 0"
        );
    }

    #[test]
    fn test_section_before_gc() {
        let mut first = Function::new("a", Type::Void, vec![]);
        first.section = Some("s".to_string());
        first.gc = Some("g".to_string());

        let mut second = Function::new("a", Type::Void, vec![]);
        second.gc = Some("g".to_string());
        second.section = Some("s".to_string());

        let expected = "declare void @a() section \"s\" gc \"g\"";
        assert_eq!(first.def().unwrap(), expected);
        assert_eq!(second.def().unwrap(), expected);
    }

    #[test]
    fn test_personality_function() {
        let personality =
            Rc::new(Function::new("__gxx_personality_v0", Type::i32(), vec![]).variadic());
        let mut function = Function::new("f", Type::Void, vec![]);
        function.personality = Some(personality);
        assert_eq!(
            function.def().unwrap(),
            "declare void @f() personality i32 (...)* @__gxx_personality_v0"
        );
    }

    #[test]
    fn test_set_name() {
        let function = Function::new("old", Type::Void, vec![]);
        function.set_name("new name");
        assert_eq!(function.name(), "new name");
        assert_eq!(function.ident(), "@\"new name\"");
    }
}
