//! Attribute and qualifier enumerations
//!
//! Each enumeration renders as the exact keyword used in the textual form.
//! Absence is modelled with `Option` at the use site.

use irkit_common::enc::quote;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Linkage types for global symbols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Linkage {
    Private,
    Internal,
    AvailableExternally,
    LinkOnce,
    Weak,
    Common,
    Appending,
    ExternWeak,
    LinkOnceOdr,
    WeakOdr,
    External,
}

impl Linkage {
    /// Linkages that are legal on a declaration
    pub fn is_external_only(&self) -> bool {
        matches!(self, Linkage::External | Linkage::ExternWeak)
    }
}

impl fmt::Display for Linkage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let linkage_str = match self {
            Linkage::Private => "private",
            Linkage::Internal => "internal",
            Linkage::AvailableExternally => "available_externally",
            Linkage::LinkOnce => "linkonce",
            Linkage::Weak => "weak",
            Linkage::Common => "common",
            Linkage::Appending => "appending",
            Linkage::ExternWeak => "extern_weak",
            Linkage::LinkOnceOdr => "linkonce_odr",
            Linkage::WeakOdr => "weak_odr",
            Linkage::External => "external",
        };
        write!(f, "{}", linkage_str)
    }
}

/// Runtime preemption specifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Preemption {
    DsoLocal,
    DsoPreemptable,
}

impl fmt::Display for Preemption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Preemption::DsoLocal => write!(f, "dso_local"),
            Preemption::DsoPreemptable => write!(f, "dso_preemptable"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    Default,
    Hidden,
    Protected,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Default => write!(f, "default"),
            Visibility::Hidden => write!(f, "hidden"),
            Visibility::Protected => write!(f, "protected"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DllStorageClass {
    DllImport,
    DllExport,
}

impl fmt::Display for DllStorageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DllStorageClass::DllImport => write!(f, "dllimport"),
            DllStorageClass::DllExport => write!(f, "dllexport"),
        }
    }
}

/// Calling conventions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallingConv {
    C,
    Fast,
    Cold,
    Ghc,
    Swift,
    PreserveMost,
    PreserveAll,
    X86StdCall,
    X86FastCall,
    X86VectorCall,
    /// Numbered convention, `cc N`
    Numbered(u32),
}

impl fmt::Display for CallingConv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cc_str = match self {
            CallingConv::C => "ccc",
            CallingConv::Fast => "fastcc",
            CallingConv::Cold => "coldcc",
            CallingConv::Ghc => "ghccc",
            CallingConv::Swift => "swiftcc",
            CallingConv::PreserveMost => "preserve_mostcc",
            CallingConv::PreserveAll => "preserve_allcc",
            CallingConv::X86StdCall => "x86_stdcallcc",
            CallingConv::X86FastCall => "x86_fastcallcc",
            CallingConv::X86VectorCall => "x86_vectorcallcc",
            CallingConv::Numbered(n) => return write!(f, "cc {}", n),
        };
        write!(f, "{}", cc_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnnamedAddr {
    UnnamedAddr,
    LocalUnnamedAddr,
}

impl fmt::Display for UnnamedAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnnamedAddr::UnnamedAddr => write!(f, "unnamed_addr"),
            UnnamedAddr::LocalUnnamedAddr => write!(f, "local_unnamed_addr"),
        }
    }
}

/// Parameter and return attributes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamAttr {
    ZeroExt,
    SignExt,
    InReg,
    NoAlias,
    NoCapture,
    NonNull,
    ReadOnly,
    Returned,
    Dereferenceable(u64),
    Align(u32),
}

impl fmt::Display for ParamAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamAttr::ZeroExt => write!(f, "zeroext"),
            ParamAttr::SignExt => write!(f, "signext"),
            ParamAttr::InReg => write!(f, "inreg"),
            ParamAttr::NoAlias => write!(f, "noalias"),
            ParamAttr::NoCapture => write!(f, "nocapture"),
            ParamAttr::NonNull => write!(f, "nonnull"),
            ParamAttr::ReadOnly => write!(f, "readonly"),
            ParamAttr::Returned => write!(f, "returned"),
            ParamAttr::Dereferenceable(n) => write!(f, "dereferenceable({n})"),
            ParamAttr::Align(n) => write!(f, "align {n}"),
        }
    }
}

/// Function attributes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FuncAttr {
    AlwaysInline,
    Cold,
    InlineHint,
    MinSize,
    Naked,
    NoInline,
    NoReturn,
    NoUnwind,
    OptNone,
    OptSize,
    ReadNone,
    ReadOnly,
    SspStrong,
    UwTable,
    AlignStack(u32),
    /// Reference to an attribute group, `#N`
    Group(u32),
    /// String attribute, `"key"` or `"key"="value"`
    Str { key: String, value: Option<String> },
}

impl fmt::Display for FuncAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let attr_str = match self {
            FuncAttr::AlwaysInline => "alwaysinline",
            FuncAttr::Cold => "cold",
            FuncAttr::InlineHint => "inlinehint",
            FuncAttr::MinSize => "minsize",
            FuncAttr::Naked => "naked",
            FuncAttr::NoInline => "noinline",
            FuncAttr::NoReturn => "noreturn",
            FuncAttr::NoUnwind => "nounwind",
            FuncAttr::OptNone => "optnone",
            FuncAttr::OptSize => "optsize",
            FuncAttr::ReadNone => "readnone",
            FuncAttr::ReadOnly => "readonly",
            FuncAttr::SspStrong => "sspstrong",
            FuncAttr::UwTable => "uwtable",
            FuncAttr::AlignStack(n) => return write!(f, "alignstack({n})"),
            FuncAttr::Group(id) => return write!(f, "#{id}"),
            FuncAttr::Str { key, value: None } => return write!(f, "{}", quote(key)),
            FuncAttr::Str { key, value: Some(value) } => {
                return write!(f, "{}={}", quote(key), quote(value));
            }
        };
        write!(f, "{}", attr_str)
    }
}

/// Atomic memory ordering constraints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AtomicOrdering {
    Unordered,
    Monotonic,
    Acquire,
    Release,
    AcqRel,
    SeqCst,
}

impl fmt::Display for AtomicOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ordering_str = match self {
            AtomicOrdering::Unordered => "unordered",
            AtomicOrdering::Monotonic => "monotonic",
            AtomicOrdering::Acquire => "acquire",
            AtomicOrdering::Release => "release",
            AtomicOrdering::AcqRel => "acq_rel",
            AtomicOrdering::SeqCst => "seq_cst",
        };
        write!(f, "{}", ordering_str)
    }
}

impl FromStr for AtomicOrdering {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unordered" => Ok(AtomicOrdering::Unordered),
            "monotonic" => Ok(AtomicOrdering::Monotonic),
            "acquire" => Ok(AtomicOrdering::Acquire),
            "release" => Ok(AtomicOrdering::Release),
            "acq_rel" => Ok(AtomicOrdering::AcqRel),
            "seq_cst" => Ok(AtomicOrdering::SeqCst),
            _ => Err(format!("unknown atomic ordering '{s}'")),
        }
    }
}

/// Operations of the atomicrmw instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AtomicOp {
    Xchg,
    Add,
    Sub,
    And,
    Nand,
    Or,
    Xor,
    Max,
    Min,
    UMax,
    UMin,
    FAdd,
    FSub,
}

impl fmt::Display for AtomicOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op_str = match self {
            AtomicOp::Xchg => "xchg",
            AtomicOp::Add => "add",
            AtomicOp::Sub => "sub",
            AtomicOp::And => "and",
            AtomicOp::Nand => "nand",
            AtomicOp::Or => "or",
            AtomicOp::Xor => "xor",
            AtomicOp::Max => "max",
            AtomicOp::Min => "min",
            AtomicOp::UMax => "umax",
            AtomicOp::UMin => "umin",
            AtomicOp::FAdd => "fadd",
            AtomicOp::FSub => "fsub",
        };
        write!(f, "{}", op_str)
    }
}
