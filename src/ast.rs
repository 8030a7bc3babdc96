//! Component AST nodes consumed by the canonical section resolver.
//!
//! These mirror the parts of a decoded component binary the adapters need:
//! declared function types, the type index space, and canonical function
//! declarations with their options. Parsing and validation happen elsewhere.

use std::fmt;

/// Primitive component value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimValType {
    Bool,
    S8,
    U8,
    S16,
    U16,
    S32,
    U32,
    S64,
    U64,
    Float32,
    Float64,
    Char,
    String,
}

/// A value type: either primitive or a reference into the type index space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Prim(PrimValType),
    Type(u32),
}

impl From<PrimValType> for ValueType {
    fn from(ty: PrimValType) -> Self {
        Self::Prim(ty)
    }
}

/// A named parameter or result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelValType {
    pub label: String,
    pub ty: ValueType,
}

impl LabelValType {
    pub fn new(label: impl Into<String>, ty: impl Into<ValueType>) -> Self {
        Self {
            label: label.into(),
            ty: ty.into(),
        }
    }
}

/// Results of a function type: one unnamed value or a list of named ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultList {
    Unnamed(ValueType),
    Named(Vec<LabelValType>),
}

impl ResultList {
    /// No results.
    pub fn none() -> Self {
        Self::Named(Vec::new())
    }
}

/// A declared component function type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncType {
    pub params: Vec<LabelValType>,
    pub results: ResultList,
}

impl FuncType {
    pub fn new(params: Vec<LabelValType>, results: ResultList) -> Self {
        Self { params, results }
    }
}

/// An entry of a component's type index space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefType {
    Func(FuncType),
    List(ValueType),
    Record(Vec<LabelValType>),
    Instance,
}

/// `string-encoding=` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringEncoding {
    Utf8,
    Utf16,
    CompactUtf16,
}

impl fmt::Display for StringEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Utf8 => "utf8",
            Self::Utf16 => "utf16",
            Self::CompactUtf16 => "latin1+utf16",
        };
        f.write_str(name)
    }
}

/// Canonical options attached to `lift` and `lower`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanonOpt {
    StringEncoding(StringEncoding),
    /// Core memory index.
    Memory(u32),
    /// Core function index of the reallocator.
    Realloc(u32),
    /// Core function index of the cleanup hook.
    PostReturn(u32),
}

/// Resource canonical operations, each naming a resource type index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceOp {
    New(u32),
    Drop(u32),
    Rep(u32),
}

impl fmt::Display for ResourceOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New(ty) => write!(f, "resource.new {ty}"),
            Self::Drop(ty) => write!(f, "resource.drop {ty}"),
            Self::Rep(ty) => write!(f, "resource.rep {ty}"),
        }
    }
}

/// A single canonical function declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Canon {
    /// Wrap core function `core_func` as a component function of type `func_type`.
    Lift {
        core_func: u32,
        options: Vec<CanonOpt>,
        func_type: u32,
    },
    /// Wrap component function `func` as a core function.
    Lower { func: u32, options: Vec<CanonOpt> },
    Resource(ResourceOp),
}

/// A component's canonical function section, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonSection {
    content: Vec<Canon>,
}

impl CanonSection {
    pub fn new(content: Vec<Canon>) -> Self {
        Self { content }
    }

    pub fn content(&self) -> &[Canon] {
        &self.content
    }

    pub fn push(&mut self, canon: Canon) {
        self.content.push(canon);
    }
}
