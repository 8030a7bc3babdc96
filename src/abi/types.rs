//! Interface type descriptors and core type codes.

use std::fmt;

use crate::error::{CanonError, Result};

/// Closed set of interface type codes.
///
/// Signed and unsigned variants describe the source type. At the core
/// boundary `I8/I16/U8/U16` and `I32/U32` share a 32-bit slot and
/// `I64/U64` a 64-bit slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ITypeCode {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    V128,
    String,
    List,
}

/// Core value type codes, as declared by core function signatures.
///
/// `I8` and `I16` are packed storage types; they never appear as a core
/// function parameter but are the image of the narrow interface codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoreType {
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    V128,
    FuncRef,
    ExternRef,
}

impl fmt::Display for CoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::V128 => "v128",
            Self::FuncRef => "funcref",
            Self::ExternRef => "externref",
        };
        f.write_str(name)
    }
}

/// Shape of a component-level value.
///
/// `List` is the only code with an element type, so the descriptor is an
/// enum rather than a code plus an optional argument. Equality is
/// structural and recurses into list elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InterfaceType {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    V128,
    String,
    List(Box<InterfaceType>),
}

impl InterfaceType {
    /// `list<elem>`.
    pub fn list(elem: InterfaceType) -> Self {
        Self::List(Box::new(elem))
    }

    /// Build a descriptor from a code that takes no type argument.
    ///
    /// Fails for [`ITypeCode::List`], which needs an element type.
    pub fn from_code(code: ITypeCode) -> Result<Self> {
        let ty = match code {
            ITypeCode::I8 => Self::I8,
            ITypeCode::I16 => Self::I16,
            ITypeCode::I32 => Self::I32,
            ITypeCode::I64 => Self::I64,
            ITypeCode::U8 => Self::U8,
            ITypeCode::U16 => Self::U16,
            ITypeCode::U32 => Self::U32,
            ITypeCode::U64 => Self::U64,
            ITypeCode::F32 => Self::F32,
            ITypeCode::F64 => Self::F64,
            ITypeCode::V128 => Self::V128,
            ITypeCode::String => Self::String,
            ITypeCode::List => {
                return Err(CanonError::unsupported("list without an element type"));
            }
        };
        Ok(ty)
    }

    pub fn code(&self) -> ITypeCode {
        match self {
            Self::I8 => ITypeCode::I8,
            Self::I16 => ITypeCode::I16,
            Self::I32 => ITypeCode::I32,
            Self::I64 => ITypeCode::I64,
            Self::U8 => ITypeCode::U8,
            Self::U16 => ITypeCode::U16,
            Self::U32 => ITypeCode::U32,
            Self::U64 => ITypeCode::U64,
            Self::F32 => ITypeCode::F32,
            Self::F64 => ITypeCode::F64,
            Self::V128 => ITypeCode::V128,
            Self::String => ITypeCode::String,
            Self::List(_) => ITypeCode::List,
        }
    }

    /// Element type of a list, `None` for every other code.
    pub fn elem(&self) -> Option<&InterfaceType> {
        match self {
            Self::List(elem) => Some(elem),
            _ => None,
        }
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Self::String)
    }

    /// Derive a descriptor from a core value type.
    ///
    /// Only `i8 i16 i32 i64 f32 f64 v128` have an interface counterpart;
    /// core modules never expose strings, lists or unsigned types.
    pub fn from_core_type(ty: CoreType) -> Result<Self> {
        match ty {
            CoreType::I8 => Ok(Self::I8),
            CoreType::I16 => Ok(Self::I16),
            CoreType::I32 => Ok(Self::I32),
            CoreType::I64 => Ok(Self::I64),
            CoreType::F32 => Ok(Self::F32),
            CoreType::F64 => Ok(Self::F64),
            CoreType::V128 => Ok(Self::V128),
            CoreType::FuncRef | CoreType::ExternRef => Err(CanonError::unsupported(format!(
                "core type {ty} has no interface type"
            ))),
        }
    }

    /// Inverse of [`InterfaceType::from_core_type`].
    ///
    /// Unsigned codes map to the core code of their signed counterpart.
    /// Strings and lists have no single-word core representation.
    pub fn to_core_type(&self) -> Result<CoreType> {
        match self {
            Self::I8 | Self::U8 => Ok(CoreType::I8),
            Self::I16 | Self::U16 => Ok(CoreType::I16),
            Self::I32 | Self::U32 => Ok(CoreType::I32),
            Self::I64 | Self::U64 => Ok(CoreType::I64),
            Self::F32 => Ok(CoreType::F32),
            Self::F64 => Ok(CoreType::F64),
            Self::V128 => Ok(CoreType::V128),
            Self::String | Self::List(_) => Err(CanonError::unsupported(format!(
                "{self} has no single-word core type"
            ))),
        }
    }

    /// The core word type that carries a scalar across a function boundary.
    ///
    /// Narrow integers travel in an `i32` slot.
    pub fn core_slot(&self) -> Result<CoreType> {
        match self.to_core_type()? {
            CoreType::I8 | CoreType::I16 => Ok(CoreType::I32),
            other => Ok(other),
        }
    }
}

impl fmt::Display for InterfaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::I8 => f.write_str("s8"),
            Self::I16 => f.write_str("s16"),
            Self::I32 => f.write_str("s32"),
            Self::I64 => f.write_str("s64"),
            Self::U8 => f.write_str("u8"),
            Self::U16 => f.write_str("u16"),
            Self::U32 => f.write_str("u32"),
            Self::U64 => f.write_str("u64"),
            Self::F32 => f.write_str("f32"),
            Self::F64 => f.write_str("f64"),
            Self::V128 => f.write_str("v128"),
            Self::String => f.write_str("string"),
            Self::List(elem) => write!(f, "list<{elem}>"),
        }
    }
}
