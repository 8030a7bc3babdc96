//! Core words and interface values.

use crate::error::{CanonError, Result};

use super::types::{CoreType, InterfaceType};

/// A single core WebAssembly value.
///
/// The variant records the word's declared kind. The `as_*` accessors
/// reinterpret the low bits of the word regardless of that kind, matching
/// how an untyped value slot is read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoreValue {
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    V128(u128),
}

impl CoreValue {
    pub fn ty(&self) -> CoreType {
        match self {
            Self::I32(_) => CoreType::I32,
            Self::I64(_) => CoreType::I64,
            Self::F32(_) => CoreType::F32,
            Self::F64(_) => CoreType::F64,
            Self::V128(_) => CoreType::V128,
        }
    }

    /// Raw bits of the word, zero-extended to 128 bits.
    pub fn to_bits(&self) -> u128 {
        match *self {
            Self::I32(v) => u128::from(v as u32),
            Self::I64(v) => u128::from(v as u64),
            Self::F32(v) => u128::from(v.to_bits()),
            Self::F64(v) => u128::from(v.to_bits()),
            Self::V128(v) => v,
        }
    }

    pub fn as_u32(&self) -> u32 {
        self.to_bits() as u32
    }

    pub fn as_i32(&self) -> i32 {
        self.as_u32() as i32
    }

    pub fn as_u64(&self) -> u64 {
        self.to_bits() as u64
    }

    pub fn as_i64(&self) -> i64 {
        self.as_u64() as i64
    }

    pub fn as_f32(&self) -> f32 {
        match *self {
            Self::F32(v) => v,
            _ => f32::from_bits(self.as_u32()),
        }
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::F64(v) => v,
            _ => f64::from_bits(self.as_u64()),
        }
    }

    pub fn as_v128(&self) -> u128 {
        self.to_bits()
    }
}

impl From<i32> for CoreValue {
    fn from(v: i32) -> Self {
        Self::I32(v)
    }
}

impl From<u32> for CoreValue {
    fn from(v: u32) -> Self {
        Self::I32(v as i32)
    }
}

impl From<i64> for CoreValue {
    fn from(v: i64) -> Self {
        Self::I64(v)
    }
}

impl From<u64> for CoreValue {
    fn from(v: u64) -> Self {
        Self::I64(v as i64)
    }
}

impl From<f32> for CoreValue {
    fn from(v: f32) -> Self {
        Self::F32(v)
    }
}

impl From<f64> for CoreValue {
    fn from(v: f64) -> Self {
        Self::F64(v)
    }
}

impl From<u128> for CoreValue {
    fn from(v: u128) -> Self {
        Self::V128(v)
    }
}

/// A concrete component-level value.
///
/// The variant determines the value's [`InterfaceType`], so payload and
/// type cannot disagree. Values are created per call and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum InterfaceValue {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    V128(u128),
    F32(f32),
    F64(f64),
    String(String),
}

impl InterfaceValue {
    /// The type descriptor attached to this value.
    pub fn ty(&self) -> InterfaceType {
        match self {
            Self::U8(_) => InterfaceType::U8,
            Self::U16(_) => InterfaceType::U16,
            Self::U32(_) => InterfaceType::U32,
            Self::U64(_) => InterfaceType::U64,
            Self::I8(_) => InterfaceType::I8,
            Self::I16(_) => InterfaceType::I16,
            Self::I32(_) => InterfaceType::I32,
            Self::I64(_) => InterfaceType::I64,
            Self::V128(_) => InterfaceType::V128,
            Self::F32(_) => InterfaceType::F32,
            Self::F64(_) => InterfaceType::F64,
            Self::String(_) => InterfaceType::String,
        }
    }

    /// Extract the payload as `T`.
    ///
    /// Fails with a type mismatch when `T` is not the stored kind; no
    /// numeric conversion is attempted.
    pub fn get<T: FromInterfaceValue>(&self) -> Result<T> {
        T::from_interface_value(self)
    }

    /// Borrow the string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Convert to the single core word that carries this value.
    ///
    /// Narrow integers widen into an `i32` word (zero-extended for unsigned,
    /// sign-extended for signed). Strings have no single-word form and must
    /// go through the allocation path of the adapters.
    pub fn to_core_value(&self) -> Result<CoreValue> {
        let word = match self {
            Self::U8(v) => CoreValue::from(u32::from(*v)),
            Self::U16(v) => CoreValue::from(u32::from(*v)),
            Self::U32(v) => CoreValue::from(*v),
            Self::U64(v) => CoreValue::from(*v),
            Self::I8(v) => CoreValue::I32(i32::from(*v)),
            Self::I16(v) => CoreValue::I32(i32::from(*v)),
            Self::I32(v) => CoreValue::I32(*v),
            Self::I64(v) => CoreValue::I64(*v),
            Self::V128(v) => CoreValue::V128(*v),
            Self::F32(v) => CoreValue::F32(*v),
            Self::F64(v) => CoreValue::F64(*v),
            Self::String(_) => {
                return Err(CanonError::unsupported(
                    "string has no single core word representation",
                ));
            }
        };
        Ok(word)
    }
}

/// Types that can be read out of an [`InterfaceValue`].
pub trait FromInterfaceValue: Sized {
    fn from_interface_value(value: &InterfaceValue) -> Result<Self>;
}

macro_rules! interface_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for InterfaceValue {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }

            impl FromInterfaceValue for $ty {
                fn from_interface_value(value: &InterfaceValue) -> Result<Self> {
                    match value {
                        InterfaceValue::$variant(v) => Ok(*v),
                        other => Err(CanonError::type_mismatch(
                            InterfaceType::$variant,
                            other.ty(),
                        )),
                    }
                }
            }
        )*
    };
}

interface_scalar! {
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u128 => V128,
    f32 => F32,
    f64 => F64,
}

impl From<String> for InterfaceValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for InterfaceValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl FromInterfaceValue for String {
    fn from_interface_value(value: &InterfaceValue) -> Result<Self> {
        match value {
            InterfaceValue::String(s) => Ok(s.clone()),
            other => Err(CanonError::type_mismatch(InterfaceType::String, other.ty())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_attach_type() {
        assert_eq!(InterfaceValue::from(7u8).ty(), InterfaceType::U8);
        assert_eq!(InterfaceValue::from(-7i16).ty(), InterfaceType::I16);
        assert_eq!(InterfaceValue::from(1.5f64).ty(), InterfaceType::F64);
        assert_eq!(InterfaceValue::from(9u128).ty(), InterfaceType::V128);
        assert_eq!(InterfaceValue::from("hi").ty(), InterfaceType::String);
    }

    #[test]
    fn get_requires_matching_kind() {
        let v = InterfaceValue::from(42u32);
        assert_eq!(v.get::<u32>().unwrap(), 42);
        assert!(matches!(
            v.get::<i32>(),
            Err(CanonError::TypeMismatch { .. })
        ));
        let s = InterfaceValue::from("abc");
        assert_eq!(s.get::<String>().unwrap(), "abc");
        assert!(s.get::<u8>().is_err());
    }

    #[test]
    fn narrow_values_widen_into_i32() {
        assert_eq!(
            InterfaceValue::U8(0xff).to_core_value().unwrap(),
            CoreValue::I32(0xff)
        );
        assert_eq!(
            InterfaceValue::I8(-1).to_core_value().unwrap(),
            CoreValue::I32(-1)
        );
        assert_eq!(
            InterfaceValue::U16(0xffff).to_core_value().unwrap(),
            CoreValue::I32(0xffff)
        );
        assert_eq!(
            InterfaceValue::U32(u32::MAX).to_core_value().unwrap(),
            CoreValue::I32(-1)
        );
    }

    #[test]
    fn string_has_no_core_word() {
        let err = InterfaceValue::from("x").to_core_value().unwrap_err();
        assert!(err.is_unsupported());
    }

    #[test]
    fn core_value_reinterprets_bits() {
        let w = CoreValue::I32(-2);
        assert_eq!(w.as_u32(), 0xffff_fffe);
        assert_eq!(w.as_u64(), 0xffff_fffe);
        assert_eq!(CoreValue::F32(1.0).as_u32(), 1.0f32.to_bits());
        assert_eq!(CoreValue::I32(1.0f32.to_bits() as i32).as_f32(), 1.0);
        assert_eq!(CoreValue::I64(-1).as_i32(), -1);
    }
}
