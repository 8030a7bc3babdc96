//! Scalar lifting of core words into interface values.

use crate::error::{CanonError, Result};

use super::types::{CoreType, InterfaceType};
use super::value::{CoreValue, InterfaceValue};

/// Lift a core word into a value of the given interface type.
///
/// Narrow integer types keep only the low 8 or 16 bits of the `i32` word.
/// 32 and 64-bit integers, floats and vectors reinterpret the word. Strings
/// and lists are never produced here; the adapters transfer them through
/// linear memory.
pub fn lift_value(ty: &InterfaceType, word: CoreValue) -> Result<InterfaceValue> {
    let value = match ty {
        InterfaceType::I8 => InterfaceValue::I8(word.as_i32() as i8),
        InterfaceType::U8 => InterfaceValue::U8(word.as_i32() as u8),
        InterfaceType::I16 => InterfaceValue::I16(word.as_i32() as i16),
        InterfaceType::U16 => InterfaceValue::U16(word.as_i32() as u16),
        InterfaceType::I32 => InterfaceValue::I32(word.as_i32()),
        InterfaceType::U32 => InterfaceValue::U32(word.as_u32()),
        InterfaceType::I64 => InterfaceValue::I64(word.as_i64()),
        InterfaceType::U64 => InterfaceValue::U64(word.as_u64()),
        InterfaceType::F32 => InterfaceValue::F32(word.as_f32()),
        InterfaceType::F64 => InterfaceValue::F64(word.as_f64()),
        InterfaceType::V128 => InterfaceValue::V128(word.as_v128()),
        InterfaceType::String | InterfaceType::List(_) => {
            return Err(CanonError::unsupported(format!(
                "cannot lift a single core word to {ty}"
            )));
        }
    };
    Ok(value)
}

/// Lift a core word typed by a core value type.
///
/// Shares the table of [`lift_value`] through [`InterfaceType::from_core_type`].
pub fn lift_core_value(ty: CoreType, word: CoreValue) -> Result<InterfaceValue> {
    let ty = InterfaceType::from_core_type(ty)?;
    lift_value(&ty, word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_types_truncate() {
        let word = CoreValue::I32(0x1234_5678);
        assert_eq!(
            lift_value(&InterfaceType::U8, word).unwrap(),
            InterfaceValue::U8(0x78)
        );
        assert_eq!(
            lift_value(&InterfaceType::U16, word).unwrap(),
            InterfaceValue::U16(0x5678)
        );
        assert_eq!(
            lift_value(&InterfaceType::I8, CoreValue::I32(0xff)).unwrap(),
            InterfaceValue::I8(-1)
        );
        assert_eq!(
            lift_value(&InterfaceType::I16, CoreValue::I32(0x8000)).unwrap(),
            InterfaceValue::I16(i16::MIN)
        );
    }

    #[test]
    fn wide_types_reinterpret() {
        assert_eq!(
            lift_value(&InterfaceType::U32, CoreValue::I32(-1)).unwrap(),
            InterfaceValue::U32(u32::MAX)
        );
        assert_eq!(
            lift_value(&InterfaceType::U64, CoreValue::I64(-1)).unwrap(),
            InterfaceValue::U64(u64::MAX)
        );
        assert_eq!(
            lift_value(&InterfaceType::F64, CoreValue::F64(2.5)).unwrap(),
            InterfaceValue::F64(2.5)
        );
        assert_eq!(
            lift_value(&InterfaceType::V128, CoreValue::V128(u128::MAX)).unwrap(),
            InterfaceValue::V128(u128::MAX)
        );
    }

    #[test]
    fn core_type_overload_shares_table() {
        assert_eq!(
            lift_core_value(CoreType::I8, CoreValue::I32(0x180)).unwrap(),
            InterfaceValue::I8(-128)
        );
        assert_eq!(
            lift_core_value(CoreType::I32, CoreValue::I32(5)).unwrap(),
            InterfaceValue::I32(5)
        );
        assert!(lift_core_value(CoreType::FuncRef, CoreValue::I32(0)).is_err());
    }

    #[test]
    fn strings_and_lists_are_not_scalars() {
        let word = CoreValue::I32(0);
        assert!(lift_value(&InterfaceType::String, word).unwrap_err().is_unsupported());
        assert!(lift_value(&InterfaceType::list(InterfaceType::U8), word).is_err());
    }
}
