//! WAVE text for interface values.
//!
//! Lets the CLI and tests write arguments like `"hello"` or `-3` and print
//! results the same way.

use std::borrow::Cow;

use wasm_wave::value::{Type as WaveType, Value};
use wasm_wave::wasm::WasmValue;

use crate::abi::{InterfaceType, InterfaceValue};
use crate::error::{CanonError, Result};

/// The WAVE type used to parse and print values of `ty`.
pub fn wave_type(ty: &InterfaceType) -> Result<WaveType> {
    let wave = match ty {
        InterfaceType::I8 => WaveType::S8,
        InterfaceType::I16 => WaveType::S16,
        InterfaceType::I32 => WaveType::S32,
        InterfaceType::I64 => WaveType::S64,
        InterfaceType::U8 => WaveType::U8,
        InterfaceType::U16 => WaveType::U16,
        InterfaceType::U32 => WaveType::U32,
        InterfaceType::U64 => WaveType::U64,
        InterfaceType::F32 => WaveType::F32,
        InterfaceType::F64 => WaveType::F64,
        InterfaceType::String => WaveType::STRING,
        InterfaceType::List(elem) => WaveType::list(wave_type(elem)?),
        InterfaceType::V128 => {
            return Err(CanonError::Wave("v128 has no WAVE representation".to_string()));
        }
    };
    Ok(wave)
}

/// Parse WAVE text as a value of `ty`.
pub fn parse_value(ty: &InterfaceType, text: &str) -> Result<InterfaceValue> {
    let wave = wave_type(ty)?;
    let value: Value =
        wasm_wave::from_str(&wave, text).map_err(|e| CanonError::Wave(e.to_string()))?;
    let parsed = match ty {
        InterfaceType::I8 => InterfaceValue::I8(value.unwrap_s8()),
        InterfaceType::I16 => InterfaceValue::I16(value.unwrap_s16()),
        InterfaceType::I32 => InterfaceValue::I32(value.unwrap_s32()),
        InterfaceType::I64 => InterfaceValue::I64(value.unwrap_s64()),
        InterfaceType::U8 => InterfaceValue::U8(value.unwrap_u8()),
        InterfaceType::U16 => InterfaceValue::U16(value.unwrap_u16()),
        InterfaceType::U32 => InterfaceValue::U32(value.unwrap_u32()),
        InterfaceType::U64 => InterfaceValue::U64(value.unwrap_u64()),
        InterfaceType::F32 => InterfaceValue::F32(value.unwrap_f32()),
        InterfaceType::F64 => InterfaceValue::F64(value.unwrap_f64()),
        InterfaceType::String => InterfaceValue::String(value.unwrap_string().into_owned()),
        InterfaceType::List(_) | InterfaceType::V128 => {
            return Err(CanonError::Wave(format!("{ty} values cannot be built from WAVE")));
        }
    };
    Ok(parsed)
}

/// Parse one WAVE argument per parameter type.
pub fn parse_args(types: &[InterfaceType], args: &[String]) -> Result<Vec<InterfaceValue>> {
    if types.len() != args.len() {
        return Err(CanonError::ArityMismatch {
            expected: types.len(),
            got: args.len(),
        });
    }
    types
        .iter()
        .zip(args)
        .map(|(ty, text)| parse_value(ty, text))
        .collect()
}

/// Render a value as WAVE text.
pub fn to_wave(value: &InterfaceValue) -> Result<String> {
    let wave = match value {
        InterfaceValue::I8(v) => Value::make_s8(*v),
        InterfaceValue::I16(v) => Value::make_s16(*v),
        InterfaceValue::I32(v) => Value::make_s32(*v),
        InterfaceValue::I64(v) => Value::make_s64(*v),
        InterfaceValue::U8(v) => Value::make_u8(*v),
        InterfaceValue::U16(v) => Value::make_u16(*v),
        InterfaceValue::U32(v) => Value::make_u32(*v),
        InterfaceValue::U64(v) => Value::make_u64(*v),
        InterfaceValue::F32(v) => Value::make_f32(*v),
        InterfaceValue::F64(v) => Value::make_f64(*v),
        InterfaceValue::String(s) => Value::make_string(Cow::Borrowed(s)),
        InterfaceValue::V128(v) => return Ok(format!("{v:#034x}")),
    };
    wasm_wave::to_string(&wave).map_err(|e| CanonError::Wave(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_scalars_and_strings() {
        assert_eq!(
            parse_value(&InterfaceType::I32, "-7").unwrap(),
            InterfaceValue::I32(-7)
        );
        assert_eq!(
            parse_value(&InterfaceType::U8, "255").unwrap(),
            InterfaceValue::U8(255)
        );
        assert_eq!(
            parse_value(&InterfaceType::String, r#""hi there""#).unwrap(),
            InterfaceValue::from("hi there")
        );
    }

    #[test]
    fn out_of_range_is_rejected() {
        assert!(matches!(
            parse_value(&InterfaceType::I8, "300"),
            Err(CanonError::Wave(_))
        ));
    }

    #[test]
    fn declared_unsigned_values_are_written_signed() {
        use crate::ast::PrimValType;
        use crate::canon::convert_prim;

        let u32_ty = convert_prim(PrimValType::U32);
        assert!(parse_value(&u32_ty, "4294967295").is_err());
        assert_eq!(parse_value(&u32_ty, "-1").unwrap(), InterfaceValue::I32(-1));
        assert_eq!(
            parse_value(&convert_prim(PrimValType::Bool), "1").unwrap(),
            InterfaceValue::I8(1)
        );
    }

    #[test]
    fn render_values() {
        assert_eq!(to_wave(&InterfaceValue::I64(-1)).unwrap(), "-1");
        assert_eq!(to_wave(&InterfaceValue::from("a\"b")).unwrap(), r#""a\"b""#);
        assert_eq!(
            to_wave(&InterfaceValue::V128(1)).unwrap(),
            "0x00000000000000000000000000000001"
        );
    }

    #[test]
    fn argument_count_must_match() {
        let types = [InterfaceType::String, InterfaceType::I32];
        assert!(matches!(
            parse_args(&types, &["\"x\"".to_string()]),
            Err(CanonError::ArityMismatch { expected: 2, got: 1 })
        ));
        let args = parse_args(&types, &["\"x\"".to_string(), "4".to_string()]).unwrap();
        assert_eq!(args, vec![InterfaceValue::from("x"), InterfaceValue::I32(4)]);
    }
}
