use serde_json::Value;

use crate::descriptor::{Descriptor, Size};
use crate::error::{GenError, GenResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntWidth {
    W8,
    W16,
    W32,
    W64,
}

impl IntWidth {
    pub fn bits(self) -> u32 {
        match self {
            IntWidth::W8 => 8,
            IntWidth::W16 => 16,
            IntWidth::W32 => 32,
            IntWidth::W64 => 64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Config,
    String,
    SignedInt(IntWidth),
    UnsignedInt(IntWidth),
    Float,
    Double,
    Bool,
    Macro,
}

impl FieldType {
    pub fn from_name(name: &str) -> Option<FieldType> {
        let ty = match name {
            "config" => FieldType::Config,
            "string" => FieldType::String,
            "int8" => FieldType::SignedInt(IntWidth::W8),
            "int16" => FieldType::SignedInt(IntWidth::W16),
            "int32" => FieldType::SignedInt(IntWidth::W32),
            "int64" => FieldType::SignedInt(IntWidth::W64),
            "uint8" => FieldType::UnsignedInt(IntWidth::W8),
            "uint16" => FieldType::UnsignedInt(IntWidth::W16),
            "uint32" => FieldType::UnsignedInt(IntWidth::W32),
            "uint64" => FieldType::UnsignedInt(IntWidth::W64),
            "float" => FieldType::Float,
            "double" => FieldType::Double,
            "bool" => FieldType::Bool,
            "macro" => FieldType::Macro,
            _ => return None,
        };
        Some(ty)
    }

    pub fn name(self) -> &'static str {
        match self {
            FieldType::Config => "config",
            FieldType::String => "string",
            FieldType::SignedInt(IntWidth::W8) => "int8",
            FieldType::SignedInt(IntWidth::W16) => "int16",
            FieldType::SignedInt(IntWidth::W32) => "int32",
            FieldType::SignedInt(IntWidth::W64) => "int64",
            FieldType::UnsignedInt(IntWidth::W8) => "uint8",
            FieldType::UnsignedInt(IntWidth::W16) => "uint16",
            FieldType::UnsignedInt(IntWidth::W32) => "uint32",
            FieldType::UnsignedInt(IntWidth::W64) => "uint64",
            FieldType::Float => "float",
            FieldType::Double => "double",
            FieldType::Bool => "bool",
            FieldType::Macro => "macro",
        }
    }

    /// C storage type of numeric fields. Bools are resolved at render time.
    pub fn c_numeric_type(self) -> Option<&'static str> {
        match self {
            FieldType::SignedInt(IntWidth::W8) => Some("int8_t"),
            FieldType::SignedInt(IntWidth::W16) => Some("int16_t"),
            FieldType::SignedInt(IntWidth::W32) => Some("int32_t"),
            FieldType::SignedInt(IntWidth::W64) => Some("int64_t"),
            FieldType::UnsignedInt(IntWidth::W8) => Some("uint8_t"),
            FieldType::UnsignedInt(IntWidth::W16) => Some("uint16_t"),
            FieldType::UnsignedInt(IntWidth::W32) => Some("uint32_t"),
            FieldType::UnsignedInt(IntWidth::W64) => Some("uint64_t"),
            FieldType::Float => Some("float"),
            FieldType::Double => Some("double"),
            _ => None,
        }
    }

    /// Half-open `[min, max)` domain of integer types.
    pub fn int_domain(self) -> Option<(i128, i128)> {
        match self {
            FieldType::SignedInt(w) => {
                let half = 1i128 << (w.bits() - 1);
                Some((-half, half))
            }
            FieldType::UnsignedInt(w) => Some((0, 1i128 << w.bits())),
            _ => None,
        }
    }

    /// Largest finite magnitude of floating-point types.
    pub fn real_limit(self) -> Option<f64> {
        match self {
            FieldType::Float => Some(f32::MAX as f64),
            FieldType::Double => Some(f64::MAX),
            _ => None,
        }
    }
}

/// A field value that passed its type's domain check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Integer literal exactly as written in the input.
    Integer(String),
    /// Real literal exactly as written in the input.
    Real(String),
    Bool(bool),
    Text(String),
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub fn validate(key: &str, desc: &Descriptor, value: &Value) -> GenResult<FieldValue> {
    validate_literal(key, desc, value, None)
}

/// Like [`validate`], but a numeric value is rendered as `as_written`.
/// Domain checks always run on the parsed number; `serde_json` normalizes
/// exponents, so its own text is only used when no source text is known.
pub fn validate_literal(
    key: &str,
    desc: &Descriptor,
    value: &Value,
    as_written: Option<&str>,
) -> GenResult<FieldValue> {
    let rendered = |checked: String| as_written.map(str::to_string).unwrap_or(checked);
    let mismatch = |expected: &str| {
        GenError::type_mismatch(format!(
            "'{key}': expected {expected}, got {}",
            json_kind(value)
        ))
    };

    match desc.ty {
        FieldType::Config => Err(GenError::config(format!(
            "'{key}': directives carry no field value"
        ))),
        FieldType::SignedInt(_) | FieldType::UnsignedInt(_) => {
            let Value::Number(n) = value else {
                return Err(mismatch("an integer"));
            };
            let literal = n.to_string();
            if literal.contains(['.', 'e', 'E']) {
                return Err(mismatch("an integer"));
            }
            let (min, max) = desc.ty.int_domain().unwrap_or((0, 0));
            let in_range = literal
                .parse::<i128>()
                .map(|v| v >= min && v < max)
                .unwrap_or(false);
            if !in_range {
                return Err(GenError::range(format!(
                    "'{key}': value {} is outside of the range of {}",
                    as_written.unwrap_or(&literal),
                    desc.ty.name()
                )));
            }
            Ok(FieldValue::Integer(rendered(literal)))
        }
        FieldType::Float | FieldType::Double => {
            let Value::Number(n) = value else {
                return Err(mismatch("a number"));
            };
            let literal = n.to_string();
            let limit = desc.ty.real_limit().unwrap_or(f64::MAX);
            let in_range = literal
                .parse::<f64>()
                .map(|v| v.is_finite() && v.abs() <= limit)
                .unwrap_or(false);
            if !in_range {
                return Err(GenError::range(format!(
                    "'{key}': value {} is outside of the range of {}",
                    as_written.unwrap_or(&literal),
                    desc.ty.name()
                )));
            }
            Ok(FieldValue::Real(rendered(literal)))
        }
        FieldType::Bool => match value {
            Value::Bool(b) => Ok(FieldValue::Bool(*b)),
            _ => Err(mismatch("a boolean")),
        },
        FieldType::String => {
            let Value::String(s) = value else {
                return Err(mismatch("a string"));
            };
            if let Some(Size::Fixed(capacity)) = desc.size {
                if s.len() + 1 > capacity {
                    return Err(GenError::range(format!(
                        "'{key}': string of {} bytes does not fit size {capacity} (terminator included)",
                        s.len()
                    )));
                }
            }
            Ok(FieldValue::Text(s.clone()))
        }
        FieldType::Macro => match value {
            Value::String(s) => Ok(FieldValue::Text(s.clone())),
            _ => Err(mismatch("a string")),
        },
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn integer_domains_are_half_open() {
        let i8_ty = FieldType::SignedInt(IntWidth::W8);
        assert_eq!(i8_ty.int_domain(), Some((-128, 128)));
        let u64_ty = FieldType::UnsignedInt(IntWidth::W64);
        assert_eq!(u64_ty.int_domain(), Some((0, 1i128 << 64)));
        assert_eq!(FieldType::Float.int_domain(), None);
    }

    #[test]
    fn names_round_trip() {
        for name in [
            "config", "string", "int8", "int16", "int32", "int64", "uint8", "uint16", "uint32",
            "uint64", "float", "double", "bool", "macro",
        ] {
            let ty = FieldType::from_name(name).expect(name);
            assert_eq!(ty.name(), name);
        }
        assert_eq!(FieldType::from_name("int128"), None);
    }

    #[test]
    fn directives_carry_no_field_value() {
        let desc = Descriptor::parse("Version").expect("parse");
        let err = validate("Version", &desc, &json!(1)).expect_err("config");
        assert_eq!(err.kind, ErrorKind::Config);
    }

    #[test]
    fn numbers_keep_their_source_text() {
        let desc = Descriptor::parse("float:Gain").expect("parse");
        let value: Value = serde_json::from_str("0.1E+2").expect("json");
        let checked = validate_literal("float:Gain", &desc, &value, Some("0.1E+2")).expect("valid");
        assert_eq!(checked, FieldValue::Real("0.1E+2".to_string()));

        let desc = Descriptor::parse("uint32:Num").expect("parse");
        let checked = validate_literal("uint32:Num", &desc, &json!(66051), Some("0x010203")).expect("valid");
        assert_eq!(checked, FieldValue::Integer("0x010203".to_string()));
    }

    #[test]
    fn exponent_literals_are_not_integers() {
        let desc = Descriptor::parse("int8:Level").expect("parse");
        let value: Value = serde_json::from_str("1E2").expect("json");
        let err = validate_literal("int8:Level", &desc, &value, Some("1E2")).expect_err("exponent");
        assert_eq!(err.kind, ErrorKind::Type);
    }
}
