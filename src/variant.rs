use crate::datetime::CIMDateTime;
use crate::instance::Instance;
use crate::object_path::ObjectPath;
use crate::{CMPIError, CMPIResult};
use serde::Serialize;
use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

/// A typed value held by a property, an argument or an object-path key.
#[derive(Debug, PartialEq, Serialize, Clone)]
#[serde(untagged)]
pub enum Variant {
    Null,

    String(String),

    Bool(bool),

    UI1(u8),
    UI2(u16),
    UI4(u32),
    UI8(u64),

    I1(i8),
    I2(i16),
    I4(i32),
    I8(i64),

    R4(f32),
    R8(f64),

    DateTime(CIMDateTime),

    Ref(ObjectPath),
    Instance(Box<Instance>),

    Array(Vec<Variant>),
}

/// The declared CIM type of a value.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize)]
pub enum CIMType {
    Null,
    Boolean,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    SInt8,
    SInt16,
    SInt32,
    SInt64,
    Real32,
    Real64,
    String,
    DateTime,
    Reference,
    Instance,
}

impl CIMType {
    pub fn is_integer(self) -> bool {
        self.integer_width().is_some()
    }

    /// Width in bits and signedness, for the integer family only.
    pub fn integer_width(self) -> Option<(u32, bool)> {
        let width = match self {
            CIMType::UInt8 => (8, false),
            CIMType::UInt16 => (16, false),
            CIMType::UInt32 => (32, false),
            CIMType::UInt64 => (64, false),
            CIMType::SInt8 => (8, true),
            CIMType::SInt16 => (16, true),
            CIMType::SInt32 => (32, true),
            CIMType::SInt64 => (64, true),
            _ => return None,
        };

        Some(width)
    }

    /// The integer type for a width and signedness. Unknown widths mean 64 bits.
    pub fn integer(bits: u32, signed: bool) -> CIMType {
        match (bits, signed) {
            (8, false) => CIMType::UInt8,
            (16, false) => CIMType::UInt16,
            (32, false) => CIMType::UInt32,
            (_, false) => CIMType::UInt64,
            (8, true) => CIMType::SInt8,
            (16, true) => CIMType::SInt16,
            (32, true) => CIMType::SInt32,
            (_, true) => CIMType::SInt64,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CIMType::Null => "null",
            CIMType::Boolean => "boolean",
            CIMType::UInt8 => "uint8",
            CIMType::UInt16 => "uint16",
            CIMType::UInt32 => "uint32",
            CIMType::UInt64 => "uint64",
            CIMType::SInt8 => "sint8",
            CIMType::SInt16 => "sint16",
            CIMType::SInt32 => "sint32",
            CIMType::SInt64 => "sint64",
            CIMType::Real32 => "real32",
            CIMType::Real64 => "real64",
            CIMType::String => "string",
            CIMType::DateTime => "datetime",
            CIMType::Reference => "reference",
            CIMType::Instance => "instance",
        }
    }
}

impl fmt::Display for CIMType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CIMType {
    type Err = CMPIError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = match s.to_ascii_lowercase().as_str() {
            "boolean" => CIMType::Boolean,
            "uint8" => CIMType::UInt8,
            "uint16" => CIMType::UInt16,
            "uint32" => CIMType::UInt32,
            "uint64" => CIMType::UInt64,
            "sint8" => CIMType::SInt8,
            "sint16" => CIMType::SInt16,
            "sint32" => CIMType::SInt32,
            "sint64" => CIMType::SInt64,
            "real32" => CIMType::Real32,
            "real64" => CIMType::Real64,
            "string" | "char16" => CIMType::String,
            "datetime" => CIMType::DateTime,
            "reference" | "ref" => CIMType::Reference,
            "instance" | "object" => CIMType::Instance,
            _ => return Err(CMPIError::Failed(format!("Unknown CIM type `{}`", s))),
        };

        Ok(t)
    }
}

/// How strictly the unsigned integer accessors match the stored integer width.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TypingPolicy {
    /// Accept any integer type, truncating or widening into the requested width.
    Weak,
    /// Require the exact requested type.
    Strict,
}

impl Default for TypingPolicy {
    fn default() -> Self {
        if cfg!(feature = "strict-types") {
            TypingPolicy::Strict
        } else {
            TypingPolicy::Weak
        }
    }
}

// The `cast_num` macro converts a numerical value to a variant of the given CIMType.
macro_rules! cast_num {
    ($var:ident, $cim_type:ident) => {
        match $cim_type {
            CIMType::UInt8 => Ok(Variant::UI1($var as u8)),
            CIMType::UInt16 => Ok(Variant::UI2($var as u16)),
            CIMType::UInt32 => Ok(Variant::UI4($var as u32)),
            CIMType::UInt64 => Ok(Variant::UI8($var as u64)),
            CIMType::SInt8 => Ok(Variant::I1($var as i8)),
            CIMType::SInt16 => Ok(Variant::I2($var as i16)),
            CIMType::SInt32 => Ok(Variant::I4($var as i32)),
            CIMType::SInt64 => Ok(Variant::I8($var as i64)),
            CIMType::Real32 => Ok(Variant::R4($var as f32)),
            CIMType::Real64 => Ok(Variant::R8($var as f64)),
            other => Err(CMPIError::Failed(format!(
                "Value {:?} cannot be turned into a CIM type {}",
                $var, other,
            ))),
        }
    };
}

impl Variant {
    /// The declared type of this value. For arrays, the type of the elements.
    pub fn cim_type(&self) -> CIMType {
        match self {
            Variant::Null => CIMType::Null,
            Variant::String(_) => CIMType::String,
            Variant::Bool(_) => CIMType::Boolean,
            Variant::UI1(_) => CIMType::UInt8,
            Variant::UI2(_) => CIMType::UInt16,
            Variant::UI4(_) => CIMType::UInt32,
            Variant::UI8(_) => CIMType::UInt64,
            Variant::I1(_) => CIMType::SInt8,
            Variant::I2(_) => CIMType::SInt16,
            Variant::I4(_) => CIMType::SInt32,
            Variant::I8(_) => CIMType::SInt64,
            Variant::R4(_) => CIMType::Real32,
            Variant::R8(_) => CIMType::Real64,
            Variant::DateTime(_) => CIMType::DateTime,
            Variant::Ref(_) => CIMType::Reference,
            Variant::Instance(_) => CIMType::Instance,
            Variant::Array(items) => items
                .iter()
                .map(Variant::cim_type)
                .find(|t| *t != CIMType::Null)
                .unwrap_or(CIMType::Null),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Variant::Null)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Variant::Array(_))
    }

    pub fn is_integer(&self) -> bool {
        !self.is_array() && self.cim_type().is_integer()
    }

    /// The raw bit pattern of an integer value, sign-extended to 64 bits.
    pub fn integer_bits(&self) -> Option<u64> {
        let bits = match *self {
            Variant::UI1(n) => u64::from(n),
            Variant::UI2(n) => u64::from(n),
            Variant::UI4(n) => u64::from(n),
            Variant::UI8(n) => n,
            Variant::I1(n) => n as i64 as u64,
            Variant::I2(n) => n as i64 as u64,
            Variant::I4(n) => n as i64 as u64,
            Variant::I8(n) => n as u64,
            _ => return None,
        };

        Some(bits)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Variant::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Convert the variant to a specific numeric type.
    ///
    /// Integers and reals convert with `as` semantics, strings are parsed.
    pub fn convert_into_cim_type(self, cim_type: CIMType) -> CMPIResult<Self> {
        let converted_variant = match self {
            Variant::Null => Variant::Null,
            Variant::I1(n) => cast_num!(n, cim_type)?,
            Variant::I2(n) => cast_num!(n, cim_type)?,
            Variant::I4(n) => cast_num!(n, cim_type)?,
            Variant::I8(n) => cast_num!(n, cim_type)?,
            Variant::UI1(n) => cast_num!(n, cim_type)?,
            Variant::UI2(n) => cast_num!(n, cim_type)?,
            Variant::UI4(n) => cast_num!(n, cim_type)?,
            Variant::UI8(n) => cast_num!(n, cim_type)?,
            Variant::R4(f) => cast_num!(f, cim_type)?,
            Variant::R8(f) => cast_num!(f, cim_type)?,
            Variant::String(s) => match cim_type {
                CIMType::String => Variant::String(s),
                CIMType::Boolean => Variant::Bool(s.trim().eq_ignore_ascii_case("true")),
                CIMType::Real64 => Variant::R8(s.parse()?),
                CIMType::Real32 => Variant::R4(s.parse()?),
                CIMType::UInt64 => Variant::UI8(s.parse()?),
                CIMType::SInt64 => Variant::I8(s.parse()?),
                CIMType::UInt32 => Variant::UI4(s.parse()?),
                CIMType::SInt32 => Variant::I4(s.parse()?),
                CIMType::UInt16 => Variant::UI2(s.parse()?),
                CIMType::SInt16 => Variant::I2(s.parse()?),
                CIMType::UInt8 => Variant::UI1(s.parse()?),
                CIMType::SInt8 => Variant::I1(s.parse()?),
                CIMType::DateTime => Variant::DateTime(s.parse()?),
                other => {
                    return Err(CMPIError::Failed(format!(
                        "A string Variant cannot be turned into a CIM type {}",
                        other
                    )))
                }
            },
            Variant::Array(variants) => {
                let converted_variants = variants
                    .into_iter()
                    .map(|variant| variant.convert_into_cim_type(cim_type))
                    .collect::<Result<Vec<_>, CMPIError>>()?;

                Variant::Array(converted_variants)
            }
            other => {
                if other.cim_type() == cim_type {
                    other
                } else {
                    return Err(CMPIError::Failed(format!(
                        "Variant {:?} cannot be turned into a CIM type {}",
                        other, cim_type,
                    )));
                }
            }
        };

        Ok(converted_variant)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Null => f.write_str("NULL"),
            Variant::String(s) => write!(f, "\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
            Variant::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            Variant::UI1(n) => write!(f, "{}", n),
            Variant::UI2(n) => write!(f, "{}", n),
            Variant::UI4(n) => write!(f, "{}", n),
            Variant::UI8(n) => write!(f, "{}", n),
            Variant::I1(n) => write!(f, "{}", n),
            Variant::I2(n) => write!(f, "{}", n),
            Variant::I4(n) => write!(f, "{}", n),
            Variant::I8(n) => write!(f, "{}", n),
            Variant::R4(n) => write!(f, "{}", n),
            Variant::R8(n) => write!(f, "{}", n),
            Variant::DateTime(dt) => write!(f, "\"{}\"", dt),
            Variant::Ref(op) => write!(f, "\"{}\"", op.to_string().replace('"', "\\\"")),
            Variant::Instance(inst) => write!(f, "<instance of {}>", inst.class_name()),
            Variant::Array(items) => {
                f.write_str("{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("}")
            }
        }
    }
}

macro_rules! impl_try_from_variant {
    ($target_type:ty, $variant_type:ident) => {
        impl TryFrom<Variant> for $target_type {
            type Error = CMPIError;

            fn try_from(value: Variant) -> Result<$target_type, Self::Error> {
                match value {
                    Variant::$variant_type(item) => Ok(item),
                    other => Err(CMPIError::Failed(format!(
                        "Variant {:?} cannot be turned into a {}",
                        &other,
                        stringify!($target_type)
                    ))),
                }
            }
        }
    };
}

/// Infallible conversion from a Rust type into a Variant wrapper for that type
macro_rules! impl_wrap_type {
    ($target_type:ty, $variant_type:ident) => {
        impl From<$target_type> for Variant {
            fn from(value: $target_type) -> Self {
                Variant::$variant_type(value)
            }
        }
    };
}

macro_rules! impl_try_vec_from_variant {
    ($target_type:ty, $variant_type:ident) => {
        impl TryFrom<Variant> for Vec<$target_type> {
            type Error = CMPIError;

            fn try_from(value: Variant) -> Result<Vec<$target_type>, Self::Error> {
                let array = match value {
                    Variant::Array(array) => array,
                    _ => {
                        return Err(CMPIError::Failed(format!(
                            "Cannot convert a non Variant::Array {:?} to Vec",
                            value
                        )));
                    }
                };

                let mut output_vec = Vec::with_capacity(array.len());

                for item in array {
                    let item = <$target_type>::try_from(item)?;
                    output_vec.push(item);
                }

                Ok(output_vec)
            }
        }
    };
}

/// Infallible conversion from a Rust type into a Variant wrapper for that type
macro_rules! impl_wrap_vec_type {
    ($target_type:ty, $variant_type:ident) => {
        impl From<Vec<$target_type>> for Variant {
            fn from(value: Vec<$target_type>) -> Self {
                Variant::Array(value.into_iter().map(Variant::$variant_type).collect())
            }
        }
    };
}

/// Add conversions from a Rust type to its Variant form and vice versa
macro_rules! bidirectional_variant_convert {
    ($target_type:ty, $variant_type:ident) => {
        impl_try_from_variant!($target_type, $variant_type);
        impl_try_vec_from_variant!($target_type, $variant_type);
        impl_wrap_type!($target_type, $variant_type);
        impl_wrap_vec_type!($target_type, $variant_type);
    };
}

bidirectional_variant_convert!(String, String);
bidirectional_variant_convert!(i8, I1);
bidirectional_variant_convert!(i16, I2);
bidirectional_variant_convert!(i32, I4);
bidirectional_variant_convert!(i64, I8);
bidirectional_variant_convert!(u8, UI1);
bidirectional_variant_convert!(u16, UI2);
bidirectional_variant_convert!(u32, UI4);
bidirectional_variant_convert!(u64, UI8);
bidirectional_variant_convert!(f32, R4);
bidirectional_variant_convert!(f64, R8);
bidirectional_variant_convert!(bool, Bool);
bidirectional_variant_convert!(CIMDateTime, DateTime);
bidirectional_variant_convert!(ObjectPath, Ref);

impl From<Instance> for Variant {
    fn from(value: Instance) -> Self {
        Variant::Instance(Box::new(value))
    }
}

impl TryFrom<Variant> for Instance {
    type Error = CMPIError;

    fn try_from(value: Variant) -> Result<Instance, Self::Error> {
        match value {
            Variant::Instance(inst) => Ok(*inst),
            other => Err(CMPIError::Failed(format!(
                "Variant {:?} cannot be turned into an Instance",
                &other
            ))),
        }
    }
}

impl From<()> for Variant {
    fn from(_value: ()) -> Self {
        Variant::Null
    }
}

impl From<&str> for Variant {
    fn from(value: &str) -> Self {
        Variant::String(value.to_string())
    }
}

impl From<Vec<&str>> for Variant {
    fn from(value: Vec<&str>) -> Self {
        Variant::Array(value.into_iter().map(Variant::from).collect())
    }
}

impl<T> From<Option<T>> for Variant
where
    T: Into<Variant>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Variant::Null, Into::into)
    }
}
