use crate::variant::Variant;
use crate::CMPIError;

use serde::de::value::SeqDeserializer;
use serde::de::{self, IntoDeserializer};
use serde::{forward_to_deserialize_any, Deserialize};
use std::fmt;

impl<'de> IntoDeserializer<'de, CMPIError> for Variant {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self {
        self
    }
}

impl<'de> serde::Deserializer<'de> for Variant {
    type Error = CMPIError;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        match self {
            Variant::Null => visitor.visit_none(),
            Variant::String(s) => visitor.visit_string(s),
            Variant::I1(n) => visitor.visit_i8(n),
            Variant::I2(n) => visitor.visit_i16(n),
            Variant::I4(n) => visitor.visit_i32(n),
            Variant::I8(n) => visitor.visit_i64(n),
            Variant::R4(f) => visitor.visit_f32(f),
            Variant::R8(f) => visitor.visit_f64(f),
            Variant::Bool(b) => visitor.visit_bool(b),
            Variant::UI1(n) => visitor.visit_u8(n),
            Variant::UI2(n) => visitor.visit_u16(n),
            Variant::UI4(n) => visitor.visit_u32(n),
            Variant::UI8(n) => visitor.visit_u64(n),
            // Datetimes and references are handed over in their string form.
            Variant::DateTime(dt) => visitor.visit_string(dt.to_string()),
            Variant::Ref(op) => visitor.visit_string(op.to_string()),
            Variant::Instance(inst) => de::Deserializer::deserialize_map(&*inst, visitor),
            Variant::Array(v) => visitor.visit_seq(SeqDeserializer::new(v.into_iter())),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        match self {
            Variant::Null => visitor.visit_none(),
            some => visitor.visit_some(some),
        }
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 u8 u16 u32 u64 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct enum identifier ignored_any
    }
}

/// Builds a [`Variant`] from self-describing data, keeping the width of integers.
struct VariantVisitor;

impl<'de> de::Visitor<'de> for VariantVisitor {
    type Value = Variant;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a CIM value")
    }

    fn visit_bool<E>(self, value: bool) -> Result<Variant, E> {
        Ok(Variant::Bool(value))
    }

    fn visit_i8<E>(self, value: i8) -> Result<Variant, E> {
        Ok(Variant::I1(value))
    }

    fn visit_i16<E>(self, value: i16) -> Result<Variant, E> {
        Ok(Variant::I2(value))
    }

    fn visit_i32<E>(self, value: i32) -> Result<Variant, E> {
        Ok(Variant::I4(value))
    }

    fn visit_i64<E>(self, value: i64) -> Result<Variant, E> {
        Ok(Variant::I8(value))
    }

    fn visit_u8<E>(self, value: u8) -> Result<Variant, E> {
        Ok(Variant::UI1(value))
    }

    fn visit_u16<E>(self, value: u16) -> Result<Variant, E> {
        Ok(Variant::UI2(value))
    }

    fn visit_u32<E>(self, value: u32) -> Result<Variant, E> {
        Ok(Variant::UI4(value))
    }

    fn visit_u64<E>(self, value: u64) -> Result<Variant, E> {
        Ok(Variant::UI8(value))
    }

    fn visit_f32<E>(self, value: f32) -> Result<Variant, E> {
        Ok(Variant::R4(value))
    }

    fn visit_f64<E>(self, value: f64) -> Result<Variant, E> {
        Ok(Variant::R8(value))
    }

    fn visit_str<E>(self, value: &str) -> Result<Variant, E> {
        Ok(Variant::String(value.to_owned()))
    }

    fn visit_string<E>(self, value: String) -> Result<Variant, E> {
        Ok(Variant::String(value))
    }

    fn visit_none<E>(self) -> Result<Variant, E> {
        Ok(Variant::Null)
    }

    fn visit_unit<E>(self) -> Result<Variant, E> {
        Ok(Variant::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Variant, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Variant, A::Error>
    where
        A: de::SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }

        Ok(Variant::Array(items))
    }

    // Maps would need a class name to become an instance.
    fn visit_map<A>(self, _map: A) -> Result<Variant, A::Error>
    where
        A: de::MapAccess<'de>,
    {
        Err(de::Error::invalid_type(de::Unexpected::Map, &self))
    }
}

impl<'de> Deserialize<'de> for Variant {
    fn deserialize<D>(deserializer: D) -> Result<Variant, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_any(VariantVisitor)
    }
}
