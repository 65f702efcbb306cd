//! Maps a [`Value`] onto any `Deserialize` type.
//!
//! Field resolution and renames live in the target's derived `Deserialize`
//! impl. This side supplies the node semantics: `null` becomes the target's
//! zero value, numbers narrow exactly through [`FromNumber`], and failures
//! inside arrays and objects are wrapped with the enclosing node's canonical
//! text.

use ::serde::de::{
    self, DeserializeOwned, Deserializer, EnumAccess, IntoDeserializer, MapAccess, SeqAccess,
    VariantAccess, Visitor,
};
use smol_str::SmolStr;

use crate::num::{FromNumber, Number};
use crate::types::{Object, Value};
use crate::{Error, Result};

static NULL: Value = Value::Null;

pub fn from_value<T: DeserializeOwned>(value: &Value) -> Result<T> {
    tracing::trace!(
        node = value.type_name(),
        target = std::any::type_name::<T>(),
        "convert"
    );
    T::deserialize(value)
}

/// Narrows a number node, or yields zero for `null`.
fn narrow<T: FromNumber + Default>(value: &Value) -> Result<T> {
    match value {
        Value::Number(n) => Ok(n.convert::<T>()?),
        Value::Null => Ok(T::default()),
        _ => Err(Error::conversion(T::KIND.as_str(), value.render())),
    }
}

macro_rules! deserialize_number {
    ($($method:ident => $ty:ty, $visit:ident;)*) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value>
            where
                V: Visitor<'de>,
            {
                visitor.$visit(narrow::<$ty>(self)?)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for &'de Value {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self {
            Value::Null => visitor.visit_unit(),
            Value::Number(n) => visit_number(visitor, n),
            Value::String(s) => visitor.visit_borrowed_str(s),
            Value::Array(items) => visitor.visit_seq(SeqDeserializer::new(items)),
            Value::Object(obj) => visitor.visit_map(MapDeserializer::new(Some(obj))),
        }
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self {
            Value::Null => visitor.visit_bool(false),
            _ => Err(Error::conversion("bool", self.render())),
        }
    }

    deserialize_number! {
        deserialize_i8 => i8, visit_i8;
        deserialize_i16 => i16, visit_i16;
        deserialize_i32 => i32, visit_i32;
        deserialize_i64 => i64, visit_i64;
        deserialize_i128 => i128, visit_i128;
        deserialize_u8 => u8, visit_u8;
        deserialize_u16 => u16, visit_u16;
        deserialize_u32 => u32, visit_u32;
        deserialize_u64 => u64, visit_u64;
        deserialize_u128 => u128, visit_u128;
        deserialize_f32 => f32, visit_f32;
        deserialize_f64 => f64, visit_f64;
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self {
            Value::String(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) => visitor.visit_char(ch),
                    _ => Err(Error::conversion("char", self.render())),
                }
            }
            Value::Null => visitor.visit_char('\0'),
            _ => Err(Error::conversion("char", self.render())),
        }
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self {
            Value::String(s) => visitor.visit_borrowed_str(s),
            Value::Null => visitor.visit_borrowed_str(""),
            _ => Err(Error::conversion("string", self.render())),
        }
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self {
            Value::String(s) => visitor.visit_string(s.clone()),
            Value::Null => visitor.visit_string(String::new()),
            _ => Err(Error::conversion("string", self.render())),
        }
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self {
            Value::String(s) => visitor.visit_borrowed_bytes(s.as_bytes()),
            Value::Array(items) => visitor.visit_byte_buf(values_to_bytes(self, items)?),
            Value::Null => visitor.visit_borrowed_bytes(&[]),
            _ => Err(Error::conversion("bytes", self.render())),
        }
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self {
            Value::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self {
            Value::Null => visitor.visit_unit(),
            _ => Err(Error::conversion("unit", self.render())),
        }
    }

    fn deserialize_unit_struct<V>(self, name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self {
            Value::Null => visitor.visit_unit(),
            _ => Err(Error::conversion(name, self.render())),
        }
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visit_array(self, "sequence", visitor)
    }

    fn deserialize_tuple<V>(self, len: usize, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let target = format!("array of length {len}");
        match self {
            Value::Null => return visitor.visit_seq(NullSeq { remaining: len }),
            Value::Array(items) if items.len() != len => {
                return Err(Error::conversion(target, self.render()));
            }
            _ => {}
        }
        visit_array(self, &target, visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self {
            Value::Null => return visitor.visit_seq(NullSeq { remaining: len }),
            Value::Array(items) if items.len() != len => {
                return Err(Error::conversion(name, self.render()));
            }
            _ => {}
        }
        visit_array(self, name, visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visit_object(self, "map", visitor)
    }

    fn deserialize_struct<V>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        if self.is_null() {
            return visitor
                .visit_map(NullFields::new(fields))
                .map_err(|err| Error::nested(name, self.render(), err));
        }
        visit_object(self, name, visitor)
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self {
            // The first declared variant, carrying a null payload.
            Value::Null => match variants.first() {
                Some(variant) => visitor
                    .visit_enum(EnumDeserializer::new(variant, Some(&NULL)))
                    .map_err(|err| Error::nested(name, self.render(), err)),
                None => Err(Error::conversion(name, self.render())),
            },
            Value::String(s) => visitor.visit_enum(s.as_str().into_deserializer()),
            Value::Object(obj) => {
                let mut entries = obj.iter();
                match (entries.next(), entries.next()) {
                    (Some((variant, value)), None) => visitor
                        .visit_enum(EnumDeserializer::new(variant, Some(value)))
                        .map_err(|err| Error::nested(name, self.render(), err)),
                    _ => Err(Error::conversion(name, self.render())),
                }
            }
            _ => Err(Error::conversion(name, self.render())),
        }
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_unit()
    }
}

fn visit_array<'de, V>(node: &'de Value, target: &str, visitor: V) -> Result<V::Value>
where
    V: Visitor<'de>,
{
    let items: &'de [Value] = match node {
        Value::Array(items) => items,
        Value::Null => &[],
        _ => return Err(Error::conversion(target, node.render())),
    };
    visitor
        .visit_seq(SeqDeserializer::new(items))
        .map_err(|err| Error::nested(target, node.render(), err))
}

fn visit_object<'de, V>(node: &'de Value, target: &str, visitor: V) -> Result<V::Value>
where
    V: Visitor<'de>,
{
    let obj = match node {
        Value::Object(obj) => Some(obj),
        Value::Null => None,
        _ => return Err(Error::conversion(target, node.render())),
    };
    visitor
        .visit_map(MapDeserializer::new(obj))
        .map_err(|err| Error::nested(target, node.render(), err))
}

fn visit_number<'de, V>(visitor: V, n: &Number) -> Result<V::Value>
where
    V: Visitor<'de>,
{
    if !n.is_integral() {
        return visitor.visit_f64(n.convert::<f64>()?);
    }
    if let Ok(i) = n.convert::<i64>() {
        visitor.visit_i64(i)
    } else if let Ok(u) = n.convert::<u64>() {
        visitor.visit_u64(u)
    } else {
        visitor.visit_i128(n.convert::<i128>()?)
    }
}

fn values_to_bytes(node: &Value, values: &[Value]) -> Result<Vec<u8>> {
    values
        .iter()
        .map(|value| match value {
            Value::Number(n) => Ok(n.convert::<u8>()?),
            _ => Err(Error::conversion("bytes", node.render())),
        })
        .collect()
}

struct SeqDeserializer<'de> {
    iter: std::slice::Iter<'de, Value>,
}

impl<'de> SeqDeserializer<'de> {
    fn new(values: &'de [Value]) -> Self {
        SeqDeserializer {
            iter: values.iter(),
        }
    }
}

impl<'de> SeqAccess<'de> for SeqDeserializer<'de> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed.deserialize(value).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

/// Walks entries in insertion order; `None` stands for a `null` node.
struct MapDeserializer<'de> {
    iter: Option<indexmap::map::Iter<'de, SmolStr, Value>>,
    value: Option<&'de Value>,
}

impl<'de> MapDeserializer<'de> {
    fn new(map: Option<&'de Object>) -> Self {
        MapDeserializer {
            iter: map.map(|map| map.iter()),
            value: None,
        }
    }
}

impl<'de> MapAccess<'de> for MapDeserializer<'de> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.as_mut().and_then(Iterator::next) {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(key.as_str().into_deserializer()).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(value) => seed.deserialize(value),
            None => Err(<Error as de::Error>::custom("value is missing for key")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        self.iter.as_ref().map(|iter| iter.len())
    }
}

/// Yields `remaining` null elements, each narrowing to its own zero value.
struct NullSeq {
    remaining: usize,
}

impl<'de> SeqAccess<'de> for NullSeq {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        let null: &'de Value = &NULL;
        seed.deserialize(null).map(Some)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.remaining)
    }
}

/// Pairs every declared field name with a null value.
struct NullFields {
    fields: std::slice::Iter<'static, &'static str>,
}

impl NullFields {
    fn new(fields: &'static [&'static str]) -> Self {
        NullFields {
            fields: fields.iter(),
        }
    }
}

impl<'de> MapAccess<'de> for NullFields {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.fields.next() {
            Some(field) => seed
                .deserialize(IntoDeserializer::<Error>::into_deserializer(*field))
                .map(Some),
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        let null: &'de Value = &NULL;
        seed.deserialize(null)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.fields.len())
    }
}

struct EnumDeserializer<'de> {
    variant: &'de str,
    value: Option<&'de Value>,
}

impl<'de> EnumDeserializer<'de> {
    fn new(variant: &'de str, value: Option<&'de Value>) -> Self {
        EnumDeserializer { variant, value }
    }
}

impl<'de> EnumAccess<'de> for EnumDeserializer<'de> {
    type Error = Error;
    type Variant = VariantDeserializer<'de>;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let val = seed.deserialize(IntoDeserializer::<Error>::into_deserializer(self.variant))?;
        Ok((val, VariantDeserializer { value: self.value }))
    }
}

struct VariantDeserializer<'de> {
    value: Option<&'de Value>,
}

impl<'de> VariantAccess<'de> for VariantDeserializer<'de> {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            None | Some(Value::Null) => Ok(()),
            Some(other) => Err(Error::conversion("unit variant", other.render())),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.value {
            Some(value) => seed.deserialize(value),
            None => Err(<Error as de::Error>::custom("expected newtype variant")),
        }
    }

    fn tuple_variant<V>(self, len: usize, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Some(value) => value.deserialize_tuple(len, visitor),
            None => Err(<Error as de::Error>::custom("expected tuple variant")),
        }
    }

    fn struct_variant<V>(self, fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Some(value) => value.deserialize_struct("struct variant", fields, visitor),
            None => Err(<Error as de::Error>::custom("expected struct variant")),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashSet};

    use serde::Deserialize;

    use super::from_value;
    use crate::decode::parse;
    use crate::options::ParseOptions;
    use crate::types::Value;
    use crate::ErrorKind;

    fn tree(text: &str) -> Value {
        parse(text, &ParseOptions::default()).expect("parse")
    }

    #[derive(Debug, Deserialize, PartialEq)]
    enum Shape {
        Point,
        Circle { radius: f64 },
        Pair(i32, i32),
    }

    #[rstest::rstest]
    fn test_null_is_zero_for_scalars() {
        let null = Value::Null;
        assert_eq!(from_value::<i32>(&null).unwrap(), 0);
        assert_eq!(from_value::<f64>(&null).unwrap(), 0.0);
        assert_eq!(from_value::<String>(&null).unwrap(), "");
        assert_eq!(from_value::<Option<String>>(&null).unwrap(), None);
        assert!(!from_value::<bool>(&null).unwrap());
        assert!(from_value::<Vec<i32>>(&null).unwrap().is_empty());
        assert!(from_value::<BTreeMap<String, i32>>(&null).unwrap().is_empty());
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Reading {
        sensor: String,
        level: u8,
        window: [i32; 2],
        tags: Vec<String>,
        shape: Shape,
        note: Option<String>,
    }

    #[rstest::rstest]
    fn test_null_is_zero_for_fixed_shapes() {
        let null = Value::Null;
        assert_eq!(from_value::<[i32; 3]>(&null).unwrap(), [0, 0, 0]);
        assert_eq!(
            from_value::<(i32, String)>(&null).unwrap(),
            (0, String::new())
        );
        assert_eq!(from_value::<Shape>(&null).unwrap(), Shape::Point);
        assert_eq!(
            from_value::<Reading>(&null).unwrap(),
            Reading {
                sensor: String::new(),
                level: 0,
                window: [0, 0],
                tags: Vec::new(),
                shape: Shape::Point,
                note: None,
            }
        );
    }

    #[rstest::rstest]
    fn test_null_members_take_zero_values() {
        let reading = from_value::<Reading>(&tree(
            r#"{"sensor": "t1", "level": null, "window": null, "tags": null, "shape": {"Pair": null}, "note": null}"#,
        ))
        .unwrap();
        assert_eq!(reading.sensor, "t1");
        assert_eq!(reading.level, 0);
        assert_eq!(reading.window, [0, 0]);
        assert_eq!(reading.shape, Shape::Pair(0, 0));
    }

    #[rstest::rstest]
    fn test_mismatched_scalar_kinds_fail() {
        let err = from_value::<String>(&tree("12")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conversion);
        assert_eq!(err.to_string(), "could not convert to string the following JSON: 12");

        let err = from_value::<i32>(&tree("\"12\"")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conversion);
    }

    #[rstest::rstest]
    fn test_char_requires_single_character() {
        assert_eq!(from_value::<char>(&tree("\"x\"")).unwrap(), 'x');
        assert!(from_value::<char>(&tree("\"xy\"")).is_err());
    }

    #[rstest::rstest]
    fn test_enum_variants() {
        assert_eq!(from_value::<Shape>(&tree("\"Point\"")).unwrap(), Shape::Point);
        assert_eq!(
            from_value::<Shape>(&tree(r#"{"Circle": {"radius": 1.5}}"#)).unwrap(),
            Shape::Circle { radius: 1.5 }
        );
        assert_eq!(
            from_value::<Shape>(&tree(r#"{"Pair": [1, 2]}"#)).unwrap(),
            Shape::Pair(1, 2)
        );
        assert!(from_value::<Shape>(&tree(r#"{"Point": null, "Pair": [1, 2]}"#)).is_err());
    }

    #[rstest::rstest]
    fn test_fixed_arrays_check_length() {
        assert_eq!(from_value::<[i32; 3]>(&tree("[1, 10, 20]")).unwrap(), [1, 10, 20]);
        let err = from_value::<[i32; 2]>(&tree("[1, 10, 20]")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "could not convert to array of length 2 the following JSON: [1, 10, 20]"
        );
        let boxed = from_value::<Box<[f64]>>(&tree("[2.75, 10, 20.5]")).unwrap();
        assert_eq!(&*boxed, &[2.75, 10.0, 20.5]);
    }

    #[rstest::rstest]
    fn test_set_drops_duplicates() {
        let set = from_value::<HashSet<i64>>(&tree("[1, 10, 1, 20]")).unwrap();
        assert_eq!(set, HashSet::from([1, 10, 20]));
    }

    #[rstest::rstest]
    fn test_bytes_from_number_array() {
        let bytes: bytes_target::Bytes = from_value(&tree("[104, 105]")).unwrap();
        assert_eq!(bytes.0, b"hi");
        assert!(from_value::<bytes_target::Bytes>(&tree("[256]")).is_err());
    }

    #[rstest::rstest]
    fn test_any_keeps_integers_and_floats_apart() {
        let json: serde_json::Value = from_value(&tree(r#"[1, 2.5, "x", null]"#)).unwrap();
        assert_eq!(json, serde_json::json!([1, 2.5, "x", null]));
        assert!(json[0].is_i64());
    }

    mod bytes_target {
        use std::fmt;

        use serde::de::{self, Deserialize, Deserializer, Visitor};

        pub struct Bytes(pub Vec<u8>);

        impl<'de> Deserialize<'de> for Bytes {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                struct BytesVisitor;

                impl<'de> Visitor<'de> for BytesVisitor {
                    type Value = Bytes;

                    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                        f.write_str("bytes")
                    }

                    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Bytes, E> {
                        Ok(Bytes(v.to_vec()))
                    }

                    fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> Result<Bytes, E> {
                        Ok(Bytes(v))
                    }
                }

                deserializer.deserialize_byte_buf(BytesVisitor)
            }
        }
    }
}
