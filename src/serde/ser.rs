//! Builds a [`Value`] from any `Serialize` type.
//!
//! Strings are stored in their escaped source form so the rendered tree
//! parses back to the same shape. `bool` has no node to land in and is
//! rejected.

use ::serde::ser::{self, Impossible, Serialize};
use smol_str::SmolStr;

use crate::num::Number;
use crate::text::string::escape_string;
use crate::types::{Object, Value};
use crate::{Error, Result};

pub fn to_value<T: ?Sized + Serialize>(value: &T) -> Result<Value> {
    value.serialize(ValueSerializer)
}

struct ValueSerializer;

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeTupleVariant;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeStruct;
    type SerializeStructVariant = SerializeStructVariant;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Err(<Error as ser::Error>::custom(format!(
            "cannot serialize boolean {v}: no boolean node"
        )))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::Number(Number::from(v)))
    }

    fn serialize_i128(self, v: i128) -> Result<Value> {
        Ok(Value::Number(Number::from(v)))
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        Ok(Value::Number(Number::from(v)))
    }

    fn serialize_u128(self, v: u128) -> Result<Value> {
        Ok(Value::Number(Number::from(v)))
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        // Widen through the shortest decimal form so 0.1f32 stays 0.1.
        let mut buffer = ryu::Buffer::new();
        let widened = buffer.format(v).parse::<f64>().unwrap_or(v as f64);
        self.serialize_f64(widened)
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        if !v.is_finite() {
            return Ok(Value::Null);
        }
        Number::from_f64(v)
            .map(Value::Number)
            .ok_or_else(|| <Error as ser::Error>::custom(format!("number {v} has no decimal form")))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        let mut buf = [0u8; 4];
        self.serialize_str(v.encode_utf8(&mut buf))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::String(escape_string(v)))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        let values = v
            .iter()
            .map(|b| Value::Number(Number::from(*b as u64)))
            .collect();
        Ok(Value::Array(values))
    }

    fn serialize_none(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        self.serialize_str(variant)
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        let mut map = Object::new();
        map.insert(variant_key(variant), value.serialize(ValueSerializer)?);
        Ok(Value::Object(map))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq> {
        Ok(SerializeVec::new(len))
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> {
        Ok(SerializeVec::new(Some(len)))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Ok(SerializeVec::new(Some(len)))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Ok(SerializeTupleVariant {
            variant,
            elements: SerializeVec::new(Some(len)),
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap> {
        Ok(SerializeMap {
            map: Object::with_capacity(len.unwrap_or(0)),
            next_key: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<Self::SerializeStruct> {
        Ok(SerializeStruct {
            map: Object::with_capacity(len),
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Ok(SerializeStructVariant {
            variant,
            fields: SerializeStruct {
                map: Object::with_capacity(len),
            },
        })
    }
}

fn variant_key(variant: &str) -> SmolStr {
    SmolStr::new(escape_string(variant))
}

struct SerializeVec {
    elements: Vec<Value>,
}

impl SerializeVec {
    fn new(len: Option<usize>) -> Self {
        SerializeVec {
            elements: Vec::with_capacity(len.unwrap_or(0)),
        }
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.elements.push(value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Array(self.elements))
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value> {
        ser::SerializeSeq::end(self)
    }
}

struct SerializeTupleVariant {
    variant: &'static str,
    elements: SerializeVec,
}

impl ser::SerializeTupleVariant for SerializeTupleVariant {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(&mut self.elements, value)
    }

    fn end(self) -> Result<Value> {
        let mut map = Object::new();
        map.insert(
            variant_key(self.variant),
            ser::SerializeSeq::end(self.elements)?,
        );
        Ok(Value::Object(map))
    }
}

struct SerializeMap {
    map: Object,
    next_key: Option<SmolStr>,
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.next_key = Some(key.serialize(KeySerializer)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .next_key
            .take()
            .ok_or_else(|| <Error as ser::Error>::custom("value serialized before key"))?;
        self.map.insert(key, value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Object(self.map))
    }
}

struct SerializeStruct {
    map: Object,
}

impl ser::SerializeStruct for SerializeStruct {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.map
            .insert(variant_key(key), value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Object(self.map))
    }
}

struct SerializeStructVariant {
    variant: &'static str,
    fields: SerializeStruct,
}

impl ser::SerializeStructVariant for SerializeStructVariant {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeStruct::serialize_field(&mut self.fields, key, value)
    }

    fn end(self) -> Result<Value> {
        let mut map = Object::new();
        map.insert(
            variant_key(self.variant),
            ser::SerializeStruct::end(self.fields)?,
        );
        Ok(Value::Object(map))
    }
}

/// Object keys: strings, chars, integers and unit variants.
struct KeySerializer;

impl KeySerializer {
    fn integer(v: impl itoa::Integer) -> Result<SmolStr> {
        let mut buffer = itoa::Buffer::new();
        Ok(SmolStr::new(buffer.format(v)))
    }

    fn reject(kind: &str) -> Error {
        <Error as ser::Error>::custom(format!("{kind} cannot be an object key"))
    }
}

impl ser::Serializer for KeySerializer {
    type Ok = SmolStr;
    type Error = Error;

    type SerializeSeq = Impossible<SmolStr, Error>;
    type SerializeTuple = Impossible<SmolStr, Error>;
    type SerializeTupleStruct = Impossible<SmolStr, Error>;
    type SerializeTupleVariant = Impossible<SmolStr, Error>;
    type SerializeMap = Impossible<SmolStr, Error>;
    type SerializeStruct = Impossible<SmolStr, Error>;
    type SerializeStructVariant = Impossible<SmolStr, Error>;

    fn serialize_bool(self, v: bool) -> Result<SmolStr> {
        Ok(SmolStr::new_static(if v { "true" } else { "false" }))
    }

    fn serialize_i8(self, v: i8) -> Result<SmolStr> {
        Self::integer(v)
    }

    fn serialize_i16(self, v: i16) -> Result<SmolStr> {
        Self::integer(v)
    }

    fn serialize_i32(self, v: i32) -> Result<SmolStr> {
        Self::integer(v)
    }

    fn serialize_i64(self, v: i64) -> Result<SmolStr> {
        Self::integer(v)
    }

    fn serialize_i128(self, v: i128) -> Result<SmolStr> {
        Self::integer(v)
    }

    fn serialize_u8(self, v: u8) -> Result<SmolStr> {
        Self::integer(v)
    }

    fn serialize_u16(self, v: u16) -> Result<SmolStr> {
        Self::integer(v)
    }

    fn serialize_u32(self, v: u32) -> Result<SmolStr> {
        Self::integer(v)
    }

    fn serialize_u64(self, v: u64) -> Result<SmolStr> {
        Self::integer(v)
    }

    fn serialize_u128(self, v: u128) -> Result<SmolStr> {
        Self::integer(v)
    }

    fn serialize_f32(self, _v: f32) -> Result<SmolStr> {
        Err(Self::reject("float"))
    }

    fn serialize_f64(self, _v: f64) -> Result<SmolStr> {
        Err(Self::reject("float"))
    }

    fn serialize_char(self, v: char) -> Result<SmolStr> {
        let mut buf = [0u8; 4];
        self.serialize_str(v.encode_utf8(&mut buf))
    }

    fn serialize_str(self, v: &str) -> Result<SmolStr> {
        Ok(variant_key(v))
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<SmolStr> {
        Err(Self::reject("byte array"))
    }

    fn serialize_none(self) -> Result<SmolStr> {
        Err(Self::reject("none"))
    }

    fn serialize_some<T>(self, value: &T) -> Result<SmolStr>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<SmolStr> {
        Err(Self::reject("unit"))
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<SmolStr> {
        Err(Self::reject("unit struct"))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<SmolStr> {
        Ok(variant_key(variant))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<SmolStr>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<SmolStr>
    where
        T: ?Sized + Serialize,
    {
        Err(Self::reject("newtype variant"))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(Self::reject("sequence"))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(Self::reject("tuple"))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(Self::reject("tuple struct"))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(Self::reject("tuple variant"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(Self::reject("map"))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(Self::reject("struct"))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(Self::reject("struct variant"))
    }
}
