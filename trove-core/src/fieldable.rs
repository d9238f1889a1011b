use crate::{Error, Result, Value};
use rust_decimal::{Decimal, prelude::FromPrimitive};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::{
    collections::{BTreeMap, HashMap},
    hash::Hash,
    ops::{Deref, DerefMut},
};
use time::OffsetDateTime;
use uuid::Uuid;

/// Converts a typed field value to and from the store primitive representation.
pub trait Fieldable: Clone + PartialEq + Send + Sync + 'static {
    fn encode(&self) -> Result<Value>;
    fn decode(value: Value) -> Result<Self>;
}

fn unexpected<T>(value: &Value, target: &str) -> Result<T> {
    Err(Error::msg(format!(
        "Cannot decode a {} value `{}` into {}",
        value.kind(),
        crate::truncate_long!(value.to_string()),
        target
    )))
}

macro_rules! impl_fieldable_integer {
    ($($t:ty),+) => {
        $(
            impl Fieldable for $t {
                fn encode(&self) -> Result<Value> {
                    i64::try_from(*self).map(Value::Int64).map_err(|_| {
                        Error::msg(format!(
                            "The {} value {} is out of the storable integer range",
                            stringify!($t),
                            self
                        ))
                    })
                }
                fn decode(value: Value) -> Result<Self> {
                    let integer = match value {
                        Value::Int64(v) => v,
                        Value::Boolean(v) => v as i64,
                        Value::Float64(v)
                            if v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 =>
                        {
                            v as i64
                        }
                        Value::Varchar(ref v) => match v.trim().parse::<i64>() {
                            Ok(v) => v,
                            Err(_) => return unexpected(&value, stringify!($t)),
                        },
                        _ => return unexpected(&value, stringify!($t)),
                    };
                    <$t>::try_from(integer).map_err(|_| {
                        Error::msg(format!(
                            "The integer {} is out of range for {}",
                            integer,
                            stringify!($t)
                        ))
                    })
                }
            }
        )+
    };
}
impl_fieldable_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Fieldable for bool {
    fn encode(&self) -> Result<Value> {
        Ok(Value::Boolean(*self))
    }
    fn decode(value: Value) -> Result<Self> {
        match value {
            Value::Boolean(v) => Ok(v),
            Value::Int64(v) => Ok(v != 0),
            Value::Varchar(ref v) => match v.as_str() {
                "true" | "1" => Ok(true),
                "false" | "0" => Ok(false),
                _ => unexpected(&value, "bool"),
            },
            _ => unexpected(&value, "bool"),
        }
    }
}

macro_rules! impl_fieldable_float {
    ($($t:ty),+) => {
        $(
            impl Fieldable for $t {
                fn encode(&self) -> Result<Value> {
                    Ok(Value::Float64(*self as f64))
                }
                fn decode(value: Value) -> Result<Self> {
                    match value {
                        Value::Float64(v) => Ok(v as $t),
                        Value::Int64(v) => Ok(v as $t),
                        Value::Varchar(ref v) => match v.trim().parse::<$t>() {
                            Ok(v) => Ok(v),
                            Err(_) => unexpected(&value, stringify!($t)),
                        },
                        _ => unexpected(&value, stringify!($t)),
                    }
                }
            }
        )+
    };
}
impl_fieldable_float!(f32, f64);

impl Fieldable for String {
    fn encode(&self) -> Result<Value> {
        Ok(Value::Varchar(self.clone()))
    }
    fn decode(value: Value) -> Result<Self> {
        match value {
            Value::Varchar(v) => Ok(v),
            Value::Int64(v) => Ok(v.to_string()),
            Value::Float64(v) => Ok(v.to_string()),
            Value::Blob(v) => String::from_utf8(v.into_vec())
                .map_err(|e| Error::new(e).context("Cannot decode a non utf-8 blob into String")),
            _ => unexpected(&value, "String"),
        }
    }
}

impl Fieldable for Box<[u8]> {
    fn encode(&self) -> Result<Value> {
        Ok(Value::Blob(self.clone()))
    }
    fn decode(value: Value) -> Result<Self> {
        match value {
            Value::Blob(v) => Ok(v),
            Value::Varchar(v) => Ok(v.into_bytes().into()),
            _ => unexpected(&value, "Box<[u8]>"),
        }
    }
}

impl Fieldable for Uuid {
    fn encode(&self) -> Result<Value> {
        Ok((*self).into())
    }
    fn decode(value: Value) -> Result<Self> {
        match value {
            Value::Varchar(ref v) => Uuid::parse_str(v)
                .map_err(|e| Error::new(e).context(format!("Cannot parse `{}` as Uuid", v))),
            Value::Blob(ref v) => Uuid::from_slice(v)
                .map_err(|e| Error::new(e).context("Cannot decode a blob into Uuid")),
            _ => unexpected(&value, "Uuid"),
        }
    }
}

impl Fieldable for Decimal {
    fn encode(&self) -> Result<Value> {
        Ok(Value::Varchar(self.to_string()))
    }
    fn decode(value: Value) -> Result<Self> {
        match value {
            Value::Varchar(ref v) => v
                .parse::<Decimal>()
                .map_err(|e| Error::new(e).context(format!("Cannot parse `{}` as Decimal", v))),
            Value::Int64(v) => Ok(v.into()),
            Value::Float64(v) => match Decimal::from_f64(v) {
                Some(v) => Ok(v),
                None => unexpected(&value, "Decimal"),
            },
            _ => unexpected(&value, "Decimal"),
        }
    }
}

/// Stored as seconds since the Unix epoch, with the fractional part.
impl Fieldable for OffsetDateTime {
    fn encode(&self) -> Result<Value> {
        Ok(Value::Float64(self.unix_timestamp_nanos() as f64 / 1e9))
    }
    fn decode(value: Value) -> Result<Self> {
        let result = match value {
            Value::Float64(v) => {
                OffsetDateTime::from_unix_timestamp_nanos((v * 1e9).round() as i128)
            }
            Value::Int64(v) => OffsetDateTime::from_unix_timestamp(v),
            _ => return unexpected(&value, "OffsetDateTime"),
        };
        result.map_err(|e| Error::new(e).context("The timestamp is out of range"))
    }
}

impl<T: Fieldable> Fieldable for Option<T> {
    fn encode(&self) -> Result<Value> {
        match self {
            Some(v) => v.encode(),
            None => Ok(Value::Null),
        }
    }
    fn decode(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            v => T::decode(v).map(Some),
        }
    }
}

pub(crate) fn encode_json<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    serde_json::to_vec(value)
        .map(|v| Value::Blob(v.into()))
        .map_err(|e| Error::new(e).context("Could not encode the value as a json blob"))
}

pub(crate) fn decode_json<T: DeserializeOwned>(value: Value) -> Result<T> {
    let result = match value {
        Value::Blob(ref v) => serde_json::from_slice(v),
        Value::Varchar(ref v) => serde_json::from_str(v),
        Value::List(..) | Value::Map(..) => serde_json::from_value(value.to_json()),
        _ => return unexpected(&value, "a json document"),
    };
    result.map_err(|e| {
        Error::new(e).context(format!(
            "Could not decode the json {} into {}",
            value.kind(),
            std::any::type_name::<T>()
        ))
    })
}

impl<T> Fieldable for Vec<T>
where
    T: Serialize + DeserializeOwned + Clone + PartialEq + Send + Sync + 'static,
{
    fn encode(&self) -> Result<Value> {
        encode_json(self)
    }
    fn decode(value: Value) -> Result<Self> {
        decode_json(value)
    }
}

impl<K, V> Fieldable for BTreeMap<K, V>
where
    K: Serialize + DeserializeOwned + Ord + Clone + Send + Sync + 'static,
    V: Serialize + DeserializeOwned + Clone + PartialEq + Send + Sync + 'static,
{
    fn encode(&self) -> Result<Value> {
        encode_json(self)
    }
    fn decode(value: Value) -> Result<Self> {
        decode_json(value)
    }
}

impl<K, V> Fieldable for HashMap<K, V>
where
    K: Serialize + DeserializeOwned + Eq + Hash + Clone + Send + Sync + 'static,
    V: Serialize + DeserializeOwned + Clone + PartialEq + Send + Sync + 'static,
{
    fn encode(&self) -> Result<Value> {
        encode_json(self)
    }
    fn decode(value: Value) -> Result<Self> {
        decode_json(value)
    }
}

/// Stores any serde type as a json blob in a single column.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Json<T>(pub T);

impl<T> Deref for Json<T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for Json<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T> Fieldable for Json<T>
where
    T: Serialize + DeserializeOwned + Clone + PartialEq + Send + Sync + 'static,
{
    fn encode(&self) -> Result<Value> {
        encode_json(&self.0)
    }
    fn decode(value: Value) -> Result<Self> {
        decode_json(value).map(Json)
    }
}

/// Implements `Fieldable` for a type stored through its raw representation.
///
/// The type must provide `From<Type> for Raw` and `TryFrom<Raw> for Type`, the
/// raw type must be `Fieldable` itself (usually an integer or a `String`).
///
/// ```ignore
/// impl_fieldable_raw!(Genre => i32);
/// ```
#[macro_export]
macro_rules! impl_fieldable_raw {
    ($type:ty => $raw:ty) => {
        impl $crate::Fieldable for $type {
            fn encode(&self) -> $crate::Result<$crate::Value> {
                <$raw as $crate::Fieldable>::encode(&<$raw>::from(self.clone()))
            }
            fn decode(value: $crate::Value) -> $crate::Result<Self> {
                let raw = <$raw as $crate::Fieldable>::decode(value)?;
                <$type>::try_from(raw.clone()).map_err(|_| {
                    $crate::Error::msg(format!(
                        "`{:?}` is not a valid raw value for {}",
                        raw,
                        stringify!($type)
                    ))
                })
            }
        }
    };
}
