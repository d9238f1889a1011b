use crate::{Error, Result};
use std::{
    cmp::Ordering,
    collections::BTreeMap,
    fmt::{self, Display, Write},
    sync::Arc,
};
use uuid::Uuid;

/// Dynamically typed value exchanged with the store.
///
/// It is both the primitive representation of a column (what a field encodes
/// into and decodes from) and the payload type of raw row inputs (batch
/// inserts, bulk updates, query arguments).
#[derive(Default, Debug, Clone, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Int64(i64),
    Float64(f64),
    Varchar(String),
    Blob(Box<[u8]>),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

/// Raw row payload, keyed by column name.
pub type Record = BTreeMap<String, Value>;

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Boolean(..) => "Boolean",
            Value::Int64(..) => "Int64",
            Value::Float64(..) => "Float64",
            Value::Varchar(..) => "Varchar",
            Value::Blob(..) => "Blob",
            Value::List(..) => "List",
            Value::Map(..) => "Map",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Boolean(..) => 1,
            Value::Int64(..) | Value::Float64(..) => 2,
            Value::Varchar(..) => 3,
            Value::Blob(..) => 4,
            Value::List(..) => 5,
            Value::Map(..) => 6,
        }
    }

    /// Total order used to sort materialized entities in memory.
    ///
    /// Null sorts first, numbers compare numerically regardless of the
    /// integer/float representation, different kinds compare by kind.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Boolean(l), Value::Boolean(r)) => l.cmp(r),
            (Value::Int64(l), Value::Int64(r)) => l.cmp(r),
            (Value::Float64(l), Value::Float64(r)) => l.total_cmp(r),
            (Value::Int64(l), Value::Float64(r)) => (*l as f64).total_cmp(r),
            (Value::Float64(l), Value::Int64(r)) => l.total_cmp(&(*r as f64)),
            (Value::Varchar(l), Value::Varchar(r)) => l.cmp(r),
            (Value::Blob(l), Value::Blob(r)) => l.cmp(r),
            (Value::List(l), Value::List(r)) => l
                .iter()
                .zip(r.iter())
                .map(|(l, r)| l.compare(r))
                .find(|v| v.is_ne())
                .unwrap_or_else(|| l.len().cmp(&r.len())),
            (Value::Map(l), Value::Map(r)) => l
                .iter()
                .zip(r.iter())
                .map(|((lk, lv), (rk, rv))| lk.cmp(rk).then_with(|| lv.compare(rv)))
                .find(|v| v.is_ne())
                .unwrap_or_else(|| l.len().cmp(&r.len())),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    /// Converts into a json document. Blobs become arrays of bytes.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(v) => (*v).into(),
            Value::Int64(v) => (*v).into(),
            Value::Float64(v) => serde_json::Number::from_f64(*v)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Varchar(v) => v.as_str().into(),
            Value::Blob(v) => serde_json::Value::Array(v.iter().map(|b| (*b).into()).collect()),
            Value::List(v) => serde_json::Value::Array(v.iter().map(Value::to_json).collect()),
            Value::Map(v) => serde_json::Value::Object(
                v.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }

    pub fn from_json(json: serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(v) => Value::Boolean(v),
            serde_json::Value::Number(v) => match v.as_i64() {
                Some(v) => Value::Int64(v),
                None => v.as_f64().map(Value::Float64).unwrap_or(Value::Null),
            },
            serde_json::Value::String(v) => Value::Varchar(v),
            serde_json::Value::Array(v) => Value::List(v.into_iter().map(Value::from_json).collect()),
            serde_json::Value::Object(v) => {
                Value::Map(v.into_iter().map(|(k, v)| (k, Value::from_json(v))).collect())
            }
        }
    }

    /// Json encoding used to store a composite value inside a single column.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(&self.to_json()).map_err(|e| {
            Error::new(e).context(format!("Could not encode a {} value as json", self.kind()))
        })
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Boolean(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "{}", v),
            Value::Float64(v) => write!(f, "{}", v),
            Value::Varchar(v) => write!(f, "{:?}", v),
            Value::Blob(v) => {
                f.write_str("X'")?;
                for b in v.iter() {
                    write!(f, "{:02X}", b)?;
                }
                f.write_char('\'')
            }
            Value::List(v) => {
                f.write_char('[')?;
                for (i, v) in v.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                f.write_char(']')
            }
            Value::Map(v) => {
                f.write_char('{')?;
                for (i, (k, v)) in v.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{:?}: {}", k, v)?;
                }
                f.write_char('}')
            }
        }
    }
}

macro_rules! impl_from_integer {
    ($($t:ty),+) => {
        $(
            impl From<$t> for Value {
                fn from(value: $t) -> Self {
                    Value::Int64(value as i64)
                }
            }
        )+
    };
}
impl_from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float64(value as f64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float64(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Varchar(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Varchar(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::Varchar(value.clone())
    }
}

impl From<Uuid> for Value {
    fn from(value: Uuid) -> Self {
        Value::Varchar(value.hyphenated().to_string())
    }
}

impl From<Box<[u8]>> for Value {
    fn from(value: Box<[u8]>) -> Self {
        Value::Blob(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Blob(value.into())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(value: BTreeMap<String, Value>) -> Self {
        Value::Map(value)
    }
}

/// Physical row identity assigned by the store, distinct from the entity identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(pub i64);

impl Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Shared reference-counted column name list.
pub type RowNames = Arc<[String]>;

/// A row snapshot with its corresponding column labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Column names.
    pub labels: RowNames,
    /// Data values (aligned by index with `labels`).
    pub values: Box<[Value]>,
}

impl Row {
    pub fn new(labels: RowNames, values: Box<[Value]>) -> Self {
        Self { labels, values }
    }
    pub fn names(&self) -> &[String] {
        &self.labels
    }
    pub fn values(&self) -> &[Value] {
        &self.values
    }
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.labels
            .iter()
            .position(|v| v == name)
            .map(|i| &self.values[i])
    }
}

impl From<Record> for Row {
    fn from(value: Record) -> Self {
        let (labels, values): (Vec<_>, Vec<_>) = value.into_iter().unzip();
        Row::new(labels.into(), values.into())
    }
}
