use crate::{Entity, Error, ErrorContext, Result, RowId, Value};
use std::{
    cmp::Ordering,
    fmt::{self, Display},
};

/// Predicate template with positional arguments.
///
/// The template is a boolean sql expression using `?` placeholders, it is
/// handed to the store as is.
#[derive(Debug, Clone, PartialEq)]
pub struct Where {
    format: String,
    args: Vec<Value>,
}

impl Where {
    pub fn new(format: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            format: format.into(),
            args,
        }
    }
    pub fn with(format: impl Into<String>) -> Self {
        Self::new(format, Vec::new())
    }
    /// Matches the rows whose `key` column equals `id`.
    pub fn id_equals(key: &str, id: impl Into<Value>) -> Self {
        Self::with(format!("\"{}\" = ?", key.replace('"', "\"\""))).arg(id)
    }
    /// Matches the row `row_id` only while its `key` column still holds `id`,
    /// so a row identity reused by another entity never matches.
    pub fn row_identity(row_id: RowId, key: &str, id: impl Into<Value>) -> Self {
        Self::with(format!("rowid = ? AND \"{}\" IS ?", key.replace('"', "\"\"")))
            .arg(row_id.0)
            .arg(id)
    }
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }
    pub fn format(&self) -> &str {
        &self.format
    }
    pub fn args(&self) -> &[Value] {
        &self.args
    }
}

impl Display for Where {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format)?;
        if !self.args.is_empty() {
            f.write_str(" [")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", arg)?;
            }
            f.write_str("]")?;
        }
        Ok(())
    }
}

/// Ordered list of `(key, ascending)` sort criteria.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Orderby(Vec<(String, bool)>);

impl Orderby {
    pub fn new<K: Into<String>>(pairs: impl IntoIterator<Item = (K, bool)>) -> Self {
        Self(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
    pub fn ascending(key: impl Into<String>) -> Self {
        Self(vec![(key.into(), true)])
    }
    pub fn descending(key: impl Into<String>) -> Self {
        Self(vec![(key.into(), false)])
    }
    pub fn then(mut self, key: impl Into<String>, ascending: bool) -> Self {
        self.0.push((key.into(), ascending));
        self
    }
    pub fn pairs(&self) -> &[(String, bool)] {
        &self.0
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Compares two sort keys produced by `keys`.
    pub fn compare(&self, a: &[Value], b: &[Value]) -> Ordering {
        self.0
            .iter()
            .zip(a.iter().zip(b.iter()))
            .map(|((_, ascending), (a, b))| {
                let ordering = a.compare(b);
                if *ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            })
            .find(|v| v.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    /// Current values of the sort columns of `entity`, loading them if needed.
    pub fn keys<E: Entity>(&self, entity: &mut E) -> Result<Vec<Value>> {
        let attachment = entity.base().attachment().cloned();
        self.0
            .iter()
            .map(|(key, _)| {
                let column = E::COLUMNS
                    .iter()
                    .find(|c| (c.get)(&*entity).key() == key)
                    .ok_or_else(|| {
                        Error::msg(format!("`{}` has no field named `{}`", E::NAME, key))
                    })?;
                (column.get_mut)(&mut *entity)
                    .current(attachment.as_ref())
                    .with_context(|| format!("Could not read `{}.{}` to sort", E::NAME, key))
            })
            .collect()
    }

    /// Stable in memory sort of materialized entities.
    pub fn sort<E: Entity>(&self, entities: Vec<E>) -> Result<Vec<E>> {
        if self.is_empty() {
            return Ok(entities);
        }
        let mut keyed = entities
            .into_iter()
            .map(|mut entity| Ok((self.keys(&mut entity)?, entity)))
            .collect::<Result<Vec<_>>>()?;
        keyed.sort_by(|(a, _), (b, _)| self.compare(a, b));
        Ok(keyed.into_iter().map(|(_, entity)| entity).collect())
    }
}

impl Display for Orderby {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, ascending)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} {}", key, if *ascending { "ASC" } else { "DESC" })?;
        }
        Ok(())
    }
}

/// Zero based page of `size` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    pub index: u64,
    pub size: u64,
}

impl Pager {
    pub fn new(index: u64, size: u64) -> Self {
        Self { index, size }
    }
    pub fn offset(&self) -> u64 {
        self.index.saturating_mul(self.size)
    }
    pub fn limit(&self) -> u64 {
        self.size
    }
}
