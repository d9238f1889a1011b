use crate::{Error, ErrorContext, Result, StoreError};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Storage class of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Boolean,
    Integer,
    Float,
    Text,
    Blob,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnModel {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ColumnKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityModel {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnModel>,
}

impl EntityModel {
    pub fn column(&self, name: &str) -> Option<&ColumnModel> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Externally declared schema: the entities and their columns.
///
/// ```json
/// {
///   "name": "Library",
///   "entities": [
///     { "name": "Book", "columns": [
///       { "name": "id", "type": "integer" },
///       { "name": "title", "type": "text" }
///     ] }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub name: String,
    #[serde(default)]
    pub entities: Vec<EntityModel>,
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entities: Vec::new(),
        }
    }

    /// Appends an entity, following `with_column` calls add columns to it.
    pub fn with_entity(mut self, name: impl Into<String>) -> Self {
        self.entities.push(EntityModel {
            name: name.into(),
            columns: Vec::new(),
        });
        self
    }

    /// Adds a column to the last entity added.
    pub fn with_column(mut self, name: impl Into<String>, kind: ColumnKind) -> Self {
        if let Some(entity) = self.entities.last_mut() {
            entity.columns.push(ColumnModel {
                name: name.into(),
                kind,
            });
        }
        self
    }

    /// Reads `<dir>/<name>.json`.
    pub fn load(dir: impl AsRef<Path>, name: &str) -> Result<Self> {
        let path = dir.as_ref().join(format!("{}.json", name));
        let not_found = || StoreError::ModelNotFound { model: name.into() };
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Could not read `{}`", path.display()))
            .context(not_found())?;
        let model: Model = serde_json::from_str(&content)
            .with_context(|| format!("Could not parse `{}`", path.display()))
            .context(not_found())?;
        if model.name != name {
            return Err(Error::msg(format!(
                "`{}` declares the model `{}`",
                path.display(),
                model.name
            ))
            .context(not_found()));
        }
        Ok(model)
    }

    pub fn entity(&self, name: &str) -> Result<&EntityModel> {
        self.entities.iter().find(|e| e.name == name).ok_or_else(|| {
            StoreError::EntityNotFound {
                entity: name.into(),
            }
            .into()
        })
    }
}
