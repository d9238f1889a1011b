use std::{
    env,
    path::{Path, PathBuf},
};

/// Where the store keeps its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// Persisted as `<dir>/<model>.db`.
    Directory(PathBuf),
    /// Private in memory database, lost with the storage.
    Memory,
}

/// What to do when an existing store cannot be opened or migrated.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Report the error.
    #[default]
    Fail,
    /// Delete the store and start from empty, losing every row.
    Recreate,
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Model name, also the database file stem.
    pub model: String,
    /// Directory of `<model>.json`.
    pub model_dir: PathBuf,
    pub location: Location,
    pub recovery: Recovery,
}

impl Config {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            model_dir: PathBuf::from("."),
            location: Location::Directory(env::temp_dir()),
            recovery: Recovery::Fail,
        }
    }

    /// Like `new`, honouring `TROVE_MODEL_DIR` and `TROVE_DATABASE_DIR`.
    pub fn from_env(model: impl Into<String>) -> Self {
        let mut config = Self::new(model);
        if let Some(dir) = env::var_os("TROVE_MODEL_DIR") {
            config.model_dir = dir.into();
        }
        if let Some(dir) = env::var_os("TROVE_DATABASE_DIR") {
            config.location = Location::Directory(dir.into());
        }
        config
    }

    pub fn with_model_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.model_dir = dir.as_ref().into();
        self
    }

    pub fn with_directory(mut self, dir: impl AsRef<Path>) -> Self {
        self.location = Location::Directory(dir.as_ref().into());
        self
    }

    pub fn in_memory(mut self) -> Self {
        self.location = Location::Memory;
        self
    }

    pub fn with_recovery(mut self, recovery: Recovery) -> Self {
        self.recovery = recovery;
        self
    }

    /// Database file, `None` when in memory.
    pub fn database_path(&self) -> Option<PathBuf> {
        match &self.location {
            Location::Directory(dir) => Some(dir.join(format!("{}.db", self.model))),
            Location::Memory => None,
        }
    }

    pub fn thread_name(&self) -> String {
        format!("trove-{}", self.model)
    }
}
