use crate::{
    Column, EntityId, ErrorContext, Fieldable, Result, Row, RowId, StoreError, StoredRow, Value,
};
use std::{
    fmt::{self, Debug, Display, Write},
    sync::{Arc, OnceLock, PoisonError, RwLock, RwLockReadGuard},
};
use tokio::sync::broadcast;

const CHANGES_CAPACITY: usize = 64;

/// Binding between an entity and its backing row.
///
/// Attachments made by the storage engine share one row cell per stored row,
/// the engine keeps it in sync with every write it commits.
#[derive(Debug, Clone)]
pub struct Attachment {
    row_id: RowId,
    row: Arc<RwLock<Row>>,
}

impl Attachment {
    /// Attachment to a private copy of `stored`.
    pub fn new(stored: StoredRow) -> Self {
        Self::shared(stored.row_id, Arc::new(RwLock::new(stored.row)))
    }
    pub(crate) fn shared(row_id: RowId, row: Arc<RwLock<Row>>) -> Self {
        Self { row_id, row }
    }
    pub fn row_id(&self) -> RowId {
        self.row_id
    }
    /// Current content of the row.
    pub fn row(&self) -> RwLockReadGuard<'_, Row> {
        self.row.read().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Notification sent when a field of an entity is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Change {
    pub key: &'static str,
}

/// State shared by every entity: the row reference and the change channel.
#[derive(Default)]
pub struct Base {
    attachment: OnceLock<Attachment>,
    changes: OnceLock<broadcast::Sender<Change>>,
}

impl Base {
    /// Binds the row, only the first attachment is kept.
    pub fn attach(&self, attachment: Attachment) -> bool {
        self.attachment.set(attachment).is_ok()
    }
    pub fn is_attached(&self) -> bool {
        self.attachment.get().is_some()
    }
    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.get()
    }
    pub fn row_id(&self) -> Option<RowId> {
        self.attachment.get().map(Attachment::row_id)
    }
    /// Receives a `Change` for every effective field write.
    pub fn subscribe(&self) -> broadcast::Receiver<Change> {
        self.changes
            .get_or_init(|| broadcast::channel(CHANGES_CAPACITY).0)
            .subscribe()
    }
    pub(crate) fn notify(&self, key: &'static str) {
        if let Some(changes) = self.changes.get() {
            // No receivers is fine
            let _ = changes.send(Change { key });
        }
    }
}

impl Debug for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Base")
            .field("row_id", &self.row_id())
            .finish()
    }
}

/// Persistence payload of an entity, captured before the write is queued.
#[derive(Debug, Clone, PartialEq)]
pub struct Changeset {
    pub entity: &'static str,
    pub id_key: &'static str,
    /// Canonical identifier.
    pub id: String,
    pub id_value: Value,
    pub row_id: Option<RowId>,
    /// Identifier held by the attached row, it must still match when writing.
    pub row_key: Option<Value>,
    /// Dirty columns, in declaration order.
    pub values: Vec<(&'static str, Value)>,
}

/// Schema contract of a mapped type.
///
/// ```ignore
/// #[derive(Default)]
/// struct Tag {
///     base: Base,
///     id: Field<String>,
///     color: Field<u32>,
/// }
/// impl Entity for Tag {
///     type Id = String;
///     type Input = (String, u32);
///     const NAME: &'static str = "Tag";
///     const COLUMNS: &'static [Column<Self>] = columns![Tag: id, color];
///     fn base(&self) -> &Base {
///         &self.base
///     }
///     fn id(&mut self) -> String {
///         self.id.read(&self.base).clone()
///     }
///     fn awake(&mut self, (id, color): Self::Input) -> Result<()> {
///         self.id.write(id, &self.base);
///         self.color.write(color, &self.base);
///         Ok(())
///     }
/// }
/// ```
///
/// `Default` must build a detached entity whose fields carry their column keys.
pub trait Entity: Default + Send + 'static {
    type Id: EntityId;
    /// Payload the entity is built from.
    type Input: Send + 'static;

    const NAME: &'static str;
    const ID_KEY: &'static str = "id";
    const COLUMNS: &'static [Column<Self>];

    fn base(&self) -> &Base;
    fn id(&mut self) -> Self::Id;
    /// Fills the fields from the input payload.
    fn awake(&mut self, input: Self::Input) -> Result<()>;

    fn from_input(input: Self::Input) -> Result<Self> {
        let mut entity = Self::default();
        entity
            .awake(input)
            .with_context(|| format!("Could not build a `{}` from its input", Self::NAME))?;
        Ok(entity)
    }

    fn is_empty(&mut self) -> bool {
        self.id().is_empty()
    }

    fn is_attached(&self) -> bool {
        self.base().is_attached()
    }

    fn row_id(&self) -> Option<RowId> {
        self.base().row_id()
    }

    fn is_dirty(&self) -> bool {
        Self::COLUMNS.iter().any(|c| (c.get)(self).is_dirty())
    }

    fn attach(&self, attachment: Attachment) -> bool {
        self.base().attach(attachment)
    }

    /// Captures the dirty fields, failing before any store access when the
    /// identifier is empty.
    fn changeset(&mut self) -> Result<Changeset> {
        let id = self.id();
        if id.is_empty() {
            return Err(StoreError::InvalidIdentifier {
                entity: Self::NAME.into(),
            }
            .into());
        }
        let mut values = Vec::new();
        for column in Self::COLUMNS {
            let slot = (column.get)(self);
            if slot.is_dirty() {
                let value = slot.encode().with_context(|| {
                    format!("Could not encode the field `{}.{}`", Self::NAME, slot.key())
                })?;
                values.push((slot.key(), value));
            }
        }
        Ok(Changeset {
            entity: Self::NAME,
            id_key: Self::ID_KEY,
            id: id.canonical(),
            id_value: id.encode()?,
            row_id: self.row_id(),
            row_key: self
                .base()
                .attachment()
                .and_then(|v| v.row().get(Self::ID_KEY).cloned()),
            values,
        })
    }

    /// Marks the fields persisted by `changeset` as clean.
    fn settle(&mut self, changeset: &Changeset) {
        for column in Self::COLUMNS {
            let slot = (column.get_mut)(self);
            if changeset.values.iter().any(|(k, _)| *k == slot.key()) {
                slot.settle();
            }
        }
    }

    /// Printable form listing the cached field values.
    fn describe(&self) -> Describe<'_, Self> {
        Describe(self)
    }
}

pub struct Describe<'a, E: Entity>(&'a E);

impl<E: Entity> Display for Describe<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(E::NAME)?;
        if let Some(row_id) = self.0.row_id() {
            write!(f, " {}", row_id)?;
        }
        f.write_str(" {")?;
        for (i, column) in E::COLUMNS.iter().enumerate() {
            let slot = (column.get)(self.0);
            f.write_str(if i == 0 { " " } else { ", " })?;
            write!(f, "{}: ", slot.key())?;
            if !slot.is_loaded() && !slot.is_dirty() && self.0.is_attached() {
                f.write_str("<unloaded>")?;
            } else {
                match slot.encode() {
                    Ok(value) => write!(f, "{}", value)?,
                    Err(..) => f.write_str("<invalid>")?,
                }
            }
            if slot.is_dirty() {
                f.write_char('*')?;
            }
        }
        f.write_str(" }")
    }
}
