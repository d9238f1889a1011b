use crate::{Attachment, Base, Fieldable, Result, Value};
use std::fmt::{self, Debug};
use tokio::sync::watch;

/// Lazily loaded, dirty tracked holder of one mapped entity property.
///
/// The slot reads its initial value from the attached row the first time it
/// is read, a pending write always wins over the row. Writes that do not
/// change the value leave the slot clean.
pub struct Field<T: Fieldable> {
    key: &'static str,
    value: T,
    loaded: bool,
    dirty: bool,
    publisher: Option<watch::Sender<T>>,
}

impl<T: Fieldable> Field<T> {
    /// Creates a slot mapped to the column `key`, holding `value` until loaded.
    pub fn new(key: &'static str, value: T) -> Self {
        Self {
            key,
            value,
            loaded: false,
            dirty: false,
            publisher: None,
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Returns the current value, loading it from the attached row when needed.
    ///
    /// A row value that cannot be decoded leaves the slot unloaded and the
    /// cached value in place.
    pub fn read(&mut self, base: &Base) -> &T {
        if !self.dirty && !self.loaded {
            self.load(base.attachment());
        }
        &self.value
    }

    /// Replaces the value, marking the slot dirty unless it is unchanged.
    pub fn write(&mut self, value: T, base: &Base) {
        if *self.read(base) == value {
            return;
        }
        self.value = value;
        self.dirty = true;
        self.loaded = true;
        self.publish();
        base.notify(self.key);
    }

    /// Subscribes to the value of this slot.
    ///
    /// The receiver starts with the current value and observes every later
    /// change made through `write`, and the first lazy load.
    pub fn watch(&mut self, base: &Base) -> watch::Receiver<T> {
        let current = self.read(base).clone();
        self.publisher
            .get_or_insert_with(|| watch::channel(current).0)
            .subscribe()
    }

    fn load(&mut self, attachment: Option<&Attachment>) {
        let Some(attachment) = attachment else {
            return;
        };
        let Some(value) = attachment.row().get(self.key).cloned() else {
            log::debug!("The attached row has no column `{}`", self.key);
            return;
        };
        match T::decode(value) {
            Ok(value) => {
                self.value = value;
                self.loaded = true;
                self.publish();
            }
            Err(error) => {
                log::debug!("Could not load the field `{}`: {:#}", self.key, error);
            }
        }
    }

    fn publish(&self) {
        if let Some(publisher) = &self.publisher {
            publisher.send_replace(self.value.clone());
        }
    }
}

impl<T: Fieldable + Debug> Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("key", &self.key)
            .field("value", &self.value)
            .field("loaded", &self.loaded)
            .field("dirty", &self.dirty)
            .finish()
    }
}

/// Type erased view of a `Field`, used by the entity column descriptors.
pub trait Slot: Send + Sync {
    fn key(&self) -> &'static str;
    fn is_dirty(&self) -> bool;
    fn is_loaded(&self) -> bool;
    /// Encodes the cached value.
    fn encode(&self) -> Result<Value>;
    /// Clears the dirty flag once the value is persisted.
    fn settle(&mut self);
    /// Loads from the attached row if needed, then encodes.
    fn current(&mut self, attachment: Option<&Attachment>) -> Result<Value>;
}

impl<T: Fieldable> Slot for Field<T> {
    fn key(&self) -> &'static str {
        self.key
    }
    fn is_dirty(&self) -> bool {
        self.dirty
    }
    fn is_loaded(&self) -> bool {
        self.loaded
    }
    fn encode(&self) -> Result<Value> {
        self.value.encode()
    }
    fn settle(&mut self) {
        self.dirty = false;
    }
    fn current(&mut self, attachment: Option<&Attachment>) -> Result<Value> {
        if !self.dirty && !self.loaded {
            self.load(attachment);
        }
        self.value.encode()
    }
}

/// Accessors of one mapped field of the entity `E`.
pub struct Column<E> {
    pub get: fn(&E) -> &dyn Slot,
    pub get_mut: fn(&mut E) -> &mut dyn Slot,
}

/// Builds the column descriptor list of an entity from its field names.
///
/// ```ignore
/// const COLUMNS: &'static [Column<Self>] = columns![User: id, name, age];
/// ```
#[macro_export]
macro_rules! columns {
    ($entity:ty: $($field:ident),+ $(,)?) => {
        &[$(
            $crate::Column::<$entity> {
                get: {
                    fn get(entity: &$entity) -> &dyn $crate::Slot {
                        &entity.$field
                    }
                    get
                },
                get_mut: {
                    fn get_mut(entity: &mut $entity) -> &mut dyn $crate::Slot {
                        &mut entity.$field
                    }
                    get_mut
                },
            }
        ),+]
    };
}
