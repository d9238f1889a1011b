use crate::Fieldable;
use std::hash::Hash;
use uuid::Uuid;

/// Logical identifier of an entity.
///
/// Two entities with the same canonical identifier are the same logical row.
/// The empty string and the integer zero are the "no identifier" sentinel.
pub trait EntityId: Fieldable + Eq + Hash {
    /// Canonical string form, used for row lookup and identity comparison.
    fn canonical(&self) -> String;
    fn is_empty(&self) -> bool {
        self.canonical().is_empty()
    }
}

macro_rules! impl_entity_id_integer {
    ($($t:ty),+) => {
        $(
            impl EntityId for $t {
                fn canonical(&self) -> String {
                    if *self == 0 {
                        String::new()
                    } else {
                        self.to_string()
                    }
                }
                fn is_empty(&self) -> bool {
                    *self == 0
                }
            }
        )+
    };
}
impl_entity_id_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl EntityId for String {
    fn canonical(&self) -> String {
        self.clone()
    }
    fn is_empty(&self) -> bool {
        String::is_empty(self)
    }
}

impl EntityId for Uuid {
    fn canonical(&self) -> String {
        self.hyphenated().to_string()
    }
    fn is_empty(&self) -> bool {
        false
    }
}
