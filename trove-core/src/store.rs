use crate::{Config, EntityModel, Model, Orderby, Pager, Record, Result, Row, RowId, Value, Where};

/// Row fetched from the store, with its physical identity.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRow {
    pub row_id: RowId,
    pub row: Row,
}

/// Transactional row store the storage engine runs on.
///
/// Every call happens on the storage worker thread, one at a time. Mutations
/// are only issued between `begin` and `commit` or `rollback`.
pub trait Store: Send + Sized + 'static {
    /// Opens (creating or migrating when needed) the store of `model`.
    fn open(config: &Config, model: Model) -> Result<Self>;

    fn model(&self) -> &Model;

    /// Schema of an entity, fails with `EntityNotFound`.
    fn describe(&self, entity: &str) -> Result<&EntityModel> {
        self.model().entity(entity)
    }

    fn fetch(
        &mut self,
        entity: &str,
        filter: Option<&Where>,
        orderby: Option<&Orderby>,
        pager: Option<&Pager>,
    ) -> Result<Vec<StoredRow>>;

    /// At most one row whose `key` column equals `id`.
    fn fetch_id(&mut self, entity: &str, key: &str, id: &str) -> Result<Option<StoredRow>>;

    fn fetch_row(&mut self, entity: &str, row_id: RowId) -> Result<Option<StoredRow>>;

    fn count(&mut self, entity: &str, filter: Option<&Where>) -> Result<u64>;

    fn insert(&mut self, entity: &str, values: &[(&str, Value)]) -> Result<RowId>;

    fn delete(&mut self, entity: &str, row_id: RowId) -> Result<u64>;

    fn insert_batch(&mut self, entity: &str, records: &[Record]) -> Result<Vec<RowId>>;

    /// Sets the columns of every matching row without fetching them, returns
    /// the number of rows affected.
    fn update_where(&mut self, entity: &str, set: &Record, filter: Option<&Where>)
    -> Result<u64>;

    /// Deletes every matching row, returning their identities.
    fn delete_where(&mut self, entity: &str, filter: Option<&Where>) -> Result<Vec<RowId>>;

    fn begin(&mut self) -> Result<()>;
    fn commit(&mut self) -> Result<()>;
    fn rollback(&mut self) -> Result<()>;
}
