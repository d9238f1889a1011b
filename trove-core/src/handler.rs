use crate::{Context, Entity, Orderby, Pager, Record, Result, RowId, Store, Where};

/// Operations available inside `Storage::transaction`.
///
/// Nothing is committed per call, the enclosing transaction commits everything
/// when the block returns `Ok` and discards everything otherwise.
pub struct Handler<'c, S: Store> {
    context: &'c mut Context<S>,
}

impl<'c, S: Store> Handler<'c, S> {
    pub(crate) fn new(context: &'c mut Context<S>) -> Self {
        Self { context }
    }

    pub fn flush<E: Entity>(&mut self, entity: &mut E) -> Result<()> {
        self.context.flush(entity)
    }

    pub fn flush_many<E: Entity>(&mut self, entities: &mut [E]) -> Result<()> {
        self.context.flush_many(entities)
    }

    pub fn insert<E: Entity>(&mut self, input: E::Input) -> Result<E> {
        let mut entity = E::from_input(input)?;
        self.context.flush(&mut entity)?;
        Ok(entity)
    }

    pub fn insert_many<E: Entity>(
        &mut self,
        inputs: Vec<E::Input>,
        orderby: Option<&Orderby>,
    ) -> Result<Vec<E>> {
        self.context.create(inputs, orderby)
    }

    pub fn query_one<E: Entity>(&mut self, id: &E::Id) -> Result<E> {
        self.context.query_one(id)
    }

    pub fn query<E: Entity>(
        &mut self,
        filter: Option<&Where>,
        pager: Option<&Pager>,
        orderby: Option<&Orderby>,
    ) -> Result<Vec<E>> {
        self.context.query(filter, pager, orderby)
    }

    pub fn count<E: Entity>(&mut self, filter: Option<&Where>) -> Result<u64> {
        self.context.count::<E>(filter)
    }

    /// Deletes the row of `entity`, a detached entity is a no-op.
    pub fn delete<E: Entity>(&mut self, entity: &E) -> Result<()> {
        self.delete_many(std::slice::from_ref(entity))
    }

    pub fn delete_many<E: Entity>(&mut self, entities: &[E]) -> Result<()> {
        let rows = entities.iter().filter_map(E::row_id).collect::<Vec<_>>();
        self.context.delete::<E>(&rows).map(|_| ())
    }

    pub fn delete_where<E: Entity>(&mut self, filter: Option<&Where>) -> Result<Vec<RowId>> {
        self.context.delete_where::<E>(filter)
    }

    /// Bulk column update, loaded entities of the affected rows become stale.
    pub fn update<E: Entity>(&mut self, set: &Record, filter: Option<&Where>) -> Result<u64> {
        self.context.update::<E>(set, filter)
    }

    pub fn overlay<E: Entity>(
        &mut self,
        inputs: Vec<E::Input>,
        filter: Option<&Where>,
        orderby: Option<&Orderby>,
    ) -> Result<Vec<E>> {
        self.context.overlay(inputs, filter, orderby)
    }

    pub fn insert_batch<E: Entity>(&mut self, records: &[Record]) -> Result<Vec<E>> {
        self.context.insert_batch_entities(records)
    }

    pub fn insert_batch_discard<E: Entity>(&mut self, records: &[Record]) -> Result<()> {
        self.context.insert_batch::<E>(records).map(|_| ())
    }

    pub fn insert_batch_ids<E: Entity>(&mut self, records: &[Record]) -> Result<Vec<RowId>> {
        self.context.insert_batch::<E>(records)
    }
}
