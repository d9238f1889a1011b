use crate::{
    Attachment, Changeset, Entity, EntityId, Error, ErrorContext, Orderby, Pager, Record, Result,
    Row, RowId, Store, StoreError, StoredRow, Where,
};
use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, PoisonError, RwLock, Weak},
};

/// Registry size that triggers the removal of rows no entity holds anymore.
const PRUNE_AT: usize = 256;

type RowKey = (&'static str, RowId);

/// Unit of work running on the storage worker.
///
/// The store transaction begins implicitly with the first mutation and stays
/// pending until `save` commits it or a failure rolls it back.
///
/// Every entity attached by the context shares one row cell per stored row,
/// refreshed whenever the context writes that row or rolls its write back.
pub(crate) struct Context<S: Store> {
    store: S,
    pending: bool,
    rows: HashMap<RowKey, Weak<RwLock<Row>>>,
    prune_at: usize,
    /// Shared rows whose content the pending unit may have changed.
    written: Vec<RowKey>,
    /// Rows deleted by the pending unit.
    removed: Vec<RowKey>,
}

impl<S: Store> Context<S> {
    pub(crate) fn new(store: S) -> Self {
        Self {
            store,
            pending: false,
            rows: HashMap::new(),
            prune_at: PRUNE_AT,
            written: Vec::new(),
            removed: Vec::new(),
        }
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.pending
    }

    /// The store, with a transaction open.
    fn touch(&mut self) -> Result<&mut S> {
        if !self.pending {
            self.store.begin()?;
            self.pending = true;
        }
        Ok(&mut self.store)
    }

    pub(crate) fn save(&mut self) -> Result<()> {
        if !self.pending {
            return Ok(());
        }
        match self.store.commit() {
            Ok(()) => {
                self.pending = false;
                self.written.clear();
                // Deleted row identities can be handed out again
                for key in self.removed.drain(..) {
                    self.rows.remove(&key);
                }
                Ok(())
            }
            Err(error) => {
                let error = error.context("Could not save the pending changes");
                log::error!("{:#}", error);
                self.rollback();
                Err(error)
            }
        }
    }

    pub(crate) fn rollback(&mut self) {
        if !self.pending {
            return;
        }
        self.pending = false;
        match self.store.rollback() {
            Ok(()) => log::warn!("Discarded the pending changes of `{}`", self.store.model().name),
            Err(error) => log::error!("{:#}", error.context("Could not roll back")),
        }
        self.removed.clear();
        let written = std::mem::take(&mut self.written);
        for key in written {
            let Some(cell) = self.rows.get(&key).and_then(Weak::upgrade) else {
                self.rows.remove(&key);
                continue;
            };
            match self.store.fetch_row(key.0, key.1) {
                Ok(Some(stored)) => {
                    *cell.write().unwrap_or_else(PoisonError::into_inner) = stored.row;
                }
                Ok(None) => {
                    self.rows.remove(&key);
                }
                Err(error) => {
                    log::error!(
                        "{:#}",
                        error.context(format!("Could not restore the `{}` row {}", key.0, key.1))
                    );
                    self.rows.remove(&key);
                }
            }
        }
    }

    /// Runs `f` as one unit: on failure everything pending is rolled back,
    /// on success it is committed when `save` is set.
    pub(crate) fn unit<T>(&mut self, save: bool, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let result = f(self).and_then(|value| {
            if save {
                self.save()?;
            }
            Ok(value)
        });
        if result.is_err() {
            self.rollback();
        }
        result
    }

    /// Attachment to the shared cell of `stored`, updating the cell content.
    fn share(&mut self, entity: &'static str, stored: StoredRow) -> Attachment {
        let key = (entity, stored.row_id);
        if self.pending {
            // The content may not survive a rollback
            self.written.push(key);
        }
        if let Some(cell) = self.rows.get(&key).and_then(Weak::upgrade) {
            *cell.write().unwrap_or_else(PoisonError::into_inner) = stored.row;
            return Attachment::shared(stored.row_id, cell);
        }
        if self.rows.len() >= self.prune_at {
            self.rows.retain(|_, v| v.strong_count() > 0);
            self.prune_at = (self.rows.len() * 2).max(PRUNE_AT);
        }
        let cell = Arc::new(RwLock::new(stored.row));
        self.rows.insert(key, Arc::downgrade(&cell));
        Attachment::shared(stored.row_id, cell)
    }

    /// Fetches a row just written and shares it.
    fn reload(&mut self, entity: &'static str, row_id: RowId) -> Result<Attachment> {
        let stored = self.store.fetch_row(entity, row_id)?.ok_or_else(|| {
            Error::msg(format!(
                "The `{}` row {} vanished right after being written",
                entity, row_id
            ))
        })?;
        Ok(self.share(entity, stored))
    }

    /// Upserts the changes of one entity, returning the row to attach when
    /// the entity was detached.
    ///
    /// An attached entity is written only while its row still holds the same
    /// identifier, otherwise the row is gone and the write fails with
    /// `RowDeleted`.
    pub(crate) fn write(&mut self, changeset: &Changeset) -> Result<Option<Attachment>> {
        let entity = changeset.entity;
        let set = changeset
            .values
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect::<Record>();
        if let Some(row_id) = changeset.row_id {
            let key = changeset
                .row_key
                .clone()
                .unwrap_or_else(|| changeset.id_value.clone());
            let identity = Where::row_identity(row_id, changeset.id_key, key);
            let matched = if set.is_empty() {
                self.store.count(entity, Some(&identity))?
            } else {
                self.touch()?.update_where(entity, &set, Some(&identity))?
            };
            if matched == 0 {
                return Err(StoreError::RowDeleted {
                    entity: entity.into(),
                    row_id,
                }
                .into());
            }
            if !set.is_empty() {
                self.reload(entity, row_id)?;
            }
            return Ok(None);
        }
        if let Some(found) = self
            .store
            .fetch_id(entity, changeset.id_key, &changeset.id)?
        {
            if set.is_empty() {
                return Ok(Some(self.share(entity, found)));
            }
            let key = found
                .row
                .get(changeset.id_key)
                .cloned()
                .unwrap_or_else(|| changeset.id_value.clone());
            let identity = Where::row_identity(found.row_id, changeset.id_key, key);
            self.touch()?.update_where(entity, &set, Some(&identity))?;
            return self.reload(entity, found.row_id).map(Some);
        }
        let mut values = changeset.values.clone();
        if !values.iter().any(|(k, _)| *k == changeset.id_key) {
            values.insert(0, (changeset.id_key, changeset.id_value.clone()));
        }
        let row_id = self.touch()?.insert(entity, &values)?;
        self.reload(entity, row_id).map(Some)
    }

    pub(crate) fn flush<E: Entity>(&mut self, entity: &mut E) -> Result<()> {
        let changeset = entity.changeset()?;
        if let Some(attachment) = self.write(&changeset)? {
            entity.attach(attachment);
        }
        entity.settle(&changeset);
        Ok(())
    }

    pub(crate) fn flush_many<E: Entity>(&mut self, entities: &mut [E]) -> Result<()> {
        for entity in entities {
            self.flush(entity)?;
        }
        Ok(())
    }

    /// Builds the entities from their inputs and upserts them.
    pub(crate) fn create<E: Entity>(
        &mut self,
        inputs: Vec<E::Input>,
        orderby: Option<&Orderby>,
    ) -> Result<Vec<E>> {
        let mut result = Vec::with_capacity(inputs.len());
        for input in inputs {
            let mut entity = E::from_input(input)?;
            self.flush(&mut entity)?;
            result.push(entity);
        }
        match orderby {
            Some(orderby) => orderby.sort(result),
            None => Ok(result),
        }
    }

    fn materialize<E: Entity>(&mut self, stored: StoredRow) -> E {
        let entity = E::default();
        entity.attach(self.share(E::NAME, stored));
        entity
    }

    pub(crate) fn query_one<E: Entity>(&mut self, id: &E::Id) -> Result<E> {
        if id.is_empty() {
            return Err(StoreError::InvalidIdentifier {
                entity: E::NAME.into(),
            }
            .into());
        }
        let canonical = id.canonical();
        match self.store.fetch_id(E::NAME, E::ID_KEY, &canonical)? {
            Some(stored) => Ok(self.materialize(stored)),
            None => Err(StoreError::NotFound {
                entity: E::NAME.into(),
                id: canonical,
            }
            .into()),
        }
    }

    pub(crate) fn query<E: Entity>(
        &mut self,
        filter: Option<&Where>,
        pager: Option<&Pager>,
        orderby: Option<&Orderby>,
    ) -> Result<Vec<E>> {
        let rows = self.store.fetch(E::NAME, filter, orderby, pager)?;
        Ok(rows
            .into_iter()
            .map(|stored| self.materialize(stored))
            .collect())
    }

    pub(crate) fn count<E: Entity>(&mut self, filter: Option<&Where>) -> Result<u64> {
        self.store.count(E::NAME, filter)
    }

    pub(crate) fn delete<E: Entity>(&mut self, rows: &[RowId]) -> Result<u64> {
        let mut deleted = 0;
        for row_id in rows {
            deleted += self.touch()?.delete(E::NAME, *row_id)?;
            self.removed.push((E::NAME, *row_id));
        }
        Ok(deleted)
    }

    pub(crate) fn delete_where<E: Entity>(&mut self, filter: Option<&Where>) -> Result<Vec<RowId>> {
        let deleted = self.touch()?.delete_where(E::NAME, filter)?;
        self.removed
            .extend(deleted.iter().map(|row_id| (E::NAME, *row_id)));
        Ok(deleted)
    }

    pub(crate) fn update<E: Entity>(&mut self, set: &Record, filter: Option<&Where>) -> Result<u64> {
        if set.is_empty() {
            return Ok(0);
        }
        self.touch()?.update_where(E::NAME, set, filter)
    }

    /// Upserts `inputs`, then deletes the rows previously matching `filter`
    /// whose identifier is not among the results.
    pub(crate) fn overlay<E: Entity>(
        &mut self,
        inputs: Vec<E::Input>,
        filter: Option<&Where>,
        orderby: Option<&Orderby>,
    ) -> Result<Vec<E>> {
        let olds = self.store.fetch(E::NAME, filter, None, None)?;
        let mut results = self.create::<E>(inputs, orderby)?;
        let survivors = results
            .iter_mut()
            .map(|e| e.id().canonical())
            .collect::<HashSet<_>>();
        let stale = olds
            .into_iter()
            .map(|stored| {
                let old = E::default();
                old.attach(Attachment::new(stored));
                old
            })
            .filter_map(|mut old| {
                if survivors.contains(&old.id().canonical()) {
                    None
                } else {
                    old.row_id()
                }
            })
            .collect::<Vec<_>>();
        if !stale.is_empty() {
            log::debug!(
                "Overlay of `{}` removes {} stale rows",
                E::NAME,
                stale.len()
            );
        }
        self.delete::<E>(&stale)
            .with_context(|| format!("Could not remove the stale `{}` rows", E::NAME))?;
        Ok(results)
    }

    pub(crate) fn insert_batch<E: Entity>(&mut self, records: &[Record]) -> Result<Vec<RowId>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }
        self.touch()?.insert_batch(E::NAME, records)
    }

    /// Batch insert, then fetches the created rows as entities.
    pub(crate) fn insert_batch_entities<E: Entity>(&mut self, records: &[Record]) -> Result<Vec<E>> {
        self.insert_batch::<E>(records)?
            .into_iter()
            .map(|row_id| {
                let attachment = self.reload(E::NAME, row_id)?;
                let entity = E::default();
                entity.attach(attachment);
                Ok(entity)
            })
            .collect()
    }
}
