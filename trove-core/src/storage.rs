use crate::{
    Config, Context, Entity, Error, ErrorContext, Handler, Model, Orderby, Pager, Record, Result,
    RowId, Store, StoreError, Where, util::panic_message,
};
use std::{
    panic::{self, AssertUnwindSafe},
    sync::Arc,
    thread,
};
use tokio::sync::oneshot;

type Task<S> = Box<dyn FnOnce(&mut Context<S>) + Send>;

/// Storage engine: typed entity operations over one store.
///
/// The store is owned by a dedicated worker thread that runs the queued
/// operations one at a time, in submission order. Every operation is queued
/// when it is called, the returned future only waits for its reply. Unless
/// noted otherwise an operation commits on success and rolls back everything
/// pending on failure.
///
/// Handles are cheap to clone, the worker stops once every handle is dropped.
pub struct Storage<S: Store> {
    model: Arc<str>,
    sender: flume::Sender<Task<S>>,
}

impl<S: Store> Clone for Storage<S> {
    fn clone(&self) -> Self {
        Self {
            model: self.model.clone(),
            sender: self.sender.clone(),
        }
    }
}

impl<S: Store> Storage<S> {
    /// Opens the store of the model `<config.model_dir>/<config.model>.json`.
    pub async fn open(config: Config) -> Result<Self> {
        Self::spawn(config, None).await
    }

    /// Opens the store of a model declared in code.
    pub async fn open_with(config: Config, model: Model) -> Result<Self> {
        Self::spawn(config, Some(model)).await
    }

    async fn spawn(config: Config, model: Option<Model>) -> Result<Self> {
        let name: Arc<str> = config.model.as_str().into();
        let (sender, receiver) = flume::unbounded::<Task<S>>();
        let (ready, opened) = oneshot::channel::<Result<()>>();
        thread::Builder::new()
            .name(config.thread_name())
            .spawn(move || {
                let store = model
                    .map(Ok)
                    .unwrap_or_else(|| Model::load(&config.model_dir, &config.model))
                    .and_then(|model| S::open(&config, model));
                let store = match store {
                    Ok(store) => {
                        let _ = ready.send(Ok(()));
                        store
                    }
                    Err(error) => {
                        let _ = ready.send(Err(error));
                        return;
                    }
                };
                let mut context = Context::new(store);
                while let Ok(task) = receiver.recv() {
                    task(&mut context);
                }
                if context.is_pending() {
                    context.rollback();
                }
                log::debug!("The `{}` storage worker stopped", config.model);
            })
            .context("Could not spawn the storage worker thread")?;
        match opened.await {
            Ok(Ok(())) => {
                log::debug!("Opened the `{}` storage", name);
                Ok(Self {
                    model: name,
                    sender,
                })
            }
            Ok(Err(error)) => {
                let error = error.context(format!("Could not open the `{}` storage", name));
                log::error!("{:#}", error);
                Err(error)
            }
            Err(..) => Err(StoreError::WorkerPanicked {
                message: format!("the `{}` storage worker died while opening", name),
            }
            .into()),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model
    }

    /// Queues `task` on the worker and returns a future resolving to its result.
    fn perform<T, F>(&self, task: F) -> impl Future<Output = Result<T>> + Send
    where
        T: Send + 'static,
        F: FnOnce(&mut Context<S>) -> Result<T> + Send + 'static,
    {
        let (reply, receive) = oneshot::channel::<Result<T>>();
        let job: Task<S> = Box::new(move |context: &mut Context<S>| {
            let result = match panic::catch_unwind(AssertUnwindSafe(|| task(&mut *context))) {
                Ok(result) => result,
                Err(payload) => {
                    context.rollback();
                    let error: Error = StoreError::WorkerPanicked {
                        message: panic_message(&payload),
                    }
                    .into();
                    log::error!("{:#}", error);
                    Err(error)
                }
            };
            let _ = reply.send(result);
        });
        let sent = self
            .sender
            .send(job)
            .map_err(|_| Error::new(StoreError::WorkerClosed));
        async move {
            sent?;
            receive
                .await
                .map_err(|_| Error::new(StoreError::WorkerClosed))?
        }
    }

    /// Commits every pending change, for instance the ones left by `stage`.
    pub fn save(&self) -> impl Future<Output = Result<()>> + Send {
        self.perform(|context| context.unit(true, |_| Ok(())))
    }

    /// Upserts the dirty fields of `entity` by identifier and commits.
    ///
    /// A detached entity is attached to the existing row with the same
    /// identifier, or to a new row. Fails with `InvalidIdentifier` before
    /// anything is queued when the identifier is empty.
    pub fn flush<'e, E: Entity>(
        &self,
        entity: &'e mut E,
    ) -> impl Future<Output = Result<()>> + Send {
        let sent = entity.changeset().map(|changeset| {
            self.perform(move |context| {
                let attachment = context.unit(true, |context| context.write(&changeset))?;
                Ok((attachment, changeset))
            })
        });
        async move {
            let (attachment, changeset) = sent?.await?;
            if let Some(attachment) = attachment {
                entity.attach(attachment);
            }
            entity.settle(&changeset);
            Ok(())
        }
    }

    pub fn flush_many<'e, E: Entity>(
        &self,
        entities: &'e mut [E],
    ) -> impl Future<Output = Result<()>> + Send {
        self.write_many(entities, true)
    }

    /// Like `flush_many`, without committing.
    ///
    /// The changes are committed by the next `save` or committing operation,
    /// and discarded by the next rollback.
    pub fn stage<'e, E: Entity>(
        &self,
        entities: &'e mut [E],
    ) -> impl Future<Output = Result<()>> + Send {
        self.write_many(entities, false)
    }

    fn write_many<'e, E: Entity>(
        &self,
        entities: &'e mut [E],
        save: bool,
    ) -> impl Future<Output = Result<()>> + Send {
        let sent = entities
            .iter_mut()
            .map(E::changeset)
            .collect::<Result<Vec<_>>>()
            .map(|changesets| {
                self.perform(move |context| {
                    let attachments = context.unit(save, |context| {
                        changesets
                            .iter()
                            .map(|changeset| context.write(changeset))
                            .collect::<Result<Vec<_>>>()
                    })?;
                    Ok((attachments, changesets))
                })
            });
        async move {
            let (attachments, changesets) = sent?.await?;
            for ((entity, attachment), changeset) in entities
                .iter_mut()
                .zip(attachments)
                .zip(changesets.iter())
            {
                if let Some(attachment) = attachment {
                    entity.attach(attachment);
                }
                entity.settle(changeset);
            }
            Ok(())
        }
    }

    /// Builds an entity from `input` and flushes it.
    pub fn insert<E: Entity>(&self, input: E::Input) -> impl Future<Output = Result<E>> + Send {
        self.perform(move |context| {
            context.unit(true, |context| {
                let mut entity = E::from_input(input)?;
                context.flush(&mut entity)?;
                Ok(entity)
            })
        })
    }

    pub fn insert_many<E: Entity>(
        &self,
        inputs: Vec<E::Input>,
        orderby: Option<Orderby>,
    ) -> impl Future<Output = Result<Vec<E>>> + Send {
        self.perform(move |context| {
            context.unit(true, |context| context.create::<E>(inputs, orderby.as_ref()))
        })
    }

    /// The entity with identifier `id`, its fields load lazily.
    pub fn query_one<E: Entity>(&self, id: E::Id) -> impl Future<Output = Result<E>> + Send {
        self.perform(move |context| context.unit(true, |context| context.query_one::<E>(&id)))
    }

    pub fn query<E: Entity>(
        &self,
        filter: Option<Where>,
        pager: Option<Pager>,
        orderby: Option<Orderby>,
    ) -> impl Future<Output = Result<Vec<E>>> + Send {
        self.perform(move |context| {
            context.unit(true, |context| {
                context.query::<E>(filter.as_ref(), pager.as_ref(), orderby.as_ref())
            })
        })
    }

    pub fn count<E: Entity>(&self, filter: Option<Where>) -> impl Future<Output = Result<u64>> + Send {
        self.perform(move |context| context.unit(true, |context| context.count::<E>(filter.as_ref())))
    }

    /// Deletes the row of `entity`, a detached entity is a no-op.
    pub fn delete<E: Entity>(&self, entity: &E) -> impl Future<Output = Result<()>> + Send {
        self.delete_many(std::slice::from_ref(entity))
    }

    pub fn delete_many<E: Entity>(&self, entities: &[E]) -> impl Future<Output = Result<()>> + Send {
        let rows = entities.iter().filter_map(E::row_id).collect::<Vec<_>>();
        self.perform(move |context| {
            context.unit(true, |context| context.delete::<E>(&rows).map(|_| ()))
        })
    }

    /// Deletes every matching row, returning their row identities.
    pub fn delete_where<E: Entity>(
        &self,
        filter: Option<Where>,
    ) -> impl Future<Output = Result<Vec<RowId>>> + Send {
        self.perform(move |context| {
            context.unit(true, |context| context.delete_where::<E>(filter.as_ref()))
        })
    }

    /// Sets `set` on every matching row without materializing entities.
    ///
    /// Entities already loaded from the affected rows are stale afterwards.
    pub fn update<E: Entity>(
        &self,
        set: Record,
        filter: Option<Where>,
    ) -> impl Future<Output = Result<u64>> + Send {
        self.perform(move |context| {
            context.unit(true, |context| context.update::<E>(&set, filter.as_ref()))
        })
    }

    /// Makes `inputs` the exact set of rows matching `filter`.
    ///
    /// Every input is upserted, then the rows that matched before and whose
    /// identifier is not among the inputs are deleted.
    pub fn overlay<E: Entity>(
        &self,
        inputs: Vec<E::Input>,
        filter: Option<Where>,
        orderby: Option<Orderby>,
    ) -> impl Future<Output = Result<Vec<E>>> + Send {
        self.perform(move |context| {
            context.unit(true, |context| {
                context.overlay::<E>(inputs, filter.as_ref(), orderby.as_ref())
            })
        })
    }

    /// Inserts raw records, bypassing the entity fields, and returns the created entities.
    pub fn insert_batch<E: Entity>(
        &self,
        records: Vec<Record>,
    ) -> impl Future<Output = Result<Vec<E>>> + Send {
        self.perform(move |context| {
            context.unit(true, |context| context.insert_batch_entities::<E>(&records))
        })
    }

    pub fn insert_batch_discard<E: Entity>(
        &self,
        records: Vec<Record>,
    ) -> impl Future<Output = Result<()>> + Send {
        self.perform(move |context| {
            context.unit(true, |context| context.insert_batch::<E>(&records).map(|_| ()))
        })
    }

    pub fn insert_batch_ids<E: Entity>(
        &self,
        records: Vec<Record>,
    ) -> impl Future<Output = Result<Vec<RowId>>> + Send {
        self.perform(move |context| {
            context.unit(true, |context| context.insert_batch::<E>(&records))
        })
    }

    /// Runs `block` as one atomic unit of work on the worker.
    ///
    /// Everything the block does is committed when it returns `Ok`, and
    /// discarded, together with any staged change, when it fails.
    pub fn transaction<T, F>(&self, block: F) -> impl Future<Output = Result<T>> + Send
    where
        T: Send + 'static,
        F: FnOnce(&mut Handler<'_, S>) -> Result<T> + Send + 'static,
    {
        self.perform(move |context| {
            context.unit(true, |context| block(&mut Handler::new(context)))
        })
    }
}
