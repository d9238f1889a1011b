mod attach;
mod batch;
mod concurrency;
mod delete;
mod entities;
mod identifiers;
mod lazy;
mod observe;
mod ordering;
mod overlay;
mod simple;
mod stage;
mod transaction;

pub use entities::*;

use crate::{
    attach::attach, batch::batch, concurrency::concurrency, delete::delete,
    identifiers::identifiers, lazy::lazy, observe::observe, ordering::ordering, overlay::overlay,
    simple::simple, stage::stage, transaction::transaction,
};
use log::LevelFilter;
use std::env;
use trove::{Storage, Store};

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Removes every row of the suite entities.
pub async fn clear<S: Store>(storage: &Storage<S>) {
    storage
        .delete_where::<User>(None)
        .await
        .expect("Failed to clear the User rows");
    storage
        .delete_where::<Book>(None)
        .await
        .expect("Failed to clear the Book rows");
}

/// Runs every scenario against `storage`, which must be opened with `model()`.
pub async fn execute_tests<S: Store>(storage: Storage<S>) {
    simple(&storage).await;
    identifiers(&storage).await;
    lazy(&storage).await;
    attach(&storage).await;
    delete(&storage).await;
    overlay(&storage).await;
    batch(&storage).await;
    ordering(&storage).await;
    transaction(&storage).await;
    stage(&storage).await;
    observe(&storage).await;
    concurrency(&storage).await;
}

#[macro_export]
macro_rules! silent_logs {
    ($($code:tt)+) => {{
        let level = log::max_level();
        log::set_max_level(log::LevelFilter::Off);
        $($code)+
        log::set_max_level(level);
    }};
}
