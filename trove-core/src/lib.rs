mod config;
mod context;
mod entity;
mod error;
mod field;
mod fieldable;
mod handler;
mod id;
mod model;
mod query;
mod storage;
mod store;
mod util;
mod value;

pub use ::anyhow::Context as ErrorContext;
pub use config::*;
pub use context::*;
pub use entity::*;
pub use error::*;
pub use field::*;
pub use fieldable::*;
pub use handler::*;
pub use id::*;
pub use model::*;
pub use query::*;
pub use storage::*;
pub use store::*;
pub use value::*;
pub mod sync {
    pub use ::tokio::sync::{broadcast, watch};
}
pub use ::futures::future;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
