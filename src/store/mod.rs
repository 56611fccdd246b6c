//! Key-value persistence. Each logical collection is one JSON document under
//! a fixed key, read and written whole.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::error::Result;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<JsonValue>>;

    async fn put(&self, key: &str, value: JsonValue) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;
}
