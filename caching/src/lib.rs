use anyhow::Result;
use moka::future::Cache as MokaCache;
use uuid::Uuid;

/// Read-through cache for doctor and patient profile documents.
///
/// Keys are entity ids; values are the JSON form of the profile. The
/// scheduler never reads through this cache (conflict checks always go to
/// the store), so staleness can only affect directory reads.
#[derive(Clone)]
pub struct ProfileCache {
    inner: MokaCache<Uuid, serde_json::Value>,
}

impl ProfileCache {
    pub fn new(capacity: u64) -> Self {
        ProfileCache {
            inner: MokaCache::new(capacity),
        }
    }

    pub async fn get(&self, id: &Uuid) -> Option<serde_json::Value> {
        self.inner.get(id).await
    }

    pub async fn insert(&self, id: Uuid, value: serde_json::Value) -> Result<()> {
        self.inner.insert(id, value).await;
        Ok(())
    }

    pub async fn invalidate(&self, id: &Uuid) {
        self.inner.invalidate(id).await;
    }
}
