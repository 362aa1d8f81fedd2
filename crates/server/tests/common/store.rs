//! In-memory content store with query counting and failure injection.

use async_trait::async_trait;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use trustcenter_core::{Resource, Row, Value};
use trustcenter_db::{ContentStore, DbError, DbResult};

#[allow(dead_code)]
pub fn sample_rows(resource: Resource) -> Vec<Row> {
    match resource {
        Resource::Teams => vec![
            Row::new()
                .with("id", "101")
                .with("firstName", "Ada")
                .with("isActive", true)
                .with("employeeId", 7i64),
            Row::new()
                .with("id", "102")
                .with("firstName", "Grace")
                .with("isActive", false)
                .with("employeeId", 8i64),
        ],
        Resource::Controls => vec![
            Row::new()
                .with("id", "c1")
                .with("short", "Encryption at rest")
                .with("category", Value::Json(json!(["Security"]))),
            Row::new()
                .with("id", "c2")
                .with("short", "Quarterly access reviews")
                .with("category", Value::Json(json!(["Access", "Compliance"]))),
        ],
        Resource::Faqs => vec![
            Row::new()
                .with("id", "f1")
                .with("question", "Is data encrypted?")
                .with("category", Value::Json(json!(["Security"]))),
        ],
    }
}

/// Content store double. Counts queries per resource; can fail, stall or
/// report unhealthy on demand.
#[allow(dead_code)]
pub struct MockContentStore {
    rows: Mutex<HashMap<Resource, Vec<Row>>>,
    queries: Mutex<HashMap<Resource, usize>>,
    failing: Mutex<HashSet<Resource>>,
    delay: Mutex<Option<Duration>>,
    healthy: AtomicBool,
}

#[allow(dead_code)]
impl MockContentStore {
    /// A store holding [`sample_rows`] for every resource.
    pub fn new() -> Arc<Self> {
        let rows = Resource::ALL
            .into_iter()
            .map(|resource| (resource, sample_rows(resource)))
            .collect();
        Arc::new(Self {
            rows: Mutex::new(rows),
            queries: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
            delay: Mutex::new(None),
            healthy: AtomicBool::new(true),
        })
    }

    pub fn set_rows(&self, resource: Resource, rows: Vec<Row>) {
        self.rows.lock().unwrap().insert(resource, rows);
    }

    /// Make every read of `resource` fail until [`recover`](Self::recover).
    pub fn fail(&self, resource: Resource) {
        self.failing.lock().unwrap().insert(resource);
    }

    pub fn recover(&self, resource: Resource) {
        self.failing.lock().unwrap().remove(&resource);
    }

    /// Stall every read by `delay` before answering.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    /// Number of `fetch_rows` calls for `resource` so far.
    pub fn queries(&self, resource: Resource) -> usize {
        self.queries
            .lock()
            .unwrap()
            .get(&resource)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl ContentStore for MockContentStore {
    async fn fetch_rows(&self, resource: Resource) -> DbResult<Vec<Row>> {
        *self.queries.lock().unwrap().entry(resource).or_insert(0) += 1;

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.lock().unwrap().contains(&resource) {
            return Err(DbError::Internal(format!(
                "relation \"{}\" does not exist",
                resource.table()
            )));
        }

        Ok(self
            .rows
            .lock()
            .unwrap()
            .get(&resource)
            .cloned()
            .unwrap_or_default())
    }

    async fn health_check(&self) -> DbResult<()> {
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(DbError::Internal("connection refused".to_string()))
        }
    }
}
