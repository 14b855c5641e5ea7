use axum::http::StatusCode;
use oxigraph::store::Store;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// How a [`FakeFuseki`](crate::FakeFuseki) behaves.
#[derive(Clone, Debug, Default)]
pub struct FakeFusekiOptions {
    /// The status SPARQL requests sent with POST are answered with, like `405` or `422`.
    pub reject_post: Option<StatusCode>,
    /// The `Authorization` header every request must carry.
    pub authorization: Option<String>,
}

/// A request as received by the server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    /// The raw query string, without the `?`.
    pub query: Option<String>,
    pub content_type: Option<String>,
    pub accept: Option<String>,
    pub authorization: Option<String>,
    pub body: String,
}

/// The settings of a dataset, as created through `/$/datasets`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatasetEntry {
    pub db_type: String,
}

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub options: Arc<FakeFusekiOptions>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    datasets: Arc<Mutex<BTreeMap<String, DatasetEntry>>>,
}

impl AppState {
    /// A state serving a single `/ds` dataset.
    pub fn new(store: Store, options: FakeFusekiOptions) -> Self {
        let datasets = BTreeMap::from([(
            "/ds".to_owned(),
            DatasetEntry {
                db_type: "mem".to_owned(),
            },
        )]);
        Self {
            store,
            options: Arc::new(options),
            requests: Arc::default(),
            datasets: Arc::new(Mutex::new(datasets)),
        }
    }

    pub fn record(&self, request: RecordedRequest) {
        lock(&self.requests).push(request);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    pub fn datasets(&self) -> MutexGuard<'_, BTreeMap<String, DatasetEntry>> {
        lock(&self.datasets)
    }
}

/// Requests keep being served after a handler panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Dataset names are stored with a leading slash, like Fuseki lists them.
pub fn dataset_key(name: &str) -> String {
    format!("/{}", name.trim_start_matches('/'))
}
