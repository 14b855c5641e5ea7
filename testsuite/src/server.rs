use crate::admin::{
    handle_backup, handle_backups_list, handle_create_dataset, handle_dataset_stats,
    handle_delete_dataset, handle_list_datasets, handle_metrics, handle_ping, handle_server,
    handle_stats, handle_task, handle_tasks,
};
use crate::dataset::handle_dataset;
use crate::error::FakeFusekiError;
use crate::state::{AppState, FakeFusekiOptions, RecordedRequest};
use anyhow::Result;
use axum::body::{self, Body};
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, HeaderName};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{any, delete, get, post};
use axum::Router;
use oxigraph::model::{GraphNameRef, NamedNode};
use oxigraph::store::Store;
use std::net::SocketAddr;
use std::thread::{self, JoinHandle};
use tokio::sync::oneshot;
use tracing::{debug, info};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ds", any(handle_dataset))
        .route("/$/ping", get(handle_ping))
        .route("/$/server", get(handle_server))
        .route("/$/stats", get(handle_stats))
        .route("/$/stats/{name}", get(handle_dataset_stats))
        .route("/$/backup/{name}", post(handle_backup))
        .route("/$/backups-list", get(handle_backups_list))
        .route("/$/tasks", get(handle_tasks))
        .route("/$/tasks/{id}", get(handle_task))
        .route("/$/metrics", get(handle_metrics))
        .route(
            "/$/datasets",
            get(handle_list_datasets).post(handle_create_dataset),
        )
        .route("/$/datasets/{name}", delete(handle_delete_dataset))
        .layer(middleware::from_fn_with_state(state.clone(), record_request))
        .with_state(state)
}

/// Records every request and enforces the configured `Authorization` header.
async fn record_request(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, FakeFusekiError> {
    let (parts, body) = request.into_parts();
    let body = body::to_bytes(body, usize::MAX)
        .await
        .map_err(|e| FakeFusekiError::BadRequest(e.to_string()))?;
    debug!("{} {}", parts.method, parts.uri);
    let authorization = header_value(&parts.headers, header::AUTHORIZATION);
    state.record(RecordedRequest {
        method: parts.method.to_string(),
        path: parts.uri.path().to_owned(),
        query: parts.uri.query().map(str::to_owned),
        content_type: header_value(&parts.headers, header::CONTENT_TYPE),
        accept: header_value(&parts.headers, header::ACCEPT),
        authorization: authorization.clone(),
        body: String::from_utf8_lossy(&body).into_owned(),
    });
    if let Some(expected) = &state.options.authorization {
        if authorization.as_ref() != Some(expected) {
            return Err(FakeFusekiError::Unauthorized);
        }
    }
    Ok(next.run(Request::from_parts(parts, Body::from(body))).await)
}

fn header_value(headers: &HeaderMap, name: HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

/// Serves a fresh in-memory dataset on `bind` until the process stops.
pub async fn serve(bind: &str, options: FakeFusekiOptions) -> Result<()> {
    let state = AppState::new(Store::new()?, options);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("Listening on {}", listener.local_addr()?);
    Ok(axum::serve(listener, router(state)).await?)
}

/// A fake Fuseki server running on a background thread.
///
/// The server listens on a free local port and stops when dropped. It serves one dataset, `/ds`,
/// backed by an in-memory store, and the `/$/` administration endpoints.
pub struct FakeFuseki {
    address: SocketAddr,
    state: AppState,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<Result<()>>>,
}

impl FakeFuseki {
    pub fn start() -> Result<Self> {
        Self::start_with(FakeFusekiOptions::default())
    }

    pub fn start_with(options: FakeFusekiOptions) -> Result<Self> {
        let state = AppState::new(Store::new()?, options);
        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        listener.set_nonblocking(true)?;
        let address = listener.local_addr()?;
        let (shutdown, signal) = oneshot::channel::<()>();
        let app = router(state.clone());
        let thread = thread::Builder::new()
            .name("fake-fuseki".to_owned())
            .spawn(move || -> Result<()> {
                let runtime = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()?;
                runtime.block_on(async move {
                    let listener = tokio::net::TcpListener::from_std(listener)?;
                    axum::serve(listener, app)
                        .with_graceful_shutdown(async move {
                            signal.await.ok();
                        })
                        .await?;
                    Ok::<_, anyhow::Error>(())
                })
            })?;
        Ok(Self {
            address,
            state,
            shutdown: Some(shutdown),
            thread: Some(thread),
        })
    }

    /// The server URL, like `http://127.0.0.1:3030`.
    pub fn url(&self) -> String {
        format!("http://{}", self.address)
    }

    /// The URL of the `/ds` dataset.
    pub fn dataset_url(&self) -> String {
        format!("{}/ds", self.url())
    }

    pub fn store(&self) -> &Store {
        &self.state.store
    }

    /// The requests received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests()
    }

    /// The number of triples of a named graph, or of the default graph for `None`.
    pub fn graph_len(&self, graph: Option<&str>) -> Result<usize> {
        let graph = graph.map(NamedNode::new).transpose()?;
        let graph = graph
            .as_ref()
            .map_or(GraphNameRef::DefaultGraph, |graph| graph.as_ref().into());
        let quads = self
            .state
            .store
            .quads_for_pattern(None, None, None, Some(graph))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(quads.len())
    }

    /// The names of the datasets, with their leading slash.
    pub fn datasets(&self) -> Vec<String> {
        self.state.datasets().keys().cloned().collect()
    }
}

impl Drop for FakeFuseki {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            shutdown.send(()).ok();
        }
        if let Some(thread) = self.thread.take() {
            thread.join().ok();
        }
    }
}
