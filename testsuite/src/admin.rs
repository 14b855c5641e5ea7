//! The `/$/` administration endpoints.

use crate::error::FakeFusekiError;
use crate::state::{dataset_key, AppState, DatasetEntry};
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use oxigraph::io::{RdfFormat, RdfParser};
use oxigraph::model::Term;
use serde_json::{json, Value};
use std::collections::BTreeMap;

const FUSEKI_NAME: &str = "http://jena.apache.org/fuseki#name";

pub async fn handle_ping() -> &'static str {
    "2024-01-01T00:00:00.000+00:00"
}

pub async fn handle_server(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "version": "fake",
        "datasets": describe_datasets(&state.datasets()),
    }))
}

pub async fn handle_stats(State(state): State<AppState>) -> Json<Value> {
    let datasets = state
        .datasets()
        .keys()
        .map(|name| (name.clone(), dataset_stats()))
        .collect::<serde_json::Map<_, _>>();
    Json(json!({ "datasets": datasets }))
}

pub async fn handle_dataset_stats(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Value>, FakeFusekiError> {
    let key = existing_dataset(&state, &name)?;
    Ok(Json(json!({ "datasets": { key: dataset_stats() } })))
}

pub async fn handle_backup(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<(StatusCode, Json<Value>), FakeFusekiError> {
    existing_dataset(&state, &name)?;
    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "taskId": "1", "requestId": 1 })),
    ))
}

pub async fn handle_backups_list() -> Json<Value> {
    Json(json!({ "backups": [] }))
}

pub async fn handle_tasks() -> Json<Value> {
    Json(json!([]))
}

pub async fn handle_task(Path(id): Path<String>) -> FakeFusekiError {
    FakeFusekiError::NotFound(format!("task {id}"))
}

pub async fn handle_metrics() -> &'static str {
    "# TYPE fuseki_requests_good counter\nfuseki_requests_good 0\n"
}

pub async fn handle_list_datasets(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "datasets": describe_datasets(&state.datasets()) }))
}

/// Creates a dataset from a `dbName`/`dbType` form or from an assembler configuration.
pub async fn handle_create_dataset(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, FakeFusekiError> {
    let is_turtle = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with(RdfFormat::Turtle.media_type()));
    let (name, db_type) = if is_turtle {
        (service_name(&body)?, "config".to_owned())
    } else {
        let form = url::form_urlencoded::parse(&body)
            .into_owned()
            .collect::<BTreeMap<_, _>>();
        let name = form
            .get("dbName")
            .cloned()
            .ok_or_else(|| FakeFusekiError::BadRequest("No dbName".to_owned()))?;
        let db_type = form.get("dbType").cloned().unwrap_or_default();
        (name, db_type)
    };
    let key = dataset_key(&name);
    let mut datasets = state.datasets();
    if datasets.contains_key(&key) {
        return Err(FakeFusekiError::Conflict(key));
    }
    datasets.insert(key, DatasetEntry { db_type });
    Ok(StatusCode::OK)
}

pub async fn handle_delete_dataset(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, FakeFusekiError> {
    let key = existing_dataset(&state, &name)?;
    state.datasets().remove(&key);
    Ok(StatusCode::OK)
}

fn existing_dataset(state: &AppState, name: &str) -> Result<String, FakeFusekiError> {
    let key = dataset_key(name);
    if state.datasets().contains_key(&key) {
        Ok(key)
    } else {
        Err(FakeFusekiError::NotFound(key))
    }
}

fn describe_datasets(datasets: &BTreeMap<String, DatasetEntry>) -> Vec<Value> {
    datasets
        .keys()
        .map(|name| {
            json!({
                "ds.name": name,
                "ds.state": true,
                "ds.services": [
                    {
                        "srv.type": "query",
                        "srv.description": "SPARQL Query",
                        "srv.endpoints": ["query", "sparql", ""],
                    },
                    {
                        "srv.type": "update",
                        "srv.description": "SPARQL Update",
                        "srv.endpoints": ["update", ""],
                    },
                    {
                        "srv.type": "gsp-rw",
                        "srv.description": "Graph Store Protocol",
                        "srv.endpoints": ["data", ""],
                    },
                ],
            })
        })
        .collect()
}

fn dataset_stats() -> Value {
    json!({ "Requests": 0, "RequestsGood": 0, "RequestsBad": 0 })
}

/// The `fuseki:name` of an assembler configuration.
fn service_name(config: &[u8]) -> Result<String, FakeFusekiError> {
    let parser = RdfParser::from_format(RdfFormat::Turtle)
        .with_base_iri("http://localhost/$/datasets")
        .map_err(|e| FakeFusekiError::Internal(e.into()))?;
    for quad in parser.for_reader(config) {
        let quad = quad.map_err(|e| FakeFusekiError::BadRequest(e.to_string()))?;
        if quad.predicate.as_str() == FUSEKI_NAME {
            if let Term::Literal(name) = quad.object {
                return Ok(name.value().to_owned());
            }
        }
    }
    Err(FakeFusekiError::BadRequest(
        "No fuseki:name in the configuration".to_owned(),
    ))
}
