//! The `/ds` dataset: SPARQL query, SPARQL update and graph store access on one endpoint.

use crate::error::FakeFusekiError;
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, HeaderName, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use oxigraph::io::{RdfFormat, RdfParser, RdfSerializer};
use oxigraph::model::{GraphName, GraphNameRef, NamedNode};
use oxigraph::sparql::results::QueryResultsFormat;
use oxigraph::sparql::QueryResults;
use std::collections::HashMap;

const SPARQL_QUERY: &str = "application/sparql-query";
const SPARQL_UPDATE: &str = "application/sparql-update";
const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

pub async fn handle_dataset(
    State(state): State<AppState>,
    method: Method,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, FakeFusekiError> {
    if let Some(query) = params.get("query") {
        return evaluate_query(&state, query);
    }
    if let Some(graph) = graph_name(&params)? {
        return handle_graph(&state, &method, &graph, &headers, &body);
    }
    if method != Method::POST {
        return Err(FakeFusekiError::MethodNotAllowed);
    }
    if let Some(status) = state.options.reject_post {
        return Err(FakeFusekiError::PostRejected(status));
    }
    let text =
        std::str::from_utf8(&body).map_err(|e| FakeFusekiError::BadRequest(e.to_string()))?;
    match media_type(&headers, header::CONTENT_TYPE).as_deref() {
        Some(SPARQL_QUERY) => evaluate_query(&state, text),
        Some(SPARQL_UPDATE) => {
            state.store.update(text)?;
            Ok(StatusCode::NO_CONTENT.into_response())
        }
        other => Err(FakeFusekiError::UnsupportedMediaType(
            other.unwrap_or_default().to_owned(),
        )),
    }
}

fn evaluate_query(state: &AppState, query: &str) -> Result<Response, FakeFusekiError> {
    let results = state.store.query(query)?;
    if let QueryResults::Graph(_) = results {
        let body = results.write_graph(Vec::new(), RdfFormat::Turtle)?;
        return Ok(content(RdfFormat::Turtle.media_type(), body));
    }
    let body = results.write(Vec::new(), QueryResultsFormat::Json)?;
    Ok(content(SPARQL_RESULTS_JSON, body))
}

/// `?graph=<iri>` or `?default`. `None` for plain SPARQL requests.
fn graph_name(params: &HashMap<String, String>) -> Result<Option<GraphName>, FakeFusekiError> {
    if let Some(graph) = params.get("graph") {
        let graph =
            NamedNode::new(graph).map_err(|e| FakeFusekiError::BadRequest(e.to_string()))?;
        return Ok(Some(graph.into()));
    }
    Ok(params
        .contains_key("default")
        .then_some(GraphName::DefaultGraph))
}

fn handle_graph(
    state: &AppState,
    method: &Method,
    graph: &GraphName,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<Response, FakeFusekiError> {
    let exists = match graph {
        GraphName::NamedNode(graph) => state.store.contains_named_graph(graph.as_ref())?,
        _ => true,
    };
    match *method {
        Method::HEAD | Method::GET | Method::DELETE if !exists => {
            Err(FakeFusekiError::NotFound(graph.to_string()))
        }
        Method::HEAD => Ok(StatusCode::OK.into_response()),
        Method::GET => {
            let format = media_type(headers, header::ACCEPT)
                .and_then(|accept| RdfFormat::from_media_type(&accept))
                .unwrap_or(RdfFormat::Turtle);
            let mut serializer = RdfSerializer::from_format(format).for_writer(Vec::new());
            for quad in state
                .store
                .quads_for_pattern(None, None, None, Some(graph.as_ref()))
            {
                let quad = quad?;
                serializer.serialize_triple(quad.as_ref())?;
            }
            Ok(content(format.media_type(), serializer.finish()?))
        }
        Method::PUT | Method::POST => {
            let content_type = media_type(headers, header::CONTENT_TYPE).unwrap_or_default();
            let format = RdfFormat::from_media_type(&content_type)
                .ok_or(FakeFusekiError::UnsupportedMediaType(content_type))?;
            if *method == Method::PUT {
                state.store.clear_graph(graph.as_ref())?;
            }
            if let GraphName::NamedNode(graph) = graph {
                state.store.insert_named_graph(graph.as_ref())?;
            }
            state.store.load_from_reader(
                RdfParser::from_format(format).with_default_graph(graph.clone()),
                body,
            )?;
            Ok(if exists {
                StatusCode::NO_CONTENT
            } else {
                StatusCode::CREATED
            }
            .into_response())
        }
        Method::DELETE => {
            match graph {
                GraphName::NamedNode(graph) => {
                    state.store.remove_named_graph(graph.as_ref())?;
                }
                _ => state.store.clear_graph(GraphNameRef::DefaultGraph)?,
            }
            Ok(StatusCode::NO_CONTENT.into_response())
        }
        _ => Err(FakeFusekiError::MethodNotAllowed),
    }
}

/// The first media type of a header, without parameters.
fn media_type(headers: &HeaderMap, name: HeaderName) -> Option<String> {
    let value = headers.get(name)?.to_str().ok()?;
    let first = value.split(',').next()?;
    let essence = first.split(';').next()?.trim();
    Some(essence.to_ascii_lowercase())
}

fn content(content_type: &'static str, body: Vec<u8>) -> Response {
    ([(header::CONTENT_TYPE, content_type)], body).into_response()
}
