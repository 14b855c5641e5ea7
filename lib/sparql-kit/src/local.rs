//! Evaluation of queries against an in-memory store.

use crate::classify::QueryKind;
use crate::dispatch::RawResponse;
use crate::error::{Error, UnsupportedOperation};
use crate::media_type::RdfMediaType;
use oxigraph::io::RdfFormat;
use oxigraph::sparql::QueryResults;
use oxigraph::store::Store;
use sparesults::QueryResultsFormat;

/// Evaluates a read query against `store`.
///
/// The response has the same shape as the one of a remote endpoint: solutions and booleans are
/// SPARQL results JSON, graphs are Turtle. Updates are rejected.
pub fn evaluate(store: &Store, query: &str, kind: QueryKind) -> Result<RawResponse, Error> {
    if kind.is_update() {
        return Err(UnsupportedOperation::LocalUpdate(kind).into());
    }
    let mut body = Vec::new();
    match store.query(query)? {
        results @ (QueryResults::Solutions(_) | QueryResults::Boolean(_)) => {
            results.write(&mut body, QueryResultsFormat::Json)?;
            Ok(RawResponse::Results(body))
        }
        results @ QueryResults::Graph(_) => {
            results.write_graph(&mut body, RdfFormat::Turtle)?;
            Ok(RawResponse::Graph {
                body,
                format: RdfMediaType::Turtle,
            })
        }
    }
}
