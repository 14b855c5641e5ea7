//! SPARQL 1.1 Graph Store HTTP Protocol operations.
//!
//! `get`, `put`, `post` and `delete` report an unexpected HTTP status as a
//! [`GspOutcome::Status`] value rather than an error, so callers have to branch on it.
//! [`GspOutcome::into_result`] turns the status into a [`TransportError`].

use crate::classify::SPARQL_UPDATE;
use crate::client::{parse_endpoint, HttpClient, ScopedClient};
use crate::dispatch::status_error;
use crate::error::{ConfigurationError, Error, TransportError};
use crate::io::{parse_graph, serialize_graph};
use crate::media_type::RdfMediaType;
use oxrdf::{Graph, NamedNode};
use reqwest::blocking::Response;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::debug;
use url::Url;

/// The graph of a graph store an operation applies to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum GraphTarget {
    /// The default graph, addressed with `?default`.
    Default,
    /// A named graph, addressed with `?graph=<iri>`.
    Named(NamedNode),
}

impl GraphTarget {
    /// Adds the graph selector to an endpoint URL.
    pub fn apply(&self, endpoint: &Url) -> Url {
        let mut url = endpoint.clone();
        match self {
            Self::Default => {
                url.query_pairs_mut().append_key_only("default");
            }
            Self::Named(graph) => {
                url.query_pairs_mut().append_pair("graph", graph.as_str());
            }
        }
        url
    }
}

impl FromStr for GraphTarget {
    type Err = ConfigurationError;

    /// `default` selects the default graph, any other value must be an IRI.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Err(ConfigurationError::MissingGraphIri),
            "default" => Ok(Self::Default),
            iri => NamedNode::new(iri)
                .map(Self::Named)
                .map_err(|e| ConfigurationError::InvalidGraphIri {
                    iri: iri.to_owned(),
                    reason: e.to_string(),
                }),
        }
    }
}

impl From<NamedNode> for GraphTarget {
    fn from(graph: NamedNode) -> Self {
        Self::Named(graph)
    }
}

impl fmt::Display for GraphTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("default"),
            Self::Named(graph) => f.write_str(graph.as_str()),
        }
    }
}

/// The outcome of a graph store operation that did not fail at the transport level.
#[derive(Clone, Debug, PartialEq, Eq)]
#[must_use]
pub enum GspOutcome<T> {
    Success(T),
    /// The endpoint answered with this non success status.
    Status(u16),
}

impl<T> GspOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The status code of a failed operation.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Success(_) => None,
            Self::Status(status) => Some(*status),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> GspOutcome<U> {
        match self {
            Self::Success(value) => GspOutcome::Success(f(value)),
            Self::Status(status) => GspOutcome::Status(status),
        }
    }

    /// Converts a status into a [`TransportError::Status`] with an empty body.
    pub fn into_result(self) -> Result<T, TransportError> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Status(status) => Err(TransportError::Status {
                status,
                body: String::new(),
            }),
        }
    }
}

/// RDF data sent to a graph store.
#[derive(Clone, Debug)]
pub enum RdfSource {
    /// A file. Its syntax is given by its extension, or guessed from its content.
    File(PathBuf),
    /// A document. Its syntax is guessed from its first characters.
    Text(String),
    Graph(Graph),
}

impl RdfSource {
    /// The source serialized in `media_type`.
    ///
    /// Documents already in `media_type` are returned verbatim.
    pub fn to_bytes(&self, media_type: RdfMediaType) -> Result<Vec<u8>, Error> {
        let (data, syntax) = match self {
            Self::Graph(graph) => return serialize_graph(graph, media_type),
            Self::File(path) => {
                let data = fs::read(path)?;
                let syntax = match RdfMediaType::from_path(path) {
                    Some(syntax) => syntax,
                    None => RdfMediaType::guess_from_data(&String::from_utf8_lossy(&data)),
                };
                (data, syntax)
            }
            Self::Text(text) => (
                text.as_bytes().to_vec(),
                RdfMediaType::guess_from_data(text),
            ),
        };
        if syntax == media_type {
            return Ok(data);
        }
        serialize_graph(&parse_graph(&data, syntax)?, media_type)
    }
}

impl From<Graph> for RdfSource {
    fn from(graph: Graph) -> Self {
        Self::Graph(graph)
    }
}

impl From<PathBuf> for RdfSource {
    fn from(path: PathBuf) -> Self {
        Self::File(path)
    }
}

fn resolve(endpoint: &str, graph: &str) -> Result<(Url, GraphTarget), Error> {
    let endpoint = parse_endpoint(endpoint)?;
    let graph: GraphTarget = graph.parse()?;
    Ok((endpoint, graph))
}

fn send(request: reqwest::blocking::RequestBuilder) -> Result<Response, Error> {
    Ok(request.send().map_err(TransportError::from)?)
}

/// Whether the graph exists. Only transport failures are errors: a 404 is `false`.
pub fn exists(endpoint: &str, graph: &str, client: Option<&HttpClient>) -> Result<bool, Error> {
    let (endpoint, graph) = resolve(endpoint, graph)?;
    let client = ScopedClient::acquire(client)?;
    let response = send(client.request(Method::HEAD, graph.apply(&endpoint)))?;
    debug!("HEAD {graph} answered {}", response.status());
    Ok(response.status().is_success())
}

/// Fetches a graph in `media_type`, which must be one of the registered RDF media types.
pub fn get(
    endpoint: &str,
    graph: &str,
    media_type: &str,
    client: Option<&HttpClient>,
) -> Result<GspOutcome<Graph>, Error> {
    let (endpoint, graph) = resolve(endpoint, graph)?;
    let media_type = RdfMediaType::parse_allowed(media_type)?;
    // The response is parsed, so the syntax needs a parser.
    media_type.rdf_format()?;
    let client = ScopedClient::acquire(client)?;
    let response = send(
        client
            .request(Method::GET, graph.apply(&endpoint))
            .header(ACCEPT, media_type.media_type()),
    )?;
    if !response.status().is_success() {
        return Ok(GspOutcome::Status(response.status().as_u16()));
    }
    let syntax = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(RdfMediaType::from_media_type)
        .unwrap_or(media_type);
    let body = response.bytes().map_err(TransportError::from)?;
    Ok(GspOutcome::Success(parse_graph(&body, syntax)?))
}

/// Replaces the content of a graph.
pub fn put(
    endpoint: &str,
    graph: &str,
    source: &RdfSource,
    media_type: &str,
    client: Option<&HttpClient>,
) -> Result<GspOutcome<()>, Error> {
    write(Method::PUT, endpoint, graph, source, media_type, client)
}

/// Adds to the content of a graph.
pub fn post(
    endpoint: &str,
    graph: &str,
    source: &RdfSource,
    media_type: &str,
    client: Option<&HttpClient>,
) -> Result<GspOutcome<()>, Error> {
    write(Method::POST, endpoint, graph, source, media_type, client)
}

fn write(
    method: Method,
    endpoint: &str,
    graph: &str,
    source: &RdfSource,
    media_type: &str,
    client: Option<&HttpClient>,
) -> Result<GspOutcome<()>, Error> {
    let (endpoint, graph) = resolve(endpoint, graph)?;
    let media_type = RdfMediaType::parse_allowed(media_type)?;
    let client = ScopedClient::acquire(client)?;
    let response = send_source(&client, method, &endpoint, &graph, source, media_type)?;
    Ok(if is_write_success(response.status()) {
        GspOutcome::Success(())
    } else {
        GspOutcome::Status(response.status().as_u16())
    })
}

/// Sends `source` to a graph with PUT or POST and returns the raw response.
pub(crate) fn send_source(
    client: &HttpClient,
    method: Method,
    endpoint: &Url,
    graph: &GraphTarget,
    source: &RdfSource,
    media_type: RdfMediaType,
) -> Result<Response, Error> {
    let body = source.to_bytes(media_type)?;
    debug!("{method} {} bytes of {media_type} to graph {graph}", body.len());
    send(
        client
            .request(method, graph.apply(endpoint))
            .header(CONTENT_TYPE, media_type.media_type())
            .body(body),
    )
}

pub(crate) fn is_write_success(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::OK | StatusCode::CREATED | StatusCode::NO_CONTENT
    )
}

/// Deletes a graph.
pub fn delete(
    endpoint: &str,
    graph: &str,
    client: Option<&HttpClient>,
) -> Result<GspOutcome<()>, Error> {
    let (endpoint, graph) = resolve(endpoint, graph)?;
    let client = ScopedClient::acquire(client)?;
    let response = send(client.request(Method::DELETE, graph.apply(&endpoint)))?;
    Ok(if response.status().is_success() {
        GspOutcome::Success(())
    } else {
        GspOutcome::Status(response.status().as_u16())
    })
}

/// Removes all triples of a graph.
///
/// `all` clears every graph with a SPARQL `CLEAR ALL` update, any other identifier is deleted
/// through the graph store.
pub fn clear(
    endpoint: &str,
    graph: &str,
    client: Option<&HttpClient>,
) -> Result<GspOutcome<()>, Error> {
    if graph != "all" {
        return delete(endpoint, graph, client);
    }
    let endpoint = parse_endpoint(endpoint)?;
    let client = ScopedClient::acquire(client)?;
    let response = send_update(&client, &endpoint, "CLEAR ALL")?;
    Ok(if is_write_success(response.status()) {
        GspOutcome::Success(())
    } else {
        GspOutcome::Status(response.status().as_u16())
    })
}

/// Removes all triples of a graph, or of all graphs for `all`, with a SPARQL update.
///
/// Any answer other than `204 No Content` is an error.
pub fn clear_with_update(
    endpoint: &str,
    graph: &str,
    client: Option<&HttpClient>,
) -> Result<(), Error> {
    let endpoint = parse_endpoint(endpoint)?;
    let update = match graph {
        "all" => "CLEAR ALL".to_owned(),
        graph => match graph.parse::<GraphTarget>()? {
            GraphTarget::Default => "CLEAR DEFAULT".to_owned(),
            GraphTarget::Named(graph) => format!("CLEAR GRAPH {graph}"),
        },
    };
    let client = ScopedClient::acquire(client)?;
    let response = send_update(&client, &endpoint, &update)?;
    if response.status() != StatusCode::NO_CONTENT {
        return Err(status_error(response).into());
    }
    Ok(())
}

fn send_update(client: &HttpClient, endpoint: &Url, update: &str) -> Result<Response, Error> {
    debug!("Sending update {update} to {endpoint}");
    send(
        client
            .request(Method::POST, endpoint.clone())
            .header(CONTENT_TYPE, SPARQL_UPDATE)
            .body(update.to_owned()),
    )
}
