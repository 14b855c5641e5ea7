//! Sends classified queries to their target.

use crate::classify::{Classification, KeywordClassifier, QueryClassifier};
use crate::client::{HttpClient, ScopedClient};
use crate::error::{ConfigurationError, Error, TransportError, UnsupportedOperation};
use crate::local;
use crate::media_type::RdfMediaType;
use crate::results::{check_format, normalize, QueryOptions, QueryOutput};
use crate::target::Target;
use reqwest::blocking::Response;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use tracing::debug;
use url::Url;

/// The response of an endpoint, before normalization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RawResponse {
    /// A SPARQL results JSON document, holding solutions or a boolean.
    Results(Vec<u8>),
    /// An RDF document.
    Graph {
        body: Vec<u8>,
        format: RdfMediaType,
    },
    /// A success response that is neither results nor RDF, like the confirmation page of an
    /// update.
    Message(String),
    /// `204 No Content`.
    Empty,
}

/// Classifies queries and evaluates them against a [`Target`].
///
/// ```
/// use sparql_kit::results::{QueryOptions, QueryOutput, ResultFormat};
/// use sparql_kit::{SparqlExecutor, Target};
///
/// let target = Target::Inline("PREFIX ex: <http://example.com/>\nex:a ex:b ex:c .".into());
/// let output = SparqlExecutor::new().query(
///     &target,
///     "ASK { ?s ?p ?o }",
///     None,
///     &QueryOptions::new(ResultFormat::Native),
/// )?;
/// assert_eq!(output, QueryOutput::Boolean(true));
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct SparqlExecutor<C = KeywordClassifier> {
    classifier: C,
}

impl SparqlExecutor {
    /// Creates an executor classifying queries by keywords.
    pub fn new() -> Self {
        Self {
            classifier: KeywordClassifier,
        }
    }
}

impl<C: QueryClassifier> SparqlExecutor<C> {
    /// Creates an executor with a custom classification strategy.
    pub fn with_classifier(classifier: C) -> Self {
        Self { classifier }
    }

    /// Evaluates `query` against `target` and normalizes the result.
    ///
    /// The prefixes declared in `options` are prepended to the query. When `client` is `None` a
    /// client with the default options is created for this call.
    pub fn query(
        &self,
        target: &Target,
        query: &str,
        client: Option<&HttpClient>,
        options: &QueryOptions,
    ) -> Result<QueryOutput, Error> {
        if query.trim().is_empty() {
            return Err(ConfigurationError::EmptyQuery.into());
        }
        let query = options.prepare_query(query);
        let classification = self.classifier.classify(&query);
        check_format(classification.kind, options.format)?;
        let raw = self.execute(target, &query, &classification, client)?;
        normalize(raw, classification.kind, options)
    }

    /// Evaluates an already prepared query without normalizing the response.
    pub fn execute(
        &self,
        target: &Target,
        query: &str,
        classification: &Classification,
        client: Option<&HttpClient>,
    ) -> Result<RawResponse, Error> {
        match target {
            Target::Remote(endpoint) => {
                let client = ScopedClient::acquire(client)?;
                send(&client, endpoint, query, classification)
            }
            Target::File(_) | Target::Inline(_) | Target::Store(_) => {
                if classification.kind.is_update() {
                    return Err(UnsupportedOperation::LocalUpdate(classification.kind).into());
                }
                debug!("Evaluating {} query locally", classification.kind);
                local::evaluate(&target.materialize()?, query, classification.kind)
            }
        }
    }

    /// Classifies `query` with the strategy of this executor.
    pub fn classify(&self, query: &str) -> Classification {
        self.classifier.classify(query)
    }
}

/// POSTs the query, falling back to a single GET if the endpoint rejects POST.
fn send(
    client: &HttpClient,
    endpoint: &Url,
    query: &str,
    classification: &Classification,
) -> Result<RawResponse, Error> {
    debug!(
        "Sending {} query to {endpoint} as {}",
        classification.kind, classification.content_type
    );
    let mut response = client
        .request(Method::POST, endpoint.clone())
        .header(CONTENT_TYPE, classification.content_type)
        .header(ACCEPT, classification.accept)
        .body(query.to_owned())
        .send()
        .map_err(TransportError::from)?;

    if matches!(
        response.status(),
        StatusCode::METHOD_NOT_ALLOWED | StatusCode::UNPROCESSABLE_ENTITY
    ) {
        debug!(
            "{endpoint} answered POST with {}, retrying with GET",
            response.status()
        );
        response = client
            .request(Method::GET, endpoint.clone())
            .query(&[("query", query)])
            .header(CONTENT_TYPE, classification.content_type)
            .header(ACCEPT, classification.accept)
            .send()
            .map_err(TransportError::from)?;
    }

    read_response(response, classification)
}

fn read_response(
    response: Response,
    classification: &Classification,
) -> Result<RawResponse, Error> {
    let status = response.status();
    if status == StatusCode::NO_CONTENT {
        return Ok(RawResponse::Empty);
    }
    if !matches!(status, StatusCode::OK | StatusCode::CREATED) {
        return Err(status_error(response).into());
    }
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let body = response.bytes().map_err(TransportError::from)?.to_vec();
    Ok(match content_type.as_deref() {
        Some(content_type) => {
            if let Some(format) = RdfMediaType::from_media_type(content_type) {
                RawResponse::Graph { body, format }
            } else if content_type.contains("json") {
                RawResponse::Results(body)
            } else {
                RawResponse::Message(String::from_utf8_lossy(&body).into_owned())
            }
        }
        None if classification.kind.is_graph() => RawResponse::Graph {
            body,
            format: RdfMediaType::Turtle,
        },
        None if classification.kind.is_update() => {
            RawResponse::Message(String::from_utf8_lossy(&body).into_owned())
        }
        None => RawResponse::Results(body),
    })
}

/// Builds the error reported for an unexpected status, keeping the body verbatim.
pub(crate) fn status_error(response: Response) -> TransportError {
    let status = response.status().as_u16();
    match response.text() {
        Ok(body) => TransportError::Status { status, body },
        Err(error) => TransportError::Connection(error),
    }
}

/// Evaluates `query` against `target` with the default classifier.
pub fn query(
    target: &Target,
    query: &str,
    client: Option<&HttpClient>,
    options: &QueryOptions,
) -> Result<QueryOutput, Error> {
    SparqlExecutor::new().query(target, query, client, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::QueryKind;
    use crate::results::ResultFormat;

    fn inline() -> Target {
        Target::Inline("PREFIX ex: <http://example.com/>\nex:a ex:b ex:c .".to_owned())
    }

    #[test]
    fn empty_queries_are_rejected() {
        assert!(matches!(
            query(&inline(), "  ", None, &QueryOptions::default()),
            Err(Error::Configuration(ConfigurationError::EmptyQuery))
        ));
    }

    #[test]
    fn tabular_construct_fails_before_any_request() {
        // Nothing listens on this port: reaching the network would be a transport error.
        let target = Target::Remote(Url::parse("http://127.0.0.1:9/ds").unwrap());
        let result = query(
            &target,
            "CONSTRUCT { ?s ?p ?o } WHERE { ?s ?p ?o }",
            None,
            &QueryOptions::new(ResultFormat::Tabular),
        );
        assert!(matches!(
            result,
            Err(Error::Unsupported(UnsupportedOperation::Tabular(
                QueryKind::Construct
            )))
        ));
    }

    #[test]
    fn local_updates_are_rejected() {
        assert!(matches!(
            query(&inline(), "DROP ALL", None, &QueryOptions::default()),
            Err(Error::Unsupported(UnsupportedOperation::LocalUpdate(
                QueryKind::Drop
            )))
        ));
    }

    #[test]
    fn local_select_with_namespaces() {
        let options =
            QueryOptions::new(ResultFormat::Tabular).with_namespace("ex", "http://example.com/");
        let output =
            query(&inline(), "SELECT ?o WHERE { ex:a ex:b ?o }", None, &options).unwrap();
        assert_eq!(output.solution_count(), Some(1));
    }

    #[test]
    fn lowercase_select_is_tabular() {
        let output = query(
            &inline(),
            "select ?s where { ?s ?p ?o }",
            None,
            &QueryOptions::new(ResultFormat::Tabular),
        )
        .unwrap();
        let QueryOutput::Table(table) = output else {
            panic!("expected a table");
        };
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn local_construct_mirrors_the_remote_shape() {
        let output = query(
            &inline(),
            "CONSTRUCT { ?s ?p ?o } WHERE { ?s ?p ?o }",
            None,
            &QueryOptions::new(ResultFormat::Native),
        )
        .unwrap();
        let QueryOutput::Graph(graph) = output else {
            panic!("expected a graph");
        };
        assert_eq!(graph.len(), 1);
    }
}
