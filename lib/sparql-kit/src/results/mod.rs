//! Re-representation of raw query responses.

mod native;
mod table;

pub use native::{NativeBinding, NativeSolutions, NativeValue};
pub use table::Table;

use crate::classify::QueryKind;
use crate::dispatch::RawResponse;
use crate::error::{ConfigurationError, Error, UnsupportedOperation};
use crate::io::parse_graph;
use oxrdf::Graph;
use sparesults::{QueryResultsFormat, QueryResultsParser, ReaderQueryResultsParserOutput};
use std::fmt;
use std::str::FromStr;

/// The representation a query result is returned in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ResultFormat {
    /// The response text as sent by the endpoint.
    #[default]
    Original,
    /// Native values converted from the RDF terms.
    Native,
    /// A [`Table`]. Not available for CONSTRUCT, DESCRIBE and updates.
    Tabular,
}

impl FromStr for ResultFormat {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "original" => Ok(Self::Original),
            "native" | "python" => Ok(Self::Native),
            "tabular" | "dataframe" => Ok(Self::Tabular),
            _ => Err(ConfigurationError::UnknownResultFormat(s.to_owned())),
        }
    }
}

impl fmt::Display for ResultFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Original => "original",
            Self::Native => "native",
            Self::Tabular => "tabular",
        })
    }
}

/// Options of a query call.
#[derive(Clone, Debug, Default)]
pub struct QueryOptions {
    pub format: ResultFormat,
    /// Returns only the solutions of a SELECT or only the boolean of an ASK.
    pub bindings_only: bool,
    namespaces: Vec<(String, String)>,
}

impl QueryOptions {
    pub fn new(format: ResultFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_bindings_only(mut self, bindings_only: bool) -> Self {
        self.bindings_only = bindings_only;
        self
    }

    /// Declares a prefix that is prepended to the query text.
    ///
    /// ```
    /// use sparql_kit::results::QueryOptions;
    ///
    /// let options = QueryOptions::default().with_namespace("ex", "http://example.com/");
    /// assert_eq!(
    ///     options.prepare_query("SELECT * WHERE { ?s a ex:Thing }"),
    ///     "PREFIX ex: <http://example.com/>\nSELECT * WHERE { ?s a ex:Thing }"
    /// );
    /// ```
    #[must_use]
    pub fn with_namespace(mut self, prefix: impl Into<String>, iri: impl Into<String>) -> Self {
        self.namespaces.push((prefix.into(), iri.into()));
        self
    }

    /// The query text with the declared prefixes.
    pub fn prepare_query(&self, query: &str) -> String {
        let mut prepared = String::new();
        for (prefix, iri) in &self.namespaces {
            prepared.push_str(&format!("PREFIX {prefix}: <{iri}>\n"));
        }
        prepared.push_str(query);
        prepared
    }
}

/// A normalized query result.
#[derive(Clone, Debug, PartialEq)]
pub enum QueryOutput {
    /// The endpoint answered without content.
    Empty,
    /// Response text, in the original representation or from a non RDF response.
    Text(String),
    Boolean(bool),
    Solutions(NativeSolutions),
    /// The solutions of a SELECT without the envelope.
    Bindings(Vec<NativeBinding>),
    Graph(Graph),
    Table(Table),
}

impl QueryOutput {
    /// The number of solutions, for the variants holding solutions.
    pub fn solution_count(&self) -> Option<usize> {
        match self {
            Self::Solutions(solutions) => Some(solutions.bindings.len()),
            Self::Bindings(bindings) => Some(bindings.len()),
            Self::Table(table) => Some(table.len()),
            _ => None,
        }
    }
}

/// Fails if `format` cannot represent the result of a `kind` query.
pub(crate) fn check_format(kind: QueryKind, format: ResultFormat) -> Result<(), Error> {
    if format == ResultFormat::Tabular && !kind.is_tabular() {
        return Err(UnsupportedOperation::Tabular(kind).into());
    }
    Ok(())
}

/// Converts a raw response into the representation selected by `options`.
pub fn normalize(
    raw: RawResponse,
    kind: QueryKind,
    options: &QueryOptions,
) -> Result<QueryOutput, Error> {
    check_format(kind, options.format)?;
    match raw {
        RawResponse::Empty => Ok(QueryOutput::Empty),
        RawResponse::Message(text) => Ok(QueryOutput::Text(text)),
        RawResponse::Graph { body, format } => match options.format {
            ResultFormat::Original => Ok(QueryOutput::Text(
                String::from_utf8_lossy(&body).into_owned(),
            )),
            ResultFormat::Native => Ok(QueryOutput::Graph(parse_graph(&body, format)?)),
            ResultFormat::Tabular => Err(UnsupportedOperation::Tabular(kind).into()),
        },
        RawResponse::Results(body) => normalize_results(&body, options),
    }
}

fn normalize_results(body: &[u8], options: &QueryOptions) -> Result<QueryOutput, Error> {
    let parsed = QueryResultsParser::from_format(QueryResultsFormat::Json).for_reader(body)?;
    match parsed {
        ReaderQueryResultsParserOutput::Boolean(value) => Ok(match options.format {
            ResultFormat::Original if options.bindings_only => {
                QueryOutput::Text(value.to_string())
            }
            ResultFormat::Original => QueryOutput::Text(canonical_boolean(value)),
            ResultFormat::Native => QueryOutput::Boolean(value),
            ResultFormat::Tabular => QueryOutput::Table(Table::from_boolean(value)),
        }),
        ReaderQueryResultsParserOutput::Solutions(solutions) => {
            if options.format == ResultFormat::Original {
                return Ok(QueryOutput::Text(if options.bindings_only {
                    original_bindings(body)?
                } else {
                    String::from_utf8_lossy(body).into_owned()
                }));
            }
            let variables = solutions
                .variables()
                .iter()
                .map(|v| v.as_str().to_owned())
                .collect::<Vec<_>>();
            let mut bindings = Vec::new();
            for solution in solutions {
                let solution = solution?;
                let mut binding = NativeBinding::default();
                for (variable, term) in &solution {
                    binding.push(variable.as_str().to_owned(), NativeValue::from_term(term));
                }
                bindings.push(binding);
            }
            let solutions = NativeSolutions {
                variables,
                bindings,
            };
            Ok(match options.format {
                ResultFormat::Tabular => QueryOutput::Table(Table::from_solutions(solutions)),
                _ if options.bindings_only => QueryOutput::Bindings(solutions.bindings),
                _ => QueryOutput::Solutions(solutions),
            })
        }
    }
}

/// The boolean result document, with the exact shape endpoints are compared against.
fn canonical_boolean(value: bool) -> String {
    format!(r#"{{"head": {{}}, "boolean": {value}}}"#)
}

/// The JSON text of `results.bindings`.
fn original_bindings(body: &[u8]) -> Result<String, Error> {
    let mut document: serde_json::Value = serde_json::from_slice(body)?;
    let bindings = document
        .get_mut("results")
        .and_then(|results| results.get_mut("bindings"))
        .map(serde_json::Value::take)
        .unwrap_or_else(|| serde_json::Value::Array(Vec::new()));
    Ok(serde_json::to_string_pretty(&bindings)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media_type::RdfMediaType;

    const SELECT: &str = r#"{
  "head": {"vars": ["s", "count", "label"]},
  "results": {"bindings": [
    {"s": {"type": "uri", "value": "http://example.com/a"},
     "count": {"type": "literal", "value": "3", "datatype": "http://www.w3.org/2001/XMLSchema#integer"},
     "label": {"type": "literal", "value": "A", "xml:lang": "en"}},
    {"s": {"type": "bnode", "value": "b1"},
     "count": {"type": "literal", "value": "4", "datatype": "http://www.w3.org/2001/XMLSchema#integer"}}
  ]}
}"#;

    const ASK: &str = r#"{ "head" : { } , "boolean" : true }"#;

    fn run(raw: &str, kind: QueryKind, options: &QueryOptions) -> QueryOutput {
        normalize(
            RawResponse::Results(raw.as_bytes().to_vec()),
            kind,
            options,
        )
        .unwrap()
    }

    #[test]
    fn original_keeps_the_wire_text() {
        let output = run(SELECT, QueryKind::Select, &QueryOptions::default());
        assert_eq!(output, QueryOutput::Text(SELECT.to_owned()));
    }

    #[test]
    fn original_boolean_is_canonical() {
        let output = run(ASK, QueryKind::Ask, &QueryOptions::default());
        assert_eq!(
            output,
            QueryOutput::Text(r#"{"head": {}, "boolean": true}"#.to_owned())
        );
    }

    #[test]
    fn original_bindings_only() {
        let options = QueryOptions::default().with_bindings_only(true);
        let QueryOutput::Text(text) = run(SELECT, QueryKind::Select, &options) else {
            panic!("expected text");
        };
        let bindings: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(bindings.as_array().unwrap().len(), 2);
        assert_eq!(
            run(ASK, QueryKind::Ask, &options),
            QueryOutput::Text("true".to_owned())
        );
    }

    #[test]
    fn native_converts_values() {
        let QueryOutput::Solutions(solutions) =
            run(SELECT, QueryKind::Select, &QueryOptions::new(ResultFormat::Native))
        else {
            panic!("expected solutions");
        };
        assert_eq!(solutions.variables, ["s", "count", "label"]);
        let first = &solutions.bindings[0];
        assert_eq!(
            first.get("s"),
            Some(&NativeValue::Iri("http://example.com/a".to_owned()))
        );
        assert_eq!(first.get("count"), Some(&NativeValue::Integer(3)));
        assert_eq!(
            first.get("label"),
            Some(&NativeValue::LangString {
                value: "A".to_owned(),
                language: "en".to_owned()
            })
        );
        assert_eq!(
            solutions.bindings[1].get("s"),
            Some(&NativeValue::BlankNode("b1".to_owned()))
        );
        assert_eq!(solutions.bindings[1].get("label"), None);
    }

    #[test]
    fn native_bindings_only_and_ask() {
        let options = QueryOptions::new(ResultFormat::Native).with_bindings_only(true);
        let output = run(SELECT, QueryKind::Select, &options);
        assert_eq!(output.solution_count(), Some(2));
        assert!(matches!(output, QueryOutput::Bindings(_)));
        assert_eq!(run(ASK, QueryKind::Ask, &options), QueryOutput::Boolean(true));
        assert_eq!(
            run(ASK, QueryKind::Ask, &QueryOptions::new(ResultFormat::Native)),
            QueryOutput::Boolean(true)
        );
    }

    #[test]
    fn tabular_results() {
        let options = QueryOptions::new(ResultFormat::Tabular);
        let QueryOutput::Table(table) = run(SELECT, QueryKind::Select, &options) else {
            panic!("expected a table");
        };
        assert_eq!(table.columns, ["s", "count", "label"]);
        assert_eq!(table.len(), 2);
        assert_eq!(
            run(ASK, QueryKind::Ask, &options),
            QueryOutput::Table(Table::from_boolean(true))
        );
    }

    #[test]
    fn tabular_is_rejected_for_graphs() {
        let result = normalize(
            RawResponse::Graph {
                body: Vec::new(),
                format: RdfMediaType::Turtle,
            },
            QueryKind::Construct,
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
    fn native_graph_is_parsed() {
        let output = normalize(
            RawResponse::Graph {
                body: b"<http://example.com/a> <http://example.com/b> <http://example.com/c> ."
                    .to_vec(),
                format: RdfMediaType::NTriples,
            },
            QueryKind::Construct,
            &QueryOptions::new(ResultFormat::Native),
        )
        .unwrap();
        let QueryOutput::Graph(graph) = output else {
            panic!("expected a graph");
        };
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn empty_responses_stay_empty() {
        for format in [ResultFormat::Original, ResultFormat::Native] {
            assert_eq!(
                normalize(RawResponse::Empty, QueryKind::Drop, &QueryOptions::new(format))
                    .unwrap(),
                QueryOutput::Empty
            );
        }
    }

    #[test]
    fn parses_format_names() {
        assert_eq!("native".parse::<ResultFormat>().unwrap(), ResultFormat::Native);
        assert_eq!(
            "dataframe".parse::<ResultFormat>().unwrap(),
            ResultFormat::Tabular
        );
        assert!("xml".parse::<ResultFormat>().is_err());
    }
}
