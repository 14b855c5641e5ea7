//! Keyword based classification of SPARQL query text.
//!
//! The query text is never parsed. A query is classified by looking for upper case keywords
//! anywhere in the text, so a keyword inside a string literal or an IRI is picked up too: a
//! `SELECT` whose literal contains `"INSERT"` is sent as an update. The [`QueryClassifier`]
//! trait allows plugging a grammar aware strategy in its place.

use std::fmt;

pub const SPARQL_QUERY: &str = "application/sparql-query";
pub const SPARQL_UPDATE: &str = "application/sparql-update";
pub const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";
pub const TURTLE: &str = "text/turtle";

/// The kind of operation a query text performs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Select,
    Ask,
    Construct,
    Describe,
    /// `INSERT` or `DELETE` operations.
    Update,
    Drop,
    Clear,
    /// No known keyword was found.
    Unknown,
}

impl QueryKind {
    /// Whether the operation modifies the dataset.
    pub fn is_update(self) -> bool {
        matches!(self, Self::Update | Self::Drop | Self::Clear)
    }

    /// Whether the operation returns an RDF graph.
    pub fn is_graph(self) -> bool {
        matches!(self, Self::Construct | Self::Describe)
    }

    /// Whether the result may have a tabular representation.
    ///
    /// Only graphs and updates are known not to. A query of unknown kind may still be a SELECT.
    pub fn is_tabular(self) -> bool {
        !self.is_graph() && !self.is_update()
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Select => "SELECT",
            Self::Ask => "ASK",
            Self::Construct => "CONSTRUCT",
            Self::Describe => "DESCRIBE",
            Self::Update => "UPDATE",
            Self::Drop => "DROP",
            Self::Clear => "CLEAR",
            Self::Unknown => "UNKNOWN",
        })
    }
}

/// The outcome of classifying a query: its kind and the headers to send it with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Classification {
    pub kind: QueryKind,
    /// Value of the `Content-Type` request header.
    pub content_type: &'static str,
    /// Value of the `Accept` request header.
    pub accept: &'static str,
}

/// A strategy deciding how a query text is dispatched.
pub trait QueryClassifier {
    fn classify(&self, query: &str) -> Classification;
}

/// Case-sensitive keyword substring classification.
///
/// ```
/// use sparql_kit::classify::{KeywordClassifier, QueryClassifier, QueryKind};
///
/// let classification = KeywordClassifier.classify("DROP ALL");
/// assert_eq!(classification.kind, QueryKind::Drop);
/// assert_eq!(classification.content_type, "application/sparql-update");
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    fn kind(query: &str) -> QueryKind {
        const KEYWORDS: [(&str, QueryKind); 8] = [
            ("DROP", QueryKind::Drop),
            ("INSERT", QueryKind::Update),
            ("DELETE", QueryKind::Update),
            ("CLEAR", QueryKind::Clear),
            ("SELECT", QueryKind::Select),
            ("ASK", QueryKind::Ask),
            ("CONSTRUCT", QueryKind::Construct),
            ("DESCRIBE", QueryKind::Describe),
        ];
        KEYWORDS
            .iter()
            .find(|(keyword, _)| query.contains(keyword))
            .map_or(QueryKind::Unknown, |(_, kind)| *kind)
    }

    fn content_type(query: &str) -> &'static str {
        if ["DROP", "INSERT", "DELETE"]
            .iter()
            .any(|keyword| query.contains(keyword))
        {
            SPARQL_UPDATE
        } else {
            SPARQL_QUERY
        }
    }

    fn accept(query: &str) -> &'static str {
        if ["SELECT", "INSERT", "ASK"]
            .iter()
            .any(|keyword| query.contains(keyword))
        {
            SPARQL_RESULTS_JSON
        } else if query.contains("CONSTRUCT") || query.contains("DESCRIBE") {
            TURTLE
        } else {
            SPARQL_RESULTS_JSON
        }
    }
}

impl QueryClassifier for KeywordClassifier {
    fn classify(&self, query: &str) -> Classification {
        Classification {
            kind: Self::kind(query),
            content_type: Self::content_type(query),
            accept: Self::accept(query),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(query: &str) -> Classification {
        KeywordClassifier.classify(query)
    }

    #[test]
    fn select_is_a_query_returning_json() {
        let c = classify("SELECT * WHERE { ?s ?p ?o }");
        assert_eq!(c.kind, QueryKind::Select);
        assert_eq!(c.content_type, SPARQL_QUERY);
        assert_eq!(c.accept, SPARQL_RESULTS_JSON);
    }

    #[test]
    fn ask_returns_json() {
        let c = classify("ASK { ?s ?p ?o }");
        assert_eq!(c.kind, QueryKind::Ask);
        assert_eq!(c.content_type, SPARQL_QUERY);
        assert_eq!(c.accept, SPARQL_RESULTS_JSON);
    }

    #[test]
    fn construct_and_describe_return_turtle() {
        let c = classify("CONSTRUCT { ?s ?p ?o } WHERE { ?s ?p ?o }");
        assert_eq!(c.kind, QueryKind::Construct);
        assert_eq!(c.accept, TURTLE);
        let c = classify("DESCRIBE <http://example.com/a>");
        assert_eq!(c.kind, QueryKind::Describe);
        assert_eq!(c.accept, TURTLE);
    }

    #[test]
    fn drop_is_an_update() {
        let c = classify("DROP ALL");
        assert_eq!(c.kind, QueryKind::Drop);
        assert_eq!(c.content_type, SPARQL_UPDATE);
        assert_eq!(c.accept, SPARQL_RESULTS_JSON);
        assert!(c.kind.is_update());
    }

    #[test]
    fn insert_and_delete_are_updates() {
        let c = classify("INSERT DATA { <http://a> <http://b> <http://c> }");
        assert_eq!(c.kind, QueryKind::Update);
        assert_eq!(c.content_type, SPARQL_UPDATE);
        assert_eq!(c.accept, SPARQL_RESULTS_JSON);
        let c = classify("DELETE WHERE { ?s ?p ?o }");
        assert_eq!(c.kind, QueryKind::Update);
        assert_eq!(c.content_type, SPARQL_UPDATE);
    }

    #[test]
    fn clear_keeps_the_query_content_type() {
        let c = classify("CLEAR ALL");
        assert_eq!(c.kind, QueryKind::Clear);
        assert!(c.kind.is_update());
        assert_eq!(c.content_type, SPARQL_QUERY);
    }

    #[test]
    fn keywords_in_literals_are_matched() {
        let c = classify(r#"SELECT * WHERE { ?s ?p "please INSERT coin" }"#);
        assert_eq!(c.kind, QueryKind::Update);
        assert_eq!(c.content_type, SPARQL_UPDATE);
    }

    #[test]
    fn matching_is_case_sensitive() {
        let c = classify("select * where { ?s ?p ?o }");
        assert_eq!(c.kind, QueryKind::Unknown);
        assert_eq!(c.content_type, SPARQL_QUERY);
        assert_eq!(c.accept, SPARQL_RESULTS_JSON);
    }

    #[test]
    fn empty_text_is_not_rejected() {
        let c = classify("");
        assert_eq!(c.kind, QueryKind::Unknown);
        assert_eq!(c.content_type, SPARQL_QUERY);
    }

    #[test]
    fn graphs_and_updates_are_not_tabular() {
        assert!(QueryKind::Select.is_tabular());
        assert!(QueryKind::Ask.is_tabular());
        assert!(QueryKind::Unknown.is_tabular());
        assert!(!QueryKind::Construct.is_tabular());
        assert!(!QueryKind::Describe.is_tabular());
        assert!(!QueryKind::Update.is_tabular());
        assert!(!QueryKind::Drop.is_tabular());
        assert!(!QueryKind::Clear.is_tabular());
    }
}
