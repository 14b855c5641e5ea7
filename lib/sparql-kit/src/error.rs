use crate::classify::QueryKind;
use oxigraph::sparql::EvaluationError;
use oxigraph::store::{LoaderError, StorageError};
use oxrdfio::RdfParseError;
use sparesults::QueryResultsParseError;
use std::io;
use std::path::PathBuf;

/// Any error raised by this crate.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The remote endpoint could not be reached or answered with an unexpected status.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The requested operation is not available for the given target or format.
    #[error(transparent)]
    Unsupported(#[from] UnsupportedOperation),
    /// The call was configured with an invalid value.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    /// An RDF document could not be parsed.
    #[error(transparent)]
    RdfParsing(#[from] RdfParseError),
    /// A SPARQL results document could not be parsed.
    #[error(transparent)]
    ResultsParsing(#[from] QueryResultsParseError),
    /// A JSON document could not be parsed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// The local SPARQL evaluation failed.
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
    /// Loading data into a local store failed.
    #[error(transparent)]
    Loader(#[from] LoaderError),
    /// The local store failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// Error from the OS I/O layer.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// A directory could not be walked.
    #[error(transparent)]
    Walk(#[from] walkdir::Error),
    /// Uploading a single file of a batch failed. Files uploaded before are kept.
    #[error("Failed to upload file {}: {source}", .path.display())]
    Upload {
        /// The file that failed.
        path: PathBuf,
        /// The underlying failure.
        #[source]
        source: Box<Error>,
    },
    /// Check mode found a file that would be reformatted.
    #[error("The file {} contains changes that can be formatted", .0.display())]
    WouldReformat(PathBuf),
    /// Check mode found files that would be reformatted.
    #[error("{changed} out of {total} files will change")]
    FormatCheck {
        /// Number of files that would change.
        changed: usize,
        /// Number of inspected files.
        total: usize,
    },
}

/// An error raised while talking to a remote endpoint.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection failure, timeout or an invalid response.
    #[error(transparent)]
    Connection(#[from] reqwest::Error),
    /// The endpoint answered with a status that is not a success for the operation.
    #[error("ERROR {status}: {body}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The response body, verbatim.
        body: String,
    },
}

impl TransportError {
    /// Returns the HTTP status code carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Connection(error) => error.status().map(|s| s.as_u16()),
            Self::Status { status, .. } => Some(*status),
        }
    }
}

/// An operation that is rejected before any I/O happens.
#[derive(Debug, thiserror::Error)]
pub enum UnsupportedOperation {
    /// Updates can only be sent to remote endpoints.
    #[error("{0} is not implemented for local targets")]
    LocalUpdate(QueryKind),
    /// Only SELECT and ASK results have a tabular representation.
    #[error("Only SELECT and ASK queries can be returned as a table, found {0}")]
    Tabular(QueryKind),
}

/// An invalid value passed to an operation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    /// The media type is not one of the registered RDF media types.
    #[error("Media type '{media_type}' is not available. Allowed types are {allowed}")]
    UnknownMediaType {
        /// The rejected media type.
        media_type: String,
        /// The comma separated list of allowed media types.
        allowed: String,
    },
    /// The media type is registered but no parser or serializer exists for it.
    #[error("No RDF parser or serializer is available for '{0}'")]
    UnsupportedSyntax(&'static str),
    /// A graph identifier is required.
    #[error("You must supply a graph IRI")]
    MissingGraphIri,
    /// The graph identifier is not a valid IRI.
    #[error("Invalid graph IRI '{iri}': {reason}")]
    InvalidGraphIri {
        /// The rejected identifier.
        iri: String,
        /// Why it was rejected.
        reason: String,
    },
    /// The base IRI of a document is not a valid IRI.
    #[error("Invalid base IRI '{iri}': {reason}")]
    InvalidBaseIri {
        /// The rejected IRI.
        iri: String,
        /// Why it was rejected.
        reason: String,
    },
    /// A query is required.
    #[error("You must supply a query")]
    EmptyQuery,
    /// The output format name is unknown.
    #[error("Unknown result format '{0}', expected 'original', 'native' or 'tabular'")]
    UnknownResultFormat(String),
    /// The output format name of the formatter is unknown.
    #[error("Unknown output format '{0}', expected 'turtle', 'n-triples' or 'xml'")]
    UnknownOutputFormat(String),
    /// A prefix declaration has an invalid IRI.
    #[error("Invalid IRI for prefix {prefix}: {iri}: {reason}")]
    InvalidPrefix {
        /// The prefix name.
        prefix: String,
        /// The rejected IRI.
        iri: String,
        /// Why it was rejected.
        reason: String,
    },
    /// A dataset name is required.
    #[error("You must supply a dataset name")]
    MissingDatasetName,
    /// A header value could not be encoded.
    #[error("Invalid value for header {name}: {value}")]
    InvalidHeader {
        /// The header name.
        name: &'static str,
        /// The rejected value.
        value: String,
    },
    /// The file extension does not map to an RDF media type.
    #[error("The file {} does not have a recognized RDF extension", .0.display())]
    UnknownFileExtension(PathBuf),
    /// The URL is not usable as an endpoint.
    #[error("Invalid endpoint URL '{url}': {reason}")]
    InvalidEndpoint {
        /// The rejected URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },
}
