//! Uploads of RDF files to a graph store.

use crate::client::{parse_endpoint, HttpClient, ScopedClient};
use crate::dispatch::status_error;
use crate::error::{ConfigurationError, Error};
use crate::gsp::{is_write_success, send_source, GraphTarget, RdfSource};
use crate::media_type::RdfMediaType;
use oxrdf::NamedNode;
use reqwest::Method;
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

/// The graph each uploaded file goes to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum UploadGraph {
    /// The default graph.
    #[default]
    Default,
    /// A graph per file, named `urn:file:<file name>`.
    PerFile,
    /// The same named graph for every file.
    Named(NamedNode),
}

impl UploadGraph {
    /// Parses `file` as [`UploadGraph::PerFile`], `default` as [`UploadGraph::Default`] and any
    /// other value as a graph IRI.
    pub fn parse(value: &str) -> Result<Self, ConfigurationError> {
        if value == "file" {
            return Ok(Self::PerFile);
        }
        Ok(match value.parse::<GraphTarget>()? {
            GraphTarget::Default => Self::Default,
            GraphTarget::Named(graph) => Self::Named(graph),
        })
    }

    fn graph_for(&self, path: &Path) -> Result<GraphTarget, ConfigurationError> {
        Ok(match self {
            Self::Default => GraphTarget::Default,
            Self::Named(graph) => GraphTarget::Named(graph.clone()),
            Self::PerFile => {
                let name = path
                    .file_name()
                    .map(|name| name.to_string_lossy())
                    .unwrap_or_default();
                format!("urn:file:{name}").parse()?
            }
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct UploadOptions {
    pub graph: UploadGraph,
    /// POST into the graph instead of replacing it with PUT.
    pub append: bool,
    /// The syntax files are converted to. Files are sent in their own syntax by default.
    pub media_type: Option<RdfMediaType>,
}

/// The RDF files below `path`, sorted by path.
///
/// Only files with a registered RDF suffix are kept, for a single file as for the files of a
/// directory. Directories are walked recursively.
pub fn collect_files(path: &Path) -> Result<Vec<PathBuf>, Error> {
    if path.is_dir() {
        return rdf_files_below(path);
    }
    if RdfMediaType::is_rdf_file(path) {
        Ok(vec![path.to_owned()])
    } else {
        info!("Skipping {}, not an RDF file", path.display());
        Ok(Vec::new())
    }
}

/// The files with a registered RDF suffix below `dir`, sorted by path.
pub(crate) fn rdf_files_below(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry?;
        if entry.file_type().is_file() && RdfMediaType::is_rdf_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Uploads a file, or every RDF file of a directory, one after the other.
///
/// Returns the number of uploaded files. The first failure stops the upload and is returned
/// as [`Error::Upload`]. Files uploaded before it are not rolled back.
pub fn upload_path(
    endpoint: &str,
    path: &Path,
    options: &UploadOptions,
    client: Option<&HttpClient>,
) -> Result<usize, Error> {
    let endpoint = parse_endpoint(endpoint)?;
    let files = collect_files(path)?;
    let client = ScopedClient::acquire(client)?;
    for file in &files {
        upload_file(&client, &endpoint, file, options).map_err(|e| Error::Upload {
            path: file.clone(),
            source: Box::new(e),
        })?;
    }
    Ok(files.len())
}

fn upload_file(
    client: &HttpClient,
    endpoint: &url::Url,
    path: &Path,
    options: &UploadOptions,
) -> Result<(), Error> {
    let graph = options.graph.graph_for(path)?;
    let media_type = match options.media_type {
        Some(media_type) => media_type,
        None => RdfMediaType::from_path(path)
            .ok_or_else(|| ConfigurationError::UnknownFileExtension(path.to_owned()))?,
    };
    let method = if options.append {
        Method::POST
    } else {
        Method::PUT
    };
    let source = RdfSource::File(path.to_owned());
    let response = send_source(client, method, endpoint, &graph, &source, media_type)?;
    if !is_write_success(response.status()) {
        return Err(status_error(response).into());
    }
    info!("Uploaded {} to graph {graph}", path.display());
    Ok(())
}

/// Uploads a single source, replacing the graph content unless `append` is set.
///
/// Unlike [`crate::gsp::put`], a failure status is an error.
pub fn upload_source(
    endpoint: &str,
    source: &RdfSource,
    graph: &GraphTarget,
    append: bool,
    media_type: RdfMediaType,
    client: Option<&HttpClient>,
) -> Result<(), Error> {
    let endpoint = parse_endpoint(endpoint)?;
    let client = ScopedClient::acquire(client)?;
    let method = if append { Method::POST } else { Method::PUT };
    let response = send_source(&client, method, &endpoint, graph, source, media_type)?;
    if !is_write_success(response.status()) {
        return Err(status_error(response).into());
    }
    Ok(())
}
