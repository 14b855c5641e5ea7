//! The places a query can be sent to.

use crate::client::parse_endpoint;
use crate::error::{ConfigurationError, Error};
use crate::media_type::RdfMediaType;
use crate::upload::rdf_files_below;
use oxigraph::store::Store;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;
use url::Url;

/// Where a query is evaluated.
///
/// Only [`Target::Remote`] involves HTTP. All other variants are loaded into an in-memory
/// [`Store`] and evaluated locally.
#[derive(Clone)]
pub enum Target {
    /// A SPARQL endpoint.
    Remote(Url),
    /// An RDF file, or a directory whose RDF files are all loaded.
    File(PathBuf),
    /// An RDF document given as text. Its syntax is guessed from its first characters.
    Inline(String),
    /// An already populated store.
    Store(Store),
}

impl Target {
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    /// Loads a local target into a store. A [`Target::Store`] is returned as is.
    ///
    /// Remote targets have no local representation and yield an empty store.
    pub fn materialize(&self) -> Result<Store, Error> {
        match self {
            Self::Store(store) => Ok(store.clone()),
            Self::Remote(_) => Ok(Store::new()?),
            Self::File(path) => {
                let store = Store::new()?;
                if path.is_dir() {
                    for file in rdf_files_below(path)? {
                        load_file(&store, &file)?;
                    }
                } else {
                    load_file(&store, path)?;
                }
                Ok(store)
            }
            Self::Inline(data) => {
                let store = Store::new()?;
                load_data(&store, data.as_bytes(), RdfMediaType::guess_from_data(data))?;
                Ok(store)
            }
        }
    }
}

impl FromStr for Target {
    type Err = ConfigurationError;

    /// Strings starting with `http` are endpoints, paths of existing files are files and any
    /// other string is inline RDF.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with("http") {
            return Ok(Self::Remote(parse_endpoint(s)?));
        }
        let path = Path::new(s);
        Ok(if path.exists() {
            Self::File(path.to_owned())
        } else {
            Self::Inline(s.to_owned())
        })
    }
}

impl From<Url> for Target {
    fn from(url: Url) -> Self {
        Self::Remote(url)
    }
}

impl From<Store> for Target {
    fn from(store: Store) -> Self {
        Self::Store(store)
    }
}

impl std::fmt::Debug for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote(url) => f.debug_tuple("Remote").field(&url.as_str()).finish(),
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
            Self::Inline(data) => f.debug_tuple("Inline").field(&data.len()).finish(),
            Self::Store(_) => f.write_str("Store"),
        }
    }
}

fn load_file(store: &Store, path: &Path) -> Result<(), Error> {
    let data = fs::read(path)?;
    let media_type = match RdfMediaType::from_path(path) {
        Some(media_type) => media_type,
        None => RdfMediaType::guess_from_data(&String::from_utf8_lossy(&data)),
    };
    debug!("Loading {} as {media_type}", path.display());
    load_data(store, &data, media_type)
}

fn load_data(store: &Store, data: &[u8], media_type: RdfMediaType) -> Result<(), Error> {
    store.load_from_reader(media_type.rdf_format()?, data)?;
    Ok(())
}
