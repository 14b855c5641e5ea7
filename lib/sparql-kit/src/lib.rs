#![doc = include_str!("../README.md")]
#![doc(test(attr(deny(warnings))))]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod classify;
mod client;
mod config;
pub mod dispatch;
pub mod error;
pub mod format;
pub mod fuseki;
pub mod gsp;
pub mod io;
pub mod local;
mod media_type;
pub mod results;
pub mod target;
pub mod upload;

pub use crate::client::HttpClient;
pub use crate::config::{Credentials, HttpOptions, DEFAULT_TIMEOUT};
pub use crate::dispatch::{query, RawResponse, SparqlExecutor};
pub use crate::error::Error;
pub use crate::media_type::RdfMediaType;
pub use crate::target::Target;
