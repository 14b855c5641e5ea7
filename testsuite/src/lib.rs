//! An in-process stand-in for Apache Jena Fuseki.
//!
//! [`FakeFuseki`] answers SPARQL queries and updates, Graph Store Protocol requests and the
//! administration endpoints the sparql-kit tests rely on, and records every request it gets.

mod admin;
mod dataset;
mod error;
mod server;
mod state;

pub use error::FakeFusekiError;
pub use server::{router, serve, FakeFuseki};
pub use state::{AppState, FakeFusekiOptions, RecordedRequest};
