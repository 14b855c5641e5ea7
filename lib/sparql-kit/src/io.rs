//! Parsing and serialization of RDF graphs in the registered media types.

use crate::error::{ConfigurationError, Error};
use crate::media_type::RdfMediaType;
use oxrdf::{Graph, Triple};
use oxrdfio::{RdfParser, RdfSerializer};

/// Parses an RDF document into a [`Graph`].
///
/// Quads are flattened into their triples: the graph names of a TriG or N-Quads document are
/// dropped.
pub fn parse_graph(data: &[u8], media_type: RdfMediaType) -> Result<Graph, Error> {
    read_graph(RdfParser::from_format(media_type.rdf_format()?), data)
}

/// Parses an RDF document whose relative IRIs are resolved against `base_iri`.
pub fn parse_graph_with_base(
    data: &[u8],
    media_type: RdfMediaType,
    base_iri: &str,
) -> Result<Graph, Error> {
    let parser = RdfParser::from_format(media_type.rdf_format()?)
        .with_base_iri(base_iri)
        .map_err(|e| ConfigurationError::InvalidBaseIri {
            iri: base_iri.to_owned(),
            reason: e.to_string(),
        })?;
    read_graph(parser, data)
}

fn read_graph(parser: RdfParser, data: &[u8]) -> Result<Graph, Error> {
    let mut graph = Graph::new();
    for quad in parser.for_reader(data) {
        graph.insert(&Triple::from(quad?));
    }
    Ok(graph)
}

/// Serializes a [`Graph`] into the given media type.
pub fn serialize_graph(graph: &Graph, media_type: RdfMediaType) -> Result<Vec<u8>, Error> {
    let mut serializer =
        RdfSerializer::from_format(media_type.rdf_format()?).for_writer(Vec::new());
    for triple in graph {
        serializer.serialize_triple(triple)?;
    }
    Ok(serializer.finish()?)
}
