//! The registered RDF media types and their file suffixes.

use crate::error::ConfigurationError;
use oxrdfio::RdfFormat;
use std::ffi::OsStr;
use std::fmt;
use std::path::Path;

/// One of the RDF media types a graph store operation may request or send.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RdfMediaType {
    /// `application/n-triples`
    NTriples,
    /// `application/n-quads`
    NQuads,
    /// `text/turtle`
    Turtle,
    /// `application/trig`
    TriG,
    /// `application/ld+json`
    JsonLd,
    /// `application/rdf+xml`
    RdfXml,
}

/// File suffix (with the leading dot) to media type.
static SUFFIXES: [(&str, RdfMediaType); 7] = [
    (".nt", RdfMediaType::NTriples),
    (".nq", RdfMediaType::NQuads),
    (".ttl", RdfMediaType::Turtle),
    (".trig", RdfMediaType::TriG),
    (".json", RdfMediaType::JsonLd),
    (".jsonld", RdfMediaType::JsonLd),
    (".xml", RdfMediaType::RdfXml),
];

impl RdfMediaType {
    /// All registered media types, in registration order.
    pub const ALL: [Self; 6] = [
        Self::NTriples,
        Self::NQuads,
        Self::Turtle,
        Self::TriG,
        Self::JsonLd,
        Self::RdfXml,
    ];

    /// The canonical media type string.
    pub const fn media_type(self) -> &'static str {
        match self {
            Self::NTriples => "application/n-triples",
            Self::NQuads => "application/n-quads",
            Self::Turtle => "text/turtle",
            Self::TriG => "application/trig",
            Self::JsonLd => "application/ld+json",
            Self::RdfXml => "application/rdf+xml",
        }
    }

    /// The preferred file extension, without the leading dot.
    pub const fn file_extension(self) -> &'static str {
        match self {
            Self::NTriples => "nt",
            Self::NQuads => "nq",
            Self::Turtle => "ttl",
            Self::TriG => "trig",
            Self::JsonLd => "jsonld",
            Self::RdfXml => "rdf",
        }
    }

    /// Looks up a media type, ignoring parameters like `charset` and letter case.
    ///
    /// ```
    /// use sparql_kit::RdfMediaType;
    ///
    /// assert_eq!(
    ///     RdfMediaType::from_media_type("text/turtle; charset=utf-8"),
    ///     Some(RdfMediaType::Turtle)
    /// );
    /// assert_eq!(RdfMediaType::from_media_type("text/html"), None);
    /// ```
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        let essence = media_type.split(';').next()?.trim();
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.media_type().eq_ignore_ascii_case(essence))
    }

    /// Looks up a file suffix. The leading dot is optional.
    pub fn from_extension(extension: &str) -> Option<Self> {
        let extension = extension.strip_prefix('.').unwrap_or(extension);
        SUFFIXES
            .iter()
            .find(|(suffix, _)| suffix[1..] == *extension)
            .map(|(_, media_type)| *media_type)
    }

    /// Looks up the media type of a file from its extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(OsStr::to_str)
            .and_then(Self::from_extension)
    }

    /// Validates a requested media type against the registered ones.
    pub fn parse_allowed(media_type: &str) -> Result<Self, ConfigurationError> {
        Self::from_media_type(media_type).ok_or_else(|| ConfigurationError::UnknownMediaType {
            media_type: media_type.to_owned(),
            allowed: Self::ALL.map(Self::media_type).join(", "),
        })
    }

    /// Guesses the syntax of an RDF document from its first characters.
    pub fn guess_from_data(data: &str) -> Self {
        let data = data.trim_start();
        if ["PREFIX", "@prefix", "BASE", "@base"]
            .iter()
            .any(|keyword| data.starts_with(keyword))
        {
            Self::Turtle
        } else if data.starts_with('{') || data.starts_with('[') {
            Self::JsonLd
        } else if data.starts_with("<?xml") || data.starts_with("<rdf") {
            Self::RdfXml
        } else {
            Self::NTriples
        }
    }

    /// The `oxrdfio` format that reads and writes this media type.
    pub fn rdf_format(self) -> Result<RdfFormat, ConfigurationError> {
        match self {
            Self::NTriples => Ok(RdfFormat::NTriples),
            Self::NQuads => Ok(RdfFormat::NQuads),
            Self::Turtle => Ok(RdfFormat::Turtle),
            Self::TriG => Ok(RdfFormat::TriG),
            Self::RdfXml => Ok(RdfFormat::RdfXml),
            Self::JsonLd => Err(ConfigurationError::UnsupportedSyntax(self.media_type())),
        }
    }

    /// Whether the file name ends with one of the registered suffixes.
    pub fn is_rdf_file(path: &Path) -> bool {
        Self::from_path(path).is_some()
    }
}

impl fmt::Display for RdfMediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.media_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_table_matches_registered_types() {
        assert_eq!(
            RdfMediaType::from_extension(".nt"),
            Some(RdfMediaType::NTriples)
        );
        assert_eq!(
            RdfMediaType::from_extension("nq"),
            Some(RdfMediaType::NQuads)
        );
        assert_eq!(
            RdfMediaType::from_extension("ttl"),
            Some(RdfMediaType::Turtle)
        );
        assert_eq!(
            RdfMediaType::from_extension("trig"),
            Some(RdfMediaType::TriG)
        );
        assert_eq!(
            RdfMediaType::from_extension("json"),
            Some(RdfMediaType::JsonLd)
        );
        assert_eq!(
            RdfMediaType::from_extension("jsonld"),
            Some(RdfMediaType::JsonLd)
        );
        assert_eq!(
            RdfMediaType::from_extension("xml"),
            Some(RdfMediaType::RdfXml)
        );
        assert_eq!(RdfMediaType::from_extension("rdf"), None);
        assert_eq!(RdfMediaType::from_extension("txt"), None);
    }

    #[test]
    fn recognizes_rdf_files() {
        assert!(RdfMediaType::is_rdf_file(Path::new("data/example.ttl")));
        assert!(RdfMediaType::is_rdf_file(Path::new("vocab.jsonld")));
        assert!(!RdfMediaType::is_rdf_file(Path::new("README.md")));
        assert!(!RdfMediaType::is_rdf_file(Path::new("ttl")));
    }

    #[test]
    fn rejects_unregistered_media_types() {
        let error = RdfMediaType::parse_allowed("text/n3").unwrap_err();
        assert!(error.to_string().contains("text/turtle"));
        assert_eq!(
            RdfMediaType::parse_allowed("application/RDF+XML").unwrap(),
            RdfMediaType::RdfXml
        );
    }

    #[test]
    fn guesses_format_from_data() {
        assert_eq!(
            RdfMediaType::guess_from_data("\n  PREFIX ex: <http://example.com/>\n ex:a ex:b ex:c ."),
            RdfMediaType::Turtle
        );
        assert_eq!(
            RdfMediaType::guess_from_data("@prefix ex: <http://example.com/> ."),
            RdfMediaType::Turtle
        );
        assert_eq!(
            RdfMediaType::guess_from_data(r#"[{"@id": "http://example.com/a"}]"#),
            RdfMediaType::JsonLd
        );
        assert_eq!(
            RdfMediaType::guess_from_data("<?xml version=\"1.0\"?><rdf:RDF/>"),
            RdfMediaType::RdfXml
        );
        assert_eq!(
            RdfMediaType::guess_from_data(
                "<http://example.com/a> <http://example.com/b> <http://example.com/c> ."
            ),
            RdfMediaType::NTriples
        );
    }

    #[test]
    fn json_ld_has_no_oxrdfio_format() {
        assert!(RdfMediaType::JsonLd.rdf_format().is_err());
        assert_eq!(RdfMediaType::TriG.rdf_format().unwrap(), RdfFormat::TriG);
    }
}
