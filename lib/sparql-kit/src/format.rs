//! Canonical formatting of Turtle files.
//!
//! The triples of a document are sorted and written back with the prefixes the document
//! declares. Comment lines at the very top of a file, like the metadata header some editors
//! write, are kept as is.

use crate::error::{ConfigurationError, Error};
use oxrdf::{BlankNode, Subject, Term, Triple};
use oxrdfio::{RdfFormat, RdfParser, RdfSerializer};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;
use walkdir::WalkDir;

/// The syntax formatted documents are written in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Turtle,
    NTriples,
    RdfXml,
}

impl OutputFormat {
    fn rdf_format(self) -> RdfFormat {
        match self {
            Self::Turtle => RdfFormat::Turtle,
            Self::NTriples => RdfFormat::NTriples,
            Self::RdfXml => RdfFormat::RdfXml,
        }
    }

    pub fn file_extension(self) -> &'static str {
        self.rdf_format().file_extension()
    }
}

impl FromStr for OutputFormat {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "turtle" | "longturtle" | "ttl" => Ok(Self::Turtle),
            "n-triples" | "ntriples" | "nt" => Ok(Self::NTriples),
            "xml" | "rdf-xml" | "rdf" => Ok(Self::RdfXml),
            _ => Err(ConfigurationError::UnknownOutputFormat(s.to_owned())),
        }
    }
}

/// The number of files a run changed, or would change in check mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FormatReport {
    pub changed: usize,
    pub total: usize,
}

/// The comment lines at the top of a document, each followed by a line break.
fn header(content: &str) -> String {
    let mut header = String::new();
    for line in content.lines().take_while(|line| line.starts_with('#')) {
        header.push_str(line);
        header.push('\n');
    }
    header
}

/// Formats a Turtle document. Returns the formatted document and whether it differs from the
/// input.
pub fn format_str(content: &str, output: OutputFormat) -> Result<(String, bool), Error> {
    let mut parser = RdfParser::from_format(RdfFormat::Turtle).for_reader(content.as_bytes());
    let mut triples = Vec::new();
    for quad in &mut parser {
        triples.push(Triple::from(quad?));
    }
    let mut prefixes = parser
        .prefixes()
        .map(|(name, iri)| (name.to_owned(), iri.to_owned()))
        .collect::<Vec<_>>();
    prefixes.sort();

    let mut serializer = RdfSerializer::from_format(output.rdf_format());
    for (name, iri) in prefixes {
        serializer =
            serializer
                .with_prefix(&name, &iri)
                .map_err(|e| ConfigurationError::InvalidPrefix {
                    prefix: name.clone(),
                    iri: iri.clone(),
                    reason: e.to_string(),
                })?;
    }
    let mut serializer = serializer.for_writer(Vec::new());
    for triple in canonicalize(triples) {
        serializer.serialize_triple(&triple)?;
    }
    let body = serializer.finish()?;

    let mut formatted = header(content);
    formatted.push_str(&String::from_utf8_lossy(&body));
    let changed = formatted != content;
    Ok((formatted, changed))
}

/// Sorts triples and renames blank nodes in the order they appear.
fn canonicalize(mut triples: Vec<Triple>) -> Vec<Triple> {
    triples.sort_by_cached_key(|t| {
        (
            subject_key(&t.subject),
            t.predicate.as_str().to_owned(),
            term_key(&t.object),
        )
    });
    let mut labels = HashMap::new();
    let mut relabel = |node: &BlankNode| {
        let next = labels.len();
        labels
            .entry(node.as_str().to_owned())
            .or_insert_with(|| BlankNode::new_unchecked(format!("b{next}")))
            .clone()
    };
    let mut triples = triples
        .into_iter()
        .map(|t| {
            let subject = match t.subject {
                Subject::BlankNode(node) => Subject::BlankNode(relabel(&node)),
                subject => subject,
            };
            let object = match t.object {
                Term::BlankNode(node) => Term::BlankNode(relabel(&node)),
                object => object,
            };
            Triple::new(subject, t.predicate, object)
        })
        .collect::<Vec<_>>();
    triples.sort_by_cached_key(|t| {
        (
            t.subject.to_string(),
            t.predicate.to_string(),
            t.object.to_string(),
        )
    });
    triples.dedup();
    triples
}

/// A sort key ignoring blank node labels, which are arbitrary.
fn subject_key(subject: &Subject) -> String {
    match subject {
        Subject::BlankNode(_) => "_:".to_owned(),
        subject => subject.to_string(),
    }
}

fn term_key(term: &Term) -> String {
    match term {
        Term::BlankNode(_) => "_:".to_owned(),
        term => term.to_string(),
    }
}

/// Formats a file in place, or into `output_path`.
///
/// A non Turtle output without `output_path` is written next to the input, with the extension
/// of the output format. In check mode nothing is written and a file that would change is an
/// [`Error::WouldReformat`]. Returns whether the file changed.
pub fn format_file(
    path: &Path,
    check: bool,
    output: OutputFormat,
    output_path: Option<&Path>,
) -> Result<bool, Error> {
    let content = fs::read_to_string(path)?;
    let (formatted, changed) = format_str(&content, output)?;
    if !changed {
        return Ok(false);
    }
    if check {
        return Err(Error::WouldReformat(path.to_owned()));
    }
    let destination = match output_path {
        Some(output_path) => output_path.to_owned(),
        None if output == OutputFormat::Turtle => path.to_owned(),
        None => path.with_extension(output.file_extension()),
    };
    fs::write(&destination, formatted)?;
    info!("The file {} has been formatted", destination.display());
    Ok(true)
}

/// The Turtle files below a directory, sorted by path.
fn turtle_files(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry.path().extension().is_some_and(|ext| ext == "ttl")
        {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Formats a file, or every `.ttl` file below a directory.
///
/// In check mode every file is inspected and the run fails with [`Error::FormatCheck`] if any
/// of them would change.
pub fn format_path(path: &Path, check: bool, output: OutputFormat) -> Result<FormatReport, Error> {
    if !path.is_dir() {
        let changed = format_file(path, check, output, None)?;
        return Ok(FormatReport {
            changed: usize::from(changed),
            total: 1,
        });
    }
    let files = turtle_files(path)?;
    let mut report = FormatReport {
        changed: 0,
        total: files.len(),
    };
    for file in &files {
        match format_file(file, check, output, None) {
            Ok(changed) => report.changed += usize::from(changed),
            Err(Error::WouldReformat(file)) => {
                info!("The file {} contains changes that can be formatted", file.display());
                report.changed += 1;
            }
            Err(e) => return Err(e),
        }
    }
    if check && report.changed > 0 {
        return Err(Error::FormatCheck {
            changed: report.changed,
            total: report.total,
        });
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use assert_fs::TempDir;

    const MESSY: &str = "# baseURI: http://example.com/onto\n# imports: http://example.com/other\n\nPREFIX ex: <http://example.com/>\nex:b ex:p \"2\" .\nex:a ex:p \"1\" ;   ex:q [ ex:r ex:s ] .\n";

    #[test]
    fn keeps_the_comment_header() {
        let (formatted, changed) = format_str(MESSY, OutputFormat::Turtle).unwrap();
        assert!(changed);
        assert!(formatted.starts_with(
            "# baseURI: http://example.com/onto\n# imports: http://example.com/other\n"
        ));
        assert!(formatted.contains("ex:a"));
    }

    #[test]
    fn formatting_is_idempotent() {
        let (once, _) = format_str(MESSY, OutputFormat::Turtle).unwrap();
        let (twice, changed) = format_str(&once, OutputFormat::Turtle).unwrap();
        assert!(!changed);
        assert_eq!(once, twice);
    }

    #[test]
    fn subjects_are_sorted() {
        let (formatted, _) = format_str(MESSY, OutputFormat::NTriples).unwrap();
        let a = formatted.find("<http://example.com/a>").unwrap();
        let b = formatted.find("<http://example.com/b>").unwrap();
        assert!(a < b);
    }

    #[test]
    fn invalid_turtle_is_an_error() {
        assert!(format_str("ex:a ex:b ex:c .", OutputFormat::Turtle).is_err());
    }

    #[test]
    fn check_mode_does_not_write() {
        let dir = TempDir::new().unwrap();
        let file = dir.child("onto.ttl");
        file.write_str(MESSY).unwrap();
        assert!(matches!(
            format_file(file.path(), true, OutputFormat::Turtle, None),
            Err(Error::WouldReformat(_))
        ));
        file.assert(MESSY);
    }

    #[test]
    fn directories_report_changes() {
        let dir = TempDir::new().unwrap();
        dir.child("a.ttl").write_str(MESSY).unwrap();
        dir.child("nested/b.ttl").write_str(MESSY).unwrap();
        dir.child("c.nt").write_str("not turtle").unwrap();
        assert!(matches!(
            format_path(dir.path(), true, OutputFormat::Turtle),
            Err(Error::FormatCheck {
                changed: 2,
                total: 2
            })
        ));
        assert_eq!(
            format_path(dir.path(), false, OutputFormat::Turtle).unwrap(),
            FormatReport {
                changed: 2,
                total: 2
            }
        );
        assert_eq!(
            format_path(dir.path(), true, OutputFormat::Turtle).unwrap(),
            FormatReport {
                changed: 0,
                total: 2
            }
        );
    }

    #[test]
    fn other_formats_are_written_next_to_the_input() {
        let dir = TempDir::new().unwrap();
        let file = dir.child("onto.ttl");
        file.write_str(MESSY).unwrap();
        assert!(format_file(file.path(), false, OutputFormat::NTriples, None).unwrap());
        file.assert(MESSY);
        let converted = fs::read_to_string(dir.child("onto.nt").path()).unwrap();
        assert!(converted.contains("<http://example.com/a>"));
    }
}
