#![cfg(test)]

use anyhow::Result;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use sparql_kit::error::TransportError;
use sparql_kit::gsp::{GraphTarget, RdfSource};
use sparql_kit::upload::{upload_path, upload_source, UploadGraph, UploadOptions};
use sparql_kit::{Error, RdfMediaType};
use sparql_kit_testsuite::FakeFuseki;

const TURTLE: &str = "PREFIX ex: <http://example.com/>\nex:a ex:p 1 .\nex:b ex:p 2 .\n";
const NTRIPLES: &str = "<http://example.com/c> <http://example.com/p> \"3\" .\n";

fn data_dir() -> Result<TempDir> {
    let dir = TempDir::new()?;
    dir.child("a.ttl").write_str(TURTLE)?;
    dir.child("b.nt").write_str(NTRIPLES)?;
    dir.child("nested/c.ttl").write_str("[] <http://example.com/p> 4 .\n")?;
    dir.child("notes.md").write_str("# not RDF")?;
    Ok(dir)
}

#[test]
fn directories_go_to_a_graph_per_file() -> Result<()> {
    let server = FakeFuseki::start()?;
    let dir = data_dir()?;
    let options = UploadOptions {
        graph: UploadGraph::PerFile,
        ..UploadOptions::default()
    };
    assert_eq!(upload_path(&server.dataset_url(), dir.path(), &options, None)?, 3);
    assert_eq!(server.graph_len(Some("urn:file:a.ttl"))?, 2);
    assert_eq!(server.graph_len(Some("urn:file:b.nt"))?, 1);
    assert_eq!(server.graph_len(Some("urn:file:c.ttl"))?, 1);
    assert_eq!(server.graph_len(None)?, 0);
    Ok(())
}

#[test]
fn files_keep_their_syntax_unless_forced() -> Result<()> {
    let server = FakeFuseki::start()?;
    let dir = data_dir()?;
    upload_path(
        &server.dataset_url(),
        dir.child("b.nt").path(),
        &UploadOptions::default(),
        None,
    )?;
    let content_type = server.requests().pop().and_then(|request| request.content_type);
    assert_eq!(content_type.as_deref(), Some("application/n-triples"));

    let options = UploadOptions {
        media_type: Some(RdfMediaType::Turtle),
        ..UploadOptions::default()
    };
    upload_path(&server.dataset_url(), dir.child("b.nt").path(), &options, None)?;
    let content_type = server.requests().pop().and_then(|request| request.content_type);
    assert_eq!(content_type.as_deref(), Some("text/turtle"));
    assert_eq!(server.graph_len(None)?, 1);
    Ok(())
}

#[test]
fn append_keeps_previous_uploads() -> Result<()> {
    let server = FakeFuseki::start()?;
    let dir = data_dir()?;
    let file = dir.child("nested/c.ttl");
    let options = UploadOptions {
        graph: UploadGraph::parse("http://example.com/g")?,
        append: true,
        media_type: None,
    };
    upload_path(&server.dataset_url(), file.path(), &options, None)?;
    upload_path(&server.dataset_url(), file.path(), &options, None)?;
    assert_eq!(server.graph_len(Some("http://example.com/g"))?, 2);
    Ok(())
}

#[test]
fn the_first_failure_stops_the_upload() -> Result<()> {
    let server = FakeFuseki::start()?;
    let dir = data_dir()?;
    dir.child("b.nt").write_str("this is not N-Triples")?;
    let options = UploadOptions {
        graph: UploadGraph::PerFile,
        ..UploadOptions::default()
    };
    let result = upload_path(&server.dataset_url(), dir.path(), &options, None);
    let Err(Error::Upload { path, source }) = result else {
        panic!("expected an upload error, found {result:?}");
    };
    assert_eq!(path, dir.child("b.nt").path());
    assert!(matches!(
        *source,
        Error::Transport(TransportError::Status { status: 400, .. })
    ));
    assert_eq!(server.graph_len(Some("urn:file:a.ttl"))?, 2);
    assert_eq!(server.graph_len(Some("urn:file:c.ttl"))?, 0);
    Ok(())
}

#[test]
fn rejected_sources_are_errors() -> Result<()> {
    let server = FakeFuseki::start()?;
    let result = upload_source(
        &server.dataset_url(),
        &RdfSource::Text(r#"{"@id": "http://example.com/a"}"#.to_owned()),
        &GraphTarget::Default,
        false,
        RdfMediaType::JsonLd,
        None,
    );
    assert!(matches!(
        result,
        Err(Error::Transport(TransportError::Status { status: 415, .. }))
    ));
    Ok(())
}
