#![cfg(test)]

use anyhow::Result;
use sparql_kit::error::TransportError;
use sparql_kit::fuseki::{admin, dataset};
use sparql_kit::fuseki::dataset::DatasetType;
use sparql_kit::Error;
use sparql_kit_testsuite::FakeFuseki;

const CONFIG: &str = r#"
PREFIX fuseki: <http://jena.apache.org/fuseki#>
PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>
PREFIX ja: <http://jena.hpl.hp.com/2005/11/Assembler#>

<#service> rdf:type fuseki:Service ;
    fuseki:name "configured" ;
    fuseki:dataset <#dataset> .

<#dataset> rdf:type ja:MemoryDataset .
"#;

fn is_status(result: &Result<String, Error>, expected: u16) -> bool {
    matches!(
        result,
        Err(Error::Transport(TransportError::Status { status, .. })) if *status == expected
    )
}

#[test]
fn server_information() -> Result<()> {
    let server = FakeFuseki::start()?;
    assert!(!admin::ping(&server.url(), None)?.is_empty());
    let description: serde_json::Value =
        serde_json::from_str(&admin::server(&server.url(), None)?)?;
    assert_eq!(description["datasets"][0]["ds.name"], "/ds");
    assert_eq!(
        admin::status(&server.url(), None)?,
        admin::server(&server.url(), None)?
    );
    assert!(admin::metrics(&server.url(), None)?.contains("fuseki_requests_good"));
    Ok(())
}

#[test]
fn stats_of_one_or_all_datasets() -> Result<()> {
    let server = FakeFuseki::start()?;
    let all: serde_json::Value = serde_json::from_str(&admin::stats(&server.url(), None, None)?)?;
    assert!(all["datasets"]["/ds"].is_object());
    let one: serde_json::Value =
        serde_json::from_str(&admin::stats(&server.url(), Some("ds"), None)?)?;
    assert!(one["datasets"]["/ds"].is_object());
    assert!(is_status(
        &admin::stats(&server.url(), Some("missing"), None),
        404
    ));
    Ok(())
}

#[test]
fn backups_and_tasks() -> Result<()> {
    let server = FakeFuseki::start()?;
    let task: serde_json::Value = serde_json::from_str(&admin::backup(&server.url(), "ds", None)?)?;
    assert_eq!(task["taskId"], "1");
    assert!(is_status(&admin::backup(&server.url(), "missing", None), 404));
    assert!(admin::backups_list(&server.url(), None)?.contains("backups"));
    assert_eq!(admin::tasks(&server.url(), None, None)?, "[]");
    assert!(is_status(&admin::tasks(&server.url(), Some("7"), None), 404));
    Ok(())
}

#[test]
fn dataset_lifecycle() -> Result<()> {
    let server = FakeFuseki::start()?;
    let names = dataset::list(&server.url(), None)?
        .into_iter()
        .map(|dataset| dataset.name)
        .collect::<Vec<_>>();
    assert_eq!(names, ["/ds"]);

    assert_eq!(
        dataset::create(&server.url(), "new", DatasetType::Mem, None)?,
        format!("Dataset new created at {}.", server.url())
    );
    assert_eq!(server.datasets(), ["/ds", "/new"]);
    assert!(is_status(
        &dataset::create(&server.url(), "new", DatasetType::Tdb2, None),
        409
    ));
    let form = server.requests().pop().map(|request| request.body);
    assert_eq!(form.as_deref(), Some("dbName=new&dbType=tdb2"));

    assert_eq!(
        dataset::delete(&server.url(), "new", None)?,
        "Dataset new deleted."
    );
    assert_eq!(server.datasets(), ["/ds"]);
    assert!(is_status(&dataset::delete(&server.url(), "new", None), 404));
    Ok(())
}

#[test]
fn datasets_from_assembler_configurations() -> Result<()> {
    let server = FakeFuseki::start()?;
    assert_eq!(
        dataset::create_from_config(&server.url(), CONFIG, None)?,
        format!(
            "Dataset configured created using assembler config at {}.",
            server.url()
        )
    );
    assert_eq!(server.datasets(), ["/configured", "/ds"]);
    let content_type = server
        .requests()
        .pop()
        .and_then(|request| request.content_type);
    assert_eq!(content_type.as_deref(), Some("text/turtle"));
    Ok(())
}
