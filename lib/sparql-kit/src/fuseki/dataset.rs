//! Dataset management through `/$/datasets`.

use super::{admin_url, expect_text, send};
use crate::client::{HttpClient, ScopedClient};
use crate::dispatch::status_error;
use crate::error::{ConfigurationError, Error};
use crate::io::parse_graph_with_base;
use crate::media_type::RdfMediaType;
use oxrdf::vocab::rdf;
use oxrdf::{NamedNodeRef, TermRef};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt;

const FUSEKI_SERVICE: NamedNodeRef<'static> =
    NamedNodeRef::new_unchecked("http://jena.apache.org/fuseki#Service");
const FUSEKI_NAME: NamedNodeRef<'static> =
    NamedNodeRef::new_unchecked("http://jena.apache.org/fuseki#name");

/// A dataset, as listed by the server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetDescription {
    /// The dataset path, like `/ds`.
    #[serde(rename = "ds.name")]
    pub name: String,
    /// Whether the dataset is active.
    #[serde(rename = "ds.state", default)]
    pub state: bool,
    #[serde(rename = "ds.services", default)]
    pub services: Vec<ServiceDescription>,
}

/// A service of a dataset, like query or graph store access.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescription {
    #[serde(rename = "srv.type")]
    pub service_type: String,
    #[serde(rename = "srv.description", default)]
    pub description: String,
    #[serde(rename = "srv.endpoints", default)]
    pub endpoints: Vec<String>,
}

#[derive(Deserialize)]
struct DatasetList {
    datasets: Vec<DatasetDescription>,
}

/// The storage of a new dataset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DatasetType {
    #[default]
    Tdb2,
    Tdb,
    Mem,
}

impl DatasetType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tdb2 => "tdb2",
            Self::Tdb => "tdb",
            Self::Mem => "mem",
        }
    }
}

impl fmt::Display for DatasetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lists the datasets of a server.
pub fn list(server: &str, client: Option<&HttpClient>) -> Result<Vec<DatasetDescription>, Error> {
    let url = admin_url(server, &["datasets"])?;
    let client = ScopedClient::acquire(client)?;
    let text = expect_text(
        client
            .request(Method::GET, url)
            .header(ACCEPT, "application/json"),
        &[StatusCode::OK],
    )?;
    Ok(serde_json::from_str::<DatasetList>(&text)?.datasets)
}

/// Creates an empty dataset.
pub fn create(
    server: &str,
    name: &str,
    dataset_type: DatasetType,
    client: Option<&HttpClient>,
) -> Result<String, Error> {
    if name.is_empty() {
        return Err(ConfigurationError::MissingDatasetName.into());
    }
    let url = admin_url(server, &["datasets"])?;
    let client = ScopedClient::acquire(client)?;
    let response = send(
        client
            .request(Method::POST, url)
            .form(&[("dbName", name), ("dbType", dataset_type.as_str())]),
    )?;
    if !matches!(response.status(), StatusCode::OK | StatusCode::CREATED) {
        return Err(status_error(response).into());
    }
    Ok(format!("Dataset {name} created at {server}."))
}

/// Creates a dataset from an assembler configuration in Turtle.
///
/// The returned message names the dataset after the `fuseki:name` of the `fuseki:Service` of the
/// configuration.
pub fn create_from_config(
    server: &str,
    config: &str,
    client: Option<&HttpClient>,
) -> Result<String, Error> {
    let url = admin_url(server, &["datasets"])?;
    let name = service_name(config, url.as_str())?;
    let client = ScopedClient::acquire(client)?;
    let response = send(
        client
            .request(Method::POST, url)
            .header(CONTENT_TYPE, RdfMediaType::Turtle.media_type())
            .body(config.to_owned()),
    )?;
    if !matches!(response.status(), StatusCode::OK | StatusCode::CREATED) {
        return Err(status_error(response).into());
    }
    Ok(format!(
        "Dataset {name} created using assembler config at {server}."
    ))
}

/// The `fuseki:name` of the `fuseki:Service` described by an assembler configuration.
///
/// Relative IRIs of the configuration are resolved against `base_iri`.
pub fn service_name(config: &str, base_iri: &str) -> Result<String, Error> {
    let graph = parse_graph_with_base(config.as_bytes(), RdfMediaType::Turtle, base_iri)?;
    let name: Result<String, Error> = graph
        .subjects_for_predicate_object(rdf::TYPE, FUSEKI_SERVICE)
        .find_map(
            |service| match graph.object_for_subject_predicate(service, FUSEKI_NAME)? {
                TermRef::Literal(name) => Some(name.value().to_owned()),
                _ => None,
            },
        )
        .ok_or_else(|| ConfigurationError::MissingDatasetName.into());
    name
}

/// Deletes a dataset.
pub fn delete(server: &str, name: &str, client: Option<&HttpClient>) -> Result<String, Error> {
    if name.is_empty() {
        return Err(ConfigurationError::MissingDatasetName.into());
    }
    let url = admin_url(server, &["datasets", name])?;
    let client = ScopedClient::acquire(client)?;
    expect_text(client.request(Method::DELETE, url), &[StatusCode::OK])?;
    Ok(format!("Dataset {name} deleted."))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
PREFIX fuseki: <http://jena.apache.org/fuseki#>
PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>
PREFIX ja: <http://jena.hpl.hp.com/2005/11/Assembler#>

<#service> rdf:type fuseki:Service ;
    fuseki:name "myds" ;
    fuseki:dataset <#dataset> .

<#dataset> rdf:type ja:MemoryDataset .
"#;

    #[test]
    fn reads_the_service_name() {
        assert_eq!(
            service_name(CONFIG, "http://localhost:3030/$/datasets").unwrap(),
            "myds"
        );
    }

    #[test]
    fn configs_without_service_are_rejected() {
        assert!(matches!(
            service_name(
                "PREFIX ex: <http://example.com/>\nex:a ex:b ex:c .",
                "http://localhost:3030/"
            ),
            Err(Error::Configuration(ConfigurationError::MissingDatasetName))
        ));
    }

    #[test]
    fn parses_the_listing() {
        let listing = r#"{ "datasets" : [ {
            "ds.name" : "/ds",
            "ds.state" : true,
            "ds.services" : [ {
                "srv.type" : "gsp-rw",
                "srv.description" : "Graph Store Protocol",
                "srv.endpoints" : [ "data" ]
            } ]
        } ] }"#;
        let datasets = serde_json::from_str::<DatasetList>(listing).unwrap().datasets;
        assert_eq!(datasets.len(), 1);
        assert_eq!(datasets[0].name, "/ds");
        assert!(datasets[0].state);
        assert_eq!(datasets[0].services[0].endpoints, ["data"]);
        assert!(serde_json::from_str::<DatasetList>("{}").is_err());
    }

    #[test]
    fn empty_names_are_rejected() {
        assert!(matches!(
            delete("http://127.0.0.1:9", "", None),
            Err(Error::Configuration(ConfigurationError::MissingDatasetName))
        ));
    }
}
