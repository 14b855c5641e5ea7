//! Server information and maintenance endpoints.

use super::{admin_url, expect_text, get_text};
use crate::client::{HttpClient, ScopedClient};
use crate::error::Error;
use reqwest::{Method, StatusCode};

/// `GET /$/ping`.
pub fn ping(server: &str, client: Option<&HttpClient>) -> Result<String, Error> {
    let url = admin_url(server, &["ping"])?;
    let client = ScopedClient::acquire(client)?;
    get_text(&client, url)
}

/// `GET /$/server`: the server description, with its datasets and services.
pub fn server(server: &str, client: Option<&HttpClient>) -> Result<String, Error> {
    let url = admin_url(server, &["server"])?;
    let client = ScopedClient::acquire(client)?;
    get_text(&client, url)
}

/// Same as [`server`].
pub fn status(server_url: &str, client: Option<&HttpClient>) -> Result<String, Error> {
    server(server_url, client)
}

/// `GET /$/stats`, or `/$/stats/<dataset>` for a single dataset.
pub fn stats(
    server: &str,
    dataset: Option<&str>,
    client: Option<&HttpClient>,
) -> Result<String, Error> {
    let url = match dataset {
        Some(dataset) => admin_url(server, &["stats", dataset])?,
        None => admin_url(server, &["stats"])?,
    };
    let client = ScopedClient::acquire(client)?;
    get_text(&client, url)
}

/// `POST /$/backup/<dataset>`: starts a backup task.
///
/// Fuseki answers with the task description before the backup is done.
pub fn backup(server: &str, dataset: &str, client: Option<&HttpClient>) -> Result<String, Error> {
    let url = admin_url(server, &["backup", dataset])?;
    let client = ScopedClient::acquire(client)?;
    expect_text(
        client.request(Method::POST, url),
        &[StatusCode::OK, StatusCode::ACCEPTED],
    )
}

/// `GET /$/backups-list`.
pub fn backups_list(server: &str, client: Option<&HttpClient>) -> Result<String, Error> {
    let url = admin_url(server, &["backups-list"])?;
    let client = ScopedClient::acquire(client)?;
    get_text(&client, url)
}

/// `GET /$/tasks`, or `/$/tasks/<id>` for a single task.
pub fn tasks(server: &str, task: Option<&str>, client: Option<&HttpClient>) -> Result<String, Error> {
    let url = match task {
        Some(task) => admin_url(server, &["tasks", task])?,
        None => admin_url(server, &["tasks"])?,
    };
    let client = ScopedClient::acquire(client)?;
    get_text(&client, url)
}

/// `GET /$/metrics`, in the Prometheus text format.
pub fn metrics(server: &str, client: Option<&HttpClient>) -> Result<String, Error> {
    let url = admin_url(server, &["metrics"])?;
    let client = ScopedClient::acquire(client)?;
    get_text(&client, url)
}
