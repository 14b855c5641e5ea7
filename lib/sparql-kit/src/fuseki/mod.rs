//! Apache Jena Fuseki server administration.
//!
//! All functions take the base URL of the server, like `http://localhost:3030`, and expect a
//! `200 OK` answer. Any other status is a [`TransportError::Status`].

pub mod admin;
pub mod dataset;

use crate::client::{parse_endpoint, HttpClient};
use crate::dispatch::status_error;
use crate::error::{ConfigurationError, Error, TransportError};
use reqwest::blocking::{RequestBuilder, Response};
use reqwest::StatusCode;
use url::Url;

/// Builds `<server>/$/<segments>`.
fn admin_url(server: &str, segments: &[&str]) -> Result<Url, Error> {
    let mut url = parse_endpoint(server)?;
    url.path_segments_mut()
        .map_err(|()| ConfigurationError::InvalidEndpoint {
            url: server.to_owned(),
            reason: "the URL cannot be a base".to_owned(),
        })?
        .pop_if_empty()
        .push("$")
        .extend(segments);
    Ok(url)
}

fn send(request: RequestBuilder) -> Result<Response, Error> {
    Ok(request.send().map_err(TransportError::from)?)
}

/// Sends the request and returns the response text if the status is one of `expected`.
fn expect_text(request: RequestBuilder, expected: &[StatusCode]) -> Result<String, Error> {
    let response = send(request)?;
    if !expected.contains(&response.status()) {
        return Err(status_error(response).into());
    }
    Ok(response.text().map_err(TransportError::from)?)
}

fn get_text(client: &HttpClient, url: Url) -> Result<String, Error> {
    expect_text(client.request(reqwest::Method::GET, url), &[StatusCode::OK])
}
