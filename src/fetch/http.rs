// src/fetch/http.rs
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::{FetchError, Page, PageSource};

/// Blocking HTTP source. One request per call, strictly sequential.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    /// `timeout: None` disables the client's default request timeout entirely.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("building HTTP client")?;
        Ok(Self { client })
    }
}

impl PageSource for HttpSource {
    fn fetch(&self, url: &Url) -> Result<Page, FetchError> {
        debug!(%url, "GET");
        let resp = self.client.get(url.clone()).send().map_err(classify)?;
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .map_err(|e| FetchError::Body(e.to_string()))?;
        debug!(%url, status, bytes = body.len(), "response");
        Ok(Page { status, body })
    }
}

fn classify(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout(e.to_string())
    } else if e.is_connect() {
        FetchError::Connect(e.to_string())
    } else if e.is_body() || e.is_decode() {
        FetchError::Body(e.to_string())
    } else {
        FetchError::Request(e.to_string())
    }
}
