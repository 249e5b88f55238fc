//! Blocking HTTP transport.
//!
//! Providers talk to the network through [`HttpFetch`] so the date walk-back
//! can be exercised against scripted responses.

use std::time::Duration;

use super::provider::DataError;

/// Status and body of a completed request. Non-success statuses are returned,
/// not raised, so callers can treat 404 as "not yet published".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

pub trait HttpFetch {
    fn get(&self, url: &str) -> Result<HttpResponse, DataError>;
}

/// `reqwest` blocking client.
pub struct BlockingHttp {
    client: reqwest::blocking::Client,
}

impl BlockingHttp {
    pub fn new(user_agent: &str) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent)
            .build()
            .map_err(|e| DataError::NetworkUnreachable(format!("build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl HttpFetch for BlockingHttp {
    fn get(&self, url: &str) -> Result<HttpResponse, DataError> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| DataError::NetworkUnreachable(format!("{url}: {e}")))?;
        let status = resp.status().as_u16();
        let body = resp
            .bytes()
            .map_err(|e| DataError::NetworkUnreachable(format!("{url}: {e}")))?
            .to_vec();
        Ok(HttpResponse { status, body })
    }
}
