use std::future::Future;
use std::time::Duration;

use recinto_protocol::GlobalState;

use crate::PollError;

/// Where snapshots come from.
pub trait StateSource: Send {
    fn fetch(&mut self) -> impl Future<Output = Result<GlobalState, PollError>> + Send;
}

/// Join a base URL and an endpoint path with exactly one slash.
pub fn state_url(base_url: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}

/// Fetches the state document over HTTP with a bounded wait.
#[derive(Debug, Clone)]
pub struct HttpStateSource {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl HttpStateSource {
    pub fn new(base_url: &str, endpoint: &str, timeout: Duration) -> Result<Self, PollError> {
        let base = base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(PollError::Url(base_url.to_string()));
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: state_url(base, endpoint),
            timeout,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl StateSource for HttpStateSource {
    async fn fetch(&mut self) -> Result<GlobalState, PollError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PollError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(|e| self.classify(e))?;
        Ok(GlobalState::from_json(&body)?)
    }
}

impl HttpStateSource {
    fn classify(&self, error: reqwest::Error) -> PollError {
        if error.is_timeout() {
            PollError::Timeout(self.timeout)
        } else {
            PollError::Http(error)
        }
    }
}
