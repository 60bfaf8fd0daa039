use goalboard_protocol::{routes, Goal};
use std::future::Future;
use std::pin::Pin;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("goal request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("goal service answered with status {0}")]
    Status(u16),
    #[error("goal list is not valid JSON: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("goal request stopped before it finished")]
    Interrupted,
}

pub type GoalFuture = Pin<Box<dyn Future<Output = Result<Vec<Goal>, FetchError>> + Send>>;

/// Where the goals dialog gets its data.
#[cfg_attr(test, mockall::automock)]
pub trait GoalSource {
    fn fetch_goals(&self) -> GoalFuture;
}

/// Reads the goal list from a running goalboard server.
#[derive(Debug, Clone)]
pub struct HttpGoalSource {
    client: reqwest::Client,
    url: String,
}

impl HttpGoalSource {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            url: format!("{}{}", base_url.trim_end_matches('/'), routes::GOALS),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl GoalSource for HttpGoalSource {
    fn fetch_goals(&self) -> GoalFuture {
        let request = self.client.get(&self.url);
        Box::pin(async move {
            let response = request.send().await.map_err(FetchError::Transport)?;
            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status(status.as_u16()));
            }
            let body = response.bytes().await.map_err(FetchError::Transport)?;
            serde_json::from_slice(&body).map_err(FetchError::Decode)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_base_and_route() {
        assert_eq!(
            HttpGoalSource::new("http://127.0.0.1:39333/").url(),
            "http://127.0.0.1:39333/api/goals"
        );
        assert_eq!(
            HttpGoalSource::new("http://example.test").url(),
            "http://example.test/api/goals"
        );
    }
}
