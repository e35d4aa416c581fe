//! HTTP client abstraction for feeds.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use super::FeedError;

/// Default request timeout.
pub const DEFAULT_FEED_TIMEOUT_SECS: u64 = 30;

/// Boxed future returned by [`FeedClient::get`].
pub type FeedFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<u8>, FeedError>> + Send + 'a>>;

/// Fetches raw feed responses.
///
/// Abstracted so pollers can be tested without a network.
pub trait FeedClient: Send + Sync {
    /// Perform a GET and return the body of a successful response.
    fn get<'a>(&'a self, url: &'a str) -> FeedFuture<'a>;
}

/// [`FeedClient`] backed by `reqwest`, sending RapidAPI credentials when an
/// API key is configured.
#[derive(Debug, Clone)]
pub struct ReqwestFeedClient {
    client: reqwest::Client,
    api_key: Option<String>,
}

impl ReqwestFeedClient {
    pub fn new(api_key: Option<String>) -> Result<Self, FeedError> {
        Self::with_timeout(api_key, Duration::from_secs(DEFAULT_FEED_TIMEOUT_SECS))
    }

    pub fn with_timeout(api_key: Option<String>, timeout: Duration) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FeedError::Http(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self { client, api_key })
    }
}

impl FeedClient for ReqwestFeedClient {
    fn get<'a>(&'a self, url: &'a str) -> FeedFuture<'a> {
        Box::pin(async move {
            let mut request = self.client.get(url);
            if let Some(key) = &self.api_key {
                request = request.header("X-RapidAPI-Key", key);
                if let Some(host) = reqwest::Url::parse(url)
                    .ok()
                    .and_then(|u| u.host_str().map(str::to_string))
                {
                    request = request.header("X-RapidAPI-Host", host);
                }
            }

            let response = request
                .send()
                .await
                .map_err(|e| FeedError::Http(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(FeedError::Status {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }

            response
                .bytes()
                .await
                .map(|b| b.to_vec())
                .map_err(|e| FeedError::Http(format!("failed to read response: {}", e)))
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use parking_lot::Mutex;

    /// Replays canned responses and records requested URLs.
    pub(crate) struct MockFeedClient {
        pub responses: Mutex<Vec<Result<Vec<u8>, FeedError>>>,
        pub requested: Mutex<Vec<String>>,
    }

    impl MockFeedClient {
        pub(crate) fn new(responses: Vec<Result<Vec<u8>, FeedError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                requested: Mutex::new(Vec::new()),
            }
        }
    }

    impl FeedClient for MockFeedClient {
        fn get<'a>(&'a self, url: &'a str) -> FeedFuture<'a> {
            self.requested.lock().push(url.to_string());
            let next = {
                let mut responses = self.responses.lock();
                if responses.is_empty() {
                    Err(FeedError::Http("no more responses".to_string()))
                } else {
                    responses.remove(0)
                }
            };
            Box::pin(async move { next })
        }
    }

    #[test]
    fn test_reqwest_client_builds() {
        assert!(ReqwestFeedClient::new(Some("key".to_string())).is_ok());
    }

    #[tokio::test]
    async fn test_mock_replays_in_order() {
        let mock = MockFeedClient::new(vec![Ok(b"a".to_vec()), Ok(b"b".to_vec())]);
        assert_eq!(mock.get("u1").await.unwrap(), b"a");
        assert_eq!(mock.get("u2").await.unwrap(), b"b");
        assert!(mock.get("u3").await.is_err());
        assert_eq!(mock.requested.lock().len(), 3);
    }
}
