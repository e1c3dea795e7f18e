use std::future::Future;
use anyhow::{Context, Result};
use log::debug;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;
use crate::config::Config;
use crate::error::TransportError;

// Read access to the grades API, scoped to the signed-in user.
pub trait GradesApi {
    fn fetch_json(&self, path: &str) -> impl Future<Output = Result<Value, TransportError>> + Send;

    fn current_user_id(&self) -> &str;
}

// Fetches `path` and decodes the body into `T`.
pub async fn fetch_as<A, T>(api: &A, path: &str) -> Result<T, TransportError>
where
    A: GradesApi,
    T: DeserializeOwned,
{
    let value = api.fetch_json(path).await?;
    serde_json::from_value(value).map_err(|e| TransportError::Decode {
        path: path.to_string(),
        reason: e.to_string(),
    })
}

pub struct SchoologyClient {
    client: Client,
    base: Url,
    user_id: String,
}

impl SchoologyClient {
    pub fn new(config: &Config) -> Result<SchoologyClient> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(config.timeout)
            .build()
            .context("Failed to build the client")?;

        Ok(SchoologyClient {
            client,
            base: config.api_base.clone(),
            user_id: config.user_id.clone(),
        })
    }

    fn url_for(&self, path: &str) -> Result<Url, TransportError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|source| TransportError::Path { path: path.to_string(), source })
    }
}

fn request_error(path: &str, source: reqwest::Error) -> TransportError {
    if source.is_timeout() {
        TransportError::Timeout { path: path.to_string() }
    } else {
        TransportError::Request { path: path.to_string(), source }
    }
}

impl GradesApi for SchoologyClient {
    async fn fetch_json(&self, path: &str) -> Result<Value, TransportError> {
        let url = self.url_for(path)?;
        debug!("GET {}", url);

        let response = self.client.get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| request_error(path, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status { path: path.to_string(), status });
        }

        let body = response.text().await.map_err(|e| request_error(path, e))?;
        serde_json::from_str(&body).map_err(|e| TransportError::Decode {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }

    fn current_user_id(&self) -> &str {
        &self.user_id
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use crate::models::SectionList;
    use super::fake::FakeApi;

    fn config(base: &str) -> Config {
        Config {
            api_base: Url::parse(base).unwrap(),
            user_id: "42".to_string(),
            timeout: Duration::from_secs(1),
            assignment: "1".to_string(),
            telegram: None,
        }
    }

    // Answers a single connection with `response` after `delay`, returns the API base to use.
    async fn serve_once(response: &'static str, delay: Duration) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 4096];
            let _ = socket.read(&mut request).await;
            tokio::time::sleep(delay).await;
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        });
        format!("http://{}/v1/", addr)
    }

    fn client_for(base: &str) -> SchoologyClient {
        SchoologyClient::new(&config(base)).unwrap()
    }

    #[test]
    fn test_paths_join_under_base() {
        let client = SchoologyClient::new(&config("https://api.schoology.com/v1/")).unwrap();
        assert_eq!(
            client.url_for("sections/9/assignments/?start=0&limit=999").unwrap().as_str(),
            "https://api.schoology.com/v1/sections/9/assignments/?start=0&limit=999"
        );
        assert_eq!(
            client.url_for("/users/42/grades/?section_id=9").unwrap().as_str(),
            "https://api.schoology.com/v1/users/42/grades/?section_id=9"
        );
        assert_eq!(client.current_user_id(), "42");
    }

    #[tokio::test]
    async fn test_fetch_as_decodes_body() {
        let api = FakeApi::new("42").with("users/42/sections", json!({
            "section": [{ "id": 10, "course_id": "500" }]
        }));
        let list: SectionList = fetch_as(&api, "users/42/sections").await.unwrap();
        assert_eq!(list.section.len(), 1);
        assert_eq!(list.section[0].id, "10");
        assert_eq!(list.section[0].course_id.as_deref(), Some("500"));
    }

    #[tokio::test]
    async fn test_fetch_as_reports_shape_mismatch() {
        let api = FakeApi::new("42").with("users/42/sections", json!({ "section": "nope" }));
        let result: Result<SectionList, _> = fetch_as(&api, "users/42/sections").await;
        assert!(matches!(result, Err(TransportError::Decode { .. })));
    }

    #[tokio::test]
    async fn test_client_decodes_success() {
        let base = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 14\r\nConnection: close\r\n\r\n{\"section\":[]}",
            Duration::ZERO,
        )
        .await;
        let value = client_for(&base).fetch_json("users/42/sections").await.unwrap();
        assert_eq!(value, json!({ "section": [] }));
    }

    #[tokio::test]
    async fn test_client_maps_error_status() {
        let base = serve_once(
            "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            Duration::ZERO,
        )
        .await;
        let err = client_for(&base).fetch_json("users/42/sections").await.unwrap_err();
        assert!(
            matches!(&err, TransportError::Status { path, status } if path == "users/42/sections" && *status == reqwest::StatusCode::INTERNAL_SERVER_ERROR),
            "unexpected {:?}",
            err
        );
    }

    #[tokio::test]
    async fn test_client_maps_malformed_body() {
        let base = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 5\r\nConnection: close\r\n\r\n{bad}",
            Duration::ZERO,
        )
        .await;
        let err = client_for(&base).fetch_json("users/42/sections").await.unwrap_err();
        assert!(matches!(err, TransportError::Decode { .. }), "unexpected {:?}", err);
    }

    #[tokio::test]
    async fn test_client_maps_timeout() {
        let base = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\n{}",
            Duration::from_secs(3),
        )
        .await;
        let err = client_for(&base).fetch_json("x").await.unwrap_err();
        assert!(matches!(&err, TransportError::Timeout { path } if path == "x"), "unexpected {:?}", err);
    }

    #[tokio::test]
    async fn test_client_maps_refused_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client_for(&format!("http://{}/v1/", addr))
            .fetch_json("users/42/sections")
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Request { .. }), "unexpected {:?}", err);
    }

    #[tokio::test]
    async fn test_unknown_path_is_status_error() {
        let api = FakeApi::new("42");
        let result = api.fetch_json("users/42/sections").await;
        assert!(matches!(result, Err(TransportError::Status { status, .. }) if status == reqwest::StatusCode::NOT_FOUND));
    }
}
