use reqwest::Method;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tokio::sync::watch;
use tracing::debug;

use cadence_session::SessionSnapshot;

use crate::error::ApiError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8081";

/// Thin wrapper over `reqwest` that knows the gateway's conventions.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: watch::Receiver<SessionSnapshot>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, session: watch::Receiver<SessionSnapshot>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Token as of right now. Never waits on a session change.
    pub fn bearer_token(&self) -> Option<String> {
        self.session.borrow().bearer_token().map(str::to_owned)
    }

    pub(crate) fn current_user_id(&self) -> Result<String, ApiError> {
        self.session
            .borrow()
            .current_user()
            .map(|u| u.id.clone())
            .ok_or(ApiError::NotAuthenticated)
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and return the JSON body (`{}` when the body is empty
    /// or not JSON). Non-2xx becomes [`ApiError::Status`].
    pub(crate) async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let mut req = self
            .http
            .request(method.clone(), self.url(path))
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = self.bearer_token() {
            req = req.bearer_auth(token);
        }
        if let Some(body) = &body {
            req = req.json(body);
        }

        debug!(%method, path, "API request");
        let resp = req.send().await?;
        let status = resp.status();
        let is_json = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json"));
        let text = resp.text().await?;

        let (data, raw_text) = if is_json {
            let data = if text.trim().is_empty() {
                Value::Object(Map::new())
            } else {
                serde_json::from_str(&text)?
            };
            (data, None)
        } else {
            (Value::Object(Map::new()), Some(text))
        };

        if !status.is_success() {
            let message = error_message(status.as_u16(), &data, raw_text.as_deref());
            debug!(%method, path, status = status.as_u16(), "API request failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(data)
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        parse(self.send(Method::GET, path, None).await?)
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body)?;
        parse(self.send(Method::POST, path, Some(body)).await?)
    }

    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body)?;
        parse(self.send(Method::PUT, path, Some(body)).await?)
    }

    /// For endpoints whose success body carries nothing the caller needs.
    pub(crate) async fn call(&self, method: Method, path: &str) -> Result<(), ApiError> {
        self.send(method, path, None).await.map(|_| ())
    }
}

pub(crate) fn parse<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    Ok(serde_json::from_value(value)?)
}

/// Lists the UI treats as empty when the body is not an array.
pub(crate) fn parse_list<T: DeserializeOwned>(value: Value) -> Result<Vec<T>, ApiError> {
    match value {
        Value::Array(_) => parse(value),
        _ => Ok(Vec::new()),
    }
}

/// Percent-encode one query value or path segment.
pub(crate) fn enc(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

/// `error` field, then `message` field, then the raw text body, then a
/// generic status line.
fn error_message(status: u16, data: &Value, raw_text: Option<&str>) -> String {
    let field = |name: &str| {
        data.get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
    };

    field("error")
        .or_else(|| field("message"))
        .or_else(|| {
            raw_text
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
        })
        .unwrap_or_else(|| format!("HTTP error! status: {status}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_field_wins() {
        let data = json!({"error": "invalid otp", "message": "ignored"});
        assert_eq!(error_message(401, &data, None), "invalid otp");
    }

    #[test]
    fn falls_back_to_message_then_text_then_status() {
        assert_eq!(error_message(400, &json!({"message": "bad input"}), None), "bad input");
        assert_eq!(
            error_message(404, &json!({}), Some("Song not found\n")),
            "Song not found"
        );
        assert_eq!(error_message(500, &json!({}), Some("  ")), "HTTP error! status: 500");
        assert_eq!(error_message(502, &json!({"error": ""}), None), "HTTP error! status: 502");
    }

    #[test]
    fn non_array_list_is_empty() {
        let subs: Vec<Value> = parse_list(json!({"error": "nope"})).unwrap();
        assert!(subs.is_empty());
        let subs: Vec<u32> = parse_list(json!([1, 2])).unwrap();
        assert_eq!(subs, vec![1, 2]);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let (_tx, rx) = watch::channel(SessionSnapshot::default());
        let client = ApiClient::new("http://gateway:8081/", rx);
        assert_eq!(client.url("/api/content/songs"), "http://gateway:8081/api/content/songs");
        assert!(client.bearer_token().is_none());
        assert!(matches!(client.current_user_id(), Err(ApiError::NotAuthenticated)));
    }
}
