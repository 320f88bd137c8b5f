use crate::config::EnvConfig;
use crate::feed::{CursorPage, FeedSpec};
use crate::feed::mutation::LikeApi;
use crate::models::{Book, BookSearchItem, ReadingStatus};
use crate::storage::{self, TOKEN_KEY};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const SUCCESS: &str = "SUCCESS";

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub(crate) enum ApiError {
    #[error("network error: {0}")]
    Network(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("request failed ({status}): {body}")]
    Http { status: u16, body: String },

    #[error("server returned {result}{}", message_suffix(.message))]
    Rejected {
        result: String,
        message: Option<String>,
    },

    #[error("unexpected response: {0}")]
    Parse(String),
}

impl ApiError {
    fn network(e: reqwest::Error) -> Self {
        Self::Network(e.to_string())
    }

    fn parse(e: impl std::fmt::Display) -> Self {
        Self::Parse(e.to_string())
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

fn message_suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {m}"))
        .unwrap_or_default()
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

/// Uniform `{ result, data }` wrapper used by every JSON endpoint.
#[derive(Deserialize, Clone, Debug)]
pub(crate) struct Envelope {
    pub result: String,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub message: Option<String>,
}

impl Envelope {
    pub fn into_data(self) -> ApiResult<serde_json::Value> {
        if self.result == SUCCESS {
            Ok(self.data)
        } else {
            Err(ApiError::Rejected {
                result: self.result,
                message: self.message,
            })
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateReviewRequest {
    pub isbn: String,
    pub rating: u8,
    pub content: String,
    pub reading_status: ReadingStatus,
}

#[derive(Clone, Debug)]
pub(crate) struct ApiClient {
    pub(crate) base_url: String,
    pub(crate) token: Option<String>,
}

impl ApiClient {
    #[cfg(test)]
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            token: None,
        }
    }

    pub fn load_from_storage(config: &EnvConfig) -> Self {
        Self {
            base_url: config.api_url.clone(),
            token: storage::load_item(TOKEN_KEY),
        }
    }

    pub fn save_to_storage(&self) {
        if let Some(token) = &self.token {
            storage::save_item(TOKEN_KEY, token);
        }
    }

    pub fn clear_storage() {
        storage::remove_item(TOKEN_KEY);
    }

    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    pub fn logout(&mut self) {
        self.token = None;
        Self::clear_storage();
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn get_auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {t}"))
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Where the browser goes to start the OAuth login flow.
    pub fn authorization_url(&self, provider: &str) -> String {
        self.url(&format!(
            "/oauth2/authorization/{}",
            urlencoding::encode(provider)
        ))
    }

    fn with_auth_headers(&self, mut req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(header) = self.get_auth_header() {
            req = req.header("Authorization", header);
        }
        req
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> ApiResult<reqwest::Response> {
        let res = self
            .with_auth_headers(req)
            .send()
            .await
            .map_err(ApiError::network)?;

        let status = res.status();
        if status.is_success() {
            Ok(res)
        } else if status.as_u16() == 401 {
            Err(ApiError::Unauthorized)
        } else {
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::Http {
                status: status.as_u16(),
                body,
            })
        }
    }

    async fn envelope_data(&self, req: reqwest::RequestBuilder) -> ApiResult<serde_json::Value> {
        let envelope: Envelope = self
            .send(req)
            .await?
            .json()
            .await
            .map_err(ApiError::parse)?;
        envelope.into_data()
    }

    pub(crate) fn list_query(spec: &FeedSpec, cursor: Option<&str>) -> Vec<(&'static str, String)> {
        let mut query = vec![("size", spec.page_size.to_string())];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.to_string()));
        }
        query
    }

    pub async fn fetch_list_page<T: DeserializeOwned>(
        &self,
        spec: &FeedSpec,
        cursor: Option<&str>,
    ) -> ApiResult<CursorPage<T>> {
        let req = reqwest::Client::new()
            .get(self.url(&spec.path))
            .query(&Self::list_query(spec, cursor));
        let data = self.envelope_data(req).await?;
        Self::parse_cursor_page(data, spec.items_field)
    }

    /// Maps `{ <items_field>: [...], nextCursor, hasNext }` onto a page.
    ///
    /// The cursor is opaque; numeric cursors are kept as their decimal string.
    /// A missing `hasNext` means "more pages" only when a cursor came back.
    pub(crate) fn parse_cursor_page<T: DeserializeOwned>(
        data: serde_json::Value,
        items_field: &str,
    ) -> ApiResult<CursorPage<T>> {
        let items: Vec<T> = match data.get(items_field) {
            Some(list) if list.is_array() => {
                serde_json::from_value(list.clone()).map_err(ApiError::parse)?
            }
            Some(serde_json::Value::Null) | None => Vec::new(),
            Some(other) => {
                return Err(ApiError::Parse(format!(
                    "`{items_field}` is not a list: {other}"
                )))
            }
        };

        let next_cursor = match data.get("nextCursor") {
            Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        let has_next = data
            .get("hasNext")
            .and_then(|v| v.as_bool())
            .unwrap_or(next_cursor.is_some());

        Ok(CursorPage {
            items,
            next_cursor,
            has_next,
        })
    }

    pub async fn get_book(&self, isbn: &str) -> ApiResult<Book> {
        let req = reqwest::Client::new().get(self.url(&format!(
            "/api/books/{}",
            urlencoding::encode(isbn)
        )));
        let data = self.envelope_data(req).await?;
        serde_json::from_value(data).map_err(ApiError::parse)
    }

    pub async fn search_books(&self, query: &str) -> ApiResult<Vec<BookSearchItem>> {
        let req = reqwest::Client::new()
            .get(self.url("/api/books/search"))
            .query(&[("query", query)]);
        let data = self.envelope_data(req).await?;
        Self::parse_search_response(data)
    }

    pub(crate) fn parse_search_response(data: serde_json::Value) -> ApiResult<Vec<BookSearchItem>> {
        match data.get("items") {
            Some(items) if !items.is_null() => {
                serde_json::from_value(items.clone()).map_err(ApiError::parse)
            }
            _ => Ok(Vec::new()),
        }
    }

    pub async fn create_review(&self, body: &CreateReviewRequest) -> ApiResult<()> {
        let req = reqwest::Client::new()
            .post(self.url("/api/reviews"))
            .json(body);
        self.envelope_data(req).await.map(|_| ())
    }

    pub(crate) fn like_path(review_id: i64) -> String {
        format!("/api/reviews/{review_id}/likes")
    }
}

impl LikeApi for ApiClient {
    async fn set_liked(&self, review_id: i64, liked: bool) -> ApiResult<()> {
        let client = reqwest::Client::new();
        let url = self.url(&Self::like_path(review_id));
        let req = if liked {
            client.post(url)
        } else {
            client.delete(url)
        };
        // Success is signalled by status alone.
        self.send(req).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Review;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_api_client_new() {
        let client = ApiClient::new("http://localhost:8080".to_string());
        assert_eq!(client.base_url, "http://localhost:8080");
        assert!(client.token.is_none());
        assert!(!client.is_authenticated());
    }

    #[test]
    fn test_api_client_get_auth_header_without_token() {
        let client = ApiClient::new("http://localhost:8080".to_string());
        assert!(client.get_auth_header().is_none());
    }

    #[test]
    fn test_api_client_get_auth_header_with_token() {
        let mut client = ApiClient::new("http://localhost:8080".to_string());
        client.set_token("my-jwt-token".to_string());
        assert!(client.is_authenticated());
        assert_eq!(
            client.get_auth_header().as_deref(),
            Some("Bearer my-jwt-token")
        );
    }

    #[test]
    fn test_authorization_url() {
        let client = ApiClient::new("http://localhost:8080".to_string());
        assert_eq!(
            client.authorization_url("kakao"),
            "http://localhost:8080/oauth2/authorization/kakao"
        );
    }

    #[test]
    fn test_envelope_success_yields_data() {
        let env: Envelope =
            serde_json::from_value(json!({"result": "SUCCESS", "data": {"x": 1}})).expect("parse");
        assert_eq!(env.into_data().expect("success"), json!({"x": 1}));
    }

    #[test]
    fn test_envelope_failure_is_rejected() {
        let env: Envelope = serde_json::from_value(
            json!({"result": "ERROR", "data": null, "message": "no such book"}),
        )
        .expect("parse");
        let err = env.into_data().expect_err("should reject");
        assert_eq!(
            err,
            ApiError::Rejected {
                result: "ERROR".to_string(),
                message: Some("no such book".to_string()),
            }
        );
        assert_eq!(err.to_string(), "server returned ERROR: no such book");
    }

    #[test]
    fn test_list_query_includes_cursor_only_when_present() {
        let spec = FeedSpec::recent_reviews();
        assert_eq!(
            ApiClient::list_query(&spec, None),
            vec![("size", "3".to_string())]
        );
        assert_eq!(
            ApiClient::list_query(&spec, Some("x1")),
            vec![("size", "3".to_string()), ("cursor", "x1".to_string())]
        );
    }

    #[test]
    fn test_parse_cursor_page_reviews() {
        let data = json!({
            "reviews": [{"id": 1}, {"id": 2}],
            "nextCursor": "x1",
            "hasNext": true
        });
        let page: CursorPage<Review> =
            ApiClient::parse_cursor_page(data, "reviews").expect("page should parse");
        assert_eq!(page.items.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(page.next_cursor.as_deref(), Some("x1"));
        assert!(page.has_next);
    }

    #[test]
    fn test_parse_cursor_page_numeric_cursor_and_missing_has_next() {
        let data = json!({ "items": [{"id": 9}], "nextCursor": 42 });
        let page: CursorPage<Review> =
            ApiClient::parse_cursor_page(data, "items").expect("page should parse");
        assert_eq!(page.next_cursor.as_deref(), Some("42"));
        assert!(page.has_next);
    }

    #[test]
    fn test_parse_cursor_page_last_page() {
        let data = json!({ "reviews": [], "nextCursor": null, "hasNext": false });
        let page: CursorPage<Review> =
            ApiClient::parse_cursor_page(data, "reviews").expect("page should parse");
        assert!(page.items.is_empty());
        assert!(page.next_cursor.is_none());
        assert!(!page.has_next);
    }

    #[test]
    fn test_parse_cursor_page_rejects_non_list() {
        let data = json!({ "reviews": {"id": 1} });
        let err = ApiClient::parse_cursor_page::<Review>(data, "reviews").expect_err("non-list");
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[test]
    fn test_parse_search_response() {
        let data = json!({"items": [{"isbn": "1", "title": "A", "author": "X", "image": "i"}]});
        let items = ApiClient::parse_search_response(data).expect("should parse");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].image.as_deref(), Some("i"));
        assert!(ApiClient::parse_search_response(json!({})).expect("empty").is_empty());
    }

    #[test]
    fn test_create_review_request_serialization() {
        let req = CreateReviewRequest {
            isbn: "9788936434120".to_string(),
            rating: 5,
            content: "good".to_string(),
            reading_status: ReadingStatus::WantToRead,
        };
        let v = serde_json::to_value(req).expect("should serialize");
        assert_eq!(
            v,
            json!({
                "isbn": "9788936434120",
                "rating": 5,
                "content": "good",
                "readingStatus": "WANT_TO_READ"
            })
        );
    }

    #[test]
    fn test_like_path() {
        assert_eq!(ApiClient::like_path(7), "/api/reviews/7/likes");
    }
}
