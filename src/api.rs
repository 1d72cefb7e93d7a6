// API client module: a blocking HTTP client that talks to the Moltbook
// REST API. One method per remote operation; five responses decode into
// typed models (see `models`), everything else passes through as raw JSON
// text for display.

use std::path::Path;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::config;
use crate::error::{Error, Result};
use crate::models::{Feed, Post, PostComments, RegisterResponse, Status};
use crate::transport::{
    HttpRequest, HttpTransport, MultipartBody, RequestBody, Transport,
};

pub const BASE_URL: &str = "https://www.moltbook.com/api/v1";

const USER_AGENT: &str = concat!("moltbook-cli/", env!("CARGO_PKG_VERSION"));

/// Extract an ID from a post/comment URL, or return the input as-is.
///
/// URLs are recognized by their `http` prefix; the ID is whatever follows
/// the last `/post/` or `/comment/` segment, with any query string,
/// fragment, and trailing slashes stripped.
pub fn extract_id(input: &str) -> &str {
    if input.starts_with("http") {
        for segment in ["/post/", "/comment/"] {
            if let Some(index) = input.rfind(segment) {
                let id = &input[index + segment.len()..];
                let id = id.split(|c| c == '?' || c == '#').next().unwrap_or(id);
                return id.trim_end_matches('/');
            }
        }
    }
    input
}

/// Error body shape the server uses for failed requests.
#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    hint: Option<String>,
}

/// API client holding the transport, the base URL, and an optional API key
/// attached as a bearer token to every request.
pub struct ApiClient {
    transport: Box<dyn Transport>,
    base_url: String,
    api_key: Option<String>,
}

impl ApiClient {
    pub fn new(
        transport: Box<dyn Transport>,
        base_url: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        ApiClient {
            transport,
            base_url: base_url.into(),
            api_key,
        }
    }

    /// Production client: real transport, fixed base URL, API key resolved
    /// from the environment or the credentials file.
    pub fn from_config() -> Result<Self> {
        let transport = HttpTransport::new()?;
        Ok(ApiClient::new(Box::new(transport), BASE_URL, config::api_key()))
    }

    /// Perform a request and return the raw response body on 2xx.
    ///
    /// Non-2xx responses are mapped to errors: a JSON body with an `error`
    /// field becomes the message (plus `hint` when present); anything else
    /// becomes a generic status-code error.
    fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: RequestBody,
    ) -> Result<String> {
        let mut url = format!("{}{}", self.base_url, path);
        if !query.is_empty() {
            let pairs: Vec<String> = query
                .iter()
                .map(|(name, value)| format!("{name}={}", urlencoding::encode(value)))
                .collect();
            url.push('?');
            url.push_str(&pairs.join("&"));
        }

        let mut headers = vec![("User-Agent".to_string(), USER_AGENT.to_string())];
        if let Some(key) = &self.api_key {
            headers.push(("Authorization".to_string(), format!("Bearer {key}")));
        }
        if matches!(body, RequestBody::Json(_)) {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }

        debug!("{} {}", method, url);
        if let RequestBody::Json(payload) = &body {
            debug!("payload: {}", payload);
        }
        debug!("headers: {:?}", masked(&headers));

        let request = HttpRequest {
            method,
            url,
            headers,
            body,
        };
        let response = self.transport.execute(&request)?;
        debug!("response status: {}", response.status);

        if (200..300).contains(&response.status) {
            return Ok(response.body);
        }
        match serde_json::from_str::<ErrorBody>(&response.body) {
            Ok(error_body) => {
                let mut message = error_body.error;
                if let Some(hint) = error_body.hint {
                    message.push_str(&format!("\nHint: {hint}"));
                }
                Err(Error::Api(message))
            }
            Err(_) => Err(Error::Status(response.status)),
        }
    }

    /// Typed variant of [`request`]: decode the 2xx body against a model.
    fn request_typed<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: RequestBody,
    ) -> Result<T> {
        let text = self.request(method, path, query, body)?;
        serde_json::from_str(&text).map_err(|e| Error::Decode(e.to_string()))
    }

    // Registration

    pub fn register(&self, name: &str, description: &str) -> Result<RegisterResponse> {
        self.request_typed(
            Method::POST,
            "/agents/register",
            &[],
            RequestBody::Json(json!({"name": name, "description": description})),
        )
    }

    pub fn check_status(&self) -> Result<Status> {
        self.request_typed(Method::GET, "/agents/status", &[], RequestBody::Empty)
    }

    // Posts

    pub fn create_post(
        &self,
        submolt: &str,
        title: &str,
        content: Option<&str>,
        url: Option<&str>,
    ) -> Result<String> {
        let mut data = json!({"submolt": submolt, "title": title});
        if let Some(content) = content {
            data["content"] = json!(content);
        }
        if let Some(url) = url {
            data["url"] = json!(url);
        }
        self.request(Method::POST, "/posts", &[], RequestBody::Json(data))
    }

    pub fn get_feed(&self, sort: &str, limit: i64, submolt: Option<&str>) -> Result<Feed> {
        let mut query = vec![("sort", sort.to_string()), ("limit", limit.to_string())];
        if let Some(submolt) = submolt {
            query.push(("submolt", submolt.to_string()));
        }
        self.request_typed(Method::GET, "/posts", &query, RequestBody::Empty)
    }

    pub fn get_post(&self, post_id: &str) -> Result<Post> {
        let post_id = extract_id(post_id);
        self.request_typed(
            Method::GET,
            &format!("/posts/{post_id}"),
            &[],
            RequestBody::Empty,
        )
    }

    pub fn delete_post(&self, post_id: &str) -> Result<String> {
        let post_id = extract_id(post_id);
        self.request(
            Method::DELETE,
            &format!("/posts/{post_id}"),
            &[],
            RequestBody::Empty,
        )
    }

    // Comments

    pub fn add_comment(
        &self,
        post_id: &str,
        content: &str,
        parent_id: Option<&str>,
    ) -> Result<String> {
        let post_id = extract_id(post_id);
        let mut data = json!({"content": content});
        if let Some(parent_id) = parent_id {
            data["parent_id"] = json!(extract_id(parent_id));
        }
        self.request(
            Method::POST,
            &format!("/posts/{post_id}/comments"),
            &[],
            RequestBody::Json(data),
        )
    }

    pub fn get_comments(&self, post_id: &str, sort: &str) -> Result<PostComments> {
        let post_id = extract_id(post_id);
        self.request_typed(
            Method::GET,
            &format!("/posts/{post_id}/comments"),
            &[("sort", sort.to_string())],
            RequestBody::Empty,
        )
    }

    // Voting

    pub fn upvote_post(&self, post_id: &str) -> Result<String> {
        let post_id = extract_id(post_id);
        self.request(
            Method::POST,
            &format!("/posts/{post_id}/upvote"),
            &[],
            RequestBody::Empty,
        )
    }

    pub fn downvote_post(&self, post_id: &str) -> Result<String> {
        let post_id = extract_id(post_id);
        self.request(
            Method::POST,
            &format!("/posts/{post_id}/downvote"),
            &[],
            RequestBody::Empty,
        )
    }

    pub fn upvote_comment(&self, comment_id: &str) -> Result<String> {
        let comment_id = extract_id(comment_id);
        self.request(
            Method::POST,
            &format!("/comments/{comment_id}/upvote"),
            &[],
            RequestBody::Empty,
        )
    }

    // Submolts

    pub fn create_submolt(
        &self,
        name: &str,
        display_name: &str,
        description: &str,
    ) -> Result<String> {
        self.request(
            Method::POST,
            "/submolts",
            &[],
            RequestBody::Json(json!({
                "name": name,
                "display_name": display_name,
                "description": description,
            })),
        )
    }

    pub fn list_submolts(&self) -> Result<String> {
        self.request(Method::GET, "/submolts", &[], RequestBody::Empty)
    }

    pub fn get_submolt(&self, name: &str) -> Result<String> {
        self.request(
            Method::GET,
            &format!("/submolts/{name}"),
            &[],
            RequestBody::Empty,
        )
    }

    pub fn subscribe_submolt(&self, name: &str) -> Result<String> {
        self.request(
            Method::POST,
            &format!("/submolts/{name}/subscribe"),
            &[],
            RequestBody::Empty,
        )
    }

    pub fn unsubscribe_submolt(&self, name: &str) -> Result<String> {
        self.request(
            Method::DELETE,
            &format!("/submolts/{name}/subscribe"),
            &[],
            RequestBody::Empty,
        )
    }

    // Following

    pub fn follow_molty(&self, agent_name: &str) -> Result<String> {
        self.request(
            Method::POST,
            &format!("/agents/{agent_name}/follow"),
            &[],
            RequestBody::Empty,
        )
    }

    pub fn unfollow_molty(&self, agent_name: &str) -> Result<String> {
        self.request(
            Method::DELETE,
            &format!("/agents/{agent_name}/follow"),
            &[],
            RequestBody::Empty,
        )
    }

    // Feed

    pub fn get_personalized_feed(&self, sort: &str, limit: i64) -> Result<Feed> {
        self.request_typed(
            Method::GET,
            "/feed",
            &[("sort", sort.to_string()), ("limit", limit.to_string())],
            RequestBody::Empty,
        )
    }

    // Search

    pub fn search(&self, query: &str, search_type: &str, limit: i64) -> Result<String> {
        self.request(
            Method::GET,
            "/search",
            &[
                ("q", query.to_string()),
                ("type", search_type.to_string()),
                ("limit", limit.to_string()),
            ],
            RequestBody::Empty,
        )
    }

    // Profile

    pub fn get_profile(&self) -> Result<String> {
        self.request(Method::GET, "/agents/me", &[], RequestBody::Empty)
    }

    pub fn get_agent_profile(&self, agent_name: &str) -> Result<String> {
        self.request(
            Method::GET,
            "/agents/profile",
            &[("name", agent_name.to_string())],
            RequestBody::Empty,
        )
    }

    pub fn update_profile(
        &self,
        description: Option<&str>,
        metadata: Option<Value>,
    ) -> Result<String> {
        let mut data = json!({});
        if let Some(description) = description {
            data["description"] = json!(description);
        }
        if let Some(metadata) = metadata {
            data["metadata"] = metadata;
        }
        self.request(Method::PATCH, "/agents/me", &[], RequestBody::Json(data))
    }

    pub fn upload_avatar(&self, file_path: &Path) -> Result<String> {
        self.request(
            Method::POST,
            "/agents/me/avatar",
            &[],
            RequestBody::Multipart(MultipartBody {
                fields: Vec::new(),
                file_field: "file".to_string(),
                file_path: file_path.to_path_buf(),
            }),
        )
    }

    pub fn remove_avatar(&self) -> Result<String> {
        self.request(Method::DELETE, "/agents/me/avatar", &[], RequestBody::Empty)
    }

    // Moderation

    pub fn pin_post(&self, post_id: &str) -> Result<String> {
        let post_id = extract_id(post_id);
        self.request(
            Method::POST,
            &format!("/posts/{post_id}/pin"),
            &[],
            RequestBody::Empty,
        )
    }

    pub fn unpin_post(&self, post_id: &str) -> Result<String> {
        let post_id = extract_id(post_id);
        self.request(
            Method::DELETE,
            &format!("/posts/{post_id}/pin"),
            &[],
            RequestBody::Empty,
        )
    }

    pub fn update_submolt_settings(
        &self,
        submolt_name: &str,
        description: Option<&str>,
        banner_color: Option<&str>,
        theme_color: Option<&str>,
    ) -> Result<String> {
        let mut data = json!({});
        if let Some(description) = description {
            data["description"] = json!(description);
        }
        if let Some(banner_color) = banner_color {
            data["banner_color"] = json!(banner_color);
        }
        if let Some(theme_color) = theme_color {
            data["theme_color"] = json!(theme_color);
        }
        self.request(
            Method::PATCH,
            &format!("/submolts/{submolt_name}/settings"),
            &[],
            RequestBody::Json(data),
        )
    }

    pub fn upload_submolt_avatar(&self, submolt_name: &str, file_path: &Path) -> Result<String> {
        self.upload_submolt_image(submolt_name, file_path, "avatar")
    }

    pub fn upload_submolt_banner(&self, submolt_name: &str, file_path: &Path) -> Result<String> {
        self.upload_submolt_image(submolt_name, file_path, "banner")
    }

    fn upload_submolt_image(
        &self,
        submolt_name: &str,
        file_path: &Path,
        kind: &str,
    ) -> Result<String> {
        self.request(
            Method::POST,
            &format!("/submolts/{submolt_name}/settings"),
            &[],
            RequestBody::Multipart(MultipartBody {
                fields: vec![("type".to_string(), kind.to_string())],
                file_field: "file".to_string(),
                file_path: file_path.to_path_buf(),
            }),
        )
    }

    pub fn add_moderator(&self, submolt_name: &str, agent_name: &str) -> Result<String> {
        self.request(
            Method::POST,
            &format!("/submolts/{submolt_name}/moderators"),
            &[],
            RequestBody::Json(json!({"agent_name": agent_name, "role": "moderator"})),
        )
    }

    pub fn remove_moderator(&self, submolt_name: &str, agent_name: &str) -> Result<String> {
        self.request(
            Method::DELETE,
            &format!("/submolts/{submolt_name}/moderators"),
            &[],
            RequestBody::Json(json!({"agent_name": agent_name})),
        )
    }

    pub fn list_moderators(&self, submolt_name: &str) -> Result<String> {
        self.request(
            Method::GET,
            &format!("/submolts/{submolt_name}/moderators"),
            &[],
            RequestBody::Empty,
        )
    }

    // Direct messages

    pub fn check_dms(&self) -> Result<String> {
        self.request(Method::GET, "/agents/dm/check", &[], RequestBody::Empty)
    }

    pub fn list_dm_requests(&self) -> Result<String> {
        self.request(Method::GET, "/agents/dm/requests", &[], RequestBody::Empty)
    }

    pub fn approve_dm_request(&self, conversation_id: &str) -> Result<String> {
        let conversation_id = extract_id(conversation_id);
        self.request(
            Method::POST,
            &format!("/agents/dm/requests/{conversation_id}/approve"),
            &[],
            RequestBody::Empty,
        )
    }

    pub fn list_conversations(&self) -> Result<String> {
        self.request(
            Method::GET,
            "/agents/dm/conversations",
            &[],
            RequestBody::Empty,
        )
    }

    pub fn get_conversation(&self, conversation_id: &str) -> Result<String> {
        let conversation_id = extract_id(conversation_id);
        self.request(
            Method::GET,
            &format!("/agents/dm/conversations/{conversation_id}"),
            &[],
            RequestBody::Empty,
        )
    }

    pub fn send_dm(&self, conversation_id: &str, message: &str) -> Result<String> {
        let conversation_id = extract_id(conversation_id);
        self.request(
            Method::POST,
            &format!("/agents/dm/conversations/{conversation_id}/send"),
            &[],
            RequestBody::Json(json!({"message": message})),
        )
    }

    pub fn request_dm(&self, to_agent: &str, message: &str) -> Result<String> {
        self.request(
            Method::POST,
            "/agents/dm/request",
            &[],
            RequestBody::Json(json!({"to": to_agent, "message": message})),
        )
    }
}

/// Copy of the header list with the Authorization value replaced by `****`
/// so verbose output never leaks the API key.
fn masked(headers: &[(String, String)]) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            if name.eq_ignore_ascii_case("authorization") {
                (name.clone(), "****".to_string())
            } else {
                (name.clone(), value.clone())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockTransport;

    fn client_with(mock: &MockTransport, api_key: Option<&str>) -> ApiClient {
        ApiClient::new(
            Box::new(mock.clone()),
            "https://api.test/v1",
            api_key.map(str::to_string),
        )
    }

    #[test]
    fn extract_id_handles_post_urls() {
        assert_eq!(
            extract_id("https://www.moltbook.com/post/abc-123"),
            "abc-123"
        );
        assert_eq!(
            extract_id("https://www.moltbook.com/post/abc-123?sort=top"),
            "abc-123"
        );
        assert_eq!(
            extract_id("https://www.moltbook.com/post/abc-123#comments"),
            "abc-123"
        );
        assert_eq!(extract_id("https://www.moltbook.com/post/abc-123/"), "abc-123");
    }

    #[test]
    fn extract_id_handles_comment_urls() {
        assert_eq!(
            extract_id("https://www.moltbook.com/comment/xyz?x=1#f"),
            "xyz"
        );
    }

    #[test]
    fn extract_id_is_identity_for_bare_ids() {
        assert_eq!(extract_id("abc-123"), "abc-123");
        // No recognized segment in the URL: left untouched.
        assert_eq!(
            extract_id("https://www.moltbook.com/other/abc"),
            "https://www.moltbook.com/other/abc"
        );
    }

    #[test]
    fn bearer_token_is_attached_when_a_key_is_configured() {
        let mock = MockTransport::new();
        mock.push_response(200, "{}");
        let client = client_with(&mock, Some("mk-secret"));
        client.get_profile().unwrap();

        let request = mock.last_request();
        let auth = request
            .headers
            .iter()
            .find(|(name, _)| name == "Authorization")
            .map(|(_, value)| value.as_str());
        assert_eq!(auth, Some("Bearer mk-secret"));
    }

    #[test]
    fn no_auth_header_without_a_key() {
        let mock = MockTransport::new();
        mock.push_response(200, "{}");
        let client = client_with(&mock, None);
        client.list_submolts().unwrap();

        assert!(!mock
            .last_request()
            .headers
            .iter()
            .any(|(name, _)| name == "Authorization"));
    }

    #[test]
    fn masked_headers_never_contain_the_key() {
        let headers = vec![
            ("User-Agent".to_string(), USER_AGENT.to_string()),
            ("Authorization".to_string(), "Bearer mk-secret".to_string()),
        ];
        let masked = masked(&headers);
        assert!(masked.iter().any(|(_, value)| value == "****"));
        assert!(!masked.iter().any(|(_, value)| value.contains("mk-secret")));
    }

    #[test]
    fn structured_error_body_surfaces_message_and_hint() {
        let mock = MockTransport::new();
        mock.push_response(403, r#"{"error": "not claimed", "hint": "visit the claim URL"}"#);
        let client = client_with(&mock, None);

        let err = client.check_status().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("not claimed"));
        assert!(message.contains("visit the claim URL"));
    }

    #[test]
    fn non_json_error_body_yields_only_the_status_code() {
        let mock = MockTransport::new();
        mock.push_response(502, "<html>bad gateway</html>");
        let client = client_with(&mock, None);

        let err = client.get_profile().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("502"));
        assert!(!message.contains("bad gateway"));
    }

    #[test]
    fn optional_post_fields_are_omitted_not_nulled() {
        let mock = MockTransport::new();
        mock.push_response(200, "{}");
        let client = client_with(&mock, None);
        client.create_post("general", "hello", None, None).unwrap();

        let request = mock.last_request();
        let RequestBody::Json(payload) = &request.body else {
            panic!("expected a JSON body");
        };
        let object = payload.as_object().unwrap();
        assert!(!object.contains_key("content"));
        assert!(!object.contains_key("url"));
        assert_eq!(object["submolt"], "general");
        assert_eq!(object["title"], "hello");
    }

    #[test]
    fn comment_parent_id_is_extracted_from_urls() {
        let mock = MockTransport::new();
        mock.push_response(200, "{}");
        let client = client_with(&mock, None);
        client
            .add_comment(
                "https://www.moltbook.com/post/p-1",
                "nice",
                Some("https://www.moltbook.com/comment/c-9?sort=top"),
            )
            .unwrap();

        let request = mock.last_request();
        assert!(request.url.ends_with("/posts/p-1/comments"));
        let RequestBody::Json(payload) = &request.body else {
            panic!("expected a JSON body");
        };
        assert_eq!(payload["parent_id"], "c-9");
    }

    #[test]
    fn search_query_values_are_percent_encoded() {
        let mock = MockTransport::new();
        mock.push_response(200, "{}");
        let client = client_with(&mock, None);
        client.search("crab facts & more", "all", 20).unwrap();

        let request = mock.last_request();
        assert!(request.url.contains("q=crab%20facts%20%26%20more"));
        assert!(request.url.contains("type=all"));
        assert!(request.url.contains("limit=20"));
    }

    #[test]
    fn typed_feed_decoding_preserves_order() {
        let mock = MockTransport::new();
        mock.push_response(
            200,
            r#"{"success": true, "posts": [
                {"id": "5f8b4a46-9f44-4bc6-9f9d-3a2d2a1c0001", "title": "one", "content": "a",
                 "url": null, "upvotes": 0, "downvotes": 0, "comment_count": 0,
                 "created_at": "2025-06-01T12:00:00Z",
                 "submolt": {"id": "5f8b4a46-9f44-4bc6-9f9d-3a2d2a1c0002", "name": "general"},
                 "author": {"id": "5f8b4a46-9f44-4bc6-9f9d-3a2d2a1c0003", "name": "a"}},
                {"id": "5f8b4a46-9f44-4bc6-9f9d-3a2d2a1c0004", "title": "two", "content": "b",
                 "url": "https://example.com", "upvotes": 1, "downvotes": 0, "comment_count": 0,
                 "created_at": "2025-06-01T13:00:00Z",
                 "submolt": {"id": "5f8b4a46-9f44-4bc6-9f9d-3a2d2a1c0002", "name": "general"},
                 "author": {"id": "5f8b4a46-9f44-4bc6-9f9d-3a2d2a1c0003", "name": "a"}}
            ]}"#,
        );
        let client = client_with(&mock, None);
        let feed = client.get_feed("hot", 25, None).unwrap();
        assert_eq!(feed.posts.len(), 2);
        assert_eq!(feed.posts[0].title, "one");
        assert_eq!(feed.posts[1].title, "two");

        let request = mock.last_request();
        assert!(request.url.contains("sort=hot"));
        assert!(request.url.contains("limit=25"));
    }

    #[test]
    fn malformed_typed_body_is_a_decode_error() {
        let mock = MockTransport::new();
        mock.push_response(200, r#"{"success": true, "posts": "not a list"}"#);
        let client = client_with(&mock, None);
        match client.get_feed("hot", 25, None) {
            Err(Error::Decode(_)) => {}
            other => panic!("expected a decode error, got {other:?}"),
        }
    }

    #[test]
    fn unvalidated_parameters_pass_through_to_the_server() {
        let mock = MockTransport::new();
        mock.push_response(200, r#"{"success": true, "posts": []}"#);
        let client = client_with(&mock, None);
        client.get_feed("bogus-sort", -5, None).unwrap();

        let request = mock.last_request();
        assert!(request.url.contains("sort=bogus-sort"));
        assert!(request.url.contains("limit=-5"));
    }

    #[test]
    fn submolt_banner_upload_carries_the_type_field() {
        let mock = MockTransport::new();
        mock.push_response(200, "{}");
        let client = client_with(&mock, None);
        client
            .upload_submolt_banner("rustaceans", Path::new("banner.png"))
            .unwrap();

        let request = mock.last_request();
        assert!(request.url.ends_with("/submolts/rustaceans/settings"));
        let RequestBody::Multipart(body) = &request.body else {
            panic!("expected a multipart body");
        };
        assert_eq!(body.fields, vec![("type".to_string(), "banner".to_string())]);
        assert_eq!(body.file_field, "file");
    }
}
