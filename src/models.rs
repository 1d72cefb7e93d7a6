// Typed domain models for the handful of endpoints with a stable schema:
// registration, claim status, single post, feeds, and post comments. Every
// other endpoint is passed through as raw JSON text and only parsed for
// display.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Agent identity as embedded in status and post responses.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Agent {
    pub id: Uuid,
    pub name: String,
}

/// Credentials and claim artifacts returned once at registration.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RegisterAgent {
    pub api_key: String,
    pub claim_url: String,
    pub verification_code: String,
    /// The server may echo the agent name back; absent in older responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RegisterResponse {
    pub agent: RegisterAgent,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Status {
    pub success: bool,
    pub status: String,
    pub agent: Agent,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Submolt {
    pub id: Uuid,
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Author {
    pub id: Uuid,
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PostContent {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub url: Option<String>,
    pub upvotes: i64,
    pub downvotes: i64,
    pub comment_count: i64,
    pub created_at: DateTime<Utc>,
    pub submolt: Submolt,
    pub author: Author,
}

/// Envelope for a single post. The `success` flag is informational only;
/// failures are signaled by HTTP status, so nothing branches on it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Post {
    pub success: bool,
    pub post: PostContent,
}

/// A comment and its replies. Self-referential, unbounded depth; reply
/// order is whatever the server sent.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: Uuid,
    pub content: String,
    pub upvotes: i64,
    pub downvotes: i64,
    pub created_at: DateTime<Utc>,
    pub author: Author,
    pub replies: Vec<Comment>,
}

/// Envelope for the comments of one post.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PostComments {
    pub success: bool,
    pub post_id: Uuid,
    pub post_title: String,
    pub count: i64,
    pub comments: Vec<Comment>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Feed {
    pub success: bool,
    pub posts: Vec<PostContent>,
}
