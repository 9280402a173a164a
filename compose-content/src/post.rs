use chrono::{DateTime, Utc};
use compose_blob::BlobId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque post identifier, assigned by [`crate::PostRepository::create`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub String);

impl PostId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the id can name a file on disk.
    pub fn is_path_safe(&self) -> bool {
        !self.0.is_empty() && self.0.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    }
}

impl Default for PostId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PostId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PostId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A content record. `files` is the only place attachment membership lives.
///
/// Missing fields decode to the values of a fresh skeleton, so a client
/// may send a partial document; the API then overrides `id` and `date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: PostId,
    pub title: String,
    pub date: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    pub slug: String,
    pub draft: bool,
    pub files: Vec<BlobId>,
    pub body: String,
}

impl Default for Post {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: PostId::new(),
            title: String::new(),
            date: now,
            last_modified: now,
            slug: String::new(),
            draft: true,
            files: Vec::new(),
            body: String::new(),
        }
    }
}

impl Post {
    pub fn header(&self) -> PostHeader {
        PostHeader {
            id: self.id.clone(),
            title: self.title.clone(),
            date: self.date,
            last_modified: self.last_modified,
            slug: self.slug.clone(),
            draft: self.draft,
            files: self.files.clone(),
        }
    }
}

/// Everything but the body, for listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostHeader {
    #[serde(rename = "_id")]
    pub id: PostId,
    pub title: String,
    pub date: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    pub slug: String,
    pub draft: bool,
    pub files: Vec<BlobId>,
}

impl From<&Post> for PostHeader {
    fn from(post: &Post) -> Self {
        post.header()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skeleton_is_an_empty_draft() {
        let post = Post::default();
        assert!(post.draft);
        assert!(post.slug.is_empty());
        assert!(post.files.is_empty());
        assert_eq!(post.id.as_str().len(), 32);
        assert!(post.id.is_path_safe());
    }

    #[test]
    fn partial_document_decodes() {
        let post: Post = serde_json::from_str(r#"{"title":"Hi","slug":"hi","draft":false}"#).unwrap();
        assert_eq!(post.title, "Hi");
        assert!(!post.draft);
        assert!(post.body.is_empty());
    }

    #[test]
    fn header_omits_body() {
        let post = Post {
            body: "# long markdown".into(),
            ..Post::default()
        };
        let v = serde_json::to_value(post.header()).unwrap();
        assert!(v.get("body").is_none());
        assert_eq!(v["_id"], post.id.as_str());
    }
}
