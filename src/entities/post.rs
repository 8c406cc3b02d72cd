use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::utils::snowflake::SnowflakeGenerator;

/// JSON object as sent by clients and kept by the store
pub type Document = Map<String, Value>;

const ID_KEYS: [&str; 2] = ["_id", "id"];
const LIKE_COUNT_KEY: &str = "likeCount";

/// Snowflake identifier of a post, rendered as a decimal string on the wire
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, SerializeDisplay, DeserializeFromStr,
)]
pub struct PostId(u64);

impl PostId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Accepts only non-empty ASCII digit strings in `1..=i64::MAX`,
    /// the range a BIGINT key can address
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        match raw.parse::<i64>() {
            Ok(id) if id > 0 => u64::try_from(id).ok().map(Self),
            _ => None,
        }
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("malformed post id: {0:?}")]
pub struct MalformedPostId(String);

impl FromStr for PostId {
    type Err = MalformedPostId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| MalformedPostId(s.to_string()))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Post {
    #[serde(rename = "_id", alias = "id")]
    pub id: PostId,
    #[serde(rename = "likeCount", default)]
    pub like_count: u64,
    /// Client content (title, message, creator, tags...), never inspected
    #[serde(flatten)]
    pub fields: Document,
}

impl Post {
    /// Builds a post from a stored document, the id living outside of it
    pub fn from_document(id: PostId, mut doc: Document) -> Result<Self, serde_json::Error> {
        doc.insert(ID_KEYS[0].to_string(), Value::String(id.to_string()));
        serde_json::from_value(Value::Object(doc))
    }

    /// Document form of the post without its id
    pub fn into_document(self) -> Document {
        let mut doc = self.fields;
        for key in ID_KEYS {
            doc.remove(key);
        }
        doc.insert(LIKE_COUNT_KEY.to_string(), Value::from(self.like_count));
        doc
    }

    /// Unix time in seconds, recovered from the snowflake id
    pub fn created_at(&self) -> f64 {
        SnowflakeGenerator::parse(self.id.get()).created_at
    }
}

/// Response of a delete: echoes the id that was addressed
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DeletedPost {
    pub id: PostId,
}

/// Largest like count any store can hold
pub const MAX_LIKE_COUNT: u64 = i64::MAX as u64;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DocumentError {
    #[error("likeCount must be an integer between 0 and 9223372036854775807, got {0}")]
    LikeCount(Value),
}

/// Drops client supplied ids and checks the typed fields of a create body or patch
pub fn sanitize(mut doc: Document) -> Result<Document, DocumentError> {
    for key in ID_KEYS {
        doc.remove(key);
    }
    if let Some(count) = doc.get(LIKE_COUNT_KEY) {
        if !count.as_u64().is_some_and(|n| n <= MAX_LIKE_COUNT) {
            return Err(DocumentError::LikeCount(count.clone()));
        }
    }
    Ok(doc)
}
