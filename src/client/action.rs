use serde::{Deserialize, Deserializer, Serialize, de::Error};
use serde_json::Value;

use crate::entities::post::{Post, PostId};

/// One state transition of the client's post list.
/// Wire shape is `{ "type": "FETCH_ALL", "payload": [...] }`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostAction {
    FetchAll(Vec<Post>),
    Create(Post),
    Update(Post),
    Delete(PostId),
    /// Any tag this client does not handle, whatever its payload
    Unknown,
}

#[derive(Deserialize)]
struct RawAction {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Value,
}

fn payload<T, E>(payload: Value) -> Result<T, E>
where
    T: serde::de::DeserializeOwned,
    E: Error,
{
    serde_json::from_value(payload).map_err(E::custom)
}

// Payload is only decoded once the tag is known to be ours
impl<'de> Deserialize<'de> for PostAction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawAction::deserialize(deserializer)?;
        match raw.kind.as_str() {
            "FETCH_ALL" => payload(raw.payload).map(PostAction::FetchAll),
            "CREATE" => payload(raw.payload).map(PostAction::Create),
            "UPDATE" => payload(raw.payload).map(PostAction::Update),
            "DELETE" => payload(raw.payload).map(PostAction::Delete),
            _ => Ok(PostAction::Unknown),
        }
    }
}
