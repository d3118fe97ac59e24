use serde::{Deserialize, Serialize};

pub const ABSENT_FID: i64 = -1;
pub const ABSENT_HASH: &str = "0";

/// Frame action body posted by the host. Cast actions use the same shape.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FramePayload {
    #[serde(default)]
    pub untrusted_data: Option<FrameData>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FrameData {
    #[serde(default)]
    pub fid: Option<i64>,
    #[serde(default)]
    pub input_text: Option<String>,
    #[serde(default)]
    pub cast_id: Option<RawCastId>,
}

#[derive(Deserialize, Default)]
pub struct RawCastId {
    #[serde(default)]
    pub fid: Option<i64>,
    #[serde(default)]
    pub hash: Option<RawHash>,
}

/// Hosts send the hash as a hex string, test tooling sometimes as a number.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum RawHash {
    Text(String),
    Number(serde_json::Number),
}

impl RawHash {
    pub fn into_string(self) -> String {
        match self {
            RawHash::Text(text) => text,
            RawHash::Number(number) => number.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastId {
    pub fid: i64,
    pub hash: String,
}

impl Default for CastId {
    fn default() -> Self {
        Self {
            fid: ABSENT_FID,
            hash: ABSENT_HASH.to_string(),
        }
    }
}

/// Normalized interaction, with sentinels standing in for missing fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameContext {
    pub fid: i64,
    pub input_text: Option<String>,
    pub cast_id: CastId,
}

impl Default for FrameContext {
    fn default() -> Self {
        Self {
            fid: ABSENT_FID,
            input_text: None,
            cast_id: CastId::default(),
        }
    }
}

/// A validated cast to curate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub fid: u64,
    pub hash: String,
}

#[derive(Serialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActionMetadata {
    pub name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    pub about_url: String,
    pub action: ActionKind,
}

#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct ActionKind {
    #[serde(rename = "type")]
    pub kind: &'static str,
}

#[derive(Serialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub frame_url: String,
}
