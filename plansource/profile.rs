use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Classification tag attached to a user profile (e.g. a BMI category).
/// Used only to select which external plan source to sample from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ProfileTag(String);

impl ProfileTag {
    /// Creates a tag.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Tag value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ProfileTag {
    fn default() -> Self {
        Self("Normal".into())
    }
}

/// Looks up a user's classification tag.
///
/// Lookup is best-effort: implementations fall back to the default tag
/// rather than failing the request.
#[async_trait]
pub trait ProfileLookup: Send + Sync {
    /// Returns the user's classification tag.
    async fn classification(&self, user_id: &str) -> ProfileTag;
}

/// Stub lookup returning a fixed tag.
#[derive(Debug, Clone, Default)]
pub struct StaticProfileLookup {
    tag: ProfileTag,
}

impl StaticProfileLookup {
    /// Creates a stub always answering with `tag`.
    #[must_use]
    pub const fn new(tag: ProfileTag) -> Self {
        Self { tag }
    }
}

#[async_trait]
impl ProfileLookup for StaticProfileLookup {
    async fn classification(&self, _user_id: &str) -> ProfileTag {
        self.tag.clone()
    }
}

/// HTTP lookup against the external user service (`{base}/users/{id}`).
#[derive(Debug, Clone)]
pub struct HttpProfileLookup {
    client: Client,
    base_url: String,
}

impl HttpProfileLookup {
    /// Creates a lookup against `base_url`.
    pub fn new(base_url: impl Into<String>, timeout_ms: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .context("building profile lookup client")?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl ProfileLookup for HttpProfileLookup {
    async fn classification(&self, user_id: &str) -> ProfileTag {
        let url = format!("{}/users/{user_id}", self.base_url.trim_end_matches('/'));
        let tag = async {
            let response = self.client.get(&url).send().await?;
            let body: serde_json::Value = response.error_for_status()?.json().await?;
            anyhow::Ok(
                body.get("bmiCategory")
                    .and_then(serde_json::Value::as_str)
                    .map(ProfileTag::new),
            )
        }
        .await;
        match tag {
            Ok(Some(tag)) => tag,
            _ => ProfileTag::default(),
        }
    }
}
