use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::profile::ProfileTag;

/// Candidate meal sampled from an external plan service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SampledMeal {
    /// Meal name.
    pub name: String,
    /// Caloric content.
    pub calories: f64,
    /// Dietary classification.
    pub category: String,
}

/// Samples candidate meals for a profile classification.
#[async_trait]
pub trait PlanSource: Send + Sync {
    /// Returns candidate meals for the given tag.
    async fn sample_meals(&self, tag: &ProfileTag) -> Result<Vec<SampledMeal>>;
}

/// Stub source returning a fixed meal list.
#[derive(Debug, Clone, Default)]
pub struct StaticPlanSource {
    meals: Vec<SampledMeal>,
}

impl StaticPlanSource {
    /// Creates a stub answering with `meals`.
    #[must_use]
    pub const fn new(meals: Vec<SampledMeal>) -> Self {
        Self { meals }
    }
}

#[async_trait]
impl PlanSource for StaticPlanSource {
    async fn sample_meals(&self, _tag: &ProfileTag) -> Result<Vec<SampledMeal>> {
        Ok(self.meals.clone())
    }
}

/// HTTP source against the external plan service
/// (`{base}/plans/sample?bmiCategory={tag}`).
#[derive(Debug, Clone)]
pub struct HttpPlanSource {
    client: Client,
    base_url: String,
}

impl HttpPlanSource {
    /// Creates a source against `base_url`.
    pub fn new(base_url: impl Into<String>, timeout_ms: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .context("building plan source client")?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl PlanSource for HttpPlanSource {
    async fn sample_meals(&self, tag: &ProfileTag) -> Result<Vec<SampledMeal>> {
        let url = format!(
            "{}/plans/sample?bmiCategory={}",
            self.base_url.trim_end_matches('/'),
            tag.as_str()
        );
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("querying plan source {url}"))?;
        let body: Value = response
            .error_for_status()
            .context("plan source returned an error status")?
            .json()
            .await
            .context("decoding plan source response")?;
        Ok(flatten_plans(&body))
    }
}

/// Flattens the service's plan documents into a meal list. Each plan carries
/// a `meals` object keyed by slot (breakfast/lunch/dinner); missing fields
/// fall back the way the service's own clients do.
#[must_use]
pub fn flatten_plans(body: &Value) -> Vec<SampledMeal> {
    let Some(plans) = body.as_array() else {
        return Vec::new();
    };
    let mut meals = Vec::new();
    for plan in plans {
        let Some(slots) = plan.get("meals").and_then(Value::as_object) else {
            continue;
        };
        for slot in slots.values() {
            let Some(name) = slot.get("name").and_then(Value::as_str) else {
                continue;
            };
            meals.push(SampledMeal {
                name: name.to_string(),
                calories: slot
                    .get("calories")
                    .and_then(Value::as_f64)
                    .unwrap_or_default(),
                category: slot
                    .get("category")
                    .and_then(Value::as_str)
                    .unwrap_or("Normal")
                    .to_string(),
            });
        }
    }
    meals
}
