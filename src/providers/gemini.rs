//! Google Gemini `generateContent` backend.
//!
//! Structured output goes through `generationConfig.responseSchema`, which
//! takes Gemini's OpenAPI subset: upper-case type names, explicit
//! `propertyOrdering`, and `format: "enum"` on enumerated strings.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::{ChangelogProvider, Generation, ProviderError, TokenUsage, endpoint, send};
use crate::models::ProviderName;
use crate::schema::{FieldKind, ObjectSchema, SchemaDefinition};

const PROVIDER: ProviderName = ProviderName::Gemini;

/// Gemini API backend.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(client: reqwest::Client, api_key: String, base_url: String) -> Self {
        Self {
            client,
            api_key,
            base_url,
        }
    }
}

#[async_trait]
impl ChangelogProvider for GeminiProvider {
    async fn generate(
        &self,
        prompt: &str,
        schema: &SchemaDefinition,
        model: &str,
    ) -> Result<Generation, ProviderError> {
        tracing::debug!(model, url = %self.base_url, "calling Gemini generateContent");
        let request = self
            .client
            .post(endpoint(&self.base_url, &format!("models/{model}:generateContent")))
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body(prompt, schema));
        let body = send(PROVIDER, request).await?;
        parse_response(&body)
    }
}

/// `generateContent` request for one JSON candidate.
///
/// The model is part of the URL, not the body.
pub fn request_body(prompt: &str, schema: &SchemaDefinition) -> Value {
    json!({
        "contents": [
            { "role": "user", "parts": [{ "text": prompt }] }
        ],
        "generationConfig": {
            "candidateCount": 1,
            "responseMimeType": "application/json",
            "responseSchema": response_schema(schema),
        }
    })
}

/// Render the schema in Gemini's `Schema` format.
pub fn response_schema(schema: &SchemaDefinition) -> Value {
    object_schema(&schema.root)
}

fn object_schema(obj: &ObjectSchema) -> Value {
    let mut properties = Map::new();
    for field in &obj.fields {
        let mut prop = kind_schema(&field.kind);
        prop["description"] = Value::from(field.description);
        properties.insert(field.name.to_string(), prop);
    }
    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": obj.required_names(),
        "propertyOrdering": obj.property_names(),
    })
}

fn kind_schema(kind: &FieldKind) -> Value {
    match kind {
        FieldKind::String => json!({ "type": "STRING" }),
        FieldKind::Enum(values) => json!({ "type": "STRING", "format": "enum", "enum": values }),
        FieldKind::Array { items, min_items } => {
            let mut schema = json!({ "type": "ARRAY", "items": kind_schema(items) });
            if *min_items > 0 {
                schema["minItems"] = Value::from(*min_items);
            }
            schema
        }
        FieldKind::Object(obj) => object_schema(obj),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// Concatenate the first candidate's text parts and read usage metadata.
pub fn parse_response(body: &str) -> Result<Generation, ProviderError> {
    let response: GenerateResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::MalformedEnvelope {
            provider: PROVIDER,
            message: e.to_string(),
        })?;

    let Some(candidate) = response.candidates.into_iter().next() else {
        let detail = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .map(|r| format!(": prompt blocked ({r})"))
            .unwrap_or_default();
        return Err(ProviderError::EmptyResponse {
            provider: PROVIDER,
            detail,
        });
    };

    let raw_text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if raw_text.trim().is_empty() {
        let detail = candidate
            .finish_reason
            .map(|r| format!(": finish reason {r}"))
            .unwrap_or_default();
        return Err(ProviderError::EmptyResponse {
            provider: PROVIDER,
            detail,
        });
    }

    let usage = response
        .usage_metadata
        .map(|u| TokenUsage {
            input_tokens: u.prompt_token_count,
            output_tokens: u.candidates_token_count,
        })
        .unwrap_or_default();

    Ok(Generation { raw_text, usage })
}
