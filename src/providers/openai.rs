//! OpenAI chat-completions backend.
//!
//! Uses structured outputs (`response_format: json_schema`, strict mode).
//! Strict mode requires every property to be listed as required and
//! `additionalProperties: false` on every object; optional placeholders
//! are still emitted, just as empty strings.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::{ChangelogProvider, Generation, ProviderError, TokenUsage, endpoint, send};
use crate::models::ProviderName;
use crate::schema::{FieldKind, ObjectSchema, SchemaDefinition};

const PROVIDER: ProviderName = ProviderName::OpenAI;

/// OpenAI-style backend. Also works with compatible servers via `base_url`.
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiProvider {
    pub fn new(client: reqwest::Client, api_key: String, base_url: String) -> Self {
        Self {
            client,
            api_key,
            base_url,
        }
    }
}

#[async_trait]
impl ChangelogProvider for OpenAiProvider {
    async fn generate(
        &self,
        prompt: &str,
        schema: &SchemaDefinition,
        model: &str,
    ) -> Result<Generation, ProviderError> {
        tracing::debug!(model, url = %self.base_url, "calling OpenAI chat completions");
        let request = self
            .client
            .post(endpoint(&self.base_url, "chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&request_body(prompt, schema, model));
        let body = send(PROVIDER, request).await?;
        parse_response(&body)
    }
}

/// Chat-completions request asking for a single schema-constrained choice.
pub fn request_body(prompt: &str, schema: &SchemaDefinition, model: &str) -> Value {
    json!({
        "model": model,
        "n": 1,
        "messages": [
            { "role": "user", "content": prompt }
        ],
        "response_format": {
            "type": "json_schema",
            "json_schema": {
                "name": schema.name,
                "description": schema.description,
                "strict": true,
                "schema": json_schema(schema),
            }
        }
    })
}

/// Render the schema as strict-mode JSON Schema.
pub fn json_schema(schema: &SchemaDefinition) -> Value {
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
        "type": "object",
        "properties": properties,
        "required": obj.property_names(),
        "additionalProperties": false,
    })
}

fn kind_schema(kind: &FieldKind) -> Value {
    match kind {
        FieldKind::String => json!({ "type": "string" }),
        FieldKind::Enum(values) => json!({ "type": "string", "enum": values }),
        FieldKind::Array { items, min_items } => {
            let mut schema = json!({ "type": "array", "items": kind_schema(items) });
            if *min_items > 0 {
                schema["minItems"] = Value::from(*min_items);
            }
            schema
        }
        FieldKind::Object(obj) => object_schema(obj),
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
    refusal: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

/// Extract the first choice's content and the reported usage.
pub fn parse_response(body: &str) -> Result<Generation, ProviderError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::MalformedEnvelope {
            provider: PROVIDER,
            message: e.to_string(),
        })?;

    let message = response.choices.into_iter().next().map(|c| c.message);
    let raw_text = match message {
        Some(Message {
            content: Some(text),
            ..
        }) if !text.trim().is_empty() => text,
        Some(Message {
            refusal: Some(reason),
            ..
        }) => {
            return Err(ProviderError::EmptyResponse {
                provider: PROVIDER,
                detail: format!(": model refused: {reason}"),
            });
        }
        _ => {
            return Err(ProviderError::EmptyResponse {
                provider: PROVIDER,
                detail: String::new(),
            });
        }
    };

    let usage = response
        .usage
        .map(|u| TokenUsage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
        })
        .unwrap_or_default();

    Ok(Generation { raw_text, usage })
}
