use crate::event::model::RawEvent;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

const JSON_RESPONSE_FORMAT: &str = "json_object";

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub temperature: f32,
    pub response_format: ResponseFormat,
    pub messages: Vec<ChatMessage<'a>>,
}

impl<'a> ChatCompletionRequest<'a> {
    pub fn new(model: &'a str, system_prompt: &'a str, user_prompt: &'a str) -> Self {
        Self {
            model,
            temperature: 0.0,
            response_format: ResponseFormat {
                kind: JSON_RESPONSE_FORMAT,
            },
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ResponseChoice>,
}

impl ChatCompletionResponse {
    pub fn content(&self) -> Option<&str> {
        self.choices
            .iter()
            .find_map(|choice| choice.message.content.as_deref())
    }
}

#[derive(Debug, Deserialize)]
pub struct ResponseChoice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

// Note: the model does not always honour the requested shape, so both keys tolerate
// a single object, an array or garbage
#[derive(Debug, Default, Deserialize)]
pub struct EventsEnvelope {
    #[serde(default, deserialize_with = "deserialize_events")]
    pub events: Vec<RawEvent>,
    #[serde(default, deserialize_with = "deserialize_events")]
    pub data: Vec<RawEvent>,
}

/// Reads the events out of the model's answer; anything unexpected counts as no events
pub fn parse_events_payload(content: &str) -> Vec<RawEvent> {
    let content = strip_code_fence(content);

    match serde_json::from_str::<Value>(content) {
        Ok(value @ Value::Object(_)) => match EventsEnvelope::deserialize(value) {
            Ok(envelope) if !envelope.events.is_empty() => envelope.events,
            Ok(envelope) => envelope.data,
            Err(err) => {
                warn!("Unexpected events object: {}", err);
                Vec::new()
            }
        },
        Ok(value @ Value::Array(_)) => events_from_value(value),
        Ok(other) => {
            warn!("Expected events but got: {}", other);
            Vec::new()
        }
        Err(err) => {
            warn!("Model answer is not JSON: {}", err);
            Vec::new()
        }
    }
}

fn strip_code_fence(content: &str) -> &str {
    let content = content.trim();

    match content.strip_prefix("```") {
        Some(fenced) => fenced
            .trim_start_matches("json")
            .trim_end()
            .trim_end_matches("```")
            .trim(),
        None => content,
    }
}

fn deserialize_events<'de, D>(d: D) -> Result<Vec<RawEvent>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(events_from_value(Value::deserialize(d)?))
}

fn events_from_value(value: Value) -> Vec<RawEvent> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(map) => Some(RawEvent::from(map)),
                other => {
                    warn!("Skipping non-object event: {}", other);
                    None
                }
            })
            .collect(),
        Value::Object(map) => vec![RawEvent::from(map)],
        _ => Vec::new(),
    }
}
