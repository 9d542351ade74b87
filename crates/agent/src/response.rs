use serde_json::Value;

/// A model reply, classified into the shapes providers actually produce.
///
/// The provider SDK surface does not guarantee a single response shape
/// across models and versions, so replies are folded into explicit cases up
/// front and flattened with an exhaustive match instead of speculative
/// field probing at every call site.
#[derive(Clone, Debug, PartialEq)]
pub enum AgentResponse {
    /// A `message` whose `content` is an ordered block list (the Converse
    /// shape: `[{"text": ...}, {"toolUse": ...}, ...]`).
    Message { content: Vec<Value> },
    /// A `message` that is not a block list; held as its text rendering.
    MessageText(String),
    /// A keyed payload with a direct `content` field and no `message`.
    Content(Value),
    /// Anything else.
    Opaque(Value),
}

impl AgentResponse {
    /// Classify an arbitrary reply payload. Precedence: a nested `message`
    /// wins over a bare `content` field, which wins over treating the value
    /// as opaque.
    pub fn from_value(value: Value) -> Self {
        if let Some(message) = value.get("message") {
            if let Some(blocks) = message.get("content").and_then(Value::as_array) {
                return Self::Message { content: blocks.clone() };
            }
            return Self::MessageText(stringify(message));
        }

        if let Some(content) = value.get("content") {
            return Self::Content(content.clone());
        }

        Self::Opaque(value)
    }

    /// Flatten to plain text. Total: never fails, never returns a non-string.
    pub fn into_text(self) -> String {
        match self {
            Self::Message { content } => first_block_text(&content),
            Self::MessageText(text) => text,
            Self::Content(value) => match value.as_array() {
                Some(blocks) => first_block_text(blocks),
                None => stringify(&value),
            },
            Self::Opaque(value) => stringify(&value),
        }
    }
}

fn first_block_text(blocks: &[Value]) -> String {
    match blocks.first() {
        Some(first) => match first.get("text").and_then(Value::as_str) {
            Some(text) => text.to_string(),
            None => stringify(first),
        },
        None => stringify(&Value::Array(Vec::new())),
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
