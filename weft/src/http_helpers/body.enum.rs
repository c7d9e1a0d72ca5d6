use serde::de::DeserializeOwned;
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Body {
    #[default]
    Empty,
    Text(String),
    Json(Value),
}

impl Body {
    pub fn is_empty(&self) -> bool {
        match self {
            Body::Empty => true,
            Body::Text(text) => text.is_empty(),
            Body::Json(_) => false,
        }
    }

    /// Deserialize the body as JSON, whether it arrived as raw text or was
    /// already parsed by the transport.
    pub fn parse_json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        match self {
            Body::Empty => serde_json::from_str(""),
            Body::Text(text) => serde_json::from_str(text),
            Body::Json(value) => T::deserialize(value),
        }
    }

    /// Render the body as a string, serializing JSON if needed
    pub fn to_text(&self) -> String {
        match self {
            Body::Empty => String::new(),
            Body::Text(text) => text.clone(),
            Body::Json(value) => value.to_string(),
        }
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Text(text)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Text(text.to_string())
    }
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Body::Json(value)
    }
}
