use model::{user::User, WithId};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub login: Option<Value>,
    #[serde(default)]
    pub data: Option<WithId<User>>,
    #[serde(default)]
    pub message: Option<String>,
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

impl LoginResponse {
    /// The logged in user, or the reason the backend gave for refusing.
    pub fn into_user(self) -> Result<WithId<User>, String> {
        let accepted = self.login.as_ref().map_or(true, is_truthy);
        match self.data {
            Some(user) if accepted => Ok(user),
            _ => Err(self
                .message
                .unwrap_or_else(|| "Login failed.".to_owned())),
        }
    }
}

/// Extracts a human readable message from an error body. The backend sends
/// either `{"message": ".."}` or field errors like `{"phone": [".."]}`, in
/// which case the first one is used.
pub fn error_message(text: &str) -> Option<String> {
    let Value::Object(body) = serde_json::from_str::<Value>(text).ok()? else {
        return None;
    };
    let first = body.get("message").or_else(|| body.values().next())?;
    match first {
        Value::String(message) => Some(message.clone()),
        Value::Array(messages) => messages
            .iter()
            .find_map(|m| m.as_str())
            .map(str::to_owned),
        _ => None,
    }
}
