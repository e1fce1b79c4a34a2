use serde::{ Serialize, Deserialize };

/// One turn of dialogue. Serializes to the `{role, content}` shape used both
/// on the completion wire and in saved session files.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_tag_roles() {
        assert_eq!(ChatMessage::user("hello").role, "user");
        assert_eq!(ChatMessage::assistant("hi").role, "assistant");
    }

    #[test]
    fn serializes_to_role_and_content_only() {
        let json = serde_json::to_string(&ChatMessage::user("hello")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"hello"}"#);
    }
}
