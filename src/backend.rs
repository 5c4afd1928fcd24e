use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::chat::{CanvasContent, Mode, Reference};

#[derive(Serialize)]
struct ChatRequest {
    user_id: String,
    message: String,
    mode: Mode,
}

/// Body of a successful `/api/chat` exchange. `canvas_data` is only sent
/// when the backend produced a learning artifact; its absence must not
/// disturb whatever the canvas already shows.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    #[serde(default)]
    pub references: Vec<Reference>,
    #[serde(default)]
    pub canvas_data: Option<CanvasContent>,
}

#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
    user_id: String,
}

impl BackendClient {
    pub fn new(base_url: &str, user_id: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            user_id: user_id.to_string(),
        }
    }

    /// One request, one response. No retries and no client-side timeout;
    /// whatever the transport enforces is what we get.
    pub async fn send_chat(&self, message: &str, mode: Mode) -> Result<ChatResponse> {
        let url = format!("{}/api/chat", self.base_url);

        let request = ChatRequest {
            user_id: self.user_id.clone(),
            message: message.to_string(),
            mode,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "AICademics backend returned status: {}",
                response.status()
            ));
        }

        let chat_response: ChatResponse = response.json().await?;
        Ok(chat_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::CanvasContent;

    #[test]
    fn test_request_payload_shape() {
        let request = ChatRequest {
            user_id: "student-1".to_string(),
            message: "jelaskan gravitasi".to_string(),
            mode: Mode::Quiz,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["user_id"], "student-1");
        assert_eq!(json["message"], "jelaskan gravitasi");
        assert_eq!(json["mode"], "quiz");
    }

    #[test]
    fn test_response_without_canvas_data() {
        let json = r#"{"answer": "Fotosintesis adalah...", "references": []}"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.answer, "Fotosintesis adalah...");
        assert!(response.references.is_empty());
        assert!(response.canvas_data.is_none());
    }

    #[test]
    fn test_response_with_quiz_canvas() {
        let json = r#"{
            "answer": "Quiz ready, check the canvas.",
            "references": [{"source": "lecture-3.pdf"}],
            "canvas_data": {
                "type": "quiz",
                "question": "What pulls the apple down?",
                "options": ["Magnetism", "Gravity", "Friction"],
                "correct_answer": "Gravity",
                "explanation": "Mass attracts mass."
            }
        }"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.references.len(), 1);
        let quiz = response
            .canvas_data
            .as_ref()
            .and_then(CanvasContent::as_quiz)
            .expect("expected quiz canvas");
        assert_eq!(quiz.correct_answer, "Gravity");
    }

    #[test]
    fn test_response_with_unrecognized_canvas_type() {
        let json = r#"{
            "answer": "here you go",
            "references": [],
            "canvas_data": {"type": "diagram", "nodes": []}
        }"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.canvas_data, Some(CanvasContent::Unknown));
    }
}
