use serde::{Deserialize, Serialize};

/// Greeting seeded into every new transcript so the log is never empty.
pub const WELCOME_MESSAGE: &str =
    "Hello! I'm AICademics. Switch to Visual or Quiz mode (keys 2/3) if you \
     want an interactive artifact in the canvas panel.";

/// Who authored a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Ai,
}

/// Opaque citation metadata attached to an AI answer. The backend decides
/// the shape; the client only cares whether any references exist.
pub type Reference = serde_json::Value;

/// A single transcript entry. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub references: Vec<Reference>,
    #[serde(default)]
    pub is_error: bool,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            references: Vec::new(),
            is_error: false,
        }
    }

    pub fn ai(content: impl Into<String>, references: Vec<Reference>) -> Self {
        Self {
            role: Role::Ai,
            content: content.into(),
            references,
            is_error: false,
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            role: Role::Ai,
            content: content.into(),
            references: Vec::new(),
            is_error: true,
        }
    }

    /// Whether the "sources verified" marker should show under this message.
    pub fn has_references(&self) -> bool {
        !self.references.is_empty()
    }
}

/// Append-only conversation log. Entries are never removed or reordered,
/// and the log is seeded with a greeting so it is never empty.
#[derive(Debug, Clone)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self {
            messages: vec![Message::ai(WELCOME_MESSAGE, Vec::new())],
        }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn last(&self) -> &Message {
        // Safe: seeded at construction, never drained.
        self.messages.last().unwrap()
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

/// Interaction mode tagged onto each outgoing request. Session-scoped;
/// captured by value at dispatch so a mid-flight change never alters a
/// request already sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Chat,
    Visual,
    Quiz,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Chat => "chat",
            Mode::Visual => "visual",
            Mode::Quiz => "quiz",
        }
    }

    pub fn all() -> Vec<Mode> {
        vec![Mode::Chat, Mode::Visual, Mode::Quiz]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Mode::Chat => "Chat",
            Mode::Visual => "Visual",
            Mode::Quiz => "Quiz",
        }
    }
}

/// What the learning canvas currently shows. The backend supplies `type`
/// as the discriminant; anything it invents that we don't know about lands
/// in `Unknown` instead of failing the whole response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CanvasContent {
    Empty,
    Image { url: String, caption: String },
    Quiz(QuizCard),
    #[serde(other)]
    Unknown,
}

impl CanvasContent {
    /// Badge text for the canvas header.
    pub fn tag(&self) -> &'static str {
        match self {
            CanvasContent::Empty => "IDLE",
            CanvasContent::Image { .. } => "IMAGE",
            CanvasContent::Quiz(_) => "QUIZ",
            CanvasContent::Unknown => "UNKNOWN",
        }
    }

    pub fn as_quiz(&self) -> Option<&QuizCard> {
        match self {
            CanvasContent::Quiz(quiz) => Some(quiz),
            _ => None,
        }
    }
}

impl Default for CanvasContent {
    fn default() -> Self {
        CanvasContent::Empty
    }
}

/// A multiple-choice question produced by the backend in quiz mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizCard {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
}

impl QuizCard {
    /// Exact string comparison against the backend's answer key. No
    /// trimming or case folding; the backend's text is authoritative.
    pub fn evaluate(&self, chosen: &str) -> QuizFeedback {
        if chosen == self.correct_answer {
            QuizFeedback::Correct
        } else {
            QuizFeedback::Incorrect
        }
    }
}

/// Outcome of answering the current quiz. Purely observational: picking
/// an option never mutates the transcript or the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizFeedback {
    Correct,
    Incorrect,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_seeded_with_welcome() {
        let transcript = Transcript::new();
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.last().role, Role::Ai);
        assert!(!transcript.last().is_error);
    }

    #[test]
    fn test_transcript_preserves_order() {
        let mut transcript = Transcript::new();
        transcript.push(Message::user("first"));
        transcript.push(Message::ai("second", Vec::new()));
        let contents: Vec<&str> = transcript
            .messages()
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents, vec![WELCOME_MESSAGE, "first", "second"]);
    }

    #[test]
    fn test_canvas_quiz_deserializes() {
        let json = r#"{
            "type": "quiz",
            "question": "Which planet is largest?",
            "options": ["A", "B", "C"],
            "correct_answer": "B",
            "explanation": "Jupiter dwarfs the rest."
        }"#;
        let canvas: CanvasContent = serde_json::from_str(json).unwrap();
        let quiz = canvas.as_quiz().expect("expected quiz variant");
        assert_eq!(quiz.options.len(), 3);
        assert_eq!(quiz.correct_answer, "B");
        assert_eq!(canvas.tag(), "QUIZ");
    }

    #[test]
    fn test_canvas_image_deserializes() {
        let json = r#"{"type": "image", "url": "https://example.com/x.png", "caption": "Visual: gravity"}"#;
        let canvas: CanvasContent = serde_json::from_str(json).unwrap();
        assert_eq!(
            canvas,
            CanvasContent::Image {
                url: "https://example.com/x.png".to_string(),
                caption: "Visual: gravity".to_string(),
            }
        );
    }

    #[test]
    fn test_canvas_unknown_discriminant_is_not_an_error() {
        let json = r#"{"type": "hologram", "payload": 42}"#;
        let canvas: CanvasContent = serde_json::from_str(json).unwrap();
        assert_eq!(canvas, CanvasContent::Unknown);
        assert_eq!(canvas.tag(), "UNKNOWN");
    }

    #[test]
    fn test_quiz_evaluation_is_exact_match() {
        let quiz = QuizCard {
            question: "q".to_string(),
            options: vec!["B".to_string(), "b".to_string(), " B".to_string()],
            correct_answer: "B".to_string(),
            explanation: "because".to_string(),
        };
        assert_eq!(quiz.evaluate("B"), QuizFeedback::Correct);
        assert_eq!(quiz.evaluate("b"), QuizFeedback::Incorrect);
        assert_eq!(quiz.evaluate(" B"), QuizFeedback::Incorrect);
    }

    #[test]
    fn test_mode_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Mode::Visual).unwrap(), "\"visual\"");
        assert_eq!(Mode::Quiz.as_str(), "quiz");
    }
}
