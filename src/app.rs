use ratatui::layout::Rect;
use ratatui::widgets::ListState;

use crate::backend::{BackendClient, ChatResponse};
use crate::chat::{CanvasContent, Message, Mode, QuizFeedback, Transcript};
use crate::config::Config;

/// Fixed diagnostic shown when an exchange fails for any reason
/// (connection refused, bad status, unparseable body).
pub const BACKEND_ERROR_MESSAGE: &str =
    "Error: could not reach the AICademics backend.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Input,
    Chat,
    Canvas,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub focus: FocusPane,

    // Conversation state
    pub transcript: Transcript,
    pub canvas: CanvasContent,
    pub mode: Mode,

    // Request lifecycle: at most one exchange in flight, guarded by `busy`
    pub busy: bool,
    pub exchange_task: Option<tokio::task::JoinHandle<anyhow::Result<ChatResponse>>>,

    // Input buffer
    pub input: String,
    pub input_cursor: usize, // cursor position in input, in chars

    // Quiz interaction
    pub quiz_state: ListState,
    pub quiz_feedback: Option<QuizFeedback>,

    // Scroll state
    pub chat_scroll: u16,
    pub chat_height: u16, // Height of chat area for scroll calculations
    pub chat_width: u16,  // Width of chat area for wrap calculations
    pub canvas_scroll: u16,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Panel areas for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,
    pub canvas_area: Option<Rect>,

    // Backend
    pub backend: BackendClient,
}

impl App {
    pub fn new(config: &Config) -> Self {
        let backend = BackendClient::new(&config.backend_url(), &config.user_id());

        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            focus: FocusPane::Input,

            transcript: Transcript::new(),
            canvas: CanvasContent::Empty,
            mode: Mode::Chat,

            busy: false,
            exchange_task: None,

            input: String::new(),
            input_cursor: 0,

            quiz_state: ListState::default(),
            quiz_feedback: None,

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            canvas_scroll: 0,

            animation_frame: 0,

            chat_area: None,
            canvas_area: None,

            backend,
        }
    }

    // --- Request lifecycle ---

    /// First half of an exchange. Rejects blank input and re-entry while an
    /// exchange is pending (both silently), appends the user message, and
    /// returns the payload to send: the raw text plus the mode captured at
    /// this instant. Later mode changes must not touch an in-flight request,
    /// hence the by-value snapshot.
    pub fn begin_submit(&mut self) -> Option<(String, Mode)> {
        if self.busy {
            return None;
        }
        if self.input.trim().is_empty() {
            return None;
        }

        let message = self.input.clone();
        let mode = self.mode;

        self.transcript.push(Message::user(message.clone()));
        self.input.clear();
        self.input_cursor = 0;
        self.busy = true;

        // Keep the new message and the "Thinking..." row visible
        self.scroll_chat_to_bottom();

        Some((message, mode))
    }

    /// Second half of an exchange, applied once the backend call settles.
    /// Success appends the answer and, only when the backend shipped one,
    /// replaces the canvas artifact. Failure appends the fixed diagnostic
    /// and leaves the canvas exactly as it was. The user message from
    /// `begin_submit` is never retracted.
    pub fn finish_exchange(&mut self, result: anyhow::Result<ChatResponse>) {
        match result {
            Ok(response) => {
                self.transcript
                    .push(Message::ai(response.answer, response.references));
                if let Some(canvas) = response.canvas_data {
                    self.set_canvas(canvas);
                }
            }
            Err(_) => {
                self.transcript.push(Message::error(BACKEND_ERROR_MESSAGE));
            }
        }

        self.busy = false;
        self.scroll_chat_to_bottom();
    }

    fn set_canvas(&mut self, canvas: CanvasContent) {
        self.canvas = canvas;
        self.canvas_scroll = 0;
        self.quiz_feedback = None;
        if self.canvas.as_quiz().is_some() {
            self.quiz_state.select(Some(0));
        } else {
            self.quiz_state.select(None);
        }
    }

    // --- Mode selection ---

    /// Unconditional overwrite; takes effect for the next submission only.
    pub fn select_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    // --- Quiz interaction ---

    pub fn quiz_nav_down(&mut self) {
        if let Some(quiz) = self.canvas.as_quiz() {
            let len = quiz.options.len();
            if len > 0 {
                let i = self.quiz_state.selected().unwrap_or(0);
                self.quiz_state.select(Some((i + 1).min(len - 1)));
            }
        }
    }

    pub fn quiz_nav_up(&mut self) {
        if self.canvas.as_quiz().is_some() {
            let i = self.quiz_state.selected().unwrap_or(0);
            self.quiz_state.select(Some(i.saturating_sub(1)));
        }
    }

    /// Grade the highlighted option against the answer key. Feedback only;
    /// neither the transcript nor the canvas changes.
    pub fn select_quiz_option(&mut self) {
        let Some(quiz) = self.canvas.as_quiz() else {
            return;
        };
        let Some(idx) = self.quiz_state.selected() else {
            return;
        };
        if let Some(option) = quiz.options.get(idx) {
            self.quiz_feedback = Some(quiz.evaluate(option));
        }
    }

    // --- Scrolling ---

    pub fn scroll_chat_down(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_add(1);
    }

    pub fn scroll_chat_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    pub fn scroll_canvas_down(&mut self) {
        self.canvas_scroll = self.canvas_scroll.saturating_add(1);
    }

    pub fn scroll_canvas_up(&mut self) {
        self.canvas_scroll = self.canvas_scroll.saturating_sub(1);
    }

    /// Scroll the transcript so the latest entry (and the "Thinking..."
    /// indicator while busy) is visible.
    pub fn scroll_chat_to_bottom(&mut self) {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;

        for msg in self.transcript.messages() {
            total_lines += 1; // Role line ("You:" or "AI:")
            for line in msg.content.lines() {
                // Use character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                if char_count == 0 {
                    total_lines += 1;
                } else {
                    total_lines += ((char_count / wrap_width) + 1) as u16;
                }
            }
            if msg.has_references() {
                total_lines += 1; // "sources verified" marker
            }
            total_lines += 1; // Blank line after message
        }

        if self.busy {
            total_lines += 2; // "AI:" + "Thinking..."
        }

        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        if total_lines > visible_height {
            self.chat_scroll = total_lines.saturating_sub(visible_height);
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.busy {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{QuizCard, Role};

    fn test_app() -> App {
        App::new(&Config::new())
    }

    fn quiz_canvas() -> CanvasContent {
        CanvasContent::Quiz(QuizCard {
            question: "What pulls the apple down?".to_string(),
            options: vec!["A".to_string(), "B".to_string(), "C".to_string()],
            correct_answer: "B".to_string(),
            explanation: "Mass attracts mass.".to_string(),
        })
    }

    fn answer_only(answer: &str) -> ChatResponse {
        ChatResponse {
            answer: answer.to_string(),
            references: Vec::new(),
            canvas_data: None,
        }
    }

    #[test]
    fn test_chat_exchange_appends_user_then_ai() {
        let mut app = test_app();
        app.input = "Apa itu fotosintesis?".to_string();

        let (message, mode) = app.begin_submit().expect("submit should dispatch");
        assert_eq!(message, "Apa itu fotosintesis?");
        assert_eq!(mode, Mode::Chat);
        assert!(app.busy);
        assert!(app.input.is_empty());
        assert_eq!(app.transcript.len(), 2); // welcome + user
        assert_eq!(app.transcript.last().role, Role::User);

        app.finish_exchange(Ok(answer_only("Fotosintesis adalah...")));
        assert!(!app.busy);
        assert_eq!(app.transcript.len(), 3);
        assert_eq!(app.transcript.last().content, "Fotosintesis adalah...");
        assert_eq!(app.canvas, CanvasContent::Empty);
    }

    #[test]
    fn test_blank_input_is_silently_dropped() {
        let mut app = test_app();
        app.input = "   \t  ".to_string();
        assert!(app.begin_submit().is_none());
        assert!(!app.busy);
        assert_eq!(app.transcript.len(), 1);
    }

    #[test]
    fn test_submit_while_busy_is_a_no_op() {
        let mut app = test_app();
        app.input = "first".to_string();
        app.begin_submit().unwrap();
        let len_before = app.transcript.len();

        app.input = "second".to_string();
        assert!(app.begin_submit().is_none());
        assert!(app.busy);
        assert_eq!(app.transcript.len(), len_before);
        assert_eq!(app.input, "second"); // not consumed
    }

    #[test]
    fn test_mode_captured_at_dispatch() {
        let mut app = test_app();
        app.select_mode(Mode::Quiz);
        app.input = "jelaskan gravitasi".to_string();

        let (_, dispatched_mode) = app.begin_submit().unwrap();

        // Switching modes mid-flight must not touch the dispatched payload
        app.select_mode(Mode::Chat);
        assert_eq!(dispatched_mode, Mode::Quiz);
        assert_eq!(app.mode, Mode::Chat);
    }

    #[test]
    fn test_failure_appends_one_error_and_preserves_canvas() {
        let mut app = test_app();
        app.set_canvas(quiz_canvas());
        let canvas_before = app.canvas.clone();

        app.input = "anything".to_string();
        app.begin_submit().unwrap();
        let len_before = app.transcript.len();

        app.finish_exchange(Err(anyhow::anyhow!("connection refused")));

        assert_eq!(app.transcript.len(), len_before + 1);
        let last = app.transcript.last();
        assert!(last.is_error);
        assert_eq!(last.role, Role::Ai);
        assert_eq!(last.content, BACKEND_ERROR_MESSAGE);
        assert_eq!(app.canvas, canvas_before);
        assert!(!app.busy);
    }

    #[test]
    fn test_response_without_canvas_keeps_prior_artifact() {
        let mut app = test_app();
        app.set_canvas(quiz_canvas());

        app.input = "just chatting".to_string();
        app.begin_submit().unwrap();
        app.finish_exchange(Ok(answer_only("sure")));

        assert_eq!(app.canvas, quiz_canvas());
    }

    #[test]
    fn test_canvas_data_replaces_current_artifact() {
        let mut app = test_app();
        app.set_canvas(quiz_canvas());

        app.input = "show me a picture".to_string();
        app.begin_submit().unwrap();
        app.finish_exchange(Ok(ChatResponse {
            answer: "here".to_string(),
            references: Vec::new(),
            canvas_data: Some(CanvasContent::Image {
                url: "https://example.com/x.png".to_string(),
                caption: "Visual: gravity".to_string(),
            }),
        }));

        assert_eq!(app.canvas.tag(), "IMAGE");
        assert!(app.quiz_state.selected().is_none());
        assert!(app.quiz_feedback.is_none());
    }

    #[test]
    fn test_quiz_selection_grades_without_mutating_state() {
        let mut app = test_app();
        app.input = "jelaskan gravitasi".to_string();
        app.begin_submit().unwrap();
        app.finish_exchange(Ok(ChatResponse {
            answer: "Quiz ready, check the canvas.".to_string(),
            references: Vec::new(),
            canvas_data: Some(quiz_canvas()),
        }));

        let transcript_len = app.transcript.len();
        let canvas_before = app.canvas.clone();

        // Option "B" (index 1) is the answer key
        app.quiz_nav_down();
        app.select_quiz_option();
        assert_eq!(app.quiz_feedback, Some(QuizFeedback::Correct));

        // Option "A" is wrong; retry feedback, still no state change
        app.quiz_nav_up();
        app.select_quiz_option();
        assert_eq!(app.quiz_feedback, Some(QuizFeedback::Incorrect));

        assert_eq!(app.transcript.len(), transcript_len);
        assert_eq!(app.canvas, canvas_before);
    }

    #[test]
    fn test_quiz_selection_ignored_without_a_quiz() {
        let mut app = test_app();
        app.select_quiz_option();
        assert!(app.quiz_feedback.is_none());

        app.set_canvas(CanvasContent::Image {
            url: "u".to_string(),
            caption: "c".to_string(),
        });
        app.select_quiz_option();
        assert!(app.quiz_feedback.is_none());
    }

    #[test]
    fn test_transcript_is_append_only_across_exchanges() {
        let mut app = test_app();
        let mut lengths = vec![app.transcript.len()];

        for (input, result) in [
            ("one", Ok(answer_only("1"))),
            ("two", Err(anyhow::anyhow!("boom"))),
            ("three", Ok(answer_only("3"))),
        ] {
            app.input = input.to_string();
            app.begin_submit().unwrap();
            lengths.push(app.transcript.len());
            app.finish_exchange(result);
            lengths.push(app.transcript.len());
        }

        assert!(lengths.windows(2).all(|w| w[0] <= w[1]));
        // Existing entries never change value: the welcome message is intact
        assert_eq!(
            app.transcript.messages()[0].content,
            crate::chat::WELCOME_MESSAGE
        );
    }
}
