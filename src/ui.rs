use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

use crate::app::{App, FocusPane, InputMode};
use crate::chat::{CanvasContent, Mode, QuizCard, QuizFeedback, Role};

/// Style a line of AI answer text, turning `**bold**` runs into bold spans.
/// An unpaired `**` renders literally.
fn styled_answer_line(text: &str) -> Line<'static> {
    let parts: Vec<&str> = text.split("**").collect();
    if parts.len() < 3 || parts.len() % 2 == 0 {
        return Line::from(text.to_string());
    }

    let mut spans: Vec<Span<'static>> = Vec::new();
    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() {
            continue;
        }
        if i % 2 == 1 {
            spans.push(Span::styled(
                part.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::raw(part.to_string()));
        }
    }
    Line::from(spans)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    // Two columns: transcript on the left, learning canvas on the right
    let [chat_column, canvas_area] = Layout::horizontal([
        Constraint::Percentage(50),
        Constraint::Percentage(50),
    ])
    .areas(body_area);

    let [transcript_area, mode_bar_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(3),
    ])
    .areas(chat_column);

    render_transcript(app, frame, transcript_area);
    render_mode_bar(app, frame, mode_bar_area);
    render_input(app, frame, input_area);
    render_canvas(app, frame, canvas_area);

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let mode_badge = match app.mode {
        Mode::Chat => Span::styled(" CHAT ", Style::default().bg(Color::Blue).fg(Color::White)),
        Mode::Visual => {
            Span::styled(" VISUAL ", Style::default().bg(Color::Magenta).fg(Color::White))
        }
        Mode::Quiz => Span::styled(" QUIZ ", Style::default().bg(Color::Green).fg(Color::Black)),
    };

    let title = Line::from(vec![
        Span::styled(" AICademics ", Style::default().fg(Color::Cyan).bold()),
        Span::styled("RAG Learning Assistant ", Style::default().fg(Color::Gray)),
        mode_badge,
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_transcript(app: &mut App, frame: &mut Frame, area: Rect) {
    // Store area and inner dimensions for mouse hit-testing and wrap math
    app.chat_area = Some(area);
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);

    let focused = app.focus == FocusPane::Chat;
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Transcript ");

    let mut lines: Vec<Line> = Vec::new();

    for msg in app.transcript.messages() {
        match msg.role {
            Role::User => {
                lines.push(Line::from(Span::styled(
                    "You:",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )));
                for line in msg.content.lines() {
                    lines.push(Line::from(line.to_string()));
                }
            }
            Role::Ai => {
                lines.push(Line::from(Span::styled(
                    "AI:",
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )));
                for line in msg.content.lines() {
                    if msg.is_error {
                        lines.push(Line::from(Span::styled(
                            line.to_string(),
                            Style::default().fg(Color::Red),
                        )));
                    } else {
                        lines.push(styled_answer_line(line));
                    }
                }
            }
        }

        if msg.has_references() {
            lines.push(Line::from(Span::styled(
                "[sources verified]",
                Style::default().fg(Color::DarkGray),
            )));
        }
        lines.push(Line::default());
    }

    if app.busy {
        lines.push(Line::from(Span::styled(
            "AI:",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    let transcript = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(transcript, area);
}

fn render_mode_bar(app: &App, frame: &mut Frame, area: Rect) {
    let mut spans: Vec<Span> = vec![Span::raw(" ")];

    for mode in Mode::all() {
        let key = match mode {
            Mode::Chat => "1",
            Mode::Visual => "2",
            Mode::Quiz => "3",
        };
        let style = if mode == app.mode {
            Style::default()
                .bg(Color::Cyan)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(
            format!(" {} {} ", key, mode.display_name()),
            style,
        ));
        spans.push(Span::raw(" "));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let border_color = if editing { Color::Yellow } else { Color::DarkGray };

    let title = if app.busy {
        " Waiting for answer... ".to_string()
    } else {
        format!(" Ask in {} mode (i to type) ", app.mode.as_str())
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Horizontal scrolling keeps the cursor visible in a one-line box
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.input_cursor;

    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app
        .input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(block);

    frame.render_widget(input, area);

    if editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_canvas(app: &mut App, frame: &mut Frame, area: Rect) {
    app.canvas_area = Some(area);

    let focused = app.focus == FocusPane::Canvas;
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(" Learning Canvas [{}] ", app.canvas.tag()));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Exhaustive over the discriminant: every variant has a rendering,
    // including payloads this client does not recognize. Cloned so the quiz
    // arm can borrow the app mutably for its list state.
    match app.canvas.clone() {
        CanvasContent::Empty => render_canvas_empty(frame, inner),
        CanvasContent::Image { url, caption } => {
            render_canvas_image(app.canvas_scroll, &url, &caption, frame, inner)
        }
        CanvasContent::Quiz(quiz) => render_canvas_quiz(app, &quiz, frame, inner),
        CanvasContent::Unknown => render_canvas_unknown(frame, inner),
    }
}

fn render_canvas_empty(frame: &mut Frame, area: Rect) {
    let text = Text::from(vec![
        Line::default(),
        Line::from(Span::styled(
            "The learning canvas is empty.",
            Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(Span::styled(
            "Pick Visual or Quiz mode and send a question",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "to see an artifact here.",
            Style::default().fg(Color::DarkGray),
        )),
    ]);

    let placeholder = Paragraph::new(text)
        .alignment(ratatui::layout::Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(placeholder, area);
}

fn render_canvas_image(scroll: u16, url: &str, caption: &str, frame: &mut Frame, area: Rect) {
    let text = Text::from(vec![
        Line::from(Span::styled(
            "Visualization",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(vec![
            Span::styled("url: ", Style::default().fg(Color::DarkGray)),
            Span::styled(url.to_string(), Style::default().fg(Color::Blue)),
        ]),
        Line::default(),
        Line::from(Span::styled(
            caption.to_string(),
            Style::default().add_modifier(Modifier::ITALIC),
        )),
    ]);

    let image = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .scroll((scroll, 0));
    frame.render_widget(image, area);
}

fn render_canvas_quiz(app: &mut App, quiz: &QuizCard, frame: &mut Frame, area: Rect) {
    // Rough wrapped-line count for the question box
    let wrap_width = area.width.max(1) as usize;
    let question_lines = (quiz.question.chars().count() / wrap_width + 1) as u16;

    let [question_area, options_area, feedback_area] = Layout::vertical([
        Constraint::Length(question_lines + 1),
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(area);

    let question = Paragraph::new(Text::from(vec![Line::from(Span::styled(
        quiz.question.clone(),
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    ))]))
    .wrap(Wrap { trim: true });
    frame.render_widget(question, question_area);

    let items: Vec<ListItem> = quiz
        .options
        .iter()
        .enumerate()
        .map(|(i, opt)| ListItem::new(format!(" {}. {} ", i + 1, opt)))
        .collect();

    let options = List::new(items)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(options, options_area, &mut app.quiz_state);

    let feedback_text = match app.quiz_feedback {
        Some(QuizFeedback::Correct) => Text::from(vec![
            Line::from(Span::styled(
                "Correct!",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                quiz.explanation.clone(),
                Style::default().fg(Color::Gray),
            )),
        ]),
        Some(QuizFeedback::Incorrect) => Text::from(Line::from(Span::styled(
            "Not quite. Try again.",
            Style::default().fg(Color::Red),
        ))),
        None => Text::from(Line::from(Span::styled(
            "j/k to move, Enter to answer",
            Style::default().fg(Color::DarkGray),
        ))),
    };

    let feedback = Paragraph::new(feedback_text).wrap(Wrap { trim: true });
    frame.render_widget(feedback, feedback_area);
}

fn render_canvas_unknown(frame: &mut Frame, area: Rect) {
    let text = Text::from(vec![
        Line::default(),
        Line::from(Span::styled(
            "Unsupported canvas payload",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(Span::styled(
            "The backend sent an artifact type this client",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "does not recognize. The chat answer still applies.",
            Style::default().fg(Color::DarkGray),
        )),
    ]);

    let notice = Paragraph::new(text)
        .alignment(ratatui::layout::Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(notice, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " INSERT ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = match app.input_mode {
        InputMode::Editing => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" normal ", label_style),
        ],
        InputMode::Normal => {
            let mut hints = vec![
                Span::styled(" 1/2/3 ", key_style),
                Span::styled(" mode ", label_style),
                Span::styled(" Tab ", key_style),
                Span::styled(" focus ", label_style),
                Span::styled(" j/k ", key_style),
                Span::styled(" scroll ", label_style),
            ];
            if app.focus == FocusPane::Canvas && app.canvas.as_quiz().is_some() {
                hints.extend(vec![
                    Span::styled(" Enter ", key_style),
                    Span::styled(" answer ", label_style),
                ]);
            }
            hints.extend(vec![
                Span::styled(" i ", key_style),
                Span::styled(" type ", label_style),
                Span::styled(" q ", key_style),
                Span::styled(" quit ", label_style),
            ]);
            hints
        }
    };

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    spans.extend(hints);

    let footer = Paragraph::new(Line::from(spans));
    frame.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_styled_answer_line_bolds_paired_markers() {
        let line = styled_answer_line("a **b** c");
        assert_eq!(line.spans.len(), 3);
        assert_eq!(line.spans[1].content, "b");
        assert!(line.spans[1].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_styled_answer_line_unpaired_marker_is_literal() {
        let line = styled_answer_line("broken ** marker");
        assert_eq!(line.spans.len(), 1);
        assert_eq!(line.spans[0].content, "broken ** marker");
    }

    #[test]
    fn test_styled_answer_line_plain_text_passthrough() {
        let line = styled_answer_line("no markup here");
        assert_eq!(line.spans.len(), 1);
    }
}
