use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

use boutique_chat::transcript::ChatRole;

use crate::app::{App, InputMode, Mode};

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, mode tabs, body, footer
    let [header_area, tabs_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(frame, header_area);
    render_tabs(app, frame, tabs_area);

    match app.mode {
        Mode::General => render_general(app, frame, body_area),
        Mode::Shopping => render_shopping(app, frame, body_area),
        Mode::Contact => render_contact(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);
}

fn render_header(frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" Boutique Chat ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_tabs(app: &App, frame: &mut Frame, area: Rect) {
    let mut spans: Vec<Span> = Vec::new();
    for (i, mode) in Mode::all().into_iter().enumerate() {
        let style = if mode == app.mode {
            Style::default().bg(Color::Blue).fg(Color::White).bold()
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!(" [{}] {} ", i + 1, mode.label()), style));
        spans.push(Span::raw(" "));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Transcript entries as styled lines, plus the loading indicator
fn chat_lines(app: &App) -> Vec<Line<'_>> {
    let mut lines: Vec<Line> = Vec::new();

    for message in app.active_transcript().entries() {
        match message.role {
            ChatRole::User => {
                lines.push(Line::from(Span::styled(
                    "You:",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(message.content.as_str()));
                lines.push(Line::default());
            }
            ChatRole::Assistant => {
                lines.push(Line::from(Span::styled(
                    "Bot:",
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                )));
                if message.is_product {
                    lines.push(Line::from(Span::styled(
                        format!("• {}", message.content),
                        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                    )));
                } else {
                    for line in message.content.lines() {
                        lines.push(Line::from(line));
                    }
                }
                lines.push(Line::default());
            }
        }
    }

    if app.loading {
        lines.push(Line::from(Span::styled(
            "Bot:",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    lines
}

fn render_chat_pane(app: &mut App, frame: &mut Frame, area: Rect, title: &str) {
    // Store chat area dimensions for scroll calculations (inner size minus borders)
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(title.to_string());

    let lines = chat_lines(app);
    let text = if lines.is_empty() {
        Text::from(Span::styled(
            "Say hello...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Text::from(lines)
    };

    let chat = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_general(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(area);

    render_chat_pane(app, frame, chat_area, " Chat ");

    let input_border_color = if app.input_mode == InputMode::Editing {
        Color::Yellow
    } else {
        Color::DarkGray
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(input_border_color))
        .title(" Message (i to type, Enter to send) ");

    // Horizontal scrolling keeps the cursor visible in a narrow box
    let inner_width = input_area.width.saturating_sub(2) as usize;
    let cursor_pos = app.chat_cursor;

    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app
        .chat_input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);

    frame.render_widget(input, input_area);

    if app.input_mode == InputMode::Editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((input_area.x + cursor_x + 1, input_area.y + 1));
    }
}

fn render_shopping(app: &mut App, frame: &mut Frame, area: Rect) {
    let picker_height = (app.flow.choices().len().min(5) + 2) as u16;
    let [chat_area, picker_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(picker_height.max(3)),
    ])
    .areas(area);

    render_chat_pane(app, frame, chat_area, " Shopping Assistant ");

    let picker_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if app.loading {
            Color::DarkGray
        } else {
            Color::Cyan
        }))
        .title(" Options (j/k to move, Enter to pick) ");

    if app.flow.choices().is_empty() {
        let placeholder = if app.loading { "Loading..." } else { "No options available" };
        let empty = Paragraph::new(placeholder)
            .style(Style::default().fg(Color::DarkGray))
            .block(picker_block);
        frame.render_widget(empty, picker_area);
        return;
    }

    let items: Vec<ListItem> = app
        .flow
        .choices()
        .iter()
        .map(|choice| ListItem::new(format!(" {} ", choice.label())))
        .collect();

    let list = List::new(items)
        .block(picker_block)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, picker_area, &mut app.picker_state);
}

fn render_contact(app: &App, frame: &mut Frame, area: Rect) {
    let contact = &app.config.contact;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Contact Information ");

    let text = Text::from(vec![
        Line::default(),
        Line::from(vec![
            Span::styled("  Address: ", Style::default().fg(Color::Cyan).bold()),
            Span::raw(contact.address.as_str()),
        ]),
        Line::from(vec![
            Span::styled("  Phone:   ", Style::default().fg(Color::Cyan).bold()),
            Span::raw(contact.phone.as_str()),
        ]),
        Line::from(vec![
            Span::styled("  Email:   ", Style::default().fg(Color::Cyan).bold()),
            Span::raw(contact.email.as_str()),
        ]),
    ]);

    frame.render_widget(Paragraph::new(text).block(block), area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mut hints = vec![
        Span::styled(" 1/2/3 ", key_style),
        Span::styled(" mode ", label_style),
    ];

    match (app.mode, app.input_mode) {
        (Mode::General, InputMode::Normal) => hints.extend(vec![
            Span::styled(" i ", key_style),
            Span::styled(" type ", label_style),
            Span::styled(" j/k ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ]),
        (Mode::General, InputMode::Editing) => hints.extend(vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" done ", label_style),
        ]),
        (Mode::Shopping, _) => hints.extend(vec![
            Span::styled(" j/k ", key_style),
            Span::styled(" options ", label_style),
            Span::styled(" Enter ", key_style),
            Span::styled(" pick ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ]),
        (Mode::Contact, _) => hints.extend(vec![
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ]),
    }

    frame.render_widget(Paragraph::new(Line::from(hints)), area);
}
