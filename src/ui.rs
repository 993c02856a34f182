use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::clock::Clock;
use crate::countdown::{format_time, Countdown};
use crate::editor::{Editor, Focus};
use crate::flow::{Notice, NoticeLevel, Stage};
use crate::log_form::LogForm;
use crate::model::Document;

const PURPLE: Color = Color::Rgb(0x6D, 0x28, 0xD9);
const LAVENDER: Color = Color::Rgb(0xF5, 0xF3, 0xFF);
const INK: Color = Color::Rgb(0x11, 0x18, 0x27);

pub fn draw<C: Clock>(f: &mut Frame, app: &App<C>) {
    let session = &app.session;
    let doc = session.doc();

    match session.stage() {
        Stage::Editor { editor, .. } => draw_editor(f, doc, editor),
        stage => {
            draw_idle(f, doc, session.next_reminder_in().map(|d| d.as_secs()));
            match stage {
                Stage::Reminder => draw_reminder(f, doc),
                Stage::MinutesPrompt { input } => draw_minutes(f, input),
                Stage::Countdown(countdown) if countdown.is_hidden() => draw_badge(f, countdown),
                Stage::Countdown(countdown) => draw_countdown(f, countdown),
                Stage::LogForm(form) => draw_log_form(f, form),
                _ => {}
            }
        }
    }

    if let Some(notice) = session.notice() {
        draw_notice(f, notice);
    }
}

fn draw_idle(f: &mut Frame, doc: &Document, next_in: Option<u64>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(f.size());

    let next = match next_in {
        Some(secs) => format!("Next reminder in {}", format_time(secs)),
        None => "No reminder scheduled".to_string(),
    };
    let lines = vec![
        Line::from(Span::styled(next, Style::default().add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(format!("{} active item(s) on your reading list", doc.active.len())),
    ];
    let body = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("readnudge"))
        .wrap(Wrap { trim: true });
    f.render_widget(body, chunks[0]);

    draw_help(f, chunks[1], "e: Edit reading list | q: Quit");
}

fn draw_reminder(f: &mut Frame, doc: &Document) {
    let area = centered_rect(70, 60, f.size());
    f.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(Span::styled(
            "Reminder to read!",
            Style::default().fg(INK).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Current reading list:",
            Style::default().fg(INK).add_modifier(Modifier::BOLD),
        )),
    ];
    lines.extend(reading_list_text(doc).lines().map(|l| Line::from(l.to_string())));
    lines.push(Line::from(""));
    lines.push(button_row(&[("Enter", "Start reading"), ("Esc", "Close")]));

    let popup = Paragraph::new(lines)
        .block(purple_block("Reminder to read!"))
        .style(Style::default().bg(LAVENDER).fg(INK))
        .wrap(Wrap { trim: false });
    f.render_widget(popup, area);
}

/// Numbered list shown in the reminder.
pub fn reading_list_text(doc: &Document) -> String {
    if doc.active.is_empty() {
        return "No active items.\n\n(Use the editor after your next timer to add items.)"
            .to_string();
    }
    doc.active
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item.display_line()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn draw_minutes(f: &mut Frame, input: &str) {
    let area = centered_rect(50, 30, f.size());
    f.render_widget(Clear, area);
    let lines = vec![
        Line::from(Span::styled(
            "How many minutes do you want to read?",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![Span::raw("Minutes: "), input_span(input, true)]),
        Line::from(""),
        button_row(&[("Enter", "Start"), ("Esc", "Cancel")]),
    ];
    let popup = Paragraph::new(lines).block(purple_block("Set timer"));
    f.render_widget(popup, area);
}

fn draw_countdown(f: &mut Frame, countdown: &Countdown) {
    let area = centered_rect(50, 40, f.size());
    f.render_widget(Clear, area);
    let block = purple_block("Reading Timer");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(inner);

    f.render_widget(
        Paragraph::new("Reading timer running").style(Style::default().add_modifier(Modifier::BOLD)),
        rows[0],
    );
    f.render_widget(
        Paragraph::new(format_time(countdown.remaining()))
            .alignment(Alignment::Center)
            .style(Style::default().fg(PURPLE).add_modifier(Modifier::BOLD)),
        rows[1],
    );
    f.render_widget(
        Gauge::default()
            .block(Block::default().borders(Borders::ALL))
            .gauge_style(Style::default().fg(PURPLE))
            .ratio(countdown.progress().clamp(0.0, 1.0)),
        rows[2],
    );
    f.render_widget(
        Paragraph::new(button_row(&[("s", "Stop"), ("h", "Hide")])),
        rows[3],
    );
}

/// Small always-visible restore box for a hidden countdown.
fn draw_badge(f: &mut Frame, countdown: &Countdown) {
    let screen = f.size();
    let width = 46.min(screen.width);
    let area = Rect::new(screen.x + screen.width - width, screen.y, width, 3.min(screen.height));
    f.render_widget(Clear, area);
    let text = Line::from(vec![
        Span::raw(format!("Reading timer running… {} ", format_time(countdown.remaining()))),
        Span::styled("[t] Show", Style::default().fg(PURPLE).add_modifier(Modifier::BOLD)),
    ]);
    f.render_widget(
        Paragraph::new(text).block(Block::default().borders(Borders::ALL).title("Timer")),
        area,
    );
}

fn draw_log_form(f: &mut Frame, form: &LogForm) {
    let area = centered_rect(60, 60, f.size());
    f.render_widget(Clear, area);
    let block = purple_block("Log your reading");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(3),
            Constraint::Length(2),
            Constraint::Length(1),
        ])
        .split(inner);

    f.render_widget(
        Paragraph::new("Great job! Log what you read:")
            .style(Style::default().add_modifier(Modifier::BOLD)),
        rows[0],
    );

    let items: Vec<ListItem> = form
        .titles()
        .iter()
        .map(|t| ListItem::new(t.as_str()))
        .collect();
    let titles = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("What you read"))
        .highlight_style(Style::default().bg(PURPLE).fg(Color::White))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    state.select(form.selected());
    f.render_stateful_widget(titles, rows[1], &mut state);

    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::raw("Last page read: "),
            input_span(&form.page_input, true),
        ])),
        rows[2],
    );
    f.render_widget(
        Paragraph::new(button_row(&[
            ("Up/Down", "Choose"),
            ("Enter", "Submit"),
            ("Esc", "Cancel"),
        ])),
        rows[3],
    );
}

fn draw_editor(f: &mut Frame, doc: &Document, editor: &Editor) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),
            Constraint::Length(5),
            Constraint::Length(3),
        ])
        .split(f.size());

    let items: Vec<ListItem> = doc
        .active
        .iter()
        .map(|item| ListItem::new(item.display_line()))
        .collect();
    let list_title = if editor.focus == Focus::List {
        "Active reading list *"
    } else {
        "Active reading list"
    };
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(list_title))
        .highlight_style(Style::default().bg(Color::White).fg(Color::Black));
    let mut state = ListState::default();
    state.select(editor.selected());
    f.render_stateful_widget(list, chunks[0], &mut state);

    let form_title = if editor.is_new_item() {
        "New item"
    } else {
        "Selected item"
    };
    let form = Paragraph::new(vec![
        field_line("Title:     ", &editor.title, editor.focus == Focus::Title),
        field_line("Last page: ", &editor.page, editor.focus == Focus::Page),
        field_line(
            "Type:      ",
            &format!("< {} >", editor.kind),
            editor.focus == Focus::Kind,
        ),
    ])
    .block(Block::default().borders(Borders::ALL).title(form_title));
    f.render_widget(form, chunks[1]);

    let help = if editor.focus == Focus::List {
        "j/k: Select | Enter: Edit | a: Add new | r: Remove | c: Mark completed | o: Open list | Tab: Form | Esc: Close"
    } else {
        "Type to edit | Left/Right: Type | Tab: Next field | Enter: Save | Esc: Back to list"
    };
    draw_help(f, chunks[2], help);
}

fn draw_notice(f: &mut Frame, notice: &Notice) {
    let area = centered_rect(50, 25, f.size());
    f.render_widget(Clear, area);
    let color = match notice.level {
        NoticeLevel::Info => Color::Cyan,
        NoticeLevel::Error => Color::Red,
    };
    let mut lines: Vec<Line> = notice
        .body
        .lines()
        .map(|l| Line::from(l.to_string()))
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Press any key",
        Style::default().fg(Color::DarkGray),
    )));
    let popup = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(notice.heading.as_str()),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(popup, area);
}

fn draw_help(f: &mut Frame, area: Rect, text: &str) {
    let help = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(Color::DarkGray));
    f.render_widget(help, area);
}

fn purple_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(PURPLE))
        .title(Span::styled(
            title,
            Style::default().fg(PURPLE).add_modifier(Modifier::BOLD),
        ))
}

fn button_row(buttons: &[(&str, &str)]) -> Line<'static> {
    let mut spans = Vec::new();
    for (key, label) in buttons {
        spans.push(Span::styled(
            format!(" [{}] {} ", key, label),
            Style::default().bg(PURPLE).fg(Color::White).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw("  "));
    }
    Line::from(spans)
}

fn input_span(value: &str, focused: bool) -> Span<'static> {
    let style = if focused {
        Style::default().add_modifier(Modifier::UNDERLINED)
    } else {
        Style::default()
    };
    Span::styled(format!("{}_", value), style)
}

fn field_line(label: &str, value: &str, focused: bool) -> Line<'static> {
    let label_style = if focused {
        Style::default().fg(PURPLE).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    Line::from(vec![
        Span::styled(label.to_string(), label_style),
        if focused {
            input_span(value, true)
        } else {
            Span::raw(value.to_string())
        },
    ])
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::flow::Session;
    use crate::settings::Settings;
    use ratatui::{backend::TestBackend, Terminal};
    use std::time::Duration;
    use tempfile::TempDir;

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer.get(x, y).symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn reminder_list_text() {
        assert_eq!(
            reading_list_text(&Document::seeded()),
            "1. Preacher Man  —  page 0  (book)\n\
             2. Farnam Street  —  page 0  (blog)\n\
             3. Example Article: Notes on Learning  —  page 0  (article)"
        );
        assert!(reading_list_text(&Document::default()).starts_with("No active items."));
    }

    #[test]
    fn renders_reminder_over_idle() {
        let dir = TempDir::new().unwrap();
        let session = Session::start(&Settings::rooted_at(dir.path()), ManualClock::new()).unwrap();
        let mut app = App::new(session);
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();

        terminal.draw(|f| draw(f, &app)).unwrap();
        assert!(screen_text(&terminal).contains("Next reminder in 20:00"));

        app.session.clock().advance(Duration::from_secs(20 * 60));
        app.on_tick();
        terminal.draw(|f| draw(f, &app)).unwrap();
        let text = screen_text(&terminal);
        assert!(text.contains("Current reading list:"));
        assert!(text.contains("Preacher Man"));
    }
}
