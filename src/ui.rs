use colourmatch::{
    clock::TimeSource,
    random::RandomSource,
    session::{Feedback, Phase},
};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget, Wrap},
};

use crate::App;

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;

impl<T: TimeSource, R: RandomSource> Widget for &App<T, R> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.machine.phase() {
            Phase::Idle => render_start(self, area, buf),
            Phase::Ended => render_end(self, area, buf),
            _ => render_slide(self, area, buf),
        }
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

/// Title block centred vertically, with `lines` underneath
fn render_centred(title: &str, lines: Vec<Line>, footer: Line, area: Rect, buf: &mut Buffer) {
    let body_height = lines.len() as u16 + 2;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(area.height.saturating_sub(body_height + 2) / 2),
            Constraint::Length(2),
            Constraint::Length(body_height),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    Paragraph::new(Span::styled(title, bold().fg(Color::White)))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[2], buf);
    Paragraph::new(footer)
        .alignment(Alignment::Center)
        .render(chunks[4], buf);
}

fn status_line<T: TimeSource, R: RandomSource>(app: &App<T, R>) -> Line<'static> {
    match &app.status {
        Some(s) => Line::from(Span::styled(s.clone(), dim().add_modifier(Modifier::ITALIC))),
        None => Line::default(),
    }
}

fn render_start<T: TimeSource, R: RandomSource>(app: &App<T, R>, area: Rect, buf: &mut Buffer) {
    let m = &app.machine;
    let lines = vec![
        Line::from(Span::styled("Press Enter to begin", Style::default().fg(Color::Gray))),
        Line::from(Span::styled(
            format!(
                "{} slides, {} colours, {}s per slide",
                m.prompts().len(),
                m.pool().len(),
                m.remaining_secs()
            ),
            dim(),
        )),
    ];
    render_centred("COLOUR MATCH TASK", lines, status_line(app), area, buf);
}

fn render_end<T: TimeSource, R: RandomSource>(app: &App<T, R>, area: Rect, buf: &mut Buffer) {
    let summary = app.machine.summary().unwrap_or_default();
    let lines = vec![
        Line::from(format!("Questions answered: {}", summary.answered)),
        Line::from(format!("Accuracy: {}%", summary.percentage)),
        Line::default(),
        Line::from(Span::styled(
            "(r)estart / (s)ave log / (esc)ape",
            dim().add_modifier(Modifier::ITALIC),
        )),
    ];
    render_centred("END OF TASK", lines, status_line(app), area, buf);
}

fn render_slide<T: TimeSource, R: RandomSource>(app: &App<T, R>, area: Rect, buf: &mut Buffer) {
    let m = &app.machine;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // slide counter, timer, feedback
            Constraint::Min(3),    // prompt card
            Constraint::Length(3), // palette
            Constraint::Length(1), // used colours
            Constraint::Length(1), // controls
            Constraint::Length(1), // status
        ])
        .split(area);

    let header = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(20), Constraint::Length(2)])
        .split(chunks[0]);

    Paragraph::new(Span::styled(
        format!("Slide {} / {}", m.slide_index() + 1, m.prompts().len()),
        dim(),
    ))
    .render(header[0], buf);

    Paragraph::new(Span::styled(format!("Time left: {}s", m.remaining_secs()), bold()))
        .alignment(Alignment::Right)
        .render(header[1], buf);

    if let Some(feedback) = m.feedback() {
        let symbol = match feedback {
            Feedback::Cross => Span::styled("✖", bold().fg(Color::Red)),
            Feedback::Tick => Span::styled("✔", bold().fg(Color::Green)),
        };
        Paragraph::new(symbol)
            .alignment(Alignment::Right)
            .render(header[2], buf);
    }

    let card = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = card.inner(chunks[1]);
    card.render(chunks[1], buf);
    let pad = inner.height.saturating_sub(1) / 2;
    let prompt_area = Rect {
        y: inner.y + pad,
        height: inner.height.min(1),
        ..inner
    };
    Paragraph::new(Span::styled(m.prompt().to_uppercase(), bold().fg(Color::White)))
        .alignment(Alignment::Center)
        .render(prompt_area, buf);

    render_palette(app, chunks[2], buf);

    let pool = m.pool();
    Paragraph::new(Span::styled(
        format!("Used colours: {} / {}", pool.consumed_count(), pool.len()),
        dim(),
    ))
    .alignment(Alignment::Right)
    .render(chunks[3], buf);

    let agree_style = if m.can_confirm() {
        bold().fg(Color::Green)
    } else {
        dim()
    };
    Paragraph::new(Line::from(vec![
        Span::styled(format!("(1-{}) choose  ", pool.len()), dim()),
        Span::styled("(enter) all agree", agree_style),
        Span::styled("  (s)ave  (esc)ape", dim()),
    ]))
    .alignment(Alignment::Center)
    .render(chunks[4], buf);

    Paragraph::new(status_line(app))
        .alignment(Alignment::Center)
        .render(chunks[5], buf);
}

fn render_palette<T: TimeSource, R: RandomSource>(app: &App<T, R>, area: Rect, buf: &mut Buffer) {
    let m = &app.machine;
    let options = m.pool().options();
    if options.is_empty() {
        return;
    }
    let tiles = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, options.len() as u32); options.len()])
        .split(area);

    for (option, tile) in options.iter().zip(tiles.iter()) {
        let selected = m.selection() == Some(option.id);
        let (fill, label) = if option.consumed {
            (Color::DarkGray, "·".to_string())
        } else {
            let (r, g, b) = option.rgb;
            (Color::Rgb(r, g, b), (option.id + 1).to_string())
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(if selected {
                BorderType::Double
            } else {
                BorderType::Plain
            })
            .border_style(if selected {
                bold().fg(Color::White)
            } else {
                Style::default().fg(Color::Gray)
            })
            .style(Style::default().bg(fill));

        Paragraph::new(Span::styled(label, bold().fg(Color::Black)))
            .alignment(Alignment::Center)
            .block(block)
            .render(*tile, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colourmatch::{clock::ManualTime, config::Config, random::ScriptedRandom};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::{backend::TestBackend, Terminal};

    fn create_test_app(draws: Vec<f64>) -> (App<ManualTime, ScriptedRandom>, ManualTime) {
        let dir = std::env::temp_dir().join("colourmatch-ui-tests");
        let config = Config {
            log_dir: Some(dir),
            ..Config::default()
        };
        let time = ManualTime::new();
        (App::new(&config, time.clone(), ScriptedRandom::new(draws)), time)
    }

    fn press(app: &mut App<ManualTime, ScriptedRandom>, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn tick(app: &mut App<ManualTime, ScriptedRandom>) {
        if let Some(progress) = app.machine.tick() {
            app.on_progress(progress);
        }
    }

    fn render(app: &App<ManualTime, ScriptedRandom>, width: u16, height: u16) -> String {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| f.render_widget(app, f.area())).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_start_screen() {
        let (app, _) = create_test_app(vec![]);
        let content = render(&app, 80, 24);
        assert!(content.contains("COLOUR MATCH TASK"));
        assert!(content.contains("Press Enter to begin"));
        assert!(content.contains("8 slides, 8 colours, 15s per slide"));
    }

    #[test]
    fn test_slide_screen_shows_prompt_and_timer() {
        let (mut app, time) = create_test_app(vec![]);
        press(&mut app, KeyCode::Enter);
        time.advance(2_500);

        let content = render(&app, 100, 20);
        assert!(content.contains("MATHEMATICS"));
        assert!(content.contains("Time left: 13s"));
        assert!(content.contains("Slide 1 / 8"));
        assert!(content.contains("Used colours: 0 / 8"));
    }

    #[test]
    fn test_consumed_tiles_lose_their_number() {
        let (mut app, time) = create_test_app(vec![]);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('5'));
        press(&mut app, KeyCode::Enter);
        time.advance(100);
        tick(&mut app);

        let content = render(&app, 100, 20);
        assert!(content.contains("ENGLISH"));
        assert!(content.contains("Used colours: 1 / 8"));
        assert!(content.contains('·'));
    }

    #[test]
    fn test_feedback_symbol_during_transition() {
        // correctness draw, then 0.1 => cross
        let (mut app, _) = create_test_app(vec![0.3, 0.1]);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('1'));
        press(&mut app, KeyCode::Enter);
        let content = render(&app, 100, 20);
        assert!(content.contains('✖'));
    }

    #[test]
    fn test_end_screen_shows_summary() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            prompts: vec!["Only".into()],
            log_dir: Some(dir.path().to_path_buf()),
            ..Config::default()
        };
        let time = ManualTime::new();
        let mut app = App::new(&config, time.clone(), ScriptedRandom::new(vec![0.1]));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('2'));
        press(&mut app, KeyCode::Enter);
        time.advance(100);
        tick(&mut app);

        let content = render(&app, 80, 24);
        assert!(content.contains("END OF TASK"));
        assert!(content.contains("Questions answered: 1"));
        assert!(content.contains("Accuracy: 100%"));
    }

    #[test]
    fn test_renders_in_tiny_area_without_panic() {
        let (mut app, _) = create_test_app(vec![]);
        render(&app, 10, 3);
        press(&mut app, KeyCode::Enter);
        render(&app, 10, 3);
        render(&app, 1, 1);
    }
}
