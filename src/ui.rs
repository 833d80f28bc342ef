pub mod charting;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Axis, Chart, Dataset, GraphType, LineGauge, Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

use rampread::{ramp::Mode, time_series::compress};

use crate::{App, AppState};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

/// Index of the character the eye should fixate on
pub fn pivot_index(word: &str) -> usize {
    match word.chars().count() {
        0..=1 => 0,
        2..=5 => 1,
        6..=9 => 2,
        10..=13 => 3,
        _ => 4,
    }
}

/// Split `word` around its pivot character
fn split_at_pivot(word: &str) -> (String, String, String) {
    let pivot = pivot_index(word);
    let mut before = String::new();
    let mut focus = String::new();
    let mut after = String::new();
    for (idx, c) in word.chars().enumerate() {
        match idx.cmp(&pivot) {
            std::cmp::Ordering::Less => before.push(c),
            std::cmp::Ordering::Equal => focus.push(c),
            std::cmp::Ordering::Greater => after.push(c),
        }
    }
    (before, focus, after)
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Reading => render_reading(self, area, buf),
            AppState::Results => render_results(self, area, buf),
        }
    }
}

fn render_reading(app: &App, area: Rect, buf: &mut Buffer) {
    let reader = &app.reader;
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_style = Style::default().add_modifier(Modifier::DIM);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(1), // guide
            Constraint::Length(1), // word
            Constraint::Length(1), // guide
            Constraint::Length(1), // notice
            Constraint::Min(0),
            Constraint::Length(1), // status
            Constraint::Length(1), // document progress
            Constraint::Length(1), // legend
        ])
        .split(area);

    let word_area = chunks[2];
    let center = word_area.width / 2;
    let guide_style = if reader.is_paused() {
        dim_style
    } else {
        Style::default().fg(Color::DarkGray)
    };
    for guide in [chunks[1], chunks[3]] {
        if guide.width > center {
            buf.set_string(guide.x + center, guide.y, "│", guide_style);
        }
    }

    let word_line = match reader.current() {
        Some(token) if token.is_paragraph_break() => {
            Line::from(Span::styled(token.text.clone(), dim_style)).alignment(Alignment::Center)
        }
        Some(token) => {
            let (before, focus, after) = split_at_pivot(&token.text);
            let pad = (center as usize).saturating_sub(before.width());
            let (word_style, focus_style) = if reader.is_paused() {
                (dim_style, dim_style)
            } else {
                (bold_style, bold_style.fg(Color::Red))
            };
            Line::from(vec![
                Span::raw(" ".repeat(pad)),
                Span::styled(before, word_style),
                Span::styled(focus, focus_style),
                Span::styled(after, word_style),
            ])
        }
        None => Line::from(Span::styled("ready", dim_style)).alignment(Alignment::Center),
    };
    Paragraph::new(word_line).render(word_area, buf);

    let notice = if reader.is_paused() {
        Some("paused")
    } else {
        reader.notice()
    };
    if let Some(notice) = notice {
        Paragraph::new(Span::styled(notice, italic_style.fg(Color::Cyan)))
            .alignment(Alignment::Center)
            .render(chunks[4], buf);
    }

    let control = reader.control();
    let state = control.state();
    let mut status = format!("{}  {} wpm", control.mode(), state.current_speed);
    if control.mode() != Mode::Fixed {
        status.push_str(&format!(
            "  {}  ramp {:.0}%",
            state.phase,
            control.progress()
        ));
    }
    if control.is_ramp_frozen() {
        status.push_str("  [frozen]");
    }
    if state.is_paused && !reader.is_paused() {
        status.push_str("  [held]");
    }
    Paragraph::new(Span::styled(status, bold_style))
        .alignment(Alignment::Center)
        .render(chunks[6], buf);

    let session = reader.session();
    LineGauge::default()
        .ratio(session.fraction_read().clamp(0.0, 1.0))
        .label(format!(
            "{}/{}",
            session.position(),
            session.document().len()
        ))
        .filled_style(Style::default().fg(Color::Magenta))
        .render(chunks[7], buf);

    Paragraph::new(Span::styled(
        "(space) pause / (←→) jump / (↑↓) speed / (m)ode / (f)reeze / (r)estart / (esc)ape",
        italic_style,
    ))
    .render(chunks[8], buf);
}

fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let reader = &app.reader;
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);
    let magenta_style = Style::default().fg(Color::Magenta);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),    // chart
            Constraint::Length(1), // stats
            Constraint::Length(1), // session details
            Constraint::Length(1), // padding
            Constraint::Length(1), // legend
        ])
        .split(area);

    let samples = compress(reader.session().samples());
    let bounds = charting::compute_chart_params(&samples);
    let points: Vec<(f64, f64)> = samples.iter().map(|&s| s.into()).collect();

    let datasets = vec![Dataset::default()
        .marker(ratatui::symbols::Marker::Braille)
        .style(magenta_style)
        .graph_type(GraphType::Line)
        .data(&points)];

    Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("seconds")
                .bounds([0.0, bounds.duration])
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled(charting::format_label(bounds.duration), bold_style),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("wpm")
                .bounds([bounds.floor_wpm, bounds.ceil_wpm])
                .labels(vec![
                    Span::styled(charting::format_label(bounds.floor_wpm), bold_style),
                    Span::styled(charting::format_label(bounds.ceil_wpm), bold_style),
                ]),
        )
        .render(chunks[0], buf);

    let summary = reader.summary();
    Paragraph::new(Span::styled(
        format!(
            "{:.0} wpm avg   {:.0} peak   {:.2} sd",
            summary.average_wpm, summary.peak_wpm, summary.std_dev
        ),
        bold_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    let started = summary
        .started
        .map(|at| at.format("%H:%M").to_string())
        .unwrap_or_else(|| "-".to_string());
    Paragraph::new(Span::styled(
        format!(
            "{} words in {:.0}s   {} mode   started {}",
            summary.words_shown,
            summary.elapsed.as_secs_f64(),
            reader.control().mode(),
            started
        ),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    Paragraph::new(Span::styled("(r)estart / (esc)ape", italic_style)).render(chunks[4], buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rampread::{config::Settings, document::Document, ramp::FixedConfig};
    use ratatui::{backend::TestBackend, Terminal};

    fn app(text: &str) -> App {
        let settings = Settings {
            fixed: FixedConfig { speed: 400 },
            ..Settings::default()
        };
        App::new(Document::parse(text), settings)
    }

    fn rendered(app: &App, width: u16, height: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn pivot_follows_word_length() {
        assert_eq!(pivot_index("a"), 0);
        assert_eq!(pivot_index("word"), 1);
        assert_eq!(pivot_index("reading"), 2);
        assert_eq!(pivot_index("accelerated"), 3);
        assert_eq!(pivot_index("incomprehensibly"), 4);
    }

    #[test]
    fn split_handles_multibyte() {
        assert_eq!(
            split_at_pivot("naïve"),
            ("n".to_string(), "a".to_string(), "ïve".to_string())
        );
        assert_eq!(split_at_pivot(""), (String::new(), String::new(), String::new()));
    }

    #[test]
    fn reading_screen_shows_word_and_status() {
        let mut app = app("hello world");
        app.reader.start();
        let screen = rendered(&app, 80, 24);
        assert!(screen.contains("hello"));
        assert!(screen.contains("fixed  400 wpm"));
    }

    #[test]
    fn pivot_character_is_centered() {
        let mut app = app("reading");
        app.reader.start();
        let area = Rect::new(0, 0, 80, 24);
        let mut buffer = Buffer::empty(area);
        (&app).render(area, &mut buffer);

        // "reading" pivots on 'a'; the word row sits below the top guide
        let center_x = HORIZONTAL_MARGIN + (80 - 2 * HORIZONTAL_MARGIN) / 2;
        let row = (0..24)
            .find(|&y| buffer[(center_x, y)].symbol() == "│")
            .map(|y| y + 1)
            .unwrap();
        assert_eq!(buffer[(center_x, row)].symbol(), "a");
        assert_eq!(buffer[(center_x, row)].fg, Color::Red);
    }

    #[test]
    fn paused_reader_says_so() {
        let mut app = app("one two");
        app.reader.start();
        app.reader.toggle_pause();
        assert!(rendered(&app, 80, 24).contains("paused"));
    }

    #[test]
    fn results_screen_has_summary() {
        let mut app = app("one two");
        app.reader.start();
        app.reader.skip();
        app.state = AppState::Results;
        let screen = rendered(&app, 80, 24);
        assert!(screen.contains("wpm avg"));
        assert!(screen.contains("(r)estart"));
    }

    #[test]
    fn renders_in_tiny_terminal() {
        let mut app = app("word");
        app.reader.start();
        let backend = TestBackend::new(20, 6);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| f.render_widget(&app, f.area())).unwrap();
        app.state = AppState::Results;
        terminal.draw(|f| f.render_widget(&app, f.area())).unwrap();
    }
}
