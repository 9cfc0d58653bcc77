use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::{
    app::App,
    diff::{Classification, Run},
    session::DisplayLabel,
};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;
const INPUT_HINT: &str = "Type the current line.";

fn run_style(class: Classification) -> Style {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    match class {
        Classification::Matched => bold.fg(Color::Green),
        Classification::Mismatched => bold.fg(Color::Red),
        Classification::Pending => bold,
    }
}

fn run_span(run: Run) -> Span<'static> {
    let text = match run.class {
        // a red blank is invisible
        Classification::Mismatched => run.text.replace(' ', "·"),
        _ => run.text,
    };
    Span::styled(text, run_style(run.class))
}

/// Rows needed to show `text` wrapped at `width` columns.
fn occupied_lines(text: &str, width: u16) -> u16 {
    if width == 0 {
        return 1;
    }
    let cols = text.width().max(1) as f64;
    (cols / width as f64).ceil().max(1.0) as u16
}

fn render_stat(title: &str, value: String, ratio: f64, color: Color, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    Paragraph::new(Line::from(vec![
        Span::styled(
            format!("{title} "),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(value),
    ]))
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    Gauge::default()
        .gauge_style(Style::default().fg(color))
        .ratio(ratio.clamp(0.0, 1.0))
        .label("")
        .render(chunks[1], buf);
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let feedback = &self.feedback;
        let metrics = &feedback.metrics;

        let inner_width = area.width.saturating_sub(HORIZONTAL_MARGIN * 2 + 2);
        let target_lines = occupied_lines(feedback.diff.reference(), inner_width);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(4),                // stats
                Constraint::Min(0),                   // spacer
                Constraint::Length(target_lines + 6), // typing card
                Constraint::Min(0),                   // spacer
                Constraint::Length(1),                // legend
            ])
            .split(area);

        // stats card
        let stats_block = Block::default().borders(Borders::ALL);
        let stats_area = stats_block.inner(chunks[0]);
        stats_block.render(chunks[0], buf);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ])
            .split(stats_area);

        render_stat(
            "Progress",
            format!("{}%", metrics.progress_percent()),
            metrics.progress,
            Color::Cyan,
            columns[0],
            buf,
        );
        render_stat(
            "Speed",
            format!("{:.0}/min", metrics.speed),
            metrics.speed_ratio(self.max_speed),
            Color::Magenta,
            columns[1],
            buf,
        );
        render_stat(
            "Accuracy",
            format!("{}%", metrics.accuracy_percent()),
            metrics.accuracy,
            Color::Green,
            columns[2],
            buf,
        );

        // typing card
        let typing_block = Block::default().borders(Borders::ALL);
        let typing_area = typing_block.inner(chunks[2]);
        typing_block.render(chunks[2], buf);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),            // label
                Constraint::Length(1),            // separator
                Constraint::Length(target_lines), // target line
                Constraint::Length(1),            // separator
                Constraint::Length(1),            // input
            ])
            .split(typing_area);

        let label_style = match feedback.label {
            DisplayLabel::InProgress { .. } => Style::default().add_modifier(Modifier::BOLD),
            DisplayLabel::AwaitingTrigger { .. } => Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            DisplayLabel::Finished => Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        };
        Paragraph::new(Span::styled(feedback.label.to_string(), label_style))
            .alignment(Alignment::Center)
            .render(rows[0], buf);

        let separator = "─".repeat(typing_area.width as usize);
        let dim = Style::default().add_modifier(Modifier::DIM);
        Paragraph::new(Span::styled(separator.clone(), dim)).render(rows[1], buf);
        Paragraph::new(Span::styled(separator, dim)).render(rows[3], buf);

        let spans = feedback
            .diff
            .runs()
            .into_iter()
            .map(run_span)
            .collect::<Vec<Span>>();
        Paragraph::new(Line::from(spans))
            .alignment(if target_lines == 1 {
                Alignment::Center
            } else {
                Alignment::Left
            })
            .wrap(Wrap { trim: false })
            .render(rows[2], buf);

        let input = if self.editor.text().is_empty() {
            Line::from(Span::styled(
                INPUT_HINT,
                Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC),
            ))
        } else {
            let cursor = self.editor.cursor();
            let before: String = self.editor.text().chars().take(cursor).collect();
            let at: String = self
                .editor
                .text()
                .chars()
                .nth(cursor)
                .map_or_else(|| " ".to_string(), |c| c.to_string());
            let after: String = self.editor.text().chars().skip(cursor + 1).collect();
            Line::from(vec![
                Span::raw(before),
                Span::styled(at, Style::default().add_modifier(Modifier::REVERSED)),
                Span::raw(after),
            ])
        };
        Paragraph::new(input).render(rows[4], buf);

        let legend = Paragraph::new(Span::styled(
            "(space/enter) next line / (ctrl+r) reset / (esc)ape",
            Style::default().add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center);
        legend.render(chunks[4], buf);
    }
}
