use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::params::{GenerateForm, ParameterKind, ParameterValue};
use crate::ui::renderfns::truncate;

/// Draw the generation form: one row per parameter, rendered by kind.
pub fn draw_generate(frame: &mut Frame, area: Rect, form: &GenerateForm) {
  let block = Block::default()
    .title(format!(" Generate ({}) ", form.genre()))
    .title_alignment(Alignment::Center)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Blue));

  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(form.specs().len() as u16 + 2),
      Constraint::Min(1),
    ])
    .split(block.inner(area));
  frame.render_widget(block, area);

  let rows: Vec<Line> = form
    .specs()
    .iter()
    .zip(form.values())
    .enumerate()
    .map(|(at, (spec, value))| {
      let is_selected = at == form.selected();
      let marker = if is_selected { "> " } else { "  " };
      let label_style = if is_selected {
        Style::default().fg(Color::Cyan).bold()
      } else {
        Style::default().fg(Color::White)
      };

      let mut spans = vec![
        Span::raw(marker),
        Span::styled(format!("{:<20}", spec.label), label_style),
      ];
      spans.extend(control_spans(
        &spec.kind,
        value,
        is_selected,
        form.option_cursor(),
      ));
      Line::from(spans)
    })
    .collect();

  frame.render_widget(Paragraph::new(rows), chunks[0]);

  let status = status_lines(form);
  frame.render_widget(
    Paragraph::new(status).wrap(Wrap { trim: false }),
    chunks[1],
  );
}

/// Render one control's value by kind.
fn control_spans(
  kind: &ParameterKind,
  value: &ParameterValue,
  is_selected: bool,
  option_cursor: usize,
) -> Vec<Span<'static>> {
  match (kind, value) {
    (ParameterKind::Slider { min, max, .. }, ParameterValue::Number(n)) => {
      let width = 20i64;
      let filled = ((n - min) * width / (max - min).max(1)).clamp(0, width) as usize;
      vec![
        Span::styled(
          format!("[{}{}]", "#".repeat(filled), "-".repeat(20 - filled)),
          Style::default().fg(Color::Green),
        ),
        Span::raw(format!(" {n}")),
      ]
    }
    (ParameterKind::Dropdown { .. }, ParameterValue::Choice(choice))
    | (ParameterKind::Radio { .. }, ParameterValue::Choice(choice)) => {
      vec![Span::styled(
        format!("< {choice} >"),
        Style::default().fg(Color::Yellow),
      )]
    }
    (ParameterKind::Toggle, ParameterValue::Flag(on)) => {
      vec![Span::styled(
        if *on { "[on]" } else { "[off]" }.to_string(),
        Style::default().fg(if *on { Color::Green } else { Color::DarkGray }),
      )]
    }
    (ParameterKind::Checkbox { options }, ParameterValue::Selections(picked)) => options
      .iter()
      .enumerate()
      .map(|(at, option)| {
        let mark = if picked.iter().any(|p| p == option) {
          "[x]"
        } else {
          "[ ]"
        };
        let style = if is_selected && at == option_cursor {
          Style::default().fg(Color::Cyan).bold()
        } else {
          Style::default().fg(Color::White)
        };
        Span::styled(format!("{mark} {option}  "), style)
      })
      .collect(),
    _ => vec![Span::raw("?".to_string())],
  }
}

fn status_lines(form: &GenerateForm) -> Vec<Line<'static>> {
  let mut lines = vec![Line::from(Span::styled(
    "j/k: row  h/l: adjust  space: toggle  r: randomize  Enter: generate",
    Style::default().fg(Color::DarkGray),
  ))];

  if form.is_submitting() {
    lines.push(Line::from(Span::styled(
      "Generating...",
      Style::default().fg(Color::Yellow),
    )));
  } else if let Some(error) = form.error() {
    lines.push(Line::from(Span::styled(
      format!("Error: {error}"),
      Style::default().fg(Color::Red),
    )));
  } else if let Some(story) = form.result() {
    lines.push(Line::raw(""));
    lines.push(Line::from(vec![
      Span::styled(
        format!("{} ", story.title),
        Style::default().fg(Color::Green).bold(),
      ),
      Span::styled(
        format!("({})", story.id),
        Style::default().fg(Color::DarkGray),
      ),
    ]));
    lines.push(Line::raw(truncate(&story.content, 600)));
    lines.push(Line::from(Span::styled(
      "Refresh the library (:refresh) to see it listed.",
      Style::default().fg(Color::DarkGray),
    )));
  }

  lines
}
