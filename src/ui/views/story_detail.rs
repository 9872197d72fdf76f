use std::path::PathBuf;

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::api::types::StorySummary;
use crate::query::{Query, QueryState};
use crate::ui::renderfns::genre_color;

/// Draw the detail panel for one story.
pub fn draw_story_detail(
  frame: &mut Frame,
  area: Rect,
  story: &StorySummary,
  image: &Query<PathBuf>,
) {
  let block = Block::default()
    .title(format!(" {} ", story.title))
    .title_alignment(Alignment::Center)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Blue));

  let mut lines = vec![
    Line::from(vec![
      Span::styled("Genre:    ", Style::default().fg(Color::DarkGray)),
      Span::styled(
        story.genre.to_string(),
        Style::default().fg(genre_color(story.genre)),
      ),
    ]),
    Line::from(vec![
      Span::styled("Year:     ", Style::default().fg(Color::DarkGray)),
      Span::raw(story.year.to_string()),
    ]),
    Line::from(vec![
      Span::styled("Created:  ", Style::default().fg(Color::DarkGray)),
      Span::raw(story.created_at.format("%Y-%m-%d %H:%M UTC").to_string()),
    ]),
    Line::from(vec![
      Span::styled("Id:       ", Style::default().fg(Color::DarkGray)),
      Span::raw(story.id.clone()),
    ]),
    Line::raw(""),
  ];

  lines.push(image_line(story, image));

  let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
  frame.render_widget(paragraph, area);
}

fn image_line(story: &StorySummary, image: &Query<PathBuf>) -> Line<'static> {
  if !story.has_image {
    return Line::from(Span::styled(
      "No image for this story.",
      Style::default().fg(Color::DarkGray),
    ));
  }

  match image.state() {
    QueryState::Idle => Line::from(vec![
      Span::styled("▣ ", Style::default().fg(Color::Green)),
      Span::raw("Image available. Press "),
      Span::styled("i", Style::default().fg(Color::Cyan)),
      Span::raw(" to save it."),
    ]),
    QueryState::Loading => Line::from(Span::styled(
      "Saving image...",
      Style::default().fg(Color::Yellow),
    )),
    QueryState::Success(path) => Line::from(vec![
      Span::styled("Image saved to ", Style::default().fg(Color::Green)),
      Span::raw(path.display().to_string()),
    ]),
    QueryState::Error(e) => Line::from(Span::styled(
      format!("Image save failed: {e}"),
      Style::default().fg(Color::Red),
    )),
  }
}
