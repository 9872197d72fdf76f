pub mod renderfns;
mod views;

use crate::app::{App, Mode, ViewState};
use crate::library::Phase;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Main content
      Constraint::Length(1), // Status bar
    ])
    .split(frame.area());

  renderfns::draw_header(frame, chunks[0], app.header_title(), &app.genre_label());

  if let Some(view) = app.current_view() {
    match view {
      ViewState::Library { selected } => {
        let visible = app.visible_stories();
        views::library::draw_library(
          frame,
          chunks[1],
          app.library(),
          &visible,
          *selected,
          app.search_filter(),
        );
      }
      ViewState::StoryDetail { story, image } => {
        views::story_detail::draw_story_detail(frame, chunks[1], story, image);
      }
      ViewState::Generate { form } => {
        views::generate::draw_generate(frame, chunks[1], form);
      }
    }
  }

  draw_status_bar(frame, chunks[2], app);
}

fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App) {
  let line = match app.mode() {
    Mode::Normal => normal_status(app),
    Mode::Command => command_status(app),
    Mode::Search => Line::from(Span::styled(
      format!("/{}", app.search_filter()),
      Style::default().fg(Color::Cyan),
    )),
  };

  frame.render_widget(Paragraph::new(line), area);
}

fn normal_status(app: &App) -> Line<'_> {
  // Library advisories and errors take over the hint line
  if let Some(advisory) = app.library().advisory() {
    return Line::from(Span::styled(
      format!(" {advisory}"),
      Style::default().fg(Color::Yellow),
    ));
  }
  if app.library().phase() == Phase::Error {
    if let Some(error) = app.library().error() {
      return Line::from(Span::styled(
        format!(" {error} (r: retry)"),
        Style::default().fg(Color::Red),
      ));
    }
  }

  Line::from(Span::styled(
    " :command  /filter  j/k:nav  Enter:open  r:refresh  q:back  Ctrl-C:quit",
    Style::default().fg(Color::DarkGray),
  ))
}

fn command_status(app: &App) -> Line<'_> {
  let mut spans = vec![Span::styled(
    format!(":{}", app.command_input()),
    Style::default().fg(Color::Yellow),
  )];

  let suggestions = app.autocomplete_suggestions();
  if !suggestions.is_empty() {
    spans.push(Span::raw("  "));
    for (at, cmd) in suggestions.iter().enumerate() {
      let style = if at == app.selected_suggestion() {
        Style::default().fg(Color::Black).bg(Color::Cyan)
      } else {
        Style::default().fg(Color::DarkGray)
      };
      spans.push(Span::styled(format!(" {} ", cmd.name), style));
    }
  }

  Line::from(spans)
}
