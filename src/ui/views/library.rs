use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use crate::api::types::StorySummary;
use crate::library::{LibraryController, Phase};
use crate::ui::renderfns::{genre_color, short_date, truncate};

/// Draw the story library list.
///
/// `visible` is the list after the client-side title filter; `selected`
/// indexes into it.
pub fn draw_library(
  frame: &mut Frame,
  area: Rect,
  library: &LibraryController,
  visible: &[&StorySummary],
  selected: usize,
  filter: &str,
) {
  let title = library_title(library, visible.len(), filter);

  let block = Block::default()
    .title(title)
    .title_alignment(Alignment::Center)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Blue));

  if visible.is_empty() {
    let content = empty_message(library, filter);
    let paragraph = Paragraph::new(content)
      .block(block)
      .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
    return;
  }

  let mut items: Vec<ListItem> = visible
    .iter()
    .map(|story| {
      let line = Line::from(vec![
        Span::styled(
          format!("{:<6}", story.year),
          Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
          format!("{:<10}", story.genre),
          Style::default().fg(genre_color(story.genre)),
        ),
        Span::raw(" "),
        Span::raw(format!("{:<52}", truncate(&story.title, 50))),
        Span::styled(
          if story.has_image { "▣ " } else { "  " },
          Style::default().fg(Color::Green),
        ),
        Span::styled(
          short_date(&story.created_at),
          Style::default().fg(Color::DarkGray),
        ),
      ]);
      ListItem::new(line)
    })
    .collect();

  if library.phase() == Phase::LoadingMore {
    items.push(ListItem::new(Line::from(Span::styled(
      "  loading more...",
      Style::default().fg(Color::DarkGray).italic(),
    ))));
  }

  let list = List::new(items)
    .block(block)
    .highlight_style(Style::default().bg(Color::DarkGray).bold())
    .highlight_symbol("> ");

  let mut state = ListState::default();
  state.select(Some(selected.min(visible.len().saturating_sub(1))));
  frame.render_stateful_widget(list, area, &mut state);
}

fn library_title(library: &LibraryController, visible: usize, filter: &str) -> String {
  let total = library
    .pagination()
    .map(|p| p.total.to_string())
    .unwrap_or_else(|| "?".to_string());

  match library.phase() {
    Phase::Idle | Phase::LoadingInitial if library.is_initial_load() => {
      " Library (loading...) ".to_string()
    }
    Phase::LoadingInitial => format!(" Library ({} of {}) (refreshing...) ", visible, total),
    Phase::Error if library.items().is_empty() => " Library (error) ".to_string(),
    _ if !filter.is_empty() => format!(" Library ({} matching '{}') ", visible, filter),
    _ => format!(" Library ({} of {}) ", visible, total),
  }
}

fn empty_message(library: &LibraryController, filter: &str) -> &'static str {
  match library.phase() {
    Phase::Idle | Phase::LoadingInitial => "Loading the library...",
    Phase::Error => "Failed to load the library. Press 'r' to retry.",
    _ if !filter.is_empty() => "No stories match the filter.",
    // total = 0 is a real, healthy state
    _ => "The library is empty. Use :generate to write its first story.",
  }
}
