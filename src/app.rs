use crate::api::client::SummaryQuery;
use crate::api::types::{Genre, StorySummary};
use crate::api::CachedSpecGenClient;
use crate::cache::SnapshotStore;
use crate::commands::{self, Command};
use crate::config::Config;
use crate::event::{Event, EventHandler, LibraryEvent};
use crate::library::{FetchRequest, LibraryController, Phase};
use crate::params::GenerateForm;
use crate::query::Query;
use crate::ui;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;

/// Input mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
  Normal,
  Command,
  Search,
}

/// View state - each variant owns its data
pub enum ViewState {
  /// Root view; the list itself lives in `App::library`
  Library { selected: usize },

  // Detail views (pushed via Enter)
  StoryDetail {
    story: Box<StorySummary>,
    image: Query<PathBuf>,
  },
  Generate {
    form: GenerateForm,
  },
}

/// Main application state
pub struct App {
  /// Navigation stack - root is always at index 0
  view_stack: Vec<ViewState>,

  /// Current input mode
  mode: Mode,

  /// Command input buffer (after pressing :)
  command_input: String,

  /// Library title filter (after pressing /)
  search_filter: String,

  /// Selected autocomplete suggestion index
  selected_suggestion: usize,

  /// Application configuration
  config: Config,

  /// SpecGen API client
  api: CachedSpecGenClient,

  /// Library list state machine
  library: LibraryController,

  /// Event sender for async tasks
  event_tx: mpsc::UnboundedSender<Event>,

  /// Whether to quit
  should_quit: bool,
}

impl App {
  pub fn new(config: Config) -> Result<Self> {
    let api = CachedSpecGenClient::new(&config)?;
    let store = SnapshotStore::open()?;
    let library =
      LibraryController::new(store, config.library.page_size, config.library.genre);
    let (tx, _rx) = mpsc::unbounded_channel();

    Ok(Self {
      view_stack: vec![ViewState::Library { selected: 0 }],
      mode: Mode::Normal,
      command_input: String::new(),
      search_filter: String::new(),
      selected_suggestion: 0,
      config,
      api,
      library,
      event_tx: tx,
      should_quit: false,
    })
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    // Create event handler
    let mut events = EventHandler::new(Duration::from_millis(250));
    self.event_tx = events.sender();

    // Mount the library: a valid snapshot serves without any fetch
    if let Some(request) = self.library.mount() {
      self.spawn_library_fetch(request, false);
    }

    // Main loop
    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      if let Some(event) = events.next().await {
        self.handle_event(event);
      }
    }

    // Cleanup terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
  }

  /// Execute a controller-issued fetch on the runtime, reporting the
  /// outcome back through the event channel with its seq token.
  fn spawn_library_fetch(&self, request: FetchRequest, fresh: bool) {
    let api = self.api.clone();
    let tx = self.event_tx.clone();
    let query = SummaryQuery {
      page: request.page,
      limit: self.library.page_size(),
      genre: self.library.genre(),
    };

    tokio::spawn(async move {
      let result = if fresh {
        api.summaries_fresh(&query).await
      } else {
        api.summaries(&query).await
      };

      let event = match result {
        Ok(page) => LibraryEvent::PageLoaded {
          seq: request.seq,
          page,
        },
        Err(e) => LibraryEvent::PageFailed {
          seq: request.seq,
          message: e.to_string(),
        },
      };
      let _ = tx.send(Event::Library(event));
    });
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Tick => self.poll_view_queries(),
      Event::Library(LibraryEvent::PageLoaded { seq, page }) => {
        self.library.apply_page(seq, page);
        self.clamp_library_selection();
      }
      Event::Library(LibraryEvent::PageFailed { seq, message }) => {
        self.library.apply_error(seq, &message);
        self.clamp_library_selection();
      }
    }
  }

  /// Drain one-shot queries owned by the current view.
  fn poll_view_queries(&mut self) {
    if let Some(view) = self.view_stack.last_mut() {
      match view {
        ViewState::StoryDetail { image, .. } => {
          image.poll();
        }
        ViewState::Generate { form } => {
          form.poll();
        }
        ViewState::Library { .. } => {}
      }
    }
  }

  fn handle_key(&mut self, key: crossterm::event::KeyEvent) {
    match self.mode {
      Mode::Normal => self.handle_normal_mode_key(key),
      Mode::Command => self.handle_command_mode_key(key),
      Mode::Search => self.handle_search_mode_key(key),
    }
  }

  fn handle_normal_mode_key(&mut self, key: crossterm::event::KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    match key.code {
      KeyCode::Char('q') | KeyCode::Esc => {
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
        } else if key.code == KeyCode::Char('q') {
          self.should_quit = true;
        }
      }

      KeyCode::Char(':') => {
        self.mode = Mode::Command;
        self.command_input.clear();
        self.selected_suggestion = 0;
      }
      KeyCode::Char('/') if self.in_library() => {
        self.mode = Mode::Search;
        self.search_filter.clear();
      }

      _ => self.handle_view_key(key),
    }
  }

  fn handle_view_key(&mut self, key: crossterm::event::KeyEvent) {
    if self.in_library() {
      self.handle_library_key(key);
      return;
    }

    match self.view_stack.last_mut() {
      Some(ViewState::StoryDetail { story, image }) => {
        if key.code == KeyCode::Char('i') && story.has_image {
          let api = self.api.clone();
          let story_id = story.id.clone();
          *image = Query::new(move || {
            let api = api.clone();
            let story_id = story_id.clone();
            async move { save_story_image(api, story_id).await }
          });
          image.fetch();
        }
      }
      Some(ViewState::Generate { form }) => match key.code {
        KeyCode::Up | KeyCode::Char('k') => form.move_selection(-1),
        KeyCode::Down | KeyCode::Char('j') => form.move_selection(1),
        KeyCode::Left | KeyCode::Char('h') => form.adjust(-1),
        KeyCode::Right | KeyCode::Char('l') => form.adjust(1),
        KeyCode::Char(' ') => form.toggle(),
        KeyCode::Char('r') => form.randomize_all(&mut rand::thread_rng()),
        KeyCode::Enter => form.submit(self.api.clone()),
        _ => {}
      },
      _ => {}
    }
  }

  fn handle_library_key(&mut self, key: crossterm::event::KeyEvent) {
    match key.code {
      KeyCode::Up | KeyCode::Char('k') => self.move_library_selection(-1),
      KeyCode::Down | KeyCode::Char('j') => self.move_library_selection(1),
      KeyCode::Enter => self.open_selected_story(),
      KeyCode::Char('r') => {
        let request = match self.library.phase() {
          Phase::Error => self.library.retry(),
          _ => self.library.refresh(),
        };
        if let Some(request) = request {
          self.spawn_library_fetch(request, true);
        }
      }
      _ => {}
    }
  }

  /// Move the cursor; walking past the end of the list requests the next
  /// page when one exists (progressive loading).
  fn move_library_selection(&mut self, delta: i32) {
    let visible_len = self.visible_stories().len();
    let mut hit_bottom = false;

    if let Some(ViewState::Library { selected }) = self.view_stack.first_mut() {
      if visible_len == 0 {
        *selected = 0;
      } else {
        let next = *selected as i32 + delta;
        if next >= visible_len as i32 {
          *selected = visible_len - 1;
          hit_bottom = true;
        } else {
          *selected = next.max(0) as usize;
        }
      }
    }

    if hit_bottom {
      if let Some(request) = self.library.load_more() {
        self.spawn_library_fetch(request, false);
      }
    }
  }

  fn open_selected_story(&mut self) {
    let Some(ViewState::Library { selected }) = self.view_stack.first() else {
      return;
    };
    let Some(story) = self.visible_stories().get(*selected).copied().cloned() else {
      return;
    };

    self.view_stack.push(ViewState::StoryDetail {
      story: Box::new(story),
      image: Query::new(|| async { Err("not requested".to_string()) }),
    });
  }

  fn handle_command_mode_key(&mut self, key: crossterm::event::KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.mode = Mode::Normal;
        self.command_input.clear();
        self.selected_suggestion = 0;
      }
      KeyCode::Enter => {
        self.execute_command();
        self.mode = Mode::Normal;
        self.selected_suggestion = 0;
      }
      KeyCode::Tab | KeyCode::Down => {
        let suggestions = commands::get_suggestions(&self.command_input);
        if !suggestions.is_empty() {
          self.selected_suggestion = (self.selected_suggestion + 1) % suggestions.len();
        }
      }
      KeyCode::BackTab | KeyCode::Up => {
        let suggestions = commands::get_suggestions(&self.command_input);
        if !suggestions.is_empty() {
          self.selected_suggestion = if self.selected_suggestion == 0 {
            suggestions.len() - 1
          } else {
            self.selected_suggestion - 1
          };
        }
      }
      KeyCode::Backspace => {
        self.command_input.pop();
        self.selected_suggestion = 0;
      }
      KeyCode::Char(c) => {
        self.command_input.push(c);
        self.selected_suggestion = 0;
      }
      _ => {}
    }
  }

  fn handle_search_mode_key(&mut self, key: crossterm::event::KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.mode = Mode::Normal;
        self.search_filter.clear();
        self.clamp_library_selection();
      }
      KeyCode::Enter => {
        self.mode = Mode::Normal;
      }
      KeyCode::Backspace => {
        self.search_filter.pop();
        self.clamp_library_selection();
      }
      KeyCode::Char(c) => {
        self.search_filter.push(c);
        self.clamp_library_selection();
      }
      _ => {}
    }
  }

  fn execute_command(&mut self) {
    let suggestions = commands::get_suggestions(&self.command_input);
    let cmd = if !suggestions.is_empty() && self.selected_suggestion < suggestions.len() {
      suggestions[self.selected_suggestion].name.to_string()
    } else {
      self.command_input.trim().to_lowercase()
    };

    match cmd.as_str() {
      "library" => {
        self.view_stack.truncate(1);
        self.search_filter.clear();
        self.clamp_library_selection();
      }
      "generate" => {
        let genre = self.config.library.genre.unwrap_or(Genre::Fantasy);
        self.view_stack.truncate(1);
        self.view_stack.push(ViewState::Generate {
          form: GenerateForm::new(genre),
        });
      }
      "refresh" => {
        self.view_stack.truncate(1);
        if let Some(request) = self.library.refresh() {
          self.spawn_library_fetch(request, true);
        }
      }
      "quit" => {
        self.should_quit = true;
      }
      _ => {
        // Unknown command
      }
    }
    self.command_input.clear();
  }

  fn in_library(&self) -> bool {
    matches!(self.view_stack.last(), Some(ViewState::Library { .. }))
  }

  fn clamp_library_selection(&mut self) {
    let visible_len = self.visible_stories().len();
    if let Some(ViewState::Library { selected }) = self.view_stack.first_mut() {
      *selected = (*selected).min(visible_len.saturating_sub(1));
    }
  }

  // Accessors for UI rendering

  pub fn current_view(&self) -> Option<&ViewState> {
    self.view_stack.last()
  }

  pub fn mode(&self) -> &Mode {
    &self.mode
  }

  pub fn command_input(&self) -> &str {
    &self.command_input
  }

  pub fn search_filter(&self) -> &str {
    &self.search_filter
  }

  pub fn library(&self) -> &LibraryController {
    &self.library
  }

  /// Stories after the client-side title filter.
  pub fn visible_stories(&self) -> Vec<&StorySummary> {
    let filter = self.search_filter.to_lowercase();
    self
      .library
      .items()
      .iter()
      .filter(|s| filter.is_empty() || s.title.to_lowercase().contains(&filter))
      .collect()
  }

  pub fn header_title(&self) -> &str {
    if let Some(title) = &self.config.title {
      return title;
    }
    ui::renderfns::extract_domain(&self.config.api.url)
  }

  pub fn genre_label(&self) -> String {
    match self.config.library.genre {
      Some(genre) => genre.to_string(),
      None => "all genres".to_string(),
    }
  }

  pub fn autocomplete_suggestions(&self) -> Vec<&'static Command> {
    commands::get_suggestions(&self.command_input)
  }

  pub fn selected_suggestion(&self) -> usize {
    self.selected_suggestion
  }
}

/// Fetch a story's image and write it under the data directory.
async fn save_story_image(api: CachedSpecGenClient, story_id: String) -> Result<PathBuf, String> {
  let bytes = api.image(&story_id).await.map_err(|e| e.to_string())?;

  let dir = dirs::data_dir()
    .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
    .ok_or_else(|| "Could not determine data directory".to_string())?
    .join("sg9s")
    .join("images");
  tokio::fs::create_dir_all(&dir)
    .await
    .map_err(|e| e.to_string())?;

  let path = dir.join(format!("{story_id}.png"));
  tokio::fs::write(&path, bytes)
    .await
    .map_err(|e| e.to_string())?;

  Ok(path)
}
