//! State for the generation form view.

use rand::Rng;

use crate::api::client::GenerateRequest;
use crate::api::types::{GeneratedStory, Genre};
use crate::api::CachedSpecGenClient;
use crate::query::Query;

use super::{parameters_for, ParameterKind, ParameterSpec, ParameterValue};

/// Owns the parameter values being edited and the in-flight submission.
///
/// The form is the single owner of its values; nothing else writes them.
pub struct GenerateForm {
  genre: Genre,
  specs: Vec<ParameterSpec>,
  values: Vec<ParameterValue>,
  selected: usize,
  /// Cursor within a checkbox row's options.
  option_cursor: usize,
  validation_error: Option<String>,
  query: Query<GeneratedStory>,
}

impl GenerateForm {
  pub fn new(genre: Genre) -> Self {
    let specs = parameters_for(genre);
    let values = specs.iter().map(|s| s.kind.default_value()).collect();

    Self {
      genre,
      specs,
      values,
      selected: 0,
      option_cursor: 0,
      validation_error: None,
      query: Query::new(|| async { Err("not submitted".to_string()) }),
    }
  }

  pub fn genre(&self) -> Genre {
    self.genre
  }

  pub fn specs(&self) -> &[ParameterSpec] {
    &self.specs
  }

  pub fn values(&self) -> &[ParameterValue] {
    &self.values
  }

  pub fn selected(&self) -> usize {
    self.selected
  }

  pub fn option_cursor(&self) -> usize {
    self.option_cursor
  }

  pub fn move_selection(&mut self, delta: i32) {
    let len = self.specs.len();
    if len == 0 {
      return;
    }
    self.selected = (self.selected as i32 + delta).rem_euclid(len as i32) as usize;
    self.option_cursor = 0;
  }

  /// Adjust the selected row: cycle/step its value, or move the option
  /// cursor on a checkbox row.
  pub fn adjust(&mut self, delta: i64) {
    let Some(spec) = self.specs.get(self.selected) else {
      return;
    };
    match &spec.kind {
      ParameterKind::Checkbox { options } => {
        if options.is_empty() {
          return;
        }
        let len = options.len() as i64;
        self.option_cursor = (self.option_cursor as i64 + delta).rem_euclid(len) as usize;
      }
      kind => {
        self.values[self.selected] = kind.step_value(&self.values[self.selected], delta);
        self.validation_error = None;
      }
    }
  }

  /// Toggle the selected row: flip a toggle, or flip membership of the
  /// option under the cursor on a checkbox row.
  pub fn toggle(&mut self) {
    let Some(spec) = self.specs.get(self.selected) else {
      return;
    };
    match (&spec.kind, &mut self.values[self.selected]) {
      (ParameterKind::Toggle, ParameterValue::Flag(on)) => *on = !*on,
      (ParameterKind::Checkbox { options }, ParameterValue::Selections(picked)) => {
        let Some(option) = options.get(self.option_cursor) else {
          return;
        };
        if let Some(at) = picked.iter().position(|p| p == option) {
          picked.remove(at);
        } else {
          picked.push(option.to_string());
        }
      }
      _ => {}
    }
    self.validation_error = None;
  }

  /// Replace every value with a random valid one.
  pub fn randomize_all(&mut self, rng: &mut impl Rng) {
    self.values = self.specs.iter().map(|s| s.kind.randomize(rng)).collect();
    self.validation_error = None;
  }

  /// The `parameterValues` map for the generation request.
  pub fn wire_values(&self) -> serde_json::Value {
    let map: serde_json::Map<String, serde_json::Value> = self
      .specs
      .iter()
      .zip(&self.values)
      .map(|(spec, value)| (spec.id.to_string(), value.to_json()))
      .collect();
    serde_json::Value::Object(map)
  }

  fn validate_all(&self) -> Result<(), String> {
    for (spec, value) in self.specs.iter().zip(&self.values) {
      spec
        .kind
        .validate(value)
        .map_err(|e| format!("{}: {}", spec.label, e))?;
    }
    Ok(())
  }

  /// Submit the form. No-op while a submission is in flight; validation
  /// failures surface through [`GenerateForm::error`] without a request.
  pub fn submit(&mut self, client: CachedSpecGenClient) {
    if self.query.is_loading() {
      return;
    }
    if let Err(e) = self.validate_all() {
      self.validation_error = Some(e);
      return;
    }

    let request = GenerateRequest {
      content_type: self.genre.as_param().to_string(),
      parameter_values: self.wire_values(),
    };

    self.query = Query::new(move || {
      let client = client.clone();
      let request = request.clone();
      async move { client.generate(&request).await.map_err(|e| e.to_string()) }
    });
    self.query.fetch();
  }

  /// Poll the in-flight submission. Returns true when state changed.
  pub fn poll(&mut self) -> bool {
    self.query.poll()
  }

  pub fn is_submitting(&self) -> bool {
    self.query.is_loading()
  }

  pub fn result(&self) -> Option<&GeneratedStory> {
    self.query.data()
  }

  pub fn error(&self) -> Option<&str> {
    self
      .validation_error
      .as_deref()
      .or_else(|| self.query.error())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::{ApiConfig, Config};
  use rand::rngs::StdRng;
  use rand::SeedableRng;
  use std::time::Duration;
  use wiremock::matchers::{method, path};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  #[test]
  fn test_defaults_fill_every_row() {
    let form = GenerateForm::new(Genre::SciFi);
    assert_eq!(form.specs().len(), form.values().len());
    assert!(form.error().is_none());
  }

  #[test]
  fn test_selection_wraps() {
    let mut form = GenerateForm::new(Genre::Fantasy);
    form.move_selection(-1);
    assert_eq!(form.selected(), form.specs().len() - 1);
    form.move_selection(1);
    assert_eq!(form.selected(), 0);
  }

  #[test]
  fn test_adjust_steps_slider() {
    let mut form = GenerateForm::new(Genre::Fantasy);
    // Row 0 is the length slider
    form.adjust(3);
    assert_eq!(form.values()[0], ParameterValue::Number(800));
  }

  #[test]
  fn test_checkbox_toggle_via_cursor() {
    let mut form = GenerateForm::new(Genre::Horror);
    let motifs_row = form
      .specs()
      .iter()
      .position(|s| s.id == "motifs")
      .unwrap();
    while form.selected() != motifs_row {
      form.move_selection(1);
    }

    form.adjust(1);
    form.toggle();
    match &form.values()[motifs_row] {
      ParameterValue::Selections(picked) => assert_eq!(picked, &vec!["body-horror".to_string()]),
      other => panic!("unexpected value {other:?}"),
    }

    // Toggling again removes it
    form.toggle();
    match &form.values()[motifs_row] {
      ParameterValue::Selections(picked) => assert!(picked.is_empty()),
      other => panic!("unexpected value {other:?}"),
    }
  }

  #[test]
  fn test_randomized_form_wire_values() {
    let mut form = GenerateForm::new(Genre::SciFi);
    let mut rng = StdRng::seed_from_u64(11);
    form.randomize_all(&mut rng);

    let wire = form.wire_values();
    let map = wire.as_object().unwrap();
    assert_eq!(map.len(), form.specs().len());
    assert!(map.contains_key("length"));
    assert!(map["length"].is_i64());
    assert!(map["motifs"].is_array());
    assert!(map["bleakEnding"].is_boolean());
  }

  #[tokio::test]
  async fn test_submit_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/api/generate"))
      .respond_with(ResponseTemplate::new(200).set_body_raw(
        r#"{"success": true, "data": {"id": "g-9", "title": "Saltglass", "content": "..."}}"#,
        "application/json",
      ))
      .mount(&server)
      .await;

    let config = Config {
      api: ApiConfig {
        url: format!("{}/api", server.uri()),
        timeout_secs: 5,
      },
      ..Config::default()
    };
    let client = CachedSpecGenClient::new(&config).unwrap();

    let mut form = GenerateForm::new(Genre::Horror);
    form.submit(client);
    assert!(form.is_submitting());

    for _ in 0..100 {
      tokio::time::sleep(Duration::from_millis(10)).await;
      if form.poll() {
        break;
      }
    }

    let story = form.result().expect("submission should succeed");
    assert_eq!(story.id, "g-9");
  }
}
