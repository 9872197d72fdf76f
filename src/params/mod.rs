//! Generation parameters.
//!
//! Each parameter kind is an explicit variant with a shared capability
//! contract (default, validate, randomize); everything that touches a value
//! dispatches over the kind with `match`, so a new control kind is a
//! compiler-checked addition.

mod form;

pub use form::GenerateForm;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::api::types::Genre;

/// One tunable generation parameter.
#[derive(Debug, Clone)]
pub struct ParameterSpec {
  pub id: &'static str,
  pub label: &'static str,
  pub kind: ParameterKind,
}

/// Control kind and its constraints.
#[derive(Debug, Clone)]
pub enum ParameterKind {
  /// Single choice from a list, cycled in place.
  Dropdown { options: &'static [&'static str] },
  /// Integer in `[min, max]`, moved in `step` increments.
  Slider { min: i64, max: i64, step: i64 },
  /// On/off flag.
  Toggle,
  /// Any subset of the options.
  Checkbox { options: &'static [&'static str] },
  /// Exactly one of the options.
  Radio { options: &'static [&'static str] },
}

/// A concrete value for one parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
  Choice(String),
  Number(i64),
  Flag(bool),
  Selections(Vec<String>),
}

impl ParameterKind {
  pub fn default_value(&self) -> ParameterValue {
    match self {
      ParameterKind::Dropdown { options } | ParameterKind::Radio { options } => {
        ParameterValue::Choice(options.first().copied().unwrap_or("").to_string())
      }
      ParameterKind::Slider { min, .. } => ParameterValue::Number(*min),
      ParameterKind::Toggle => ParameterValue::Flag(false),
      ParameterKind::Checkbox { .. } => ParameterValue::Selections(Vec::new()),
    }
  }

  /// Check a value against this kind's constraints.
  pub fn validate(&self, value: &ParameterValue) -> Result<(), String> {
    match (self, value) {
      (ParameterKind::Dropdown { options }, ParameterValue::Choice(choice))
      | (ParameterKind::Radio { options }, ParameterValue::Choice(choice)) => {
        if options.contains(&choice.as_str()) {
          Ok(())
        } else {
          Err(format!("'{choice}' is not one of the options"))
        }
      }
      (ParameterKind::Slider { min, max, step }, ParameterValue::Number(n)) => {
        if n < min || n > max {
          Err(format!("{n} is outside {min}..={max}"))
        } else if (n - min) % step != 0 {
          Err(format!("{n} is not aligned to step {step}"))
        } else {
          Ok(())
        }
      }
      (ParameterKind::Toggle, ParameterValue::Flag(_)) => Ok(()),
      (ParameterKind::Checkbox { options }, ParameterValue::Selections(picked)) => {
        for choice in picked {
          if !options.contains(&choice.as_str()) {
            return Err(format!("'{choice}' is not one of the options"));
          }
        }
        Ok(())
      }
      _ => Err("value does not match parameter kind".to_string()),
    }
  }

  /// Produce a random valid value.
  pub fn randomize(&self, rng: &mut impl Rng) -> ParameterValue {
    match self {
      ParameterKind::Dropdown { options } | ParameterKind::Radio { options } => {
        let choice = options.choose(rng).copied().unwrap_or("");
        ParameterValue::Choice(choice.to_string())
      }
      ParameterKind::Slider { min, max, step } => {
        let steps = (max - min) / step;
        ParameterValue::Number(min + rng.gen_range(0..=steps) * step)
      }
      ParameterKind::Toggle => ParameterValue::Flag(rng.gen_bool(0.5)),
      ParameterKind::Checkbox { options } => {
        let picked = options
          .iter()
          .filter(|_| rng.gen_bool(0.5))
          .map(|s| s.to_string())
          .collect();
        ParameterValue::Selections(picked)
      }
    }
  }

  /// Move a value by `delta` control steps (cycle options, step sliders,
  /// flip toggles). Checkbox selection is handled separately per option.
  pub fn step_value(&self, value: &ParameterValue, delta: i64) -> ParameterValue {
    match (self, value) {
      (ParameterKind::Dropdown { options }, ParameterValue::Choice(current))
      | (ParameterKind::Radio { options }, ParameterValue::Choice(current)) => {
        if options.is_empty() {
          return value.clone();
        }
        let len = options.len() as i64;
        let at = options
          .iter()
          .position(|&o| o == current.as_str())
          .unwrap_or(0) as i64;
        let next = (at + delta).rem_euclid(len) as usize;
        ParameterValue::Choice(options[next].to_string())
      }
      (ParameterKind::Slider { min, max, step }, ParameterValue::Number(n)) => {
        ParameterValue::Number((n + delta * step).clamp(*min, *max))
      }
      (ParameterKind::Toggle, ParameterValue::Flag(on)) => ParameterValue::Flag(!on),
      _ => value.clone(),
    }
  }
}

impl ParameterValue {
  /// JSON form for the generation request's `parameterValues` map.
  pub fn to_json(&self) -> serde_json::Value {
    match self {
      ParameterValue::Choice(choice) => serde_json::Value::String(choice.clone()),
      ParameterValue::Number(n) => serde_json::Value::from(*n),
      ParameterValue::Flag(on) => serde_json::Value::Bool(*on),
      ParameterValue::Selections(picked) => {
        serde_json::Value::Array(picked.iter().cloned().map(serde_json::Value::from).collect())
      }
    }
  }
}

const TONES: &[&str] = &["whimsical", "grim", "wry", "earnest"];
const PERSPECTIVES: &[&str] = &["first-person", "third-person", "omniscient"];

const SCI_FI_MOTIFS: &[&str] = &["first-contact", "rogue-ai", "time-travel", "terraforming"];
const FANTASY_MOTIFS: &[&str] = &["dragons", "fae-courts", "lost-heirs", "wild-magic"];
const HORROR_MOTIFS: &[&str] = &["haunting", "body-horror", "folk-ritual", "cosmic-dread"];

/// Built-in parameter set for a genre's generation form.
pub fn parameters_for(genre: Genre) -> Vec<ParameterSpec> {
  let motifs = match genre {
    Genre::SciFi => SCI_FI_MOTIFS,
    Genre::Fantasy => FANTASY_MOTIFS,
    Genre::Horror => HORROR_MOTIFS,
    Genre::Unknown => FANTASY_MOTIFS,
  };

  vec![
    ParameterSpec {
      id: "length",
      label: "Length (words)",
      kind: ParameterKind::Slider {
        min: 500,
        max: 5000,
        step: 100,
      },
    },
    ParameterSpec {
      id: "tone",
      label: "Tone",
      kind: ParameterKind::Dropdown { options: TONES },
    },
    ParameterSpec {
      id: "perspective",
      label: "Perspective",
      kind: ParameterKind::Radio {
        options: PERSPECTIVES,
      },
    },
    ParameterSpec {
      id: "motifs",
      label: "Motifs",
      kind: ParameterKind::Checkbox { options: motifs },
    },
    ParameterSpec {
      id: "bleakEnding",
      label: "Allow bleak ending",
      kind: ParameterKind::Toggle,
    },
  ]
}
