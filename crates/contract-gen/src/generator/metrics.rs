use serde::Serialize;
use strum::Display;

use crate::generator::types::GeneratedType;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct GenerationStats {
  pub schemas_resolved: usize,
  pub named_types_generated: usize,
  pub object_types_generated: usize,
  pub enum_types_generated: usize,
  pub operations_converted: usize,
  pub form_bodies_exploded: usize,
  pub documents_loaded: usize,
  pub cycles_detected: usize,
  pub cycle_details: Vec<Vec<String>>,
  pub warnings: Vec<GenerationWarning>,
}

impl GenerationStats {
  pub fn record_generated_type(&mut self, generated: &GeneratedType) {
    if let GeneratedType::Named { validated, .. } = generated {
      self.named_types_generated += 1;
      if *validated {
        self.object_types_generated += 1;
      } else {
        self.enum_types_generated += 1;
      }
    }
  }

  pub fn record_cycle(&mut self, cycle: Vec<String>) {
    self.cycles_detected += 1;
    self.cycle_details.push(cycle);
  }

  pub fn record_cycles(&mut self, cycles: Vec<Vec<String>>) {
    for cycle in cycles {
      self.record_cycle(cycle);
    }
  }

  pub fn record_warning(&mut self, warning: GenerationWarning) {
    self.warnings.push(warning);
  }
}

/// Non-fatal findings. The run still produces a complete model.
#[derive(Debug, Clone, PartialEq, Eq, Display, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenerationWarning {
  #[strum(to_string = "{position}: '{keyword}' is ignored")]
  IgnoredKeyword { position: String, keyword: String },
  #[strum(to_string = "[{operation_id}] content declared for status 204 was discarded")]
  NoContentBodyDiscarded { operation_id: String },
  #[strum(to_string = "{position}: pattern '{pattern}' is not a valid regular expression: {error}")]
  InvalidPattern {
    position: String,
    pattern: String,
    error: String,
  },
  #[strum(to_string = "[{operation_id}] parameter '{name}' in {location} is declared more than once")]
  DuplicateParameter {
    operation_id: String,
    name: String,
    location: String,
  },
}
