use std::{collections::HashSet, path::PathBuf};

use anyhow::Context;
use chrono::{Local, Timelike};
use contract_gen::generator::{
  metrics::GenerationStats,
  orchestrator::{CompiledModel, GeneratorConfig, Orchestrator},
};
use crossterm::style::Stylize;
use num_format::{Locale, ToFormattedString};
use tokio::io::AsyncWriteExt;

use crate::ui::{Colors, GenerateCommand};

fn format_timestamp() -> String {
  let now = Local::now();
  format!("[{:02}:{:02}:{:02}]", now.hour(), now.minute(), now.second())
}

fn count(value: usize) -> String {
  value.to_formatted_string(&Locale::en)
}

#[derive(Debug, Clone)]
pub struct GenerateConfig {
  pub input: PathBuf,
  /// `None` writes the model to stdout.
  pub output: Option<PathBuf>,
  pub schema_files: Vec<PathBuf>,
  pub verbose: bool,
  pub quiet: bool,
  pub all_schemas: bool,
  pub only_operations: Option<HashSet<String>>,
  pub excluded_operations: Option<HashSet<String>>,
}

impl GenerateConfig {
  pub fn from_command(command: GenerateCommand) -> anyhow::Result<Self> {
    let GenerateCommand {
      input,
      output,
      schemas,
      all_schemas,
      only,
      exclude,
      verbose,
      quiet,
    } = command;

    if verbose && quiet {
      anyhow::bail!("--verbose and --quiet cannot be combined");
    }

    Ok(Self {
      input,
      output,
      schema_files: schemas,
      verbose,
      quiet,
      all_schemas,
      only_operations: only.map(|ops| ops.into_iter().collect()),
      excluded_operations: exclude.map(|ops| ops.into_iter().collect()),
    })
  }

  fn generator_config(&self) -> GeneratorConfig {
    GeneratorConfig::builder()
      .all_schemas(self.all_schemas)
      .maybe_only_operations(self.only_operations.clone())
      .maybe_excluded_operations(self.excluded_operations.clone())
      .schema_files(self.schema_files.clone())
      .build()
  }

  async fn write_output(&self, json: String) -> anyhow::Result<()> {
    match &self.output {
      Some(output) => {
        if let Some(parent) = output.parent()
          && !parent.as_os_str().is_empty()
        {
          tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(output, json)
          .await
          .with_context(|| format!("failed to write {}", output.display()))?;
      }
      None => {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(json.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
      }
    }
    Ok(())
  }
}

/// Progress output. Goes to stderr when the model itself is written to stdout.
struct GenerateLogger<'a> {
  config: &'a GenerateConfig,
  colors: &'a Colors,
}

impl<'a> GenerateLogger<'a> {
  fn new(config: &'a GenerateConfig, colors: &'a Colors) -> Self {
    Self { config, colors }
  }

  fn emit(&self, line: &str) {
    if self.config.output.is_some() {
      println!("{line}");
    } else {
      eprintln!("{line}");
    }
  }

  fn info(&self, message: &str) {
    if !self.config.quiet {
      self.emit(&format!("{} {message}", format_timestamp().with(self.colors.timestamp())));
    }
  }

  fn stat(&self, label: &str, value: String) {
    if !self.config.quiet {
      self.emit(&format!(
        "            {:<25} {}",
        label.with(self.colors.label()),
        value.with(self.colors.value())
      ));
    }
  }

  fn log_loading(&self) {
    self.info(
      &format!("Loading contract from: {}", self.config.input.display())
        .with(self.colors.primary())
        .to_string(),
    );
    if self.config.verbose {
      for file in &self.config.schema_files {
        self.info(
          &format!("Including schema file: {}", file.display())
            .with(self.colors.info())
            .to_string(),
        );
      }
    }
  }

  fn print_statistics(&self, model: &CompiledModel) {
    if self.config.quiet {
      return;
    }
    let stats = &model.stats;

    self.stat("Documents loaded:", count(stats.documents_loaded));
    self.stat("Operations converted:", count(stats.operations_converted));
    if stats.form_bodies_exploded > 0 {
      self.stat("", format!("{} form bodies", count(stats.form_bodies_exploded)));
    }
    self.stat("Schemas resolved:", count(stats.schemas_resolved));
    self.stat("Named types:", count(stats.named_types_generated));
    self.stat("", format!("{} objects", count(stats.object_types_generated)));
    self.stat("", format!("{} enums", count(stats.enum_types_generated)));
    if !stats.warnings.is_empty() {
      self.stat("Warnings:", count(stats.warnings.len()));
    }

    self.print_cycles(stats);
    self.print_warnings(stats);
  }

  fn print_cycles(&self, stats: &GenerationStats) {
    if stats.cycles_detected == 0 {
      return;
    }

    self.stat("Cycles:", count(stats.cycles_detected));

    if self.config.verbose {
      for (i, cycle) in stats.cycle_details.iter().enumerate() {
        self.emit(&format!(
          "              {}: {}",
          format!("Cycle {}", i + 1).with(self.colors.accent()),
          cycle.join(" -> ").with(self.colors.info())
        ));
      }
    }
  }

  fn print_warnings(&self, stats: &GenerationStats) {
    if stats.warnings.is_empty() || !self.config.verbose {
      return;
    }

    self.emit("");
    for warning in &stats.warnings {
      eprintln!(
        "{} {}",
        "Warning:".with(self.colors.accent()),
        warning.to_string().with(self.colors.primary())
      );
    }
  }

  fn log_writing(&self) {
    let target = self
      .config
      .output
      .as_ref()
      .map_or_else(|| "stdout".to_string(), |output| output.display().to_string());
    self.info(&format!("Writing model to: {target}").with(self.colors.primary()).to_string());
  }

  fn log_success(&self) {
    if !self.config.quiet {
      self.emit("");
      self.emit(&format!(
        "{} {}",
        format_timestamp().with(self.colors.timestamp()),
        "Successfully compiled contract".with(self.colors.success())
      ));
    }
  }
}

pub async fn generate_model(config: GenerateConfig, colors: &Colors) -> anyhow::Result<()> {
  let logger = GenerateLogger::new(&config, colors);

  logger.log_loading();
  let orchestrator = Orchestrator::new(&config.input, config.generator_config());
  let model = orchestrator
    .compile()
    .with_context(|| format!("failed to compile {}", config.input.display()))?;

  logger.print_statistics(&model);
  logger.log_writing();
  let json = serde_json::to_string_pretty(&model)?;
  config.write_output(json).await?;

  logger.log_success();
  Ok(())
}
