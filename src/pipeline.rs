//! Batch generation
//!
//! Reads, renders, formats and writes tables one at a time. A failure on
//! one table is recorded and the batch moves on.

use std::path::PathBuf;

use tracing::{debug, error, info, warn};

use crate::codegen::{
    CodeGenConfig, CodeGenerator, DeclarationWriter, OverwritePrompt, SourceFormatter,
    WriteOutcome,
};
use crate::error::SqlgenError;
use crate::introspect::Introspector;
use crate::schema::Table;

/// What happened to one table
#[derive(Debug)]
pub enum TableOutcome {
    Generated(PathBuf),
    Skipped(PathBuf),
    Failed(SqlgenError),
}

#[derive(Debug)]
pub struct TableReport {
    pub table: String,
    pub outcome: TableOutcome,
}

impl TableReport {
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, TableOutcome::Failed(_))
    }
}

/// Counts over a finished batch
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub generated: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_reports(reports: &[TableReport]) -> Self {
        reports
            .iter()
            .fold(Self::default(), |mut summary, report| {
                match report.outcome {
                    TableOutcome::Generated(_) => summary.generated += 1,
                    TableOutcome::Skipped(_) => summary.skipped += 1,
                    TableOutcome::Failed(_) => summary.failed += 1,
                }
                summary
            })
    }
}

/// Drives generation for a list of tables
pub struct Pipeline<'a> {
    generator: &'a dyn CodeGenerator,
    formatter: Option<&'a dyn SourceFormatter>,
    prompt: Option<Box<dyn OverwritePrompt + 'a>>,
    config: &'a CodeGenConfig,
    writer: DeclarationWriter,
}

impl<'a> Pipeline<'a> {
    pub fn new(generator: &'a dyn CodeGenerator, config: &'a CodeGenConfig) -> Self {
        let writer = DeclarationWriter::new(
            config.output_dir.clone(),
            generator.file_extension(),
            config.force,
        );
        Self {
            generator,
            formatter: None,
            prompt: None,
            config,
            writer,
        }
    }

    pub fn with_formatter(mut self, formatter: &'a dyn SourceFormatter) -> Self {
        self.formatter = Some(formatter);
        self
    }

    pub fn with_prompt(mut self, prompt: Box<dyn OverwritePrompt + 'a>) -> Self {
        self.prompt = Some(prompt);
        self
    }

    /// Path the declaration for `table_name` is written to
    pub fn target_path(&self, table_name: &str) -> PathBuf {
        self.writer.target_path(table_name)
    }

    /// Render, format and write a single table
    pub fn generate_table(&mut self, table: &Table) -> Result<WriteOutcome, SqlgenError> {
        let code = self.generator.render_table(table, self.config)?;

        let code = match self.formatter {
            Some(formatter) => formatter.format(&code).map_err(|e| SqlgenError::Format {
                table: table.name.clone(),
                message: e.to_string(),
                source_text: code.clone(),
            })?,
            None => code,
        };

        let prompt = self.prompt.as_deref_mut();
        self.writer.write(&table.name, &code, prompt)
    }

    /// Generate every table in `table_names`, in order
    pub fn run(
        &mut self,
        introspector: &mut dyn Introspector,
        schema_name: &str,
        table_names: &[String],
    ) -> Vec<TableReport> {
        info!(
            schema = ?schema_name,
            tables = table_names.len(),
            output = ?self.config.output_dir,
            package = ?self.config.package,
            "Generating code"
        );

        let mut reports = Vec::with_capacity(table_names.len());
        for table_name in table_names {
            let outcome = self.process(introspector, schema_name, table_name);
            log_outcome(table_name, &outcome);
            reports.push(TableReport {
                table: table_name.clone(),
                outcome,
            });
        }
        reports
    }

    fn process(
        &mut self,
        introspector: &mut dyn Introspector,
        schema_name: &str,
        table_name: &str,
    ) -> TableOutcome {
        let table = match introspector.read_table(schema_name, table_name) {
            Ok(table) => table,
            Err(e) => return TableOutcome::Failed(e),
        };
        let primary_key: Vec<_> = table
            .primary_key_columns()
            .iter()
            .map(|col| col.name.as_str())
            .collect();
        debug!(
            table = ?table.name,
            columns = table.columns.len(),
            primary_key = ?primary_key,
            auto_increment = table.has_auto_increment(),
            "Read table"
        );

        match self.generate_table(&table) {
            Ok(WriteOutcome::Written(path)) => TableOutcome::Generated(path),
            Ok(WriteOutcome::Skipped(path)) => TableOutcome::Skipped(path),
            Err(e) => TableOutcome::Failed(e),
        }
    }
}

fn log_outcome(table_name: &str, outcome: &TableOutcome) {
    match outcome {
        TableOutcome::Generated(path) => {
            info!(table = ?table_name, path = %path.display(), "Generated")
        }
        TableOutcome::Skipped(path) => {
            warn!(table = ?table_name, path = %path.display(), "Skipped")
        }
        TableOutcome::Failed(e) => error!(table = ?table_name, error = %e, "Generation failed"),
    }
}
