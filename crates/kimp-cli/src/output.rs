use std::io::{self, Write};

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::metadata::Envelope;

/// Rows for `--format table`, built alongside the JSON payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<&'static str>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    fn widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(index, header)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(index))
                    .map(|cell| cell.chars().count())
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or_default()
            })
            .collect()
    }

    /// Left-aligned first column, right-aligned numbers.
    pub fn to_lines(&self) -> Vec<String> {
        let widths = self.widths();
        let line = |cells: Vec<&str>| {
            cells
                .iter()
                .zip(&widths)
                .enumerate()
                .map(|(index, (cell, &width))| {
                    if index == 0 {
                        format!("{cell:<width$}")
                    } else {
                        format!("{cell:>width$}")
                    }
                })
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_owned()
        };

        let mut lines = Vec::with_capacity(self.rows.len() + 1);
        lines.push(line(self.headers.clone()));
        for row in &self.rows {
            lines.push(line(row.iter().map(String::as_str).collect()));
        }
        lines
    }
}

/// Fixed-precision number, or `-` when absent.
pub fn cell(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| String::from("-"), |value| format!("{value:.precision$}"))
}

pub fn render(
    envelope: &Envelope,
    table: &Table,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(envelope)?
            } else {
                serde_json::to_string(envelope)?
            };
            writeln!(out, "{payload}")?;
        }
        OutputFormat::Table => render_table(&mut out, envelope, table)?,
    }

    Ok(())
}

fn render_table(out: &mut impl Write, envelope: &Envelope, table: &Table) -> Result<(), CliError> {
    writeln!(out, "request_id  : {}", envelope.meta.request_id)?;
    writeln!(out, "generated_at: {}", envelope.meta.generated_at)?;
    writeln!(out, "latency_ms  : {}", envelope.meta.latency_ms)?;
    if let Some(origin) = envelope.meta.exchange_rate_origin {
        writeln!(out, "usd_krw     : {}", origin.as_str())?;
    }

    if !envelope.meta.warnings.is_empty() {
        writeln!(out, "warnings:")?;
        for warning in &envelope.meta.warnings {
            writeln!(out, "  - {warning}")?;
        }
    }

    writeln!(out)?;
    for line in table.to_lines() {
        writeln!(out, "{line}")?;
    }
    writeln!(out, "({} rows)", table.len())?;

    Ok(())
}
