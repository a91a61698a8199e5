use std::io::{self, Write};

use serde::Serialize;
use serde_json::Value;
use stocksim_core::UtcDateTime;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// What a command hands back for rendering.
#[derive(Debug)]
pub struct Report {
    pub command: &'static str,
    pub generated_at: UtcDateTime,
    pub data: Value,
    pub table: Option<Table>,
    pub warnings: Vec<String>,
}

#[derive(Serialize)]
struct ReportJson<'a> {
    command: &'a str,
    generated_at: UtcDateTime,
    warnings: &'a [String],
    data: &'a Value,
}

/// Column-aligned rendering of a command's rows.
#[derive(Debug, Clone, PartialEq, Eq)]
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

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.len()).collect();
        for row in &self.rows {
            for (index, cell) in row.iter().enumerate() {
                if let Some(width) = widths.get_mut(index) {
                    *width = (*width).max(cell.chars().count());
                }
            }
        }
        widths
    }

    pub fn write_to(&self, out: &mut impl Write) -> io::Result<()> {
        let widths = self.widths();
        let header: Vec<String> = self.headers.iter().map(|h| h.to_string()).collect();
        write_row(out, &header, &widths)?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        write_row(out, &rule, &widths)?;
        for row in &self.rows {
            write_row(out, row, &widths)?;
        }
        Ok(())
    }
}

fn write_row(out: &mut impl Write, cells: &[String], widths: &[usize]) -> io::Result<()> {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    writeln!(out, "{}", line.trim_end())
}

pub fn render(report: &Report, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Json => {
            let json = ReportJson {
                command: report.command,
                generated_at: report.generated_at,
                warnings: &report.warnings,
                data: &report.data,
            };
            let payload = if pretty {
                serde_json::to_string_pretty(&json)?
            } else {
                serde_json::to_string(&json)?
            };
            writeln!(out, "{payload}")?;
        }
        OutputFormat::Table => render_table(report, &mut out)?,
    }
    Ok(())
}

fn render_table(report: &Report, out: &mut impl Write) -> Result<(), CliError> {
    writeln!(out, "command     : {}", report.command)?;
    writeln!(out, "generated_at: {}", report.generated_at)?;

    if !report.warnings.is_empty() {
        writeln!(out, "warnings:")?;
        for warning in &report.warnings {
            writeln!(out, "  - {warning}")?;
        }
    }

    match &report.table {
        Some(table) => {
            writeln!(out)?;
            table.write_to(out)?;
        }
        None => {
            writeln!(out, "data:")?;
            let pretty_data = serde_json::to_string_pretty(&report.data)?;
            for line in pretty_data.lines() {
                writeln!(out, "  {line}")?;
            }
        }
    }
    Ok(())
}

/// Two decimals, the way prices and balances are shown.
pub fn money(value: f64) -> String {
    format!("{value:.2}")
}

pub fn percent(value: f64) -> String {
    format!("{value:+.2}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_columns_are_aligned() {
        let mut table = Table::new(vec!["symbol", "price"]);
        table.push(vec![String::from("AAPL"), money(175.5)]);
        table.push(vec![String::from("GOOGL"), money(2850.754)]);

        let mut buffer = Vec::new();
        table.write_to(&mut buffer).expect("write");
        let text = String::from_utf8(buffer).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "symbol  price");
        assert_eq!(lines[1], "------  -------");
        assert_eq!(lines[2], "AAPL    175.50");
        assert_eq!(lines[3], "GOOGL   2850.75");
    }

    #[test]
    fn percent_is_signed() {
        assert_eq!(percent(73.0769), "+73.08%");
        assert_eq!(percent(-1.5), "-1.50%");
    }
}
