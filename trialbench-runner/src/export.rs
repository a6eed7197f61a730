//! Reporting and export: CSV table, JSON run report, text summary.
//!
//! The CSV carries exactly the table contract: `strategy,ticker,value,dropdown`.
//! Everything else (diagnostic trial fields, failures, timing) goes to JSON.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::results::{ResultsTable, RunReport, StrategySummary};

/// One exported table row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub strategy: String,
    pub ticker: String,
    pub value: f64,
    pub dropdown: f64,
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Write the four-column table to any writer.
pub fn write_table_csv<W: std::io::Write>(table: &ResultsTable, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["strategy", "ticker", "value", "dropdown"])?;
    for row in table {
        let value = row.value_ratio.to_string();
        let dropdown = row.max_drawdown.to_string();
        wtr.write_record([
            row.strategy.as_str(),
            row.ticker.as_str(),
            value.as_str(),
            dropdown.as_str(),
        ])?;
    }
    wtr.flush().context("failed to flush CSV writer")?;
    Ok(())
}

/// Export the table as a CSV string.
pub fn export_table_csv(table: &ResultsTable) -> Result<String> {
    let mut buf = Vec::new();
    write_table_csv(table, &mut buf)?;
    String::from_utf8(buf).context("CSV output is not valid UTF-8")
}

/// Parse a CSV produced by `export_table_csv`.
pub fn import_table_csv(content: &str) -> Result<Vec<TableRow>> {
    let mut rdr = csv::Reader::from_reader(content.as_bytes());
    rdr.deserialize::<TableRow>()
        .enumerate()
        .map(|(i, row)| row.with_context(|| format!("invalid table row {}", i + 1)))
        .collect()
}

pub fn save_table_csv(table: &ResultsTable, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_table_csv(table, file).with_context(|| format!("failed to write {}", path.display()))
}

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize the full run report (rows with diagnostics, failures, summaries).
pub fn export_report_json(report: &RunReport) -> Result<String> {
    #[derive(Serialize)]
    struct ReportJson<'a> {
        #[serde(flatten)]
        report: &'a RunReport,
        summaries: Vec<StrategySummary>,
    }

    serde_json::to_string_pretty(&ReportJson {
        report,
        summaries: report.summaries(),
    })
    .context("failed to serialize RunReport to JSON")
}

pub fn save_report_json(report: &RunReport, path: &Path) -> Result<()> {
    let json = export_report_json(report)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

// ─── Text summary ───────────────────────────────────────────────────

/// Fixed-width per-strategy summary, best mean value first.
pub fn format_summary(summaries: &[StrategySummary]) -> String {
    let mut sorted: Vec<&StrategySummary> = summaries.iter().collect();
    sorted.sort_by(|a, b| b.mean_value.total_cmp(&a.mean_value));

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<24} {:>7} {:>10} {:>10} {:>10} {:>10}",
        "strategy", "trials", "mean_val", "std_val", "mean_dd", "worst_dd"
    );
    for s in sorted {
        let _ = writeln!(
            out,
            "{:<24} {:>7} {:>10.4} {:>10.4} {:>9.2}% {:>9.2}%",
            s.strategy,
            s.trials,
            s.mean_value,
            s.std_value,
            s.mean_drawdown * 100.0,
            s.worst_drawdown * 100.0
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::{TrialError, TrialFailure};
    use crate::results::TrialResult;

    fn sample_table() -> ResultsTable {
        vec![
            TrialResult {
                strategy: "buy_and_hold".into(),
                ticker: "SPY".into(),
                value_ratio: 1.25,
                max_drawdown: 0.1,
                trial: 0,
                start_day: 10,
                interval_len: 200,
                bars: 140,
            },
            TrialResult {
                strategy: "anti_drop".into(),
                ticker: "QQQ".into(),
                value_ratio: 0.9,
                max_drawdown: 0.35,
                trial: 1,
                start_day: 3,
                interval_len: 160,
                bars: 110,
            },
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn csv_has_exactly_four_columns() {
        let csv = export_table_csv(&sample_table()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("strategy,ticker,value,dropdown"));
        assert_eq!(lines.next(), Some("buy_and_hold,SPY,1.25,0.1"));
        assert_eq!(lines.next(), Some("anti_drop,QQQ,0.9,0.35"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn csv_import_reads_rows() {
        let rows = import_table_csv(&export_table_csv(&sample_table()).unwrap()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].ticker, "QQQ");
        assert_eq!(rows[1].dropdown, 0.35);
    }

    #[test]
    fn csv_import_rejects_garbage() {
        assert!(import_table_csv("strategy,ticker,value,dropdown\na,b,not_a_number,0\n").is_err());
    }

    #[test]
    fn empty_table_is_header_only() {
        let csv = export_table_csv(&ResultsTable::new()).unwrap();
        assert_eq!(csv.trim_end(), "strategy,ticker,value,dropdown");
    }

    #[test]
    fn json_report_has_failures_and_summaries() {
        let report = RunReport {
            table: sample_table(),
            succeeded: 2,
            failures: vec![TrialFailure {
                strategy: "random".into(),
                ticker: "SPY".into(),
                trial: 4,
                error: TrialError::Panicked("boom".into()),
            }],
            skipped: 0,
            total_tasks: 3,
            elapsed_secs: 0.5,
        };
        let json: serde_json::Value =
            serde_json::from_str(&export_report_json(&report).unwrap()).unwrap();
        assert_eq!(json["succeeded"], 2);
        assert_eq!(json["failures"][0]["error"], "engine panicked: boom");
        assert_eq!(json["summaries"].as_array().unwrap().len(), 2);
        assert_eq!(json["table"]["rows"][0]["interval_len"], 200);
    }

    #[test]
    fn summary_sorted_by_mean_value() {
        let text = format_summary(&sample_table().summaries());
        let bh = text.find("buy_and_hold").unwrap();
        let ad = text.find("anti_drop").unwrap();
        assert!(bh < ad);
        assert!(text.starts_with("strategy"));
    }
}
