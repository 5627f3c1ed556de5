//! Rendering of collected series and their observed orders.
//!
//! A [`Report`] is assembled once from every [`TestSeries`] of a run and is
//! never modified afterward. It renders either as newline-delimited JSON, one
//! [`Record`] per line in the order
//! 1. one `header` record,
//! 2. for each test case, one `test` record followed by one `order` record per
//!    adjacent pair of samples,
//!
//! or as a plain-text table carrying the same data in the same order. In the
//! JSON form, orders that are not finite numbers are written as `null`.

use std::{
    fmt,
    io::{ BufRead, BufWriter, Write },
    path::Path,
    str::FromStr,
};
use chrono::NaiveDate;
use serde::{ Deserialize, Serialize };
use crate::{
    error::ReportError,
    estimate::{ estimate, OrderEstimate },
    sample::{ GridSample, TestSeries },
    source::SourceMode,
};

pub type ReportResult<T> = Result<T, ReportError>;

/// Title carried by every report header.
pub const TITLE: &str = "Convergence Study";

/// Output rendering of a [`Report`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// One JSON object per line.
    #[default]
    Ndjson,
    /// Fixed-width, human-readable tables.
    Table,
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ndjson" => Ok(Self::Ndjson),
            "table" => Ok(Self::Table),
            other => Err(format!(
                "unknown report format '{}'; expected 'ndjson' or 'table'",
                other,
            )),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ndjson => f.write_str("ndjson"),
            Self::Table => f.write_str("table"),
        }
    }
}

/// A single line of a newline-delimited JSON report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Record {
    /// Opens the report.
    Header {
        title: String,
        date: NaiveDate,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mode: Option<SourceMode>,
    },
    /// Every sample of one test case, in series order.
    Test {
        name: String,
        results: Vec<GridSample>,
    },
    /// Observed orders between two adjacent samples of one test case.
    Order {
        test: String,
        h1: f64,
        h2: f64,
        #[serde(rename = "L2_order")]
        l2_order: Option<f64>,
        #[serde(rename = "Linf_order")]
        linf_order: Option<f64>,
    },
}

impl From<&OrderEstimate> for Record {
    fn from(est: &OrderEstimate) -> Self {
        Self::Order {
            test: est.test.clone(),
            h1: est.h1,
            h2: est.h2,
            l2_order: est.l2.value(),
            linf_order: est.linf.value(),
        }
    }
}

/// One test case's series together with its observed orders.
#[derive(Clone, Debug, PartialEq)]
pub struct Section {
    series: TestSeries,
    estimates: Vec<OrderEstimate>,
}

impl Section {
    /// Estimate the orders for a series.
    pub fn new(series: TestSeries) -> Self {
        let estimates = estimate(&series);
        Self { series, estimates }
    }

    pub fn series(&self) -> &TestSeries { &self.series }

    pub fn estimates(&self) -> &[OrderEstimate] { &self.estimates }
}

/// A complete convergence report.
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    date: NaiveDate,
    mode: SourceMode,
    sections: Vec<Section>,
}

impl Report {
    /// Assemble a report from sections in configured test order.
    pub fn new(date: NaiveDate, mode: SourceMode, sections: Vec<Section>)
        -> Self
    {
        Self { date, mode, sections }
    }

    /// Date of the run.
    pub fn date(&self) -> NaiveDate { self.date }

    /// Whether the data were measured or synthesized.
    pub fn mode(&self) -> SourceMode { self.mode }

    pub fn sections(&self) -> &[Section] { &self.sections }

    /// Flatten the report into its line-delimited records.
    pub fn records(&self) -> Vec<Record> {
        let header = Record::Header {
            title: TITLE.to_string(),
            date: self.date,
            mode: Some(self.mode),
        };
        let mut records = vec![header];
        for section in self.sections.iter() {
            records.push(Record::Test {
                name: section.series.name().to_string(),
                results: section.series.samples().to_vec(),
            });
            records.extend(section.estimates.iter().map(Record::from));
        }
        records
    }

    /// Write the report as newline-delimited JSON.
    pub fn write_ndjson<W>(&self, mut out: W) -> ReportResult<()>
    where W: Write
    {
        for record in self.records() {
            serde_json::to_writer(&mut out, &record)?;
            out.write_all(b"\n")?;
        }
        out.flush()?;
        Ok(())
    }

    /// Write the report as plain-text tables.
    pub fn write_table<W>(&self, mut out: W) -> ReportResult<()>
    where W: Write
    {
        writeln!(out, "=== {} ===", TITLE)?;
        writeln!(out, "date: {}, data: {}", self.date, mode_label(self.mode))?;
        writeln!(out)?;
        for section in self.sections.iter() {
            writeln!(out, "== {} ==", section.series.name())?;
            writeln!(out, "| h       | L_2 error | L_inf error |")?;
            writeln!(out, "|---------|-----------|-------------|")?;
            for s in section.series.samples() {
                writeln!(
                    out,
                    "| {:<7.4} | {:<9.2e} | {:<11.2e} |",
                    s.h(), s.l2(), s.linf(),
                )?;
            }
            writeln!(out)?;
            writeln!(out, "| Pair             | order_2 | order_inf |")?;
            writeln!(out, "|------------------|---------|-----------|")?;
            for est in section.estimates.iter() {
                let pair = format!("{:.4}->{:.4}", est.h1, est.h2);
                writeln!(
                    out,
                    "| {:<16} | {:<7.2} | {:<9.2} |",
                    pair, est.l2, est.linf,
                )?;
            }
            writeln!(out)?;
        }
        out.flush()?;
        Ok(())
    }

    /// Write the report in the given format.
    pub fn write<W>(&self, out: W, format: Format) -> ReportResult<()>
    where W: Write
    {
        match format {
            Format::Ndjson => self.write_ndjson(out),
            Format::Table => self.write_table(out),
        }
    }

    /// Write the report to `path`.
    ///
    /// The report is written to a temporary file next to `path` and moved into
    /// place only once complete; on failure, nothing exists at (or is changed
    /// at) `path`.
    pub fn write_file<P>(&self, path: P, format: Format) -> ReportResult<()>
    where P: AsRef<Path>
    {
        let path = path.as_ref();
        let dir
            = path.parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        self.write(BufWriter::new(tmp.as_file_mut()), format)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path)?;
        Ok(())
    }
}

fn mode_label(mode: SourceMode) -> &'static str {
    match mode {
        SourceMode::Synthetic => "synthetic (scaled from baseline)",
        SourceMode::Measured => "measured",
    }
}

fn malformed(line: usize, reason: impl Into<String>) -> ReportError {
    ReportError::Malformed { line, reason: reason.into() }
}

/// Read back a newline-delimited JSON report.
///
/// Blank lines are skipped. The stream must open with a single header, and
/// every `order` record must follow the `test` record (or another `order`
/// record) of the test case it names.
pub fn read_ndjson<R>(input: R) -> ReportResult<Vec<Record>>
where R: BufRead
{
    let mut records: Vec<Record> = Vec::new();
    let mut current: Option<String> = None;
    for (k, line) in input.lines().enumerate() {
        let line = line?;
        let lineno = k + 1;
        if line.trim().is_empty() { continue; }
        let record: Record = serde_json::from_str(&line)?;
        match &record {
            Record::Header { .. } if !records.is_empty()
                => return Err(malformed(lineno, "header after first record")),
            Record::Header { .. } => { },
            _ if records.is_empty()
                => return Err(malformed(lineno, "missing header")),
            Record::Test { name, .. } => { current = Some(name.clone()); },
            Record::Order { test, .. } => {
                if current.as_deref() != Some(test.as_str()) {
                    return Err(malformed(
                        lineno,
                        format!("order record for '{}' outside its test", test),
                    ));
                }
            },
        }
        records.push(record);
    }
    if records.is_empty() {
        return Err(malformed(0, "empty report"));
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use crate::estimate::Order;
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn section(name: &str, points: &[(f64, f64, f64)]) -> Section {
        let series = TestSeries::from_samples(
            name,
            points.iter()
                .map(|&(h, l2, linf)| GridSample::new(h, l2, linf).unwrap()),
        ).unwrap();
        Section::new(series)
    }

    fn report() -> Report {
        Report::new(
            date(),
            SourceMode::Measured,
            vec![
                section("Minkowski", &[(0.1, 1e-2, 2e-2), (0.05, 2.5e-3, 5e-3)]),
                section(
                    "Schwarzschild",
                    &[(0.1, 0.0, 1e-3), (0.05, 0.0, 0.0), (0.025, 1e-4, 0.0)],
                ),
            ],
        )
    }

    fn ndjson(report: &Report) -> String {
        let mut buf: Vec<u8> = Vec::new();
        report.write_ndjson(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn record_order() {
        let kinds: Vec<&str>
            = report().records().iter()
            .map(|r| match r {
                Record::Header { .. } => "header",
                Record::Test { .. } => "test",
                Record::Order { .. } => "order",
            })
            .collect();
        assert_eq!(
            kinds,
            ["header", "test", "order", "test", "order", "order"],
        );
    }

    #[test]
    fn field_names() {
        let text = ndjson(&report());
        let lines: Vec<serde_json::Value>
            = text.lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0]["type"], "header");
        assert_eq!(lines[0]["title"], "Convergence Study");
        assert_eq!(lines[0]["date"], "2026-10-18");
        assert_eq!(lines[0]["mode"], "measured");
        assert_eq!(lines[1]["type"], "test");
        assert_eq!(lines[1]["name"], "Minkowski");
        assert_eq!(lines[1]["results"][1]["h"], 0.05);
        assert_eq!(lines[1]["results"][1]["L2"], 2.5e-3);
        assert_eq!(lines[1]["results"][1]["Linf"], 5e-3);
        assert_eq!(lines[2]["type"], "order");
        assert_eq!(lines[2]["test"], "Minkowski");
        assert_eq!(lines[2]["h1"], 0.1);
        assert_eq!(lines[2]["h2"], 0.05);
        assert!(lines[2]["L2_order"].is_f64());
        assert!(lines[2]["Linf_order"].is_f64());
    }

    #[test]
    fn degenerate_orders_are_null() {
        let text = ndjson(&report());
        let lines: Vec<serde_json::Value>
            = text.lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        // zero/zero and zero/nonzero in L2, nonzero/zero and zero/zero in Linf
        assert!(lines[4]["L2_order"].is_null());
        assert!(lines[4]["Linf_order"].is_null());
        assert!(lines[5]["L2_order"].is_null());
        assert!(lines[5]["Linf_order"].is_null());
        assert!(text.contains(r#""L2_order":null"#));
    }

    #[test]
    fn round_trip() {
        let report = report();
        let text = ndjson(&report);
        let records = read_ndjson(Cursor::new(text)).unwrap();
        assert_eq!(records, report.records());
        match &records[0] {
            Record::Header { date, mode, .. } => {
                assert_eq!(*date, report.date());
                assert_eq!(*mode, Some(report.mode()));
            },
            other => panic!("unexpected record {other:?}"),
        }
        match &records[2] {
            Record::Order { l2_order: Some(p), .. }
                => assert!((p - 2.0).abs() < 1e-6),
            other => panic!("unexpected record {other:?}"),
        }
    }

    #[test]
    fn header_without_mode() {
        let text = concat!(
            r#"{"type":"header","title":"Convergence Study","date":"2025-01-02"}"#,
            "\n",
            r#"{"type":"test","name":"Minkowski","results":[]}"#,
            "\n",
        );
        let records = read_ndjson(Cursor::new(text)).unwrap();
        assert!(matches!(records[0], Record::Header { mode: None, .. }));
    }

    #[test]
    fn reader_rejects_bad_streams() {
        let no_header = r#"{"type":"test","name":"Minkowski","results":[]}"#;
        assert!(matches!(
            read_ndjson(Cursor::new(no_header)),
            Err(ReportError::Malformed { line: 1, .. }),
        ));
        let stray_order = concat!(
            r#"{"type":"header","title":"Convergence Study","date":"2025-01-02"}"#,
            "\n",
            r#"{"type":"test","name":"Minkowski","results":[]}"#,
            "\n",
            r#"{"type":"order","test":"Kerr","h1":0.1,"h2":0.05,"L2_order":null,"Linf_order":2.0}"#,
            "\n",
        );
        assert!(matches!(
            read_ndjson(Cursor::new(stray_order)),
            Err(ReportError::Malformed { line: 3, .. }),
        ));
        assert!(matches!(
            read_ndjson(Cursor::new("")),
            Err(ReportError::Malformed { .. }),
        ));
        assert!(matches!(
            read_ndjson(Cursor::new("{not json}\n")),
            Err(ReportError::Json(_)),
        ));
    }

    #[test]
    fn table_rendering() {
        let mut buf: Vec<u8> = Vec::new();
        report().write_table(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("=== Convergence Study ===\n"));
        assert!(text.contains("data: measured"));
        assert!(text.contains("== Minkowski =="));
        assert!(text.contains("| 0.1000  | 1.00e-2   | 2.00e-2     |"));
        assert!(text.contains("| 0.1000->0.0500   | 2.00    | 2.00      |"));
        assert!(text.contains("| 0.1000->0.0500   | inf     | n/a       |"));
        assert!(text.contains("| 0.0500->0.0250   | n/a     | inf       |"));
        let mink = text.find("== Minkowski ==").unwrap();
        let schw = text.find("== Schwarzschild ==").unwrap();
        assert!(mink < schw);
    }

    #[test]
    fn section_keeps_rich_orders() {
        let r = report();
        let est = &r.sections()[1].estimates()[0];
        assert_eq!(est.l2, Order::PerfectConvergence);
        assert_eq!(est.linf, Order::Undefined);
    }

    #[test]
    fn format_names() {
        assert_eq!("table".parse::<Format>().unwrap(), Format::Table);
        assert_eq!(Format::default().to_string(), "ndjson");
        assert!("csv".parse::<Format>().is_err());
    }
}
