//! JSON / CSV report writers and the batch summary

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use crate::models::{ClassificationResult, Intent};
use crate::Result;

/// Write results as a pretty-printed JSON array.
pub fn write_json(path: &Path, results: &[ClassificationResult]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, results)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct CsvRow<'a> {
    conversation_id: &'a str,
    predicted_intent: Intent,
    rationale: &'a str,
}

#[derive(Serialize)]
struct DetailedCsvRow<'a> {
    conversation_id: &'a str,
    predicted_intent: Intent,
    rationale: &'a str,
    confidence: Option<f64>,
}

/// Write results as CSV with a header row.
///
/// Detailed mode appends a `confidence` column.
pub fn write_csv(path: &Path, results: &[ClassificationResult], detailed: bool) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    if results.is_empty() {
        // serde-driven headers are only emitted with the first row
        let mut header = vec!["conversation_id", "predicted_intent", "rationale"];
        if detailed {
            header.push("confidence");
        }
        writer.write_record(&header)?;
    }

    for result in results {
        if detailed {
            writer.serialize(DetailedCsvRow {
                conversation_id: &result.conversation_id,
                predicted_intent: result.predicted_intent,
                rationale: &result.rationale,
                confidence: result.confidence,
            })?;
        } else {
            writer.serialize(CsvRow {
                conversation_id: &result.conversation_id,
                predicted_intent: result.predicted_intent,
                rationale: &result.rationale,
            })?;
        }
    }

    writer.flush()?;
    Ok(())
}

//
// ================= Summary =================
//

#[derive(Debug, Clone)]
pub struct BatchSummary {
    pub started_at: DateTime<Utc>,
    /// Conversations found in the input file
    pub total: usize,
    pub processed: usize,
    /// Undecodable or empty conversations
    pub skipped: usize,
    /// Conversations the classifier errored on
    pub failed: usize,
    pub elapsed: Duration,
    /// Count per intent, most frequent first
    pub distribution: Vec<(Intent, usize)>,
}

impl BatchSummary {
    pub fn average_secs(&self) -> Option<f64> {
        if self.processed == 0 {
            None
        } else {
            Some(self.elapsed.as_secs_f64() / self.processed as f64)
        }
    }
}

/// Count intents; ties keep `Intent::ALL` order.
pub fn intent_distribution(results: &[ClassificationResult]) -> Vec<(Intent, usize)> {
    let mut counts: HashMap<Intent, usize> = HashMap::new();
    for result in results {
        *counts.entry(result.predicted_intent).or_insert(0) += 1;
    }

    let mut distribution: Vec<(Intent, usize)> = Intent::ALL
        .iter()
        .filter_map(|intent| counts.get(intent).map(|c| (*intent, *c)))
        .collect();

    // Stable sort keeps candidate order among equal counts
    distribution.sort_by(|a, b| b.1.cmp(&a.1));
    distribution
}

const RULE: &str = "============================================================";

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", RULE)?;
        writeln!(f, "CLASSIFICATION SUMMARY")?;
        writeln!(f, "{}", RULE)?;
        writeln!(f, "Started at: {}", self.started_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
        writeln!(f, "Total conversations processed: {}", self.processed)?;
        if self.skipped > 0 || self.failed > 0 {
            writeln!(
                f,
                "Skipped: {}  Failed: {}  (of {} in input)",
                self.skipped, self.failed, self.total
            )?;
        }
        writeln!(f, "Processing time: {:.2} seconds", self.elapsed.as_secs_f64())?;
        if let Some(avg) = self.average_secs() {
            writeln!(f, "Average time per conversation: {:.3} seconds", avg)?;
        }

        writeln!(f)?;
        writeln!(f, "Intent Distribution:")?;
        for (intent, count) in &self.distribution {
            let pct = *count as f64 / self.processed as f64 * 100.0;
            writeln!(f, "  • {}: {} ({:.1}%)", intent, count, pct)?;
        }

        write!(f, "{}", RULE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::KeySignals;

    fn result(id: &str, intent: Intent, confidence: Option<f64>) -> ClassificationResult {
        ClassificationResult {
            conversation_id: id.to_string(),
            predicted_intent: intent,
            rationale: format!("The conversation was classified as '{}', \"quoted\"", intent),
            confidence,
            key_signals: None,
        }
    }

    #[test]
    fn test_write_json_omits_detail_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");

        write_json(&path, &[result("conv_001", Intent::BookAppointment, None)]).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("[\n  {\n    \"conversation_id\": \"conv_001\""));
        let parsed: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed[0]["predicted_intent"], "Book Appointment");
        assert!(parsed[0].get("confidence").is_none());
        assert!(parsed[0].get("key_signals").is_none());
    }

    #[test]
    fn test_write_json_detailed_and_unicode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");

        let mut signals = KeySignals::default();
        signals.insert("pricing", vec!["budget"]);
        let mut detailed = result("محادثة-1", Intent::PricingNegotiation, Some(0.75));
        detailed.key_signals = Some(signals);

        write_json(&path, &[detailed]).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("محادثة-1"));
        let parsed: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed[0]["confidence"], 0.75);
        assert_eq!(parsed[0]["key_signals"]["pricing"][0], "budget");
    }

    #[test]
    fn test_write_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        write_csv(
            &path,
            &[
                result("conv_001", Intent::FollowUp, Some(0.9)),
                result("conv_002", Intent::SupportRequest, Some(0.4)),
            ],
            false,
        )
        .unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, vec!["conversation_id", "predicted_intent", "rationale"]);

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][1], "Follow-Up");
        assert!(rows[1][2].contains("\"quoted\""));
    }

    #[test]
    fn test_write_csv_detailed_and_empty() {
        let dir = tempfile::tempdir().unwrap();

        let detailed_path = dir.path().join("detailed.csv");
        write_csv(&detailed_path, &[result("c", Intent::FollowUp, Some(0.5))], true).unwrap();
        let mut reader = csv::Reader::from_path(&detailed_path).unwrap();
        assert_eq!(reader.headers().unwrap().get(3), Some("confidence"));
        let row = reader.records().next().unwrap().unwrap();
        assert_eq!(&row[3], "0.5");

        let empty_path = dir.path().join("empty.csv");
        write_csv(&empty_path, &[], false).unwrap();
        let written = std::fs::read_to_string(&empty_path).unwrap();
        assert_eq!(written, "conversation_id,predicted_intent,rationale\n");
    }

    #[test]
    fn test_intent_distribution_orders_by_count_then_intent() {
        let results = vec![
            result("1", Intent::FollowUp, None),
            result("2", Intent::SupportRequest, None),
            result("3", Intent::FollowUp, None),
            result("4", Intent::ProductInquiry, None),
        ];

        assert_eq!(
            intent_distribution(&results),
            vec![
                (Intent::FollowUp, 2),
                (Intent::ProductInquiry, 1),
                (Intent::SupportRequest, 1),
            ]
        );
    }

    #[test]
    fn test_summary_display() {
        let summary = BatchSummary {
            started_at: Utc::now(),
            total: 5,
            processed: 4,
            skipped: 1,
            failed: 0,
            elapsed: Duration::from_millis(2000),
            distribution: vec![(Intent::FollowUp, 3), (Intent::ProductInquiry, 1)],
        };

        let text = summary.to_string();
        assert!(text.contains("Total conversations processed: 4"));
        assert!(text.contains("Skipped: 1  Failed: 0  (of 5 in input)"));
        assert!(text.contains("Processing time: 2.00 seconds"));
        assert!(text.contains("Average time per conversation: 0.500 seconds"));
        assert!(text.contains("  • Follow-Up: 3 (75.0%)"));
        assert!(text.contains("  • Product Inquiry: 1 (25.0%)"));
    }

    #[test]
    fn test_summary_without_results_has_no_average() {
        let summary = BatchSummary {
            started_at: Utc::now(),
            total: 0,
            processed: 0,
            skipped: 0,
            failed: 0,
            elapsed: Duration::from_millis(5),
            distribution: vec![],
        };
        assert_eq!(summary.average_secs(), None);
        assert!(!summary.to_string().contains("Average"));
    }
}
