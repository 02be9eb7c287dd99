//! JSON import/export of opportunity lists.
//!
//! Export always writes the envelope form:
//! `{ "exportedAt": <RFC 3339>, "count": <n>, "opportunities": [...] }`.
//! Import accepts that envelope or a bare array of opportunities.

use crate::models::Opportunity;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Failed to parse opportunities data: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Invalid format: expected an array or an object with an `opportunities` array")]
    UnexpectedShape,

    #[error("Invalid opportunity record: {0}")]
    InvalidRecord(#[source] serde_json::Error),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportEnvelope<'a> {
    exported_at: DateTime<Utc>,
    count: usize,
    opportunities: &'a [Opportunity],
}

/// Serialize `opportunities` into the export envelope, stamped now.
pub fn export_opportunities(opportunities: &[Opportunity]) -> serde_json::Result<String> {
    export_opportunities_at(opportunities, Utc::now())
}

pub fn export_opportunities_at(
    opportunities: &[Opportunity],
    exported_at: DateTime<Utc>,
) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&ExportEnvelope {
        exported_at,
        count: opportunities.len(),
        opportunities,
    })
}

pub fn import_opportunities(data: &str) -> std::result::Result<Vec<Opportunity>, FormatError> {
    let value: Value = serde_json::from_str(data).map_err(FormatError::Parse)?;

    let records = match value {
        Value::Object(mut obj) => match obj.remove("opportunities") {
            Some(list @ Value::Array(_)) => list,
            _ => return Err(FormatError::UnexpectedShape),
        },
        list @ Value::Array(_) => list,
        _ => return Err(FormatError::UnexpectedShape),
    };

    serde_json::from_value(records).map_err(FormatError::InvalidRecord)
}

// ── File helpers ─────────────────────────────────────────────────────────────

pub fn read_opportunities(path: &Path) -> Result<Vec<Opportunity>> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {:?}", path))?;
    let opportunities = import_opportunities(&data)
        .with_context(|| format!("Failed to import {:?}", path))?;
    debug!("Imported {} opportunities from {:?}", opportunities.len(), path);
    Ok(opportunities)
}

pub fn write_opportunities(path: &Path, opportunities: &[Opportunity]) -> Result<()> {
    let json = export_opportunities(opportunities).context("Failed to serialize opportunities")?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {:?}", parent))?;
    }
    std::fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))?;
    debug!("Exported {} opportunities to {:?}", opportunities.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{fixed_time, opportunity};
    use crate::models::OpportunityStatus;

    fn sample() -> Vec<Opportunity> {
        let a = opportunity("a", "Camera", 100.0, &[180.0, 190.0, 200.0, 210.0, 220.0]);
        let mut b = opportunity("b", "Vintage Lamp", 33.5, &[91.37, 88.01, 120.5]);
        b.listing.image_url = Some("https://placehold.co/400x300".into());
        b.record_purchase(33.5, fixed_time());
        b.record_sale(97.25, fixed_time());
        b.set_status(OpportunityStatus::Sold, fixed_time());
        b.set_notes("picked up Sunday", fixed_time());
        vec![a, b]
    }

    #[test]
    fn test_round_trip() {
        let opps = sample();
        let json = export_opportunities(&opps).unwrap();
        assert_eq!(import_opportunities(&json).unwrap(), opps);
    }

    #[test]
    fn test_envelope_fields() {
        let json = export_opportunities_at(&sample(), fixed_time()).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["count"], 2);
        assert_eq!(value["exportedAt"], "2024-06-01T09:30:00Z");
        assert_eq!(value["opportunities"][0]["profitAnalysis"]["confidence"], "high");
        assert_eq!(value["opportunities"][0]["listing"]["source"], "craigslist");
    }

    #[test]
    fn test_bare_array_is_accepted() {
        let opps = sample();
        let json = serde_json::to_string(&opps).unwrap();
        assert_eq!(import_opportunities(&json).unwrap(), opps);
        assert!(import_opportunities("[]").unwrap().is_empty());
    }

    #[test]
    fn test_legacy_comparables_field() {
        let opps = sample();
        let json = serde_json::to_string(&opps)
            .unwrap()
            .replace("\"comparables\"", "\"ebayComparables\"");
        assert_eq!(import_opportunities(&json).unwrap(), opps);
    }

    #[test]
    fn test_format_errors() {
        assert!(matches!(import_opportunities("not json"), Err(FormatError::Parse(_))));
        assert!(matches!(import_opportunities("42"), Err(FormatError::UnexpectedShape)));
        assert!(matches!(
            import_opportunities(r#"{"opportunities": {}}"#),
            Err(FormatError::UnexpectedShape)
        ));
        assert!(matches!(
            import_opportunities(r#"{"count": 0}"#),
            Err(FormatError::UnexpectedShape)
        ));
        assert!(matches!(
            import_opportunities(r#"[{"id": "x"}]"#),
            Err(FormatError::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_file_round_trip() {
        let path = std::env::temp_dir()
            .join(format!("flip-scout-transfer-{}", std::process::id()))
            .join("opps.json");
        let opps = sample();
        write_opportunities(&path, &opps).unwrap();
        assert_eq!(read_opportunities(&path).unwrap(), opps);
        std::fs::remove_file(&path).ok();
    }
}
