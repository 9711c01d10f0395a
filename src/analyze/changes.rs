use anyhow::Result;
use arrow::record_batch::RecordBatch;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::instrument;

use super::{float_column, share_key, string_column};
use crate::process::schema::{COMPANY_NAME, OWNERSHIP, OWNERSHIP_DATE};

/// Companies whose ownership share was disclosed with more than one distinct
/// value, mapped to how many distinct values were seen.
///
/// Only rows carrying both a share and a disclosure date take part.
#[instrument(level = "debug", skip(table), fields(rows = table.num_rows()))]
pub fn analyze_ownership_changes(table: &RecordBatch) -> Result<HashMap<String, usize>> {
    let companies = string_column(table, COMPANY_NAME)?;
    let shares = float_column(table, OWNERSHIP)?;
    let dates = string_column(table, OWNERSHIP_DATE)?;

    let mut distinct: HashMap<&str, HashSet<u64>> = HashMap::new();
    for ((company, share), date) in companies.iter().zip(shares.iter()).zip(dates.iter()) {
        if let (Some(company), Some(share), Some(_)) = (company, share, date) {
            distinct.entry(company).or_default().insert(share_key(share));
        }
    }

    Ok(distinct
        .into_iter()
        .map(|(company, values)| (company, values.len()))
        .filter(|(_, n)| *n > 1)
        .map(|(company, n)| (company.to_string(), n))
        .collect())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelinePoint {
    pub date: String,
    pub ownership: f64,
}

/// Dated ownership disclosures of one company, oldest first.
pub fn ownership_timeline(table: &RecordBatch, company: &str) -> Result<Vec<TimelinePoint>> {
    let companies = string_column(table, COMPANY_NAME)?;
    let shares = float_column(table, OWNERSHIP)?;
    let dates = string_column(table, OWNERSHIP_DATE)?;

    let mut points: Vec<TimelinePoint> = companies
        .iter()
        .zip(shares.iter())
        .zip(dates.iter())
        .filter_map(|((c, share), date)| match (c, share, date) {
            (Some(c), Some(ownership), Some(date)) if c == company => Some(TimelinePoint {
                date: date.to_string(),
                ownership,
            }),
            _ => None,
        })
        .collect();
    // ISO dates sort lexically
    points.sort_by(|a, b| a.date.cmp(&b.date));
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::fixtures::{row, table};

    #[test]
    fn changed_share_is_counted_per_company() -> Result<()> {
        let t = table(&[
            row(None, Some("A"), Some(30.0), Some("2020-01-01")),
            row(None, Some("A"), Some(40.0), Some("2021-01-01")),
            row(None, Some("A"), Some(30.0), Some("2022-01-01")),
            row(None, Some("B"), Some(50.0), Some("2020-01-01")),
            row(None, Some("B"), Some(50.0), Some("2021-01-01")),
        ]);
        let result = analyze_ownership_changes(&t)?;
        assert_eq!(result, HashMap::from([("A".to_string(), 2)]));
        Ok(())
    }

    #[test]
    fn undated_disclosures_do_not_count_as_changes() -> Result<()> {
        let t = table(&[
            row(None, Some("C"), Some(10.0), Some("2020-01-01")),
            row(None, Some("C"), Some(20.0), None),
            row(None, Some("C"), None, Some("2021-01-01")),
        ]);
        assert!(analyze_ownership_changes(&t)?.is_empty());
        Ok(())
    }

    #[test]
    fn timeline_is_sorted_and_filtered() -> Result<()> {
        let t = table(&[
            row(None, Some("A"), Some(40.0), Some("2021-06-01")),
            row(None, Some("B"), Some(99.0), Some("2019-01-01")),
            row(None, Some("A"), Some(30.0), Some("2020-01-01")),
            row(None, Some("A"), None, Some("2018-01-01")),
        ]);
        let points = ownership_timeline(&t, "A")?;
        assert_eq!(
            points,
            vec![
                TimelinePoint {
                    date: "2020-01-01".into(),
                    ownership: 30.0
                },
                TimelinePoint {
                    date: "2021-06-01".into(),
                    ownership: 40.0
                },
            ]
        );
        Ok(())
    }
}
