use anyhow::Result;
use arrow::record_batch::RecordBatch;
use std::collections::HashMap;
use tracing::{debug, instrument};

use super::{float_column, string_column};
use crate::process::schema::{COMPANY_NAME, OWNERSHIP};

/// Share sums above this are impossible for a single company's equity.
pub const FULL_OWNERSHIP: f64 = 100.0;

/// Companies whose disclosed ownership shares add up to more than 100%.
///
/// Rows without an ownership value or a company name are skipped.
#[instrument(level = "debug", skip(table), fields(rows = table.num_rows()))]
pub fn analyze_ownership(table: &RecordBatch) -> Result<HashMap<String, f64>> {
    let companies = string_column(table, COMPANY_NAME)?;
    let shares = float_column(table, OWNERSHIP)?;

    let mut totals: HashMap<&str, f64> = HashMap::new();
    for (company, share) in companies.iter().zip(shares.iter()) {
        if let (Some(company), Some(share)) = (company, share) {
            *totals.entry(company).or_insert(0.0) += share;
        }
    }
    debug!(companies = totals.len(), "summed ownership per company");

    Ok(totals
        .into_iter()
        .filter(|(_, total)| *total > FULL_OWNERSHIP)
        .map(|(company, total)| (company.to_string(), total))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::fixtures::{row, table};

    #[test]
    fn over_allocated_company_is_reported() -> Result<()> {
        let t = table(&[
            row(Some("A I."), Some("X"), Some(60.0), None),
            row(Some("B I."), Some("X"), Some(50.0), None),
        ]);
        let result = analyze_ownership(&t)?;
        assert_eq!(result, HashMap::from([("X".to_string(), 110.0)]));
        Ok(())
    }

    #[test]
    fn exactly_full_ownership_is_not_reported() -> Result<()> {
        let t = table(&[
            row(None, Some("Y"), Some(60.0), None),
            row(None, Some("Y"), Some(40.0), None),
            row(None, Some("Z"), Some(30.0), None),
        ]);
        assert!(analyze_ownership(&t)?.is_empty());
        Ok(())
    }

    #[test]
    fn null_shares_and_companies_are_skipped() -> Result<()> {
        let t = table(&[
            row(None, Some("X"), Some(90.0), None),
            row(None, Some("X"), None, None),
            row(None, None, Some(500.0), None),
            row(None, Some("X"), Some(20.0), Some("2020-01-01")),
        ]);
        let result = analyze_ownership(&t)?;
        assert_eq!(result.len(), 1);
        assert_eq!(result["X"], 110.0);
        Ok(())
    }

    #[test]
    fn wrong_table_shape_is_an_error() {
        let t = RecordBatch::new_empty(std::sync::Arc::new(arrow::datatypes::Schema::empty()));
        assert!(analyze_ownership(&t).is_err());
    }
}
