use anyhow::Result;
use arrow::record_batch::RecordBatch;
use std::collections::{HashMap, HashSet};
use tracing::instrument;

use super::string_column;
use crate::process::schema::{COMPANY_NAME, FIO_OWNER};

/// Owners tied to more than one distinct company, mapped to that company count.
#[instrument(level = "debug", skip(table), fields(rows = table.num_rows()))]
pub fn analyze_multi_owners(table: &RecordBatch) -> Result<HashMap<String, usize>> {
    let owners = string_column(table, FIO_OWNER)?;
    let companies = string_column(table, COMPANY_NAME)?;

    let mut holdings: HashMap<&str, HashSet<&str>> = HashMap::new();
    for (owner, company) in owners.iter().zip(companies.iter()) {
        if let (Some(owner), Some(company)) = (owner, company) {
            holdings.entry(owner).or_default().insert(company);
        }
    }

    Ok(holdings
        .into_iter()
        .filter(|(_, held)| held.len() > 1)
        .map(|(owner, held)| (owner.to_string(), held.len()))
        .collect())
}
