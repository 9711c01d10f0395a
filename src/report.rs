use anyhow::Result;
use serde::Serialize;
use std::{
    collections::{BTreeMap, HashMap},
    fmt,
};

use crate::{
    analyze::{
        analyze_multi_owners, analyze_ownership, analyze_ownership_changes, ownership_timeline,
        TimelinePoint,
    },
    process::{NormalizeSummary, Normalized},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyTotal {
    pub company: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyCount {
    pub key: String,
    pub count: usize,
}

/// The three analyses over one normalized table, ordered for presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub normalization: NormalizeSummary,
    /// Ascending by summed ownership.
    pub over_allocated: Vec<CompanyTotal>,
    /// Descending by number of distinct shares.
    pub ownership_changes: Vec<KeyCount>,
    /// Descending by number of companies held.
    pub multi_owners: Vec<KeyCount>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub timelines: BTreeMap<String, Vec<TimelinePoint>>,
}

impl Report {
    pub fn build(normalized: &Normalized, with_timelines: bool) -> Result<Self> {
        let table = &normalized.batch;

        let mut over_allocated: Vec<CompanyTotal> = analyze_ownership(table)?
            .into_iter()
            .map(|(company, total)| CompanyTotal { company, total })
            .collect();
        over_allocated.sort_by(|a, b| {
            a.total
                .total_cmp(&b.total)
                .then_with(|| a.company.cmp(&b.company))
        });

        let ownership_changes = ranked(analyze_ownership_changes(table)?);
        let multi_owners = ranked(analyze_multi_owners(table)?);

        let mut timelines = BTreeMap::new();
        if with_timelines {
            for entry in &ownership_changes {
                timelines.insert(entry.key.clone(), ownership_timeline(table, &entry.key)?);
            }
        }

        Ok(Report {
            normalization: normalized.summary.clone(),
            over_allocated,
            ownership_changes,
            multi_owners,
            timelines,
        })
    }
}

fn ranked(counts: HashMap<String, usize>) -> Vec<KeyCount> {
    let mut out: Vec<KeyCount> = counts
        .into_iter()
        .map(|(key, count)| KeyCount { key, count })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    out
}

fn section(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f, "{title} -------------")
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = &self.normalization;
        writeln!(
            f,
            "Normalized {} rows ({} with an unexpected number of sub-fields)",
            n.rows, n.malformed_rows
        )?;
        writeln!(f)?;

        section(f, "Companies with total ownership > 100%")?;
        if self.over_allocated.is_empty() {
            writeln!(f, "  (none)")?;
        }
        for row in &self.over_allocated {
            writeln!(f, "  {:<40} {:>10.2}", row.company, row.total)?;
        }
        writeln!(f)?;

        section(f, "Companies with changing ownership (distinct shares)")?;
        if self.ownership_changes.is_empty() {
            writeln!(f, "  (none)")?;
        }
        for row in &self.ownership_changes {
            writeln!(f, "  {:<40} {:>10}", row.key, row.count)?;
            if let Some(points) = self.timelines.get(&row.key) {
                for p in points {
                    writeln!(f, "      {}  {:>8.2}%", p.date, p.ownership)?;
                }
            }
        }
        writeln!(f)?;

        section(f, "Owners of more than one company")?;
        if self.multi_owners.is_empty() {
            writeln!(f, "  (none)")?;
        }
        for row in &self.multi_owners {
            writeln!(f, "  {:<40} {:>10}", row.key, row.count)?;
        }
        Ok(())
    }
}
