use anyhow::{anyhow, Context, Result};
use arrow::{
    array::{Array, ArrayRef, Float64Builder, StringArray, StringBuilder},
    record_batch::RecordBatch,
};
use serde::Serialize;
use std::{collections::BTreeMap, sync::Arc};
use tracing::{debug, info, instrument};

use crate::process::{
    normalize::{
        normalize_company, normalize_date, normalize_fio, normalize_inn, normalize_ownership,
        pass_through,
    },
    schema::{normalized_schema, DISCLOSURE_FIELDS, FIO_OWNER},
    split::{split_composite, SplitMode},
};

/// Where the composite text lives in the raw table and how to cut it.
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    pub composite_column: String,
    pub split_mode: SplitMode,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            composite_column: FIO_OWNER.to_string(),
            split_mode: SplitMode::default(),
        }
    }
}

/// What normalization did to the table, for logs and the final report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizeSummary {
    pub rows: usize,
    /// Composite cells whose comma count did not match the seven-field layout.
    pub malformed_rows: usize,
    pub null_counts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone)]
pub struct Normalized {
    pub batch: RecordBatch,
    pub summary: NormalizeSummary,
}

/// Split the composite column of `raw` into the seven disclosure columns and
/// normalize each one. Output has exactly as many rows as `raw`.
#[instrument(level = "info", skip(raw, opts), fields(rows = raw.num_rows(), column = %opts.composite_column))]
pub fn normalize_table(raw: &RecordBatch, opts: &NormalizeOptions) -> Result<Normalized> {
    let composite = raw
        .column_by_name(&opts.composite_column)
        .ok_or_else(|| {
            let available: Vec<String> = raw
                .schema()
                .fields()
                .iter()
                .map(|f| f.name().clone())
                .collect();
            anyhow!(
                "composite column {:?} not found (columns: {:?})",
                opts.composite_column,
                available
            )
        })?
        .as_any()
        .downcast_ref::<StringArray>()
        .with_context(|| format!("column {:?} is not a string column", opts.composite_column))?;

    let rows = composite.len();
    let mut fio = StringBuilder::new();
    let mut company = StringBuilder::new();
    let mut inn = StringBuilder::new();
    let mut ownership = Float64Builder::with_capacity(rows);
    let mut region = StringBuilder::new();
    let mut source = StringBuilder::new();
    let mut date = StringBuilder::new();
    let mut malformed_rows = 0;

    for (idx, cell) in composite.iter().enumerate() {
        let parts = split_composite(cell, opts.split_mode);
        if parts.is_malformed() {
            malformed_rows += 1;
            debug!(row = idx, pieces = parts.piece_count, "composite field count mismatch");
        }

        fio.append_option(normalize_fio(parts.get(0)));
        company.append_option(normalize_company(parts.get(1)));
        inn.append_option(normalize_inn(parts.get(2)));
        ownership.append_option(normalize_ownership(parts.get(3)));
        region.append_option(pass_through(parts.get(4)));
        source.append_option(pass_through(parts.get(5)));
        date.append_option(normalize_date(parts.get(6)));
    }

    let columns: Vec<ArrayRef> = vec![
        Arc::new(fio.finish()),
        Arc::new(company.finish()),
        Arc::new(inn.finish()),
        Arc::new(ownership.finish()),
        Arc::new(region.finish()),
        Arc::new(source.finish()),
        Arc::new(date.finish()),
    ];
    let batch = RecordBatch::try_new(normalized_schema(), columns)
        .context("assembling normalized table")?;

    let null_counts = DISCLOSURE_FIELDS
        .iter()
        .zip(batch.columns())
        .map(|(name, col)| (name.to_string(), col.null_count()))
        .collect();
    let summary = NormalizeSummary {
        rows: batch.num_rows(),
        malformed_rows,
        null_counts,
    };

    if malformed_rows > 0 {
        info!(malformed_rows, "rows with an unexpected number of sub-fields");
    }
    info!(rows = summary.rows, nulls = ?summary.null_counts, "normalize is done");

    Ok(Normalized { batch, summary })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::schema::{COMPANY_NAME, INN_COMPANY, OWNERSHIP, OWNERSHIP_DATE};
    use arrow::{
        array::Float64Array,
        datatypes::{DataType, Field, Schema},
    };

    fn raw_batch(cells: Vec<Option<&str>>) -> RecordBatch {
        let schema = Schema::new(vec![Field::new(FIO_OWNER, DataType::Utf8, true)]);
        RecordBatch::try_new(Arc::new(schema), vec![Arc::new(StringArray::from(cells))]).unwrap()
    }

    fn strings<'a>(batch: &'a RecordBatch, name: &str) -> &'a StringArray {
        batch
            .column_by_name(name)
            .unwrap()
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap()
    }

    #[test]
    fn normalizes_every_sub_field() -> Result<()> {
        let raw = raw_batch(vec![Some(
            r#"Ivanov Ivan Ivanovich, "Romashka"  LLC,0012345678,0.35,Moscow,EGRUL,05.03.2020"#,
        )]);
        let out = normalize_table(&raw, &NormalizeOptions::default())?;
        let b = &out.batch;

        assert_eq!(b.schema(), normalized_schema());
        assert_eq!(strings(b, FIO_OWNER).value(0), "Ivanov I.I.");
        assert_eq!(strings(b, COMPANY_NAME).value(0), "Romashka LLC");
        assert_eq!(strings(b, INN_COMPANY).value(0), "0012345678");
        let own = b
            .column_by_name(OWNERSHIP)
            .unwrap()
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap();
        assert_eq!(own.value(0), 35.0);
        assert_eq!(strings(b, OWNERSHIP_DATE).value(0), "2020-03-05");
        assert_eq!(out.summary.malformed_rows, 0);
        Ok(())
    }

    #[test]
    fn row_count_survives_garbage() -> Result<()> {
        let raw = raw_batch(vec![
            Some("Petrov Petr,Alpha,1,60,R,S,01.01.2020"),
            Some(",,,,,,"),
            Some("just one field"),
            None,
            Some("a,b,c,d,e,f,g,h,i"),
            Some(""),
        ]);
        let out = normalize_table(&raw, &NormalizeOptions::default())?;

        assert_eq!(out.batch.num_rows(), raw.num_rows());
        assert_eq!(out.summary.rows, 6);
        assert_eq!(out.summary.malformed_rows, 4);
        assert_eq!(out.summary.null_counts[OWNERSHIP], 5);
        assert_eq!(out.summary.null_counts[FIO_OWNER], 3);
        Ok(())
    }

    #[test]
    fn missing_composite_column_is_an_error() {
        let raw = raw_batch(vec![Some("x")]);
        let opts = NormalizeOptions {
            composite_column: "disclosure".into(),
            ..Default::default()
        };
        let err = normalize_table(&raw, &opts).unwrap_err();
        assert!(err.to_string().contains("disclosure"));
    }
}
