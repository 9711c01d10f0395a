// src/process/mod.rs
pub mod convert;
pub mod date_parser;
pub mod normalize;
pub mod schema;
pub mod split;
pub mod utils;

use anyhow::{Context, Result};
use arrow::{
    compute::concat_batches,
    csv::{reader::Format, ReaderBuilder},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use std::{fs, io::Cursor, path::Path, sync::Arc};
use tracing::{debug, instrument};

pub use convert::{normalize_table, NormalizeOptions, NormalizeSummary, Normalized};
pub use split::SplitMode;

const BATCH_SIZE: usize = 64 * 1024;

/// Read a headed CSV file into a single all-`Utf8` table.
///
/// Every column is read as text; typing happens during normalization. A
/// missing or malformed file is an error for the caller to surface.
#[instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_raw_csv<P: AsRef<Path>>(path: P) -> Result<RecordBatch> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("Failed to read input file {:?}", path))?;

    let format = Format::default().with_header(true);
    let (inferred, _) = format
        .infer_schema(Cursor::new(&data), Some(1))
        .with_context(|| format!("Failed to read CSV header of {:?}", path))?;

    // keep the header names, read all values as text
    let schema = Arc::new(Schema::new(
        inferred
            .fields()
            .iter()
            .map(|f| Field::new(f.name(), DataType::Utf8, true))
            .collect::<Vec<_>>(),
    ));
    debug!(columns = schema.fields().len(), "raw schema");

    let reader = ReaderBuilder::new(schema.clone())
        .with_format(format)
        .with_batch_size(BATCH_SIZE)
        .build(Cursor::new(&data))
        .context("creating CSV reader")?;

    let batches = reader
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("CSV parse error in {:?}", path))?;

    concat_batches(&schema, &batches).context("concatenating CSV batches")
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Array, StringArray};
    use std::io::Write;
    use tempfile::NamedTempFile;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,aton::process=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    #[test]
    fn loads_quoted_composite_column_as_text() -> Result<()> {
        init_test_logging();
        let content = "FIO_owner\n\
\"Ivanov Ivan Ivanovich,Romashka,0012345678,50,Moscow,EGRUL,05.03.2020\"\n\
\"Petrov Petr,Vostok,7700000001,0.4,Kazan,SPARK,2021-01-10\"\n";
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(content.as_bytes())?;

        let raw = load_raw_csv(tmp.path())?;

        assert_eq!(raw.num_rows(), 2);
        assert_eq!(raw.schema().field(0).name(), "FIO_owner");
        assert_eq!(raw.schema().field(0).data_type(), &DataType::Utf8);
        let col = raw
            .column(0)
            .as_any()
            .downcast_ref::<StringArray>()
            .expect("utf8 column");
        assert_eq!(
            col.value(0),
            "Ivanov Ivan Ivanovich,Romashka,0012345678,50,Moscow,EGRUL,05.03.2020"
        );
        assert_eq!(col.null_count(), 0);
        Ok(())
    }

    #[test]
    fn numeric_looking_columns_stay_text() -> Result<()> {
        init_test_logging();
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(b"id,FIO_owner\n007,\"a,b,c,d,e,f,g\"\n")?;

        let raw = load_raw_csv(tmp.path())?;
        let ids = raw
            .column_by_name("id")
            .unwrap()
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(ids.value(0), "007");
        Ok(())
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_raw_csv("/definitely/not/here.csv").unwrap_err();
        assert!(format!("{err:#}").contains("Failed to read input file"));
    }
}
