use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use std::sync::Arc;

pub const FIO_OWNER: &str = "FIO_owner";
pub const COMPANY_NAME: &str = "Company_name";
pub const INN_COMPANY: &str = "INN_company";
pub const OWNERSHIP: &str = "Ownership";
pub const REGION: &str = "Region";
pub const SOURCE: &str = "Source";
pub const OWNERSHIP_DATE: &str = "Ownership_date";

/// Positional order of the sub-fields inside one composite disclosure cell.
pub const DISCLOSURE_FIELDS: [&str; 7] = [
    FIO_OWNER,
    COMPANY_NAME,
    INN_COMPANY,
    OWNERSHIP,
    REGION,
    SOURCE,
    OWNERSHIP_DATE,
];

/// Schema of the normalized disclosure table. Every column is nullable.
pub fn normalized_schema() -> SchemaRef {
    let fields: Vec<Field> = DISCLOSURE_FIELDS
        .iter()
        .map(|name| {
            let ty = if *name == OWNERSHIP {
                DataType::Float64
            } else {
                DataType::Utf8
            };
            Field::new(*name, ty, true)
        })
        .collect();
    Arc::new(Schema::new(fields))
}
