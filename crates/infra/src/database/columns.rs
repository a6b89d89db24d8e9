//! Column codecs shared by the row mappers.
//!
//! Decimals and status enums are stored as TEXT; these helpers parse them
//! back and surface bad values as `FromSqlConversionFailure`.

use std::str::FromStr;

use rusqlite::types::Type;
use rusqlite::Row;
use rust_decimal::Decimal;

/// Read a TEXT decimal column.
pub fn decimal_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let raw: String = row.get(idx)?;
    Decimal::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Read a TEXT column holding a lowercase status name.
pub fn parsed_at<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = String>,
{
    let raw: String = row.get(idx)?;
    raw.parse::<T>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}
