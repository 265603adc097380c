//! Positional row codec.
//!
//! A row is the ordered list of cells stored in a sheet; a record is the same
//! data keyed by field name. Each table has a fixed [`Schema`] that names the
//! columns in order.

use serde_json::{Map, Value};

/// One stored row, cells in column order.
pub type Row = Vec<Value>;

/// A row keyed by field name.
pub type Record = Map<String, Value>;

/// Column layout of one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    /// Field names in column order.
    pub fields: &'static [&'static str],
    /// Field holding the lookup key.
    pub key_field: &'static str,
    /// Fields never overwritten by a patch. Includes the key field.
    pub immutable: &'static [&'static str],
    /// Field used to order records by recency, if any.
    pub date_field: Option<&'static str>,
}

impl Schema {
    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.fields.len()
    }

    /// Zero-based column index of `field`.
    #[must_use]
    pub fn column_of(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| *f == field)
    }

    /// Zero-based column index of the key field.
    #[must_use]
    pub fn key_column(&self) -> usize {
        self.column_of(self.key_field).unwrap_or(0)
    }

    /// Returns true if `field` can never be patched.
    #[must_use]
    pub fn is_immutable(&self, field: &str) -> bool {
        self.immutable.contains(&field)
    }

    /// Header row written to a fresh sheet.
    #[must_use]
    pub fn header_row(&self) -> Row {
        self.fields
            .iter()
            .map(|f| Value::String((*f).to_string()))
            .collect()
    }
}

/// Zips `row` with the schema's field names.
///
/// Missing trailing cells decode as `null`; cells past the schema width are
/// ignored.
#[must_use]
pub fn decode(row: &[Value], schema: &Schema) -> Record {
    schema
        .fields
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            (
                (*field).to_string(),
                row.get(idx).cloned().unwrap_or(Value::Null),
            )
        })
        .collect()
}

/// Overlays `patch` onto `current_row`.
///
/// For each schema field the patch value wins when present and non-null;
/// immutable fields always keep the current value. Cells past the schema
/// width are carried over untouched, so the column count never shrinks.
///
/// A row shorter than the schema comes back padded with `null` up to the
/// schema width; Sheets trims trailing blank cells on read, and the write
/// puts every field back.
#[must_use]
pub fn encode(current_row: &[Value], patch: &Record, schema: &Schema) -> Row {
    let mut row: Row = schema
        .fields
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            let current = current_row.get(idx).cloned().unwrap_or(Value::Null);
            if schema.is_immutable(field) {
                return current;
            }
            match patch.get(*field) {
                Some(value) if !value.is_null() => value.clone(),
                _ => current,
            }
        })
        .collect();

    if current_row.len() > schema.width() {
        row.extend_from_slice(&current_row[schema.width()..]);
    }
    row
}

/// Lays out a fresh record as a row; absent fields become blank cells.
#[must_use]
pub fn encode_new(record: &Record, schema: &Schema) -> Row {
    schema
        .fields
        .iter()
        .map(|field| match record.get(*field) {
            Some(value) if !value.is_null() => value.clone(),
            _ => Value::String(String::new()),
        })
        .collect()
}
