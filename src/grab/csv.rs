//! Reader for the CSV files R's `write.csv` produces, with per-column type
//! inference into a [`DataFrame`].

use crate::{
    error::{Error, Result},
    value::{Column, ColumnData, DataFrame},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub text: String,
    pub quoted: bool,
}

impl Field {
    fn is_na(&self) -> bool {
        !self.quoted && self.text == "NA"
    }
}

/// Split CSV text into records. Handles quoted fields, `""` escapes,
/// embedded newlines and CRLF line endings.
pub fn read_records(text: &str) -> Result<Vec<Vec<Field>>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                c => field.push(c),
            }
            continue;
        }
        match c {
            '"' if field.is_empty() && !quoted => {
                in_quotes = true;
                quoted = true;
            }
            '"' => {
                return Err(Error::Csv {
                    record: records.len() + 1,
                    reason: "stray quote inside unquoted field".into(),
                })
            }
            ',' => record.push(Field { text: std::mem::take(&mut field), quoted: std::mem::take(&mut quoted) }),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                record.push(Field { text: std::mem::take(&mut field), quoted: std::mem::take(&mut quoted) });
                records.push(std::mem::take(&mut record));
            }
            c => field.push(c),
        }
    }
    if in_quotes {
        return Err(Error::Csv {
            record: records.len() + 1,
            reason: "unterminated quoted field".into(),
        });
    }
    if !field.is_empty() || quoted || !record.is_empty() {
        record.push(Field { text: field, quoted });
        records.push(record);
    }
    Ok(records)
}

/// Build a [`DataFrame`] from `write.csv(row.names = FALSE)` output.
pub fn read_data_frame(text: &str) -> Result<DataFrame> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut records = read_records(text)?.into_iter();
    let Some(header) = records.next() else {
        return Ok(DataFrame::default());
    };
    let width = header.len();
    let mut cells: Vec<Vec<Field>> = vec![Vec::new(); width];
    for (i, record) in records.enumerate() {
        if record.len() != width {
            return Err(Error::Csv {
                record: i + 2,
                reason: format!("expected {width} fields, found {}", record.len()),
            });
        }
        for (col, field) in record.into_iter().enumerate() {
            cells[col].push(field);
        }
    }

    let columns = header
        .into_iter()
        .zip(cells)
        .map(|(name, fields)| Column {
            name: name.text,
            data: infer_column(fields),
        })
        .collect();
    // every column has one cell per record, so lengths always agree
    Ok(DataFrame::new(columns).unwrap_or_default())
}

fn infer_column(fields: Vec<Field>) -> ColumnData {
    let present = || fields.iter().filter(|f| !f.is_na());

    if present().any(|f| f.quoted) {
        return ColumnData::Str(
            fields
                .into_iter()
                .map(|f| if f.is_na() { None } else { Some(f.text) })
                .collect(),
        );
    }
    if present().count() == 0 {
        return ColumnData::Bool(vec![None; fields.len()]);
    }
    if present().all(|f| f.text.parse::<i64>().is_ok()) {
        return ColumnData::Int(fields.iter().map(|f| f.text.parse().ok()).collect());
    }
    if present().all(|f| super::parse::r_f64(&f.text).is_some()) {
        return ColumnData::Float(
            fields
                .iter()
                .map(|f| if f.is_na() { None } else { super::parse::r_f64(&f.text) })
                .collect(),
        );
    }
    if present().all(|f| matches!(f.text.as_str(), "TRUE" | "FALSE")) {
        return ColumnData::Bool(
            fields
                .iter()
                .map(|f| match f.text.as_str() {
                    "TRUE" => Some(true),
                    "FALSE" => Some(false),
                    _ => None,
                })
                .collect(),
        );
    }
    ColumnData::Str(
        fields
            .into_iter()
            .map(|f| if f.is_na() { None } else { Some(f.text) })
            .collect(),
    )
}
