//! `to-r`: turn a JSON value into an R literal.

use anyhow::{anyhow, bail, Context, Result};
use rinterface::{to_r, Column, ColumnData, DataFrame, NdArray};
use serde_json::Value as Json;

pub struct ToRHandler;

impl ToRHandler {
    pub fn run(json: &str) -> Result<()> {
        let value: Json = serde_json::from_str(json).context("invalid JSON")?;
        println!("{}", json_to_r(&value)?);
        Ok(())
    }
}

pub fn json_to_r(value: &Json) -> Result<String> {
    match value {
        Json::Null => Ok("NA".into()),
        Json::Bool(b) => Ok(to_r(b)),
        Json::Number(n) => Ok(match n.as_i64() {
            Some(i) => to_r(&i),
            None => to_r(&n.as_f64().unwrap_or(f64::NAN)),
        }),
        Json::String(s) => Ok(to_r(s.as_str())),
        Json::Array(items) if !items.is_empty() && items.iter().all(Json::is_array) => {
            matrix_to_r(items)
        }
        Json::Array(items) => {
            let parts = items
                .iter()
                .map(|v| match v {
                    Json::Array(_) | Json::Object(_) => bail!("vectors cannot nest arrays or objects"),
                    v => json_to_r(v),
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(format!("c({})", parts.join(", ")))
        }
        Json::Object(map) => {
            let columns = map
                .iter()
                .map(|(name, v)| {
                    let cells = v
                        .as_array()
                        .ok_or_else(|| anyhow!("column '{}' must be an array", name))?;
                    Ok(Column {
                        name: name.clone(),
                        data: column(name, cells)?,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            let df = DataFrame::new(columns).ok_or_else(|| anyhow!("columns differ in length"))?;
            Ok(to_r(&df))
        }
    }
}

fn matrix_to_r(rows: &[Json]) -> Result<String> {
    let mut data = Vec::new();
    let mut ncol = None;
    for row in rows {
        let cells = row.as_array().map(Vec::as_slice).unwrap_or_default();
        if *ncol.get_or_insert(cells.len()) != cells.len() {
            bail!("matrix rows differ in length");
        }
        for cell in cells {
            data.push(match cell {
                Json::Null => f64::NAN,
                c => c.as_f64().ok_or_else(|| anyhow!("matrix cells must be numbers"))?,
            });
        }
    }
    let shape = vec![rows.len(), ncol.unwrap_or(0)];
    let array = NdArray::new(shape, data).ok_or_else(|| anyhow!("matrix is not rectangular"))?;
    Ok(to_r(&array))
}

fn column(name: &str, cells: &[Json]) -> Result<ColumnData> {
    let present = || cells.iter().filter(|c| !c.is_null());
    let data = if present().all(|c| c.is_i64()) {
        ColumnData::Int(cells.iter().map(Json::as_i64).collect())
    } else if present().all(Json::is_number) {
        ColumnData::Float(cells.iter().map(Json::as_f64).collect())
    } else if present().all(Json::is_boolean) {
        ColumnData::Bool(cells.iter().map(Json::as_bool).collect())
    } else if present().all(Json::is_string) {
        ColumnData::Str(
            cells
                .iter()
                .map(|c| c.as_str().map(str::to_string))
                .collect(),
        )
    } else {
        bail!("column '{}' mixes value types", name);
    };
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars_and_vectors() {
        assert_eq!(json_to_r(&json!(null)).unwrap(), "NA");
        assert_eq!(json_to_r(&json!(3)).unwrap(), "3L");
        assert_eq!(json_to_r(&json!(2.5)).unwrap(), "2.5");
        assert_eq!(json_to_r(&json!("a")).unwrap(), "\"a\"");
        assert_eq!(json_to_r(&json!([true, false, null])).unwrap(), "c(TRUE, FALSE, NA)");
        assert_eq!(json_to_r(&json!([])).unwrap(), "c()");
        assert!(json_to_r(&json!([1, {"a": 1}])).is_err());
    }

    #[test]
    fn matrices() {
        assert_eq!(
            json_to_r(&json!([[1, 2], [3, 4]])).unwrap(),
            "matrix(c(1.0, 3.0, 2.0, 4.0), nrow = 2, ncol = 2, byrow = FALSE)"
        );
        assert!(json_to_r(&json!([[1, 2], [3]])).is_err());
    }

    #[test]
    fn data_frames() {
        let r = json_to_r(&json!({"x": [1, null], "y": ["a", "b"]})).unwrap();
        assert_eq!(r, "data.frame(`x` = c(1L, NA), `y` = c(\"a\", \"b\"), check.names = FALSE)");
        assert!(json_to_r(&json!({"x": [1], "y": [1, 2]})).is_err());
        assert!(json_to_r(&json!({"x": [1, "a"]})).is_err());
        assert!(json_to_r(&json!({"x": 1})).is_err());
    }
}
