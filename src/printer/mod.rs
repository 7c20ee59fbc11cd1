//! Printers for grabbed values: plain text (optionally colored) and JSON.

use std::fmt::Write as _;

use anyhow::Result;
use owo_colors::OwoColorize;
use rinterface::{ColumnData, DataFrame, Grabbed, NdArray, Value};
use serde::Serialize;

pub struct TextPrinter {
    pub color: bool,
}

impl TextPrinter {
    pub fn print(&self, grabbed: &Grabbed) {
        let body = render(&grabbed.value);
        let name = if self.color {
            format!("{}", grabbed.name.green())
        } else {
            grabbed.name.clone()
        };
        if body.contains('\n') {
            println!("{} =\n{}", name, body);
        } else {
            println!("{} = {}", name, body);
        }
    }
}

pub struct JsonPrinter;

impl JsonPrinter {
    pub fn print<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

fn float(v: f64) -> String {
    if v.is_nan() {
        "NA".into()
    } else {
        v.to_string()
    }
}

fn list<T, F: Fn(&T) -> String>(items: &[T], f: F) -> String {
    format!("[{}]", items.iter().map(f).collect::<Vec<_>>().join(", "))
}

/// Human readable rendering of a value.
pub fn render(value: &Value) -> String {
    match value {
        Value::Float(v) => float(*v),
        Value::Int(v) => v.to_string(),
        Value::Str(s) => format!("{s:?}"),
        Value::Bool(b) => b.to_string(),
        Value::IntList(v) => list(v, |x| x.to_string()),
        Value::FloatList(v) => list(v, |x| float(*x)),
        Value::StrList(v) => list(v, |x| format!("{x:?}")),
        Value::BoolList(v) => list(v, |x| x.to_string()),
        Value::Array(a) => render_array(a),
        Value::DataFrame(df) => render_frame(df),
    }
}

fn render_array(a: &NdArray) -> String {
    match a.shape() {
        [_] => list(a.data(), |x| float(*x)),
        [rows, cols] => {
            let mut out = String::new();
            for (r, row) in a.data().chunks((*cols).max(1)).take(*rows).enumerate() {
                if r > 0 {
                    out.push('\n');
                }
                out.push_str(&list(row, |x| float(*x)));
            }
            out
        }
        shape => format!("array{:?} {}", shape, list(a.data(), |x| float(*x))),
    }
}

fn cell(data: &ColumnData, row: usize) -> String {
    fn or_na<T>(v: &Option<T>, f: impl Fn(&T) -> String) -> String {
        v.as_ref().map(f).unwrap_or_else(|| "NA".into())
    }
    match data {
        ColumnData::Int(v) => or_na(&v[row], |x| x.to_string()),
        ColumnData::Float(v) => or_na(&v[row], |x| float(*x)),
        ColumnData::Bool(v) => or_na(&v[row], |x| x.to_string()),
        ColumnData::Str(v) => or_na(&v[row], |x| x.clone()),
    }
}

fn render_frame(df: &DataFrame) -> String {
    let mut grid: Vec<Vec<String>> = vec![df.column_names().iter().map(|s| s.to_string()).collect()];
    for row in 0..df.nrows() {
        grid.push(df.columns().iter().map(|c| cell(&c.data, row)).collect());
    }
    let widths: Vec<usize> = (0..df.ncols())
        .map(|c| grid.iter().map(|r| r[c].chars().count()).max().unwrap_or(0))
        .collect();

    let mut out = String::new();
    for (i, row) in grid.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(s, &w)| format!("{s:>w$}"))
            .collect();
        let _ = write!(out, "{}", line.join("  ").trim_end());
    }
    out
}
