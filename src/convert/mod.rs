//! Rendering host values as R source literals, for splicing into scripts.

use crate::value::{ColumnData, DataFrame, NdArray, Value};

/// Types that can be written as an R expression.
pub trait ToR {
    fn to_r(&self) -> String;
}

/// Convenience wrapper over [`ToR::to_r`].
pub fn to_r<T: ToR + ?Sized>(value: &T) -> String {
    value.to_r()
}

/// Double-quoted R string literal with escapes.
pub fn r_string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => {}
            c if c.is_control() => out.push_str(&format!("\\u{{{:x}}}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn r_double(v: f64) -> String {
    if v.is_nan() {
        "NaN".into()
    } else if v.is_infinite() {
        if v > 0.0 { "Inf".into() } else { "-Inf".into() }
    } else {
        // `{:?}` keeps a trailing `.0`, so integral doubles stay doubles in R
        format!("{v:?}")
    }
}

fn r_vector<I: IntoIterator<Item = String>>(items: I) -> String {
    format!("c({})", items.into_iter().collect::<Vec<_>>().join(", "))
}

impl ToR for str {
    fn to_r(&self) -> String {
        r_string_literal(self)
    }
}

impl ToR for String {
    fn to_r(&self) -> String {
        r_string_literal(self)
    }
}

impl ToR for bool {
    fn to_r(&self) -> String {
        if *self { "TRUE".into() } else { "FALSE".into() }
    }
}

impl ToR for i64 {
    fn to_r(&self) -> String {
        format!("{self}L")
    }
}

impl ToR for i32 {
    fn to_r(&self) -> String {
        format!("{self}L")
    }
}

impl ToR for f64 {
    fn to_r(&self) -> String {
        r_double(*self)
    }
}

impl<T: ToR> ToR for Option<T> {
    fn to_r(&self) -> String {
        match self {
            Some(v) => v.to_r(),
            None => "NA".into(),
        }
    }
}

impl<T: ToR> ToR for [T] {
    fn to_r(&self) -> String {
        r_vector(self.iter().map(ToR::to_r))
    }
}

impl<T: ToR> ToR for Vec<T> {
    fn to_r(&self) -> String {
        self.as_slice().to_r()
    }
}

impl<T: ToR + ?Sized> ToR for &T {
    fn to_r(&self) -> String {
        (**self).to_r()
    }
}

impl ToR for NdArray {
    fn to_r(&self) -> String {
        let values = r_vector(self.to_column_major().into_iter().map(r_double));
        match self.shape() {
            [_] => values,
            [nrow, ncol] => {
                format!("matrix({values}, nrow = {nrow}, ncol = {ncol}, byrow = FALSE)")
            }
            shape => {
                let dims = r_vector(shape.iter().map(|d| d.to_string()));
                format!("array({values}, dim = {dims})")
            }
        }
    }
}

impl ToR for ColumnData {
    fn to_r(&self) -> String {
        match self {
            ColumnData::Int(v) => v.to_r(),
            ColumnData::Float(v) => r_vector(v.iter().map(|x| match x {
                // a missing double is NA, not NaN
                Some(x) => r_double(*x),
                None => "NA".into(),
            })),
            ColumnData::Bool(v) => v.to_r(),
            ColumnData::Str(v) => v.to_r(),
        }
    }
}

impl ToR for DataFrame {
    fn to_r(&self) -> String {
        let cols: Vec<String> = self
            .columns()
            .iter()
            .map(|c| format!("`{}` = {}", c.name.replace('`', "\\`"), c.data.to_r()))
            .collect();
        if cols.is_empty() {
            return "data.frame()".into();
        }
        format!("data.frame({}, check.names = FALSE)", cols.join(", "))
    }
}

impl ToR for Value {
    fn to_r(&self) -> String {
        match self {
            Value::Float(v) => v.to_r(),
            Value::Int(v) => v.to_r(),
            Value::Str(v) => v.to_r(),
            Value::Bool(v) => v.to_r(),
            Value::IntList(v) => v.to_r(),
            Value::FloatList(v) => v.to_r(),
            Value::StrList(v) => v.to_r(),
            Value::BoolList(v) => v.to_r(),
            Value::Array(v) => v.to_r(),
            Value::DataFrame(v) => v.to_r(),
        }
    }
}
