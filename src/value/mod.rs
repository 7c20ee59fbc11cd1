//! Typed values grabbed from R: scalars, vectors, arrays and data frames.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    Float(f64),
    Int(i64),
    Str(String),
    Bool(bool),
    IntList(Vec<i64>),
    FloatList(Vec<f64>),
    StrList(Vec<String>),
    BoolList(Vec<bool>),
    Array(NdArray),
    DataFrame(DataFrame),
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&NdArray> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_data_frame(&self) -> Option<&DataFrame> {
        match self {
            Value::DataFrame(df) => Some(df),
            _ => None,
        }
    }
}

/// Dense `f64` array stored row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NdArray {
    shape: Vec<usize>,
    data: Vec<f64>,
}

impl NdArray {
    /// Build from row-major data. Returns `None` when `data` does not fill `shape`.
    pub fn new(shape: Vec<usize>, data: Vec<f64>) -> Option<Self> {
        if element_count(&shape)? != data.len() {
            return None;
        }
        Some(Self { shape, data })
    }

    pub fn vector(data: Vec<f64>) -> Self {
        Self {
            shape: vec![data.len()],
            data,
        }
    }

    /// Build from column-major data, the layout R uses for `dim`-carrying objects.
    pub fn from_column_major(shape: Vec<usize>, data: Vec<f64>) -> Option<Self> {
        if element_count(&shape)? != data.len() {
            return None;
        }
        let col_strides = column_major_strides(&shape);
        let mut out = Vec::with_capacity(data.len());
        let mut index = vec![0usize; shape.len()];
        for _ in 0..data.len() {
            let offset: usize = index.iter().zip(&col_strides).map(|(i, s)| i * s).sum();
            out.push(data[offset]);
            // advance the row-major multi-index, last axis fastest
            for axis in (0..shape.len()).rev() {
                index[axis] += 1;
                if index[axis] < shape[axis] {
                    break;
                }
                index[axis] = 0;
            }
        }
        Some(Self { shape, data: out })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row-major data.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn get(&self, index: &[usize]) -> Option<f64> {
        if index.len() != self.shape.len() || self.data.is_empty() {
            return None;
        }
        let mut offset = 0;
        for (i, (&ix, &dim)) in index.iter().zip(&self.shape).enumerate() {
            if ix >= dim {
                return None;
            }
            let stride: usize = self.shape[i + 1..].iter().product();
            offset += ix * stride;
        }
        self.data.get(offset).copied()
    }

    /// Data reordered column-major, first axis fastest.
    pub fn to_column_major(&self) -> Vec<f64> {
        let col_strides = column_major_strides(&self.shape);
        let mut out = vec![0.0; self.data.len()];
        let mut index = vec![0usize; self.shape.len()];
        for &v in &self.data {
            let offset: usize = index.iter().zip(&col_strides).map(|(i, s)| i * s).sum();
            out[offset] = v;
            for axis in (0..self.shape.len()).rev() {
                index[axis] += 1;
                if index[axis] < self.shape[axis] {
                    break;
                }
                index[axis] = 0;
            }
        }
        out
    }
}

/// Product of the dimensions, `None` if it overflows.
fn element_count(shape: &[usize]) -> Option<usize> {
    shape.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
}

fn column_major_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = Vec::with_capacity(shape.len());
    let mut acc: usize = 1;
    for &dim in shape {
        strides.push(acc);
        // only overflows for empty shapes, whose strides are never read
        acc = acc.saturating_mul(dim);
    }
    strides
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum ColumnData {
    Int(Vec<Option<i64>>),
    Float(Vec<Option<f64>>),
    Bool(Vec<Option<bool>>),
    Str(Vec<Option<String>>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Int(v) => v.len(),
            ColumnData::Float(v) => v.len(),
            ColumnData::Bool(v) => v.len(),
            ColumnData::Str(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataFrame {
    columns: Vec<Column>,
}

impl DataFrame {
    /// Returns `None` if the columns have differing lengths.
    pub fn new(columns: Vec<Column>) -> Option<Self> {
        if let Some(first) = columns.first() {
            let n = first.data.len();
            if columns.iter().any(|c| c.data.len() != n) {
                return None;
            }
        }
        Some(Self { columns })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&ColumnData> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| &c.data)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn nrows(&self) -> usize {
        self.columns.first().map(|c| c.data.len()).unwrap_or(0)
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }
}
