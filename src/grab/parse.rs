//! Decoding the grab side file into typed values.
//!
//! Each line has the form `name=KIND:payload` where `KIND` is one of
//! `VECTOR`, `ARRAY` (payload `d1xd2x...:values`, column-major) or
//! `DATAFRAME` (payload is the path of a CSV file).

use std::{collections::HashMap, fs, path::Path};

use serde::Serialize;
use tracing::debug;

use super::{csv, ElemType, GrabTag, GrabType};
use crate::{
    error::{Error, Result},
    value::{NdArray, Value},
};

/// A grabbed variable and its decoded value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grabbed {
    pub name: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Bare(String),
    Quoted(String),
}

impl Token {
    fn is_na(&self) -> bool {
        matches!(self, Token::Bare(s) if s == "NA")
    }

    fn text(&self) -> &str {
        match self {
            Token::Bare(s) | Token::Quoted(s) => s,
        }
    }
}

/// Parse a number the way R prints it.
pub(crate) fn r_f64(s: &str) -> Option<f64> {
    match s {
        "NA" | "NaN" => Some(f64::NAN),
        "Inf" => Some(f64::INFINITY),
        "-Inf" => Some(f64::NEG_INFINITY),
        s if s.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '+' || c == '.') => {
            s.parse().ok()
        }
        _ => None,
    }
}

fn r_i64(s: &str) -> Option<i64> {
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    // doubles holding whole numbers print as e.g. `1e+05`
    let f = r_f64(s)?;
    (f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64).then_some(f as i64)
}

fn r_bool(s: &str) -> Option<bool> {
    match s {
        "TRUE" | "T" | "true" | "1" => Some(true),
        "FALSE" | "F" | "false" | "0" => Some(false),
        _ => None,
    }
}

/// Split a comma-joined payload. Quoted elements use R's `encodeString` escapes.
fn split_elements(name: &str, payload: &str) -> Result<Vec<Token>> {
    if payload.is_empty() {
        return Ok(Vec::new());
    }
    let mut tokens = Vec::new();
    let mut chars = payload.chars().peekable();
    loop {
        if chars.peek() == Some(&'"') {
            chars.next();
            let mut s = String::new();
            loop {
                match chars.next() {
                    Some('"') => break,
                    Some('\\') => unescape_into(name, &mut chars, &mut s)?,
                    Some(c) => s.push(c),
                    None => return Err(Error::parse(name, "unterminated string element")),
                }
            }
            tokens.push(Token::Quoted(s));
            match chars.next() {
                None => break,
                Some(',') => continue,
                Some(c) => {
                    return Err(Error::parse(name, format!("unexpected '{c}' after string element")))
                }
            }
        } else {
            let mut s = String::new();
            let mut more = false;
            for c in chars.by_ref() {
                if c == ',' {
                    more = true;
                    break;
                }
                s.push(c);
            }
            tokens.push(Token::Bare(s));
            if !more {
                break;
            }
        }
    }
    Ok(tokens)
}

fn unescape_into<I: Iterator<Item = char>>(
    name: &str,
    chars: &mut std::iter::Peekable<I>,
    out: &mut String,
) -> Result<()> {
    let c = chars
        .next()
        .ok_or_else(|| Error::parse(name, "dangling escape"))?;
    let simple = match c {
        'n' => Some('\n'),
        't' => Some('\t'),
        'r' => Some('\r'),
        'a' => Some('\u{7}'),
        'b' => Some('\u{8}'),
        'f' => Some('\u{c}'),
        'v' => Some('\u{b}'),
        '\\' | '"' | '\'' | '`' => Some(c),
        _ => None,
    };
    if let Some(ch) = simple {
        out.push(ch);
        return Ok(());
    }
    let (radix, max_digits) = match c {
        'x' => (16, 2),
        'u' => (16, 4),
        'U' => (16, 8),
        '0'..='7' => (8, 3),
        other => return Err(Error::parse(name, format!("unknown escape '\\{other}'"))),
    };
    let mut digits = String::new();
    if radix == 8 {
        digits.push(c);
    }
    let braced = radix == 16 && chars.peek() == Some(&'{');
    if braced {
        chars.next();
    }
    while digits.len() < max_digits || braced {
        match chars.peek() {
            Some('}') if braced => {
                chars.next();
                break;
            }
            Some(d) if d.is_digit(radix) => {
                digits.push(*d);
                chars.next();
            }
            _ => break,
        }
    }
    let code = u32::from_str_radix(&digits, radix)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| Error::parse(name, format!("invalid escape '\\{c}{digits}'")))?;
    out.push(code);
    Ok(())
}

fn scalar(name: &str, tokens: Vec<Token>) -> Result<Token> {
    let n = tokens.len();
    let mut it = tokens.into_iter();
    match (it.next(), n) {
        (Some(t), 1) => Ok(t),
        _ => Err(Error::parse(name, format!("expected a single value, found {n}"))),
    }
}

fn to_float(name: &str, t: &Token) -> Result<f64> {
    if t.is_na() {
        return Ok(f64::NAN);
    }
    r_f64(t.text()).ok_or_else(|| Error::parse(name, format!("'{}' is not a number", t.text())))
}

fn to_int(name: &str, t: &Token) -> Result<i64> {
    if t.is_na() {
        return Err(Error::parse(name, "NA cannot be represented as an integer"));
    }
    r_i64(t.text()).ok_or_else(|| Error::parse(name, format!("'{}' is not an integer", t.text())))
}

fn to_bool(name: &str, t: &Token) -> Result<bool> {
    if t.is_na() {
        return Err(Error::parse(name, "NA cannot be represented as a bool"));
    }
    r_bool(t.text()).ok_or_else(|| Error::parse(name, format!("'{}' is not a logical", t.text())))
}

fn to_array_elem(name: &str, t: &Token) -> Result<f64> {
    match t {
        Token::Bare(s) if s == "TRUE" => Ok(1.0),
        Token::Bare(s) if s == "FALSE" => Ok(0.0),
        t => to_float(name, t),
    }
}

fn into_string(t: Token) -> String {
    match t {
        Token::Bare(s) | Token::Quoted(s) => s,
    }
}

fn parse_shape(name: &str, shape: &str) -> Result<Vec<usize>> {
    shape
        .split('x')
        .map(|d| {
            d.trim()
                .parse::<usize>()
                .map_err(|_| Error::parse(name, format!("invalid array shape '{shape}'")))
        })
        .collect()
}

fn read_csv_file(name: &str, path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path)?;
    let df = csv::read_data_frame(&text)?;
    debug!(variable = name, path = %path.display(), rows = df.nrows(), "read grabbed data frame");
    // the file belongs to the run's temp dir, which decides whether it is kept
    Ok(Value::DataFrame(df))
}

/// Decode one side-file line into the variable name and its value.
pub fn parse_line(line: &str, ty: GrabType) -> Result<(String, Value)> {
    let line = line.trim_end_matches(['\r', '\n']);
    let (name, rest) = line
        .split_once('=')
        .ok_or_else(|| Error::parse(line, "no '=' found"))?;
    let name = name.trim();
    let (kind, payload) = rest
        .split_once(':')
        .ok_or_else(|| Error::parse(name, "missing value kind"))?;

    if ty == GrabType::DataFrame {
        return match kind {
            "DATAFRAME" => {
                read_csv_file(name, Path::new(payload.trim())).map(|v| (name.to_string(), v))
            }
            other => Err(Error::parse(
                name,
                format!("expected 'DATAFRAME:' value for type data.frame, got '{other}'"),
            )),
        };
    }

    let (shape, tokens) = match kind {
        "VECTOR" => (None, split_elements(name, payload)?),
        "ARRAY" => {
            let (shape, values) = payload
                .split_once(':')
                .ok_or_else(|| Error::parse(name, "array payload has no shape"))?;
            (Some(parse_shape(name, shape)?), split_elements(name, values)?)
        }
        "DATAFRAME" => {
            return Err(Error::parse(name, format!("a data frame cannot be read as {ty}")))
        }
        other => return Err(Error::parse(name, format!("unknown value kind '{other}'"))),
    };

    let value = match ty {
        GrabType::Scalar(ElemType::Float) => Value::Float(to_float(name, &scalar(name, tokens)?)?),
        GrabType::Scalar(ElemType::Int) => Value::Int(to_int(name, &scalar(name, tokens)?)?),
        GrabType::Scalar(ElemType::Bool) => Value::Bool(to_bool(name, &scalar(name, tokens)?)?),
        GrabType::Scalar(ElemType::Str) => Value::Str(into_string(scalar(name, tokens)?)),
        GrabType::List(ElemType::Float) => Value::FloatList(
            tokens.iter().map(|t| to_float(name, t)).collect::<Result<_>>()?,
        ),
        GrabType::List(ElemType::Int) => Value::IntList(
            tokens.iter().map(|t| to_int(name, t)).collect::<Result<_>>()?,
        ),
        GrabType::List(ElemType::Bool) => Value::BoolList(
            tokens.iter().map(|t| to_bool(name, t)).collect::<Result<_>>()?,
        ),
        GrabType::List(ElemType::Str) => {
            Value::StrList(tokens.into_iter().map(into_string).collect())
        }
        GrabType::Array => {
            let data = tokens
                .iter()
                .map(|t| to_array_elem(name, t))
                .collect::<Result<Vec<_>>>()?;
            let array = match shape {
                Some(shape) => NdArray::from_column_major(shape, data)
                    .ok_or_else(|| Error::parse(name, "array data does not match shape"))?,
                None => NdArray::vector(data),
            };
            Value::Array(array)
        }
        GrabType::DataFrame => unreachable!("data frames are handled above"),
    };
    Ok((name.to_string(), value))
}

/// Decode the whole side file, returning values in tag order.
pub fn parse_output(text: &str, tags: &[GrabTag]) -> Result<Vec<Grabbed>> {
    let mut lines: HashMap<&str, &str> = HashMap::new();
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        if let Some((name, _)) = line.split_once('=') {
            // a variable emitted twice keeps its last value
            lines.insert(name.trim(), line);
        }
    }
    tags.iter()
        .map(|tag| {
            let line = lines
                .get(tag.name.as_str())
                .ok_or_else(|| Error::MissingValue(tag.name.clone()))?;
            let (name, value) = parse_line(line, tag.ty)?;
            Ok(Grabbed { name, value })
        })
        .collect()
}
