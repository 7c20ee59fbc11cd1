//! `# @grab{type}` tags: scanning R source and appending the code that
//! serializes tagged variables to a side file once the script has run.

use std::{collections::HashSet, fmt, path::Path, str::FromStr, sync::OnceLock};

use regex::Regex;
use serde::Serialize;

use crate::{
    convert::r_string_literal,
    error::{Error, Result},
};

pub mod csv;
pub mod parse;

pub use parse::{parse_line, parse_output, Grabbed};

/// Element type of a `list[...]` grab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElemType {
    Int,
    Float,
    Str,
    Bool,
}

impl FromStr for ElemType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "int" | "integer" => Ok(ElemType::Int),
            "float" | "double" | "numeric" => Ok(ElemType::Float),
            "str" | "string" | "character" => Ok(ElemType::Str),
            "bool" | "logical" => Ok(ElemType::Bool),
            other => Err(Error::UnsupportedType(other.to_string())),
        }
    }
}

impl fmt::Display for ElemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ElemType::Int => "int",
            ElemType::Float => "float",
            ElemType::Str => "str",
            ElemType::Bool => "bool",
        };
        f.write_str(s)
    }
}

/// Target type declared in a grab tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GrabType {
    Scalar(ElemType),
    List(ElemType),
    Array,
    DataFrame,
}

impl FromStr for GrabType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match s {
            "matrix" | "array" | "ndarray" | "np.ndarray" => return Ok(GrabType::Array),
            "data.frame" | "dataframe" | "DataFrame" | "pd.DataFrame" => {
                return Ok(GrabType::DataFrame)
            }
            _ => {}
        }
        for prefix in ["list[", "vec["] {
            if let Some(inner) = s.strip_prefix(prefix).and_then(|r| r.strip_suffix(']')) {
                return inner
                    .parse::<ElemType>()
                    .map(GrabType::List)
                    .map_err(|_| Error::UnsupportedType(s.to_string()));
            }
        }
        s.parse::<ElemType>()
            .map(GrabType::Scalar)
            .map_err(|_| Error::UnsupportedType(s.to_string()))
    }
}

impl fmt::Display for GrabType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrabType::Scalar(e) => write!(f, "{e}"),
            GrabType::List(e) => write!(f, "list[{e}]"),
            GrabType::Array => f.write_str("matrix"),
            GrabType::DataFrame => f.write_str("data.frame"),
        }
    }
}

/// A tagged variable found in a script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrabTag {
    pub name: String,
    pub ty: GrabType,
    /// 1-based line of the assignment following the tag.
    pub line: usize,
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*#+\s*@grab\{([^}]*)\}\s*$").expect("tag regex is valid"))
}

fn assign_left_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:`([^`=\n]+)`|([A-Za-z.][A-Za-z0-9._]*))\s*(?:<<?-|=(?:[^=]|$))")
            .expect("left assignment regex is valid")
    })
}

fn assign_right_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"->>?\s*(?:`([^`=\n]+)`|([A-Za-z.][A-Za-z0-9._]*))\s*;?\s*$")
            .expect("right assignment regex is valid")
    })
}

fn bare_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:`([^`=\n]+)`|([A-Za-z.][A-Za-z0-9._]*))\s*;?\s*$")
            .expect("bare name regex is valid")
    })
}

/// Variable assigned (or simply named) by a single line of R.
fn assigned_name(line: &str) -> Option<String> {
    let line = line.trim();
    [assign_left_re(), assign_right_re(), bare_name_re()]
        .iter()
        .find_map(|re| re.captures(line))
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().to_string())
}

/// Find every grab tag in `code`, in source order.
pub fn scan(code: &str) -> Result<Vec<GrabTag>> {
    let lines: Vec<&str> = code.lines().collect();
    let mut tags = Vec::new();
    let mut seen = HashSet::new();

    for (idx, line) in lines.iter().enumerate() {
        let Some(caps) = tag_re().captures(line) else {
            continue;
        };
        let ty: GrabType = caps[1].parse()?;
        let next = lines.get(idx + 1).ok_or_else(|| Error::InvalidTag {
            line: idx + 1,
            reason: "tag is on the last line".into(),
        })?;
        if next.trim().is_empty() {
            return Err(Error::InvalidTag {
                line: idx + 1,
                reason: "tag must be immediately followed by an assignment".into(),
            });
        }
        if tag_re().is_match(next) {
            return Err(Error::InvalidTag {
                line: idx + 1,
                reason: "tag is followed by another tag".into(),
            });
        }
        let name = assigned_name(next).ok_or_else(|| Error::InvalidTag {
            line: idx + 1,
            reason: format!("not an assignment: {}", next.trim()),
        })?;
        if !seen.insert(name.clone()) {
            return Err(Error::DuplicateTag(name));
        }
        tags.push(GrabTag {
            name,
            ty,
            line: idx + 2,
        });
    }
    Ok(tags)
}

const EMITTER: &str = r#".rinterface_emit <- function(name, x, index) {
  put <- function(...) cat(..., "\n", file = .rinterface_out, append = TRUE, sep = "")
  fmt <- function(v) {
    if (is.factor(v)) v <- as.character(v)
    if (is.character(v)) {
      out <- encodeString(v, quote = "\"")
      out[is.na(v)] <- "NA"
      out
    } else if (is.double(v)) {
      out <- sprintf("%.17g", v)
      out[is.na(v) & !is.nan(v)] <- "NA"
      out
    } else {
      as.character(v)
    }
  }
  if (is.data.frame(x)) {
    path <- file.path(.rinterface_dir, paste0("grab_df_", index, ".csv"))
    utils::write.csv(x, file = path, row.names = FALSE, fileEncoding = "UTF-8")
    put(name, "=DATAFRAME:", normalizePath(path, winslash = "/"))
  } else if (!is.null(dim(x))) {
    put(name, "=ARRAY:", paste(dim(x), collapse = "x"), ":", paste(fmt(x), collapse = ","))
  } else if (is.atomic(x) || is.factor(x)) {
    put(name, "=VECTOR:", paste(fmt(x), collapse = ","))
  } else {
    put(name, "=VECTOR:", paste(fmt(as.character(x)), collapse = ","))
  }
}
"#;

/// Append grab instrumentation for `tags` to `code`.
///
/// Grabbed values go to `out_file`, one `name=KIND:payload` line each; data
/// frames are written as CSV files under `df_dir`. The original code is left
/// untouched.
pub fn instrument(code: &str, tags: &[GrabTag], out_file: &Path, df_dir: &Path) -> String {
    if tags.is_empty() {
        return code.to_string();
    }
    let mut script = String::with_capacity(code.len() + EMITTER.len() + 64 * tags.len());
    script.push_str(code);
    if !code.ends_with('\n') {
        script.push('\n');
    }
    script.push_str("\n# Appended by rinterface: grab instrumentation\n");
    script.push_str(&format!(
        ".rinterface_out <- {}\n",
        r_string_literal(&r_path(out_file))
    ));
    script.push_str(&format!(
        ".rinterface_dir <- {}\n",
        r_string_literal(&r_path(df_dir))
    ));
    script.push_str(EMITTER);
    for (i, tag) in tags.iter().enumerate() {
        script.push_str(&format!(
            "# For variable: {}, type={}\n.rinterface_emit({}, `{}`, {}L)\n",
            tag.name,
            tag.ty,
            r_string_literal(&tag.name),
            tag.name,
            i + 1
        ));
    }
    script
}

/// R accepts forward slashes on every platform.
fn r_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
