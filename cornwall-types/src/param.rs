use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single effect parameter value as stored in the effects document.
///
/// Values are kept in the shape the user typed them: `gain=6` stays an
/// integer, `factor=1.5` a float and `width=1q` a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    /// Parse a CLI value: integer first, then float, otherwise kept as text.
    pub fn parse(raw: &str) -> Self {
        if let Ok(v) = raw.parse::<i64>() {
            return ParamValue::Int(v);
        }
        // "inf"/"nan" parse as f64 but cannot be written to JSON
        if let Some(v) = raw.parse::<f64>().ok().filter(|v| v.is_finite()) {
            return ParamValue::Float(v);
        }
        ParamValue::Text(raw.to_string())
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(v) => write!(f, "{}", v),
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Text(v) => f.write_str(v),
        }
    }
}

pub type Params = BTreeMap<String, ParamValue>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamParseError(pub String);

impl fmt::Display for ParamParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parameter must be key=value, got: {}", self.0)
    }
}

impl std::error::Error for ParamParseError {}

/// Parse `key=value` pairs. The value may itself contain `=`.
pub fn parse_params<S: AsRef<str>>(args: &[S]) -> Result<Params, ParamParseError> {
    let mut params = Params::new();
    for arg in args {
        let arg = arg.as_ref();
        let (key, value) = arg
            .split_once('=')
            .filter(|(k, _)| !k.is_empty())
            .ok_or_else(|| ParamParseError(arg.to_string()))?;
        params.insert(key.to_string(), ParamValue::parse(value));
    }
    Ok(params)
}
