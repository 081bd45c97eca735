//! Dictionary values carried by content streams.
//!
//! Inline image dictionaries and extended graphics state parameter
//! dictionaries are the only structured data the interpreter reads
//! directly; everything else arrives through the resource resolver.

use indexmap::IndexMap;
use smol_str::SmolStr;

/// Ordered name -> object mapping.
pub type Dict = IndexMap<SmolStr, Object>;

/// Dictionary value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Object {
    /// Boolean value
    Bool(bool),
    /// Numeric value
    Number(f64),
    /// Name object (e.g., /DeviceRGB)
    Name(SmolStr),
    /// String (byte array)
    String(Vec<u8>),
    /// Array of objects
    Array(Vec<Self>),
    /// Nested dictionary
    Dict(Dict),
}

impl Object {
    pub fn as_num(&self) -> Option<f64> {
        match self {
            Object::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        self.as_num().map(|n| n as i64)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Object::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Object::Name(n) => Some(n.as_str()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Object]> {
        match self {
            Object::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Object::Dict(d) => Some(d),
            _ => None,
        }
    }

    /// Numbers of an array, skipping non-numeric entries.
    pub fn as_numbers(&self) -> Option<Vec<f64>> {
        self.as_array()
            .map(|arr| arr.iter().filter_map(Object::as_num).collect())
    }
}
