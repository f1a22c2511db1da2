//! Part catalog domain types.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    #[default]
    Unknown,
    Engine,
    Fuel,
    Porthole,
    Wing,
}

impl Category {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Engine => "ENGINE",
            Self::Fuel => "FUEL",
            Self::Porthole => "PORTHOLE",
            Self::Wing => "WING",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UNKNOWN" => Ok(Self::Unknown),
            "ENGINE" => Ok(Self::Engine),
            "FUEL" => Ok(Self::Fuel),
            "PORTHOLE" => Ok(Self::Porthole),
            "WING" => Ok(Self::Wing),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manufacturer {
    pub name: String,
    pub country: String,
    #[serde(default)]
    pub website: String,
}

/// Typed metadata value.
///
/// In JSON a value is written bare: `"steel"`, `12`, `0.5` or `true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    String(String),
    Int64(i64),
    Float64(f64),
    Bool(bool),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub part_uuid: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub stock_quantity: i64,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub dimensions: Dimensions,
    #[serde(default)]
    pub manufacturer: Manufacturer,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, MetadataValue>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn category_strings() {
        for c in [
            Category::Unknown,
            Category::Engine,
            Category::Fuel,
            Category::Porthole,
            Category::Wing,
        ] {
            assert_eq!(c.as_str().parse::<Category>().unwrap(), c);
        }
        assert!("ROCKET".parse::<Category>().is_err());
    }

    #[test]
    fn metadata_values_keep_their_type() {
        let json = r#"{"alloy":"titanium","stages":2,"ratio":0.75,"reusable":true}"#;
        let map: BTreeMap<String, MetadataValue> = serde_json::from_str(json).unwrap();
        assert_eq!(map["alloy"], MetadataValue::String("titanium".into()));
        assert_eq!(map["stages"], MetadataValue::Int64(2));
        assert_eq!(map["ratio"], MetadataValue::Float64(0.75));
        assert_eq!(map["reusable"], MetadataValue::Bool(true));
    }
}
