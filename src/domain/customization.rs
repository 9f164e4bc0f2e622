//! Product customizations chosen by a shopper.
//!
//! A selection maps each customization kind to at most one value. Keys are
//! kept in a `BTreeMap`, so the JSON encoding is sorted by key and two
//! selections with the same content always produce the same
//! [`CustomizationSelection::canonical_key`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomizationKind {
    Engraving,
    BandColor,
    CaseMaterial,
    DialColor,
    Gemstone,
    MetalType,
    Size,
    Length,
}

impl CustomizationKind {
    pub const ALL: [CustomizationKind; 8] = [
        CustomizationKind::Engraving,
        CustomizationKind::BandColor,
        CustomizationKind::CaseMaterial,
        CustomizationKind::DialColor,
        CustomizationKind::Gemstone,
        CustomizationKind::MetalType,
        CustomizationKind::Size,
        CustomizationKind::Length,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CustomizationKind::Engraving => "engraving",
            CustomizationKind::BandColor => "band_color",
            CustomizationKind::CaseMaterial => "case_material",
            CustomizationKind::DialColor => "dial_color",
            CustomizationKind::Gemstone => "gemstone",
            CustomizationKind::MetalType => "metal_type",
            CustomizationKind::Size => "size",
            CustomizationKind::Length => "length",
        }
    }

    /// Short label used in admin notifications.
    pub fn label(self) -> &'static str {
        match self {
            CustomizationKind::Engraving => "Engraving",
            CustomizationKind::BandColor => "Band",
            CustomizationKind::CaseMaterial => "Case",
            CustomizationKind::DialColor => "Dial",
            CustomizationKind::Gemstone => "Gemstone",
            CustomizationKind::MetalType => "Metal",
            CustomizationKind::Size => "Size",
            CustomizationKind::Length => "Length",
        }
    }
}

impl fmt::Display for CustomizationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CustomizationKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CustomizationKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| DomainError::InvalidInput(format!("unknown customization '{s}'")))
    }
}

/// A single chosen customization with its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Customization {
    Engraving(String),
    BandColor(String),
    CaseMaterial(String),
    DialColor(String),
    Gemstone(String),
    MetalType(String),
    Size(String),
    Length(String),
}

impl Customization {
    pub fn new(kind: CustomizationKind, value: String) -> Self {
        match kind {
            CustomizationKind::Engraving => Customization::Engraving(value),
            CustomizationKind::BandColor => Customization::BandColor(value),
            CustomizationKind::CaseMaterial => Customization::CaseMaterial(value),
            CustomizationKind::DialColor => Customization::DialColor(value),
            CustomizationKind::Gemstone => Customization::Gemstone(value),
            CustomizationKind::MetalType => Customization::MetalType(value),
            CustomizationKind::Size => Customization::Size(value),
            CustomizationKind::Length => Customization::Length(value),
        }
    }

    pub fn kind(&self) -> CustomizationKind {
        match self {
            Customization::Engraving(_) => CustomizationKind::Engraving,
            Customization::BandColor(_) => CustomizationKind::BandColor,
            Customization::CaseMaterial(_) => CustomizationKind::CaseMaterial,
            Customization::DialColor(_) => CustomizationKind::DialColor,
            Customization::Gemstone(_) => CustomizationKind::Gemstone,
            Customization::MetalType(_) => CustomizationKind::MetalType,
            Customization::Size(_) => CustomizationKind::Size,
            Customization::Length(_) => CustomizationKind::Length,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Customization::Engraving(v)
            | Customization::BandColor(v)
            | Customization::CaseMaterial(v)
            | Customization::DialColor(v)
            | Customization::Gemstone(v)
            | Customization::MetalType(v)
            | Customization::Size(v)
            | Customization::Length(v) => v,
        }
    }
}

impl fmt::Display for Customization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Customization::Engraving(text) => write!(f, "Engraving: '{text}'"),
            other => write!(f, "{}: {}", other.kind().label(), other.value()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct CustomizationSelection(BTreeMap<CustomizationKind, String>);

impl CustomizationSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a selection from a free-form JSON payload.
    ///
    /// `null` and `{}` are the empty selection. Blank values and the string
    /// `"None"` are dropped, numbers are accepted as their decimal text, and
    /// any key outside [`CustomizationKind`] is rejected.
    pub fn from_json(payload: Option<&Value>) -> Result<Self, DomainError> {
        let object = match payload {
            None | Some(Value::Null) => return Ok(Self::new()),
            Some(Value::Object(object)) => object,
            Some(_) => {
                return Err(DomainError::InvalidInput(
                    "customization must be an object".to_string(),
                ))
            }
        };

        let mut selection = Self::new();
        for (key, value) in object {
            let kind: CustomizationKind = key.parse()?;
            let text = match value {
                Value::Null => continue,
                Value::String(s) => s.trim().to_string(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(DomainError::InvalidInput(format!(
                        "customization '{key}' must be a scalar value"
                    )))
                }
            };
            if text.is_empty() || text == "None" {
                continue;
            }
            selection.insert(Customization::new(kind, text));
        }
        Ok(selection)
    }

    pub fn insert(&mut self, customization: Customization) {
        let kind = customization.kind();
        let value = match customization {
            Customization::Engraving(v)
            | Customization::BandColor(v)
            | Customization::CaseMaterial(v)
            | Customization::DialColor(v)
            | Customization::Gemstone(v)
            | Customization::MetalType(v)
            | Customization::Size(v)
            | Customization::Length(v) => v,
        };
        self.0.insert(kind, value);
    }

    pub fn get(&self, kind: CustomizationKind) -> Option<&str> {
        self.0.get(&kind).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Customization> + '_ {
        self.0
            .iter()
            .map(|(kind, value)| Customization::new(*kind, value.clone()))
    }

    /// Sorted-key JSON encoding used for the cart-item uniqueness constraint.
    pub fn canonical_key(&self) -> String {
        serde_json::to_string(&self.to_map()).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(kind, value)| (kind.as_str().to_string(), Value::String(value.clone())))
                .collect(),
        )
    }

    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.0
            .iter()
            .map(|(kind, value)| (kind.as_str().to_string(), value.clone()))
            .collect()
    }
}

impl TryFrom<BTreeMap<String, String>> for CustomizationSelection {
    type Error = DomainError;

    fn try_from(map: BTreeMap<String, String>) -> Result<Self, Self::Error> {
        let mut selection = Self::new();
        for (key, value) in map {
            selection.insert(Customization::new(key.parse()?, value));
        }
        Ok(selection)
    }
}

impl From<CustomizationSelection> for BTreeMap<String, String> {
    fn from(selection: CustomizationSelection) -> Self {
        selection.to_map()
    }
}

impl fmt::Display for CustomizationSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|c| c.to_string()).collect();
        f.write_str(&parts.join(", "))
    }
}
