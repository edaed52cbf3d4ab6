//! Property descriptors and the closed set of property types
//!
//! Registry data spells types in a compact notation (`shortname`, `integer`,
//! `host`, `enum[o:Up,d:Down]`, a leading `*` for multi-valued properties).
//! The notation is parsed exactly once, when a registry is loaded, into
//! [`PropertyType`]; nothing downstream looks at the raw string again.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigEditorError;
use crate::values::split_multi_value;

/// Characters a shortname may not contain
pub const SHORTNAME_PATTERN: &str = r#"^[^`~!$%^&*"|'<>?,()=]+$"#;

static SHORTNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SHORTNAME_PATTERN).expect("shortname pattern is valid"));

/// One selectable value of an enum property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumOption {
    pub id: String,
    pub label: String,
}

/// Type of a property value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PropertyType {
    /// Unique identifier such as a host name or service description
    Shortname,
    Text,
    Url,
    Email,
    /// `0` or `1`
    Bool,
    /// Non-negative integer
    Integer,
    /// IP address or domain name of a host
    Address,
    /// Name of a single entity of the target kind
    Reference(String),
    Enum(Vec<EnumOption>),
    /// Comma-separated names of entities of the target kind
    MultiReference(String),
    MultiEnum(Vec<EnumOption>),
}

impl PropertyType {
    /// Whether several values may be given
    pub fn is_multiple(&self) -> bool {
        matches!(
            self,
            PropertyType::MultiReference(_) | PropertyType::MultiEnum(_)
        )
    }

    /// Kind referenced by this property, if any
    pub fn target_kind(&self) -> Option<&str> {
        match self {
            PropertyType::Reference(kind) | PropertyType::MultiReference(kind) => Some(kind),
            _ => None,
        }
    }

    /// Options of an enum property, if any
    pub fn options(&self) -> Option<&[EnumOption]> {
        match self {
            PropertyType::Enum(options) | PropertyType::MultiEnum(options) => Some(options),
            _ => None,
        }
    }

    /// Input constraints an editing form should apply for this type
    pub fn constraints(&self) -> FieldConstraints {
        let mut constraints = FieldConstraints {
            multiple: self.is_multiple(),
            ..FieldConstraints::default()
        };
        match self {
            PropertyType::Integer => constraints.min = Some(0),
            PropertyType::Shortname => {
                constraints.required = true;
                constraints.pattern = Some(SHORTNAME_PATTERN);
                constraints.placeholder = Some("Unspecified name");
            }
            PropertyType::Text => constraints.placeholder = Some("Unspecified text"),
            PropertyType::Url => constraints.placeholder = Some("Unspecified URL"),
            PropertyType::Email => constraints.placeholder = Some("Unspecified email"),
            PropertyType::Address => constraints.placeholder = Some("Unspecified address"),
            _ => {}
        }
        constraints
    }

    /// Check a non-empty raw value against this type
    pub fn validate(&self, raw: &str) -> Result<(), ValueError> {
        if self.is_multiple() {
            return split_multi_value(raw)
                .iter()
                .try_for_each(|item| self.validate_single(item));
        }
        self.validate_single(raw)
    }

    fn validate_single(&self, raw: &str) -> Result<(), ValueError> {
        match self {
            PropertyType::Shortname => {
                if SHORTNAME_RE.is_match(raw) {
                    Ok(())
                } else {
                    Err(ValueError::ForbiddenCharacters(raw.to_string()))
                }
            }
            PropertyType::Bool => match raw {
                "0" | "1" => Ok(()),
                _ => Err(ValueError::NotABool(raw.to_string())),
            },
            PropertyType::Integer => match raw.parse::<i64>() {
                Ok(n) if n >= 0 => Ok(()),
                Ok(n) => Err(ValueError::Negative(n)),
                Err(_) => Err(ValueError::NotAnInteger(raw.to_string())),
            },
            PropertyType::Enum(options) | PropertyType::MultiEnum(options) => {
                if options.iter().any(|o| o.id == raw) {
                    Ok(())
                } else {
                    Err(ValueError::UnknownOption(raw.to_string()))
                }
            }
            PropertyType::Reference(_) | PropertyType::MultiReference(_) => {
                if raw.is_empty() {
                    Err(ValueError::Missing)
                } else {
                    Ok(())
                }
            }
            PropertyType::Text | PropertyType::Url | PropertyType::Email | PropertyType::Address => {
                Ok(())
            }
        }
    }
}

fn is_kind_name(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_lowercase())
}

fn parse_enum_options(body: &str) -> Result<Vec<EnumOption>, ConfigEditorError> {
    let mut options: Vec<EnumOption> = Vec::new();
    for entry in body.split(',') {
        let (id, label) = entry.split_once(':').ok_or_else(|| {
            ConfigEditorError::Schema(format!("Enum option '{}' is missing a label", entry))
        })?;
        if id.is_empty() {
            return Err(ConfigEditorError::Schema(format!(
                "Enum option '{}' has an empty id",
                entry
            )));
        }
        if options.iter().any(|o| o.id == id) {
            return Err(ConfigEditorError::Schema(format!(
                "Duplicate enum option id '{}'",
                id
            )));
        }
        options.push(EnumOption {
            id: id.to_string(),
            label: label.to_string(),
        });
    }
    Ok(options)
}

impl FromStr for PropertyType {
    type Err = ConfigEditorError;

    fn from_str(notation: &str) -> Result<Self, Self::Err> {
        let (multiple, base) = match notation.strip_prefix('*') {
            Some(rest) => (true, rest),
            None => (false, notation),
        };

        if let Some(body) = base
            .strip_prefix("enum[")
            .and_then(|rest| rest.strip_suffix(']'))
        {
            let options = parse_enum_options(body)?;
            return Ok(if multiple {
                PropertyType::MultiEnum(options)
            } else {
                PropertyType::Enum(options)
            });
        }

        let scalar = match base {
            "shortname" => Some(PropertyType::Shortname),
            "text" => Some(PropertyType::Text),
            "url" => Some(PropertyType::Url),
            "email" => Some(PropertyType::Email),
            "bool" => Some(PropertyType::Bool),
            "integer" => Some(PropertyType::Integer),
            "address" => Some(PropertyType::Address),
            _ => None,
        };

        match scalar {
            Some(_) if multiple => Err(ConfigEditorError::Schema(format!(
                "Type '{}' cannot be multi-valued",
                base
            ))),
            Some(property_type) => Ok(property_type),
            None if is_kind_name(base) => Ok(if multiple {
                PropertyType::MultiReference(base.to_string())
            } else {
                PropertyType::Reference(base.to_string())
            }),
            None => Err(ConfigEditorError::Schema(format!(
                "Unrecognised property type '{}'",
                notation
            ))),
        }
    }
}

impl TryFrom<String> for PropertyType {
    type Error = ConfigEditorError;

    fn try_from(notation: String) -> Result<Self, Self::Error> {
        notation.parse()
    }
}

impl From<PropertyType> for String {
    fn from(property_type: PropertyType) -> Self {
        property_type.to_string()
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_options = |f: &mut fmt::Formatter<'_>, options: &[EnumOption]| {
            let body: Vec<String> = options
                .iter()
                .map(|o| format!("{}:{}", o.id, o.label))
                .collect();
            write!(f, "enum[{}]", body.join(","))
        };
        match self {
            PropertyType::Shortname => write!(f, "shortname"),
            PropertyType::Text => write!(f, "text"),
            PropertyType::Url => write!(f, "url"),
            PropertyType::Email => write!(f, "email"),
            PropertyType::Bool => write!(f, "bool"),
            PropertyType::Integer => write!(f, "integer"),
            PropertyType::Address => write!(f, "address"),
            PropertyType::Reference(kind) => write!(f, "{}", kind),
            PropertyType::MultiReference(kind) => write!(f, "*{}", kind),
            PropertyType::Enum(options) => write_options(f, options),
            PropertyType::MultiEnum(options) => {
                write!(f, "*")?;
                write_options(f, options)
            }
        }
    }
}

/// Input constraints for the form field editing a property
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldConstraints {
    pub required: bool,
    pub min: Option<i64>,
    pub pattern: Option<&'static str>,
    pub placeholder: Option<&'static str>,
    pub multiple: bool,
}

/// Why a raw value does not fit its property
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    #[error("A value is required")]
    Missing,

    #[error("'{0}' contains characters not allowed in a name")]
    ForbiddenCharacters(String),

    #[error("'{0}' is not 0 or 1")]
    NotABool(String),

    #[error("'{0}' is not an integer")]
    NotAnInteger(String),

    #[error("{0} is negative")]
    Negative(i64),

    #[error("'{0}' is not one of the allowed options")]
    UnknownOption(String),
}

/// Metadata for one property of an entity kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    pub name: String,
    #[serde(rename = "required")]
    pub is_required: bool,
    pub description: String,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl PropertyDescriptor {
    /// Form constraints, including the descriptor's own required flag
    pub fn constraints(&self) -> FieldConstraints {
        let mut constraints = self.property_type.constraints();
        constraints.required |= self.is_required;
        constraints
    }

    /// Validate a raw value; `None` or an empty string only fails when the property is required
    pub fn validate(&self, raw: Option<&str>) -> Result<(), ValueError> {
        match raw {
            None | Some("") if self.is_required => Err(ValueError::Missing),
            None | Some("") => Ok(()),
            Some(value) => self.property_type.validate(value),
        }
    }
}
