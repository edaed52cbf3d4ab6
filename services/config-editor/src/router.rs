//! Navigation token routing
//!
//! Tokens are lowercase English plurals of a kind (`hosts`), optionally with
//! a `template` infix before the plural `s` (`hosttemplates`). Exactly one
//! trailing `s` is stripped, so a kind whose singular form already ends in
//! `s` cannot be reached through its plural.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigEditorError, Result};
use crate::schema::SchemaRegistry;

pub const TEMPLATE_SUFFIX: &str = "template";

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]+$").expect("token pattern is valid"));

/// A resolved view: which kind, and whether its templates or instances are shown
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewTarget {
    pub kind: String,
    pub is_template: bool,
}

impl ViewTarget {
    pub fn new(kind: impl Into<String>, is_template: bool) -> Self {
        Self {
            kind: kind.into(),
            is_template,
        }
    }

    /// Path segment naming this view, e.g. `host` or `hosttemplate`
    pub fn segment(&self) -> String {
        if self.is_template {
            format!("{}{}", self.kind, TEMPLATE_SUFFIX)
        } else {
            self.kind.clone()
        }
    }

    /// Canonical navigation token, e.g. `hosts` or `hosttemplates`
    pub fn token(&self) -> String {
        format!("{}s", self.segment())
    }
}

/// Split a token into kind and template flag without checking the kind
pub fn parse_token(token: &str) -> Result<ViewTarget> {
    let token = token.strip_prefix('#').unwrap_or(token);
    if !TOKEN_RE.is_match(token) {
        return Err(ConfigEditorError::InvalidToken(token.to_string()));
    }

    let singular = token.strip_suffix('s').unwrap_or(token);
    let target = match singular.strip_suffix(TEMPLATE_SUFFIX) {
        Some(kind) => ViewTarget::new(kind, true),
        None => ViewTarget::new(singular, false),
    };

    if target.kind.is_empty() {
        return Err(ConfigEditorError::InvalidToken(token.to_string()));
    }
    Ok(target)
}

/// Resolves navigation tokens against the schema registry
#[derive(Debug, Clone)]
pub struct ViewRouter {
    registry: Arc<SchemaRegistry>,
}

impl ViewRouter {
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self { registry }
    }

    /// Resolve a token to a registered kind
    pub fn resolve(&self, token: &str) -> Result<ViewTarget> {
        let target = parse_token(token)?;
        if !self.registry.contains(&target.kind) {
            tracing::warn!(
                "Could not find a structure type for type '{}'",
                target.kind
            );
            return Err(ConfigEditorError::SchemaNotFound(target.kind));
        }
        tracing::debug!("Token '{}' resolved to {:?}", token, target);
        Ok(target)
    }
}
