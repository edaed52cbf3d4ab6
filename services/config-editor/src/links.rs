//! Links into the configuration API
//!
//! Every record is addressed by its identity: `name` for templates, the
//! kind's key property for instances. Service descriptions are only unique
//! per host/host group, so service links append a container suffix
//! (`$host+hostgroup`).

use std::fmt;

use crate::router::ViewTarget;
use crate::schema::EntityTypeDescriptor;
use crate::values::{value_text, AttributeMap};

pub const SERVICE_KIND: &str = "service";

const HOST_PREFIX: char = '$';
const HOSTGROUP_PREFIX: char = '+';

/// Host and host group a service is attached to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceContainers {
    pub host: Option<String>,
    pub hostgroup: Option<String>,
}

impl ServiceContainers {
    /// Read `host_name` and `hostgroup_name` from a row, ignoring empty values
    pub fn from_row(row: &AttributeMap) -> Self {
        Self {
            host: row.get("host_name").and_then(value_text),
            hostgroup: row.get("hostgroup_name").and_then(value_text),
        }
    }

    /// Parse a `$host+hostgroup` suffix; either part may be missing and they may come in either order
    pub fn parse(suffix: &str) -> Self {
        let host_at = suffix.find(HOST_PREFIX);
        let hostgroup_at = suffix.find(HOSTGROUP_PREFIX);

        let part = |start: usize, end: Option<usize>| {
            let value = &suffix[start + 1..end.unwrap_or(suffix.len())];
            (!value.is_empty()).then(|| value.to_string())
        };

        match (host_at, hostgroup_at) {
            (Some(h), Some(g)) if h < g => Self {
                host: part(h, Some(g)),
                hostgroup: part(g, None),
            },
            (Some(h), Some(g)) => Self {
                host: part(h, None),
                hostgroup: part(g, Some(h)),
            },
            (Some(h), None) => Self {
                host: part(h, None),
                hostgroup: None,
            },
            (None, Some(g)) => Self {
                host: None,
                hostgroup: part(g, None),
            },
            (None, None) => Self::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.host.is_none() && self.hostgroup.is_none()
    }
}

impl fmt::Display for ServiceContainers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(host) = &self.host {
            write!(f, "{}{}", HOST_PREFIX, host)?;
        }
        if let Some(hostgroup) = &self.hostgroup {
            write!(f, "{}{}", HOSTGROUP_PREFIX, hostgroup)?;
        }
        Ok(())
    }
}

/// Identity of one row or record, as used in links
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowIdentity {
    pub id: String,
    pub containers: ServiceContainers,
}

impl RowIdentity {
    /// Identity of a row of the given view; `None` when the identity column is empty
    pub fn from_row(
        target: &ViewTarget,
        descriptor: &EntityTypeDescriptor,
        row: &AttributeMap,
    ) -> Option<Self> {
        let key = descriptor.identity_property(target.is_template);
        let id = row.get(key).and_then(value_text)?;
        let containers = if target.kind == SERVICE_KIND {
            ServiceContainers::from_row(row)
        } else {
            ServiceContainers::default()
        };
        Some(Self { id, containers })
    }

    /// Path form: `id` or `id/$host+hostgroup`
    pub fn path(&self) -> String {
        if self.containers.is_empty() {
            self.id.clone()
        } else {
            format!("{}/{}", self.id, self.containers)
        }
    }
}

/// Builds absolute links from the API base URL
#[derive(Debug, Clone)]
pub struct LinkBuilder {
    base_url: String,
}

impl LinkBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Listing endpoint of a view
    pub fn list(&self, target: &ViewTarget) -> String {
        let suffix = if target.is_template { "templates" } else { "s" };
        self.url(&format!("/config/list/{}{}", target.kind, suffix))
    }

    pub fn create(&self, target: &ViewTarget) -> String {
        self.url(&format!("/config/{}/create", target.segment()))
    }

    pub fn edit(&self, target: &ViewTarget, identity: &RowIdentity) -> String {
        self.url(&format!("/config/{}/{}", target.segment(), identity.path()))
    }

    pub fn advanced_edit(&self, target: &ViewTarget, identity: &RowIdentity) -> String {
        self.url(&format!(
            "/config/expert/{}/{}",
            target.segment(),
            identity.path()
        ))
    }

    pub fn delete(&self, target: &ViewTarget, identity: &RowIdentity) -> String {
        self.url(&format!(
            "/config/delete/{}/{}",
            target.segment(),
            identity.path()
        ))
    }
}
