use std::collections::BTreeSet;

use serde::Serialize;

use crate::navigation::error::NavigationError;

/// Check an identifier against `[a-zA-Z0-9_]+`
pub fn validate_identifier(id: &str) -> Result<(), NavigationError> {
    if !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(NavigationError::InvalidIdentifier(id.to_string()))
    }
}

/// A navigation tool: a named menu set with its own topbar and sidebar
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tool {
    id: String,
    pub title: String,
    /// Higher priority wins when a merging tool meets an existing one
    pub priority: i32,
    /// Whether this tool may overwrite an existing tool with the same id
    pub merge: bool,
    pub roles: BTreeSet<String>,
}

impl Tool {
    pub fn new(id: &str, title: &str) -> Result<Self, NavigationError> {
        validate_identifier(id)?;
        Ok(Self {
            id: id.to_string(),
            title: title.to_string(),
            priority: 0,
            merge: false,
            roles: BTreeSet::new(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_merge(mut self, merge: bool) -> Self {
        self.merge = merge;
        self
    }

    pub fn with_role(mut self, role: &str) -> Self {
        self.roles.insert(role.to_string());
        self
    }
}
