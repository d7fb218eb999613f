//! Per-target route tables.
//!
//! The two demo backends expose the same user-record API under different
//! path layouts, so every target carries its own operation → route mapping.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::client::HttpMethod;

/// Logical action the runner can perform against a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Health,
    Get,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::Health,
        Operation::Get,
        Operation::Create,
        Operation::Update,
        Operation::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Health => "health",
            Operation::Get => "get",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }

    /// Human-readable name used in result records.
    pub fn label(&self) -> &'static str {
        match self {
            Operation::Health => "Health Check",
            Operation::Get => "Get User",
            Operation::Create => "Create User",
            Operation::Update => "Update User",
            Operation::Delete => "Delete User",
        }
    }

    /// Whether the operation sends a `{"data": ...}` body.
    pub fn requires_body(&self) -> bool {
        matches!(self, Operation::Create | Operation::Update)
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown operation '{0}' (expected health, get, create, update or delete)")]
pub struct UnknownOperation(pub String);

impl FromStr for Operation {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownOperation(s.to_string()))
    }
}

/// Placeholder substituted with the record id.
pub const ID_PLACEHOLDER: &str = "{id}";

/// Method plus path template, e.g. `PUT /api/users/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub method: HttpMethod,
    pub path: String,
}

impl Route {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }

    pub fn needs_id(&self) -> bool {
        self.path.contains(ID_PLACEHOLDER)
    }

    /// Substitute `{id}` into the template as a single percent-encoded path segment.
    pub fn render(&self, id: &str) -> String {
        self.path.replace(ID_PLACEHOLDER, &urlencoding::encode(id))
    }
}

/// Built-in path layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathStyle {
    /// `/api/users/{id}`
    #[default]
    Api,
    /// `/users/{id}`
    Bare,
}

impl PathStyle {
    fn users_path(&self) -> &'static str {
        match self {
            PathStyle::Api => "/api/users/{id}",
            PathStyle::Bare => "/users/{id}",
        }
    }
}

/// Config-level override of one operation's route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteOverride {
    pub operation: Operation,
    pub method: HttpMethod,
    pub path: String,
}

/// Operation → route mapping for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    routes: HashMap<Operation, Route>,
}

impl RouteTable {
    pub fn for_style(style: PathStyle) -> Self {
        let users = style.users_path();
        let routes = HashMap::from([
            (Operation::Health, Route::new(HttpMethod::Get, "/health")),
            (Operation::Get, Route::new(HttpMethod::Get, users)),
            (Operation::Create, Route::new(HttpMethod::Post, users)),
            (Operation::Update, Route::new(HttpMethod::Put, users)),
            (Operation::Delete, Route::new(HttpMethod::Delete, users)),
        ]);
        Self { routes }
    }

    pub fn with_override(mut self, ov: &RouteOverride) -> Self {
        self.routes
            .insert(ov.operation, Route::new(ov.method, ov.path.clone()));
        self
    }

    pub fn route(&self, operation: Operation) -> &Route {
        // Every constructor populates all five operations.
        &self.routes[&operation]
    }
}
