//! Raw declaration types matching the JSON schema file.

use crate::model::{AuthRequirement, Parameter, Property, TypeRef};
use serde::{Deserialize, Serialize};
use utoipa::openapi::Info;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ThrowsConfig {
    pub kind: String,
    pub status: u16,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RouteConfig {
    pub name: String,
    /// HTTP method, case-insensitive.
    pub method: String,
    pub path: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub input: Vec<Parameter>,
    #[serde(default)]
    pub output: TypeRef,
    #[serde(default)]
    pub throws: Vec<ThrowsConfig>,
    #[serde(default)]
    pub authorization: Option<AuthRequirement>,
    #[serde(default = "default_status")]
    pub status: u16,
}

fn default_status() -> u16 {
    200
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ComponentConfig {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}

/// A whole declaration file: optional document info plus components in declaration order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub info: Option<Info>,
    #[serde(default)]
    pub components: Vec<ComponentConfig>,
}
