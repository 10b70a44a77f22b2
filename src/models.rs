// Data structures shared across the crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// A catalog entry as listed by the merchant back office. Read-only here:
// the search core never mutates a product.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")] // Match JavaScript frontend keys
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub price: f64,
    // Free-text vehicle model strings; matching is substring-based on
    // normalized text, not exact. Data entry in this market is inconsistent.
    #[serde(default)]
    pub compatible_models: Vec<String>,
    // Open-ended, category-dependent key/value pairs. A missing key means
    // "unspecified", not "no match".
    #[serde(default)]
    pub specifications: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

// The searching user's registered vehicle. At most one per user.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct VehicleProfile {
    pub make: String,
    pub model: String,
    #[serde(default)]
    pub year: u32,
    // Displacement code, e.g. "1.0"
    #[serde(default)]
    pub engine: String,
    // Valve code, e.g. "16v"
    #[serde(default)]
    pub valves: String,
    #[serde(default)]
    pub fuel: String,
    #[serde(default)]
    pub transmission: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
    #[default]
    Unset,
}

// Filter state owned by the frontend, sent with every search invocation.
// Every field is independently optional; an unset field skips its predicate.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    pub category: Option<String>,
    // None means "no price ceiling". A ceiling only applies when positive,
    // so a zero smuggled over the wire cannot erase the catalog.
    pub max_price: Option<f64>,
    // Manual vehicle filters, used only when use_my_vehicle is off.
    pub make: Option<String>,
    pub model: Option<String>,
    #[serde(default)]
    pub sort_order: SortOrder,
    // Attribute key -> selected value. Empty values are wildcards.
    #[serde(default)]
    pub attributes: HashMap<String, String>,
    #[serde(default)]
    pub use_my_vehicle: bool,
}

// Output of the keyword suggestion service. Default is the degraded empty
// response used whenever the service is unavailable.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct AiResponse {
    #[serde(default)]
    pub suggested_part_type: String,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

// Per-user settings stored in Firestore.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub can_use_ai: Option<bool>,
}

// Struct to capture the ID token submitted from the login form
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    // Field name must match the 'name' attribute in the HTML form input
    #[serde(rename = "idToken")]
    pub id_token: String,
}
