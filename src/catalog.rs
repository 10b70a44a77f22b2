// Firestore-backed stores: the product catalog listed by merchants, plus
// per-user vehicle profile and settings documents. All access goes through
// the Firestore REST API with a service-account token.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::env;
use yup_oauth2::{ServiceAccountAuthenticator, ServiceAccountKey};

use crate::config::Settings;
use crate::models::{Product, UserSettings, VehicleProfile};

const FIRESTORE_SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/datastore",
    "https://www.googleapis.com/auth/cloud-platform",
];

// Firestore caps list pages; the catalog snapshot follows page tokens.
const PAGE_SIZE: u32 = 300;

// Gets an authenticated reqwest client using service account credentials.
// Reads credentials path from GOOGLE_APPLICATION_CREDENTIALS env var.
pub async fn get_authenticated_client() -> Result<Client> {
    let creds_path = env::var("GOOGLE_APPLICATION_CREDENTIALS")
        .context("GOOGLE_APPLICATION_CREDENTIALS environment variable not set")?;

    let sa_key: ServiceAccountKey = yup_oauth2::read_service_account_key(&creds_path)
        .await
        .context("Failed to read service account key file")?;

    let auth = ServiceAccountAuthenticator::builder(sa_key)
        .build()
        .await
        .context("Failed to create service account authenticator")?;

    let token = auth
        .token(&FIRESTORE_SCOPES)
        .await
        .context("Failed to get OAuth2 token")?;

    let mut headers = HeaderMap::new();
    let auth_value = format!(
        "Bearer {}",
        token.token().ok_or_else(|| anyhow!("Token string is empty"))?
    );
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&auth_value).context("Failed to create Authorization header")?,
    );

    Client::builder()
        .default_headers(headers)
        .build()
        .context("Failed to build authenticated reqwest client")
}

fn documents_url(settings: &Settings) -> Result<String> {
    let project_id = settings
        .firebase_project_id
        .as_deref()
        .ok_or_else(|| anyhow!("Firebase project ID not configured"))?;
    Ok(format!(
        "https://firestore.googleapis.com/v1/projects/{}/databases/(default)/documents",
        project_id
    ))
}

// --- Firestore Response Structures ---

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct FirestoreValue {
    string_value: Option<String>,
    double_value: Option<f64>,
    integer_value: Option<String>, // Firestore integers come over as strings
    boolean_value: Option<bool>,
    array_value: Option<FirestoreArrayValue>,
    map_value: Option<FirestoreMapValue>,
}

#[derive(Deserialize, Debug)]
struct FirestoreArrayValue {
    #[serde(default)]
    values: Vec<FirestoreValue>,
}

#[derive(Deserialize, Debug)]
struct FirestoreMapValue {
    #[serde(default)]
    fields: HashMap<String, FirestoreValue>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct FirestoreDocument {
    name: String,
    #[serde(default)]
    fields: HashMap<String, FirestoreValue>,
    update_time: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    documents: Option<Vec<FirestoreDocument>>,
    next_page_token: Option<String>,
}

// --- Field extraction helpers ---

fn extract_doc_id(name: &str) -> Option<String> {
    name.split('/').next_back().map(|s| s.to_string())
}

fn get_string_field<'a>(fields: &'a HashMap<String, FirestoreValue>, key: &str) -> Option<&'a str> {
    fields.get(key)?.string_value.as_deref()
}

// Numbers reach us as doubleValue, integerValue (a string), or sometimes a
// plain stringValue, depending on which client wrote the document.
fn get_number_field(fields: &HashMap<String, FirestoreValue>, key: &str) -> Option<f64> {
    let value = fields.get(key)?;
    if let Some(d) = value.double_value {
        return Some(d);
    }
    if let Some(i) = value.integer_value.as_deref() {
        if let Ok(parsed) = i.parse::<f64>() {
            return Some(parsed);
        }
    }
    value.string_value.as_deref()?.parse::<f64>().ok()
}

fn get_boolean_field(fields: &HashMap<String, FirestoreValue>, key: &str) -> Option<bool> {
    fields.get(key)?.boolean_value
}

fn get_string_array_field(fields: &HashMap<String, FirestoreValue>, key: &str) -> Vec<String> {
    fields
        .get(key)
        .and_then(|v| v.array_value.as_ref())
        .map(|arr| {
            arr.values
                .iter()
                .filter_map(|v| v.string_value.clone())
                .collect()
        })
        .unwrap_or_default()
}

fn get_string_map_field(
    fields: &HashMap<String, FirestoreValue>,
    key: &str,
) -> HashMap<String, String> {
    fields
        .get(key)
        .and_then(|v| v.map_value.as_ref())
        .map(|map| {
            map.fields
                .iter()
                .filter_map(|(k, v)| v.string_value.clone().map(|s| (k.clone(), s)))
                .collect()
        })
        .unwrap_or_default()
}

// --- Serialization helpers ---

fn to_string_value(val: &str) -> Value {
    json!({ "stringValue": val })
}

fn to_int_value(val: u32) -> Value {
    json!({ "integerValue": val.to_string() })
}

fn vehicle_profile_to_fields(profile: &VehicleProfile) -> Value {
    json!({
        "mapValue": {
            "fields": {
                "make": to_string_value(&profile.make),
                "model": to_string_value(&profile.model),
                "year": to_int_value(profile.year),
                "engine": to_string_value(&profile.engine),
                "valves": to_string_value(&profile.valves),
                "fuel": to_string_value(&profile.fuel),
                "transmission": to_string_value(&profile.transmission),
            }
        }
    })
}

// --- Document decoding ---

// A listing that fails to decode is skipped, not fatal: one merchant's bad
// document must never take the whole catalog down.
fn decode_product(doc: &FirestoreDocument) -> Option<Product> {
    let id = extract_doc_id(&doc.name)?;
    let name = get_string_field(&doc.fields, "name")?.to_string();
    let price = get_number_field(&doc.fields, "price")?;
    if price.is_nan() || price < 0.0 {
        tracing::warn!(product = %id, price, "Skipping product with invalid price");
        return None;
    }

    let updated_at = doc
        .update_time
        .as_deref()
        .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
        .map(|t| t.with_timezone(&Utc));

    Some(Product {
        id,
        name,
        description: get_string_field(&doc.fields, "description")
            .unwrap_or_default()
            .to_string(),
        category: get_string_field(&doc.fields, "category")
            .unwrap_or_default()
            .to_string(),
        price,
        compatible_models: get_string_array_field(&doc.fields, "compatibleModels"),
        specifications: get_string_map_field(&doc.fields, "specifications"),
        updated_at,
    })
}

fn decode_vehicle_profile(fields: &HashMap<String, FirestoreValue>) -> Option<VehicleProfile> {
    let vehicle = fields.get("vehicle")?.map_value.as_ref()?;
    let fields = &vehicle.fields;
    Some(VehicleProfile {
        make: get_string_field(fields, "make").unwrap_or_default().to_string(),
        model: get_string_field(fields, "model")?.to_string(),
        year: get_number_field(fields, "year").unwrap_or_default() as u32,
        engine: get_string_field(fields, "engine").unwrap_or_default().to_string(),
        valves: get_string_field(fields, "valves").unwrap_or_default().to_string(),
        fuel: get_string_field(fields, "fuel").unwrap_or_default().to_string(),
        transmission: get_string_field(fields, "transmission")
            .unwrap_or_default()
            .to_string(),
    })
}

// --- Store operations ---

// Full catalog snapshot from the `products` collection. The search core
// works on this in-memory snapshot; no pagination contract leaks past here.
pub async fn fetch_all_products(settings: &Settings) -> Result<Vec<Product>> {
    let client = get_authenticated_client().await?;
    let base_url = format!("{}/products", documents_url(settings)?);

    let mut products = Vec::new();
    let mut page_token: Option<String> = None;
    let mut skipped = 0usize;

    loop {
        let mut request = client.get(&base_url).query(&[("pageSize", PAGE_SIZE)]);
        if let Some(token) = page_token.as_deref() {
            request = request.query(&[("pageToken", token)]);
        }

        let response = request.send().await?.error_for_status()?;
        let list: ListDocumentsResponse = response
            .json()
            .await
            .context("Failed to parse product list response from Firestore")?;

        for doc in list.documents.unwrap_or_default() {
            match decode_product(&doc) {
                Some(product) => products.push(product),
                None => {
                    tracing::warn!(document = %doc.name, "Skipping undecodable product document");
                    skipped += 1;
                }
            }
        }

        page_token = list.next_page_token;
        if page_token.is_none() {
            break;
        }
    }

    tracing::info!(total = products.len(), skipped, "Loaded catalog snapshot");
    Ok(products)
}

// Fetches the user's registered vehicle, if any.
pub async fn get_vehicle_profile(
    user_id: &str,
    settings: &Settings,
) -> Result<Option<VehicleProfile>> {
    let client = get_authenticated_client().await?;
    let url = format!("{}/users/{}", documents_url(settings)?, user_id);

    let response = client.get(&url).send().await?;
    if response.status() == reqwest::StatusCode::NOT_FOUND {
        return Ok(None);
    }
    let doc: FirestoreDocument = response
        .error_for_status()?
        .json()
        .await
        .context("Failed to parse user document response from Firestore")?;

    Ok(decode_vehicle_profile(&doc.fields))
}

// Stores the user's vehicle, replacing any previous one (at most one
// registered vehicle per user).
pub async fn save_vehicle_profile(
    user_id: &str,
    profile: &VehicleProfile,
    settings: &Settings,
) -> Result<()> {
    let client = get_authenticated_client().await?;
    let url = format!("{}/users/{}", documents_url(settings)?, user_id);

    let body = json!({
        "fields": {
            "vehicle": vehicle_profile_to_fields(profile),
        }
    });

    client
        .patch(&url)
        .query(&[("updateMask.fieldPaths", "vehicle")])
        .json(&body)
        .send()
        .await?
        .error_for_status()
        .context("Failed to save vehicle profile document")?;

    tracing::info!(user = %user_id, model = %profile.model, "Saved vehicle profile");
    Ok(())
}

// Fetches user settings document
pub async fn get_user_settings(user_id: &str, settings: &Settings) -> Result<Option<UserSettings>> {
    let client = get_authenticated_client().await?;
    let url = format!("{}/users/{}", documents_url(settings)?, user_id);

    let response = client.get(&url).send().await?;
    if response.status() == reqwest::StatusCode::NOT_FOUND {
        return Ok(None);
    }
    let doc: FirestoreDocument = response
        .error_for_status()?
        .json()
        .await
        .context("Failed to parse user settings document response from Firestore")?;

    Ok(Some(UserSettings {
        can_use_ai: get_boolean_field(&doc.fields, "canUseAi"),
    }))
}
