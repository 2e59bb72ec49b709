use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Registered account
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub username: String,
    pub subscribe: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub username: String,
    pub subscribe: String,
    pub created_at: DateTime<Utc>,
}

// Register / login request body
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub username: Option<String>,
    pub subscribe: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct OAuthRequest {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Aquarium {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub size: String,
    pub species: Vec<Species>,
    pub plants: Vec<Plant>,
    pub equipment: Vec<Equipment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Species {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    pub role: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub feeding_habits: String,
    pub tank_requirements: String,
    pub compatibility: String,
    pub min_tank_size: u32,
    pub image_url: Option<String>,
    pub lifespan: Option<String>,
    pub size: Option<String>,
    pub water_parameters: Option<String>,
    pub breeding_info: Option<String>,
    pub behavior: Option<String>,
    pub care_level: Option<String>,
    pub dietary_restrictions: Option<String>,
    pub native_habitat: Option<String>,
    pub stocking_recommendations: Option<String>,
    pub special_considerations: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Plant {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    pub role: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub tank_requirements: String,
    pub min_tank_size: u32,
    pub compatibility: String,
    pub lifespan: Option<String>,
    pub size: Option<String>,
    pub water_parameters: Option<String>,
    pub lighting_needs: Option<String>,
    pub growth_rate: Option<String>,
    pub care_level: Option<String>,
    pub native_habitat: Option<String>,
    pub propagation_methods: Option<String>,
    pub special_considerations: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Equipment {
    pub id: String,
    pub name: String,
    pub description: String,
    pub role: String,
    pub importance: String,
    pub usage: String,
    pub special_considerations: Option<String>,
    // free-form settings, e.g. wattage or flow rate
    pub fields: serde_json::Map<String, serde_json::Value>,
    #[serde(rename = "type")]
    pub kind: String,
}

/// One catalog entry, shaped by its kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Detail {
    Species(Species),
    Plant(Plant),
    Equipment(Equipment),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetailKind {
    Species,
    Plant,
    Equipment,
}

impl std::str::FromStr for DetailKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "species" => Ok(DetailKind::Species),
            "plant" => Ok(DetailKind::Plant),
            "equipment" => Ok(DetailKind::Equipment),
            other => Err(format!("Invalid detail type: {other}")),
        }
    }
}

// Catalog file layout
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub species: Vec<Species>,
    pub plants: Vec<Plant>,
    pub equipment: Vec<Equipment>,
}

// Water parameter reading for one aquarium
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParameterEntry {
    pub id: String,
    pub aquarium_id: String,
    /// Unix seconds; 0 means "now" on creation.
    pub timestamp: i64,
    pub temperature: Option<f64>,
    pub ph: Option<f64>,
    pub hardness: Option<f64>,
}

// LLM chat message roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

// LLM query request format
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub messages: Vec<ChatMessage>,
}

// LLM query response format
#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub content: String,
}
