use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// State given to kingdoms removed from the catalogue.
pub const KINGDOM_STATE_CONQUERED: &str = "Conquered";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct Kingdom {
    pub id: i32,
    pub name: String,
    pub area: i32,
    pub capital: String,
    pub image: String,
    pub description: String,
    pub state: String,
}

/// Writable kingdom fields, shared by create and update.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KingdomInput {
    pub name: String,
    pub area: i32,
    pub capital: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub description: String,
    pub state: String,
}

impl KingdomInput {
    pub fn validate(&self) -> Result<(), String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("kingdom name is empty".to_string());
        }
        if name.chars().count() > 100 {
            return Err("kingdom name is longer than 100 characters".to_string());
        }
        if self.area < 0 {
            return Err("kingdom area must not be negative".to_string());
        }
        if self.capital.trim().is_empty() {
            return Err("kingdom capital is empty".to_string());
        }
        if self.capital.chars().count() > 50 {
            return Err("kingdom capital is longer than 50 characters".to_string());
        }
        if self.description.chars().count() > 255 {
            return Err("kingdom description is longer than 255 characters".to_string());
        }
        validate_state(&self.state)
    }
}

pub fn validate_state(state: &str) -> Result<(), String> {
    if state.trim().is_empty() {
        return Err("kingdom state is empty".to_string());
    }
    if state.chars().count() > 50 {
        return Err("kingdom state is longer than 50 characters".to_string());
    }
    Ok(())
}
