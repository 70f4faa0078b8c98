use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Access level of an account. Stored as SMALLINT and serialized as its number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "i16", try_from = "i16")]
pub enum Role {
    Unknown = 0,
    Buyer = 1,
    Manager = 2,
    Admin = 3,
}

impl Role {
    /// Managers and admins moderate kingdoms and applications.
    pub fn is_moderator(self) -> bool {
        self >= Role::Manager
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Unknown => "unknown",
            Role::Buyer => "buyer",
            Role::Manager => "manager",
            Role::Admin => "admin",
        }
    }
}

impl From<Role> for i16 {
    fn from(role: Role) -> Self {
        role as i16
    }
}

impl TryFrom<i16> for Role {
    type Error = String;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Role::Unknown),
            1 => Ok(Role::Buyer),
            2 => Ok(Role::Manager),
            3 => Ok(Role::Admin),
            other => Err(format!("unknown role {}", other)),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unknown" => Ok(Role::Unknown),
            "buyer" | "user" => Ok(Role::Buyer),
            "manager" | "moderator" => Ok(Role::Manager),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct User {
    pub id: i32,
    #[serde(rename = "UUID")]
    pub uuid: Uuid,
    pub name: String,
    pub role: i16,
    #[serde(skip_serializing, default)]
    pub password: String,
}

impl User {
    /// Unrecognised values in the table degrade to `Role::Unknown`.
    pub fn role(&self) -> Role {
        Role::try_from(self.role).unwrap_or(Role::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moderator_rights_start_at_manager() {
        assert!(!Role::Unknown.is_moderator());
        assert!(!Role::Buyer.is_moderator());
        assert!(Role::Manager.is_moderator());
        assert!(Role::Admin.is_moderator());
    }

    #[test]
    fn role_serializes_as_number() {
        assert_eq!(serde_json::to_value(Role::Manager).unwrap(), serde_json::json!(2));
        let role: Role = serde_json::from_value(serde_json::json!(3)).unwrap();
        assert_eq!(role, Role::Admin);
        assert!(serde_json::from_value::<Role>(serde_json::json!(9)).is_err());
    }

    #[test]
    fn password_is_never_serialized() {
        let user = User {
            id: 1,
            uuid: Uuid::new_v4(),
            name: "arthur".into(),
            role: 1,
            password: "$argon2id$...".into(),
        };
        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("Password").is_none());
        assert_eq!(value["Name"], "arthur");
        assert_eq!(value["Role"], 1);
    }

    #[test]
    fn unknown_stored_role_degrades() {
        let user = User {
            id: 1,
            uuid: Uuid::nil(),
            name: "x".into(),
            role: 42,
            password: String::new(),
        };
        assert_eq!(user.role(), Role::Unknown);
    }
}
