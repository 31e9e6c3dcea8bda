use super::role::{Role, UnknownRole};
use serde::{Deserialize, Deserializer, Serialize};

/// Identity of the signed-in user as returned by `GET /auth/user/`.
///
/// `user_type` is kept as the raw string the backend sent so that a session
/// holding an unrecognised role can still be restored and then refused by the
/// gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub email: String,
    #[serde(default = "default_user_type")]
    pub user_type: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

fn default_user_type() -> String {
    Role::Patient.as_str().to_string()
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

impl User {
    pub fn role(&self) -> Result<Role, UnknownRole> {
        self.user_type.parse()
    }

    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.email
                .split('@')
                .next()
                .unwrap_or("User")
                .to_string()
        } else {
            full.to_string()
        }
    }

    pub fn initials(&self) -> String {
        let initials: String = [&self.first_name, &self.last_name]
            .iter()
            .filter_map(|part| part.trim().chars().next())
            .flat_map(char::to_uppercase)
            .collect();

        if initials.is_empty() {
            self.email
                .chars()
                .next()
                .map(|c| c.to_uppercase().collect())
                .unwrap_or_else(|| "U".to_string())
        } else {
            initials
        }
    }
}
