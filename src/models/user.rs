use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubUser {
    pub login: String,
    pub id: u64,
    pub name: Option<String>,
}

impl GitHubUser {
    /// `Name (login)` when the profile carries a name, otherwise the login.
    pub fn display_name(&self) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => format!("{} ({})", name, self.login),
            _ => self.login.clone(),
        }
    }
}

/// The abbreviated user object embedded in other resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub login: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub html_url: String,
    pub owner: UserRef,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        let mut user: GitHubUser =
            serde_json::from_str(r#"{"login": "octo", "id": 1, "name": "Octo Cat"}"#).unwrap();
        assert_eq!(user.display_name(), "Octo Cat (octo)");

        user.name = Some("  ".to_string());
        assert_eq!(user.display_name(), "octo");

        user.name = None;
        assert_eq!(user.display_name(), "octo");
    }
}
