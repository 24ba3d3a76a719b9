use serde::{Deserialize, Serialize};

const ANONYMOUS: &str = "Anonymous";

/// The signed-in user as reported by the identity widget.
///
/// All three values are opaque. The data-access layer forwards `id` to the
/// backend for row-level authorization and stamps `name`/`email` onto rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl Actor {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            email: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(ANONYMOUS)
    }

    pub fn email(&self) -> &str {
        self.email.as_deref().unwrap_or("")
    }
}
