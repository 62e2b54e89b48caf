//! User accounts backed by a third-party identity provider
//!
//! An account is created on the first successful login and refreshed with
//! the provider's display attributes on every later one. Accounts are never
//! deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::UserId;

/// Registered voter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Subject id issued by the identity provider (unique)
    pub provider_subject: String,
    pub username: String,
    pub email: String,
    /// Provider avatar reference
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create an account from a first-time login
    pub fn from_profile(profile: IdentityProfile) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::generate(),
            provider_subject: profile.subject,
            username: profile.username,
            email: profile.email,
            avatar: profile.avatar,
            created_at: now,
            updated_at: now,
        }
    }

    /// Refresh display attributes from a later login
    pub fn refresh(&mut self, profile: IdentityProfile) {
        self.username = profile.username;
        self.email = profile.email;
        self.avatar = profile.avatar;
        self.updated_at = Utc::now();
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id.clone(),
            username: self.username.clone(),
            avatar: self.avatar.clone(),
            provider_subject: self.provider_subject.clone(),
        }
    }
}

/// Profile attributes reported by the identity provider at login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityProfile {
    pub subject: String,
    pub username: String,
    pub email: String,
    pub avatar: Option<String>,
}

/// Public subset of a user shown next to activity entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    pub avatar: Option<String>,
    pub provider_subject: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str) -> IdentityProfile {
        IdentityProfile {
            subject: "discord-1".into(),
            username: name.into(),
            email: format!("{name}@example.com"),
            avatar: None,
        }
    }

    #[test]
    fn test_refresh_keeps_identity() {
        let mut user = User::from_profile(profile("alice"));
        let id = user.id.clone();
        let created = user.created_at;

        user.refresh(profile("alice2"));

        assert_eq!(user.id, id);
        assert_eq!(user.created_at, created);
        assert_eq!(user.username, "alice2");
        assert_eq!(user.email, "alice2@example.com");
    }
}
