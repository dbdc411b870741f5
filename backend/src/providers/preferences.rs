use std::collections::HashMap;

use async_trait::async_trait;
use chrono_tz::Tz;
use rendezvous_shared::UserPreferences;

use super::{PreferencesStore, ProviderError};

/// Preferences kept in process, falling back to default working hours in
/// the configured timezone for users that have not set anything.
#[derive(Debug, Clone)]
pub struct InMemoryPreferences {
    default_timezone: Tz,
    users: HashMap<String, UserPreferences>,
}

impl InMemoryPreferences {
    pub fn new(default_timezone: Tz) -> Self {
        Self {
            default_timezone,
            users: HashMap::new(),
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>, prefs: UserPreferences) -> Self {
        self.users.insert(user_id.into(), prefs);
        self
    }
}

#[async_trait]
impl PreferencesStore for InMemoryPreferences {
    async fn preferences(&self, user_id: &str) -> Result<UserPreferences, ProviderError> {
        Ok(self
            .users
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| UserPreferences::with_timezone(self.default_timezone)))
    }
}
