//! User management data models.

use serde::{Deserialize, Serialize};

/// Editable profile fields. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub image: Option<String>,
}

/// Account counts by role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub total: i64,
    pub admins: i64,
    pub regular_users: i64,
}
