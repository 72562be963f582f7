use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Canonical profile record. Every endpoint that returns a profile returns
/// exactly this shape, never wrapped in an extra envelope.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    /// Immutable after creation; a patch cannot carry this field.
    pub email: String,
    /// Storage key of the profile image, issued by the upload coordinator.
    pub profile_asset_key: Option<String>,
    pub gender: Option<String>,
    pub age: Option<i32>,
    pub about: Option<String>,
    /// Ordered set of trimmed, deduplicated skill names.
    pub skills: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for provisioning a profile record at registration time. The
/// registration/credential flow itself lives in the external auth layer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProfile {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub gender: Option<String>,
    pub age: Option<i32>,
    pub about: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}

/// Partial profile update. Unknown fields are rejected outright, which is
/// what makes `email` effectively immutable at the wire boundary.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProfilePatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_asset_key: Option<String>,
    pub gender: Option<String>,
    pub age: Option<i32>,
    pub about: Option<String>,
    pub skills: Option<Vec<String>>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.profile_asset_key.is_none()
            && self.gender.is_none()
            && self.age.is_none()
            && self.about.is_none()
            && self.skills.is_none()
    }
}
