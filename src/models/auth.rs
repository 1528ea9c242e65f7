use serde::{Deserialize, Serialize};

/// The session identity, distinct from the user-facing profile record.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
}
