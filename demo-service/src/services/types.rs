//! Domain types
//!
//! Operations exchange [`Value`]s; these structs are the typed view the
//! user store works with.

use serde::{Deserialize, Serialize};
use service_trace::{OperationError, Value};

// =============================================================================
// User Types
// =============================================================================

/// User entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u32,
    pub name: String,
    pub email: String,
    pub password: String,
    pub created_at: String,
}

impl User {
    pub fn new(
        id: u32,
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            password: password.into(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Converts to an operation result.
    pub fn to_value(&self) -> Result<Value, OperationError> {
        serde_json::to_value(self)
            .map(Value::from)
            .map_err(|e| OperationError::internal(format!("failed to encode user: {}", e)))
    }
}

/// Issued by a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: u32,
    pub access_token: String,
    pub issued_at: String,
}

impl Session {
    pub fn new(user_id: u32) -> Self {
        let issued_at = chrono::Utc::now();
        Self {
            user_id,
            access_token: format!("tok-{}-{}", user_id, issued_at.timestamp_millis()),
            issued_at: issued_at.to_rfc3339(),
        }
    }

    /// Converts to an operation result.
    pub fn to_value(&self) -> Result<Value, OperationError> {
        serde_json::to_value(self)
            .map(Value::from)
            .map_err(|e| OperationError::internal(format!("failed to encode session: {}", e)))
    }
}
