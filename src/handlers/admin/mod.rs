pub mod curriculum;
pub mod relationships;
pub mod users;

use serde_json::{json, Value};
use uuid::Uuid;

/// Body returned by every permanent delete
pub(crate) fn deleted(label: &str, id: Uuid) -> Value {
    json!({ "message": format!("{} deleted successfully", label), "id": id })
}
