// ABOUTME: Tool exposing the latest hospital snapshot from the local store.
// ABOUTME: An empty store surfaces as a placeholder observation, not a hard failure.

use async_trait::async_trait;
use serde_json::{Value, json};
use surge_store::{SnapshotStore, StoreError};

use super::{Tool, failure};

/// Tool returning the most recent hospital snapshot. Takes no meaningful
/// input; the loop passes `{}` by convention and the contents are ignored.
pub struct HospitalStateTool {
    store: SnapshotStore,
}

impl HospitalStateTool {
    pub fn new(store: SnapshotStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for HospitalStateTool {
    fn name(&self) -> &str {
        "get_hospital_state_tool"
    }

    fn description(&self) -> &str {
        "Get the latest hospital metrics (bed/ICU occupancy, OPD visits by department) and \
         supply levels (PPE, vaccines, blood bank) from the local dataset. \
         Input MUST be a JSON object, contents ignored, e.g. {}."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    async fn call(&self, _input: &Value) -> String {
        match self.store.read_latest() {
            Ok(snapshot) => match serde_json::to_value(&snapshot) {
                Ok(data) => json!({ "status": "success", "data": data }).to_string(),
                Err(e) => failure(e),
            },
            Err(StoreError::NotFound) => json!({
                "status": "success",
                "data": Value::Null,
                "message": "no hospital snapshot recorded yet"
            })
            .to_string(),
            Err(e) => failure(e),
        }
    }
}
