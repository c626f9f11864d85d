//! Invoke a deployed model service.

use serde_json::Value;

use crate::error::Result;

/// POST a JSON body to a deployed service and return the parsed response.
///
/// The request/response schema is whatever the deployed model serves; this
/// helper only handles transport.
pub fn invoke(url: &str, body: &Value) -> Result<Value> {
    let agent = ureq::Agent::new_with_defaults();
    let response: Value = agent
        .post(url)
        .header("Content-Type", "application/json")
        .header(
            "User-Agent",
            concat!("modelport/", env!("CARGO_PKG_VERSION")),
        )
        .send_json(body)?
        .body_mut()
        .read_json()?;
    Ok(response)
}
