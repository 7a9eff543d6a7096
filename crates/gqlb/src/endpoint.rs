//! The HTTP side: introspection fetch and query execution.

use anyhow::{bail, Context, Result};
use gqlb_introspection::{Introspection, Response};
use serde_json::Value;

/// POST a GraphQL request body and return the response JSON. Non-2xx
/// responses fail with the endpoint and status in the message.
pub fn post(
    endpoint: &str,
    body: &Value,
    headers: &[(String, String)],
    verify: bool,
) -> Result<Value> {
    let client = reqwest::blocking::Client::builder()
        .danger_accept_invalid_certs(!verify)
        .build()?;

    let mut request = client.post(endpoint).json(body);

    for (key, value) in headers {
        request = request.header(key, value);
    }

    tracing::debug!(endpoint, "POST");
    let response = request
        .send()
        .with_context(|| format!("POST to '{endpoint}' failed"))?;

    let status = response.status();

    if !status.is_success() {
        let text = response.text().unwrap_or_default();
        bail!("'{endpoint}' answered {status}: {text}");
    }

    response
        .json()
        .with_context(|| format!("'{endpoint}' answered with invalid JSON"))
}

/// Run the standard introspection query and return the typed document.
pub fn fetch_schema(
    endpoint: &str,
    headers: &[(String, String)],
    verify: bool,
) -> Result<Introspection> {
    let value = post(endpoint, &gqlb_introspection::request(), headers, verify)?;
    let response: Response = serde_json::from_value(value)
        .with_context(|| format!("'{endpoint}' answered with an unexpected shape"))?;

    Ok(response.into_result()?)
}

/// The request body for an operation, with `variables` attached only when
/// any were given.
pub fn request_body(query: &str, variables: &serde_json::Map<String, Value>) -> Value {
    if variables.is_empty() {
        serde_json::json!({ "query": query })
    } else {
        serde_json::json!({ "query": query, "variables": variables })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn it_attaches_variables_only_when_present() {
        let none = serde_json::Map::new();
        assert_eq!(request_body("{a}", &none), json!({ "query": "{a}" }));

        let mut some = serde_json::Map::new();
        some.insert("a".to_string(), json!(5));
        assert_eq!(
            request_body("{a}", &some),
            json!({ "query": "{a}", "variables": { "a": 5 } })
        );
    }
}
