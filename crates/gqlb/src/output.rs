//! Response and command formatting for the non-interactive paths.

use anyhow::Result;
use serde_json::Value;

/// Pretty-print response data as JSON, or as YAML with `--yaml`.
pub fn format_data(data: &Value, yaml: bool) -> Result<String> {
    if yaml {
        Ok(serde_yaml::to_string(data)?.trim_end().to_string())
    } else {
        Ok(serde_json::to_string_pretty(data)?)
    }
}

/// An equivalent cURL command line for `--curl`.
pub fn curl_command(endpoint: &str, body: &Value) -> String {
    format!(
        "curl -X POST \\\n     -H 'content-type: application/json' \\\n     '{endpoint}' \\\n     -d '{body}'"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn it_formats_json_and_yaml() {
        let data = json!({ "a": { "b": 1 } });

        assert_eq!(format_data(&data, false).unwrap(), "{\n  \"a\": {\n    \"b\": 1\n  }\n}");
        assert_eq!(format_data(&data, true).unwrap(), "a:\n  b: 1");
    }

    #[test]
    fn it_formats_a_curl_command() {
        let body = json!({ "query": "query Query {a}" });

        assert_eq!(
            curl_command("http://localhost/graphql", &body),
            "curl -X POST \\\n     \
             -H 'content-type: application/json' \\\n     \
             'http://localhost/graphql' \\\n     \
             -d '{\"query\":\"query Query {a}\"}'"
        );
    }
}
