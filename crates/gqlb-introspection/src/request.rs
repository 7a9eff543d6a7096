/// The introspection query (in GraphQL syntax) to send to a server in order
/// to get its full schema.
pub const QUERY: &str = include_str!("query.graphql");

/// The JSON body of the GraphQL request to send to a server in order to get
/// its full schema.
pub fn request() -> serde_json::Value {
    serde_json::json!({ "query": QUERY })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_builds_the_request_body() {
        let body = request();

        assert_eq!(body["query"], serde_json::Value::String(QUERY.to_string()));
        assert!(QUERY.contains("fragment TypeRef on __Type"));
    }
}
