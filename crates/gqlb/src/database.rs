//! On-disk storage of built queries, keyed by endpoint and an optional
//! query name.
//!
//! Layout under the user's data directory:
//!
//! ```text
//! gqlb/
//!   <percent-encoded endpoint>/
//!     query.json
//!     most_recent_query_name.txt
//!     query_names/
//!       <name>/query.json
//! ```
//!
//! `most_recent_query_name.txt` resolves which document a nameless lookup
//! means: the last written named query, or the default slot.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;

/// Endpoints become single path components: everything outside the
/// unreserved set is escaped.
const ENDPOINT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'.').remove(b'-').remove(b'_');

#[derive(Debug, Clone)]
pub struct Database {
    base: PathBuf,
}

impl Database {
    /// The per-user database under the platform data directory.
    pub fn open() -> Result<Self> {
        let base = dirs::data_dir()
            .context("no data directory on this platform")?
            .join("gqlb");

        Ok(Self { base })
    }

    /// A database rooted at an explicit directory.
    pub fn at(base: PathBuf) -> Self {
        Self { base }
    }

    pub fn read(&self, endpoint: &str, query_name: Option<&str>) -> Result<Value> {
        let mut path = self.query_json_path(endpoint, query_name);

        if !path.exists() && query_name.is_none() {
            if let Ok(recent) = fs::read_to_string(self.most_recent_path(endpoint)) {
                path = self.query_json_path(endpoint, Some(recent.trim()));
            }
        }

        let text = fs::read_to_string(&path)
            .with_context(|| format!("no stored query for '{endpoint}'"))?;

        serde_json::from_str(&text).with_context(|| format!("corrupt query at {}", path.display()))
    }

    pub fn write(&self, endpoint: &str, query_name: Option<&str>, tree: &Value) -> Result<()> {
        let path = self.query_json_path(endpoint, query_name);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&path, serde_json::to_string(tree)?)?;
        tracing::debug!(path = %path.display(), "wrote query");

        let marker = self.most_recent_path(endpoint);

        match query_name {
            Some(name) => fs::write(marker, name)?,
            None => {
                if marker.exists() {
                    fs::remove_file(marker)?;
                }
            }
        }

        Ok(())
    }

    /// Remove every stored query.
    pub fn clear(&self) -> Result<()> {
        if self.base.exists() {
            fs::remove_dir_all(&self.base)?;
        }

        Ok(())
    }

    /// Every `(endpoint, query name)` pair on disk; the unnamed slot lists
    /// as `<default>`.
    pub fn list(&self) -> Result<Vec<(String, String)>> {
        let mut items = Vec::new();

        let Ok(entries) = fs::read_dir(&self.base) else {
            return Ok(items);
        };

        for entry in entries {
            let entry = entry?;
            let endpoint = decode(&entry.file_name().to_string_lossy());

            if entry.path().join("query.json").exists() {
                items.push((endpoint.clone(), "<default>".to_string()));
            }

            let names = entry.path().join("query_names");

            if let Ok(names) = fs::read_dir(names) {
                for name in names {
                    let name = name?;

                    if name.path().join("query.json").exists() {
                        items.push((endpoint.clone(), name.file_name().to_string_lossy().into()));
                    }
                }
            }
        }

        items.sort();

        Ok(items)
    }

    fn endpoint_path(&self, endpoint: &str) -> PathBuf {
        self.base.join(encode(endpoint))
    }

    fn query_json_path(&self, endpoint: &str, query_name: Option<&str>) -> PathBuf {
        let mut path = self.endpoint_path(endpoint);

        if let Some(name) = query_name {
            path = path.join("query_names").join(name);
        }

        path.join("query.json")
    }

    fn most_recent_path(&self, endpoint: &str) -> PathBuf {
        self.endpoint_path(endpoint).join("most_recent_query_name.txt")
    }
}

fn encode(endpoint: &str) -> String {
    utf8_percent_encode(endpoint, ENDPOINT_ENCODE_SET).to_string()
}

fn decode(name: &str) -> String {
    percent_decode_str(name).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn it_encodes_endpoints_as_path_components() {
        assert_eq!(
            encode("https://mys-lang.org/graphql"),
            "https%3A%2F%2Fmys-lang.org%2Fgraphql"
        );
        assert_eq!(decode("https%3A%2F%2Fmys-lang.org%2Fgraphql"), "https://mys-lang.org/graphql");
    }

    #[test]
    fn it_round_trips_queries() {
        let dir = tempfile::tempdir().unwrap();
        let database = Database::at(dir.path().join("gqlb"));
        let tree = json!({ "version": 1, "root": null });

        database.write("http://one", None, &tree).unwrap();
        assert_eq!(database.read("http://one", None).unwrap(), tree);
    }

    #[test]
    fn it_resolves_the_most_recent_query_name() {
        let dir = tempfile::tempdir().unwrap();
        let database = Database::at(dir.path().join("gqlb"));

        database
            .write("http://one", Some("first"), &json!({ "slot": 1 }))
            .unwrap();
        database
            .write("http://one", Some("second"), &json!({ "slot": 2 }))
            .unwrap();

        // A nameless read resolves to the most recently written name.
        assert_eq!(database.read("http://one", None).unwrap(), json!({ "slot": 2 }));

        // Writing the default slot clears the marker.
        database.write("http://one", None, &json!({ "slot": 0 })).unwrap();
        assert_eq!(database.read("http://one", None).unwrap(), json!({ "slot": 0 }));
    }

    #[test]
    fn it_lists_stored_queries() {
        let dir = tempfile::tempdir().unwrap();
        let database = Database::at(dir.path().join("gqlb"));

        database.write("http://one", None, &json!({})).unwrap();
        database.write("http://two", Some("daily"), &json!({})).unwrap();

        assert_eq!(
            database.list().unwrap(),
            vec![
                ("http://one".to_string(), "<default>".to_string()),
                ("http://two".to_string(), "daily".to_string()),
            ]
        );

        database.clear().unwrap();
        assert_eq!(database.list().unwrap(), vec![]);
    }
}
