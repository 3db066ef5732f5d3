//! Fact normalization.
//!
//! Docker prints inspection records with Go-style field names
//! (`RepoTags`, `NetworkSettings`, `ID`). Everything downstream works on
//! snake_case keys instead, so records are rewritten once, right after
//! they are fetched.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::resource::ResourceKind;

/// Keys lower-cased as whole tokens instead of being split at capitals.
const WHOLE_TOKEN_KEYS: [&str; 3] = ["ID", "IPv6", "IPv4"];

/// Maps whose keys are user data (label names, driver options); copied verbatim.
const VERBATIM_KEYS: [&str; 3] = ["Labels", "Options", "DriverOpts"];

/// Maps keyed by a user-chosen name whose values are records.
const NAME_KEYED_KEYS: [&str; 1] = ["Networks"];

/// Format string making docker print one JSON object per line.
pub const JSON_LINES_FORMAT: &str = "{{json .}}";

/// Convert a docker field name to snake_case.
///
/// An underscore is inserted before every upper-case ASCII letter that
/// is not the first character, then the whole key is lower-cased.
pub fn convert_key(key: &str) -> String {
    if WHOLE_TOKEN_KEYS.contains(&key) {
        return key.to_lowercase();
    }

    let mut out = String::with_capacity(key.len() + 4);
    for (i, ch) in key.chars().enumerate() {
        if i > 0 && ch.is_ascii_uppercase() {
            out.push('_');
        }
        out.extend(ch.to_lowercase());
    }
    out
}

fn normalize_value(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(normalize_map(map)),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_value).collect()),
        other => other,
    }
}

fn normalize_map(map: Map<String, Value>) -> Map<String, Value> {
    map.into_iter()
        .map(|(key, value)| {
            let value = if VERBATIM_KEYS.contains(&key.as_str()) {
                value
            } else if NAME_KEYED_KEYS.contains(&key.as_str()) {
                match value {
                    Value::Object(entries) => Value::Object(
                        entries
                            .into_iter()
                            .map(|(name, entry)| (name, normalize_value(entry)))
                            .collect(),
                    ),
                    other => other,
                }
            } else {
                normalize_value(value)
            };
            (convert_key(&key), value)
        })
        .collect()
}

/// Rewrite every field name of a raw record, recursing into nested records.
pub fn normalize_record(raw: Map<String, Value>) -> ObservedRecord {
    ObservedRecord(normalize_map(raw))
}

/// Parse raw inspection output, one JSON object per line.
///
/// Blank lines are skipped (an inspect of a missing object prints
/// nothing on stdout). Any other line that is not a JSON object fails
/// the whole fetch.
pub fn parse_response<I, S>(lines: I) -> Result<Vec<ObservedRecord>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut records = Vec::new();
    for (idx, line) in lines.into_iter().enumerate() {
        let line = line.as_ref().trim();
        if line.is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(line).map_err(|e| Error::Parse {
            line: idx + 1,
            message: e.to_string(),
        })?;
        match value {
            Value::Object(map) => records.push(normalize_record(map)),
            other => {
                return Err(Error::Parse {
                    line: idx + 1,
                    message: format!("expected a JSON object, got {}", json_type(&other)),
                });
            }
        }
    }
    Ok(records)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Normalized snapshot of one docker object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ObservedRecord(Map<String, Value>);

impl ObservedRecord {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Follow a path of normalized keys through nested records.
    pub fn get_path(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        rest.iter()
            .try_fold(self.0.get(*first)?, |value, key| value.get(*key))
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn id(&self) -> Option<&str> {
        self.get_str("id")
    }

    /// Object name; container names carry a leading slash in inspect output.
    pub fn name(&self) -> Option<&str> {
        self.get_str("name")
            .or_else(|| self.get_str("names"))
            .map(|n| n.trim_start_matches('/'))
    }

    /// Container run-state (`running`, `exited`, ...).
    ///
    /// Inspect output nests it as `state.status`; list output carries a
    /// plain `state` string.
    pub fn run_state(&self) -> Option<&str> {
        match self.get("state")? {
            Value::String(s) => Some(s),
            state => state.get("status").and_then(Value::as_str),
        }
    }

    pub fn is_running(&self) -> bool {
        self.run_state() == Some("running")
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

/// One inspection command run by the fact collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactQuery {
    /// Full record of a single object, keyed by name or ID.
    Inspect {
        kind: ResourceKind,
        identity: String,
    },
    /// Summary records of every object of a kind.
    List { kind: ResourceKind },
    /// Daemon-wide information.
    SystemInfo,
}

impl FactQuery {
    pub fn inspect(kind: ResourceKind, identity: impl Into<String>) -> Self {
        FactQuery::Inspect {
            kind,
            identity: identity.into(),
        }
    }

    /// Arguments for the docker CLI, without the program itself.
    pub fn args(&self) -> Vec<String> {
        let mut args: Vec<String> = match self {
            FactQuery::Inspect { kind, .. } => vec![kind.as_str().into(), "inspect".into()],
            FactQuery::List { kind } => {
                let mut args = vec![kind.as_str().to_string(), "ls".to_string()];
                if *kind == ResourceKind::Container {
                    args.push("--all".into());
                }
                args
            }
            FactQuery::SystemInfo => vec!["system".into(), "info".into()],
        };
        args.push("--format".into());
        args.push(JSON_LINES_FORMAT.into());
        if let FactQuery::Inspect { identity, .. } = self {
            args.push(identity.clone());
        }
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn convert_key_whole_tokens() {
        assert_eq!(convert_key("ID"), "id");
        assert_eq!(convert_key("IPv4"), "ipv4");
        assert_eq!(convert_key("IPv6"), "ipv6");
    }

    #[test]
    fn convert_key_splits_internal_capitals() {
        assert_eq!(convert_key("RepoTags"), "repo_tags");
        assert_eq!(convert_key("Image"), "image");
        assert_eq!(convert_key("NetworkSettings"), "network_settings");
        assert_eq!(convert_key("IPAddress"), "i_p_address");
        assert_eq!(convert_key("status"), "status");
    }

    #[test]
    fn parse_response_normalizes_nested_state() {
        let lines = vec![
            r#"{"Id": "abc", "Name": "/nginx", "State": {"Status": "running", "Pid": 42}}"#,
            "",
            r#"{"Id": "def", "Name": "/redis", "State": {"Status": "exited"}}"#,
        ];
        let records = parse_response(lines).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name(), Some("nginx"));
        assert_eq!(records[0].run_state(), Some("running"));
        assert_eq!(records[0].get_path(&["state", "pid"]), Some(&json!(42)));
        assert!(records[0].is_running());
        assert_eq!(records[1].name(), Some("redis"));
        assert!(!records[1].is_running());
    }

    #[test]
    fn parse_response_keeps_order_and_duplicates() {
        let line = r#"{"Name": "data", "Driver": "local"}"#;
        let records = parse_response([line, line]).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], records[1]);
        assert_eq!(records[0].get_str("driver"), Some("local"));
    }

    #[test]
    fn parse_response_rejects_malformed_lines() {
        let err = parse_response([r#"{"Name": "ok"}"#, "{not json"]).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }));

        let err = parse_response(["[1, 2]"]).unwrap_err();
        match err {
            Error::Parse { line, message } => {
                assert_eq!(line, 1);
                assert!(message.contains("array"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_output_means_no_records() {
        let records = parse_response(Vec::<String>::new()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn labels_and_network_names_are_data() {
        let raw = json!({
            "Labels": {"com.example.Owner": "ops"},
            "NetworkSettings": {
                "Networks": {
                    "backendNet": {"IPAddress": "10.0.0.2", "NetworkID": "n1"}
                }
            }
        });
        let Value::Object(map) = raw else {
            unreachable!()
        };
        let record = normalize_record(map);

        assert_eq!(
            record.get_path(&["labels", "com.example.Owner"]),
            Some(&json!("ops"))
        );
        assert_eq!(
            record.get_path(&["network_settings", "networks", "backendNet", "network_i_d"]),
            Some(&json!("n1"))
        );
    }

    #[test]
    fn list_record_run_state() {
        let records = parse_response([r#"{"ID": "abc", "Names": "web", "State": "running"}"#]).unwrap();
        assert_eq!(records[0].id(), Some("abc"));
        assert_eq!(records[0].name(), Some("web"));
        assert!(records[0].is_running());
    }

    #[test]
    fn fact_query_args() {
        assert_eq!(
            FactQuery::inspect(ResourceKind::Container, "nginx").args(),
            vec!["container", "inspect", "--format", "{{json .}}", "nginx"]
        );
        assert_eq!(
            FactQuery::List {
                kind: ResourceKind::Container
            }
            .args(),
            vec!["container", "ls", "--all", "--format", "{{json .}}"]
        );
        assert_eq!(
            FactQuery::List {
                kind: ResourceKind::Volume
            }
            .args(),
            vec!["volume", "ls", "--format", "{{json .}}"]
        );
        assert_eq!(
            FactQuery::SystemInfo.args(),
            vec!["system", "info", "--format", "{{json .}}"]
        );
    }
}
