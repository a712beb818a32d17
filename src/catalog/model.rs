use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// One application entry under a project: the app URL plus its documentation.
/// Both fields are free-form strings; no format validation is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sublink {
    pub url: String,
    #[serde(default)]
    pub tutorial_url: String,
}

/// A named project inside an area's links document. Project names are not
/// required to be unique within an area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    #[serde(default)]
    pub sublinks: Vec<Sublink>,
}

/// An organizational area and its links document. The area name is the
/// primary key of the backing table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Area {
    pub name: String,
    pub links: Vec<Project>,
}

/// Write-path decode failures for a links or sublinks document.
#[derive(Debug, Error)]
pub enum LinksError {
    /// Not parseable JSON at all. The serde_json message carries the
    /// line/column of the failure.
    #[error("invalid JSON: {0}")]
    Syntax(serde_json::Error),

    #[error("expected a JSON array, got {0}")]
    NotAnArray(&'static str),

    #[error("invalid entry at index {index}: {source}")]
    BadEntry {
        index: usize,
        source: serde_json::Error,
    },
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn array_of<T: serde::de::DeserializeOwned>(value: Value) -> Result<Vec<T>, LinksError> {
    let items = match value {
        Value::Array(items) => items,
        other => return Err(LinksError::NotAnArray(json_type_name(&other))),
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item).map_err(|source| LinksError::BadEntry { index, source })
        })
        .collect()
}

/// Read-path decode of a stored links column. Fail-soft by policy: a missing
/// value, malformed JSON, or a document that does not match the project
/// shape all degrade to an empty list. Legacy rows must never break listing.
pub fn parse_links(raw: Option<&str>) -> Vec<Project> {
    let Some(text) = raw else {
        return Vec::new();
    };

    match serde_json::from_str::<Value>(text) {
        Ok(value) => array_of(value).unwrap_or_default(),
        Err(_) => Vec::new(),
    }
}

/// Write-path decode of caller-supplied links text. Fail-loud: the input must
/// be valid JSON and must be an array of projects.
pub fn validate_links(text: &str) -> Result<Vec<Project>, LinksError> {
    let value = serde_json::from_str::<Value>(text).map_err(LinksError::Syntax)?;
    array_of(value)
}

/// Decode a links payload field that may arrive as inline JSON or as the raw
/// text of a form field.
pub fn links_from_input(value: Value) -> Result<Vec<Project>, LinksError> {
    match value {
        Value::String(text) => validate_links(&text),
        other => array_of(other),
    }
}

/// Same as [`links_from_input`], for a project's sublinks field.
pub fn sublinks_from_input(value: Value) -> Result<Vec<Sublink>, LinksError> {
    match value {
        Value::String(text) => {
            let inner = serde_json::from_str::<Value>(&text).map_err(LinksError::Syntax)?;
            array_of(inner)
        }
        other => array_of(other),
    }
}

/// Append a project to a links document.
pub fn add_project(links: &mut Vec<Project>, project: Project) {
    links.push(project);
}

/// Replace every project matching `old_name` with the new name and sublinks.
/// Returns false when no project matched.
pub fn update_project(
    links: &mut [Project],
    old_name: &str,
    new_name: &str,
    sublinks: &[Sublink],
) -> bool {
    let mut found = false;
    for project in links.iter_mut() {
        if project.name == old_name {
            project.name = new_name.to_string();
            project.sublinks = sublinks.to_vec();
            found = true;
        }
    }
    found
}

/// Drop every project matching `name`. Returns false when no project matched.
pub fn remove_project(links: &mut Vec<Project>, name: &str) -> bool {
    let before = links.len();
    links.retain(|project| project.name != name);
    links.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_links() -> Vec<Project> {
        vec![
            Project {
                name: "Budgeting".to_string(),
                sublinks: vec![Sublink {
                    url: "https://x/app".to_string(),
                    tutorial_url: "https://x/doc".to_string(),
                }],
            },
            Project {
                name: "Forecasting".to_string(),
                sublinks: vec![],
            },
        ]
    }

    #[test]
    fn parse_links_decodes_valid_document() {
        let text = serde_json::to_string(&sample_links()).unwrap();
        assert_eq!(parse_links(Some(text.as_str())), sample_links());
    }

    #[test]
    fn parse_links_degrades_to_empty_on_missing_value() {
        assert_eq!(parse_links(None), vec![]);
    }

    #[test]
    fn parse_links_degrades_to_empty_on_malformed_json() {
        assert_eq!(parse_links(Some("{not json")), vec![]);
    }

    #[test]
    fn parse_links_degrades_to_empty_on_wrong_shape() {
        assert_eq!(parse_links(Some("{\"name\": \"solo\"}")), vec![]);
        assert_eq!(parse_links(Some("[{\"no_name\": true}]")), vec![]);
    }

    #[test]
    fn validate_links_rejects_bad_syntax_with_location() {
        let err = validate_links("[{\"name\": }]").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("invalid JSON"), "message: {msg}");
        assert!(msg.contains("column"), "expected location in: {msg}");
    }

    #[test]
    fn validate_links_rejects_non_array() {
        let err = validate_links("{\"name\": \"X\"}").unwrap_err();
        assert!(matches!(err, LinksError::NotAnArray("an object")));

        let err = validate_links("42").unwrap_err();
        assert!(matches!(err, LinksError::NotAnArray("a number")));
    }

    #[test]
    fn validate_links_rejects_bad_entry() {
        let err = validate_links("[{\"sublinks\": []}]").unwrap_err();
        assert!(matches!(err, LinksError::BadEntry { index: 0, .. }));
    }

    #[test]
    fn validate_links_defaults_missing_sublinks() {
        let links = validate_links("[{\"name\": \"Solo\"}]").unwrap();
        assert_eq!(links[0].name, "Solo");
        assert!(links[0].sublinks.is_empty());
    }

    #[test]
    fn links_from_input_accepts_text_and_inline() {
        let inline = links_from_input(json!([{"name": "A"}])).unwrap();
        assert_eq!(inline[0].name, "A");

        let text = links_from_input(json!("[{\"name\": \"B\"}]")).unwrap();
        assert_eq!(text[0].name, "B");

        let err = links_from_input(json!({"name": "C"})).unwrap_err();
        assert!(matches!(err, LinksError::NotAnArray(_)));
    }

    #[test]
    fn sublinks_from_input_accepts_text_and_inline() {
        let inline = sublinks_from_input(json!([{"url": "https://a"}])).unwrap();
        assert_eq!(inline[0].url, "https://a");
        assert_eq!(inline[0].tutorial_url, "");

        let err = sublinks_from_input(json!("{\"url\": \"x\"}")).unwrap_err();
        assert!(matches!(err, LinksError::NotAnArray(_)));
    }

    #[test]
    fn add_then_update_then_remove_project() {
        let mut links = Vec::new();
        add_project(
            &mut links,
            Project {
                name: "Budgeting".to_string(),
                sublinks: vec![Sublink {
                    url: "https://x/app".to_string(),
                    tutorial_url: "https://x/doc".to_string(),
                }],
            },
        );
        assert_eq!(links.len(), 1);

        let new_sublinks = vec![Sublink {
            url: "https://y/app".to_string(),
            tutorial_url: String::new(),
        }];
        assert!(update_project(&mut links, "Budgeting", "Planning", &new_sublinks));
        assert_eq!(links[0].name, "Planning");
        assert_eq!(links[0].sublinks, new_sublinks);

        assert!(!update_project(&mut links, "Budgeting", "X", &[]));

        assert!(remove_project(&mut links, "Planning"));
        assert!(links.is_empty());
        assert!(!remove_project(&mut links, "Planning"));
    }

    #[test]
    fn update_project_replaces_every_duplicate() {
        let mut links = vec![
            Project { name: "Dup".to_string(), sublinks: vec![] },
            Project { name: "Other".to_string(), sublinks: vec![] },
            Project { name: "Dup".to_string(), sublinks: vec![] },
        ];
        assert!(update_project(&mut links, "Dup", "Renamed", &[]));
        assert_eq!(
            links.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
            vec!["Renamed", "Other", "Renamed"]
        );
    }

    #[test]
    fn serialized_links_round_trip_semantically() {
        let links = sample_links();
        let text = serde_json::to_string(&links).unwrap();
        assert_eq!(validate_links(&text).unwrap(), links);
    }
}
