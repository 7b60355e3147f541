//! Whole-document readers for JSON, YAML and XML.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::{Error, IoContext, Result};

fn read_document(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(Error::DocumentNotFound {
            path: path.to_path_buf(),
        });
    }
    std::fs::read_to_string(path).with_path(path)
}

fn parse_error(path: &Path, format: &'static str, err: impl std::fmt::Display) -> Error {
    Error::Parse {
        path: path.to_path_buf(),
        format,
        message: err.to_string(),
    }
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = read_document(path)?;
    serde_json::from_str(&text).map_err(|e| parse_error(path, "JSON", e))
}

pub fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = read_document(path)?;
    serde_yml::from_str(&text).map_err(|e| parse_error(path, "YAML", e))
}

/// Deserialize an XML document. The root element maps onto `T`; its child
/// elements and attributes (prefixed `@`) map onto the fields of `T`.
pub fn read_xml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = read_document(path)?;
    quick_xml::de::from_str(&text).map_err(|e| parse_error(path, "XML", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::BTreeMap;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Settings {
        name: String,
        threshold: f64,
        tags: Vec<String>,
    }

    #[test]
    fn reads_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"name": "run", "threshold": 0.5, "tags": ["a", "b"]}"#).unwrap();

        let settings: Settings = read_json(&path).unwrap();
        assert_eq!(
            settings,
            Settings {
                name: "run".into(),
                threshold: 0.5,
                tags: vec!["a".into(), "b".into()],
            }
        );
    }

    #[test]
    fn reads_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        std::fs::write(&path, "name: run\nthreshold: 0.5\ntags:\n  - a\n  - b\n").unwrap();

        let settings: Settings = read_yaml(&path).unwrap();
        assert_eq!(settings.tags, vec!["a", "b"]);
        assert_eq!(settings.threshold, 0.5);
    }

    #[test]
    fn reads_xml() {
        #[derive(Debug, Deserialize)]
        struct Inventory {
            #[serde(rename = "@owner")]
            owner: String,
            item: Vec<Item>,
        }

        #[derive(Debug, Deserialize)]
        struct Item {
            name: String,
            count: u32,
        }

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventory.xml");
        std::fs::write(
            &path,
            r#"<inventory owner="jon">
                 <item><name>shoes</name><count>5</count></item>
                 <item><name>books</name><count>40</count></item>
               </inventory>"#,
        )
        .unwrap();

        let inventory: Inventory = read_xml(&path).unwrap();
        assert_eq!(inventory.owner, "jon");
        assert_eq!(inventory.item.len(), 2);
        assert_eq!(inventory.item[1].name, "books");
        assert_eq!(inventory.item[1].count, 40);
    }

    #[test]
    fn malformed_document_reports_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = read_json::<BTreeMap<String, String>>(&path).unwrap_err();
        assert!(matches!(err, Error::Parse { format: "JSON", .. }));
    }

    #[test]
    fn missing_document() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_yaml::<BTreeMap<String, String>>(&dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, Error::DocumentNotFound { .. }));
    }
}
