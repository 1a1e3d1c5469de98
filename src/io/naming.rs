//! File name ⇄ category mapping.

use crate::config::IoConfig;
use crate::{Error, Result};

/// What a table file holds, as recovered from its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableKind {
    /// Nodes of one label.
    Node(String),
    /// Relationships of one type.
    Relationship(String),
    /// Not a table file.
    Unrecognized,
}

impl TableKind {
    /// Classifies an entry or file name.
    ///
    /// Only the last path component is considered, so archive entries stored
    /// under a folder still classify.
    #[must_use]
    pub fn classify(name: &str, config: &IoConfig) -> Self {
        let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
        let Some(stem) = base.strip_suffix(config.extension.as_str()) else {
            return Self::Unrecognized;
        };
        if let Some(label) = stem.strip_prefix(config.node_prefix.as_str()) {
            if !label.is_empty() {
                return Self::Node(label.to_string());
            }
        } else if let Some(rel_type) = stem.strip_prefix(config.relationship_prefix.as_str()) {
            if !rel_type.is_empty() {
                return Self::Relationship(rel_type.to_string());
            }
        }
        Self::Unrecognized
    }
}

/// Returns `<node_prefix><label><extension>`.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if the label is empty or contains a path
/// separator.
pub fn node_file_name(label: &str, config: &IoConfig) -> Result<String> {
    check_category(label)?;
    Ok(format!("{}{label}{}", config.node_prefix, config.extension))
}

/// Returns `<relationship_prefix><type><extension>`.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if the type is empty or contains a path
/// separator.
pub fn relationship_file_name(rel_type: &str, config: &IoConfig) -> Result<String> {
    check_category(rel_type)?;
    Ok(format!(
        "{}{rel_type}{}",
        config.relationship_prefix, config.extension
    ))
}

/// Appends the archive extension unless `name` already ends with it.
#[must_use]
pub fn archive_file_name(name: &str, config: &IoConfig) -> String {
    if name.ends_with(config.archive_extension.as_str()) {
        name.to_string()
    } else {
        format!("{name}{}", config.archive_extension)
    }
}

fn check_category(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidInput("category name is empty".to_string()));
    }
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(Error::InvalidInput(format!(
            "category '{name}' cannot be used in a file name"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("node_Person.csv", &TableKind::Node("Person".to_string()) ; "node")]
    #[test_case("relationship_KNOWS.csv", &TableKind::Relationship("KNOWS".to_string()) ; "relationship")]
    #[test_case("export/node_City.csv", &TableKind::Node("City".to_string()) ; "nested entry")]
    #[test_case("node_Person.txt", &TableKind::Unrecognized ; "wrong extension")]
    #[test_case("README.csv", &TableKind::Unrecognized ; "no prefix")]
    #[test_case("node_.csv", &TableKind::Unrecognized ; "empty label")]
    #[test_case("node_Multi_Word.csv", &TableKind::Node("Multi_Word".to_string()) ; "underscores kept")]
    fn test_classify(name: &str, expected: &TableKind) {
        assert_eq!(&TableKind::classify(name, &IoConfig::default()), expected);
    }

    #[test]
    fn test_file_names_roundtrip() {
        let config = IoConfig::default();
        let node = node_file_name("Person", &config).unwrap();
        assert_eq!(
            TableKind::classify(&node, &config),
            TableKind::Node("Person".to_string())
        );
        let relationship = relationship_file_name("LIVES_IN", &config).unwrap();
        assert_eq!(
            TableKind::classify(&relationship, &config),
            TableKind::Relationship("LIVES_IN".to_string())
        );
    }

    #[test]
    fn test_unusable_categories_rejected() {
        let config = IoConfig::default();
        assert!(node_file_name("", &config).is_err());
        assert!(node_file_name("a/b", &config).is_err());
        assert!(relationship_file_name("..", &config).is_err());
    }

    #[test]
    fn test_archive_file_name() {
        let config = IoConfig::default();
        assert_eq!(archive_file_name("people", &config), "people.zip");
        assert_eq!(archive_file_name("people.zip", &config), "people.zip");
    }
}
