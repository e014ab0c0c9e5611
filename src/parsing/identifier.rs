//! Identifier composition for test definitions
//!
//! The ids produced here are the join keys used to correlate runner output
//! with parsed definitions, so they must be stable across parses.

use regex::Regex;
use std::sync::LazyLock;

/// Namespace separator used in qualified class names
pub const NAMESPACE_SEPARATOR: &str = "\\";

/// Join namespace and class into a fully-qualified class name.
///
/// Empty or absent segments are omitted.
pub fn generate_qualified_class(namespace: Option<&str>, class: Option<&str>) -> String {
    [namespace, class]
        .into_iter()
        .flatten()
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(NAMESPACE_SEPARATOR)
}

/// Build the unique id for a test node.
///
/// `N\C::M` when a method is given, `N\C` without one, and just `N` when
/// there is no class at all.
pub fn generate_unique_id(
    namespace: Option<&str>,
    class: Option<&str>,
    method: Option<&str>,
) -> Option<String> {
    let Some(class) = class.filter(|c| !c.is_empty()) else {
        return namespace
            .filter(|n| !n.is_empty())
            .map(|n| n.to_string());
    };

    let mut unique_id = generate_qualified_class(namespace, Some(class));
    if let Some(method) = method.filter(|m| !m.is_empty()) {
        unique_id.push_str("::");
        unique_id.push_str(method);
    }

    Some(unique_id)
}

/// Id of a data set of a test, given the runner's label for it
pub fn generate_data_set_id(test_id: &str, label: &str) -> String {
    format!("{test_id} {label}")
}

pub fn data_set_label(index: usize) -> String {
    format!("with data set #{index}")
}

static KEYED_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*(?:'([^']*)'|"([^"]*)")\s*=>"#).expect("Invalid regex")
});

/// Label Pest gives an inline dataset row.
///
/// Keyed rows are named after their key (`with data set "dataset "admin""`),
/// others after their values (`[1, 2]` becomes `with data set "(1, 2)"`).
pub fn pest_data_set_label(row: &str) -> String {
    if let Some(key) = KEYED_ROW
        .captures(row)
        .and_then(|captures| captures.get(1).or_else(|| captures.get(2)))
    {
        return format!("with data set \"dataset \"{}\"\"", key.as_str());
    }

    let row = row.trim();
    let values = row
        .strip_prefix('[')
        .and_then(|inner| inner.strip_suffix(']'))
        .unwrap_or(row)
        .trim();
    format!("with data set \"({values})\"")
}
