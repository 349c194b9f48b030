//! Parsed documentation blocks and their parameter tags.

use serde::{Deserialize, Serialize};

/// Documentation attached to one export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Documentation {
    /// Leading free text of the block.
    pub description: String,
    /// Parameter tags in the order they were written.
    ///
    /// This order is the argument order, not the function signature's.
    pub tags: Vec<ParameterTag>,
}

/// One documented parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterTag {
    /// Plain or dotted name (`opts.retries`).
    pub name: String,
    /// Free-form declared type (`number`, `string[]`, `Array<number>`).
    #[serde(rename = "type")]
    pub type_name: String,
    pub optional: bool,
    /// Literal default text as written, if any.
    pub default: Option<String>,
    pub description: String,
}

impl ParameterTag {
    /// Returns `true` when the name points into a nested option object.
    pub fn is_dotted(&self) -> bool {
        self.name.contains('.')
    }

    /// Leading path segment (`opts` for `opts.retries`).
    pub fn top_level_name(&self) -> &str {
        self.name.split('.').next().unwrap_or(&self.name)
    }

    /// Path segments after the leading one.
    pub fn nested_path(&self) -> Vec<&str> {
        self.name.split('.').skip(1).collect()
    }

    pub fn is_boolean(&self) -> bool {
        self.type_name.trim().eq_ignore_ascii_case("boolean")
    }
}
