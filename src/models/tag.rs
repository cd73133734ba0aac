//! Tag and category models.

use serde::{Deserialize, Serialize};

/// A gallery tag with its usage count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub count: u32,
}

/// A gallery category, used as the `filter` parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub slug: String,
}
