use serde::{Deserialize, Serialize};

/// A project. Standalone when `folder_id` is `None`, in which case it shares
/// the sidebar ordering space with folders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    #[serde(default)]
    pub sort_order: i64,
}

/// A named block inside exactly one project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub user_id: String,
    pub project_id: String,
    pub name: String,
    #[serde(default)]
    pub sort_order: i64,
}

/// A top-level sidebar group of projects. Folders do not nest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub sort_order: i64,
}
