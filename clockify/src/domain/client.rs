use serde::{Deserialize, Serialize};

/// A customer the workspace bills work to.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub workspace_id: String,
    #[serde(default)]
    pub archived: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewClient {
    pub name: String,
}
