use serde::{Deserialize, Serialize};

use super::datetime::null_as_default;

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub workspace_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub client_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub client_name: String,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub billable: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub color: String,
}

impl Project {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_client(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.client_id = id.into();
        self.client_name = name.into();
        self
    }

    pub fn archived(mut self) -> Self {
        self.archived = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_client_becomes_empty() {
        let project: Project = serde_json::from_str(
            r#"{"id":"p1","name":"Internal","clientId":null,"clientName":null}"#,
        )
        .unwrap();
        assert_eq!(project.client_id, "");
        assert_eq!(project.client_name, "");
        assert!(!project.archived);
    }
}
