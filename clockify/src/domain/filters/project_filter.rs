use super::ClockifyFilter;

#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    pub name: Option<String>,
    pub archived: Option<bool>,
    pub client_ids: Vec<String>,
}

impl ProjectFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn archived(mut self, archived: Option<bool>) -> Self {
        self.archived = archived;
        self
    }

    pub fn for_clients(mut self, client_ids: Vec<String>) -> Self {
        self.client_ids = client_ids;
        self
    }
}

impl ClockifyFilter for ProjectFilter {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![];
        if let Some(name) = &self.name {
            pairs.push(("name", name.clone()));
        }
        if let Some(archived) = self.archived {
            pairs.push(("archived", archived.to_string()));
        }
        if !self.client_ids.is_empty() {
            pairs.push(("clients", self.client_ids.join(",")));
        }
        pairs
    }
}
