use super::ClockifyFilter;

#[derive(Debug, Clone, Default)]
pub struct TagFilter {
    pub name: Option<String>,
    pub archived: Option<bool>,
}

impl TagFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn archived(mut self, archived: Option<bool>) -> Self {
        self.archived = archived;
        self
    }
}

impl ClockifyFilter for TagFilter {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![];
        if let Some(name) = &self.name {
            pairs.push(("name", name.clone()));
        }
        if let Some(archived) = self.archived {
            pairs.push(("archived", archived.to_string()));
        }
        pairs
    }
}
