use super::ClockifyFilter;

#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub name: Option<String>,
    pub active: Option<bool>,
}

impl TaskFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_only(mut self) -> Self {
        self.active = Some(true);
        self
    }
}

impl ClockifyFilter for TaskFilter {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![];
        if let Some(name) = &self.name {
            pairs.push(("name", name.clone()));
        }
        if let Some(active) = self.active {
            pairs.push(("is-active", active.to_string()));
        }
        pairs
    }
}
