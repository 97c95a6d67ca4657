//! Turns names typed by the user into workspace ids.
//!
//! Matching is a substring search over names normalized with
//! [`normalize`]. A single hit wins; with several hits an exact (normalized)
//! name wins, otherwise the term is ambiguous. A term that already is a known
//! id comes back unchanged.

use clockify::{Project, Tag, Task, Workspace};
use itertools::Itertools;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use super::{
    error::Entity,
    ports::ClockifyPort,
    CliError,
};

/// Lowercases and strips diacritics: `Café Ünïcode` becomes `cafe unicode`.
pub fn normalize(value: &str) -> String {
    value
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Something that can be found by id or by name.
trait Named {
    fn id(&self) -> &str;
    fn name(&self) -> &str;

    /// Texts the term is matched against.
    fn haystacks(&self) -> Vec<String> {
        vec![self.name().to_string()]
    }
}

impl Named for Task {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Tag {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Workspace {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A project matched by name, or by "name client" when enabled.
struct ProjectCandidate<'a> {
    project: &'a Project,
    with_client: bool,
}

impl Named for ProjectCandidate<'_> {
    fn id(&self) -> &str {
        &self.project.id
    }

    fn name(&self) -> &str {
        &self.project.name
    }

    fn haystacks(&self) -> Vec<String> {
        let mut haystacks = vec![self.project.name.clone()];
        if self.with_client && !self.project.client_name.is_empty() {
            haystacks.push(format!(
                "{} {}",
                self.project.name, self.project.client_name
            ));
        }
        haystacks
    }
}

fn find<T: Named>(
    entity: Entity,
    term: &str,
    client: Option<&str>,
    candidates: &[T],
) -> Result<String, CliError> {
    if let Some(known) = candidates.iter().find(|c| c.id() == term) {
        return Ok(known.id().to_string());
    }

    let needle = normalize(term);
    let hits: Vec<&T> = candidates
        .iter()
        .filter(|c| c.haystacks().iter().any(|h| normalize(h).contains(&needle)))
        .collect();

    match hits.as_slice() {
        [] => Err(CliError::EntityNotFound {
            entity,
            term: term.to_string(),
            client: client.map(str::to_string),
        }),
        [only] => Ok(only.id().to_string()),
        many => {
            let exact: Vec<&&T> = many
                .iter()
                .filter(|c| normalize(c.name()) == needle)
                .collect();
            match exact.as_slice() {
                [only] => Ok(only.id().to_string()),
                _ => Err(CliError::Ambiguous {
                    entity,
                    term: term.to_string(),
                    candidates: many.iter().map(|c| c.name().to_string()).collect(),
                }),
            }
        }
    }
}

fn belongs_to_client(project: &Project, client: &str) -> bool {
    project.client_id == client || normalize(&project.client_name).contains(&normalize(client))
}

/// Resolves a project term against an already fetched project list.
pub fn find_project(
    projects: &[Project],
    term: &str,
    client: Option<&str>,
    search_with_client: bool,
) -> Result<String, CliError> {
    if let Some(known) = projects.iter().find(|p| p.id == term) {
        return Ok(known.id.clone());
    }
    let candidates: Vec<ProjectCandidate> = projects
        .iter()
        .filter(|p| client.map_or(true, |c| belongs_to_client(p, c)))
        .map(|project| ProjectCandidate {
            project,
            with_client: search_with_client,
        })
        .collect();
    find(Entity::Project, term, client, &candidates)
}

pub async fn resolve_project(
    port: &dyn ClockifyPort,
    workspace_id: &str,
    term: &str,
    client: Option<&str>,
    search_with_client: bool,
) -> Result<String, CliError> {
    if term.is_empty() {
        return Ok(String::new());
    }
    let projects = port.get_projects(workspace_id, None).await?;
    find_project(&projects, term, client, search_with_client)
}

/// Resolves a task among the project's active tasks.
pub async fn resolve_task(
    port: &dyn ClockifyPort,
    workspace_id: &str,
    project_id: &str,
    term: &str,
) -> Result<String, CliError> {
    if term.is_empty() {
        return Ok(String::new());
    }
    if project_id.is_empty() {
        return Err(CliError::invalid_argument(
            "a project is required to look up a task",
        ));
    }
    let tasks = port.get_tasks(workspace_id, project_id, true).await?;
    find(Entity::Task, term, None, &tasks)
}

/// Resolves every tag term, dropping duplicates.
pub async fn resolve_tags(
    port: &dyn ClockifyPort,
    workspace_id: &str,
    terms: &[String],
) -> Result<Vec<String>, CliError> {
    if terms.is_empty() {
        return Ok(vec![]);
    }
    let tags = port.get_tags(workspace_id, Some(false)).await?;
    let ids = terms
        .iter()
        .map(|term| find(Entity::Tag, term, None, &tags))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ids.into_iter().unique().collect())
}

pub async fn resolve_workspace(port: &dyn ClockifyPort, term: &str) -> Result<String, CliError> {
    let workspaces = port.get_workspaces().await?;
    find(Entity::Workspace, term, None, &workspaces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockClockify, WORKSPACE};

    fn projects() -> Vec<Project> {
        vec![
            Project::new("p1", "Website").with_client("c1", "Acme"),
            Project::new("p2", "Website Redesign").with_client("c2", "Globex"),
            Project::new("p3", "Café Ops").with_client("c1", "Acme"),
            Project::new("p4", "Internal"),
        ]
    }

    #[test]
    fn normalizes_case_and_diacritics() {
        assert_eq!(normalize("Café Ünïcode"), "cafe unicode");
        assert_eq!(normalize("SÃO PAULO"), "sao paulo");
    }

    #[test]
    fn unique_substring_wins() {
        assert_eq!(find_project(&projects(), "redes", None, false).unwrap(), "p2");
        assert_eq!(find_project(&projects(), "cafe", None, false).unwrap(), "p3");
    }

    #[test]
    fn exact_name_breaks_ties() {
        assert_eq!(find_project(&projects(), "website", None, false).unwrap(), "p1");
    }

    #[test]
    fn ambiguous_without_exact_match() {
        let err = find_project(&projects(), "web", None, false).unwrap_err();
        match err {
            CliError::Ambiguous { candidates, .. } => {
                assert_eq!(candidates, ["Website", "Website Redesign"])
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn known_id_is_returned_unchanged() {
        for id in ["p1", "p2", "p3", "p4"] {
            assert_eq!(find_project(&projects(), id, None, false).unwrap(), id);
        }
    }

    #[test]
    fn client_name_is_searched_when_enabled() {
        assert!(find_project(&projects(), "redesign globex", None, false).is_err());
        assert_eq!(
            find_project(&projects(), "redesign globex", None, true).unwrap(),
            "p2"
        );
    }

    #[test]
    fn client_filter_restricts_candidates() {
        assert_eq!(
            find_project(&projects(), "web", Some("globex"), false).unwrap(),
            "p2"
        );
        let err = find_project(&projects(), "internal", Some("acme"), false).unwrap_err();
        assert_eq!(
            err.to_string(),
            "no project with id or name containing \"internal\" was found for client \"acme\""
        );
    }

    #[test]
    fn known_project_id_ignores_client_filter() {
        assert_eq!(
            find_project(&projects(), "p4", Some("acme"), false).unwrap(),
            "p4"
        );
        assert_eq!(
            find_project(&projects(), "p2", Some("acme"), true).unwrap(),
            "p2"
        );
    }

    #[tokio::test]
    async fn resolves_tasks_within_active_ones() {
        let port = MockClockify::new().with_tasks(vec![
            Task::new("t1", "Design", "p1"),
            Task::new("t2", "Design review", "p1").done(),
            Task::new("t3", "Design", "p2"),
        ]);
        let id = resolve_task(&port, WORKSPACE, "p1", "design").await.unwrap();
        assert_eq!(id, "t1");
        let err = resolve_task(&port, WORKSPACE, "p1", "review").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn tags_resolve_and_deduplicate() {
        let port = MockClockify::new().with_tags(vec![
            Tag::new("g1", "Urgent"),
            Tag::new("g2", "Billing"),
        ]);
        let terms = vec!["urg".to_string(), "g1".to_string(), "billing".to_string()];
        let ids = resolve_tags(&port, WORKSPACE, &terms).await.unwrap();
        assert_eq!(ids, ["g1", "g2"]);
    }

    #[tokio::test]
    async fn resolving_ids_is_idempotent() {
        let port = MockClockify::new().with_projects(projects());
        let once = resolve_project(&port, WORKSPACE, "redesign", None, false)
            .await
            .unwrap();
        let twice = resolve_project(&port, WORKSPACE, &once, None, false)
            .await
            .unwrap();
        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn empty_terms_resolve_to_empty() {
        let port = MockClockify::new();
        assert_eq!(resolve_project(&port, WORKSPACE, "", None, false).await.unwrap(), "");
        assert_eq!(resolve_task(&port, WORKSPACE, "", "").await.unwrap(), "");
    }
}
