//! In-memory doubles for the remote and the terminal.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone, Utc};
use clockify::{
    Client, HydratedTimeEntry, Paging, Project, Tag, Task, TimeEntry, TimeEntryFilter,
    TimeEntryPayload, TimeInterval, User, Workspace, WorkspaceSettings,
};

use crate::domain::{
    ports::{ClockifyPort, Prompter, SelectionValidator, TextValidator},
    CliError,
};

pub const WORKSPACE: &str = "ws";
pub const USER: &str = "u1";

/// 2024-06-12 at `h:m` local time.
pub fn at(h: u32, m: u32) -> DateTime<Utc> {
    Local
        .with_ymd_and_hms(2024, 6, 12, h, m, 0)
        .unwrap()
        .with_timezone(&Utc)
}

/// A finished or running entry on 2024-06-12 owned by [`USER`].
pub fn entry(id: &str, start: (u32, u32), end: Option<(u32, u32)>) -> TimeEntry {
    let mut entry = TimeEntry::new(
        id,
        TimeInterval::new(at(start.0, start.1), end.map(|(h, m)| at(h, m))),
    );
    entry.workspace_id = WORKSPACE.to_string();
    entry.user_id = USER.to_string();
    entry
}

#[derive(Default)]
struct State {
    user: User,
    workspace: Workspace,
    clients: Vec<Client>,
    projects: Vec<Project>,
    tasks: Vec<Task>,
    tags: Vec<Tag>,
    entries: Vec<TimeEntry>,
    next_id: usize,
    stop_not_found: bool,
    /// Creates after this many succeed answer 500.
    creates_before_failure: Option<usize>,
    calls: usize,
    created: Vec<TimeEntryPayload>,
    updated: Vec<(String, TimeEntryPayload)>,
    deleted: Vec<String>,
    stopped: Vec<DateTime<Utc>>,
    invoiced: Vec<(Vec<String>, bool)>,
}

/// Mock Clockify backed by in-memory collections.
///
/// Writes are applied to the stored entries and recorded for assertions.
#[derive(Clone)]
pub struct MockClockify {
    state: Arc<RwLock<State>>,
}

impl Default for MockClockify {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code)]
impl MockClockify {
    pub fn new() -> Self {
        let state = State {
            user: User {
                id: USER.to_string(),
                name: "Jo Doe".to_string(),
                email: "jo@example.test".to_string(),
                active_workspace: WORKSPACE.to_string(),
                default_workspace: WORKSPACE.to_string(),
            },
            workspace: Workspace {
                id: WORKSPACE.to_string(),
                name: "Main".to_string(),
                workspace_settings: WorkspaceSettings::default(),
            },
            ..State::default()
        };
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    pub fn with_settings(self, settings: WorkspaceSettings) -> Self {
        self.state.write().unwrap().workspace.workspace_settings = settings;
        self
    }

    pub fn with_workspace(self, workspace: Workspace) -> Self {
        self.state.write().unwrap().workspace = workspace;
        self
    }

    pub fn with_clients(self, clients: Vec<Client>) -> Self {
        self.state.write().unwrap().clients = clients;
        self
    }

    pub fn with_projects(self, projects: Vec<Project>) -> Self {
        self.state.write().unwrap().projects = projects;
        self
    }

    pub fn with_tasks(self, tasks: Vec<Task>) -> Self {
        self.state.write().unwrap().tasks = tasks;
        self
    }

    pub fn with_tags(self, tags: Vec<Tag>) -> Self {
        self.state.write().unwrap().tags = tags;
        self
    }

    pub fn with_entries(self, entries: Vec<TimeEntry>) -> Self {
        self.state.write().unwrap().entries = entries;
        self
    }

    /// Makes `stop_running` answer 404.
    pub fn with_stop_not_found(self) -> Self {
        self.state.write().unwrap().stop_not_found = true;
        self
    }

    pub fn with_creates_failing_after(self, successes: usize) -> Self {
        self.state.write().unwrap().creates_before_failure = Some(successes);
        self
    }

    /// Number of port calls made so far.
    pub fn calls(&self) -> usize {
        self.state.read().unwrap().calls
    }

    fn hit(&self) {
        self.state.write().unwrap().calls += 1;
    }

    pub fn entries(&self) -> Vec<TimeEntry> {
        self.state.read().unwrap().entries.clone()
    }

    pub fn entry(&self, id: &str) -> Option<TimeEntry> {
        self.entries().into_iter().find(|e| e.id == id)
    }

    pub fn created(&self) -> Vec<TimeEntryPayload> {
        self.state.read().unwrap().created.clone()
    }

    pub fn updated(&self) -> Vec<(String, TimeEntryPayload)> {
        self.state.read().unwrap().updated.clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.state.read().unwrap().deleted.clone()
    }

    pub fn stopped(&self) -> Vec<DateTime<Utc>> {
        self.state.read().unwrap().stopped.clone()
    }

    pub fn invoiced_calls(&self) -> Vec<(Vec<String>, bool)> {
        self.state.read().unwrap().invoiced.clone()
    }

    pub fn clients(&self) -> Vec<Client> {
        self.state.read().unwrap().clients.clone()
    }

    fn hydrate(state: &State, entry: TimeEntry) -> HydratedTimeEntry {
        let project = state
            .projects
            .iter()
            .find(|p| p.id == entry.project_id)
            .cloned();
        let task = state.tasks.iter().find(|t| t.id == entry.task_id).cloned();
        let tags = state
            .tags
            .iter()
            .filter(|t| entry.tag_ids.contains(&t.id))
            .cloned()
            .collect();
        let user = Some(state.user.clone());
        HydratedTimeEntry {
            project,
            task,
            tags,
            user,
            ..HydratedTimeEntry::from(entry)
        }
    }

    fn matches(filter: &TimeEntryFilter, entry: &TimeEntry) -> bool {
        let interval = &entry.time_interval;
        filter
            .in_progress
            .map_or(true, |running| interval.is_running() == running)
            && filter.start.map_or(true, |start| interval.start >= start)
            && filter.end.map_or(true, |end| interval.start < end)
            && filter
                .description
                .as_ref()
                .map_or(true, |d| entry.description.contains(d.as_str()))
            && filter
                .project_id
                .as_ref()
                .map_or(true, |p| &entry.project_id == p)
            && filter.tag_ids.iter().all(|t| entry.tag_ids.contains(t))
    }

    fn filtered(&self, filter: &TimeEntryFilter) -> Vec<TimeEntry> {
        let state = self.state.read().unwrap();
        let mut entries: Vec<TimeEntry> = state
            .entries
            .iter()
            .filter(|e| Self::matches(filter, e))
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.time_interval.start.cmp(&a.time_interval.start));

        match filter.paging {
            Paging::All => entries,
            Paging::Page { page, page_size } => entries
                .into_iter()
                .skip(((page - 1) * page_size) as usize)
                .take(page_size as usize)
                .collect(),
        }
    }

    fn apply_payload(entry: &mut TimeEntry, payload: &TimeEntryPayload) {
        entry.description = payload.description.clone();
        entry.project_id = payload.project_id.clone().unwrap_or_default();
        entry.task_id = payload.task_id.clone().unwrap_or_default();
        entry.tag_ids = payload.tag_ids.clone();
        entry.billable = payload.billable.unwrap_or(false);
        entry.time_interval = TimeInterval::new(payload.start, payload.end);
    }
}

fn not_found(what: &str) -> CliError {
    CliError::NotFound(format!("{} not found", what))
}

#[async_trait]
impl ClockifyPort for MockClockify {
    async fn get_me(&self) -> Result<User, CliError> {
        self.hit();
        Ok(self.state.read().unwrap().user.clone())
    }

    async fn get_workspaces(&self) -> Result<Vec<Workspace>, CliError> {
        self.hit();
        Ok(vec![self.state.read().unwrap().workspace.clone()])
    }

    async fn get_workspace(&self, workspace_id: &str) -> Result<Workspace, CliError> {
        self.hit();
        let state = self.state.read().unwrap();
        if state.workspace.id != workspace_id {
            return Err(not_found("workspace"));
        }
        Ok(state.workspace.clone())
    }

    async fn get_clients(
        &self,
        _workspace_id: &str,
        archived: Option<bool>,
    ) -> Result<Vec<Client>, CliError> {
        self.hit();
        Ok(self
            .state
            .read()
            .unwrap()
            .clients
            .iter()
            .filter(|c| archived.map_or(true, |a| c.archived == a))
            .cloned()
            .collect())
    }

    async fn add_client(&self, workspace_id: &str, name: &str) -> Result<Client, CliError> {
        self.hit();
        let mut state = self.state.write().unwrap();
        state.next_id += 1;
        let client = Client {
            id: format!("c-{}", state.next_id),
            name: name.to_string(),
            workspace_id: workspace_id.to_string(),
            archived: false,
        };
        state.clients.push(client.clone());
        Ok(client)
    }

    async fn get_projects(
        &self,
        _workspace_id: &str,
        archived: Option<bool>,
    ) -> Result<Vec<Project>, CliError> {
        self.hit();
        Ok(self
            .state
            .read()
            .unwrap()
            .projects
            .iter()
            .filter(|p| archived.map_or(true, |a| p.archived == a))
            .cloned()
            .collect())
    }

    async fn get_project(
        &self,
        _workspace_id: &str,
        project_id: &str,
    ) -> Result<Project, CliError> {
        self.hit();
        self.state
            .read()
            .unwrap()
            .projects
            .iter()
            .find(|p| p.id == project_id)
            .cloned()
            .ok_or_else(|| not_found("project"))
    }

    async fn get_tasks(
        &self,
        _workspace_id: &str,
        project_id: &str,
        active_only: bool,
    ) -> Result<Vec<Task>, CliError> {
        self.hit();
        Ok(self
            .state
            .read()
            .unwrap()
            .tasks
            .iter()
            .filter(|t| t.project_id == project_id && (!active_only || t.is_active()))
            .cloned()
            .collect())
    }

    async fn get_tags(
        &self,
        _workspace_id: &str,
        archived: Option<bool>,
    ) -> Result<Vec<Tag>, CliError> {
        self.hit();
        Ok(self
            .state
            .read()
            .unwrap()
            .tags
            .iter()
            .filter(|t| archived.map_or(true, |a| t.archived == a))
            .cloned()
            .collect())
    }

    async fn list_time_entries(
        &self,
        _workspace_id: &str,
        _user_id: &str,
        filter: &TimeEntryFilter,
    ) -> Result<Vec<TimeEntry>, CliError> {
        self.hit();
        Ok(self.filtered(filter))
    }

    async fn list_hydrated_time_entries(
        &self,
        _workspace_id: &str,
        _user_id: &str,
        filter: &TimeEntryFilter,
    ) -> Result<Vec<HydratedTimeEntry>, CliError> {
        self.hit();
        let entries = self.filtered(filter);
        let state = self.state.read().unwrap();
        Ok(entries
            .into_iter()
            .map(|e| Self::hydrate(&state, e))
            .collect())
    }

    async fn get_time_entry(&self, _workspace_id: &str, id: &str) -> Result<TimeEntry, CliError> {
        self.hit();
        self.entry(id).ok_or_else(|| not_found("time entry"))
    }

    async fn get_hydrated_time_entry(
        &self,
        _workspace_id: &str,
        id: &str,
    ) -> Result<HydratedTimeEntry, CliError> {
        self.hit();
        let entry = self.entry(id).ok_or_else(|| not_found("time entry"))?;
        let state = self.state.read().unwrap();
        Ok(Self::hydrate(&state, entry))
    }

    async fn create_time_entry(
        &self,
        workspace_id: &str,
        payload: &TimeEntryPayload,
    ) -> Result<TimeEntry, CliError> {
        self.hit();
        let mut state = self.state.write().unwrap();
        if state
            .creates_before_failure
            .is_some_and(|successes| state.created.len() >= successes)
        {
            return Err(CliError::Remote(
                "create time entry failed (500): internal error".to_string(),
            ));
        }
        state.next_id += 1;
        let mut entry = TimeEntry::new(
            format!("te-{}", state.next_id),
            TimeInterval::new(payload.start, payload.end),
        );
        entry.workspace_id = workspace_id.to_string();
        entry.user_id = state.user.id.clone();
        Self::apply_payload(&mut entry, payload);

        state.entries.push(entry.clone());
        state.created.push(payload.clone());
        Ok(entry)
    }

    async fn update_time_entry(
        &self,
        _workspace_id: &str,
        id: &str,
        payload: &TimeEntryPayload,
    ) -> Result<TimeEntry, CliError> {
        self.hit();
        let mut state = self.state.write().unwrap();
        let entry = state
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| not_found("time entry"))?;
        Self::apply_payload(entry, payload);
        let entry = entry.clone();

        state.updated.push((id.to_string(), payload.clone()));
        Ok(entry)
    }

    async fn delete_time_entry(&self, _workspace_id: &str, id: &str) -> Result<(), CliError> {
        self.hit();
        let mut state = self.state.write().unwrap();
        let before = state.entries.len();
        state.entries.retain(|e| e.id != id);
        if state.entries.len() == before {
            return Err(not_found("time entry"));
        }
        state.deleted.push(id.to_string());
        Ok(())
    }

    async fn stop_running(
        &self,
        _workspace_id: &str,
        _user_id: &str,
        end: DateTime<Utc>,
    ) -> Result<TimeEntry, CliError> {
        self.hit();
        let mut state = self.state.write().unwrap();
        if state.stop_not_found {
            return Err(not_found("running time entry"));
        }
        let entry = state
            .entries
            .iter_mut()
            .find(|e| e.time_interval.is_running())
            .ok_or_else(|| not_found("running time entry"))?;
        entry.time_interval.end = Some(end);
        let entry = entry.clone();

        state.stopped.push(end);
        Ok(entry)
    }

    async fn change_invoiced(
        &self,
        _workspace_id: &str,
        ids: &[String],
        invoiced: bool,
    ) -> Result<(), CliError> {
        self.hit();
        let mut state = self.state.write().unwrap();
        for entry in state.entries.iter_mut().filter(|e| ids.contains(&e.id)) {
            entry.invoiced = invoiced;
        }
        state.invoiced.push((ids.to_vec(), invoiced));
        Ok(())
    }
}

/// One scripted reply for [`ScriptedPrompter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Select(usize),
    MultiSelect(Vec<usize>),
    Text(String),
}

impl Answer {
    pub fn text(value: &str) -> Self {
        Answer::Text(value.to_string())
    }
}

/// Replays answers in order and records every question.
#[derive(Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<Answer>>,
    asked: Mutex<Vec<(String, Vec<String>)>>,
}

#[allow(dead_code)]
impl ScriptedPrompter {
    pub fn new(answers: Vec<Answer>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            asked: Mutex::default(),
        }
    }

    /// Prompts shown so far with the items offered (empty for text).
    pub fn asked(&self) -> Vec<(String, Vec<String>)> {
        self.asked.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.answers.lock().unwrap().len()
    }

    fn next(&self, prompt: &str, items: &[String]) -> Result<Answer, CliError> {
        self.asked
            .lock()
            .unwrap()
            .push((prompt.to_string(), items.to_vec()));
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| CliError::Prompt(format!("no scripted answer for \"{}\"", prompt)))
    }
}

fn unexpected(prompt: &str, answer: Answer) -> CliError {
    CliError::Prompt(format!("unexpected answer {:?} for \"{}\"", answer, prompt))
}

impl Prompter for ScriptedPrompter {
    fn select(
        &self,
        prompt: &str,
        items: &[String],
        _default: Option<usize>,
    ) -> Result<usize, CliError> {
        match self.next(prompt, items)? {
            Answer::Select(i) if i < items.len() => Ok(i),
            other => Err(unexpected(prompt, other)),
        }
    }

    fn multi_select(
        &self,
        prompt: &str,
        items: &[String],
        _selected: &[bool],
        validate: SelectionValidator<'_>,
    ) -> Result<Vec<usize>, CliError> {
        match self.next(prompt, items)? {
            Answer::MultiSelect(chosen) if chosen.iter().all(|i| *i < items.len()) => {
                validate(&chosen).map_err(CliError::Prompt)?;
                Ok(chosen)
            }
            other => Err(unexpected(prompt, other)),
        }
    }

    fn text(
        &self,
        prompt: &str,
        _initial: &str,
        _suggestions: &[String],
        validate: TextValidator<'_>,
    ) -> Result<String, CliError> {
        match self.next(prompt, &[])? {
            Answer::Text(value) => {
                validate(&value).map_err(CliError::Prompt)?;
                Ok(value)
            }
            other => Err(unexpected(prompt, other)),
        }
    }
}
