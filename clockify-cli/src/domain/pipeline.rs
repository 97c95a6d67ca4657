//! Steps over a [`Draft`] and their left-to-right composition.
//!
//! Every write command is a [`Pipeline`] of steps. The first failing step
//! stops the pipeline; the error comes back together with the draft as it was
//! when it entered that step.

use std::future::Future;

use async_trait::async_trait;

use super::{models::Draft, CliError};

/// A failed step: the draft that entered it and the reason.
#[derive(Debug)]
pub struct Halted {
    pub draft: Draft,
    pub error: CliError,
}

impl From<Halted> for CliError {
    fn from(halted: Halted) -> Self {
        halted.error
    }
}

#[async_trait]
pub trait Step: Send + Sync {
    async fn apply(&self, draft: Draft) -> Result<Draft, Halted>;
}

/// Step built from an async closure.
pub struct FnStep<F>(F);

/// Wraps `f` as a step. The entering draft is kept so a failure can hand it
/// back.
pub fn step<F, Fut>(f: F) -> FnStep<F>
where
    F: Fn(Draft) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Draft, CliError>> + Send,
{
    FnStep(f)
}

#[async_trait]
impl<F, Fut> Step for FnStep<F>
where
    F: Fn(Draft) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Draft, CliError>> + Send,
{
    async fn apply(&self, draft: Draft) -> Result<Draft, Halted> {
        let entering = draft.clone();
        (self.0)(draft).await.map_err(|error| Halted {
            draft: entering,
            error,
        })
    }
}

/// Identity step.
pub struct Noop;

pub fn noop() -> Noop {
    Noop
}

#[async_trait]
impl Step for Noop {
    async fn apply(&self, draft: Draft) -> Result<Draft, Halted> {
        Ok(draft)
    }
}

/// Runs its steps in order. A pipeline is a step itself, so pipelines nest.
#[derive(Default)]
pub struct Pipeline<'a> {
    steps: Vec<Box<dyn Step + 'a>>,
}

impl<'a> Pipeline<'a> {
    pub fn new() -> Self {
        Self { steps: vec![] }
    }

    pub fn then(mut self, step: impl Step + 'a) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Adds `step` only when `enabled`, otherwise a no-op.
    pub fn then_if(self, enabled: bool, step: impl Step + 'a) -> Self {
        if enabled {
            self.then(step)
        } else {
            self.then(noop())
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub async fn run(&self, draft: Draft) -> Result<Draft, Halted> {
        let mut draft = draft;
        for step in &self.steps {
            draft = step.apply(draft).await?;
        }
        Ok(draft)
    }
}

#[async_trait]
impl Step for Pipeline<'_> {
    async fn apply(&self, draft: Draft) -> Result<Draft, Halted> {
        self.run(draft).await
    }
}
