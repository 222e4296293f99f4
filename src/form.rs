//! Creation form submission: `Idle -> Submitting -> {NavigatingToDetail | ShowingError}`.

use crate::backend::{AuthMode, BackendMutationError, TodoBackend};
use crate::models::{detail_path, CreateTodoInput};
use crate::session::Session;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Mutex;
use thiserror::Error;
use uuid::Uuid;

/// Raw form fields as posted by the browser. Missing fields are empty.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct CreateTodoForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Submitting,
    NavigatingToDetail { location: String },
    ShowingError { message: String },
}

/// Error surfaced to the page's error boundary. `Display` is the exact
/// message shown to the user.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("{0}")]
    Invalid(String),
    #[error("Sign in to create a todo")]
    SignedOut,
    #[error("A submission is already in progress")]
    AlreadySubmitting,
    #[error("{0}")]
    Backend(String),
}

/// Tracks users with a create request in flight.
#[derive(Debug, Default)]
pub struct SubmissionGuard {
    in_flight: Mutex<HashSet<String>>,
}

impl SubmissionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the slot for `key`, or returns `None` while another
    /// submission for it is running. The slot frees when the ticket drops.
    pub fn try_begin(&self, key: &str) -> Option<SubmissionTicket<'_>> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if !in_flight.insert(key.to_string()) {
            return None;
        }
        Some(SubmissionTicket {
            guard: self,
            key: key.to_string(),
        })
    }

    pub fn is_busy(&self, key: &str) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(key)
    }
}

pub struct SubmissionTicket<'a> {
    guard: &'a SubmissionGuard,
    key: String,
}

impl Drop for SubmissionTicket<'_> {
    fn drop(&mut self) {
        self.guard
            .in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.key);
    }
}

pub struct FormHandler<'a> {
    backend: &'a dyn TodoBackend,
    guard: &'a SubmissionGuard,
    state: FormState,
}

impl<'a> FormHandler<'a> {
    pub fn new(backend: &'a dyn TodoBackend, guard: &'a SubmissionGuard) -> Self {
        Self {
            backend,
            guard,
            state: FormState::Idle,
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Creates one todo from the form and returns the detail route to
    /// navigate to.
    pub async fn submit(
        &mut self,
        session: Option<&Session>,
        form: CreateTodoForm,
    ) -> Result<String, SubmissionError> {
        self.state = FormState::Submitting;
        let result = self.create(session, form).await;
        self.state = match &result {
            Ok(location) => FormState::NavigatingToDetail {
                location: location.clone(),
            },
            Err(err) => FormState::ShowingError {
                message: err.to_string(),
            },
        };
        result
    }

    async fn create(
        &self,
        session: Option<&Session>,
        form: CreateTodoForm,
    ) -> Result<String, SubmissionError> {
        let session = session.ok_or(SubmissionError::SignedOut)?;
        let input = CreateTodoInput::new(form.title, form.content)
            .map_err(|e| SubmissionError::Invalid(e.to_string()))?;

        let _ticket = self
            .guard
            .try_begin(&session.username)
            .ok_or(SubmissionError::AlreadySubmitting)?;

        let submission = Uuid::new_v4();
        tracing::info!(%submission, user = %session.username, "Creating todo");

        let auth = AuthMode::UserPool(session.clone());
        match self.backend.create_todo(&input, &auth).await {
            Ok(todo) => {
                tracing::info!(%submission, id = %todo.id, "Todo created");
                Ok(detail_path(&todo.id))
            }
            Err(err) => {
                log_mutation_error(submission, &err);
                Err(SubmissionError::Backend(err.message()))
            }
        }
    }
}

fn log_mutation_error(submission: Uuid, err: &BackendMutationError) {
    match err.errors() {
        Some(errors) => {
            for error in errors.iter() {
                tracing::error!(
                    %submission,
                    error_message = %error.message,
                    path = ?error.path,
                    error_type = ?error.error_type,
                    "createTodo reported an error"
                );
            }
        }
        None => tracing::error!(%submission, error = %err, "createTodo failed"),
    }
}
