use crate::graphql::GraphQlErrors;
use crate::models::{CreateTodoInput, Todo, TodoError};
use crate::session::Session;
use async_trait::async_trait;
use thiserror::Error;

pub mod appsync;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use appsync::AppSyncClient;

/// Credential a single backend call is made with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMode {
    /// Shared API key from configuration. Used for public reads.
    ApiKey,
    /// Signed-in user's access token.
    UserPool(Session),
}

impl AuthMode {
    pub fn name(&self) -> &'static str {
        match self {
            AuthMode::ApiKey => "API_KEY",
            AuthMode::UserPool(_) => "AMAZON_COGNITO_USER_POOLS",
        }
    }
}

/// Failure of one GraphQL round trip, independent of the operation.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("{0}")]
    GraphQl(GraphQlErrors),
    #[error("Invalid response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Response carried no data")]
    MissingData,
}

/// Server-side read failure. Not handled locally.
#[derive(Debug, Error)]
pub enum BackendQueryError {
    #[error("Query failed: {0}")]
    Backend(#[from] BackendError),
    #[error("Query returned an invalid item: {0}")]
    InvalidItem(#[from] TodoError),
}

/// Create failure, handed to the form handler.
#[derive(Debug, Error)]
#[error("Mutation failed: {0}")]
pub struct BackendMutationError(#[from] pub BackendError);

impl BackendMutationError {
    /// Errors the service reported, if the failure came from it.
    pub fn errors(&self) -> Option<&GraphQlErrors> {
        match &self.0 {
            BackendError::GraphQl(errors) => Some(errors),
            _ => None,
        }
    }

    /// Human-readable message: the first reported error, or the
    /// transport failure when the service reported none.
    pub fn message(&self) -> String {
        match &self.0 {
            BackendError::GraphQl(errors) => errors.first_message().to_string(),
            other => other.to_string(),
        }
    }
}

#[async_trait]
pub trait TodoBackend: Send + Sync {
    async fn list_todos(&self, auth: &AuthMode) -> Result<Vec<Todo>, BackendQueryError>;

    async fn get_todo(&self, id: &str, auth: &AuthMode) -> Result<Option<Todo>, BackendQueryError>;

    async fn create_todo(
        &self,
        input: &CreateTodoInput,
        auth: &AuthMode,
    ) -> Result<Todo, BackendMutationError>;
}
