use super::{AuthMode, BackendError, BackendMutationError, BackendQueryError, TodoBackend};
use crate::graphql::documents::{CREATE_TODO, GET_TODO, LIST_TODOS};
use crate::graphql::{decode_response, GraphQlRequest, GraphQlResponse};
use crate::models::{CreateTodoInput, Todo};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

const CONNECT_TIMEOUT_SECS: u64 = 30;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;
const MAX_ERROR_BODY_BYTES: usize = 4 * 1024;

const API_KEY_HEADER: &str = "x-api-key";

/// GraphQL client for the managed API. Built once at startup and shared
/// by every request handler.
#[derive(Debug, Clone)]
pub struct AppSyncClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListTodosData {
    list_todos: Option<TodoConnection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TodoConnection {
    #[serde(default)]
    items: Vec<Option<Todo>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetTodoData {
    get_todo: Option<Todo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateTodoData {
    create_todo: Option<Todo>,
}

impl AppSyncClient {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self, BackendError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            reqwest::header::USER_AGENT,
            HeaderValue::from_static(concat!("trtodo-web/", env!("CARGO_PKG_VERSION"))),
        );

        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .pool_idle_timeout(Some(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS)))
            .default_headers(default_headers)
            .build()?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Runs one operation with the given credential and returns its `data`.
    pub async fn execute<V, T>(
        &self,
        document: &str,
        variables: V,
        auth: &AuthMode,
    ) -> Result<T, BackendError>
    where
        V: Serialize + Send,
        T: DeserializeOwned,
    {
        let body = GraphQlRequest {
            query: document,
            variables,
        };
        let request = self.http.post(&self.endpoint).json(&body);
        let request = match auth {
            AuthMode::ApiKey => request.header(API_KEY_HEADER, &self.api_key),
            AuthMode::UserPool(session) => request.header(AUTHORIZATION, session.access_token()),
        };

        tracing::debug!(endpoint = %self.endpoint, auth = auth.name(), "Sending GraphQL request");
        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        match decode_response::<T>(&bytes) {
            Ok(GraphQlResponse {
                errors: Some(errors),
                ..
            }) => Err(BackendError::GraphQl(errors)),
            Ok(GraphQlResponse { data: Some(data), .. }) if status.is_success() => Ok(data),
            Ok(_) if status.is_success() => Err(BackendError::MissingData),
            Err(e) if status.is_success() => Err(BackendError::Decode(e)),
            _ => Err(BackendError::Status {
                status: status.as_u16(),
                body: truncate_body(&bytes),
            }),
        }
    }
}

fn truncate_body(bytes: &[u8]) -> String {
    let end = bytes.len().min(MAX_ERROR_BODY_BYTES);
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

#[async_trait]
impl TodoBackend for AppSyncClient {
    async fn list_todos(&self, auth: &AuthMode) -> Result<Vec<Todo>, BackendQueryError> {
        let data: ListTodosData = self.execute(LIST_TODOS, json!({}), auth).await?;
        let connection = data.list_todos.ok_or(BackendError::MissingData)?;

        let total = connection.items.len();
        let todos: Vec<Todo> = connection.items.into_iter().flatten().collect();
        if todos.len() != total {
            tracing::warn!(skipped = total - todos.len(), "listTodos returned null items");
        }
        Ok(todos)
    }

    async fn get_todo(&self, id: &str, auth: &AuthMode) -> Result<Option<Todo>, BackendQueryError> {
        let data: GetTodoData = self.execute(GET_TODO, json!({ "id": id }), auth).await?;
        Ok(data.get_todo)
    }

    async fn create_todo(
        &self,
        input: &CreateTodoInput,
        auth: &AuthMode,
    ) -> Result<Todo, BackendMutationError> {
        let data: CreateTodoData = self.execute(CREATE_TODO, json!({ "input": input }), auth).await?;
        Ok(data.create_todo.ok_or(BackendError::MissingData)?)
    }
}
