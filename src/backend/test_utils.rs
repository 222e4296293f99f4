use super::{AuthMode, BackendError, BackendMutationError, BackendQueryError, TodoBackend};
use crate::graphql::{GraphQlError, GraphQlErrors};
use crate::models::{CreateTodoInput, Todo};
use async_trait::async_trait;
use std::sync::Mutex;

/// In-process backend used by the page and form tests.
#[derive(Default)]
pub struct MemoryBackend {
    todos: Mutex<Vec<Todo>>,
    mutation_errors: Mutex<Option<Vec<String>>>,
    query_fails: Mutex<bool>,
    calls: Mutex<Vec<Call>>,
    next_id: Mutex<u64>,
    pinned_id: Mutex<Option<String>>,
}

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List { auth: &'static str },
    Get { id: String, auth: &'static str },
    Create { input: CreateTodoInput, auth: &'static str },
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_todos(todos: Vec<Todo>) -> Self {
        let backend = Self::new();
        *lock(&backend.todos) = todos;
        backend
    }

    /// Makes the next mutations fail with these error messages.
    pub fn fail_mutations_with(&self, messages: &[&str]) {
        *lock(&self.mutation_errors) = Some(messages.iter().map(|m| m.to_string()).collect());
    }

    pub fn fail_queries(&self) {
        *lock(&self.query_fails) = true;
    }

    /// Assigns this id to the next created item.
    pub fn set_next_id(&self, id: &str) {
        *lock(&self.pinned_id) = Some(id.to_string());
    }

    pub fn calls(&self) -> Vec<Call> {
        lock(&self.calls).clone()
    }

    pub fn created_inputs(&self) -> Vec<CreateTodoInput> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Create { input, .. } => Some(input),
                _ => None,
            })
            .collect()
    }

    fn query_failure(&self) -> Option<BackendQueryError> {
        if *lock(&self.query_fails) {
            return Some(BackendQueryError::Backend(BackendError::Status {
                status: 500,
                body: "internal failure".to_string(),
            }));
        }
        None
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

fn graphql_errors(messages: &[String]) -> GraphQlErrors {
    let mut errors: Vec<GraphQlError> = messages
        .iter()
        .map(|message| GraphQlError {
            message: message.clone(),
            path: Some(vec![serde_json::Value::from("createTodo")]),
            locations: None,
            error_type: None,
        })
        .collect();
    if errors.is_empty() {
        errors.push(GraphQlError {
            message: "Unknown error".to_string(),
            path: None,
            locations: None,
            error_type: None,
        });
    }
    GraphQlErrors::try_from(errors).expect("error list is non-empty")
}

#[async_trait]
impl TodoBackend for MemoryBackend {
    async fn list_todos(&self, auth: &AuthMode) -> Result<Vec<Todo>, BackendQueryError> {
        lock(&self.calls).push(Call::List { auth: auth.name() });
        if let Some(err) = self.query_failure() {
            return Err(err);
        }
        Ok(lock(&self.todos).clone())
    }

    async fn get_todo(&self, id: &str, auth: &AuthMode) -> Result<Option<Todo>, BackendQueryError> {
        lock(&self.calls).push(Call::Get {
            id: id.to_string(),
            auth: auth.name(),
        });
        if let Some(err) = self.query_failure() {
            return Err(err);
        }
        Ok(lock(&self.todos).iter().find(|t| t.id == id).cloned())
    }

    async fn create_todo(
        &self,
        input: &CreateTodoInput,
        auth: &AuthMode,
    ) -> Result<Todo, BackendMutationError> {
        lock(&self.calls).push(Call::Create {
            input: input.clone(),
            auth: auth.name(),
        });

        if let Some(messages) = lock(&self.mutation_errors).as_ref() {
            return Err(BackendMutationError(BackendError::GraphQl(graphql_errors(messages))));
        }

        let id = match lock(&self.pinned_id).take() {
            Some(id) => id,
            None => {
                let mut next = lock(&self.next_id);
                *next += 1;
                format!("todo-{}", *next)
            }
        };
        let todo = Todo::new(id, input.name.clone(), input.description.clone());
        lock(&self.todos).push(todo.clone());
        Ok(todo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_backend_round_trip() {
        let backend = MemoryBackend::new();
        let input = CreateTodoInput::new("a".to_string(), "b".to_string()).unwrap();
        let created = backend.create_todo(&input, &AuthMode::ApiKey).await.unwrap();
        assert_eq!(created.id, "todo-1");

        let listed = backend.list_todos(&AuthMode::ApiKey).await.unwrap();
        assert_eq!(listed, vec![created.clone()]);

        let found = backend.get_todo("todo-1", &AuthMode::ApiKey).await.unwrap();
        assert_eq!(found, Some(created));
        assert_eq!(backend.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_memory_backend_failures() {
        let backend = MemoryBackend::new();
        backend.fail_mutations_with(&["Invalid input"]);
        let input = CreateTodoInput::new("a".to_string(), String::new()).unwrap();
        let err = backend.create_todo(&input, &AuthMode::ApiKey).await.unwrap_err();
        assert_eq!(err.message(), "Invalid input");

        backend.fail_queries();
        assert!(backend.list_todos(&AuthMode::ApiKey).await.is_err());
    }
}
