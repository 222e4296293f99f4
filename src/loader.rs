//! Per-request data fetch that runs before the index page is rendered.

use crate::backend::{AuthMode, BackendQueryError, TodoBackend};
use crate::models::{IndexProps, ListOrder, Todo};

/// Fetches the todo list with the API key and builds the page props.
///
/// Errors are returned as-is; the caller turns them into a failed request.
pub async fn load_index(
    backend: &dyn TodoBackend,
    order: ListOrder,
) -> Result<IndexProps, BackendQueryError> {
    let mut todos = backend.list_todos(&AuthMode::ApiKey).await?;
    order.apply(&mut todos);

    let props = IndexProps::new(todos)?;
    tracing::debug!(count = props.todos.len(), order = order.to_str(), "Loaded todos");
    Ok(props)
}

/// Fetches one item for the detail page.
pub async fn load_detail(
    backend: &dyn TodoBackend,
    id: &str,
) -> Result<Option<Todo>, BackendQueryError> {
    let todo = backend.get_todo(id, &AuthMode::ApiKey).await?;
    if let Some(todo) = &todo {
        todo.validate()?;
    }
    Ok(todo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::test_utils::{Call, MemoryBackend};

    #[tokio::test]
    async fn test_load_index_uses_api_key() {
        let backend = MemoryBackend::with_todos(vec![
            Todo::new("1", "first", "a"),
            Todo::new("2", "second", "b"),
        ]);

        let props = load_index(&backend, ListOrder::Backend).await.unwrap();
        assert_eq!(props.todos.len(), 2);
        assert_eq!(props.todos[0].id, "1");
        assert_eq!(backend.calls(), vec![Call::List { auth: "API_KEY" }]);
    }

    #[tokio::test]
    async fn test_load_index_twice_is_stable() {
        let backend = MemoryBackend::with_todos(vec![Todo::new("1", "first", "a")]);
        let first = load_index(&backend, ListOrder::Backend).await.unwrap();
        let second = load_index(&backend, ListOrder::Backend).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_load_index_propagates_failure() {
        let backend = MemoryBackend::new();
        backend.fail_queries();
        let err = load_index(&backend, ListOrder::Backend).await.unwrap_err();
        assert!(matches!(err, BackendQueryError::Backend(_)));
    }

    #[tokio::test]
    async fn test_load_index_rejects_item_without_id() {
        let backend = MemoryBackend::with_todos(vec![Todo::new("", "ghost", "")]);
        let err = load_index(&backend, ListOrder::Backend).await.unwrap_err();
        assert!(matches!(err, BackendQueryError::InvalidItem(_)));
    }

    #[tokio::test]
    async fn test_load_detail() {
        let backend = MemoryBackend::with_todos(vec![Todo::new("abc", "first", "a")]);
        let todo = load_detail(&backend, "abc").await.unwrap();
        assert_eq!(todo.map(|t| t.name), Some("first".to_string()));
        assert_eq!(load_detail(&backend, "missing").await.unwrap(), None);
    }
}
