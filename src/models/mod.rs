use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// A todo item as owned by the backend. Read-only on this side.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Todo {
    pub fn new(id: impl Into<String>, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn validate(&self) -> Result<(), TodoError> {
        if self.id.is_empty() {
            return Err(TodoError::EmptyId(self.name.clone()));
        }
        Ok(())
    }

    /// Route of the detail page for this item.
    pub fn detail_path(&self) -> String {
        detail_path(&self.id)
    }
}

/// Builds `/todo/{id}` with the id encoded as a single path segment.
pub fn detail_path(id: &str) -> String {
    format!(
        "/todo/{}",
        percent_encoding::utf8_percent_encode(id, PATH_SEGMENT)
    )
}

const PATH_SEGMENT: &percent_encoding::AsciiSet = &percent_encoding::CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Input of the `createTodo` mutation, built from one form submission.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CreateTodoInput {
    pub name: String,
    pub description: String,
}

impl CreateTodoInput {
    pub fn new(name: String, description: String) -> Result<Self, TodoError> {
        if name.trim().is_empty() {
            return Err(TodoError::EmptyName);
        }

        Ok(Self { name, description })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TodoError {
    #[error("Title cannot be empty")]
    EmptyName,
    #[error("Todo \"{0}\" has no identifier")]
    EmptyId(String),
    #[error("Invalid list order: {0}")]
    InvalidOrder(String),
}

/// How the loader arranges the items it got from the backend.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum ListOrder {
    /// Whatever order the backend returned.
    #[default]
    Backend,
    /// Oldest first; undated items go last.
    Created,
}

impl ListOrder {
    pub fn from_str(s: &str) -> Result<Self, TodoError> {
        match s.to_lowercase().as_str() {
            "backend" => Ok(ListOrder::Backend),
            "created" => Ok(ListOrder::Created),
            _ => Err(TodoError::InvalidOrder(s.to_string())),
        }
    }

    pub fn to_str(self) -> &'static str {
        match self {
            ListOrder::Backend => "backend",
            ListOrder::Created => "created",
        }
    }

    pub fn apply(self, todos: &mut [Todo]) {
        match self {
            ListOrder::Backend => {}
            // sort_by_key is stable, so equal keys keep backend order
            ListOrder::Created => todos.sort_by_key(|t| (t.created_at.is_none(), t.created_at)),
        }
    }
}

/// Props handed from the loader to the index renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexProps {
    pub todos: Vec<Todo>,
}

impl IndexProps {
    pub fn new(todos: Vec<Todo>) -> Result<Self, TodoError> {
        for todo in &todos {
            todo.validate()?;
        }
        Ok(Self { todos })
    }
}
