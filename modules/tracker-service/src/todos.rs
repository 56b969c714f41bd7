//! Todo board operations (todos.json)
//!
//! Status moves are caller-driven: any status may be set from any other.

use crate::activities::non_empty;
use crate::error::{StoreError, StoreResult};
use crate::storage::Storage;
use crate::store::{self, Collection, RecordStore};
use std::sync::Arc;
use tracker_types::{
    CreateTodoRequest, Todo, TodoCollection, TodoListing, TodoStatus, UpdateTodoRequest,
};

impl Collection for TodoCollection {
    const NAME: &'static str = "todos";

    fn max_id(&self) -> Option<u64> {
        self.todos.iter().filter_map(|t| store::numeric_id(&t.id)).max()
    }
}

fn parse_status(raw: &str) -> StoreResult<TodoStatus> {
    raw.parse().map_err(StoreError::Validation)
}

pub struct TodoBoard {
    store: RecordStore<TodoCollection>,
}

impl TodoBoard {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            store: RecordStore::new(storage),
        }
    }

    pub fn store(&self) -> &RecordStore<TodoCollection> {
        &self.store
    }

    /// Create a new todo at the head of the board
    pub fn create(&self, request: CreateTodoRequest) -> StoreResult<Todo> {
        let title =
            non_empty(request.title).ok_or_else(|| StoreError::validation("title is required"))?;
        let status = match request.status.as_deref() {
            Some(raw) => parse_status(raw)?,
            None => TodoStatus::default(),
        };

        self.store.mutate(|state| {
            let now = store::now();
            let todo = Todo {
                id: store::next_id(state.max_id(), now)?,
                created_at: now,
                updated_at: now,
                title,
                status,
                description: request.description.unwrap_or_default(),
                created_by: non_empty(request.created_by).unwrap_or_else(|| "unknown".to_string()),
            };

            state.todos.insert(0, todo.clone());
            state.stats.total_todos += 1;
            state.stats.last_update = Some(now);

            Ok(todo)
        })
    }

    /// List todos, optionally only those in `status`. Stats always cover the whole board.
    pub fn list_all(&self, status: Option<&str>) -> StoreResult<TodoListing> {
        let filter = status.map(parse_status).transpose()?;
        let state = self.store.load()?;
        let todos = match filter {
            Some(status) => state.todos.into_iter().filter(|t| t.status == status).collect(),
            None => state.todos,
        };
        Ok(TodoListing {
            todos,
            stats: state.stats,
        })
    }

    pub fn get_by_id(&self, id: &str) -> StoreResult<Todo> {
        self.store
            .load()?
            .todos
            .into_iter()
            .find(|t| t.id == id)
            .ok_or_else(|| StoreError::not_found("Todo not found"))
    }

    /// Apply only the supplied fields; everything else is left as it was.
    pub fn update(&self, id: &str, request: UpdateTodoRequest) -> StoreResult<Todo> {
        let status = request.status.as_deref().map(parse_status).transpose()?;
        if matches!(request.title.as_deref(), Some(t) if t.trim().is_empty()) {
            return Err(StoreError::validation("title cannot be empty"));
        }

        self.store.mutate(|state| {
            let now = store::now();
            let todo = state
                .todos
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| StoreError::not_found("Todo not found"))?;

            if let Some(title) = request.title {
                todo.title = title;
            }
            if let Some(status) = status {
                todo.status = status;
            }
            if let Some(description) = request.description {
                todo.description = description;
            }
            todo.updated_at = now;
            let updated = todo.clone();

            state.stats.last_update = Some(now);
            Ok(updated)
        })
    }

    /// Hard-delete a todo
    pub fn delete(&self, id: &str) -> StoreResult<()> {
        self.store.mutate(|state| {
            let index = state
                .todos
                .iter()
                .position(|t| t.id == id)
                .ok_or_else(|| StoreError::not_found("Todo not found"))?;

            state.todos.remove(index);
            state.stats.total_todos = state.stats.total_todos.saturating_sub(1);
            state.stats.last_update = Some(store::now());
            Ok(())
        })
    }
}
