//! Repository modules for database operations
//!
//! Provides the filter protocol plus owner-scoped repositories for task
//! and task group operations, encapsulating database queries.

mod filter;
mod group;
mod query;
mod task;

pub use filter::{CheckNoneFilter, DateFilter, Filter, FilterSet, TextFilter};
pub use group::{GroupRepository, NewTaskGroup, TaskGroupPage, TaskGroupPatch};
pub use query::{QueryParams, SelectQuery};
pub use task::{NewTask, TaskPage, TaskPatch, TaskRepository};
