pub mod task;
pub mod user;

pub use task::{ReorderInput, Task, TaskInput, TaskPatch};
pub use user::User;
