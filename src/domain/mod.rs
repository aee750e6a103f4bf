pub mod enums;
pub mod task;
pub mod validation;
pub mod views;

pub use enums::{Phase, TaskStatus, ThemeName, UiMode, View};
pub use task::{Task, TaskDraft, TaskPatch};
pub use validation::ValidationError;
pub use views::{display_order, format_countdown, format_minutes, progress_bar, session_badge};
