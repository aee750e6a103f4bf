pub mod files;
pub mod settings;
pub mod snapshot;
pub mod store;

pub use files::{ensure_pomodo_dir, init_local_pomodo, log_file};
pub use settings::{load_settings, save_settings, SettingField, Settings};
pub use snapshot::{load_current_id, load_session, load_tasks, save_current_id, save_session, save_tasks};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreKey};
