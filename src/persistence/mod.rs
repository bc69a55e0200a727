pub mod files;
pub mod settings;
pub mod store;

pub use files::{
    atomic_write, backup_file, data_file, ensure_daybook_dir, get_daybook_dir, init_local_daybook,
    read_file,
};
pub use settings::Settings;
pub use store::{load_snapshot, save_snapshot, StorageSchema, SCHEMA_VERSION};
