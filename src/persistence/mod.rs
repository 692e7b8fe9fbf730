pub mod debounce;
pub mod files;
pub mod records;
pub mod store;
pub mod transfer;

pub use debounce::{SaveDebouncer, DEFAULT_DEBOUNCE_MS};
pub use files::{ensure_data_dir, init_local_data_dir};
pub use store::{JsonFileStore, Store};
pub use transfer::{export_to_dir, parse_import, read_import_file};
