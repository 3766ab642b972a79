pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    OutputFormat, collect_ids, example_record, format_record, normalize_base_url,
    resolve_db_path,
};
