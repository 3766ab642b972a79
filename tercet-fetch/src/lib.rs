pub mod error;
pub mod extract;
pub mod fetcher;
pub mod record;

pub use error::{ExtractError, FetchError};
pub use extract::{Extractor, MAX_LINE_LENGTH, UNKNOWN_ATTRIBUTION, extract};
pub use fetcher::{Fetcher, FetcherConfig};
pub use record::ContentRecord;
