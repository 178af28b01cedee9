pub mod format;

pub use format::{collection_envelope, document_envelope, document_to_api_value, envelope};
