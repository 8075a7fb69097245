//! Validation modules

pub mod filename;

pub use filename::{
    allowed_extensions_label, content_type_for, extension, is_allowed, sanitize,
    ALLOWED_EXTENSIONS, DEFAULT_CONTENT_TYPE,
};
