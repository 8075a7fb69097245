//! Upload filename checks: extension allow-list, content-type lookup and sanitization.

/// Extensions accepted for upload, lower-case.
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["mp4", "mov", "avi", "mkv", "webm"];

/// Content-type used when an extension has no known mapping.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

const MAX_FILENAME_LENGTH: usize = 255;

/// Lower-cased suffix after the last dot, if any.
pub fn extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
}

/// Whether `filename` carries one of the allowed video extensions (any case).
pub fn is_allowed(filename: &str) -> bool {
    extension(filename)
        .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// MIME type for the file's extension, falling back to [`DEFAULT_CONTENT_TYPE`].
pub fn content_type_for(filename: &str) -> &'static str {
    match extension(filename).as_deref() {
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        Some("mkv") => "video/x-matroska",
        Some("webm") => "video/webm",
        _ => DEFAULT_CONTENT_TYPE,
    }
}

/// Human-readable list used in rejection messages, e.g. "MP4, MOV, AVI, MKV, WEBM".
pub fn allowed_extensions_label() -> String {
    ALLOWED_EXTENSIONS
        .iter()
        .map(|ext| ext.to_uppercase())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Sanitize a client-supplied filename for use as metadata.
///
/// Directory components (either separator) are dropped, anything outside
/// `[A-Za-z0-9._-]` becomes `_`, and leading dots are stripped so the result can never
/// name a hidden file or a parent directory. An alphanumeric extension survives: long
/// names are shortened in the stem, and a name with no usable stem becomes `file.{ext}`.
/// Returns `"file"` when nothing usable is left. The result is never used as a storage key.
pub fn sanitize(filename: &str) -> String {
    let basename = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);

    let cleaned: String = basename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let (stem, ext) = match cleaned.rsplit_once('.') {
        Some((stem, ext))
            if !ext.is_empty()
                && ext.len() < MAX_FILENAME_LENGTH / 2
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            (stem, Some(ext))
        }
        _ => (cleaned.as_str(), None),
    };

    let stem = stem.trim_start_matches('.');
    let stem = if stem.trim_matches(['_', '.']).is_empty() {
        "file"
    } else {
        stem
    };

    // `cleaned` is ASCII, so byte and char lengths agree
    match ext {
        Some(ext) => {
            let budget = MAX_FILENAME_LENGTH - ext.len() - 1;
            format!("{}.{}", &stem[..stem.len().min(budget)], ext)
        }
        None => stem[..stem.len().min(MAX_FILENAME_LENGTH)].to_string(),
    }
}
