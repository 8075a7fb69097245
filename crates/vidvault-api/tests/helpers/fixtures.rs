use axum_test::multipart::{MultipartForm, Part};

/// Field name the upload endpoint reads files from.
pub const FILES_FIELD: &str = "files[]";

/// Fake video payload; content is never inspected, only the extension.
pub fn video_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

pub fn file_part(filename: &str, data: Vec<u8>) -> Part {
    Part::bytes(data)
        .file_name(filename.to_string())
        .mime_type("application/octet-stream")
}

/// A form with one `files[]` part per `(filename, size)` pair.
pub fn upload_form(files: &[(&str, usize)]) -> MultipartForm {
    files
        .iter()
        .fold(MultipartForm::new(), |form, (name, size)| {
            form.add_part(FILES_FIELD, file_part(name, video_bytes(*size)))
        })
}
