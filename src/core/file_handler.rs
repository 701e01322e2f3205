use std::path::Path;
use rand::Rng;
use rand::distributions::Alphanumeric;

/// Extensions that are picked up for upload. Matching is case-sensitive.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = [".png", ".jpg", ".jpeg"];

/// Length of the random part of a remote object name
pub const OBJECT_NAME_LENGTH: usize = 10;

/// Returns the file's extension (with the leading dot) if it is a supported image type.
pub fn supported_extension(path: &Path) -> Option<&'static str> {
    let name = path.file_name()?.to_str()?;
    let extension = &name[name.rfind('.')?..];
    SUPPORTED_EXTENSIONS
        .iter()
        .copied()
        .find(|supported| *supported == extension)
}

/// Generate a random alphanumeric string of `length` characters.
pub fn random_name(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Remote object name for an upload: random stem plus the original extension.
pub fn random_object_name(extension: &str) -> String {
    format!("{}{}", random_name(OBJECT_NAME_LENGTH), extension)
}
