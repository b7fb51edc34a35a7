pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Load a JSON input record from `--input <file>` or, failing that, piped stdin.
///
/// Returns `Ok(None)` when neither is present so the caller can fall back to flags.
pub fn load<T: DeserializeOwned>(path: Option<&str>) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return file::read_json(path).map(Some);
    }
    stdin::read_stdin()
}
