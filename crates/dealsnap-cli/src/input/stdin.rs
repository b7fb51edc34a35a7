use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// Deserialise an input record piped on stdin.
/// Returns None when stdin is a terminal or the pipe is empty.
pub fn read_stdin<T: DeserializeOwned>() -> Result<Option<T>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;

    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let record: T = serde_json::from_str(trimmed)
        .map_err(|e| format!("Invalid deal input on stdin: {}", e))?;
    Ok(Some(record))
}
