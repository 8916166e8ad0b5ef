use std::fs;
use std::path::{Path, PathBuf};

use postdesk::application::error::AppError;

/// Inline value, or the contents of `file` when one is given.
pub fn read_opt_value(val: Option<String>, file: Option<PathBuf>) -> Result<Option<String>, AppError> {
    if let Some(path) = file {
        let data = fs::read_to_string(&path).map_err(|source| input_error(&path, source))?;
        return Ok(Some(data));
    }
    Ok(val)
}

pub fn read_bytes(path: &Path) -> Result<Vec<u8>, AppError> {
    fs::read(path).map_err(|source| input_error(path, source))
}

fn input_error(path: &Path, source: std::io::Error) -> AppError {
    AppError::InputFile {
        path: path.display().to_string(),
        source,
    }
}
