use std::fs;
use std::path::PathBuf;

use crate::error::CliError;

/// Resolve a value given either inline or as a file path.
pub fn read_opt_value(
    inline: Option<String>,
    file: Option<PathBuf>,
) -> Result<String, CliError> {
    match (inline, file) {
        (Some(value), _) => Ok(value),
        (None, Some(path)) => fs::read_to_string(&path)
            .map(|content| content.trim_end().to_string())
            .map_err(|source| CliError::InputFile {
                path: path.display().to_string(),
                source,
            }),
        (None, None) => Err(CliError::InvalidInput(
            "provide --content or --content-file".to_string(),
        )),
    }
}
