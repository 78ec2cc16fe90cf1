use std::path::Path;

use serde::Serialize;

use super::error::EknError;

pub const EXTENSION: &str = "ekn";

/// Pieces of a `YYYY_<name><N>.ekn` filename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedName {
    pub year: i16,
    /// Channel name with all digit runs removed (`ER1` -> `ER`)
    pub base_name: String,
    /// First digit run of the channel name (`ER1` -> `1`)
    pub position: Option<u32>,
}

/// Parse the bare file name (no directories) of an ekn file.
///
/// Year is the first four characters, the channel name sits between the
/// underscore and the extension.
pub fn parse_filename(file_name: &str) -> Result<ParsedName, EknError> {
    let bytes = file_name.as_bytes();
    let len = bytes.len();

    // "YYYY_" + ".ekn"
    if len < 9
        || !bytes[..4].iter().all(u8::is_ascii_digit)
        || bytes[4] != b'_'
        || bytes[len - 4] != b'.'
        || !bytes[len - 3..].eq_ignore_ascii_case(EXTENSION.as_bytes())
    {
        return Err(EknError::FormatError(file_name.to_string()));
    }

    let year = file_name[..4]
        .parse::<i16>()
        .map_err(|_| EknError::FormatError(file_name.to_string()))?;

    // both cut points sit next to ascii bytes checked above
    let name = &file_name[5..len - 4];

    let base_name = name.chars().filter(|c| !c.is_ascii_digit()).collect();
    let position = name
        .split(|c: char| !c.is_ascii_digit())
        .find(|run| !run.is_empty())
        .and_then(|run| run.parse().ok());

    Ok(ParsedName {
        year,
        base_name,
        position,
    })
}

/// Bare file name of `path` as UTF-8.
pub fn file_name_of(path: &Path) -> Result<String, EknError> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| EknError::FormatError(path.to_string_lossy().into_owned()))
}

/// Whether `path` carries the `.ekn` extension (any case).
pub fn has_ekn_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(EXTENSION))
}
