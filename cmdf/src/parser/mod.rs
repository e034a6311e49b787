//! Command-file loading with encoding auto-detection.
//!
//! Turns a command file into the ordered list of [`SourceLine`]s the
//! expansion stages work on: trailing blanks stripped, blank lines and
//! comments (`--`, `#`) dropped, file line numbers kept for diagnostics.
//! Also hosts the one built-in variable, [`NUM_CASES_PLACEHOLDER`].

pub mod tokenizer;

use std::path::Path;

use crate::error::{LoadError, LoadResult};
use crate::models::SourceLine;

pub use tokenizer::{tokenize, Delimiters};

/// Placeholder replaced by the number of loaded datasets.
pub const NUM_CASES_PLACEHOLDER: &str = "$NUM_CASES";

/// Lines loaded from a command file, with the detected encoding.
#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub lines: Vec<SourceLine>,
    pub encoding: String,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::ISO_8859_15.decode(bytes).0.into_owned(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        // UTF-8 and anything unknown: lossy UTF-8
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Split command-file content into source lines.
///
/// Trailing blanks and tabs (and a `\r` from CRLF files) are stripped;
/// empty lines and lines starting with `--` or `#` are dropped.
pub fn split_lines(content: &str) -> Vec<SourceLine> {
    content
        .split('\n')
        .enumerate()
        .filter_map(|(idx, raw)| {
            let text = raw.trim_end_matches([' ', '\t', '\r']);
            if text.is_empty() || text.starts_with("--") || text.starts_with('#') {
                None
            } else {
                Some(SourceLine::new(idx + 1, text))
            }
        })
        .collect()
}

/// Load a command file from disk.
pub fn load_command_file<P: AsRef<Path>>(path: P) -> LoadResult<LoadedFile> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(load_bytes(&bytes))
}

/// Load command-file content from raw bytes.
///
/// Valid UTF-8 is taken as is; detection only runs on other content.
pub fn load_bytes(bytes: &[u8]) -> LoadedFile {
    let (content, encoding) = match std::str::from_utf8(bytes) {
        Ok(text) => (text.to_string(), "utf-8".to_string()),
        Err(_) => {
            let encoding = detect_encoding(bytes);
            (decode_content(bytes, &encoding), encoding)
        }
    };

    LoadedFile {
        lines: split_lines(&content),
        encoding,
    }
}

/// Replace every `$NUM_CASES` with the dataset count.
pub fn substitute_variables(lines: &mut [SourceLine], num_datasets: usize) {
    let value = num_datasets.to_string();
    for line in lines.iter_mut() {
        if line.text.contains(NUM_CASES_PLACEHOLDER) {
            line.text = line.text.replace(NUM_CASES_PLACEHOLDER, &value);
        }
    }
}
