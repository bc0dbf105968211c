use log::warn;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to read program file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed program line {line}: '{content}' is not an 8-bit binary value")]
    MalformedLine { line: usize, content: String },
}

/// Reads and parses a `.ls8` program file.
pub fn load_program(path: &Path) -> Result<Vec<u8>, LoaderError> {
    let content = fs::read_to_string(path)?;
    parse_program(&content)
}

/// Parses the textual program format: one base-2 value per line.
///
/// Everything from `#` to the end of a line is a comment. Blank and comment-only lines are
/// skipped. Any other line must be a binary number that fits in a byte.
pub fn parse_program(source: &str) -> Result<Vec<u8>, LoaderError> {
    let mut program = Vec::new();

    for (index, raw) in source.lines().enumerate() {
        let code = raw.split('#').next().unwrap_or("").trim();
        if code.is_empty() {
            continue;
        }
        let byte = u8::from_str_radix(code, 2).map_err(|_| LoaderError::MalformedLine {
            line: index + 1,
            content: code.to_string(),
        })?;
        program.push(byte);
    }

    if program.is_empty() {
        warn!("Program source contained no instructions");
    }
    Ok(program)
}
