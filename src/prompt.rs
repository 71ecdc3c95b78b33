//! Interactive terminal input.

use std::io::{BufRead, Write};

use crate::error::ApiError;

/// Write `message` and read the next whitespace-delimited token.
pub fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, message: &str) -> Result<String, ApiError> {
    writeln!(output, "{}", message).map_err(|e| ApiError::Input(e.to_string()))?;
    output.flush().map_err(|e| ApiError::Input(e.to_string()))?;
    read_token(input)
}

/// Read the next whitespace-delimited token, skipping blank lines.
///
/// Anything after the first token on the same line is ignored.
pub fn read_token<R: BufRead>(input: &mut R) -> Result<String, ApiError> {
    let mut line = String::new();
    loop {
        line.clear();
        let read = input
            .read_line(&mut line)
            .map_err(|e| ApiError::Input(e.to_string()))?;
        if read == 0 {
            return Err(ApiError::Input("end of input".into()));
        }
        if let Some(token) = line.split_whitespace().next() {
            return Ok(token.to_string());
        }
    }
}
