//! Error types for dsbridgectl

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Filter error: {0}")]
    Filter(#[from] dsbridge_errors::FilterError),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Parse a hex dump such as `01 00 10 ff` or `01:00:10:ff` into bytes.
pub fn parse_hex(input: &str) -> Result<Vec<u8>, CliError> {
    let digits: String = input
        .trim()
        .trim_start_matches("0x")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':' && *c != '-' && *c != ',')
        .collect();

    if !digits.is_ascii() {
        return Err(CliError::InvalidInput("hex input contains non-ASCII characters".into()));
    }

    if digits.len() % 2 != 0 {
        return Err(CliError::InvalidInput(format!(
            "hex input has an odd number of digits ({})",
            digits.len()
        )));
    }

    digits
        .as_bytes()
        .chunks(2)
        .map(|pair| {
            let pair = std::str::from_utf8(pair)
                .map_err(|e| CliError::InvalidInput(format!("invalid hex input: {e}")))?;
            u8::from_str_radix(pair, 16)
                .map_err(|e| CliError::InvalidInput(format!("invalid hex byte '{pair}': {e}")))
        })
        .collect()
}
