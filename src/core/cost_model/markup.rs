use super::error_keys::INVALID_MARKUP;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarkupInput {
    /// A lone `-` while the user is still typing a negative number.
    Incomplete,
    Value(f64),
}

impl MarkupInput {
    /// The value to submit. An incomplete entry cannot be submitted.
    pub fn submit(self) -> Result<f64, &'static str> {
        match self {
            Self::Incomplete => Err(INVALID_MARKUP),
            Self::Value(v) => Ok(v),
        }
    }
}

/// Validates markup text. Errors are catalog keys.
pub fn validate_markup(text: &str) -> Result<MarkupInput, &'static str> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(MarkupInput::Value(0.0));
    }
    if text == "-" {
        return Ok(MarkupInput::Incomplete);
    }
    match text.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(MarkupInput::Value(v)),
        _ => Err(INVALID_MARKUP),
    }
}
