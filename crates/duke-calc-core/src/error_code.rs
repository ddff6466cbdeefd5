//! Spreadsheet error values

use std::fmt;

/// Excel error values
///
/// Every data-driven failure inside the engine resolves to one of these codes; the
/// cell-evaluation layer shows [`ErrorCode::as_str`] verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorCode {
    /// #NULL! - Intersection of two areas is empty
    NullIntersection,
    /// #DIV/0! - Division by zero
    DivideByZero,
    /// #VALUE! - Wrong type of argument or operand
    InvalidValue,
    /// #REF! - Invalid cell reference
    InvalidReference,
    /// #NAME? - Unrecognized name
    UnknownName,
    /// #NUM! - Out-of-domain numeric result
    NumericError,
    /// #N/A - Value not available
    NotAvailable,
    /// Circular reference detected while scanning an operand
    CircularReference,
}

impl ErrorCode {
    /// Every error code, in ERROR.TYPE order
    pub const ALL: [ErrorCode; 8] = [
        ErrorCode::NullIntersection,
        ErrorCode::DivideByZero,
        ErrorCode::InvalidValue,
        ErrorCode::InvalidReference,
        ErrorCode::UnknownName,
        ErrorCode::NumericError,
        ErrorCode::NotAvailable,
        ErrorCode::CircularReference,
    ];

    /// Get the display string for this error
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NullIntersection => "#NULL!",
            ErrorCode::DivideByZero => "#DIV/0!",
            ErrorCode::InvalidValue => "#VALUE!",
            ErrorCode::InvalidReference => "#REF!",
            ErrorCode::UnknownName => "#NAME?",
            ErrorCode::NumericError => "#NUM!",
            ErrorCode::NotAvailable => "#N/A",
            ErrorCode::CircularReference => "~CIRCULAR~REF~",
        }
    }

    /// Parse an error literal such as `#DIV/0!` (case-insensitive)
    ///
    /// The circular-reference marker is internal and never parses.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "#NULL!" => Some(ErrorCode::NullIntersection),
            "#DIV/0!" => Some(ErrorCode::DivideByZero),
            "#VALUE!" => Some(ErrorCode::InvalidValue),
            "#REF!" => Some(ErrorCode::InvalidReference),
            "#NAME?" => Some(ErrorCode::UnknownName),
            "#NUM!" => Some(ErrorCode::NumericError),
            "#N/A" => Some(ErrorCode::NotAvailable),
            _ => None,
        }
    }

    /// The integer ERROR.TYPE reports for this error, if it has one
    pub fn error_type(&self) -> Option<u8> {
        match self {
            ErrorCode::NullIntersection => Some(1),
            ErrorCode::DivideByZero => Some(2),
            ErrorCode::InvalidValue => Some(3),
            ErrorCode::InvalidReference => Some(4),
            ErrorCode::UnknownName => Some(5),
            ErrorCode::NumericError => Some(6),
            ErrorCode::NotAvailable => Some(7),
            ErrorCode::CircularReference => None,
        }
    }

    /// Get the numeric error code (BIFF encoding)
    pub fn code(&self) -> u8 {
        match self {
            ErrorCode::NullIntersection => 0x00,
            ErrorCode::DivideByZero => 0x07,
            ErrorCode::InvalidValue => 0x0F,
            ErrorCode::InvalidReference => 0x17,
            ErrorCode::UnknownName => 0x1D,
            ErrorCode::NumericError => 0x24,
            ErrorCode::NotAvailable => 0x2A,
            ErrorCode::CircularReference => 0xFF,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_round_trips_through_parse() {
        for code in ErrorCode::ALL {
            if code == ErrorCode::CircularReference {
                assert_eq!(ErrorCode::from_str(code.as_str()), None);
            } else {
                assert_eq!(ErrorCode::from_str(code.as_str()), Some(code));
            }
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(ErrorCode::from_str("#n/a"), Some(ErrorCode::NotAvailable));
        assert_eq!(ErrorCode::from_str("#name?"), Some(ErrorCode::UnknownName));
        assert_eq!(ErrorCode::from_str("#BOGUS!"), None);
    }

    #[test]
    fn test_error_type_numbers() {
        assert_eq!(ErrorCode::NullIntersection.error_type(), Some(1));
        assert_eq!(ErrorCode::NotAvailable.error_type(), Some(7));
        assert_eq!(ErrorCode::CircularReference.error_type(), None);
    }
}
