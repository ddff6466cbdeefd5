//! Evaluation context and engine settings

/// Default ceiling on the operand count of variadic numeric functions
pub const DEFAULT_MAX_OPERANDS: usize = 30;

static DEFAULT_SETTINGS: EngineSettings = EngineSettings {
    date_1904: false,
    max_operands: DEFAULT_MAX_OPERANDS,
};

/// Engine-wide settings
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct EngineSettings {
    /// Date system: false = 1900 (Windows), true = 1904 (Mac)
    pub date_1904: bool,
    /// Maximum operand count accepted by SUM, AVERAGE and the other variadic numeric
    /// functions
    pub max_operands: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        DEFAULT_SETTINGS.clone()
    }
}

/// Context for a single function call
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    /// Row of the calling cell (0-based)
    pub row: u32,
    /// Column of the calling cell (0-based)
    pub col: u32,
    /// Engine settings
    pub settings: &'a EngineSettings,
}

impl<'a> EvaluationContext<'a> {
    /// Create a new evaluation context
    pub fn new(row: u32, col: u32, settings: &'a EngineSettings) -> Self {
        Self { row, col, settings }
    }
}

impl EvaluationContext<'static> {
    /// Context for a calling cell with default settings
    pub fn at(row: u32, col: u32) -> Self {
        Self {
            row,
            col,
            settings: &DEFAULT_SETTINGS,
        }
    }

    /// Create a simple context anchored at A1 (for testing)
    pub fn simple() -> Self {
        Self::at(0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = EngineSettings::default();
        assert!(!settings.date_1904);
        assert_eq!(settings.max_operands, 30);

        let ctx = EvaluationContext::at(4, 7);
        assert_eq!((ctx.row, ctx.col), (4, 7));
        assert_eq!(ctx.settings, &settings);
    }
}
