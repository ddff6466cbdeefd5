//! Built-in Excel functions

pub mod date;
pub mod financial;
pub mod info;
pub mod logical;
pub mod lookup;
pub mod math;
pub mod statistical;
pub mod text;

use crate::context::EvaluationContext;
use crate::error::EvalResult;
use ahash::{AHashMap, AHashSet};
use duke_calc_core::Value;

/// Function implementation signature
///
/// Functions receive their already-evaluated operands and the context of the calling cell.
/// An `Err` is the spreadsheet error the cell displays.
pub type FunctionImpl = fn(&[Value], &EvaluationContext) -> EvalResult<Value>;

/// Function definition
#[derive(Clone, Copy)]
pub struct FunctionDef {
    /// Function name (uppercase)
    pub name: &'static str,
    /// Minimum arguments
    pub min_args: usize,
    /// Maximum arguments (None = unlimited)
    pub max_args: Option<usize>,
    /// Implementation
    pub implementation: FunctionImpl,
    /// Is volatile (recalculates every time)
    pub volatile: bool,
}

impl FunctionDef {
    pub const fn new(
        name: &'static str,
        min_args: usize,
        max_args: Option<usize>,
        implementation: FunctionImpl,
    ) -> Self {
        Self {
            name,
            min_args,
            max_args,
            implementation,
            volatile: false,
        }
    }

    /// Mark the function as volatile
    pub const fn volatile(mut self) -> Self {
        self.volatile = true;
        self
    }

    /// Whether `count` operands fit the declared arity
    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min_args && self.max_args.map_or(true, |max| count <= max)
    }
}

/// Excel functions the catalog knows by name but does not implement
///
/// Calls to these resolve to [`crate::FunctionError::NotImplemented`] just like unknown
/// names; the list only lets callers tell a coverage gap from a typo.
pub const NOT_IMPLEMENTED: &[&str] = &[
    "ADDRESS", "AREAS", "CELL", "DATEVALUE", "DOLLAR", "EDATE", "EOMONTH", "FIXED",
    "FREQUENCY", "GROWTH", "HYPERLINK", "INDIRECT", "INFO", "IRR", "ISPMT", "LINEST",
    "MIRR", "NETWORKDAYS", "OFFSET", "PERCENTILE", "QUARTILE", "RANK", "RATE", "SUMIFS",
    "TEXT", "TIMEVALUE", "TRANSPOSE", "TREND", "WORKDAY",
];

/// Function registry
pub struct FunctionRegistry {
    functions: AHashMap<String, &'static FunctionDef>,
    unimplemented: AHashSet<&'static str>,
}

impl FunctionRegistry {
    /// Create a new registry with all built-in functions
    pub fn new() -> Self {
        let mut registry = Self {
            functions: AHashMap::new(),
            unimplemented: NOT_IMPLEMENTED.iter().copied().collect(),
        };

        registry.register_all(math::FUNCTIONS);
        registry.register_all(statistical::FUNCTIONS);
        registry.register_all(text::FUNCTIONS);
        registry.register_all(date::FUNCTIONS);
        registry.register_all(financial::FUNCTIONS);
        registry.register_all(logical::FUNCTIONS);
        registry.register_all(info::FUNCTIONS);
        registry.register_all(lookup::FUNCTIONS);

        registry
    }

    /// Look up an implemented function by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&'static FunctionDef> {
        self.functions.get(&name.to_uppercase()).copied()
    }

    /// Register a function, replacing any existing definition of the same name
    pub fn register(&mut self, def: &'static FunctionDef) {
        self.functions.insert(def.name.to_uppercase(), def);
    }

    fn register_all(&mut self, defs: &'static [FunctionDef]) {
        for def in defs {
            self.register(def);
        }
    }

    /// Whether the name is a function Excel has, implemented here or not
    pub fn contains(&self, name: &str) -> bool {
        let upper = name.to_uppercase();
        self.functions.contains_key(&upper) || self.unimplemented.contains(upper.as_str())
    }

    /// Whether calling the name reaches an implementation
    pub fn is_implemented(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Names of all implemented functions, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.functions.values().map(|d| d.name).collect();
        names.sort_unstable();
        names
    }

    /// Number of implemented functions
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
