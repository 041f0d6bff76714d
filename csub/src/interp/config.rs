//! Interpreter limits

/// Default bound on nested calls before `StackOverflow`
pub const DEFAULT_MAX_DEPTH: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterpConfig {
    /// Maximum number of simultaneously active calls, `main` included
    pub max_depth: usize,
}

impl InterpConfig {
    pub fn with_max_depth(max_depth: usize) -> Self {
        InterpConfig { max_depth }
    }
}

impl Default for InterpConfig {
    fn default() -> Self {
        InterpConfig {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
