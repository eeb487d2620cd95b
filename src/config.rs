//! Parser strictness configuration (§9 Open Question 1).

/// Tunables resolving the spec's open questions about non-fatal recovery behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// When `true`, a non-`Name` token seen while a dictionary expects a key raises
    /// [`crate::error::ParseError::UnexpectedToken`] instead of being silently dropped.
    /// Defaults to `false` (the permissive reading).
    pub strict_dictionary_keys: bool,

    /// Upper bound on context-stack depth before
    /// [`crate::error::ParseError::StackDepthExceeded`] is raised.
    pub max_stack_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            strict_dictionary_keys: false,
            max_stack_depth: 1024,
        }
    }
}
