/// Nesting ceiling applied when none is configured.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// How the top-level splitter treats quoted strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitMode {
    /// Separators, brackets and entry colons inside a quoted string are
    /// ignored; a backslash escapes the character after it.
    #[default]
    QuoteAware,
    /// Pure bracket-depth scan. Quotes are not tracked, so `["a,b"]` splits
    /// inside the string.
    ///
    /// Newlines inside an object are kept as ordinary whitespace (string
    /// contents included) rather than stripped before the scan, and a
    /// sentinel candidate counts as taken wherever it occurs, offset 0 too.
    Legacy,
}

#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub max_depth: Option<usize>,
    pub split_mode: SplitMode,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_split_mode(mut self, split_mode: SplitMode) -> Self {
        self.split_mode = split_mode;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: Some(DEFAULT_MAX_DEPTH),
            split_mode: SplitMode::default(),
        }
    }
}
