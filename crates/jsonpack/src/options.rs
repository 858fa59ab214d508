//! Configuration for a parse run.

/// Options threaded from [`Parser::parse`](crate::Parser::parse) into the
/// [`Builder`](crate::Builder) before any emission.
#[derive(Debug, Clone, Copy)]
pub struct ParserOptions {
    /// Whether object index tables are ordered by byte-lexicographic key
    /// comparison when a container is closed.
    ///
    /// Sorting changes only the lookup-order references in the table; the
    /// payload bytes keep insertion order. Sorted objects use the
    /// `0x0b..=0x0e` tag range, unsorted ones `0x0f..=0x12`, so a reader can
    /// pick binary or linear key search from the tag alone.
    ///
    /// # Default
    ///
    /// `true`
    pub sort_attribute_names: bool,

    /// Upper bound on array/object nesting depth.
    ///
    /// JSON nesting is unbounded and the parser descends recursively, so a
    /// hostile input could otherwise exhaust the thread stack. Exceeding the
    /// bound fails the parse with
    /// [`ErrorKind::NestingTooDeep`](crate::ErrorKind::NestingTooDeep).
    ///
    /// # Default
    ///
    /// `1024`
    pub max_nesting_depth: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            sort_attribute_names: true,
            max_nesting_depth: 1024,
        }
    }
}
