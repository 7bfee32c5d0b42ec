//! External collaborators: symbol resolution, build-code mapping, suppression
//!
//! The guard analysis never resolves anything itself; it asks these traits.
//! Anything they cannot answer degrades to "not proven" upstream.

use std::collections::HashMap;

/// Field name of the platform version pseudo-value.
pub const SDK_INT: &str = "SDK_INT";

/// Resolves reference names and symbolic build codes.
pub trait SymbolResolver: Sync {
    /// Resolve a reference's textual name to its declaration name.
    /// The default resolver is the identity (parsers already store the
    /// qualified text).
    fn resolve_name<'a>(&self, reference: &'a str) -> Option<&'a str> {
        Some(reference)
    }

    /// Map a platform codename (e.g. `LOLLIPOP`) to its numeric level.
    fn api_by_build_code(&self, code: &str) -> Option<i64>;
}

/// Whether a resolved reference denotes `Build.VERSION.SDK_INT`.
///
/// Source text may be `SDK_INT`, `VERSION.SDK_INT` or the fully qualified
/// form, so we match on the trailing segment.
pub fn is_sdk_int(resolved: &str) -> bool {
    resolved == SDK_INT || resolved.ends_with(".SDK_INT")
}

/// Resolver carrying the Android codename table.
pub struct AndroidResolver {
    codes: HashMap<&'static str, i64>,
}

impl AndroidResolver {
    pub fn new() -> Self {
        let mut codes = HashMap::new();
        for (name, level) in [
            ("BASE", 1),
            ("CUPCAKE", 3),
            ("DONUT", 4),
            ("ECLAIR", 5),
            ("FROYO", 8),
            ("GINGERBREAD", 9),
            ("GINGERBREAD_MR1", 10),
            ("HONEYCOMB", 11),
            ("HONEYCOMB_MR1", 12),
            ("HONEYCOMB_MR2", 13),
            ("ICE_CREAM_SANDWICH", 14),
            ("ICE_CREAM_SANDWICH_MR1", 15),
            ("JELLY_BEAN", 16),
            ("JELLY_BEAN_MR1", 17),
            ("JELLY_BEAN_MR2", 18),
            ("KITKAT", 19),
            ("KITKAT_WATCH", 20),
            ("LOLLIPOP", 21),
            ("LOLLIPOP_MR1", 22),
            ("M", 23),
            ("N", 24),
            ("N_MR1", 25),
            ("O", 26),
            ("O_MR1", 27),
            ("P", 28),
            ("Q", 29),
            ("R", 30),
            ("S", 31),
            ("S_V2", 32),
            ("TIRAMISU", 33),
            ("UPSIDE_DOWN_CAKE", 34),
        ] {
            codes.insert(name, level);
        }
        Self { codes }
    }
}

impl Default for AndroidResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolResolver for AndroidResolver {
    fn api_by_build_code(&self, code: &str) -> Option<i64> {
        // Accept qualified references like Build.VERSION_CODES.LOLLIPOP
        let simple = code.rsplit('.').next().unwrap_or(code);
        self.codes.get(simple).copied()
    }
}

/// Answers "has a human explicitly suppressed this finding?"
pub trait SuppressionOracle: Sync {
    fn is_suppressed(&self, issue_code: &str, line: usize) -> bool;
}

/// Line-based suppression markers collected during parsing.
///
/// A finding is suppressed when a marker sits on the same line, on the line
/// directly above the call, or on the method declaration the call belongs to
/// (annotation placement).
#[derive(Debug, Clone, Default)]
pub struct LineSuppressions {
    marker_lines: Vec<usize>,
    /// Line ranges of methods carrying a suppressing annotation
    method_ranges: Vec<(usize, usize)>,
}

impl LineSuppressions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_marker(&mut self, line: usize) {
        self.marker_lines.push(line);
    }

    pub fn add_method_range(&mut self, start_line: usize, end_line: usize) {
        self.method_ranges.push((start_line, end_line));
    }

    pub fn is_empty(&self) -> bool {
        self.marker_lines.is_empty() && self.method_ranges.is_empty()
    }
}

impl SuppressionOracle for LineSuppressions {
    fn is_suppressed(&self, _issue_code: &str, line: usize) -> bool {
        if self
            .marker_lines
            .iter()
            .any(|&m| m == line || m + 1 == line)
        {
            return true;
        }
        self.method_ranges
            .iter()
            .any(|&(start, end)| (start..=end).contains(&line))
    }
}
