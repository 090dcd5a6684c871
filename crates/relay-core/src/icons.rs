//! Static source-to-icon table for the status badge.

use std::collections::HashMap;

/// Glyph shown for sources that have no dedicated icon.
pub const UNKNOWN_SOURCE_ICON: &str = "·";

/// Maps source identifiers to the single-glyph icon displayed in the badge.
///
/// The table is fixed for the lifetime of the process; sources missing from
/// it fall back to [`UNKNOWN_SOURCE_ICON`].
#[derive(Debug, Clone)]
pub struct IconMap {
    icons: HashMap<&'static str, &'static str>,
}

impl IconMap {
    /// The built-in table of known reporting applications.
    pub fn builtin() -> Self {
        let icons = HashMap::from([
            ("mail.hobsons.com", "σ"),
            ("hobsons.slack.com", "@"),
            ("hangouts.google.com", "π"),
        ]);
        Self { icons }
    }

    /// Icon for `source`, falling back to [`UNKNOWN_SOURCE_ICON`].
    pub fn icon_for(&self, source: &str) -> &str {
        self.icons.get(source).copied().unwrap_or(UNKNOWN_SOURCE_ICON)
    }
}

impl Default for IconMap {
    fn default() -> Self {
        Self::builtin()
    }
}
