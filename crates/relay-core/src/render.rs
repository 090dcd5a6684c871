//! Deterministic rendering of registry snapshots into the badge string.

use std::collections::HashMap;

use crate::icons::IconMap;
use crate::registry::Notification;

/// Render a registry snapshot into the single status string published for
/// the status bar.
///
/// Each source contributes one fragment: its icon, followed by the label
/// verbatim unless the label is `"1"` (icon alone). Labels of `""` or `"0"`
/// mean "nothing unread" and contribute no fragment at all. Fragments are
/// sorted in byte order and joined with single spaces, so the output depends
/// only on the snapshot contents, never on map iteration order.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use chrono::Utc;
/// use relay_core::icons::IconMap;
/// use relay_core::registry::Notification;
/// use relay_core::render::render;
///
/// let snapshot = HashMap::from([(
///     "mail.hobsons.com".to_string(),
///     Notification { label: "3".to_string(), updated_at: Utc::now() },
/// )]);
/// assert_eq!(render(&snapshot, &IconMap::builtin()), "σ3");
/// ```
pub fn render(snapshot: &HashMap<String, Notification>, icons: &IconMap) -> String {
    let mut fragments: Vec<String> = snapshot
        .iter()
        .filter_map(|(source, notification)| display_fragment(source, &notification.label, icons))
        .collect();
    fragments.sort();
    fragments.join(" ")
}

/// The display fragment for one source, or `None` when the label means
/// "nothing unread".
fn display_fragment(source: &str, label: &str, icons: &IconMap) -> Option<String> {
    if label.is_empty() || label == "0" {
        return None;
    }

    let icon = icons.icon_for(source);
    if label == "1" {
        Some(icon.to_string())
    } else {
        Some(format!("{icon}{label}"))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
