/*!
 * Textual reference markers.
 *
 * `[#$tu5]` stands for the resource `tu5`, `[#$dp2@%href]` for its `href`
 * property, and `$self$` in place of an id for the resource owning the
 * skeleton. Markers are how a skeleton is displayed, and how code data
 * points at other resources (an inline footnote, a link's title).
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Opening of a reference marker
pub const REF_MARKER_START: &str = "[#$";
/// Closing of a reference marker
pub const REF_MARKER_END: &str = "]";
/// Separator between id and property name
pub const REF_MARKER_SEP: &str = "@%";
/// Id standing for the skeleton's owner
pub const SELF_REF: &str = "$self$";

static REF_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[#\$((?:\$self\$)|[^\]@\[]+)(?:@%([^\]]+))?\]").expect("valid reference marker regex")
});

/// Marker for a resource
pub fn make_ref_marker(id: &str) -> String {
    format!("{}{}{}", REF_MARKER_START, id, REF_MARKER_END)
}

/// Marker for a property of a resource
pub fn make_property_marker(id: &str, property: &str) -> String {
    format!(
        "{}{}{}{}{}",
        REF_MARKER_START, id, REF_MARKER_SEP, property, REF_MARKER_END
    )
}

/// One marker found in a text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefMarker {
    /// Byte offset of the marker start
    pub start: usize,
    /// Byte offset just after the marker
    pub end: usize,
    /// Referenced id, `$self$` for the owner
    pub id: String,
    /// Property name for property markers
    pub property: Option<String>,
}

impl RefMarker {
    /// Whether the marker points at the owning resource
    pub fn is_self(&self) -> bool {
        self.id == SELF_REF
    }
}

/// All markers in a text, in order
pub fn find_ref_markers(text: &str) -> Vec<RefMarker> {
    REF_MARKER
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(RefMarker {
                start: whole.start(),
                end: whole.end(),
                id: caps.get(1)?.as_str().to_string(),
                property: caps.get(2).map(|m| m.as_str().to_string()),
            })
        })
        .collect()
}
