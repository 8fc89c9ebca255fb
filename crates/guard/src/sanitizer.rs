//! Input sanitization of editable fields.

use dom::{Element, InputHook};

/// Characters stripped from edited values.
pub const MARKUP_CHARACTERS: [char; 5] = ['<', '>', '"', '\'', '&'];

/// Attribute that opts an element out when set to `disabled`.
pub const OPT_OUT_ATTRIBUTE: &str = "data-sanitization";

/// Remove every markup character from `value`.
pub fn sanitize(value: &str) -> String {
    value.chars().filter(|c| !MARKUP_CHARACTERS.contains(c)).collect()
}

/// Whether edits to `element` are sanitized.
pub fn is_sanitizable(element: &Element) -> bool {
    let editable = element.is_content_editable()
        || matches!(element.tag_name(), "input" | "textarea");
    if !editable {
        return false;
    }

    let password = element.tag_name() == "input" && element.input_type() == "password";
    let opted_out = element.get_attribute(OPT_OUT_ATTRIBUTE) == Some("disabled");
    !password && !opted_out
}

/// Document input hook that sanitizes edited values in place.
#[derive(Debug, Default)]
pub struct InputSanitizer;

impl InputSanitizer {
    pub fn new() -> Self {
        Self
    }
}

impl InputHook for InputSanitizer {
    fn on_input(&self, element: &mut Element) {
        if !is_sanitizable(element) {
            return;
        }
        if element.value().contains(MARKUP_CHARACTERS) {
            let clean = sanitize(element.value());
            tracing::debug!(tag = element.tag_name(), "stripped markup from input");
            element.set_value(clean);
        }
    }
}
