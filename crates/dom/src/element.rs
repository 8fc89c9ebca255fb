//! DOM element implementation.

use crate::attributes::AttributeMap;

/// An element node.
#[derive(Clone, Debug)]
pub struct Element {
    /// Tag name (lowercase).
    tag_name: String,
    attributes: AttributeMap,
    /// Current value of form controls and editable regions.
    value: String,
}

impl Element {
    pub fn new(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_ascii_lowercase(),
            attributes: AttributeMap::new(),
            value: String::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    pub fn set_attribute(&mut self, name: &str, value: &str) {
        self.attributes.set(name, value);
    }

    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name)
    }

    pub fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    pub fn id(&self) -> Option<&str> {
        self.get_attribute("id")
    }

    /// `contenteditable` present and not `"false"`.
    pub fn is_content_editable(&self) -> bool {
        self.get_attribute("contenteditable")
            .map(|v| !v.eq_ignore_ascii_case("false"))
            .unwrap_or(false)
    }

    /// The `type` of an `<input>`, lowercased; `"text"` when unset.
    pub fn input_type(&self) -> String {
        self.get_attribute("type")
            .map(str::to_ascii_lowercase)
            .unwrap_or_else(|| "text".to_string())
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_name_lowercased() {
        assert_eq!(Element::new("TEXTAREA").tag_name(), "textarea");
    }

    #[test]
    fn test_content_editable() {
        assert!(Element::new("div").with_attribute("contenteditable", "").is_content_editable());
        assert!(Element::new("div").with_attribute("contenteditable", "true").is_content_editable());
        assert!(!Element::new("div").with_attribute("contenteditable", "FALSE").is_content_editable());
        assert!(!Element::new("div").is_content_editable());
    }

    #[test]
    fn test_input_type_defaults_to_text() {
        assert_eq!(Element::new("input").input_type(), "text");
        assert_eq!(
            Element::new("input").with_attribute("type", "Password").input_type(),
            "password"
        );
    }
}
