//! Removal of the guard's own marker element from the page.

use dom::Document;

/// Remove the element with id `marker_id`. Returns whether one was found.
pub fn remove_marker(document: &mut Document, marker_id: &str) -> bool {
    match document.get_element_by_id(marker_id) {
        Some(node) => {
            document.remove(node);
            tracing::debug!(marker_id, "marker element removed");
            true
        }
        None => false,
    }
}
