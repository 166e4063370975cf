//! The page the widget lives in, seen through a small DOM abstraction.
//!
//! Components only ever touch the page through [`Document`]. The selectors in
//! [`selectors`] are the contract with the surrounding markup.

pub mod memory;
pub mod selector;

pub use memory::MemoryDocument;
pub use selector::SimpleSelector;

use crate::{MapError, Result};

/// Class names and selectors the page markup and stylesheet rely on
pub mod selectors {
    /// Element receiving the last map click
    pub const MARKER_POSITION: &str = ".marker-position";
    /// Sidebar container for point-of-interest links
    pub const ROUTES: &str = ".routes";
    /// Location error legend
    pub const DESCRIPTION: &str = ".description";
    /// Locate button, and the class it carries while locating
    pub const LOCATE_BUTTON: &str = ".locate-button";
    pub const LOCATE_ACTIVE_CLASS: &str = "locate-active";
    /// Map container
    pub const MAP_CONTAINER: &str = "#map";
    /// Sidebar link class
    pub const MARKER_LINK_CLASS: &str = "marker-click";
}

/// Opaque handle of an element owned by a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

/// Minimal DOM surface used by the widget.
///
/// Selectors are simple compound selectors (`tag`, `#id`, `.class` and
/// combinations such as `div.a.b`); see [`SimpleSelector`].
pub trait Document {
    /// First element in document order matching `selector`
    fn query(&self, selector: &str) -> Option<ElementId>;

    /// All elements matching `selector`, in document order
    fn query_all(&self, selector: &str) -> Vec<ElementId>;

    /// Creates a detached element
    fn create_element(&mut self, tag: &str) -> Result<ElementId>;

    fn append_child(&mut self, parent: ElementId, child: ElementId) -> Result<()>;

    /// Detaches and forgets an element together with its subtree
    fn remove_element(&mut self, id: ElementId) -> Result<()>;

    /// Replaces all content with plain text
    fn set_text(&mut self, id: ElementId, text: &str) -> Result<()>;

    /// Text content of the element and its descendants
    fn text(&self, id: ElementId) -> Option<String>;

    /// Replaces all content with trusted markup
    fn set_inner_html(&mut self, id: ElementId, html: &str) -> Result<()>;

    fn set_attribute(&mut self, id: ElementId, name: &str, value: &str) -> Result<()>;

    fn attribute(&self, id: ElementId, name: &str) -> Option<String>;

    fn add_class(&mut self, id: ElementId, class: &str) -> Result<()>;

    fn remove_class(&mut self, id: ElementId, class: &str) -> Result<()>;

    fn has_class(&self, id: ElementId, class: &str) -> bool;

    /// Like [`Document::query`] but a missing element is an error
    fn require(&self, selector: &str) -> Result<ElementId> {
        self.query(selector).ok_or_else(|| MapError::MissingElement {
            selector: selector.to_string(),
        })
    }

    /// Creates an element carrying `classes` (space separated) under `parent`
    fn create_child(&mut self, parent: ElementId, tag: &str, classes: &str) -> Result<ElementId> {
        let child = self.create_element(tag)?;
        for class in classes.split_whitespace() {
            self.add_class(child, class)?;
        }
        self.append_child(parent, child)?;
        Ok(child)
    }
}
