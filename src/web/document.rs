use crate::{
    dom::{Document, ElementId},
    prelude::HashMap,
    MapError, Result,
};
use std::cell::{Cell, RefCell};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::Element;

/// Attribute binding a page element to its [`ElementId`]
const ID_ATTRIBUTE: &str = "data-mapnav-id";

fn js_error(value: JsValue) -> MapError {
    MapError::Dom(format!("{value:?}"))
}

/// [`Document`] over the browser DOM.
///
/// Elements get an id the first time they are queried or created; the id is
/// also written to the element so later queries resolve to the same handle.
pub struct WebDocument {
    document: web_sys::Document,
    elements: RefCell<HashMap<ElementId, Element>>,
    next_id: Cell<u64>,
}

impl WebDocument {
    pub fn new(document: web_sys::Document) -> Self {
        Self {
            document,
            elements: RefCell::new(HashMap::default()),
            next_id: Cell::new(1),
        }
    }

    /// The document of the current window
    pub fn current() -> Result<Self> {
        web_sys::window()
            .and_then(|window| window.document())
            .map(Self::new)
            .ok_or_else(|| MapError::Dom("no document in this context".to_string()))
    }

    pub fn element(&self, id: ElementId) -> Result<Element> {
        self.elements
            .borrow()
            .get(&id)
            .cloned()
            .ok_or_else(|| MapError::Dom(format!("unknown element {}", id.0)))
    }

    /// Handle of `element`, registering it on first sight
    pub fn register(&self, element: Element) -> ElementId {
        let known = element
            .get_attribute(ID_ATTRIBUTE)
            .and_then(|value| value.parse().ok())
            .map(ElementId)
            .filter(|id| self.elements.borrow().contains_key(id));
        if let Some(id) = known {
            return id;
        }

        let id = ElementId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        if let Err(err) = element.set_attribute(ID_ATTRIBUTE, &id.0.to_string()) {
            log::warn!("could not tag element: {:?}", err);
        }
        self.elements.borrow_mut().insert(id, element);
        id
    }
}

impl Document for WebDocument {
    fn query(&self, selector: &str) -> Option<ElementId> {
        match self.document.query_selector(selector) {
            Ok(found) => found.map(|element| self.register(element)),
            Err(err) => {
                log::warn!("invalid selector '{}': {:?}", selector, err);
                None
            }
        }
    }

    fn query_all(&self, selector: &str) -> Vec<ElementId> {
        let Ok(nodes) = self.document.query_selector_all(selector) else {
            return Vec::new();
        };
        (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .map(|element| self.register(element))
            .collect()
    }

    fn create_element(&mut self, tag: &str) -> Result<ElementId> {
        let element = self.document.create_element(tag).map_err(js_error)?;
        Ok(self.register(element))
    }

    fn append_child(&mut self, parent: ElementId, child: ElementId) -> Result<()> {
        let parent = self.element(parent)?;
        let child = self.element(child)?;
        parent.append_child(&child).map_err(js_error)?;
        Ok(())
    }

    fn remove_element(&mut self, id: ElementId) -> Result<()> {
        let element = self.element(id)?;
        element.remove();
        self.elements.borrow_mut().remove(&id);
        Ok(())
    }

    fn set_text(&mut self, id: ElementId, text: &str) -> Result<()> {
        self.element(id)?.set_text_content(Some(text));
        Ok(())
    }

    fn text(&self, id: ElementId) -> Option<String> {
        self.element(id).ok()?.text_content()
    }

    fn set_inner_html(&mut self, id: ElementId, html: &str) -> Result<()> {
        self.element(id)?.set_inner_html(html);
        Ok(())
    }

    fn set_attribute(&mut self, id: ElementId, name: &str, value: &str) -> Result<()> {
        self.element(id)?
            .set_attribute(name, value)
            .map_err(js_error)
    }

    fn attribute(&self, id: ElementId, name: &str) -> Option<String> {
        self.element(id).ok()?.get_attribute(name)
    }

    fn add_class(&mut self, id: ElementId, class: &str) -> Result<()> {
        self.element(id)?.class_list().add_1(class).map_err(js_error)
    }

    fn remove_class(&mut self, id: ElementId, class: &str) -> Result<()> {
        self.element(id)?
            .class_list()
            .remove_1(class)
            .map_err(js_error)
    }

    fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.element(id)
            .map(|element| element.class_list().contains(class))
            .unwrap_or(false)
    }
}
