use crate::{
    dom::{selector::SimpleSelector, Document, ElementId},
    prelude::HashMap,
    MapError, Result,
};

#[derive(Debug, Clone, Default)]
struct Node {
    tag: String,
    classes: Vec<String>,
    attributes: Vec<(String, String)>,
    text: String,
    inner_html: Option<String>,
    children: Vec<ElementId>,
    parent: Option<ElementId>,
}

impl Node {
    fn id_attribute(&self) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name == "id")
            .map(|(_, value)| value.as_str())
    }
}

/// In-memory element tree implementing [`Document`]
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    nodes: HashMap<ElementId, Node>,
    body: ElementId,
    next_id: u64,
}

impl MemoryDocument {
    /// An empty page holding just a `<body>`
    pub fn new() -> Self {
        let body = ElementId(0);
        let mut nodes = HashMap::default();
        nodes.insert(
            body,
            Node {
                tag: "body".to_string(),
                ..Default::default()
            },
        );
        Self {
            nodes,
            body,
            next_id: 1,
        }
    }

    /// A page with one element per selector appended to the body, in order
    pub fn with_elements(selectors: &[&str]) -> Result<Self> {
        let mut doc = Self::new();
        for selector in selectors {
            doc.create_matching(*selector)?;
        }
        Ok(doc)
    }

    pub fn body(&self) -> ElementId {
        self.body
    }

    /// Appends an element matching `selector` to the body
    pub fn create_matching(&mut self, selector: &str) -> Result<ElementId> {
        let parsed = SimpleSelector::parse(selector)?;
        let element = self.create_element(parsed.tag.as_deref().unwrap_or("div"))?;
        if let Some(id) = &parsed.id {
            self.set_attribute(element, "id", id)?;
        }
        for class in &parsed.classes {
            self.add_class(element, class)?;
        }
        let body = self.body;
        self.append_child(body, element)?;
        Ok(element)
    }

    pub fn children(&self, id: ElementId) -> Vec<ElementId> {
        self.nodes
            .get(&id)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.nodes.get(&id).and_then(|node| node.parent)
    }

    pub fn tag(&self, id: ElementId) -> Option<&str> {
        self.nodes.get(&id).map(|node| node.tag.as_str())
    }

    pub fn inner_html(&self, id: ElementId) -> Option<&str> {
        self.nodes.get(&id).and_then(|node| node.inner_html.as_deref())
    }

    /// Number of elements reachable from the body
    pub fn attached_len(&self) -> usize {
        self.walk(self.body).len()
    }

    /// Serializes the page as HTML
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(self.body, &mut out);
        out
    }

    fn node(&self, id: ElementId) -> Result<&Node> {
        self.nodes
            .get(&id)
            .ok_or_else(|| MapError::Dom(format!("unknown element {}", id.0)))
    }

    fn node_mut(&mut self, id: ElementId) -> Result<&mut Node> {
        self.nodes
            .get_mut(&id)
            .ok_or_else(|| MapError::Dom(format!("unknown element {}", id.0)))
    }

    /// Attached elements in document order
    fn walk(&self, from: ElementId) -> Vec<ElementId> {
        let mut order = Vec::new();
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.get(&id) {
                order.push(id);
                stack.extend(node.children.iter().rev());
            }
        }
        order
    }

    fn matching(&self, selector: &str) -> Vec<ElementId> {
        let Ok(parsed) = SimpleSelector::parse(selector) else {
            return Vec::new();
        };
        self.walk(self.body)
            .into_iter()
            .filter(|id| {
                self.nodes
                    .get(id)
                    .is_some_and(|n| parsed.matches(&n.tag, n.id_attribute(), &n.classes))
            })
            .collect()
    }

    fn detach(&mut self, id: ElementId) {
        let parent = self.nodes.get_mut(&id).and_then(|node| node.parent.take());
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|child| *child != id);
        }
    }

    fn drop_children(&mut self, id: ElementId) {
        let children = self
            .nodes
            .get_mut(&id)
            .map(|node| std::mem::take(&mut node.children))
            .unwrap_or_default();
        for child in children {
            for descendant in self.walk(child) {
                self.nodes.remove(&descendant);
            }
        }
    }

    fn write_html(&self, id: ElementId, out: &mut String) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        out.push('<');
        out.push_str(&node.tag);
        for (name, value) in &node.attributes {
            out.push_str(&format!(" {}=\"{}\"", name, escape(value)));
        }
        if !node.classes.is_empty() {
            out.push_str(&format!(" class=\"{}\"", escape(&node.classes.join(" "))));
        }
        out.push('>');
        out.push_str(&escape(&node.text));
        if let Some(html) = &node.inner_html {
            out.push_str(html);
        }
        for child in &node.children {
            self.write_html(*child, out);
        }
        out.push_str(&format!("</{}>", node.tag));
    }
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

impl Document for MemoryDocument {
    fn query(&self, selector: &str) -> Option<ElementId> {
        self.matching(selector).into_iter().next()
    }

    fn query_all(&self, selector: &str) -> Vec<ElementId> {
        self.matching(selector)
    }

    fn create_element(&mut self, tag: &str) -> Result<ElementId> {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            Node {
                tag: tag.to_lowercase(),
                ..Default::default()
            },
        );
        Ok(id)
    }

    fn append_child(&mut self, parent: ElementId, child: ElementId) -> Result<()> {
        if parent == child || self.walk(child).contains(&parent) {
            return Err(MapError::Dom("cannot append an element into itself".to_string()));
        }
        self.node(parent)?;
        self.node(child)?;
        self.detach(child);
        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(child);
        Ok(())
    }

    fn remove_element(&mut self, id: ElementId) -> Result<()> {
        if id == self.body {
            return Err(MapError::Dom("cannot remove the body".to_string()));
        }
        self.node(id)?;
        self.detach(id);
        for descendant in self.walk(id) {
            self.nodes.remove(&descendant);
        }
        Ok(())
    }

    fn set_text(&mut self, id: ElementId, text: &str) -> Result<()> {
        self.node(id)?;
        self.drop_children(id);
        let node = self.node_mut(id)?;
        node.inner_html = None;
        node.text = text.to_string();
        Ok(())
    }

    fn text(&self, id: ElementId) -> Option<String> {
        self.nodes.get(&id)?;
        Some(
            self.walk(id)
                .iter()
                .filter_map(|n| self.nodes.get(n))
                .map(|n| n.text.as_str())
                .collect(),
        )
    }

    fn set_inner_html(&mut self, id: ElementId, html: &str) -> Result<()> {
        self.node(id)?;
        self.drop_children(id);
        let node = self.node_mut(id)?;
        node.text.clear();
        node.inner_html = Some(html.to_string());
        Ok(())
    }

    fn set_attribute(&mut self, id: ElementId, name: &str, value: &str) -> Result<()> {
        let node = self.node_mut(id)?;
        if name == "class" {
            node.classes = value.split_whitespace().map(str::to_string).collect();
            return Ok(());
        }
        match node.attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => node.attributes.push((name.to_string(), value.to_string())),
        }
        Ok(())
    }

    fn attribute(&self, id: ElementId, name: &str) -> Option<String> {
        let node = self.nodes.get(&id)?;
        if name == "class" {
            return Some(node.classes.join(" "));
        }
        node.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value.clone())
    }

    fn add_class(&mut self, id: ElementId, class: &str) -> Result<()> {
        let node = self.node_mut(id)?;
        if !node.classes.iter().any(|c| c == class) {
            node.classes.push(class.to_string());
        }
        Ok(())
    }

    fn remove_class(&mut self, id: ElementId, class: &str) -> Result<()> {
        self.node_mut(id)?.classes.retain(|c| c != class);
        Ok(())
    }

    fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.nodes
            .get(&id)
            .is_some_and(|node| node.classes.iter().any(|c| c == class))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_finds_attached_elements_only() {
        let mut doc = MemoryDocument::with_elements(&["#map", ".routes"]).unwrap();
        let detached = doc.create_element("div").unwrap();
        doc.add_class(detached, "routes").unwrap();

        let routes = doc.query(".routes").unwrap();
        assert_ne!(routes, detached);
        assert_eq!(doc.query_all(".routes").len(), 1);
        assert!(doc.query("#map").is_some());
        assert!(doc.query(".missing").is_none());
    }

    #[test]
    fn test_require_reports_selector() {
        let doc = MemoryDocument::new();
        match doc.require(".routes") {
            Err(MapError::MissingElement { selector }) => assert_eq!(selector, ".routes"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_text_and_children() {
        let mut doc = MemoryDocument::with_elements(&[".routes"]).unwrap();
        let routes = doc.query(".routes").unwrap();
        let link = doc.create_child(routes, "a", "marker-click").unwrap();
        doc.set_text(link, "La Barrosa").unwrap();

        assert_eq!(doc.text(routes).as_deref(), Some("La Barrosa"));
        assert_eq!(doc.query("a.marker-click"), Some(link));

        doc.set_text(routes, "empty").unwrap();
        assert!(doc.query("a.marker-click").is_none());
        assert_eq!(doc.text(routes).as_deref(), Some("empty"));
    }

    #[test]
    fn test_class_list_and_attributes() {
        let mut doc = MemoryDocument::with_elements(&["div.locate-button"]).unwrap();
        let button = doc.query(".locate-button").unwrap();

        doc.add_class(button, "locate-active").unwrap();
        doc.add_class(button, "locate-active").unwrap();
        assert_eq!(doc.attribute(button, "class").as_deref(), Some("locate-button locate-active"));

        doc.remove_class(button, "locate-active").unwrap();
        assert!(!doc.has_class(button, "locate-active"));

        doc.set_attribute(button, "title", "locate").unwrap();
        assert_eq!(doc.attribute(button, "title").as_deref(), Some("locate"));
    }

    #[test]
    fn test_remove_element_drops_subtree() {
        let mut doc = MemoryDocument::with_elements(&["#map"]).unwrap();
        let map = doc.query("#map").unwrap();
        let pane = doc.create_child(map, "div", "pane").unwrap();
        doc.create_child(pane, "img", "tile").unwrap();
        assert_eq!(doc.attached_len(), 4);

        doc.remove_element(pane).unwrap();
        assert_eq!(doc.attached_len(), 2);
        assert!(doc.query(".tile").is_none());
        assert!(doc.remove_element(pane).is_err());
    }

    #[test]
    fn test_to_html_escapes_text() {
        let mut doc = MemoryDocument::with_elements(&["p.description"]).unwrap();
        let legend = doc.query(".description").unwrap();
        doc.set_text(legend, "a < b").unwrap();

        assert_eq!(
            doc.to_html(),
            "<body><p class=\"description\">a &lt; b</p></body>"
        );
    }
}
