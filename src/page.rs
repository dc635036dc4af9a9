//! Minimal in-memory render target. The controllers mutate this element tree
//! the way the browser loader mutates the live page; keeping it headless
//! makes the badge/modal state machines and the curve math testable, and the
//! server serializes the same tree to HTML.

use std::collections::BTreeMap;

/// What activating an element does. Stored as data rather than closures so
/// the tree stays cloneable and inspectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    OpenWeekly,
    CloseWeekly,
}

#[derive(Debug, Clone, Default)]
pub struct Element {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub text: Option<String>,
    pub styles: BTreeMap<String, String>,
    pub attrs: BTreeMap<String, String>,
    pub children: Vec<Element>,
    pub action: Option<Action>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Self::default()
        }
    }

    pub fn with_id(tag: &str, id: &str) -> Self {
        let mut el = Self::new(tag);
        el.id = Some(id.to_string());
        el
    }

    pub fn with_class(tag: &str, class: &str) -> Self {
        let mut el = Self::new(tag);
        el.classes.push(class.to_string());
        el
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    pub fn set_style(&mut self, property: &str, value: &str) {
        self.styles.insert(property.to_string(), value.to_string());
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = Some(text.to_string());
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        self.attrs.insert(name.to_string(), value.to_string());
    }

    fn find_by_id_mut(&mut self, id: &str) -> Option<&mut Element> {
        if self.id.as_deref() == Some(id) {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_by_id_mut(id))
    }

    fn find_by_id(&self, id: &str) -> Option<&Element> {
        if self.id.as_deref() == Some(id) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_by_id(id))
    }

    fn find_by_class_mut(&mut self, class: &str) -> Option<&mut Element> {
        if self.has_class(class) {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(|c| c.find_by_class_mut(class))
    }

    fn find_by_class(&self, class: &str) -> Option<&Element> {
        if self.has_class(class) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_by_class(class))
    }

    fn count_matching(&self, predicate: &dyn Fn(&Element) -> bool) -> usize {
        let own = usize::from(predicate(self));
        own + self
            .children
            .iter()
            .map(|c| c.count_matching(predicate))
            .sum::<usize>()
    }

    fn to_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        if let Some(id) = &self.id {
            out.push_str(&format!(" id=\"{}\"", id));
        }
        if !self.classes.is_empty() {
            out.push_str(&format!(" class=\"{}\"", self.classes.join(" ")));
        }
        for (name, value) in &self.attrs {
            out.push_str(&format!(" {}=\"{}\"", name, escape(value)));
        }
        if !self.styles.is_empty() {
            let css: Vec<String> = self
                .styles
                .iter()
                .map(|(k, v)| format!("{}: {}", k, v))
                .collect();
            out.push_str(&format!(" style=\"{}\"", css.join("; ")));
        }
        out.push('>');
        if let Some(text) = &self.text {
            out.push_str(&escape(text));
        }
        for child in &self.children {
            child.to_html(out);
        }
        out.push_str(&format!("</{}>", self.tag));
    }
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// One page instance: a body tree plus the root-level custom properties the
/// themes drive. `layout_flushes` counts forced layout passes so tests can
/// assert the flush-before-show ordering of the modal entrance.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub root_styles: BTreeMap<String, String>,
    body: Element,
    layout_flushes: u64,
}

impl Page {
    pub fn new() -> Self {
        Self {
            root_styles: BTreeMap::new(),
            body: Element::new("body"),
            layout_flushes: 0,
        }
    }

    pub fn set_root_property(&mut self, property: &str, value: &str) {
        self.root_styles.insert(property.to_string(), value.to_string());
    }

    pub fn root_property(&self, property: &str) -> Option<&str> {
        self.root_styles.get(property).map(String::as_str)
    }

    pub fn append(&mut self, element: Element) {
        self.body.children.push(element);
    }

    pub fn by_id(&self, id: &str) -> Option<&Element> {
        self.body.find_by_id(id)
    }

    pub fn by_id_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.body.find_by_id_mut(id)
    }

    pub fn by_class(&self, class: &str) -> Option<&Element> {
        self.body.find_by_class(class)
    }

    pub fn by_class_mut(&mut self, class: &str) -> Option<&mut Element> {
        self.body.find_by_class_mut(class)
    }

    /// Direct child of body with the given id, created on first use.
    pub fn get_or_create(&mut self, tag: &str, id: &str) -> &mut Element {
        if self.body.find_by_id(id).is_none() {
            self.body.children.push(Element::with_id(tag, id));
        }
        self.body.find_by_id_mut(id).expect("just inserted")
    }

    /// Drop-and-recreate: replaces the identified top-level element with a
    /// fresh copy carrying no activation handler. The loader uses this to
    /// rebind handlers without accumulating them.
    pub fn replace_with_clone(&mut self, id: &str) -> Option<&mut Element> {
        let index = self
            .body
            .children
            .iter()
            .position(|c| c.id.as_deref() == Some(id))?;
        let mut fresh = self.body.children[index].clone();
        fresh.action = None;
        self.body.children[index] = fresh;
        Some(&mut self.body.children[index])
    }

    pub fn remove_by_class(&mut self, class: &str) -> bool {
        let before = self.body.children.len();
        self.body.children.retain(|c| !c.has_class(class));
        self.body.children.len() != before
    }

    /// Models the forced synchronous layout pass the loader issues between
    /// inserting the modal and marking it visible.
    pub fn flush_layout(&mut self) {
        self.layout_flushes += 1;
    }

    pub fn layout_flushes(&self) -> u64 {
        self.layout_flushes
    }

    pub fn count(&self, predicate: impl Fn(&Element) -> bool) -> usize {
        self.body.count_matching(&predicate)
    }

    /// Action bound to the element matched by id first, then class.
    pub fn action_of(&self, target: &str) -> Option<Action> {
        self.by_id(target)
            .or_else(|| self.by_class(target))
            .and_then(|el| el.action)
    }

    pub fn body_html(&self) -> String {
        let mut out = String::new();
        for child in &self.body.children {
            child.to_html(&mut out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_or_create_is_idempotent() {
        let mut page = Page::new();
        page.get_or_create("div", "status").set_text("one");
        page.get_or_create("div", "status").set_text("two");
        assert_eq!(page.count(|el| el.id.as_deref() == Some("status")), 1);
        assert_eq!(page.by_id("status").unwrap().text.as_deref(), Some("two"));
    }

    #[test]
    fn replace_with_clone_drops_action() {
        let mut page = Page::new();
        page.get_or_create("div", "status").action = Some(Action::OpenWeekly);
        let fresh = page.replace_with_clone("status").unwrap();
        assert!(fresh.action.is_none());
        fresh.action = Some(Action::OpenWeekly);
        assert_eq!(page.count(|el| el.action.is_some()), 1);
    }

    #[test]
    fn nested_class_lookup_and_serialization() {
        let mut page = Page::new();
        page.append(
            Element::with_class("div", "weekly-modal")
                .child(Element::with_class("p", "quote").text("a < b")),
        );
        page.by_class_mut("quote").unwrap().set_text("ok");
        let html = page.body_html();
        assert!(html.contains("<div class=\"weekly-modal\">"));
        assert!(html.contains("<p class=\"quote\">ok</p>"));
    }

    #[test]
    fn remove_by_class_reports_removal() {
        let mut page = Page::new();
        page.append(Element::with_class("div", "weekly-modal"));
        assert!(page.remove_by_class("weekly-modal"));
        assert!(!page.remove_by_class("weekly-modal"));
        assert!(page.by_class("weekly-modal").is_none());
    }
}
