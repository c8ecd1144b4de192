//! DOM helpers on top of `kuchikiki`.
//!
//! Every mutation pass collects its targets with [`NodeExt::select_all`] before
//! touching the tree, so detaching nodes never invalidates a live iterator.

use kuchikiki::traits::TendrilSink;
use kuchikiki::NodeRef;

/// Parses a full HTML document. Malformed markup is recovered, never rejected.
#[must_use]
pub fn parse_document(html: &str) -> NodeRef {
    kuchikiki::parse_html().one(html)
}

/// Collapses runs of whitespace to single spaces and trims the ends.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Tree navigation and mutation helpers implemented on [`NodeRef`].
pub trait NodeExt {
    /// Local tag name for element nodes.
    fn element_name(&self) -> Option<String>;

    /// Attribute value, or `None` when absent or not an element.
    fn attr_value(&self, name: &str) -> Option<String>;

    /// Sets an attribute on an element node; no-op otherwise.
    fn set_attr(&self, name: &str, value: &str);

    /// Removes an attribute from an element node.
    fn remove_attr(&self, name: &str);

    /// Keeps only attributes for which `keep(name)` holds.
    fn retain_attrs(&self, keep: impl Fn(&str) -> bool);

    /// Names of every attribute on the element.
    fn attr_names(&self) -> Vec<String>;

    /// All matches of `selector` among the inclusive descendants, collected.
    ///
    /// An unparseable selector yields no matches.
    fn select_all(&self, selector: &str) -> Vec<NodeRef>;

    /// First match of `selector`.
    fn select_one(&self, selector: &str) -> Option<NodeRef>;

    /// Descendant elements (excluding the node itself) with the given tag.
    fn descendants_named(&self, tag_name: &str) -> Vec<NodeRef>;

    /// Serialized children, without the node's own tags.
    fn inner_html(&self) -> String;

    /// Serialized node including its own tags.
    fn outer_html(&self) -> String;

    /// Whitespace-collapsed, trimmed text content.
    fn normalized_text(&self) -> String;

    /// Whether `other` is this node or one of its descendants.
    fn contains_node(&self, other: &NodeRef) -> bool;

    /// Replaces the element with a `tag_name` element carrying the same
    /// attributes and children. Returns the new node.
    fn rename_element(&self, tag_name: &str) -> NodeRef;

    /// Replaces the node with its children.
    fn unwrap_children(&self);
}

impl NodeExt for NodeRef {
    fn element_name(&self) -> Option<String> {
        self.as_element().map(|e| e.name.local.to_string())
    }

    fn attr_value(&self, name: &str) -> Option<String> {
        self.as_element()
            .and_then(|e| e.attributes.borrow().get(name).map(ToString::to_string))
    }

    fn set_attr(&self, name: &str, value: &str) {
        if let Some(e) = self.as_element() {
            e.attributes.borrow_mut().insert(name, value.to_string());
        }
    }

    fn remove_attr(&self, name: &str) {
        if let Some(e) = self.as_element() {
            e.attributes.borrow_mut().remove(name);
        }
    }

    fn retain_attrs(&self, keep: impl Fn(&str) -> bool) {
        if let Some(e) = self.as_element() {
            e.attributes
                .borrow_mut()
                .map
                .retain(|name, _| keep(&name.local));
        }
    }

    fn attr_names(&self) -> Vec<String> {
        self.as_element()
            .map(|e| {
                e.attributes
                    .borrow()
                    .map
                    .keys()
                    .map(|name| name.local.to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn select_all(&self, selector: &str) -> Vec<NodeRef> {
        match self.select(selector) {
            Ok(matches) => matches.map(|m| m.as_node().clone()).collect(),
            Err(()) => Vec::new(),
        }
    }

    fn select_one(&self, selector: &str) -> Option<NodeRef> {
        self.select_first(selector).ok().map(|m| m.as_node().clone())
    }

    fn descendants_named(&self, tag_name: &str) -> Vec<NodeRef> {
        self.descendants()
            .filter(|n| n.as_element().is_some_and(|e| &*e.name.local == tag_name))
            .collect()
    }

    fn inner_html(&self) -> String {
        self.children().map(|c| c.to_string()).collect()
    }

    fn outer_html(&self) -> String {
        self.to_string()
    }

    fn normalized_text(&self) -> String {
        collapse_whitespace(&self.text_contents())
    }

    fn contains_node(&self, other: &NodeRef) -> bool {
        other.inclusive_ancestors().any(|a| a == *self)
    }

    fn rename_element(&self, tag_name: &str) -> NodeRef {
        let Some(element) = self.as_element() else {
            return self.clone();
        };
        let mut name = element.name.clone();
        name.local = tag_name.into();
        let renamed = NodeRef::new_element(name, element.attributes.borrow().map.clone());
        for child in self.children().collect::<Vec<_>>() {
            renamed.append(child);
        }
        self.insert_before(renamed.clone());
        self.detach();
        renamed
    }

    fn unwrap_children(&self) {
        for child in self.children().collect::<Vec<_>>() {
            self.insert_before(child);
        }
        self.detach();
    }
}
