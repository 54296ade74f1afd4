//! The owned tag tree and its navigation primitives.

/// Name of the synthetic node that wraps a parsed document.
pub const DOCUMENT_TAG: &str = "#document";

/// A single element of a parsed tag tree.
///
/// Nodes own their children. Text content is the concatenation of the
/// element's own (trimmed) text segments; text inside child elements is
/// reachable through those children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagNode {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<TagNode>,
}

impl TagNode {
    /// Create an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            text: String::new(),
            children: Vec::new(),
        }
    }

    /// Add an attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Append to the element's own text.
    pub fn with_text(mut self, text: impl AsRef<str>) -> Self {
        self.push_text(text.as_ref());
        self
    }

    /// Append a child element.
    pub fn with_child(mut self, child: TagNode) -> Self {
        self.children.push(child);
        self
    }

    pub(crate) fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub(crate) fn push_child(&mut self, child: TagNode) {
        self.children.push(child);
    }

    pub(crate) fn push_attribute(&mut self, key: String, value: String) {
        self.attributes.push((key, value));
    }

    /// The element's tag name as written in the source.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True if this element's tag name matches `name` (ASCII case-insensitive).
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Look up an attribute value by name.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// True if the element carries the attribute, whatever its value.
    pub fn has_attr(&self, key: &str) -> bool {
        self.attr(key).is_some()
    }

    /// All attributes in source order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The element's own text content.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Direct children in document order.
    pub fn children(&self) -> &[TagNode] {
        &self.children
    }

    /// All descendants in document (pre-)order, excluding `self`.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }

    /// First descendant with the given tag name.
    pub fn find(&self, name: &str) -> Option<&TagNode> {
        self.descendants().find(|node| node.is(name))
    }

    /// First descendant with the given tag name whose attribute `key`
    /// equals `value`.
    pub fn find_where(&self, name: &str, key: &str, value: &str) -> Option<&TagNode> {
        self.descendants()
            .find(|node| node.is(name) && node.attr(key) == Some(value))
    }

    /// All descendants with the given tag name, in document order.
    pub fn find_all(&self, name: &str) -> Vec<&TagNode> {
        self.descendants().filter(|node| node.is(name)).collect()
    }

    /// Text of the first descendant with the given tag name.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.find(name).map(TagNode::text)
    }
}

/// Pre-order iterator over the descendants of a [`TagNode`].
#[derive(Debug)]
pub struct Descendants<'a> {
    stack: Vec<&'a TagNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a TagNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TagNode {
        TagNode::new("doc")
            .with_child(
                TagNode::new("list")
                    .with_attribute("type", "basic")
                    .with_child(TagNode::new("item").with_text("a")),
            )
            .with_child(
                TagNode::new("list")
                    .with_attribute("type", "collapsed")
                    .with_child(TagNode::new("item").with_text("b"))
                    .with_child(TagNode::new("item").with_text("c")),
            )
    }

    #[test]
    fn test_descendants_are_preorder() {
        let root = sample();
        let names: Vec<&str> = root.descendants().map(|n| n.name()).collect();
        assert_eq!(names, vec!["list", "item", "list", "item", "item"]);
    }

    #[test]
    fn test_find_where_filters_on_attribute() {
        let root = sample();
        let list = root.find_where("list", "type", "collapsed").unwrap();
        let texts: Vec<&str> = list.find_all("item").iter().map(|n| n.text()).collect();
        assert_eq!(texts, vec!["b", "c"]);
        assert!(root.find_where("list", "type", "missing").is_none());
    }

    #[test]
    fn test_names_match_case_insensitively() {
        let node = TagNode::new("Token")
            .with_attribute("ID", "3")
            .with_child(TagNode::new("CharacterOffsetBegin").with_text("12"));
        assert!(node.is("token"));
        assert_eq!(node.attr("id"), Some("3"));
        assert_eq!(node.child_text("characteroffsetbegin"), Some("12"));
    }

    #[test]
    fn test_find_excludes_self() {
        let node = TagNode::new("coreference").with_child(TagNode::new("coreference"));
        let inner = node.find_all("coreference");
        assert_eq!(inner.len(), 1);
        assert!(inner[0].children().is_empty());
    }
}
