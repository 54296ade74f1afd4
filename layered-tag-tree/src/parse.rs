//! XML → [`TagNode`] construction.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::{TagNode, TagTreeError, TagTreeResult, DOCUMENT_TAG};

impl TagNode {
    /// Parse an XML document into a tree rooted at a synthetic
    /// [`DOCUMENT_TAG`] node.
    ///
    /// Declarations, processing instructions, comments and doctypes are
    /// skipped. Whitespace-only text between elements is dropped and text
    /// segments are trimmed.
    pub fn parse(xml: &str) -> TagTreeResult<TagNode> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        // stack[0] is the document node; the last entry is the open element
        let mut stack = vec![TagNode::new(DOCUMENT_TAG)];

        loop {
            match reader.read_event()? {
                Event::Start(start) => {
                    stack.push(open_element(&start)?);
                }
                Event::Empty(start) => {
                    let element = open_element(&start)?;
                    current(&mut stack).push_child(element);
                }
                Event::End(end) => {
                    let found = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                    if stack.len() < 2 {
                        return Err(TagTreeError::UnexpectedClose { found });
                    }
                    if let Some(element) = stack.pop() {
                        current(&mut stack).push_child(element);
                    }
                }
                Event::Text(text) => {
                    let text = text.unescape()?;
                    current(&mut stack).push_text(&text);
                }
                Event::CData(data) => {
                    let data = data.into_inner();
                    current(&mut stack).push_text(&String::from_utf8_lossy(&data));
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if stack.len() > 1 {
            let open = stack.pop().map(|n| n.name().to_string()).unwrap_or_default();
            return Err(TagTreeError::Unclosed(open));
        }

        Ok(stack.pop().unwrap_or_else(|| TagNode::new(DOCUMENT_TAG)))
    }
}

fn open_element(start: &BytesStart<'_>) -> TagTreeResult<TagNode> {
    let mut element = TagNode::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attribute in start.attributes() {
        let attribute = attribute.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute.unescape_value()?.into_owned();
        element.push_attribute(key, value);
    }
    Ok(element)
}

fn current(stack: &mut [TagNode]) -> &mut TagNode {
    let last = stack.len() - 1;
    &mut stack[last]
}
