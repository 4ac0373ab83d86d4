//! Minimal XML element tree for launch files
//!
//! Only elements and their attributes matter for resolution; text, comments
//! and processing instructions are dropped.

use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{DocumentError, Span};

/// One XML element with its attributes in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    /// Byte range from the start tag to the end tag
    pub span: Span,
}

impl Element {
    /// Get an attribute value by name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn from_start(start: &BytesStart<'_>, span: Span) -> Result<Self, String> {
        let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| e.to_string())?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value().map_err(|e| e.to_string())?;
            attributes.push((key, value.into_owned()));
        }
        Ok(Self {
            tag,
            attributes,
            children: Vec::new(),
            span,
        })
    }
}

/// Parse launch file markup into its root element
pub fn parse_document(source: &str, path: &Path) -> Result<Element, DocumentError> {
    let xml_error = |span: Span, message: String| DocumentError::Xml {
        path: path.to_path_buf(),
        span,
        message,
    };

    let mut reader = Reader::from_str(source);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let start = reader.buffer_position() as usize;
        let event = reader
            .read_event()
            .map_err(|e| xml_error(start..reader.buffer_position() as usize, e.to_string()))?;
        let end = reader.buffer_position() as usize;

        let finished = match event {
            Event::Start(ref e) => {
                let element = Element::from_start(e, start..end).map_err(|m| xml_error(start..end, m))?;
                stack.push(element);
                None
            }
            Event::Empty(ref e) => {
                Some(Element::from_start(e, start..end).map_err(|m| xml_error(start..end, m))?)
            }
            Event::End(_) => match stack.pop() {
                Some(mut element) => {
                    element.span.end = end;
                    Some(element)
                }
                None => return Err(xml_error(start..end, "unexpected closing tag".to_string())),
            },
            Event::Eof => break,
            _ => None,
        };

        if let Some(element) = finished {
            match stack.last_mut() {
                Some(parent) => parent.children.push(element),
                None if root.is_none() => root = Some(element),
                None => {
                    return Err(xml_error(
                        element.span,
                        "document has more than one root element".to_string(),
                    ))
                }
            }
        }
    }

    if let Some(open) = stack.pop() {
        return Err(xml_error(
            open.span,
            format!("<{}> is never closed", open.tag),
        ));
    }

    root.ok_or_else(|| DocumentError::EmptyDocument {
        path: path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Result<Element, DocumentError> {
        parse_document(source, Path::new("pkg/launch/test.launch"))
    }

    #[test]
    fn test_nested_elements_and_attributes() {
        let root = parse(
            r#"<?xml version="1.0"?>
            <launch>
                <!-- comment -->
                <arg name="cam" default="front" />
                <group if="true">
                    <node pkg="camera_driver" type="driver" name="cam_node">
                        <param name="rate" value="30" />
                    </node>
                </group>
            </launch>"#,
        )
        .unwrap();

        assert_eq!(root.tag, "launch");
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].attribute("default"), Some("front"));
        let group = &root.children[1];
        assert_eq!(group.tag, "group");
        assert_eq!(group.children[0].attribute("pkg"), Some("camera_driver"));
        assert_eq!(group.children[0].children[0].tag, "param");
    }

    #[test]
    fn test_attribute_entities_are_unescaped() {
        let root = parse(r#"<launch><arg name="a" value="x &amp; y"/></launch>"#).unwrap();
        assert_eq!(root.children[0].attribute("value"), Some("x & y"));
    }

    #[test]
    fn test_span_covers_element() {
        let source = r#"<launch><node pkg="p" type="t" name="n"/></launch>"#;
        let root = parse(source).unwrap();
        let node = &root.children[0];
        assert_eq!(&source[node.span.clone()], r#"<node pkg="p" type="t" name="n"/>"#);
        assert_eq!(root.span, 0..source.len());
    }

    #[test]
    fn test_mismatched_end_tag_is_an_error() {
        let err = parse("<launch><group></launch>").unwrap_err();
        assert!(matches!(err, DocumentError::Xml { .. }));
    }

    #[test]
    fn test_unclosed_element_is_an_error() {
        let err = parse("<launch><group>").unwrap_err();
        assert!(matches!(err, DocumentError::Xml { .. }));
    }

    #[test]
    fn test_empty_document() {
        let err = parse("<?xml version=\"1.0\"?>\n").unwrap_err();
        assert!(matches!(err, DocumentError::EmptyDocument { .. }));
    }
}
