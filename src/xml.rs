//! Indented XML document builder
//!
//! Thin wrapper over [`quick_xml::Writer`] shared by the protocol
//! writers: an element stack so callers close elements by nesting
//! order, attribute support on open, and one-line text elements.

use crate::error::Result;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

/// Builder for one indented XML document (4-space indent).
pub struct XmlBuilder {
    writer: Writer<Vec<u8>>,
    stack: Vec<String>,
}

impl XmlBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            writer: Writer::new_with_indent(Vec::new(), b' ', 4),
            stack: Vec::new(),
        }
    }

    /// Write the XML declaration. `encoding` is omitted when `None`.
    pub fn declaration(&mut self, encoding: Option<&str>) -> Result<()> {
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", encoding, None)))?;
        Ok(())
    }

    /// Open an element.
    pub fn open(&mut self, name: &str) -> Result<()> {
        self.open_with_attributes(name, &[])
    }

    /// Open an element with attributes.
    pub fn open_with_attributes(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
        let mut start = BytesStart::new(name);
        for attribute in attributes {
            start.push_attribute(*attribute);
        }

        self.writer.write_event(Event::Start(start))?;
        self.stack.push(name.to_string());
        Ok(())
    }

    /// Write `<name>text</name>` on one line.
    pub fn text_element(&mut self, name: &str, text: &str) -> Result<()> {
        self.writer
            .write_event(Event::Start(BytesStart::new(name)))?;
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    /// Close the innermost open element.
    pub fn close(&mut self) -> Result<()> {
        debug_assert!(!self.stack.is_empty(), "close() without open()");
        if let Some(name) = self.stack.pop() {
            self.writer.write_event(Event::End(BytesEnd::new(&name)))?;
        }
        Ok(())
    }

    /// Finish the document and return it as a string.
    #[must_use]
    pub fn finish(self) -> String {
        debug_assert!(self.stack.is_empty(), "unclosed elements: {:?}", self.stack);
        String::from_utf8_lossy(&self.writer.into_inner()).into_owned()
    }
}

impl Default for XmlBuilder {
    fn default() -> Self {
        Self::new()
    }
}
