//! Thin event writer over `quick_xml::Writer`.

use crate::error::ExportError;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

pub(crate) struct XmlWriter {
    inner: Writer<Vec<u8>>,
}

impl XmlWriter {
    pub(crate) fn new() -> Self {
        Self {
            inner: Writer::new_with_indent(Vec::new(), b' ', 2),
        }
    }

    fn write(&mut self, event: Event<'_>) -> Result<(), ExportError> {
        self.inner
            .write_event(event)
            .map_err(|e| ExportError::Xml(e.to_string()))
    }

    pub(crate) fn declaration(&mut self) -> Result<(), ExportError> {
        self.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("no"))))
    }

    pub(crate) fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), ExportError> {
        self.write(Event::Start(
            BytesStart::new(name).with_attributes(attrs.iter().copied()),
        ))
    }

    pub(crate) fn end(&mut self, name: &str) -> Result<(), ExportError> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    pub(crate) fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), ExportError> {
        self.write(Event::Empty(
            BytesStart::new(name).with_attributes(attrs.iter().copied()),
        ))
    }

    pub(crate) fn text(&mut self, text: &str) -> Result<(), ExportError> {
        self.write(Event::Text(BytesText::new(text)))
    }

    /// `<name attrs>text</name>`, or `<name attrs/>` when `text` is empty
    pub(crate) fn text_element(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
        text: &str,
    ) -> Result<(), ExportError> {
        if text.is_empty() {
            return self.empty(name, attrs);
        }
        self.start(name, attrs)?;
        self.text(text)?;
        self.end(name)
    }

    pub(crate) fn finish(self) -> Result<String, ExportError> {
        String::from_utf8(self.inner.into_inner()).map_err(|e| ExportError::Xml(e.to_string()))
    }
}

/// Coordinates and sizes, one decimal
pub(crate) fn num(value: f64) -> String {
    format!("{value:.1}")
}
