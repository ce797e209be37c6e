use crate::error::{ErrorKind, Result};
use crate::exported::{Body, ExportedMessage};
use exn::ResultExt;
use ipdsms_message::Message;
use quick_xml::Writer;
use quick_xml::escape::escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesPI, BytesStart, Event};
use std::borrow::Borrow;
use std::io::{BufWriter, Write};
use std::path::Path;
use time::UtcOffset;
use tracing::instrument;

pub type TempFile = tempfile::NamedTempFile;

/// Stylesheet the backup app ships alongside its exports.
pub const DEFAULT_STYLESHEET: &str = "sms.xsl";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// `href` of the `xml-stylesheet` instruction; `None` leaves it out.
    pub stylesheet: Option<String>,
    /// Offset `readable_date` is rendered in.
    pub offset: UtcOffset,
    /// Spaces per nesting level.
    pub indent: usize,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            stylesheet: Some(DEFAULT_STYLESHEET.to_owned()),
            offset: UtcOffset::UTC,
            indent: 2,
        }
    }
}

/// Writes "SMS Backup & Restore" documents.
#[derive(Debug, Clone, Default)]
pub struct Exporter {
    options: ExportOptions,
}

impl From<ExportOptions> for Exporter {
    fn from(options: ExportOptions) -> Self {
        Self::new(options)
    }
}

impl Exporter {
    pub fn new(options: ExportOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Write a complete document to `writer` and return the number of `sms`
    /// elements written, which is also the root's `count`.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::CountMismatch`] if the iterator yields a different number
    /// of messages than its reported length, [`ErrorKind::Io`] if writing fails.
    #[instrument(skip_all, fields(count))]
    pub fn write<W, I, M>(&self, writer: W, messages: I) -> Result<usize>
    where
        W: Write,
        I: IntoIterator<Item = M>,
        I::IntoIter: ExactSizeIterator,
        M: Borrow<Message>,
    {
        let messages = messages.into_iter();
        let declared = messages.len();
        tracing::Span::current().record("count", declared);
        let mut xml = Writer::new_with_indent(writer, b' ', self.options.indent);
        self.write_preamble(&mut xml, declared).or_raise(|| ErrorKind::Io)?;
        let mut written = 0;
        for message in messages {
            let exported = ExportedMessage::new(message.borrow(), self.options.offset);
            xml.write_event(Event::Empty(sms_element(&exported))).or_raise(|| ErrorKind::Io)?;
            written += 1;
        }
        if written != declared {
            exn::bail!(ErrorKind::CountMismatch { declared, written });
        }
        xml.write_event(Event::End(BytesEnd::new("smses"))).or_raise(|| ErrorKind::Io)?;
        let mut writer = xml.into_inner();
        writer.write_all(b"\n").or_raise(|| ErrorKind::Io)?;
        writer.flush().or_raise(|| ErrorKind::Io)?;
        Ok(written)
    }

    /// Write a document to `path`. The file appears only once it is complete;
    /// on failure nothing is left behind.
    #[instrument(skip(self, path, messages), fields(path = %path.as_ref().display()))]
    pub fn write_to_path<I, M>(&self, path: impl AsRef<Path>, messages: I) -> Result<usize>
    where
        I: IntoIterator<Item = M>,
        I::IntoIter: ExactSizeIterator,
        M: Borrow<Message>,
    {
        let path = path.as_ref();
        let directory = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
        let tmp = TempFile::new_in(directory).or_raise(|| ErrorKind::Io)?;
        let mut writer = BufWriter::new(tmp);
        let written = self.write(&mut writer, messages)?;
        let tmp = writer.into_inner().or_raise(|| ErrorKind::Io)?;
        tmp.persist(path).or_raise(|| ErrorKind::Io)?;
        tracing::debug!(written, "export persisted");
        Ok(written)
    }

    /// Render a document into a string.
    pub fn to_string<I, M>(&self, messages: I) -> Result<String>
    where
        I: IntoIterator<Item = M>,
        I::IntoIter: ExactSizeIterator,
        M: Borrow<Message>,
    {
        let mut buffer = Vec::new();
        self.write(&mut buffer, messages)?;
        String::from_utf8(buffer).or_raise(|| ErrorKind::Io)
    }

    fn write_preamble<W: Write>(&self, xml: &mut Writer<W>, count: usize) -> std::io::Result<()> {
        xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        if let Some(href) = &self.options.stylesheet {
            let content = format!(r#"xml-stylesheet type="text/xsl" href="{}""#, escape(href.as_str()));
            xml.write_event(Event::PI(BytesPI::new(content)))?;
        }
        let count = count.to_string();
        xml.write_event(Event::Start(BytesStart::new("smses").with_attributes([("count", count.as_str())])))
    }
}

fn sms_element(message: &ExportedMessage) -> BytesStart<'_> {
    let date = message.date.to_string();
    let mut element = BytesStart::new("sms");
    element.push_attribute(("protocol", "0"));
    element.push_attribute(("address", message.address.as_str()));
    element.push_attribute(("date", date.as_str()));
    element.push_attribute(("type", message.kind.as_str()));
    element.push_attribute(("subject", "null"));
    match &message.body {
        Body::Encoded(body) => element.push_attribute((b"body".as_slice(), body.as_bytes())),
        Body::Plain(body) => element.push_attribute(("body", body.as_str())),
    }
    element.push_attribute(("toa", "null"));
    element.push_attribute(("sc_toa", "null"));
    element.push_attribute(("service_center", "null"));
    element.push_attribute(("read", "1"));
    element.push_attribute(("status", "-1"));
    element.push_attribute(("locked", "0"));
    element.push_attribute(("readable_date", message.readable_date.as_str()));
    element.push_attribute(("contact_name", "(Unknown)"));
    element
}
