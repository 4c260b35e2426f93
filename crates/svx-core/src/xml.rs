//! XML event source: drives a `quick-xml` namespace-aware reader and feeds
//! the events into an [`XmlHandler`].
//!
//! Input may be gzip compressed (`.svgz`); the magic bytes are sniffed
//! before any XML parsing. Entity declarations from the internal DTD
//! subset are expanded when [`Config::expand_entities`] is set.

use std::borrow::Cow;
use std::collections::HashMap;
use std::io::Read;

use flate2::read::GzDecoder;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;

use crate::builder::DocumentBuilder;
use crate::config::Config;
use crate::error::{ParseError, Result};
use crate::model::Document;
use crate::scanner::TextScanner;

pub const SVG_NS: &str = "http://www.w3.org/2000/svg";
pub const XLINK_NS: &str = "http://www.w3.org/1999/xlink";
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// One attribute of a start tag, with its prefix resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    /// Namespace URI, empty for unprefixed attributes.
    pub namespace: String,
    pub local_name: String,
    pub value: String,
}

impl XmlAttribute {
    pub fn new(namespace: &str, local_name: &str, value: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            local_name: local_name.to_string(),
            value: value.to_string(),
        }
    }
}

/// Receiver of streaming XML events.
pub trait XmlHandler {
    fn start_document(&mut self) -> Result<()>;

    /// `namespace` is empty for elements outside any namespace.
    fn start_element(&mut self, namespace: &str, local_name: &str, attrs: &[XmlAttribute]) -> Result<()>;

    /// Character data, CDATA sections included, with entities expanded.
    fn characters(&mut self, text: &str) -> Result<()>;

    /// Comment bodies. Only `<style>` content cares about these.
    fn comment(&mut self, _text: &str) -> Result<()> {
        Ok(())
    }

    fn end_element(&mut self, namespace: &str, local_name: &str) -> Result<()>;

    fn end_document(&mut self) -> Result<()>;
}

// ─── Entry points ────────────────────────────────────────────────────────

/// Parse an SVG document from text.
#[must_use = "parsing result should be used"]
pub fn parse_str(input: &str, config: &Config) -> Result<Document> {
    let mut builder = DocumentBuilder::new(config);
    drive(input, config, &mut builder)?;
    builder.finish()
}

/// Parse an SVG document from raw bytes, decompressing gzip input.
#[must_use = "parsing result should be used"]
pub fn parse_bytes(input: &[u8], config: &Config) -> Result<Document> {
    if input.starts_with(&GZIP_MAGIC) {
        log::debug!("Input is gzip compressed ({} bytes)", input.len());
        let mut inflated = Vec::new();
        GzDecoder::new(input).read_to_end(&mut inflated)?;
        return parse_str(std::str::from_utf8(&inflated)?, config);
    }
    parse_str(std::str::from_utf8(input)?, config)
}

/// Parse an SVG document from any reader.
#[must_use = "parsing result should be used"]
pub fn parse_reader<R: Read>(mut reader: R, config: &Config) -> Result<Document> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    parse_bytes(&buf, config)
}

// ─── Driver ──────────────────────────────────────────────────────────────

/// Feed every event of `input` into `handler`.
pub fn drive<H: XmlHandler + ?Sized>(input: &str, config: &Config, handler: &mut H) -> Result<()> {
    let mut reader = NsReader::from_str(input);
    reader.config_mut().expand_empty_elements = true;

    let mut entities: HashMap<String, String> = HashMap::new();
    handler.start_document()?;

    loop {
        let position = reader.buffer_position() as u64;
        let (ns, event) = reader
            .read_resolved_event()
            .map_err(|e| xml_error(position, e))?;
        let namespace = namespace_of(&ns);
        match event {
            Event::Start(start) => {
                let local_name = start.local_name();
                let local = utf8(local_name.as_ref())?;
                let attrs = attributes(&reader, &start, &entities, position)?;
                handler.start_element(&namespace, local, &attrs)?;
            }
            Event::End(end) => {
                let local_name = end.local_name();
                let local = utf8(local_name.as_ref())?;
                handler.end_element(&namespace, local)?;
            }
            Event::Text(text) => {
                let text = unescape_text(&text, &entities);
                handler.characters(&text)?;
            }
            Event::CData(data) => handler.characters(utf8(&data)?)?,
            Event::Comment(comment) => handler.comment(utf8(&comment)?)?,
            Event::DocType(doctype) => {
                if config.expand_entities {
                    entities = entity_declarations(utf8(&doctype)?);
                    log::debug!("Declared {} internal entities", entities.len());
                }
            }
            Event::Eof => break,
            Event::Decl(_) | Event::PI(_) | Event::Empty(_) => {}
        }
    }

    handler.end_document()
}

fn xml_error(position: u64, err: impl std::fmt::Display) -> ParseError {
    ParseError::Xml {
        position,
        message: err.to_string(),
    }
}

fn utf8(bytes: &[u8]) -> Result<&str> {
    Ok(std::str::from_utf8(bytes)?)
}

fn namespace_of(ns: &ResolveResult<'_>) -> String {
    match ns {
        ResolveResult::Bound(Namespace(uri)) => String::from_utf8_lossy(uri).into_owned(),
        _ => String::new(),
    }
}

fn attributes(
    reader: &NsReader<&[u8]>,
    start: &BytesStart<'_>,
    entities: &HashMap<String, String>,
    position: u64,
) -> Result<Vec<XmlAttribute>> {
    let mut out = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| xml_error(position, e))?;
        // namespace declarations are consumed by the reader
        let key = attr.key.as_ref();
        if key == b"xmlns" || key.starts_with(b"xmlns:") {
            continue;
        }
        let (ns, local) = reader.resolve_attribute(attr.key);
        let value = attr
            .unescape_value_with(|name| resolve_entity(entities, name))
            .map_err(|e| xml_error(position, e))?;
        out.push(XmlAttribute {
            namespace: namespace_of(&ns),
            local_name: utf8(local.as_ref())?.to_string(),
            value: value.into_owned(),
        });
    }
    Ok(out)
}

fn resolve_entity<'e>(entities: &'e HashMap<String, String>, name: &str) -> Option<&'e str> {
    entities
        .get(name)
        .map(String::as_str)
        .or_else(|| resolve_predefined_entity(name))
}

/// Expand entity references. Undeclared entities are kept verbatim.
fn unescape_text<'a>(text: &'a BytesText<'_>, entities: &HashMap<String, String>) -> Cow<'a, str> {
    match text.unescape_with(|name| resolve_entity(entities, name)) {
        Ok(s) => s,
        Err(err) => {
            log::warn!("Keeping unexpanded text: {err}");
            String::from_utf8_lossy(text)
        }
    }
}

/// Collect `<!ENTITY name "value">` declarations from a DOCTYPE body.
/// Parameter and external entities are ignored.
fn entity_declarations(doctype: &str) -> HashMap<String, String> {
    let mut entities = HashMap::new();
    let Some(subset_start) = doctype.find('[') else {
        return entities;
    };
    let mut rest = &doctype[subset_start + 1..];
    while let Some(at) = rest.find("<!ENTITY") {
        let mut scan = TextScanner::untrimmed(&rest[at + "<!ENTITY".len()..]);
        scan.skip_whitespace();
        if !scan.consume(b'%')
            && let Some(name) = scan.next_token(b'>')
        {
            scan.skip_whitespace();
            if let Some(value) = scan.next_quoted_string() {
                entities.entry(name.to_string()).or_insert_with(|| value.to_string());
            }
        }
        let consumed = rest.len() - scan.remaining().len();
        rest = &rest[consumed.max(at + 1)..];
    }
    entities
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl XmlHandler for Recorder {
        fn start_document(&mut self) -> Result<()> {
            self.events.push("start-doc".into());
            Ok(())
        }

        fn start_element(&mut self, ns: &str, name: &str, attrs: &[XmlAttribute]) -> Result<()> {
            let attrs: Vec<String> = attrs
                .iter()
                .map(|a| format!("{}|{}={}", a.namespace, a.local_name, a.value))
                .collect();
            self.events.push(format!("<{ns}|{name} {}>", attrs.join(" ")));
            Ok(())
        }

        fn characters(&mut self, text: &str) -> Result<()> {
            self.events.push(format!("text {text:?}"));
            Ok(())
        }

        fn end_element(&mut self, _ns: &str, name: &str) -> Result<()> {
            self.events.push(format!("</{name}>"));
            Ok(())
        }

        fn end_document(&mut self) -> Result<()> {
            self.events.push("end-doc".into());
            Ok(())
        }
    }

    #[test]
    fn namespaces_are_resolved() {
        let mut rec = Recorder::default();
        let input = r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xl="http://www.w3.org/1999/xlink"><use xl:href="#a"/></svg>"##;
        drive(input, &Config::default(), &mut rec).unwrap();
        assert_eq!(
            rec.events,
            vec![
                "start-doc".to_string(),
                format!("<{SVG_NS}|svg >"),
                format!("<{SVG_NS}|use {XLINK_NS}|href=#a>"),
                "</use>".to_string(),
                "</svg>".to_string(),
                "end-doc".to_string(),
            ]
        );
    }

    #[test]
    fn prefixed_elements_report_local_names() {
        let mut rec = Recorder::default();
        let input = r#"<s:svg xmlns:s="http://www.w3.org/2000/svg"><s:g></s:g></s:svg>"#;
        drive(input, &Config::default(), &mut rec).unwrap();
        assert_eq!(
            rec.events,
            vec![
                "start-doc".to_string(),
                format!("<{SVG_NS}|svg >"),
                format!("<{SVG_NS}|g >"),
                "</g>".to_string(),
                "</svg>".to_string(),
                "end-doc".to_string(),
            ]
        );
    }

    #[test]
    fn internal_entities_expand() {
        let input = r#"<!DOCTYPE svg [ <!ENTITY fg "red"> <!ENTITY % p "x"> ]>
<svg fill="&fg;">&fg; &amp;</svg>"#;
        let mut rec = Recorder::default();
        drive(input, &Config::default(), &mut rec).unwrap();
        assert!(rec.events.contains(&"<|svg |fill=red>".to_string()));
        assert!(rec.events.contains(&"text \"red &\"".to_string()));
    }

    #[test]
    fn entities_can_be_disabled() {
        let input = r#"<!DOCTYPE svg [ <!ENTITY fg "red"> ]><svg>&fg;</svg>"#;
        let mut rec = Recorder::default();
        drive(input, &Config::default().with_expand_entities(false), &mut rec).unwrap();
        assert!(rec.events.contains(&"text \"&fg;\"".to_string()));
    }

    #[test]
    fn entity_declaration_scan() {
        let decls = entity_declarations(r#"svg PUBLIC "x" "y" [ <!ENTITY a "1"> <!ENTITY b 'two'> <!ENTITY a "3"> ]"#);
        assert_eq!(decls.get("a").map(String::as_str), Some("1"));
        assert_eq!(decls.get("b").map(String::as_str), Some("two"));
    }

    #[test]
    fn malformed_xml_is_an_error() {
        let err = parse_str("<svg><g></svg>", &Config::default()).unwrap_err();
        assert!(matches!(err, ParseError::Xml { .. }), "{err}");
    }
}
