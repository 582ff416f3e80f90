use std::collections::HashMap;

use quick_xml::{NsReader, events::BytesStart, events::Event};

use crate::error::EpubError;

/// Provides functionality to decode byte data into strings
///
/// This trait is used to decode raw byte data (such as chapter documents or
/// the package document read from an EPUB container) into a string. It
/// supports UTF-8 with or without a BOM, plus UTF-16 BE and UTF-16 LE when a
/// BOM is present.
///
/// ## Notes
/// - Decoding is strict: byte data that is not valid text in a recognized
///   encoding produces an error rather than replacement characters. The
///   chapter extractor relies on this to skip undecodable entries.
pub trait DecodeBytes {
    fn decode(&self) -> Result<String, EpubError>;
}

impl DecodeBytes for [u8] {
    fn decode(&self) -> Result<String, EpubError> {
        if self.is_empty() {
            return Err(EpubError::EmptyDataError);
        }

        match self {
            // UTF-8 BOM (0xEF, 0xBB, 0xBF)
            [0xEF, 0xBB, 0xBF, rest @ ..] => {
                String::from_utf8(rest.to_vec()).map_err(EpubError::from)
            }

            // UTF-16 BE BOM (0xFE, 0xFF)
            [0xFE, 0xFF, rest @ ..] => {
                let utf16_units: Vec<u16> = rest
                    .chunks_exact(2)
                    .map(|b| u16::from_be_bytes([b[0], b[1]]))
                    .collect();

                String::from_utf16(&utf16_units).map_err(EpubError::from)
            }

            // UTF-16 LE BOM (0xFF, 0xFE)
            [0xFF, 0xFE, rest @ ..] => {
                let utf16_units: Vec<u16> = rest
                    .chunks_exact(2)
                    .map(|b| u16::from_le_bytes([b[0], b[1]]))
                    .collect();

                String::from_utf16(&utf16_units).map_err(EpubError::from)
            }

            // No BOM: require valid UTF-8
            _ => String::from_utf8(self.to_vec()).map_err(EpubError::from),
        }
    }
}

/// Provides functionality for normalizing whitespace characters
///
/// This trait normalizes sequences of whitespace characters (spaces, tabs,
/// newlines, etc.) in a string into a single space and removes leading and
/// trailing whitespace. Used on metadata values and chapter titles.
pub trait NormalizeWhitespace {
    fn normalize_whitespace(&self) -> String;
}

impl NormalizeWhitespace for &str {
    fn normalize_whitespace(&self) -> String {
        self.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

impl NormalizeWhitespace for String {
    fn normalize_whitespace(&self) -> String {
        self.as_str().normalize_whitespace()
    }
}

/// Represents an element node in an XML document
#[derive(Debug)]
pub struct XmlElement {
    /// The local name of the element (excluding namespace prefix)
    pub name: String,

    /// The namespace prefix of the element
    pub prefix: Option<String>,

    /// The namespace bound to the element's prefix, if declared
    pub namespace: Option<String>,

    /// The attributes of the element
    ///
    /// The key is the attribute name, the value is the attribute value.
    /// Namespace declaration attributes (`xmlns`, `xmlns:*`) are consumed
    /// by the reader and do not appear here.
    pub attributes: HashMap<String, String>,

    /// The direct text content of the element
    pub text: Option<String>,

    /// The children of the element
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    fn new(name: String) -> Self {
        Self {
            name,
            prefix: None,
            namespace: None,
            attributes: HashMap::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Gets the text content of the element and all its child elements
    ///
    /// Collects the text content of the current element and of all its child
    /// elements, removing leading and trailing whitespace.
    pub fn text(&self) -> String {
        let mut result = String::new();

        if let Some(text_value) = &self.text {
            result.push_str(text_value);
        }

        for child in &self.children {
            result.push_str(&child.text());
        }

        result.trim().to_string()
    }

    /// Returns the value of the specified attribute
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Find all descendant elements (including self) with the specified local name
    ///
    /// Elements are yielded in document order.
    pub fn find_elements_by_name<'a>(
        &'a self,
        name: &str,
    ) -> impl Iterator<Item = &'a XmlElement> + use<'a> {
        let mut matches = Vec::new();
        self.collect_by_name(name, &mut matches);
        matches.into_iter()
    }

    fn collect_by_name<'a>(&'a self, name: &str, matches: &mut Vec<&'a XmlElement>) {
        if self.name == name {
            matches.push(self);
        }
        for child in &self.children {
            child.collect_by_name(name, matches);
        }
    }

    /// Find all direct children with the specified local name
    pub fn find_children_by_name(&self, name: &str) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter(move |child| child.name == name)
    }
}

/// XML parser used to parse XML content and build an XML element tree
///
/// This is a small, tolerant tree builder over `quick_xml`'s pull parser.
/// It records namespace prefix bindings declared via `xmlns` attributes so
/// that namespaced elements (such as the Dublin Core metadata elements in a
/// package document) can be recognized by their resolved namespace.
pub struct XmlReader {}

impl XmlReader {
    /// Parses an XML string and builds the root element
    ///
    /// ## Parameters
    /// - `content`: The XML string to be parsed
    ///
    /// ## Return
    /// - `Ok(XmlElement)`: The root element of the XML element tree
    /// - `Err(EpubError)`: An error occurred during parsing
    pub fn parse(content: &str) -> Result<XmlElement, EpubError> {
        if content.is_empty() {
            return Err(EpubError::EmptyDataError);
        }

        let mut reader = NsReader::from_str(content);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut stack = Vec::<XmlElement>::new();
        let mut root = None;
        let mut namespace_map = HashMap::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Eof) => break,

                Ok(Event::Start(e)) => {
                    let element = Self::build_element(&e, &mut namespace_map);
                    stack.push(element);
                }

                Ok(Event::End(_)) => {
                    if let Some(element) = stack.pop() {
                        if stack.is_empty() {
                            // The stack is empty, so the closed element
                            // is the root element
                            root = Some(element);
                        } else if let Some(parent) = stack.last_mut() {
                            parent.children.push(element);
                        }
                    }
                }

                Ok(Event::Empty(e)) => {
                    let element = Self::build_element(&e, &mut namespace_map);

                    // A self-closing element cannot be the root of a
                    // well-formed document that interests us
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(element);
                    } else {
                        root = Some(element);
                    }
                }

                Ok(Event::Text(e)) => {
                    if let Some(element) = stack.last_mut() {
                        let text = String::from_utf8_lossy(e.as_ref()).to_string();
                        if !text.trim().is_empty() {
                            element.text = Some(text);
                        }
                    }
                }

                Err(err) => return Err(err.into()),

                // Ignore comments, processing instructions, declarations,
                // doctypes and CDATA
                _ => continue,
            }
        }

        if let Some(element) = root.as_mut() {
            Self::assign_namespace(element, &namespace_map);
        }

        root.ok_or(EpubError::FailedParsingXml)
    }

    /// Builds an element from a start or self-closing tag event
    ///
    /// Namespace declaration attributes are recorded into `namespace_map`
    /// instead of being stored on the element.
    fn build_element(
        event: &BytesStart,
        namespace_map: &mut HashMap<String, String>,
    ) -> XmlElement {
        let name = String::from_utf8_lossy(event.local_name().as_ref()).to_string();
        let mut element = XmlElement::new(name);

        if let Some(prefix) = event.name().prefix() {
            element.prefix = Some(String::from_utf8_lossy(prefix.as_ref()).to_string());
        }

        for attr in event.attributes().flatten() {
            let attr_key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
            let attr_value = String::from_utf8_lossy(&attr.value).to_string();

            if let Some(bound) = attr_key.strip_prefix("xmlns") {
                let prefix = bound.strip_prefix(':').unwrap_or("xmlns");
                namespace_map.insert(prefix.to_string(), attr_value);
                continue;
            }

            element.attributes.insert(attr_key, attr_value);
        }

        element
    }

    /// Assign resolved namespaces to elements recursively
    fn assign_namespace(element: &mut XmlElement, namespace_map: &HashMap<String, String>) {
        let key = element.prefix.as_deref().unwrap_or("xmlns");
        if let Some(namespace) = namespace_map.get(key) {
            element.namespace = Some(namespace.clone());
        }

        for child in element.children.iter_mut() {
            Self::assign_namespace(child, namespace_map);
        }
    }
}
