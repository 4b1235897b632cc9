//! Project manifest load, query, update and save
//!
//! A manifest is kept as its original text plus the byte spans of the nodes
//! this crate cares about. Updates are recorded as span replacements and
//! spliced into the original text on save, so everything outside the touched
//! nodes is written back byte for byte.

use crate::version::{informational_version, raw_version};
use quick_xml::escape::{escape, partial_escape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

const BOM: char = '\u{feff}';

const VERSION_PATH: [&str; 3] = ["Project", "PropertyGroup", "Version"];
const INFORMATIONAL_VERSION_PATH: [&str; 3] = ["Project", "PropertyGroup", "InformationalVersion"];
const PACKAGE_REFERENCE_PATH: [&str; 3] = ["Project", "ItemGroup", "PackageReference"];

/// Errors that can occur while loading, updating or saving a manifest
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("'{}' is not valid UTF-8", path.display())]
    Encoding { path: PathBuf },

    #[error("XML error near byte {position}: {source}")]
    Xml {
        position: usize,
        source: quick_xml::Error,
    },

    #[error("Malformed project file: {0}")]
    Malformed(String),

    #[error("No <{0}> element to update")]
    MissingElement(&'static str),

    #[error("Package reference '{package}' has no {attribute} attribute")]
    MissingAttribute {
        package: String,
        attribute: &'static str,
    },
}

fn xml_error(position: usize, source: impl Into<quick_xml::Error>) -> ManifestError {
    ManifestError::Xml {
        position,
        source: source.into(),
    }
}

/// How a text node is laid out in the source
#[derive(Debug, Clone, PartialEq, Eq)]
enum Layout {
    /// Span covers the content between the start and end tags
    Content,
    /// Span covers a whole `<Name/>` tag that must be expanded when written
    SelfClosing { open_tag: String, name: String },
}

/// Text content of a manifest element such as `<Version>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextNode {
    value: String,
    span: Range<usize>,
    layout: Layout,
}

/// The project's `<Version>` element
pub type VersionNode = TextNode;

impl TextNode {
    /// Unescaped inner text of the element
    pub fn text(&self) -> &str {
        &self.value
    }

    fn render(&self, text: &str) -> String {
        let escaped = partial_escape(text);
        match &self.layout {
            Layout::Content => escaped.into_owned(),
            Layout::SelfClosing { open_tag, name } => {
                format!("<{}>{}</{}>", open_tag, escaped, name)
            }
        }
    }
}

/// A `<PackageReference>` item
#[derive(Debug, Clone)]
pub struct PackageReference {
    include: Option<String>,
    version: Option<String>,
    /// Source span of the `Version` attribute value, without its quotes
    version_span: Option<Range<usize>>,
}

impl PackageReference {
    /// Reads the item from its start tag, `raw` being the tag's source text
    /// starting at byte `offset`
    fn from_tag(tag: &BytesStart<'_>, raw: &str, offset: usize) -> Result<Self, ManifestError> {
        let mut include = None;
        let mut version = None;

        for attr in tag.attributes() {
            let attr = attr.map_err(|e| xml_error(offset, e))?;
            let value = || {
                attr.unescape_value()
                    .map(|v| v.into_owned())
                    .map_err(|e| xml_error(offset, e))
            };
            match attr.key.as_ref() {
                b"Include" => include = Some(value()?),
                b"Version" => version = Some(value()?),
                _ => {}
            }
        }

        let version_span = match version {
            Some(_) => {
                let span = attribute_value_span(raw, "Version").ok_or_else(|| {
                    ManifestError::Malformed(format!(
                        "cannot locate Version attribute of package reference at byte {}",
                        offset
                    ))
                })?;
                Some(offset + span.start..offset + span.end)
            }
            None => None,
        };

        Ok(Self {
            include,
            version,
            version_span,
        })
    }

    /// Package name from the `Include` attribute
    pub fn name(&self) -> Option<&str> {
        self.include.as_deref()
    }

    /// Pinned version from the `Version` attribute
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Case-sensitive prefix match on the package name
    pub fn matches_prefix(&self, prefix: &str) -> bool {
        self.include
            .as_deref()
            .is_some_and(|name| name.starts_with(prefix))
    }
}

/// Byte range of the value of attribute `key` inside the start tag `raw`,
/// excluding the delimiting quotes
///
/// `raw` must be a complete well-formed tag such as `<Name a="1" b='2' />`.
fn attribute_value_span(raw: &str, key: &str) -> Option<Range<usize>> {
    let bytes = raw.as_bytes();
    let is_space = |b: u8| b.is_ascii_whitespace();
    let mut i = 1;

    while i < bytes.len() && !is_space(bytes[i]) && bytes[i] != b'/' && bytes[i] != b'>' {
        i += 1;
    }

    loop {
        while i < bytes.len() && is_space(bytes[i]) {
            i += 1;
        }
        if i >= bytes.len() || bytes[i] == b'/' || bytes[i] == b'>' {
            return None;
        }

        let key_start = i;
        while i < bytes.len() && !is_space(bytes[i]) && bytes[i] != b'=' {
            i += 1;
        }
        let name = &raw[key_start..i];

        while i < bytes.len() && is_space(bytes[i]) {
            i += 1;
        }
        if bytes.get(i) != Some(&b'=') {
            return None;
        }
        i += 1;
        while i < bytes.len() && is_space(bytes[i]) {
            i += 1;
        }

        let quote = *bytes.get(i)?;
        if quote != b'"' && quote != b'\'' {
            return None;
        }
        let value_start = i + 1;
        let value_end = value_start + bytes[value_start..].iter().position(|&b| b == quote)?;

        if name == key {
            return Some(value_start..value_end);
        }
        i = value_end + 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Version,
    InformationalVersion,
}

/// Element whose text is being collected during parsing
struct OpenText {
    target: Target,
    depth: usize,
    content_start: usize,
    text: String,
}

/// Nodes located while parsing
#[derive(Default)]
struct Collected {
    version: Option<VersionNode>,
    informational_versions: Vec<TextNode>,
    package_references: Vec<PackageReference>,
}

impl Collected {
    fn store(&mut self, target: Target, node: TextNode) {
        match target {
            Target::Version => self.version = Some(node),
            Target::InformationalVersion => self.informational_versions.push(node),
        }
    }
}

/// An MSBuild project file held in memory
#[derive(Debug, Clone)]
pub struct ProjectManifest {
    bom: bool,
    source: String,
    version: Option<VersionNode>,
    informational_versions: Vec<TextNode>,
    package_references: Vec<PackageReference>,
    /// Pending replacements keyed by span start
    edits: BTreeMap<usize, (usize, String)>,
}

impl ProjectManifest {
    /// Reads and parses the manifest at `path`
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let bytes = fs::read(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let text = String::from_utf8(bytes).map_err(|_| ManifestError::Encoding {
            path: path.to_path_buf(),
        })?;

        tracing::debug!("loaded {}", path.display());
        Self::parse(&text)
    }

    /// Parses manifest text
    pub fn parse(text: &str) -> Result<Self, ManifestError> {
        let (bom, source) = match text.strip_prefix(BOM) {
            Some(rest) => (true, rest),
            None => (false, text),
        };

        let mut reader = Reader::from_str(source);
        let mut stack: Vec<String> = Vec::new();
        let mut open: Option<OpenText> = None;
        let mut seen_root = false;
        let mut found = Collected::default();

        loop {
            let start = reader.buffer_position() as usize;
            let event = reader.read_event().map_err(|e| xml_error(start, e))?;
            let end = reader.buffer_position() as usize;

            if stack.is_empty() && matches!(event, Event::Start(_) | Event::Empty(_)) {
                if seen_root {
                    return Err(ManifestError::Malformed(
                        "multiple root elements".to_string(),
                    ));
                }
                seen_root = true;
            }

            match event {
                Event::Start(e) => {
                    stack.push(element_name(&e));

                    if open.is_none()
                        && let Some(target) = text_target(&stack, found.version.is_some())
                    {
                        open = Some(OpenText {
                            target,
                            depth: stack.len(),
                            content_start: end,
                            text: String::new(),
                        });
                    }

                    if stack == PACKAGE_REFERENCE_PATH {
                        found
                            .package_references
                            .push(PackageReference::from_tag(&e, &source[start..end], start)?);
                    }
                }
                Event::Empty(e) => {
                    let name = element_name(&e);
                    stack.push(name.clone());

                    if open.is_none()
                        && let Some(target) = text_target(&stack, found.version.is_some())
                    {
                        let open_tag = String::from_utf8_lossy(&e).trim_end().to_string();
                        found.store(
                            target,
                            TextNode {
                                value: String::new(),
                                span: start..end,
                                layout: Layout::SelfClosing { open_tag, name },
                            },
                        );
                    }

                    if stack == PACKAGE_REFERENCE_PATH {
                        found
                            .package_references
                            .push(PackageReference::from_tag(&e, &source[start..end], start)?);
                    }

                    stack.pop();
                }
                Event::End(_) => {
                    if open.as_ref().is_some_and(|o| o.depth == stack.len())
                        && let Some(done) = open.take()
                    {
                        found.store(
                            done.target,
                            TextNode {
                                value: done.text,
                                span: done.content_start..start,
                                layout: Layout::Content,
                            },
                        );
                    }
                    stack.pop();
                }
                Event::Text(e) => {
                    if stack.is_empty() && !e.iter().all(u8::is_ascii_whitespace) {
                        return Err(ManifestError::Malformed(format!(
                            "text outside the root element at byte {}",
                            start
                        )));
                    }
                    if let Some(current) = open.as_mut() {
                        let text = e.unescape().map_err(|err| xml_error(start, err))?;
                        current.text.push_str(&text);
                    }
                }
                Event::CData(e) => {
                    if let Some(current) = open.as_mut() {
                        current.text.push_str(&String::from_utf8_lossy(&e));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(unclosed) = stack.last() {
            return Err(ManifestError::Malformed(format!(
                "unexpected end of file, <{}> is not closed",
                unclosed
            )));
        }

        if !seen_root {
            return Err(ManifestError::Malformed(
                "Root element is missing.".to_string(),
            ));
        }

        Ok(Self {
            bom,
            source: source.to_string(),
            version: found.version,
            informational_versions: found.informational_versions,
            package_references: found.package_references,
            edits: BTreeMap::new(),
        })
    }

    /// The first `Project/PropertyGroup/Version` element, if any
    pub fn version_node(&self) -> Option<&VersionNode> {
        self.version.as_ref()
    }

    /// Values of every `Project/PropertyGroup/InformationalVersion` element
    pub fn informational_versions(&self) -> impl Iterator<Item = &str> {
        self.informational_versions.iter().map(TextNode::text)
    }

    /// Every `Project/ItemGroup/PackageReference` item in document order
    pub fn package_references(&self) -> &[PackageReference] {
        &self.package_references
    }

    /// Sets the project version and the fields that follow it
    ///
    /// - `Version` becomes `version`
    /// - each `InformationalVersion` keeps any text after its first space
    /// - each package reference named with `package_prefix` gets the raw
    ///   version (pre-release suffix removed)
    ///
    /// A matching package reference without a `Version` attribute fails the
    /// whole update and nothing is changed.
    pub fn write_version(&mut self, version: &str, package_prefix: &str) -> Result<(), ManifestError> {
        if self.version.is_none() {
            return Err(ManifestError::MissingElement("Version"));
        }

        let raw = raw_version(version);
        let mut reference_edits = Vec::new();

        for (index, reference) in self.package_references.iter().enumerate() {
            if !reference.matches_prefix(package_prefix) {
                continue;
            }
            match &reference.version_span {
                Some(span) => reference_edits.push((index, span.clone())),
                None => {
                    return Err(ManifestError::MissingAttribute {
                        package: reference.include.clone().unwrap_or_default(),
                        attribute: "Version",
                    });
                }
            }
        }

        if let Some(node) = self.version.as_mut() {
            replace_text(node, version.to_string(), &mut self.edits);
        }

        for node in &mut self.informational_versions {
            let updated = informational_version(&node.value, version);
            replace_text(node, updated, &mut self.edits);
        }

        let updated_references = reference_edits.len();
        let escaped = escape(raw).into_owned();
        for (index, span) in reference_edits {
            self.package_references[index].version = Some(raw.to_string());
            self.edits.insert(span.start, (span.end, escaped.clone()));
        }

        tracing::debug!(
            "set version {} ({} informational, {} package reference(s))",
            version,
            self.informational_versions.len(),
            updated_references
        );
        Ok(())
    }

    /// Serializes the manifest, applying pending updates
    pub fn to_xml(&self) -> String {
        let mut out = String::with_capacity(self.source.len() + 64);
        if self.bom {
            out.push(BOM);
        }

        let mut cursor = 0;
        for (&start, (end, replacement)) in &self.edits {
            out.push_str(&self.source[cursor..start]);
            out.push_str(replacement);
            cursor = *end;
        }
        out.push_str(&self.source[cursor..]);
        out
    }

    /// Writes the manifest to `path`, replacing the file atomically
    pub fn save(&self, path: &Path) -> Result<(), ManifestError> {
        let io_error = |source: std::io::Error| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp = NamedTempFile::new_in(dir).map_err(io_error)?;
        temp.write_all(self.to_xml().as_bytes()).map_err(io_error)?;
        temp.as_file().sync_all().map_err(io_error)?;

        if let Ok(metadata) = fs::metadata(path) {
            temp.as_file()
                .set_permissions(metadata.permissions())
                .map_err(io_error)?;
        }

        temp.persist(path).map_err(|e| io_error(e.error))?;
        tracing::debug!("saved {}", path.display());
        Ok(())
    }
}

fn replace_text(node: &mut TextNode, text: String, edits: &mut BTreeMap<usize, (usize, String)>) {
    edits.insert(node.span.start, (node.span.end, node.render(&text)));
    node.value = text;
}

fn element_name(tag: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(tag.name().as_ref()).into_owned()
}

fn text_target(stack: &[String], have_version: bool) -> Option<Target> {
    if !have_version && stack == VERSION_PATH {
        Some(Target::Version)
    } else if stack == INFORMATIONAL_VERSION_PATH {
        Some(Target::InformationalVersion)
    } else {
        None
    }
}
