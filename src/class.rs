use serde::Serialize;
use std::collections::BTreeSet;

pub const DEFAULT_PACKAGE: &str = "Default";
pub const UNKNOWN_SOURCE: &str = "Unknown";

/// What the decoder knows about one class. Never mutated once built; the
/// `with_*` methods hand back a modified copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedClass {
    minor_version: u16,
    major_version: u16,
    name: String,
    package: String,
    source_file: Option<String>,
    origin: Option<String>,
    is_abstract: bool,
    is_interface: bool,
    references: BTreeSet<String>,
}

impl DecodedClass {
    pub fn builder(name: impl Into<String>) -> DecodedClassBuilder {
        DecodedClassBuilder::new(name)
    }

    /// Stand-in for a class that is referenced but whose bytes were never decoded.
    pub fn placeholder(name: impl Into<String>) -> Self {
        DecodedClassBuilder::new(name)
            .source_file(UNKNOWN_SOURCE)
            .build()
    }

    pub fn minor_version(&self) -> u16 {
        self.minor_version
    }

    pub fn major_version(&self) -> u16 {
        self.major_version
    }

    /// Dotted class name, e.g. `com.acme.Foo$Bar`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn source_file(&self) -> Option<&str> {
        self.source_file.as_deref()
    }

    /// File name of the archive the class was read from.
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    pub fn is_interface(&self) -> bool {
        self.is_interface
    }

    /// Dotted names this class refers to; never contains the class itself.
    pub fn references(&self) -> &BTreeSet<String> {
        &self.references
    }

    pub fn is_placeholder(&self) -> bool {
        self.major_version == 0
            && self.origin.is_none()
            && self.source_file.as_deref() == Some(UNKNOWN_SOURCE)
    }

    pub fn with_origin(&self, origin: impl Into<String>) -> Self {
        Self {
            origin: Some(origin.into()),
            ..self.clone()
        }
    }

    pub fn with_references<I, S>(&self, references: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            references: own_references(&self.name, references),
            ..self.clone()
        }
    }
}

/// Package part of a dotted class name: everything before the last `.`.
pub fn package_of(class_name: &str) -> &str {
    match class_name.rfind('.') {
        Some(pos) => &class_name[..pos],
        None => DEFAULT_PACKAGE,
    }
}

fn own_references<I, S>(name: &str, references: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    references
        .into_iter()
        .map(Into::into)
        .filter(|r| r != name)
        .collect()
}

#[derive(Debug, Clone)]
pub struct DecodedClassBuilder {
    minor_version: u16,
    major_version: u16,
    name: String,
    source_file: Option<String>,
    origin: Option<String>,
    is_abstract: bool,
    is_interface: bool,
    references: Vec<String>,
}

impl DecodedClassBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            minor_version: 0,
            major_version: 0,
            name: name.into(),
            source_file: None,
            origin: None,
            is_abstract: false,
            is_interface: false,
            references: Vec::new(),
        }
    }

    pub fn version(mut self, minor: u16, major: u16) -> Self {
        self.minor_version = minor;
        self.major_version = major;
        self
    }

    pub fn source_file(mut self, source_file: impl Into<String>) -> Self {
        self.source_file = Some(source_file.into());
        self
    }

    pub fn maybe_source_file(mut self, source_file: Option<String>) -> Self {
        self.source_file = source_file;
        self
    }

    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn maybe_origin(mut self, origin: Option<String>) -> Self {
        self.origin = origin;
        self
    }

    pub fn is_abstract(mut self, value: bool) -> Self {
        self.is_abstract = value;
        self
    }

    pub fn is_interface(mut self, value: bool) -> Self {
        self.is_interface = value;
        self
    }

    pub fn reference(mut self, name: impl Into<String>) -> Self {
        self.references.push(name.into());
        self
    }

    pub fn references<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.references.extend(names.into_iter().map(Into::into));
        self
    }

    /// Self-references are dropped here so no caller has to remember to.
    pub fn build(self) -> DecodedClass {
        let package = package_of(&self.name).to_string();
        let references = own_references(&self.name, self.references);
        DecodedClass {
            minor_version: self.minor_version,
            major_version: self.major_version,
            name: self.name,
            package,
            source_file: self.source_file,
            origin: self.origin,
            is_abstract: self.is_abstract,
            is_interface: self.is_interface,
            references,
        }
    }
}
