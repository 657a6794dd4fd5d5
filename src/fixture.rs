//! Test-only builder for synthetic class-file images.
//!
//! Depends on `std` alone so integration tests can pull it in with `#[path]`.
#![allow(dead_code)]

use std::collections::HashMap;

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ABSTRACT: u16 = 0x0400;

struct Member {
    access_flags: u16,
    name_index: u16,
    descriptor_index: u16,
    attributes: Vec<(u16, Vec<u8>)>,
}

pub struct ClassFileBuilder {
    entries: Vec<u8>,
    next_index: u16,
    utf8_indices: HashMap<String, u16>,
    class_indices: HashMap<String, u16>,
    major_version: u16,
    access_flags: u16,
    this_class: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    fields: Vec<Member>,
    methods: Vec<Member>,
    attributes: Vec<(u16, Vec<u8>)>,
}

impl ClassFileBuilder {
    /// Starts a class named in internal (slash-separated) form.
    pub fn new(internal_name: &str) -> Self {
        let mut builder = Self {
            entries: Vec::new(),
            next_index: 1,
            utf8_indices: HashMap::new(),
            class_indices: HashMap::new(),
            major_version: 52,
            access_flags: ACC_PUBLIC,
            this_class: 0,
            super_class: 0,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            attributes: Vec::new(),
        };
        builder.this_class = builder.class(internal_name);
        builder
    }

    pub fn utf8(&mut self, value: &str) -> u16 {
        if let Some(index) = self.utf8_indices.get(value) {
            return *index;
        }
        let index = self.push_entry(1);
        self.entries.extend_from_slice(&(value.len() as u16).to_be_bytes());
        self.entries.extend_from_slice(value.as_bytes());
        self.utf8_indices.insert(value.to_string(), index);
        index
    }

    pub fn class(&mut self, internal_name: &str) -> u16 {
        if let Some(index) = self.class_indices.get(internal_name) {
            return *index;
        }
        let name_index = self.utf8(internal_name);
        let index = self.push_entry(7);
        self.entries.extend_from_slice(&name_index.to_be_bytes());
        self.class_indices.insert(internal_name.to_string(), index);
        index
    }

    pub fn integer(&mut self, value: i32) -> u16 {
        let index = self.push_entry(3);
        self.entries.extend_from_slice(&value.to_be_bytes());
        index
    }

    /// Adds an eight-byte constant; the returned index is followed by a dead slot.
    pub fn long(&mut self, value: i64) -> u16 {
        let index = self.push_entry(5);
        self.entries.extend_from_slice(&value.to_be_bytes());
        self.next_index += 1;
        index
    }

    pub fn double(&mut self, value: f64) -> u16 {
        let index = self.push_entry(6);
        self.entries.extend_from_slice(&value.to_bits().to_be_bytes());
        self.next_index += 1;
        index
    }

    pub fn method_handle(&mut self, kind: u8, reference_index: u16) -> u16 {
        let index = self.push_entry(15);
        self.entries.push(kind);
        self.entries.extend_from_slice(&reference_index.to_be_bytes());
        index
    }

    /// Appends raw bytes as one pool slot, for building corrupt pools.
    pub fn raw_constant(&mut self, bytes: &[u8]) -> u16 {
        let index = self.next_index;
        self.next_index += 1;
        self.entries.extend_from_slice(bytes);
        index
    }

    pub fn major_version(mut self, version: u16) -> Self {
        self.major_version = version;
        self
    }

    pub fn access(mut self, flags: u16) -> Self {
        self.access_flags = flags;
        self
    }

    pub fn super_class(mut self, internal_name: &str) -> Self {
        self.super_class = self.class(internal_name);
        self
    }

    pub fn interface(mut self, internal_name: &str) -> Self {
        let index = self.class(internal_name);
        self.interfaces.push(index);
        self
    }

    /// Adds a class constant without using it anywhere else in the file.
    pub fn class_ref(mut self, internal_name: &str) -> Self {
        self.class(internal_name);
        self
    }

    pub fn field(self, name: &str, descriptor: &str) -> Self {
        self.field_with_annotations(name, descriptor, None)
    }

    pub fn field_with_annotations(
        mut self,
        name: &str,
        descriptor: &str,
        annotations: Option<Vec<u8>>,
    ) -> Self {
        let member = self.member(name, descriptor, annotations);
        self.fields.push(member);
        self
    }

    pub fn method(self, name: &str, descriptor: &str) -> Self {
        self.method_with_annotations(name, descriptor, None)
    }

    pub fn method_with_annotations(
        mut self,
        name: &str,
        descriptor: &str,
        annotations: Option<Vec<u8>>,
    ) -> Self {
        let member = self.member(name, descriptor, annotations);
        self.methods.push(member);
        self
    }

    pub fn source_file(mut self, file_name: &str) -> Self {
        let value_index = self.utf8(file_name);
        self.attribute("SourceFile", value_index.to_be_bytes().to_vec())
    }

    pub fn annotations(self, payload: Vec<u8>) -> Self {
        self.attribute("RuntimeVisibleAnnotations", payload)
    }

    pub fn attribute(mut self, name: &str, payload: Vec<u8>) -> Self {
        let name_index = self.utf8(name);
        self.attributes.push((name_index, payload));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&0xCAFE_BABEu32.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes());
        out.extend_from_slice(&self.major_version.to_be_bytes());
        out.extend_from_slice(&self.next_index.to_be_bytes());
        out.extend_from_slice(&self.entries);
        out.extend_from_slice(&self.access_flags.to_be_bytes());
        out.extend_from_slice(&self.this_class.to_be_bytes());
        out.extend_from_slice(&self.super_class.to_be_bytes());
        out.extend_from_slice(&(self.interfaces.len() as u16).to_be_bytes());
        for index in &self.interfaces {
            out.extend_from_slice(&index.to_be_bytes());
        }
        for members in [&self.fields, &self.methods] {
            out.extend_from_slice(&(members.len() as u16).to_be_bytes());
            for member in members.iter() {
                out.extend_from_slice(&member.access_flags.to_be_bytes());
                out.extend_from_slice(&member.name_index.to_be_bytes());
                out.extend_from_slice(&member.descriptor_index.to_be_bytes());
                write_attributes(&mut out, &member.attributes);
            }
        }
        write_attributes(&mut out, &self.attributes);
        out
    }

    fn member(&mut self, name: &str, descriptor: &str, annotations: Option<Vec<u8>>) -> Member {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        let mut attributes = Vec::new();
        if let Some(payload) = annotations {
            attributes.push((self.utf8("RuntimeVisibleAnnotations"), payload));
        }
        Member {
            access_flags: ACC_PUBLIC,
            name_index,
            descriptor_index,
            attributes,
        }
    }

    fn push_entry(&mut self, tag: u8) -> u16 {
        let index = self.next_index;
        self.next_index += 1;
        self.entries.push(tag);
        index
    }
}

fn write_attributes(out: &mut Vec<u8>, attributes: &[(u16, Vec<u8>)]) {
    out.extend_from_slice(&(attributes.len() as u16).to_be_bytes());
    for (name_index, payload) in attributes {
        out.extend_from_slice(&name_index.to_be_bytes());
        out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        out.extend_from_slice(payload);
    }
}

/// Byte-level writer for `RuntimeVisibleAnnotations` payloads.
#[derive(Default)]
pub struct AnnotationBytes {
    bytes: Vec<u8>,
}

impl AnnotationBytes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn u16(mut self, value: u16) -> Self {
        self.bytes.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn tag(mut self, tag: u8) -> Self {
        self.bytes.push(tag);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}
