//! A tiny class file assembler for tests.
//!
//! It writes just enough of the format to exercise the parser and the decompiler: a constant
//! pool with deduplicated entries, the class header, fields, methods and a selection of
//! attributes. Methods never get a `Code` attribute unless one is added as [`Attr::Raw`].

use std::collections::HashMap;

use byteorder::{BigEndian, WriteBytesExt};

pub mod acc {
    pub const PUBLIC: u16 = 0x0001;
    pub const PRIVATE: u16 = 0x0002;
    pub const PROTECTED: u16 = 0x0004;
    pub const STATIC: u16 = 0x0008;
    pub const FINAL: u16 = 0x0010;
    pub const SUPER: u16 = 0x0020;
    pub const VOLATILE: u16 = 0x0040;
    pub const NATIVE: u16 = 0x0100;
    pub const INTERFACE: u16 = 0x0200;
    pub const ABSTRACT: u16 = 0x0400;
    pub const SYNTHETIC: u16 = 0x1000;
    pub const ANNOTATION: u16 = 0x2000;
    pub const ENUM: u16 = 0x4000;
}

pub const JAVA_17: u16 = 61;

#[derive(Debug, Clone)]
pub struct ClassBuilder {
    name: String,
    access: u16,
    super_name: Option<String>,
    interfaces: Vec<String>,
    fields: Vec<Member>,
    methods: Vec<Member>,
    attributes: Vec<Attr>,
}

impl ClassBuilder {
    /// A public class extending `java/lang/Object`. `name` is in internal form.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            access: acc::PUBLIC | acc::SUPER,
            super_name: Some("java/lang/Object".to_owned()),
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            attributes: Vec::new(),
        }
    }

    pub fn access(mut self, access: u16) -> Self {
        self.access = access;
        self
    }

    pub fn super_class(mut self, super_name: Option<&str>) -> Self {
        self.super_name = super_name.map(str::to_owned);
        self
    }

    pub fn interface(mut self, name: &str) -> Self {
        self.interfaces.push(name.to_owned());
        self
    }

    pub fn field(mut self, field: Member) -> Self {
        self.fields.push(field);
        self
    }

    pub fn method(mut self, method: Member) -> Self {
        self.methods.push(method);
        self
    }

    pub fn attr(mut self, attr: Attr) -> Self {
        self.attributes.push(attr);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut pool = Pool::default();
        let mut body = Vec::new();

        put_u16(&mut body, self.access);
        let this_class = pool.class(&self.name);
        put_u16(&mut body, this_class);
        let super_class = match &self.super_name {
            Some(name) => pool.class(name),
            None => 0,
        };
        put_u16(&mut body, super_class);

        put_u16(&mut body, self.interfaces.len() as u16);
        for interface in &self.interfaces {
            let index = pool.class(interface);
            put_u16(&mut body, index);
        }

        for members in [&self.fields, &self.methods] {
            put_u16(&mut body, members.len() as u16);
            for member in members {
                member.write(&mut pool, &mut body);
            }
        }

        write_attributes(&mut pool, &mut body, &self.attributes);

        let mut out = Vec::with_capacity(body.len() + pool.bytes.len() + 10);
        put_u32(&mut out, 0xCAFEBABE);
        put_u16(&mut out, 0);
        put_u16(&mut out, JAVA_17);
        put_u16(&mut out, pool.next);
        out.extend_from_slice(&pool.bytes);
        out.extend_from_slice(&body);
        out
    }
}

#[derive(Debug, Clone)]
pub struct Member {
    access: u16,
    name: String,
    descriptor: String,
    attributes: Vec<Attr>,
}

impl Member {
    pub fn new(access: u16, name: &str, descriptor: &str) -> Self {
        Self {
            access,
            name: name.to_owned(),
            descriptor: descriptor.to_owned(),
            attributes: Vec::new(),
        }
    }

    pub fn attr(mut self, attr: Attr) -> Self {
        self.attributes.push(attr);
        self
    }

    fn write(&self, pool: &mut Pool, out: &mut Vec<u8>) {
        put_u16(out, self.access);
        let name = pool.utf8(&self.name);
        put_u16(out, name);
        let descriptor = pool.utf8(&self.descriptor);
        put_u16(out, descriptor);
        write_attributes(pool, out, &self.attributes);
    }
}

#[derive(Debug, Clone)]
pub enum Attr {
    Signature(String),
    Exceptions(Vec<String>),
    ConstantInt(i32),
    ConstantLong(i64),
    ConstantFloat(f32),
    ConstantDouble(f64),
    ConstantString(String),
    /// A ConstantValue pointing at a CONSTANT_Class_info, which no field may legally carry.
    ConstantClass(String),
    VisibleAnnotations(Vec<Ann>),
    InvisibleAnnotations(Vec<Ann>),
    VisibleParameterAnnotations(Vec<Vec<Ann>>),
    InvisibleParameterAnnotations(Vec<Vec<Ann>>),
    VisibleTypeAnnotations(Vec<TypeAnn>),
    InvisibleTypeAnnotations(Vec<TypeAnn>),
    AnnotationDefault(Value),
    MethodParameters(Vec<(Option<String>, u16)>),
    InnerClasses(Vec<InnerClassEntry>),
    PermittedSubclasses(Vec<String>),
    Record(Vec<Component>),
    Raw { name: String, bytes: Vec<u8> },
}

#[derive(Debug, Clone)]
pub struct Ann {
    pub descriptor: String,
    pub members: Vec<(String, Value)>,
}

impl Ann {
    pub fn new(descriptor: &str) -> Self {
        Self {
            descriptor: descriptor.to_owned(),
            members: Vec::new(),
        }
    }

    pub fn with(mut self, name: &str, value: Value) -> Self {
        self.members.push((name.to_owned(), value));
        self
    }
}

#[derive(Debug, Clone)]
pub struct TypeAnn {
    pub target_type: u8,
    pub target_info: Vec<u8>,
    pub type_path: Vec<(u8, u8)>,
    pub annotation: Ann,
}

impl TypeAnn {
    /// A type annotation on the type of a field or record component (empty_target).
    pub fn field(annotation: Ann) -> Self {
        Self {
            target_type: 0x13,
            target_info: Vec::new(),
            type_path: Vec::new(),
            annotation,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Value {
    Boolean(bool),
    Byte(i8),
    Char(u16),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Enum(String, String),
    Class(String),
    Annotation(Ann),
    Array(Vec<Value>),
    /// An arbitrary tag followed by a constant pool index.
    Tagged(u8, u16),
    /// An arbitrary tag with nothing after it.
    Bare(u8),
}

#[derive(Debug, Clone)]
pub struct InnerClassEntry {
    pub inner: String,
    pub outer: Option<String>,
    pub simple_name: Option<String>,
    pub access: u16,
}

impl InnerClassEntry {
    pub fn new(inner: &str, outer: &str, simple_name: &str, access: u16) -> Self {
        Self {
            inner: inner.to_owned(),
            outer: Some(outer.to_owned()),
            simple_name: Some(simple_name.to_owned()),
            access,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Component {
    pub name: String,
    pub descriptor: String,
    pub attributes: Vec<Attr>,
}

impl Component {
    pub fn new(name: &str, descriptor: &str) -> Self {
        Self {
            name: name.to_owned(),
            descriptor: descriptor.to_owned(),
            attributes: Vec::new(),
        }
    }

    pub fn attr(mut self, attr: Attr) -> Self {
        self.attributes.push(attr);
        self
    }
}

fn write_attributes(pool: &mut Pool, out: &mut Vec<u8>, attributes: &[Attr]) {
    put_u16(out, attributes.len() as u16);
    for attr in attributes {
        write_attribute(pool, out, attr);
    }
}

fn write_attribute(pool: &mut Pool, out: &mut Vec<u8>, attr: &Attr) {
    let mut info = Vec::new();
    let name = match attr {
        Attr::Signature(signature) => {
            put_u16(&mut info, pool.utf8(signature));
            "Signature"
        }
        Attr::Exceptions(names) => {
            write_class_list(pool, &mut info, names);
            "Exceptions"
        }
        Attr::ConstantInt(v) => {
            put_u16(&mut info, pool.integer(*v));
            "ConstantValue"
        }
        Attr::ConstantLong(v) => {
            put_u16(&mut info, pool.long(*v));
            "ConstantValue"
        }
        Attr::ConstantFloat(v) => {
            put_u16(&mut info, pool.float(*v));
            "ConstantValue"
        }
        Attr::ConstantDouble(v) => {
            put_u16(&mut info, pool.double(*v));
            "ConstantValue"
        }
        Attr::ConstantString(v) => {
            put_u16(&mut info, pool.string(v));
            "ConstantValue"
        }
        Attr::ConstantClass(v) => {
            put_u16(&mut info, pool.class(v));
            "ConstantValue"
        }
        Attr::VisibleAnnotations(annotations) => {
            write_annotations(pool, &mut info, annotations);
            "RuntimeVisibleAnnotations"
        }
        Attr::InvisibleAnnotations(annotations) => {
            write_annotations(pool, &mut info, annotations);
            "RuntimeInvisibleAnnotations"
        }
        Attr::VisibleParameterAnnotations(parameters) => {
            write_parameter_annotations(pool, &mut info, parameters);
            "RuntimeVisibleParameterAnnotations"
        }
        Attr::InvisibleParameterAnnotations(parameters) => {
            write_parameter_annotations(pool, &mut info, parameters);
            "RuntimeInvisibleParameterAnnotations"
        }
        Attr::VisibleTypeAnnotations(annotations) => {
            write_type_annotations(pool, &mut info, annotations);
            "RuntimeVisibleTypeAnnotations"
        }
        Attr::InvisibleTypeAnnotations(annotations) => {
            write_type_annotations(pool, &mut info, annotations);
            "RuntimeInvisibleTypeAnnotations"
        }
        Attr::AnnotationDefault(value) => {
            write_value(pool, &mut info, value);
            "AnnotationDefault"
        }
        Attr::MethodParameters(parameters) => {
            info.push(parameters.len() as u8);
            for (name, access) in parameters {
                let index = match name {
                    Some(name) => pool.utf8(name),
                    None => 0,
                };
                put_u16(&mut info, index);
                put_u16(&mut info, *access);
            }
            "MethodParameters"
        }
        Attr::InnerClasses(entries) => {
            put_u16(&mut info, entries.len() as u16);
            for entry in entries {
                let inner = pool.class(&entry.inner);
                put_u16(&mut info, inner);
                let outer = match &entry.outer {
                    Some(outer) => pool.class(outer),
                    None => 0,
                };
                put_u16(&mut info, outer);
                let simple_name = match &entry.simple_name {
                    Some(simple_name) => pool.utf8(simple_name),
                    None => 0,
                };
                put_u16(&mut info, simple_name);
                put_u16(&mut info, entry.access);
            }
            "InnerClasses"
        }
        Attr::PermittedSubclasses(names) => {
            write_class_list(pool, &mut info, names);
            "PermittedSubclasses"
        }
        Attr::Record(components) => {
            put_u16(&mut info, components.len() as u16);
            for component in components {
                let name = pool.utf8(&component.name);
                put_u16(&mut info, name);
                let descriptor = pool.utf8(&component.descriptor);
                put_u16(&mut info, descriptor);
                write_attributes(pool, &mut info, &component.attributes);
            }
            "Record"
        }
        Attr::Raw { name, bytes } => {
            info.extend_from_slice(bytes);
            name.as_str()
        }
    };

    let name_index = pool.utf8(name);
    put_u16(out, name_index);
    put_u32(out, info.len() as u32);
    out.extend_from_slice(&info);
}

fn write_class_list(pool: &mut Pool, out: &mut Vec<u8>, names: &[String]) {
    put_u16(out, names.len() as u16);
    for name in names {
        let index = pool.class(name);
        put_u16(out, index);
    }
}

fn write_annotations(pool: &mut Pool, out: &mut Vec<u8>, annotations: &[Ann]) {
    put_u16(out, annotations.len() as u16);
    for annotation in annotations {
        write_annotation(pool, out, annotation);
    }
}

fn write_parameter_annotations(pool: &mut Pool, out: &mut Vec<u8>, parameters: &[Vec<Ann>]) {
    out.push(parameters.len() as u8);
    for annotations in parameters {
        write_annotations(pool, out, annotations);
    }
}

fn write_type_annotations(pool: &mut Pool, out: &mut Vec<u8>, annotations: &[TypeAnn]) {
    put_u16(out, annotations.len() as u16);
    for annotation in annotations {
        out.push(annotation.target_type);
        out.extend_from_slice(&annotation.target_info);
        out.push(annotation.type_path.len() as u8);
        for (kind, index) in &annotation.type_path {
            out.push(*kind);
            out.push(*index);
        }
        write_annotation(pool, out, &annotation.annotation);
    }
}

fn write_annotation(pool: &mut Pool, out: &mut Vec<u8>, annotation: &Ann) {
    let type_index = pool.utf8(&annotation.descriptor);
    put_u16(out, type_index);
    put_u16(out, annotation.members.len() as u16);
    for (name, value) in &annotation.members {
        let name_index = pool.utf8(name);
        put_u16(out, name_index);
        write_value(pool, out, value);
    }
}

fn write_value(pool: &mut Pool, out: &mut Vec<u8>, value: &Value) {
    let (tag, index) = match value {
        Value::Boolean(v) => (b'Z', pool.integer(*v as i32)),
        Value::Byte(v) => (b'B', pool.integer(*v as i32)),
        Value::Char(v) => (b'C', pool.integer(*v as i32)),
        Value::Short(v) => (b'S', pool.integer(*v as i32)),
        Value::Int(v) => (b'I', pool.integer(*v)),
        Value::Long(v) => (b'J', pool.long(*v)),
        Value::Float(v) => (b'F', pool.float(*v)),
        Value::Double(v) => (b'D', pool.double(*v)),
        Value::String(v) => (b's', pool.utf8(v)),
        Value::Class(descriptor) => (b'c', pool.utf8(descriptor)),
        Value::Tagged(tag, index) => (*tag, *index),
        Value::Bare(tag) => {
            out.push(*tag);
            return;
        }
        Value::Enum(descriptor, constant) => {
            out.push(b'e');
            let descriptor = pool.utf8(descriptor);
            put_u16(out, descriptor);
            let constant = pool.utf8(constant);
            put_u16(out, constant);
            return;
        }
        Value::Annotation(annotation) => {
            out.push(b'@');
            write_annotation(pool, out, annotation);
            return;
        }
        Value::Array(values) => {
            out.push(b'[');
            put_u16(out, values.len() as u16);
            for value in values {
                write_value(pool, out, value);
            }
            return;
        }
    };
    out.push(tag);
    put_u16(out, index);
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Key {
    Utf8(String),
    Class(String),
    String(String),
    Integer(i32),
    Long(i64),
    Float(u32),
    Double(u64),
}

#[derive(Debug)]
struct Pool {
    bytes: Vec<u8>,
    next: u16,
    entries: HashMap<Key, u16>,
}

impl Default for Pool {
    fn default() -> Self {
        Self {
            bytes: Vec::new(),
            next: 1,
            entries: HashMap::new(),
        }
    }
}

impl Pool {
    fn utf8(&mut self, s: &str) -> u16 {
        self.intern(Key::Utf8(s.to_owned()))
    }

    fn class(&mut self, internal_name: &str) -> u16 {
        self.intern(Key::Class(internal_name.to_owned()))
    }

    fn string(&mut self, s: &str) -> u16 {
        self.intern(Key::String(s.to_owned()))
    }

    fn integer(&mut self, v: i32) -> u16 {
        self.intern(Key::Integer(v))
    }

    fn long(&mut self, v: i64) -> u16 {
        self.intern(Key::Long(v))
    }

    fn float(&mut self, v: f32) -> u16 {
        self.intern(Key::Float(v.to_bits()))
    }

    fn double(&mut self, v: f64) -> u16 {
        self.intern(Key::Double(v.to_bits()))
    }

    fn intern(&mut self, key: Key) -> u16 {
        if let Some(index) = self.entries.get(&key) {
            return *index;
        }

        // Entries referring to other entries must have those written first.
        let mut entry = Vec::new();
        let mut slots = 1;
        match &key {
            Key::Utf8(s) => {
                entry.push(1);
                put_u16(&mut entry, s.len() as u16);
                entry.extend_from_slice(s.as_bytes());
            }
            Key::Class(name) => {
                let name_index = self.utf8(name);
                entry.push(7);
                put_u16(&mut entry, name_index);
            }
            Key::String(s) => {
                let string_index = self.utf8(s);
                entry.push(8);
                put_u16(&mut entry, string_index);
            }
            Key::Integer(v) => {
                entry.push(3);
                put_u32(&mut entry, *v as u32);
            }
            Key::Float(bits) => {
                entry.push(4);
                put_u32(&mut entry, *bits);
            }
            Key::Long(v) => {
                entry.push(5);
                put_u64(&mut entry, *v as u64);
                slots = 2;
            }
            Key::Double(bits) => {
                entry.push(6);
                put_u64(&mut entry, *bits);
                slots = 2;
            }
        }

        let index = self.next;
        self.next += slots;
        self.bytes.extend_from_slice(&entry);
        self.entries.insert(key, index);
        index
    }
}

fn put_u16(out: &mut Vec<u8>, v: u16) {
    out.write_u16::<BigEndian>(v)
        .expect("writing to a Vec cannot fail");
}

fn put_u32(out: &mut Vec<u8>, v: u32) {
    out.write_u32::<BigEndian>(v)
        .expect("writing to a Vec cannot fail");
}

fn put_u64(out: &mut Vec<u8>, v: u64) {
    out.write_u64::<BigEndian>(v)
        .expect("writing to a Vec cannot fail");
}
