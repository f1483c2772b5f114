//! The structural model produced for a class file.
//!
//! Stubs are plain values: they are assembled once by the traversal in [`crate::traversal`] and
//! never change afterwards, which is why every field is only readable from outside the crate.
//! Equality is structural; floating point values compare by bit pattern so that decoding the
//! same bytes twice always yields equal stubs, NaN constants included.

use std::{collections::BTreeMap, ops::Deref};

use jstub_class_file::AccessFlags;

use crate::names;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassStub {
    pub(crate) class_name: String,
    pub(crate) access_flags: AccessFlags,
    pub(crate) signature: Option<String>,
    pub(crate) super_name: Option<String>,
    pub(crate) interface_names: Vec<String>,
    pub(crate) methods: Option<Vec<MethodStub>>,
    pub(crate) fields: Option<Vec<FieldStub>>,
    pub(crate) permitted_subclasses: Vec<String>,
    pub(crate) record_components: Vec<RecordComponentStub>,
    pub(crate) inner_class_modifiers: Option<AccessFlags>,
    pub(crate) annotations: Vec<AnnotationStub>,
}

impl ClassStub {
    /// Qualified, dot separated name, e.g. `java.util.Map$Entry`.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Modifiers from the class header. For nested classes these are not the declared ones,
    /// see [`ClassStub::inner_class_modifiers`].
    pub fn access_flags(&self) -> AccessFlags {
        self.access_flags
    }

    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    /// `None` only for `java.lang.Object`.
    pub fn super_name(&self) -> Option<&str> {
        self.super_name.as_deref()
    }

    pub fn interface_names(&self) -> &[String] {
        &self.interface_names
    }

    /// `None` when the class file declares no methods other than a static initializer.
    pub fn methods(&self) -> Option<&[MethodStub]> {
        self.methods.as_deref()
    }

    pub fn fields(&self) -> Option<&[FieldStub]> {
        self.fields.as_deref()
    }

    pub fn permitted_subclasses(&self) -> &[String] {
        &self.permitted_subclasses
    }

    pub fn record_components(&self) -> &[RecordComponentStub] {
        &self.record_components
    }

    /// The modifiers recorded by the class's own InnerClasses entry, if it has one.
    pub fn inner_class_modifiers(&self) -> Option<AccessFlags> {
        self.inner_class_modifiers
    }

    pub fn annotations(&self) -> &[AnnotationStub] {
        &self.annotations
    }

    pub fn is_nested(&self) -> bool {
        self.inner_class_modifiers.is_some()
    }

    pub fn effective_modifiers(&self) -> AccessFlags {
        self.inner_class_modifiers.unwrap_or(self.access_flags)
    }

    pub fn annotation(&self, descriptor: &str) -> Option<&AnnotationStub> {
        find_annotation(&self.annotations, descriptor)
    }

    pub fn methods_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MethodStub> {
        self.methods().unwrap_or_default().iter().filter(move |m| m.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldStub> {
        self.fields()?.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodStub {
    pub(crate) name: String,
    pub(crate) access_flags: AccessFlags,
    pub(crate) descriptor: String,
    pub(crate) signature: Option<String>,
    pub(crate) exceptions: Vec<String>,
    pub(crate) parameter_annotations: Option<BTreeMap<usize, Vec<AnnotationStub>>>,
    pub(crate) parameter_names: Option<Vec<Option<String>>>,
    pub(crate) annotation_default: Option<AnnotationValue>,
    pub(crate) annotations: Vec<AnnotationStub>,
}

impl MethodStub {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn access_flags(&self) -> AccessFlags {
        self.access_flags
    }

    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    /// Qualified names of the declared checked exceptions; empty without a throws clause.
    pub fn exceptions(&self) -> &[String] {
        &self.exceptions
    }

    /// Annotations per parameter position. Positions without annotations have no entry, and the
    /// map itself is absent when no parameter is annotated.
    pub fn parameter_annotations(&self) -> Option<&BTreeMap<usize, Vec<AnnotationStub>>> {
        self.parameter_annotations.as_ref()
    }

    /// Names from the MethodParameters attribute. A formal parameter without a name is `None`.
    pub fn parameter_names(&self) -> Option<&[Option<String>]> {
        self.parameter_names.as_deref()
    }

    /// Default value of an annotation interface element.
    pub fn annotation_default(&self) -> Option<&AnnotationValue> {
        self.annotation_default.as_ref()
    }

    pub fn annotations(&self) -> &[AnnotationStub] {
        &self.annotations
    }

    pub fn annotation(&self, descriptor: &str) -> Option<&AnnotationStub> {
        find_annotation(&self.annotations, descriptor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldStub {
    pub(crate) name: String,
    pub(crate) access_flags: AccessFlags,
    pub(crate) descriptor: String,
    pub(crate) signature: Option<String>,
    pub(crate) value: Option<ConstantValue>,
    pub(crate) annotations: Vec<AnnotationStub>,
}

impl FieldStub {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn access_flags(&self) -> AccessFlags {
        self.access_flags
    }

    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    /// The compile-time constant initialiser, if any.
    pub fn value(&self) -> Option<&ConstantValue> {
        self.value.as_ref()
    }

    pub fn annotations(&self) -> &[AnnotationStub] {
        &self.annotations
    }

    pub fn annotation(&self, descriptor: &str) -> Option<&AnnotationStub> {
        find_annotation(&self.annotations, descriptor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordComponentStub {
    pub(crate) name: String,
    pub(crate) descriptor: String,
    pub(crate) signature: Option<String>,
    pub(crate) annotations: Option<Vec<AnnotationStub>>,
    pub(crate) type_annotations: Option<Vec<TypeAnnotationStub>>,
}

impl RecordComponentStub {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    pub fn annotations(&self) -> Option<&[AnnotationStub]> {
        self.annotations.as_deref()
    }

    pub fn type_annotations(&self) -> Option<&[TypeAnnotationStub]> {
        self.type_annotations.as_deref()
    }
}

/// An annotation: its type descriptor and its members in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationStub {
    pub(crate) descriptor: String,
    pub(crate) members: Vec<(String, AnnotationValue)>,
}

impl AnnotationStub {
    pub(crate) fn new(descriptor: &str) -> Self {
        Self {
            descriptor: descriptor.to_owned(),
            members: Vec::new(),
        }
    }

    // A repeated member name replaces the earlier value but keeps its position.
    pub(crate) fn insert(&mut self, name: String, value: AnnotationValue) {
        match self.members.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.members.push((name, value)),
        }
    }

    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    /// Qualified name of the annotation interface, e.g. `java.lang.Deprecated`.
    pub fn type_name(&self) -> Option<String> {
        names::qualified_name_from_descriptor(&self.descriptor)
    }

    pub fn get(&self, name: &str) -> Option<&AnnotationValue> {
        self.members.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn members(&self) -> impl Iterator<Item = (&str, &AnnotationValue)> {
        self.members.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// A type-use annotation. Same shape as a declaration annotation; the target and type path are
/// not retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeAnnotationStub(pub(crate) AnnotationStub);

impl Deref for TypeAnnotationStub {
    type Target = AnnotationStub;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A class literal (`String.class`) inside an annotation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef {
    pub descriptor: String,
}

/// An enum constant inside an annotation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumRef {
    pub descriptor: String,
    pub constant: String,
}

impl EnumRef {
    pub fn type_name(&self) -> Option<String> {
        names::qualified_name_from_descriptor(&self.descriptor)
    }
}

#[derive(Debug, Clone)]
pub enum AnnotationValue {
    Boolean(bool),
    Byte(i8),
    Char(u16),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Type(TypeRef),
    Enum(EnumRef),
    Annotation(AnnotationStub),
    Array(Vec<AnnotationValue>),
}

impl PartialEq for AnnotationValue {
    fn eq(&self, other: &Self) -> bool {
        use AnnotationValue::*;

        match (self, other) {
            (Boolean(a), Boolean(b)) => a == b,
            (Byte(a), Byte(b)) => a == b,
            (Char(a), Char(b)) => a == b,
            (Short(a), Short(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (Long(a), Long(b)) => a == b,
            (Float(a), Float(b)) => a.to_bits() == b.to_bits(),
            (Double(a), Double(b)) => a.to_bits() == b.to_bits(),
            (String(a), String(b)) => a == b,
            (Type(a), Type(b)) => a == b,
            (Enum(a), Enum(b)) => a == b,
            (Annotation(a), Annotation(b)) => a == b,
            (Array(a), Array(b)) => a == b,
            _ => false,
        }
    }
}
impl Eq for AnnotationValue {}

/// A field's ConstantValue, typed after the constant pool entry it points at.
#[derive(Debug, Clone)]
pub enum ConstantValue {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
}

impl PartialEq for ConstantValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ConstantValue::Int(a), ConstantValue::Int(b)) => a == b,
            (ConstantValue::Long(a), ConstantValue::Long(b)) => a == b,
            (ConstantValue::Float(a), ConstantValue::Float(b)) => a.to_bits() == b.to_bits(),
            (ConstantValue::Double(a), ConstantValue::Double(b)) => a.to_bits() == b.to_bits(),
            (ConstantValue::String(a), ConstantValue::String(b)) => a == b,
            _ => false,
        }
    }
}
impl Eq for ConstantValue {}

fn find_annotation<'a>(annotations: &'a [AnnotationStub], descriptor: &str) -> Option<&'a AnnotationStub> {
    annotations.iter().find(|a| a.descriptor == descriptor)
}
