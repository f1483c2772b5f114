use std::io::Cursor;

use crate::{AccessFlags, Attribute, Result};

use super::{parser::Parser, ConstantPool};

#[derive(Debug)]
pub struct Attributes(pub Vec<Attribute>);
impl Attributes {
    /// Decodes every attribute, preserving file order.
    pub fn decode(&self, constant_pool: &ConstantPool) -> Result<Vec<AttributeInfo>> {
        self.0.iter().map(|a| a.decode(constant_pool)).collect()
    }
}

impl Attribute {
    pub fn decode(&self, constant_pool: &ConstantPool) -> Result<AttributeInfo> {
        let name = constant_pool.utf8(self.attribute_name_index)?;
        Parser::new(Cursor::new(&self.info)).parse_attribute_info(name, constant_pool)
    }
}

/// The attributes this crate understands. Names are in internal (slash separated) form, exactly
/// as stored in the constant pool.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeInfo {
    Signature(String),
    Exceptions(Vec<String>),
    // Index of the CONSTANT_Integer/Long/Float/Double/String entry.
    ConstantValue(u16),
    RuntimeVisibleAnnotations(Vec<Annotation>),
    RuntimeInvisibleAnnotations(Vec<Annotation>),
    RuntimeVisibleParameterAnnotations(Vec<Vec<Annotation>>),
    RuntimeInvisibleParameterAnnotations(Vec<Vec<Annotation>>),
    RuntimeVisibleTypeAnnotations(Vec<TypeAnnotation>),
    RuntimeInvisibleTypeAnnotations(Vec<TypeAnnotation>),
    AnnotationDefault(ElementValue),
    MethodParameters(Vec<MethodParameter>),
    InnerClasses(Vec<InnerClass>),
    PermittedSubclasses(Vec<String>),
    Record(Vec<RecordComponentInfo>),
    Unknown { name: String },
}
impl AttributeInfo {
    pub fn name(&self) -> &str {
        match self {
            AttributeInfo::Signature(_) => "Signature",
            AttributeInfo::Exceptions(_) => "Exceptions",
            AttributeInfo::ConstantValue(_) => "ConstantValue",
            AttributeInfo::RuntimeVisibleAnnotations(_) => "RuntimeVisibleAnnotations",
            AttributeInfo::RuntimeInvisibleAnnotations(_) => "RuntimeInvisibleAnnotations",
            AttributeInfo::RuntimeVisibleParameterAnnotations(_) => {
                "RuntimeVisibleParameterAnnotations"
            }
            AttributeInfo::RuntimeInvisibleParameterAnnotations(_) => {
                "RuntimeInvisibleParameterAnnotations"
            }
            AttributeInfo::RuntimeVisibleTypeAnnotations(_) => "RuntimeVisibleTypeAnnotations",
            AttributeInfo::RuntimeInvisibleTypeAnnotations(_) => "RuntimeInvisibleTypeAnnotations",
            AttributeInfo::AnnotationDefault(_) => "AnnotationDefault",
            AttributeInfo::MethodParameters(_) => "MethodParameters",
            AttributeInfo::InnerClasses(_) => "InnerClasses",
            AttributeInfo::PermittedSubclasses(_) => "PermittedSubclasses",
            AttributeInfo::Record(_) => "Record",
            AttributeInfo::Unknown { name } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub type_descriptor: String,
    pub elements: Vec<ElementValuePair>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementValuePair {
    pub name: String,
    pub value: ElementValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    Const { tag: u8, const_value_index: u16 },
    Enum {
        type_descriptor: String,
        const_name: String,
    },
    Class { descriptor: String },
    Annotation(Annotation),
    Array(Vec<ElementValue>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeAnnotation {
    pub target_type: u8,
    // (type_path_kind, type_argument_index)
    pub type_path: Vec<(u8, u8)>,
    pub annotation: Annotation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodParameter {
    // A zero name_index denotes a formal parameter with no name.
    pub name: Option<String>,
    pub access_flags: AccessFlags,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InnerClass {
    pub inner_class: String,
    pub outer_class: Option<String>,
    pub inner_name: Option<String>,
    pub access_flags: AccessFlags,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordComponentInfo {
    pub name: String,
    pub descriptor: String,
    pub attributes: Vec<AttributeInfo>,
}
