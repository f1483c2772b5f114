//! Accumulators that fold a single field's or method's element stream into its stub.

use std::collections::BTreeMap;

use jstub_class_file::{
    AccessFlags, Annotation, AttributeInfo, ConstantPool, CpInfo, MemberElement, MemberModel,
};

use crate::{
    annotation::{decode_annotations, decode_value},
    error::set_once,
    names::qualified_name,
    stub::{AnnotationStub, AnnotationValue, ConstantValue, FieldStub, MethodStub},
    DecompileError, Result,
};

pub(crate) struct MethodConsumer<'a> {
    cp: &'a ConstantPool,
    scope: String,
    name: String,
    descriptor: String,
    access_flags: Option<AccessFlags>,
    signature: Option<String>,
    exceptions: Vec<String>,
    visible_annotations: Option<Vec<AnnotationStub>>,
    invisible_annotations: Option<Vec<AnnotationStub>>,
    parameter_annotations: Option<BTreeMap<usize, Vec<AnnotationStub>>>,
    parameter_names: Option<Vec<Option<String>>>,
    annotation_default: Option<AnnotationValue>,
}

impl<'a> MethodConsumer<'a> {
    pub(crate) fn new(cp: &'a ConstantPool, name: String, descriptor: String) -> Self {
        Self {
            cp,
            scope: format!("method {}{}", name, descriptor),
            name,
            descriptor,
            access_flags: None,
            signature: None,
            exceptions: Vec::new(),
            visible_annotations: None,
            invisible_annotations: None,
            parameter_annotations: None,
            parameter_names: None,
            annotation_default: None,
        }
    }

    pub(crate) fn consume(cp: &'a ConstantPool, model: MemberModel) -> Result<MethodStub> {
        let mut consumer = Self::new(cp, model.name, model.descriptor);
        for element in model.elements {
            consumer.accept(element)?;
        }
        consumer.finish()
    }

    pub(crate) fn accept(&mut self, element: MemberElement) -> Result<()> {
        let attribute = match element {
            MemberElement::AccessFlags(flags) => {
                return set_once(&mut self.access_flags, flags, &self.scope, "access flags")
            }
            MemberElement::Attribute(attribute) => attribute,
        };

        match attribute {
            AttributeInfo::Signature(signature) => {
                set_once(&mut self.signature, signature, &self.scope, "Signature")?
            }
            AttributeInfo::Exceptions(names) => self
                .exceptions
                .extend(names.iter().map(|n| qualified_name(n))),
            AttributeInfo::RuntimeVisibleAnnotations(annotations) => set_once(
                &mut self.visible_annotations,
                decode_annotations(self.cp, &annotations)?,
                &self.scope,
                "RuntimeVisibleAnnotations",
            )?,
            AttributeInfo::RuntimeInvisibleAnnotations(annotations) => set_once(
                &mut self.invisible_annotations,
                decode_annotations(self.cp, &annotations)?,
                &self.scope,
                "RuntimeInvisibleAnnotations",
            )?,
            AttributeInfo::RuntimeVisibleParameterAnnotations(parameters)
            | AttributeInfo::RuntimeInvisibleParameterAnnotations(parameters) => {
                self.add_parameter_annotations(&parameters)?
            }
            AttributeInfo::MethodParameters(parameters) => self
                .parameter_names
                .get_or_insert_with(Vec::new)
                .extend(parameters.into_iter().map(|p| p.name)),
            AttributeInfo::AnnotationDefault(value) => set_once(
                &mut self.annotation_default,
                decode_value(self.cp, &value)?,
                &self.scope,
                "AnnotationDefault",
            )?,
            other => log::trace!("{}: ignoring {}", self.scope, other.name()),
        }

        Ok(())
    }

    // The map, and each position in it, only comes into existence with its first annotation.
    fn add_parameter_annotations(&mut self, parameters: &[Vec<Annotation>]) -> Result<()> {
        for (index, annotations) in parameters.iter().enumerate() {
            if annotations.is_empty() {
                continue;
            }
            let decoded = decode_annotations(self.cp, annotations)?;
            self.parameter_annotations
                .get_or_insert_with(BTreeMap::new)
                .entry(index)
                .or_default()
                .extend(decoded);
        }
        Ok(())
    }

    pub(crate) fn finish(self) -> Result<MethodStub> {
        let access_flags = self.access_flags.ok_or_else(|| DecompileError::MissingElement {
            scope: self.scope.clone(),
            element: "access flags",
        })?;

        Ok(MethodStub {
            name: self.name,
            access_flags: access_flags & AccessFlags::METHOD_MODIFIERS,
            descriptor: self.descriptor,
            signature: self.signature,
            exceptions: self.exceptions,
            parameter_annotations: self.parameter_annotations,
            parameter_names: self.parameter_names,
            annotation_default: self.annotation_default,
            annotations: merge(self.visible_annotations, self.invisible_annotations),
        })
    }
}

pub(crate) struct FieldConsumer<'a> {
    cp: &'a ConstantPool,
    scope: String,
    name: String,
    descriptor: String,
    access_flags: Option<AccessFlags>,
    signature: Option<String>,
    value: Option<ConstantValue>,
    visible_annotations: Option<Vec<AnnotationStub>>,
    invisible_annotations: Option<Vec<AnnotationStub>>,
}

impl<'a> FieldConsumer<'a> {
    pub(crate) fn new(cp: &'a ConstantPool, name: String, descriptor: String) -> Self {
        Self {
            cp,
            scope: format!("field {}", name),
            name,
            descriptor,
            access_flags: None,
            signature: None,
            value: None,
            visible_annotations: None,
            invisible_annotations: None,
        }
    }

    pub(crate) fn consume(cp: &'a ConstantPool, model: MemberModel) -> Result<FieldStub> {
        let mut consumer = Self::new(cp, model.name, model.descriptor);
        for element in model.elements {
            consumer.accept(element)?;
        }
        consumer.finish()
    }

    pub(crate) fn accept(&mut self, element: MemberElement) -> Result<()> {
        let attribute = match element {
            MemberElement::AccessFlags(flags) => {
                return set_once(&mut self.access_flags, flags, &self.scope, "access flags")
            }
            MemberElement::Attribute(attribute) => attribute,
        };

        match attribute {
            AttributeInfo::Signature(signature) => {
                set_once(&mut self.signature, signature, &self.scope, "Signature")?
            }
            AttributeInfo::ConstantValue(index) => {
                let value = self.constant_value(index)?;
                set_once(&mut self.value, value, &self.scope, "ConstantValue")?
            }
            AttributeInfo::RuntimeVisibleAnnotations(annotations) => set_once(
                &mut self.visible_annotations,
                decode_annotations(self.cp, &annotations)?,
                &self.scope,
                "RuntimeVisibleAnnotations",
            )?,
            AttributeInfo::RuntimeInvisibleAnnotations(annotations) => set_once(
                &mut self.invisible_annotations,
                decode_annotations(self.cp, &annotations)?,
                &self.scope,
                "RuntimeInvisibleAnnotations",
            )?,
            other => log::trace!("{}: ignoring {}", self.scope, other.name()),
        }

        Ok(())
    }

    // https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html#jvms-4.7.2
    fn constant_value(&self, index: u16) -> Result<ConstantValue> {
        let value = match self.cp.get(index)? {
            CpInfo::Integer(v) => ConstantValue::Int(*v),
            CpInfo::Long(v) => ConstantValue::Long(*v),
            CpInfo::Float(v) => ConstantValue::Float(*v),
            CpInfo::Double(v) => ConstantValue::Double(*v),
            CpInfo::String { string_index } => {
                ConstantValue::String(self.cp.utf8(*string_index)?.to_owned())
            }
            other => {
                return Err(DecompileError::UnsupportedConstantValue {
                    field: self.name.clone(),
                    found: other.kind(),
                })
            }
        };

        Ok(value)
    }

    pub(crate) fn finish(self) -> Result<FieldStub> {
        let access_flags = self.access_flags.ok_or_else(|| DecompileError::MissingElement {
            scope: self.scope.clone(),
            element: "access flags",
        })?;

        Ok(FieldStub {
            name: self.name,
            access_flags: access_flags & AccessFlags::FIELD_MODIFIERS,
            descriptor: self.descriptor,
            signature: self.signature,
            value: self.value,
            annotations: merge(self.visible_annotations, self.invisible_annotations),
        })
    }
}

pub(crate) fn merge(
    visible: Option<Vec<AnnotationStub>>,
    invisible: Option<Vec<AnnotationStub>>,
) -> Vec<AnnotationStub> {
    visible.into_iter().chain(invisible).flatten().collect()
}
