use jstub_class_file::{
    AccessFlags, Annotation, AttributeInfo, ClassElement, ConstantPool, InnerClass, MemberModel,
    RecordComponentInfo,
};

use crate::{
    annotation::{decode_annotations, decode_type_annotations},
    error::set_once,
    inner_class::corrected_modifiers,
    member::{merge, FieldConsumer, MethodConsumer},
    names::qualified_name,
    stub::{ClassStub, RecordComponentStub, TypeAnnotationStub},
    DecompileError, Result,
};

const STATIC_INITIALIZER: &str = "<clinit>";

/// Folds a class file's element stream into a [`ClassStub`].
///
/// `class_name` is the qualified name of the class and `cp` the constant pool the elements refer
/// to. Elements must come in file order; singleton elements occurring twice are rejected.
pub fn traverse(
    class_name: &str,
    cp: &ConstantPool,
    elements: impl IntoIterator<Item = ClassElement>,
) -> Result<ClassStub> {
    log::debug!("Decompiling {}", class_name);

    if class_name.is_empty() {
        return Err(DecompileError::MissingElement {
            scope: "class file".to_owned(),
            element: "class name",
        });
    }

    let mut consumer = ClassConsumer::new(class_name, cp);
    for element in elements {
        consumer.accept(element)?;
    }
    let stub = consumer.finish()?;

    log::debug!(
        "Decompiled {} ({} methods, {} fields)",
        class_name,
        stub.methods().map_or(0, <[_]>::len),
        stub.fields().map_or(0, <[_]>::len),
    );
    Ok(stub)
}

struct ClassConsumer<'a> {
    cp: &'a ConstantPool,
    class_name: String,
    scope: String,
    access_flags: Option<AccessFlags>,
    super_name: Option<String>,
    interfaces: Option<Vec<String>>,
    signature: Option<String>,
    visible_annotations: Option<Vec<Annotation>>,
    invisible_annotations: Option<Vec<Annotation>>,
    methods: Vec<MemberModel>,
    fields: Vec<MemberModel>,
    permitted_subclasses: Vec<String>,
    record_components: Vec<RecordComponentInfo>,
    inner_classes: Vec<InnerClass>,
}

impl<'a> ClassConsumer<'a> {
    fn new(class_name: &str, cp: &'a ConstantPool) -> Self {
        Self {
            cp,
            class_name: class_name.to_owned(),
            scope: format!("class {}", class_name),
            access_flags: None,
            super_name: None,
            interfaces: None,
            signature: None,
            visible_annotations: None,
            invisible_annotations: None,
            methods: Vec::new(),
            fields: Vec::new(),
            permitted_subclasses: Vec::new(),
            record_components: Vec::new(),
            inner_classes: Vec::new(),
        }
    }

    fn accept(&mut self, element: ClassElement) -> Result<()> {
        match element {
            ClassElement::AccessFlags(flags) => {
                set_once(&mut self.access_flags, flags, &self.scope, "access flags")?
            }
            ClassElement::Superclass(name) => set_once(
                &mut self.super_name,
                qualified_name(&name),
                &self.scope,
                "superclass",
            )?,
            ClassElement::Interfaces(names) => set_once(
                &mut self.interfaces,
                names.iter().map(|n| qualified_name(n)).collect(),
                &self.scope,
                "interfaces",
            )?,
            ClassElement::Method(method) if method.name == STATIC_INITIALIZER => {
                log::trace!("{}: skipping static initializer", self.scope)
            }
            ClassElement::Method(method) => self.methods.push(method),
            ClassElement::Field(field) => self.fields.push(field),
            ClassElement::Attribute(attribute) => self.accept_attribute(attribute)?,
        }

        Ok(())
    }

    fn accept_attribute(&mut self, attribute: AttributeInfo) -> Result<()> {
        match attribute {
            AttributeInfo::Signature(signature) => {
                set_once(&mut self.signature, signature, &self.scope, "Signature")?
            }
            AttributeInfo::RuntimeVisibleAnnotations(annotations) => set_once(
                &mut self.visible_annotations,
                annotations,
                &self.scope,
                "RuntimeVisibleAnnotations",
            )?,
            AttributeInfo::RuntimeInvisibleAnnotations(annotations) => set_once(
                &mut self.invisible_annotations,
                annotations,
                &self.scope,
                "RuntimeInvisibleAnnotations",
            )?,
            AttributeInfo::PermittedSubclasses(names) => self
                .permitted_subclasses
                .extend(names.iter().map(|n| qualified_name(n))),
            AttributeInfo::Record(components) => self.record_components.extend(components),
            AttributeInfo::InnerClasses(entries) => self.inner_classes.extend(entries),
            other => log::trace!("{}: ignoring {}", self.scope, other.name()),
        }

        Ok(())
    }

    fn finish(self) -> Result<ClassStub> {
        let access_flags = self.access_flags.ok_or_else(|| DecompileError::MissingElement {
            scope: self.scope.clone(),
            element: "access flags",
        })?;

        let methods = if self.methods.is_empty() {
            None
        } else {
            Some(
                self.methods
                    .into_iter()
                    .map(|m| MethodConsumer::consume(self.cp, m))
                    .collect::<Result<Vec<_>>>()?,
            )
        };

        let fields = if self.fields.is_empty() {
            None
        } else {
            Some(
                self.fields
                    .into_iter()
                    .map(|f| FieldConsumer::consume(self.cp, f))
                    .collect::<Result<Vec<_>>>()?,
            )
        };

        let annotations = merge(
            self.visible_annotations
                .map(|a| decode_annotations(self.cp, &a))
                .transpose()?,
            self.invisible_annotations
                .map(|a| decode_annotations(self.cp, &a))
                .transpose()?,
        );

        let record_components = self
            .record_components
            .iter()
            .map(|c| record_component(self.cp, c))
            .collect::<Result<Vec<_>>>()?;

        let inner_class_modifiers = corrected_modifiers(&self.class_name, &self.inner_classes);

        Ok(ClassStub {
            class_name: self.class_name,
            access_flags: access_flags & AccessFlags::CLASS_MODIFIERS,
            signature: self.signature,
            super_name: self.super_name,
            interface_names: self.interfaces.unwrap_or_default(),
            methods,
            fields,
            permitted_subclasses: self.permitted_subclasses,
            record_components,
            inner_class_modifiers,
            annotations,
        })
    }
}

fn record_component(cp: &ConstantPool, info: &RecordComponentInfo) -> Result<RecordComponentStub> {
    let scope = format!("record component {}", info.name);
    let mut signature = None;
    let mut annotations: Option<Vec<_>> = None;
    let mut type_annotations: Option<Vec<TypeAnnotationStub>> = None;

    for attribute in &info.attributes {
        match attribute {
            AttributeInfo::Signature(s) => set_once(&mut signature, s.clone(), &scope, "Signature")?,
            AttributeInfo::RuntimeVisibleAnnotations(a)
            | AttributeInfo::RuntimeInvisibleAnnotations(a) => annotations
                .get_or_insert_with(Vec::new)
                .extend(decode_annotations(cp, a)?),
            AttributeInfo::RuntimeVisibleTypeAnnotations(a)
            | AttributeInfo::RuntimeInvisibleTypeAnnotations(a) => type_annotations
                .get_or_insert_with(Vec::new)
                .extend(decode_type_annotations(cp, a)?),
            other => log::trace!("{}: ignoring {}", scope, other.name()),
        }
    }

    Ok(RecordComponentStub {
        name: info.name.clone(),
        descriptor: info.descriptor.clone(),
        signature,
        annotations,
        type_annotations,
    })
}
