use std::io::{Read, Seek};

use crate::{
    attributes::Attributes,
    elements::{ClassElement, MemberElement, MemberModel},
    parser::Parser,
    AccessFlags, ConstantPool, Result,
};

#[derive(Debug)]
pub struct ClassFile {
    pub version: (u16, u16),
    pub constant_pool: ConstantPool,
    pub access_flags: AccessFlags,
    pub this_class: u16,
    pub super_class: u16,
    pub interfaces: Vec<u16>,
    pub fields: Vec<FieldInfo>,
    pub methods: Vec<MethodInfo>,
    pub attributes: Attributes,
}
impl ClassFile {
    pub fn parse(bytes: impl Read + Seek) -> Result<ClassFile> {
        Parser::new(bytes).parse()
    }

    pub fn super_class(&self) -> Result<Option<&str>> {
        // For a class, the value of the super_class item either must be zero or must be a valid index
        // into the constant_pool table. If the value of the super_class item is nonzero, the
        // constant_pool entry at that index must be a CONSTANT_Class_info structure representing the
        // direct superclass of the class defined by this class file.
        //
        // If the value of the super_class item is zero, then this class file must represent the class Object,
        // the only class or interface without a direct superclass.
        self.constant_pool.optional_class_name(self.super_class)
    }

    pub fn class_name(&self) -> Result<&str> {
        // The value of the this_class item must be a valid index into the constant_pool table.
        // The constant_pool entry at that index must be a CONSTANT_Class_info structure (§4.4.1)
        // representing the class or interface defined by this class file.
        self.constant_pool.class_name(self.this_class)
    }

    pub fn interface_names(&self) -> Result<Vec<&str>> {
        self.interfaces
            .iter()
            .map(|&index| self.constant_pool.class_name(index))
            .collect()
    }

    pub fn field_name(&self, field: &FieldInfo) -> Result<&str> {
        self.constant_pool.utf8(field.name_index)
    }

    pub fn field_descriptor(&self, field: &FieldInfo) -> Result<&str> {
        self.constant_pool.utf8(field.descriptor_index)
    }

    pub fn method_name(&self, method: &MethodInfo) -> Result<&str> {
        self.constant_pool.utf8(method.name_index)
    }

    pub fn method_descriptor(&self, method: &MethodInfo) -> Result<&str> {
        self.constant_pool.utf8(method.descriptor_index)
    }

    /// Flattens the class file into its element stream, in file order: access flags, superclass
    /// (absent for `java/lang/Object`), interfaces, fields, methods, then class attributes.
    pub fn elements(&self) -> Result<Vec<ClassElement>> {
        let mut elements = Vec::with_capacity(3 + self.fields.len() + self.methods.len());

        elements.push(ClassElement::AccessFlags(self.access_flags));
        if let Some(super_class) = self.super_class()? {
            elements.push(ClassElement::Superclass(super_class.to_owned()));
        }
        elements.push(ClassElement::Interfaces(
            self.interface_names()?
                .into_iter()
                .map(str::to_owned)
                .collect(),
        ));

        for field in &self.fields {
            elements.push(ClassElement::Field(self.member_model(
                self.field_name(field)?,
                self.field_descriptor(field)?,
                field.access_flags,
                &field.attributes,
            )?));
        }

        for method in &self.methods {
            elements.push(ClassElement::Method(self.member_model(
                self.method_name(method)?,
                self.method_descriptor(method)?,
                method.access_flags,
                &method.attributes,
            )?));
        }

        for attribute in self.attributes.decode(&self.constant_pool)? {
            elements.push(ClassElement::Attribute(attribute));
        }

        Ok(elements)
    }

    fn member_model(
        &self,
        name: &str,
        descriptor: &str,
        access_flags: AccessFlags,
        attributes: &Attributes,
    ) -> Result<MemberModel> {
        let mut elements = vec![MemberElement::AccessFlags(access_flags)];
        elements.extend(
            attributes
                .decode(&self.constant_pool)?
                .into_iter()
                .map(MemberElement::Attribute),
        );

        Ok(MemberModel {
            name: name.to_owned(),
            descriptor: descriptor.to_owned(),
            elements,
        })
    }
}

#[derive(Debug)]
pub struct FieldInfo {
    pub access_flags: AccessFlags,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Attributes,
}

#[derive(Debug)]
pub struct MethodInfo {
    pub access_flags: AccessFlags,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Attributes,
}
