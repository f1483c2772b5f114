use std::io::{self, BufReader, Read, Seek};

use byteorder::{BigEndian, ReadBytesExt};

use crate::{
    attributes::{
        Annotation, AttributeInfo, Attributes, ElementValue, ElementValuePair, InnerClass,
        MethodParameter, RecordComponentInfo, TypeAnnotation,
    },
    class_file::{FieldInfo, MethodInfo},
};

use super::{constant_pool::CpInfo, *};

type Endian = BigEndian;

pub struct Parser<R> {
    r: BufReader<R>,
}
impl<R: Read + Seek> Parser<R> {
    pub fn new(r: R) -> Self {
        Self {
            r: BufReader::new(r),
        }
    }

    pub fn parse(&mut self) -> Result<ClassFile> {
        let _ = self.parse_magic_identifier()?;
        let version = self.parse_version()?;

        let constant_pool = self.parse_constant_pool()?;
        let access_flags = AccessFlags::from_bits_truncate(self.read_u16()?);
        let this_class = self.read_u16()?;
        let super_class = self.read_u16()?;
        let interfaces_count = self.read_u16()?;

        let mut interfaces = vec![0u16; interfaces_count as usize];
        self.r.read_u16_into::<Endian>(&mut interfaces)?;

        let fields_count = self.read_u16()?;
        let fields = (0..fields_count)
            .map(|_| self.parse_field_info())
            .collect::<Result<Vec<_>>>()?;

        let methods_count = self.read_u16()?;
        let methods = (0..methods_count)
            .map(|_| self.parse_method_info())
            .collect::<Result<Vec<_>>>()?;

        let attributes_count = self.read_u16()?;
        let attributes = self.parse_attributes(attributes_count)?;

        Ok(ClassFile {
            version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }

    fn parse_field_info(&mut self) -> Result<FieldInfo> {
        let access_flags = AccessFlags::from_bits_truncate(self.read_u16()?);
        let name_index = self.read_u16()?;
        let descriptor_index = self.read_u16()?;
        let attributes_count = self.read_u16()?;
        let attributes = self.parse_attributes(attributes_count)?;

        Ok(FieldInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    fn parse_method_info(&mut self) -> Result<MethodInfo> {
        let access_flags = AccessFlags::from_bits_truncate(self.read_u16()?);
        let name_index = self.read_u16()?;
        let descriptor_index = self.read_u16()?;
        let attributes_count = self.read_u16()?;
        let attributes = self.parse_attributes(attributes_count)?;

        Ok(MethodInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    fn parse_magic_identifier(&mut self) -> Result<()> {
        match self.read_u32()? {
            0xCAFEBABE => Ok(()),
            magic_identifier => Err(ClassFileError::InvalidMagicIdentifier(magic_identifier)),
        }
    }

    fn parse_version(&mut self) -> Result<(u16, u16)> {
        let minor = self.read_u16()?;
        let major = self.read_u16()?;
        Ok((major, minor))
    }

    fn parse_constant_pool(&mut self) -> Result<ConstantPool> {
        let constant_pool_count = self.read_u16()?;

        let mut count = (constant_pool_count as usize).saturating_sub(1);
        let mut res = Vec::with_capacity(count);
        while count > 0 {
            let (cp_info, slot_size) = self.parse_cp_info()?;
            res.push(cp_info);
            (0..slot_size - 1).for_each(|_| res.push(CpInfo::Unusable));

            count = count.saturating_sub(slot_size);
        }
        Ok(ConstantPool::new(res))
    }

    fn parse_cp_info(&mut self) -> Result<(CpInfo, usize)> {
        let tag = self.read_u8()?;
        let (cp_info, additional_cp_info) = match tag {
            1 => (self.parse_utf8()?, 1),
            3 => (CpInfo::Integer(self.read_i32()?), 1),
            4 => (CpInfo::Float(f32::from_bits(self.read_u32()?)), 1),
            5 => (CpInfo::Long(self.read_i64()?), 2),
            6 => (CpInfo::Double(f64::from_bits(self.read_u64()?)), 2),
            7 => (self.parse_class_info()?, 1),
            8 => (self.parse_string()?, 1),
            9 => (CpInfo::FieldRef(self.parse_ref_info()?), 1),
            10 => (CpInfo::MethodRef(self.parse_ref_info()?), 1),
            11 => (CpInfo::InterfaceMethodRef(self.parse_ref_info()?), 1),
            12 => (self.parse_name_and_type_info()?, 1),
            15 => (self.parse_method_handle()?, 1),
            16 => (self.parse_method_type_info()?, 1),
            17 => (CpInfo::Dynamic(self.parse_invoke_dynamic_info()?), 1),
            18 => (CpInfo::InvokeDynamic(self.parse_invoke_dynamic_info()?), 1),
            19 => (
                CpInfo::Module {
                    name_index: self.read_u16()?,
                },
                1,
            ),
            20 => (
                CpInfo::Package {
                    name_index: self.read_u16()?,
                },
                1,
            ),
            _ => return Err(ClassFileError::InvalidCpInfoTag(tag)),
        };

        Ok((cp_info, additional_cp_info))
    }

    fn parse_utf8(&mut self) -> Result<CpInfo> {
        let length = self.read_u16()?;
        let mut bytes = vec![0u8; length as usize];
        self.r.read_exact(&mut bytes)?;

        Ok(CpInfo::Utf8(mutf8::decode(&bytes)))
    }

    fn parse_class_info(&mut self) -> Result<CpInfo> {
        let name_index = self.read_u16()?;

        Ok(CpInfo::Class(constant_pool::ClassInfo { name_index }))
    }

    fn parse_string(&mut self) -> Result<CpInfo> {
        let string_index = self.read_u16()?;

        Ok(CpInfo::String { string_index })
    }

    fn parse_name_and_type_info(&mut self) -> Result<CpInfo> {
        let name_index = self.read_u16()?;
        let descriptor_index = self.read_u16()?;

        Ok(CpInfo::NameAndType(constant_pool::NameAndTypeInfo {
            name_index,
            descriptor_index,
        }))
    }

    fn parse_method_handle(&mut self) -> Result<CpInfo> {
        let reference_kind = self.read_u8()?;
        let reference_index = self.read_u16()?;

        Ok(CpInfo::MethodHandle(constant_pool::MethodHandleInfo {
            reference_kind,
            reference_index,
        }))
    }

    fn parse_method_type_info(&mut self) -> Result<CpInfo> {
        let descriptor_index = self.read_u16()?;

        Ok(CpInfo::MethodType(constant_pool::MethodTypeInfo {
            descriptor_index,
        }))
    }

    fn parse_invoke_dynamic_info(&mut self) -> Result<constant_pool::InvokeDynamicInfo> {
        let bootstrap_method_attr_index = self.read_u16()?;
        let name_and_type_index = self.read_u16()?;

        Ok(constant_pool::InvokeDynamicInfo {
            bootstrap_method_attr_index,
            name_and_type_index,
        })
    }

    fn parse_ref_info(&mut self) -> Result<constant_pool::RefInfo> {
        let class_index = self.read_u16()?;
        let name_and_type_index = self.read_u16()?;

        Ok(constant_pool::RefInfo {
            class_index,
            name_and_type_index,
        })
    }

    fn parse_attribute(&mut self) -> Result<Attribute> {
        let attribute_name_index = self.read_u16()?;
        let attribute_length = self.read_u32()?;
        // Bounded by the bytes actually present, not by the declared length.
        let mut info = Vec::new();
        (&mut self.r)
            .take(u64::from(attribute_length))
            .read_to_end(&mut info)?;
        if info.len() as u64 != u64::from(attribute_length) {
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
        }

        Ok(Attribute {
            attribute_name_index,
            info,
        })
    }

    fn parse_attributes(&mut self, attributes_count: u16) -> Result<Attributes> {
        (0..attributes_count)
            .map(|_| self.parse_attribute())
            .collect::<Result<Vec<_>>>()
            .map(Attributes)
    }

    /// Decodes the body of an attribute named `name`. The reader must contain exactly the
    /// attribute's `info` bytes.
    pub fn parse_attribute_info(&mut self, name: &str, cp: &ConstantPool) -> Result<AttributeInfo> {
        let info = match name {
            "Signature" => AttributeInfo::Signature(cp.utf8(self.read_u16()?)?.to_owned()),
            "ConstantValue" => AttributeInfo::ConstantValue(self.read_u16()?),
            "Exceptions" => AttributeInfo::Exceptions(self.parse_class_names(cp)?),
            "PermittedSubclasses" => AttributeInfo::PermittedSubclasses(self.parse_class_names(cp)?),
            "RuntimeVisibleAnnotations" => {
                AttributeInfo::RuntimeVisibleAnnotations(self.parse_annotations(cp)?)
            }
            "RuntimeInvisibleAnnotations" => {
                AttributeInfo::RuntimeInvisibleAnnotations(self.parse_annotations(cp)?)
            }
            "RuntimeVisibleParameterAnnotations" => {
                AttributeInfo::RuntimeVisibleParameterAnnotations(
                    self.parse_parameter_annotations(cp)?,
                )
            }
            "RuntimeInvisibleParameterAnnotations" => {
                AttributeInfo::RuntimeInvisibleParameterAnnotations(
                    self.parse_parameter_annotations(cp)?,
                )
            }
            "RuntimeVisibleTypeAnnotations" => {
                AttributeInfo::RuntimeVisibleTypeAnnotations(self.parse_type_annotations(cp)?)
            }
            "RuntimeInvisibleTypeAnnotations" => {
                AttributeInfo::RuntimeInvisibleTypeAnnotations(self.parse_type_annotations(cp)?)
            }
            "AnnotationDefault" => AttributeInfo::AnnotationDefault(self.parse_element_value(cp)?),
            "MethodParameters" => AttributeInfo::MethodParameters(self.parse_method_parameters(cp)?),
            "InnerClasses" => AttributeInfo::InnerClasses(self.parse_inner_classes(cp)?),
            "Record" => AttributeInfo::Record(self.parse_record_components(cp)?),
            _ => {
                return Ok(AttributeInfo::Unknown {
                    name: name.to_owned(),
                })
            }
        };

        // attribute_length must match the structure exactly; leftovers mean we misread it.
        if self.r.read_u8().is_ok() {
            return Err(ClassFileError::TrailingAttributeBytes(name.to_owned()));
        }

        Ok(info)
    }

    fn parse_class_names(&mut self, cp: &ConstantPool) -> Result<Vec<String>> {
        let count = self.read_u16()?;
        (0..count)
            .map(|_| -> Result<String> { Ok(cp.class_name(self.read_u16()?)?.to_owned()) })
            .collect()
    }

    fn parse_annotations(&mut self, cp: &ConstantPool) -> Result<Vec<Annotation>> {
        let num_annotations = self.read_u16()?;
        (0..num_annotations)
            .map(|_| self.parse_annotation(cp))
            .collect()
    }

    fn parse_parameter_annotations(&mut self, cp: &ConstantPool) -> Result<Vec<Vec<Annotation>>> {
        let num_parameters = self.read_u8()?;
        (0..num_parameters)
            .map(|_| self.parse_annotations(cp))
            .collect()
    }

    fn parse_annotation(&mut self, cp: &ConstantPool) -> Result<Annotation> {
        let type_descriptor = cp.utf8(self.read_u16()?)?.to_owned();
        let num_element_value_pairs = self.read_u16()?;
        let elements = (0..num_element_value_pairs)
            .map(|_| -> Result<ElementValuePair> {
                let name = cp.utf8(self.read_u16()?)?.to_owned();
                let value = self.parse_element_value(cp)?;
                Ok(ElementValuePair { name, value })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Annotation {
            type_descriptor,
            elements,
        })
    }

    // https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html#jvms-4.7.16.1
    //
    // The layout of an element value depends on its tag, so an unknown tag ends the parse.
    fn parse_element_value(&mut self, cp: &ConstantPool) -> Result<ElementValue> {
        let tag = self.read_u8()?;
        let value = match tag {
            b'e' => {
                let type_descriptor = cp.utf8(self.read_u16()?)?.to_owned();
                let const_name = cp.utf8(self.read_u16()?)?.to_owned();
                ElementValue::Enum {
                    type_descriptor,
                    const_name,
                }
            }
            b'c' => ElementValue::Class {
                descriptor: cp.utf8(self.read_u16()?)?.to_owned(),
            },
            b'@' => ElementValue::Annotation(self.parse_annotation(cp)?),
            b'[' => {
                let num_values = self.read_u16()?;
                ElementValue::Array(
                    (0..num_values)
                        .map(|_| self.parse_element_value(cp))
                        .collect::<Result<Vec<_>>>()?,
                )
            }
            b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b's' => ElementValue::Const {
                tag,
                const_value_index: self.read_u16()?,
            },
            _ => return Err(ClassFileError::UnknownElementValueTag(tag)),
        };

        Ok(value)
    }

    fn parse_type_annotations(&mut self, cp: &ConstantPool) -> Result<Vec<TypeAnnotation>> {
        let num_annotations = self.read_u16()?;
        (0..num_annotations)
            .map(|_| self.parse_type_annotation(cp))
            .collect()
    }

    // https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html#jvms-4.7.20
    fn parse_type_annotation(&mut self, cp: &ConstantPool) -> Result<TypeAnnotation> {
        let target_type = self.read_u8()?;
        match target_type {
            // type_parameter_target, formal_parameter_target
            0x00 | 0x01 | 0x16 => {
                self.read_u8()?;
            }
            // supertype_target, throws_target, catch_target, offset_target
            0x10 | 0x17 | 0x42 | 0x43..=0x46 => {
                self.read_u16()?;
            }
            // type_parameter_bound_target
            0x11 | 0x12 => {
                self.read_u8()?;
                self.read_u8()?;
            }
            // empty_target
            0x13..=0x15 => {}
            // localvar_target
            0x40 | 0x41 => {
                let table_length = self.read_u16()?;
                for _ in 0..table_length {
                    let _start_pc = self.read_u16()?;
                    let _length = self.read_u16()?;
                    let _index = self.read_u16()?;
                }
            }
            // type_argument_target
            0x47..=0x4B => {
                self.read_u16()?;
                self.read_u8()?;
            }
            _ => return Err(ClassFileError::InvalidTargetType(target_type)),
        }

        let path_length = self.read_u8()?;
        let type_path = (0..path_length)
            .map(|_| -> Result<(u8, u8)> { Ok((self.read_u8()?, self.read_u8()?)) })
            .collect::<Result<Vec<_>>>()?;

        let annotation = self.parse_annotation(cp)?;

        Ok(TypeAnnotation {
            target_type,
            type_path,
            annotation,
        })
    }

    fn parse_method_parameters(&mut self, cp: &ConstantPool) -> Result<Vec<MethodParameter>> {
        let parameters_count = self.read_u8()?;
        (0..parameters_count)
            .map(|_| -> Result<MethodParameter> {
                let name = cp.optional_utf8(self.read_u16()?)?.map(str::to_owned);
                let access_flags = AccessFlags::from_bits_truncate(self.read_u16()?);
                Ok(MethodParameter { name, access_flags })
            })
            .collect()
    }

    fn parse_inner_classes(&mut self, cp: &ConstantPool) -> Result<Vec<InnerClass>> {
        let number_of_classes = self.read_u16()?;
        (0..number_of_classes)
            .map(|_| -> Result<InnerClass> {
                let inner_class = cp.class_name(self.read_u16()?)?.to_owned();
                let outer_class = cp.optional_class_name(self.read_u16()?)?.map(str::to_owned);
                let inner_name = cp.optional_utf8(self.read_u16()?)?.map(str::to_owned);
                let access_flags = AccessFlags::from_bits_truncate(self.read_u16()?);
                Ok(InnerClass {
                    inner_class,
                    outer_class,
                    inner_name,
                    access_flags,
                })
            })
            .collect()
    }

    fn parse_record_components(&mut self, cp: &ConstantPool) -> Result<Vec<RecordComponentInfo>> {
        let components_count = self.read_u16()?;
        (0..components_count)
            .map(|_| -> Result<RecordComponentInfo> {
                let name = cp.utf8(self.read_u16()?)?.to_owned();
                let descriptor = cp.utf8(self.read_u16()?)?.to_owned();
                let attributes_count = self.read_u16()?;
                let attributes = self.parse_attributes(attributes_count)?.decode(cp)?;
                Ok(RecordComponentInfo {
                    name,
                    descriptor,
                    attributes,
                })
            })
            .collect()
    }

    fn read_u64(&mut self) -> Result<u64> {
        Ok(self.r.read_u64::<Endian>()?)
    }

    fn read_u32(&mut self) -> Result<u32> {
        Ok(self.r.read_u32::<Endian>()?)
    }

    fn read_u16(&mut self) -> Result<u16> {
        Ok(self.r.read_u16::<Endian>()?)
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.r.read_u8()?)
    }

    fn read_i32(&mut self) -> Result<i32> {
        Ok(self.r.read_i32::<Endian>()?)
    }

    fn read_i64(&mut self) -> Result<i64> {
        Ok(self.r.read_i64::<Endian>()?)
    }
}
