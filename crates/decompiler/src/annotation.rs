use jstub_class_file::{matches_cp_info, Annotation, ConstantPool, ElementValue, TypeAnnotation};

use crate::{
    stub::{AnnotationStub, AnnotationValue, EnumRef, TypeAnnotationStub, TypeRef},
    DecompileError, Result,
};

pub(crate) fn decode_annotations(cp: &ConstantPool, annotations: &[Annotation]) -> Result<Vec<AnnotationStub>> {
    annotations.iter().map(|a| decode_annotation(cp, a)).collect()
}

pub(crate) fn decode_type_annotations(
    cp: &ConstantPool,
    annotations: &[TypeAnnotation],
) -> Result<Vec<TypeAnnotationStub>> {
    annotations
        .iter()
        .map(|a| decode_annotation(cp, &a.annotation).map(TypeAnnotationStub))
        .collect()
}

pub(crate) fn decode_annotation(cp: &ConstantPool, annotation: &Annotation) -> Result<AnnotationStub> {
    let mut stub = AnnotationStub::new(&annotation.type_descriptor);
    for pair in &annotation.elements {
        stub.insert(pair.name.clone(), decode_value(cp, &pair.value)?);
    }
    Ok(stub)
}

/// Decodes one `element_value`. Nested annotations and arrays are decoded recursively; arrays keep
/// their element order and are never flattened.
pub(crate) fn decode_value(cp: &ConstantPool, value: &ElementValue) -> Result<AnnotationValue> {
    let value = match value {
        ElementValue::Const {
            tag,
            const_value_index,
        } => decode_const(cp, *tag, *const_value_index)?,
        ElementValue::Enum {
            type_descriptor,
            const_name,
        } => AnnotationValue::Enum(EnumRef {
            descriptor: type_descriptor.clone(),
            constant: const_name.clone(),
        }),
        ElementValue::Class { descriptor } => AnnotationValue::Type(TypeRef {
            descriptor: descriptor.clone(),
        }),
        ElementValue::Annotation(annotation) => {
            AnnotationValue::Annotation(decode_annotation(cp, annotation)?)
        }
        ElementValue::Array(values) => AnnotationValue::Array(
            values
                .iter()
                .map(|v| decode_value(cp, v))
                .collect::<Result<Vec<_>>>()?,
        ),
    };

    Ok(value)
}

// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html#jvms-4.7.16.1-130
fn decode_const(cp: &ConstantPool, tag: u8, index: u16) -> Result<AnnotationValue> {
    let value = match tag {
        b'B' => AnnotationValue::Byte(*matches_cp_info!(cp, index, Integer)? as i8),
        b'C' => AnnotationValue::Char(*matches_cp_info!(cp, index, Integer)? as u16),
        b'S' => AnnotationValue::Short(*matches_cp_info!(cp, index, Integer)? as i16),
        b'I' => AnnotationValue::Int(*matches_cp_info!(cp, index, Integer)?),
        b'Z' => AnnotationValue::Boolean(*matches_cp_info!(cp, index, Integer)? != 0),
        b'J' => AnnotationValue::Long(*matches_cp_info!(cp, index, Long)?),
        b'F' => AnnotationValue::Float(*matches_cp_info!(cp, index, Float)?),
        b'D' => AnnotationValue::Double(*matches_cp_info!(cp, index, Double)?),
        b's' => AnnotationValue::String(cp.utf8(index)?.to_owned()),
        _ => return Err(DecompileError::UnsupportedValueVariant(tag as char)),
    };

    Ok(value)
}
