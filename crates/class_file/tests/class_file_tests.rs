use std::io::Cursor;

use jstub_class_file::{
    AccessFlags, AttributeInfo, ClassElement, ClassFile, ClassFileError, CpInfo, ElementValue,
    MemberElement, Parser,
};
use jstub_test_support::{acc, Ann, Attr, ClassBuilder, Component, InnerClassEntry, Member, TypeAnn, Value};

fn my_class() -> ClassBuilder {
    ClassBuilder::new("my/MyClass")
        .field(Member::new(acc::PRIVATE | acc::FINAL, "myField", "I"))
        .method(Member::new(acc::PUBLIC, "<init>", "()V"))
        .method(Member::new(acc::PUBLIC, "add", "(I)F"))
}

fn with_class_file(builder: ClassBuilder, f: impl FnOnce(ClassFile)) {
    f(Parser::new(Cursor::new(builder.build())).parse().unwrap());
}

#[test]
fn test_super_class() {
    with_class_file(my_class(), |class_file| {
        assert_eq!(Some("java/lang/Object"), class_file.super_class().unwrap())
    });
}

#[test]
fn test_no_super_class() {
    with_class_file(
        ClassBuilder::new("java/lang/Object").super_class(None),
        |class_file| assert_eq!(None, class_file.super_class().unwrap()),
    );
}

#[test]
fn test_class_name() {
    with_class_file(my_class(), |class_file| {
        assert_eq!("my/MyClass", class_file.class_name().unwrap())
    });
}

#[test]
fn test_version() {
    with_class_file(my_class(), |class_file| assert_eq!((61, 0), class_file.version));
}

#[test]
fn test_field_name() {
    with_class_file(my_class(), |class_file| {
        assert_eq!(
            "myField",
            class_file.field_name(&class_file.fields[0]).unwrap()
        )
    });
}

#[test]
fn test_int_field_type() {
    with_class_file(my_class(), |class_file| {
        assert_eq!(
            "I",
            class_file.field_descriptor(&class_file.fields[0]).unwrap()
        )
    });
}

#[test]
fn test_field_access_flags() {
    with_class_file(my_class(), |class_file| {
        assert_eq!(
            AccessFlags::FINAL | AccessFlags::PRIVATE,
            class_file.fields[0].access_flags
        )
    });
}

#[test]
fn test_constructor_name() {
    with_class_file(my_class(), |class_file| {
        assert_eq!(
            "<init>",
            class_file.method_name(&class_file.methods[0]).unwrap()
        )
    });
}

#[test]
fn test_method_descriptor() {
    with_class_file(my_class(), |class_file| {
        assert_eq!(
            "(I)F",
            class_file
                .method_descriptor(&class_file.methods[1])
                .unwrap()
        )
    });
}

#[test]
fn test_method_access_flags() {
    with_class_file(my_class(), |class_file| {
        assert_eq!(AccessFlags::PUBLIC, class_file.methods[1].access_flags)
    });
}

#[test]
fn test_interfaces() {
    let builder = my_class()
        .interface("java/io/Serializable")
        .interface("java/lang/Comparable");
    with_class_file(builder, |class_file| {
        assert_eq!(
            vec!["java/io/Serializable", "java/lang/Comparable"],
            class_file.interface_names().unwrap()
        )
    });
}

#[test]
fn test_element_order() {
    with_class_file(my_class().attr(Attr::Signature("Ljava/lang/Object;".into())), |class_file| {
        let elements = class_file.elements().unwrap();
        assert!(matches!(elements[0], ClassElement::AccessFlags(_)));
        assert_eq!(ClassElement::Superclass("java/lang/Object".into()), elements[1]);
        assert_eq!(ClassElement::Interfaces(vec![]), elements[2]);
        assert!(matches!(&elements[3], ClassElement::Field(f) if f.name == "myField"));
        assert!(matches!(&elements[4], ClassElement::Method(m) if m.name == "<init>"));
        assert!(matches!(&elements[5], ClassElement::Method(m) if m.name == "add"));
        assert_eq!(
            ClassElement::Attribute(AttributeInfo::Signature("Ljava/lang/Object;".into())),
            elements[6]
        );
        assert_eq!(7, elements.len());
    });
}

#[test]
fn test_member_elements_start_with_access_flags() {
    let builder = ClassBuilder::new("my/Thrower").method(
        Member::new(acc::PUBLIC, "run", "()V")
            .attr(Attr::Exceptions(vec!["java/io/IOException".into()])),
    );
    with_class_file(builder, |class_file| {
        let elements = class_file.elements().unwrap();
        let ClassElement::Method(method) = &elements[3] else {
            panic!("expected a method, found {:?}", elements[3]);
        };
        assert_eq!(
            vec![
                MemberElement::AccessFlags(AccessFlags::PUBLIC),
                MemberElement::Attribute(AttributeInfo::Exceptions(vec![
                    "java/io/IOException".into()
                ])),
            ],
            method.elements
        );
    });
}

#[test]
fn test_annotation_element_values() {
    let annotation = Ann::new("Lmy/Ann;")
        .with("level", Value::Enum("Lmy/Level;".into(), "HIGH".into()))
        .with("type", Value::Class("Ljava/lang/String;".into()))
        .with("count", Value::Int(3));
    let builder = my_class().attr(Attr::VisibleAnnotations(vec![annotation]));
    with_class_file(builder, |class_file| {
        let attributes = class_file.attributes.decode(&class_file.constant_pool).unwrap();
        let AttributeInfo::RuntimeVisibleAnnotations(annotations) = &attributes[0] else {
            panic!("expected annotations, found {:?}", attributes[0]);
        };
        let elements = &annotations[0].elements;
        assert_eq!("Lmy/Ann;", annotations[0].type_descriptor);
        assert_eq!(
            ElementValue::Enum {
                type_descriptor: "Lmy/Level;".into(),
                const_name: "HIGH".into()
            },
            elements[0].value
        );
        assert_eq!(
            ElementValue::Class {
                descriptor: "Ljava/lang/String;".into()
            },
            elements[1].value
        );
        assert!(matches!(elements[2].value, ElementValue::Const { tag: b'I', .. }));
    });
}

#[test]
fn test_unknown_element_value_tag() {
    let annotation = Ann::new("Lmy/Ann;").with("odd", Value::Tagged(b'Q', 1));
    let builder = my_class().attr(Attr::VisibleAnnotations(vec![annotation]));
    with_class_file(builder, |class_file| {
        assert!(matches!(
            class_file.attributes.decode(&class_file.constant_pool),
            Err(ClassFileError::UnknownElementValueTag(b'Q'))
        ));
    });
}

#[test]
fn test_unknown_element_value_tag_without_payload() {
    let annotation = Ann::new("Lmy/Ann;")
        .with("odd", Value::Bare(b'Q'))
        .with("next", Value::Int(3));
    let builder = my_class().attr(Attr::VisibleAnnotations(vec![annotation]));
    with_class_file(builder, |class_file| {
        assert!(matches!(
            class_file.attributes.decode(&class_file.constant_pool),
            Err(ClassFileError::UnknownElementValueTag(b'Q'))
        ));
    });
}

#[test]
fn test_inner_classes() {
    let builder = ClassBuilder::new("my/Outer$Inner").attr(Attr::InnerClasses(vec![
        InnerClassEntry::new("my/Outer$Inner", "my/Outer", "Inner", acc::PRIVATE | acc::STATIC),
    ]));
    with_class_file(builder, |class_file| {
        let attributes = class_file.attributes.decode(&class_file.constant_pool).unwrap();
        let AttributeInfo::InnerClasses(entries) = &attributes[0] else {
            panic!("expected inner classes, found {:?}", attributes[0]);
        };
        assert_eq!("my/Outer$Inner", entries[0].inner_class);
        assert_eq!(Some("my/Outer".to_owned()), entries[0].outer_class);
        assert_eq!(Some("Inner".to_owned()), entries[0].inner_name);
        assert_eq!(AccessFlags::PRIVATE | AccessFlags::STATIC, entries[0].access_flags);
    });
}

#[test]
fn test_record_component_attributes() {
    let component = Component::new("value", "Ljava/lang/String;")
        .attr(Attr::Signature("Ljava/lang/String;".into()))
        .attr(Attr::VisibleTypeAnnotations(vec![TypeAnn::field(Ann::new("Lmy/NonNull;"))]));
    let builder = ClassBuilder::new("my/Point")
        .super_class(Some("java/lang/Record"))
        .attr(Attr::Record(vec![component]));
    with_class_file(builder, |class_file| {
        let attributes = class_file.attributes.decode(&class_file.constant_pool).unwrap();
        let AttributeInfo::Record(components) = &attributes[0] else {
            panic!("expected a record, found {:?}", attributes[0]);
        };
        assert_eq!("value", components[0].name);
        assert_eq!(
            AttributeInfo::Signature("Ljava/lang/String;".into()),
            components[0].attributes[0]
        );
        let AttributeInfo::RuntimeVisibleTypeAnnotations(type_annotations) =
            &components[0].attributes[1]
        else {
            panic!("expected type annotations, found {:?}", components[0].attributes[1]);
        };
        assert_eq!(0x13, type_annotations[0].target_type);
        assert_eq!("Lmy/NonNull;", type_annotations[0].annotation.type_descriptor);
    });
}

#[test]
fn test_unrecognised_attribute() {
    let builder = my_class().attr(Attr::Raw {
        name: "SourceFile".into(),
        bytes: vec![0, 1],
    });
    with_class_file(builder, |class_file| {
        assert_eq!(
            vec![AttributeInfo::Unknown {
                name: "SourceFile".into()
            }],
            class_file.attributes.decode(&class_file.constant_pool).unwrap()
        );
    });
}

#[test]
fn test_attribute_with_trailing_bytes() {
    let builder = my_class().attr(Attr::Raw {
        name: "Signature".into(),
        bytes: vec![0, 1, 0xFF],
    });
    with_class_file(builder, |class_file| {
        assert!(matches!(
            class_file.attributes.decode(&class_file.constant_pool),
            Err(ClassFileError::TrailingAttributeBytes(name)) if name == "Signature"
        ));
    });
}

#[test]
fn test_invalid_magic_identifier() {
    let mut bytes = my_class().build();
    bytes[0] = 0xCB;
    assert!(matches!(
        ClassFile::parse(Cursor::new(bytes)),
        Err(ClassFileError::InvalidMagicIdentifier(0xCBFEBABE))
    ));
}

#[test]
fn test_truncated_class_file() {
    let mut bytes = my_class().build();
    bytes.truncate(bytes.len() - 3);
    assert!(matches!(
        ClassFile::parse(Cursor::new(bytes)),
        Err(ClassFileError::IOError(_))
    ));
}

#[test]
fn test_wide_constants_take_two_slots() {
    let builder = my_class()
        .field(Member::new(acc::STATIC | acc::FINAL, "BIG", "J").attr(Attr::ConstantLong(1 << 40)))
        .field(Member::new(acc::STATIC | acc::FINAL, "PI", "D").attr(Attr::ConstantDouble(3.25)));
    with_class_file(builder, |class_file| {
        assert_eq!("BIG", class_file.field_name(&class_file.fields[1]).unwrap());
        assert_eq!("PI", class_file.field_name(&class_file.fields[2]).unwrap());
        assert_eq!("D", class_file.field_descriptor(&class_file.fields[2]).unwrap());
    });
}

#[test]
fn test_attribute_length_past_end_of_file() {
    let mut bytes = my_class().build();
    // Replace the empty class attribute table with one attribute claiming almost 4 GiB.
    bytes.truncate(bytes.len() - 2);
    bytes.extend_from_slice(&[0, 1, 0, 1, 0xFF, 0xFF, 0xFF, 0xF0, 1, 2, 3, 4]);
    match ClassFile::parse(Cursor::new(bytes)) {
        Err(ClassFileError::IOError(e)) => assert_eq!(std::io::ErrorKind::UnexpectedEof, e.kind()),
        other => panic!("expected an unexpected end of file, got {:?}", other),
    }
}

#[test]
fn test_constant_pool_slots() {
    let builder = ClassBuilder::new("my/Wide")
        .field(Member::new(acc::STATIC | acc::FINAL, "BIG", "J").attr(Attr::ConstantLong(7)));
    with_class_file(builder, |class_file| {
        let cp = &class_file.constant_pool;
        let longs = cp
            .into_iter()
            .enumerate()
            .filter(|(_, info)| matches!(info, CpInfo::Long(7)))
            .map(|(i, _)| i)
            .collect::<Vec<_>>();
        assert_eq!(1, longs.len());
        assert_eq!(Some(&CpInfo::Unusable), cp.into_iter().nth(longs[0] + 1));
        assert_eq!(cp.into_iter().count(), cp.len());
        assert!(!cp.is_empty());
    });
}
