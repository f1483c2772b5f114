//! Decompiles JVM class files into structural stubs: the class's name, modifiers, supertypes,
//! members and annotations, read straight from the binary without loading or resolving anything.

mod annotation;
mod cache;
mod error;
mod inner_class;
mod member;
pub mod names;
mod stub;
mod traversal;

use std::io::Cursor;

use jstub_class_file::ClassFile;

pub use cache::{ByteSource, CacheConfig, DirectorySource, StubCache};
pub use error::DecompileError;
pub use jstub_class_file::AccessFlags;
pub use stub::{
    AnnotationStub, AnnotationValue, ClassStub, ConstantValue, EnumRef, FieldStub, MethodStub,
    RecordComponentStub, TypeAnnotationStub, TypeRef,
};
pub use traversal::traverse;

pub type Result<T, E = DecompileError> = std::result::Result<T, E>;

/// Decompiles the bytes of a single class file.
pub fn decompile(bytes: &[u8]) -> Result<ClassStub> {
    let class_file = ClassFile::parse(Cursor::new(bytes))?;
    let class_name = names::qualified_name(class_file.class_name()?);
    let elements = class_file.elements()?;

    traverse(&class_name, &class_file.constant_pool, elements)
}
