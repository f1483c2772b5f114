use jstub_class_file::ClassFileError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecompileError {
    #[error("Failed to read class bytes: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    ClassFile(ClassFileError),
    #[error("More than one {element} in {scope}")]
    MalformedStructure {
        scope: String,
        element: &'static str,
    },
    #[error("No {element} in {scope}")]
    MissingElement {
        scope: String,
        element: &'static str,
    },
    #[error("Unsupported annotation value tag '{0}'")]
    UnsupportedValueVariant(char),
    #[error("Unsupported constant value for field {field}: {found}")]
    UnsupportedConstantValue { field: String, found: &'static str },
}

// An unknown element value tag can only surface from the parser, which cannot step over it.
impl From<ClassFileError> for DecompileError {
    fn from(e: ClassFileError) -> Self {
        match e {
            ClassFileError::UnknownElementValueTag(tag) => {
                DecompileError::UnsupportedValueVariant(char::from(tag))
            }
            e => DecompileError::ClassFile(e),
        }
    }
}

/// Stores `value` in `slot`, refusing to overwrite an earlier occurrence.
pub(crate) fn set_once<T>(
    slot: &mut Option<T>,
    value: T,
    scope: &str,
    element: &'static str,
) -> Result<(), DecompileError> {
    if slot.is_some() {
        return Err(DecompileError::MalformedStructure {
            scope: scope.to_owned(),
            element,
        });
    }
    *slot = Some(value);
    Ok(())
}
