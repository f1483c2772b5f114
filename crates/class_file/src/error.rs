use thiserror::Error;

use crate::constant_pool;

#[derive(Error, Debug)]
pub enum ClassFileError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error("Expected {0}, found {1:?}")]
    UnexpectedConstantPoolEntry(&'static str, constant_pool::CpInfo),
    #[error("Invalid constant pool index: {0}")]
    InvalidConstantPoolIndex(u16),
    #[error("Invalid cp info tag: {0}")]
    InvalidCpInfoTag(u8),
    #[error("Invalid magic identifier: 0x{0:X}")]
    InvalidMagicIdentifier(u32),
    #[error("Invalid type annotation target type: 0x{0:X}")]
    InvalidTargetType(u8),
    #[error("Unknown element value tag: 0x{0:02X}")]
    UnknownElementValueTag(u8),
    #[error("Attribute {0} is longer than its contents")]
    TrailingAttributeBytes(String),
}
