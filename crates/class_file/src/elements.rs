//! A class file seen as a flat stream of elements, one per structural item, in file order.
//!
//! Nothing here enforces cardinality: a hand-built stream may repeat elements that a well-formed
//! class file can only contain once, and consumers are expected to reject that.

use crate::{attributes::AttributeInfo, AccessFlags};

#[derive(Debug, Clone, PartialEq)]
pub enum ClassElement {
    AccessFlags(AccessFlags),
    /// Internal name of the direct superclass.
    Superclass(String),
    /// Internal names of the direct superinterfaces, in declaration order.
    Interfaces(Vec<String>),
    Field(MemberModel),
    Method(MemberModel),
    Attribute(AttributeInfo),
}

/// A field or method declaration together with its own element stream.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberModel {
    pub name: String,
    pub descriptor: String,
    pub elements: Vec<MemberElement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MemberElement {
    AccessFlags(AccessFlags),
    Attribute(AttributeInfo),
}
