use jstub_class_file::{AccessFlags, InnerClass};

use crate::names::qualified_name;

/// Declared modifiers of `class_name`, taken from the InnerClasses entry that names the class
/// itself.
///
/// A nested class's header flags are only an approximation (no static, private shows up as
/// package access, protected as public). The table may also list nested classes of other
/// classes with the same simple name, e.g. both `a/Outer$Node` and `a/Base$Node`, so entries are
/// matched on the qualified name.
pub(crate) fn corrected_modifiers<'a>(
    class_name: &str,
    entries: impl IntoIterator<Item = &'a InnerClass>,
) -> Option<AccessFlags> {
    entries
        .into_iter()
        .find(|entry| qualified_name(&entry.inner_class) == class_name)
        .map(|entry| entry.access_flags & AccessFlags::INNER_CLASS_MODIFIERS)
}
