// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html#jvms-4.2.1

/// Converts an internal name (`java/util/Map$Entry`) to its qualified form (`java.util.Map$Entry`).
pub fn qualified_name(internal_name: &str) -> String {
    internal_name.replace('/', ".")
}

/// Qualified name of the class named by a reference type descriptor (`Ljava/lang/String;`).
/// Returns `None` for primitive and array descriptors.
pub fn qualified_name_from_descriptor(descriptor: &str) -> Option<String> {
    descriptor
        .strip_prefix('L')?
        .strip_suffix(';')
        .map(qualified_name)
}
