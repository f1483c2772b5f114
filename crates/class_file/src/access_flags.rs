use bitflags::bitflags;

// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html#jvms-4.1-200-E.1
//
// Several flags share a bit and are only distinguished by the kind of element they are attached
// to, e.g. ACC_SUPER (class) and ACC_SYNCHRONIZED (method).
bitflags! {
    pub struct AccessFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const SUPER = 0x0020;
        const SYNCHRONIZED = 0x0020;
        const VOLATILE = 0x0040;
        const BRIDGE = 0x0040;
        const TRANSIENT = 0x0080;
        const VARARGS = 0x0080;
        const NATIVE = 0x0100;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const STRICT = 0x0800;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
        const MODULE = 0x8000;
        const MANDATED = 0x8000;
    }
}

impl AccessFlags {
    /// Modifiers meaningful on a top-level class or interface header.
    pub const CLASS_MODIFIERS: AccessFlags = AccessFlags::from_bits_truncate(
        AccessFlags::PUBLIC.bits()
            | AccessFlags::FINAL.bits()
            | AccessFlags::INTERFACE.bits()
            | AccessFlags::ABSTRACT.bits()
            | AccessFlags::SYNTHETIC.bits()
            | AccessFlags::ANNOTATION.bits()
            | AccessFlags::ENUM.bits()
            | AccessFlags::MODULE.bits(),
    );

    /// Modifiers recorded for a nested class in an InnerClasses entry.
    pub const INNER_CLASS_MODIFIERS: AccessFlags = AccessFlags::from_bits_truncate(
        AccessFlags::PUBLIC.bits()
            | AccessFlags::PRIVATE.bits()
            | AccessFlags::PROTECTED.bits()
            | AccessFlags::STATIC.bits()
            | AccessFlags::FINAL.bits()
            | AccessFlags::INTERFACE.bits()
            | AccessFlags::ABSTRACT.bits()
            | AccessFlags::SYNTHETIC.bits()
            | AccessFlags::ANNOTATION.bits()
            | AccessFlags::ENUM.bits(),
    );

    pub const FIELD_MODIFIERS: AccessFlags = AccessFlags::from_bits_truncate(
        AccessFlags::PUBLIC.bits()
            | AccessFlags::PRIVATE.bits()
            | AccessFlags::PROTECTED.bits()
            | AccessFlags::STATIC.bits()
            | AccessFlags::FINAL.bits()
            | AccessFlags::VOLATILE.bits()
            | AccessFlags::TRANSIENT.bits()
            | AccessFlags::SYNTHETIC.bits()
            | AccessFlags::ENUM.bits(),
    );

    pub const METHOD_MODIFIERS: AccessFlags = AccessFlags::from_bits_truncate(
        AccessFlags::PUBLIC.bits()
            | AccessFlags::PRIVATE.bits()
            | AccessFlags::PROTECTED.bits()
            | AccessFlags::STATIC.bits()
            | AccessFlags::FINAL.bits()
            | AccessFlags::SYNCHRONIZED.bits()
            | AccessFlags::BRIDGE.bits()
            | AccessFlags::VARARGS.bits()
            | AccessFlags::NATIVE.bits()
            | AccessFlags::ABSTRACT.bits()
            | AccessFlags::STRICT.bits()
            | AccessFlags::SYNTHETIC.bits(),
    );
}
