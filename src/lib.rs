pub use jstub_class_file as class_file;
pub use jstub_decompiler::*;
