use std::env;

use jstub_decompiler::{AnnotationStub, ClassStub, DirectorySource, StubCache};

fn main() {
    pretty_env_logger::init();

    let mut args = env::args().skip(1);
    let (Some(root), Some(class_name)) = (args.next(), args.next()) else {
        eprintln!("usage: dump_stub <classes directory> <class name>");
        return;
    };

    let cache = StubCache::new(DirectorySource::new(root));
    match cache.get_or_compute(&class_name) {
        Ok(stub) => print_stub(&stub),
        Err(e) => log::error!("Failed to decompile {}: {}", class_name, e),
    }
}

fn print_stub(stub: &ClassStub) {
    print_annotations("", stub.annotations());
    println!("{:?} {}", stub.effective_modifiers(), stub.class_name());
    if let Some(signature) = stub.signature() {
        println!("    signature {}", signature);
    }
    if let Some(super_name) = stub.super_name() {
        println!("    extends {}", super_name);
    }
    if !stub.interface_names().is_empty() {
        println!("    implements {}", stub.interface_names().join(", "));
    }
    if !stub.permitted_subclasses().is_empty() {
        println!("    permits {}", stub.permitted_subclasses().join(", "));
    }

    for component in stub.record_components() {
        println!("    component {} {}", component.name(), component.descriptor());
    }

    for field in stub.fields().unwrap_or_default() {
        print_annotations("    ", field.annotations());
        print!("    {:?} {} {}", field.access_flags(), field.descriptor(), field.name());
        match field.value() {
            Some(value) => println!(" = {:?}", value),
            None => println!(),
        }
    }

    for method in stub.methods().unwrap_or_default() {
        print_annotations("    ", method.annotations());
        print!("    {:?} {}{}", method.access_flags(), method.name(), method.descriptor());
        if !method.exceptions().is_empty() {
            print!(" throws {}", method.exceptions().join(", "));
        }
        match method.annotation_default() {
            Some(value) => println!(" default {:?}", value),
            None => println!(),
        }
    }
}

fn print_annotations(indent: &str, annotations: &[AnnotationStub]) {
    for annotation in annotations {
        let members = annotation
            .members()
            .map(|(name, value)| format!("{} = {:?}", name, value))
            .collect::<Vec<_>>();
        println!("{}@{}({})", indent, annotation.descriptor(), members.join(", "));
    }
}
