use std::env;

use jbin_class_file::{attributes::AttributeInfo, ClassFileError, JavaBin};

fn main() -> Result<(), ClassFileError> {
    pretty_env_logger::init();

    let Some(path) = env::args().nth(1) else {
        eprintln!("usage: dump <file.class>");
        return Ok(());
    };

    let bin = JavaBin::open(&path)?;
    let class_file = bin.class_file();

    println!("File:             {}", bin.path().display());
    println!("Version:          {}", bin.version());
    println!("Constant pool:    {} entries", bin.constant_pool_count());
    for entry in class_file.constant_pool.entries() {
        println!("  0x{:08x} {:<18} {:?}", entry.offset, entry.kind_name(), entry.info);
    }

    println!("Access flags:     {:?}", class_file.access_flags);
    println!("Interfaces:       {:?}", class_file.interfaces);

    println!("Fields:");
    for field in &class_file.fields {
        println!(
            "    {} {}",
            class_file.field_name(field).unwrap_or_default(),
            class_file.field_descriptor(field).unwrap_or_default()
        );
    }

    println!("Methods:");
    for method in &class_file.methods {
        println!(
            "    {} {}",
            class_file.method_name(method).unwrap_or_default(),
            class_file.method_descriptor(method).unwrap_or_default()
        );
        for attribute in &method.attributes.0 {
            if let AttributeInfo::Code(ref code) = attribute.info {
                println!(
                    "        Code: stack {}, locals {}, {} bytes",
                    code.max_stack,
                    code.max_locals,
                    code.code.len()
                );
            }
        }
    }

    bin.close();

    Ok(())
}
