use std::{env, fs, io::Cursor, path::PathBuf};

use jbin_class_file::{
    attributes::AttributeInfo,
    constant_pool::{ConstantTag, CpInfo},
    AccessFlags, ClassFile, ClassFileError, JavaBin, ParseState, Parser,
};

/// Builds class file bytes section by section.
#[derive(Default)]
struct ClassBuilder {
    pool: Vec<u8>,
    pool_count: u16,
    fields: Vec<Vec<u8>>,
    methods: Vec<Vec<u8>>,
    interfaces: Vec<u16>,
}
impl ClassBuilder {
    fn utf8(mut self, s: &str) -> Self {
        self.pool.push(1);
        self.pool.extend_from_slice(&(s.len() as u16).to_be_bytes());
        self.pool.extend_from_slice(s.as_bytes());
        self.pool_count += 1;
        self
    }

    fn class(mut self, name_index: u16) -> Self {
        self.pool.push(7);
        self.pool.extend_from_slice(&name_index.to_be_bytes());
        self.pool_count += 1;
        self
    }

    fn long(mut self, value: i64) -> Self {
        self.pool.push(5);
        self.pool.extend_from_slice(&value.to_be_bytes());
        self.pool_count += 2;
        self
    }

    fn interface(mut self, index: u16) -> Self {
        self.interfaces.push(index);
        self
    }

    fn field(mut self, access: u16, name: u16, desc: u16, attributes: &[Vec<u8>]) -> Self {
        self.fields.push(member(access, name, desc, attributes));
        self
    }

    fn method(mut self, access: u16, name: u16, desc: u16, attributes: &[Vec<u8>]) -> Self {
        self.methods.push(member(access, name, desc, attributes));
        self
    }

    fn build(self) -> Vec<u8> {
        let mut bytes = vec![0xca, 0xfe, 0xba, 0xbe, 0x00, 0x00, 0x00, 0x34];
        bytes.extend_from_slice(&(self.pool_count + 1).to_be_bytes());
        bytes.extend_from_slice(&self.pool);
        bytes.extend_from_slice(&[0x00, 0x21, 0x00, 0x00, 0x00, 0x00]);
        bytes.extend_from_slice(&(self.interfaces.len() as u16).to_be_bytes());
        for i in &self.interfaces {
            bytes.extend_from_slice(&i.to_be_bytes());
        }
        bytes.extend_from_slice(&(self.fields.len() as u16).to_be_bytes());
        self.fields.iter().for_each(|f| bytes.extend_from_slice(f));
        bytes.extend_from_slice(&(self.methods.len() as u16).to_be_bytes());
        self.methods.iter().for_each(|m| bytes.extend_from_slice(m));
        bytes
    }
}

fn member(access: u16, name: u16, desc: u16, attributes: &[Vec<u8>]) -> Vec<u8> {
    let mut bytes = Vec::new();
    for v in [access, name, desc, attributes.len() as u16] {
        bytes.extend_from_slice(&v.to_be_bytes());
    }
    attributes.iter().for_each(|a| bytes.extend_from_slice(a));
    bytes
}

fn attribute(name_index: u16, body: &[u8]) -> Vec<u8> {
    let mut bytes = name_index.to_be_bytes().to_vec();
    bytes.extend_from_slice(&(body.len() as u32).to_be_bytes());
    bytes.extend_from_slice(body);
    bytes
}

fn code_body(code: &[u8], nested: &[Vec<u8>]) -> Vec<u8> {
    let mut body = vec![0x00, 0x02, 0x00, 0x01];
    body.extend_from_slice(&(code.len() as u32).to_be_bytes());
    body.extend_from_slice(code);
    body.extend_from_slice(&[0x00, 0x00]);
    body.extend_from_slice(&(nested.len() as u16).to_be_bytes());
    nested.iter().for_each(|a| body.extend_from_slice(a));
    body
}

fn parse(bytes: &[u8]) -> Result<ClassFile, ClassFileError> {
    let _ = pretty_env_logger::try_init();
    Parser::new(Cursor::new(bytes)).parse()
}

fn main_class() -> ClassBuilder {
    ClassBuilder::default()
        .utf8("Main") // 1
        .class(1) // 2
        .utf8("Code") // 3
        .utf8("main") // 4
        .utf8("()V") // 5
        .utf8("LineNumberTable") // 6
        .utf8("count") // 7
        .utf8("I") // 8
        .utf8("ConstantValue") // 9
        .utf8("SomeVendorExt") // 10
}

#[test]
fn test_minimal_class_file() {
    let class_file = parse(&ClassBuilder::default().utf8("Foo").build()).unwrap();

    assert_eq!(class_file.constant_pool.len(), 1);
    let entry = class_file.constant_pool.get(1).unwrap();
    assert_eq!(entry.tag, ConstantTag::Utf8);
    assert_eq!(entry.info, CpInfo::Utf8("Foo".into()));
    assert!(class_file.fields.is_empty());
    assert!(class_file.methods.is_empty());
    assert!(class_file.interfaces.is_empty());
    assert_eq!(class_file.access_flags, AccessFlags::PUBLIC | AccessFlags::SUPER);
    assert_eq!(class_file.version(), "0x0034 0x0000");
}

#[test]
fn test_method_with_code() {
    let code = attribute(3, &code_body(&[0xb1], &[]));
    let bytes = main_class().method(0x0009, 4, 5, &[code]).build();
    let class_file = parse(&bytes).unwrap();

    assert_eq!(class_file.methods.len(), 1);
    let method = &class_file.methods[0];
    assert_eq!(class_file.method_name(method), Some("main"));
    assert_eq!(class_file.method_descriptor(method), Some("()V"));
    assert_eq!(method.access_flags, AccessFlags::PUBLIC | AccessFlags::STATIC);

    let code = method.attributes.code_attribute().unwrap();
    assert_eq!(code.max_stack, 2);
    assert_eq!(code.max_locals, 1);
    assert_eq!(code.code, vec![0xb1]);
    assert!(code.exception_table.is_empty());
    assert!(code.attributes.is_empty());
}

#[test]
fn test_parser_consumes_the_whole_stream() {
    let code = attribute(3, &code_body(&[0xb1], &[]));
    let bytes = main_class().method(0x0009, 4, 5, &[code]).build();

    let mut parser = Parser::new(Cursor::new(&bytes));
    assert_eq!(parser.position(), 0);
    parser.parse().unwrap();
    assert_eq!(parser.state(), ParseState::Done);
    assert_eq!(parser.position(), bytes.len() as u64);
}

// A method without attributes is the only member header after which the file may end.
#[test]
fn test_zero_attribute_method_may_end_the_stream() {
    let bytes = main_class().method(0x0401, 4, 5, &[]).build();
    let class_file = parse(&bytes).unwrap();

    assert_eq!(class_file.methods.len(), 1);
    let method = &class_file.methods[0];
    assert_eq!(class_file.method_name(method), Some("main"));
    assert!(method.attributes.is_empty());
}

#[test]
fn test_method_declaring_attributes_must_not_end_the_stream() {
    let mut bytes = main_class().method(0x0001, 4, 5, &[]).build();
    let count = bytes.len() - 1;
    bytes[count] = 0x01;

    match parse(&bytes) {
        Err(ClassFileError::TruncatedStream { offset, wanted: 1 }) => {
            assert_eq!(offset, bytes.len() as u64)
        }
        other => panic!("expected TruncatedStream, got {:?}", other),
    }
}

#[test]
fn test_line_numbers_nested_in_code() {
    let lines = attribute(6, &[0x00, 0x01, 0x00, 0x00, 0x00, 0x03]);
    let code = attribute(3, &code_body(&[0x2a, 0xb1], &[lines]));
    let bytes = main_class().method(0x0001, 4, 5, &[code]).build();
    let class_file = parse(&bytes).unwrap();

    let code = class_file.methods[0].attributes.code_attribute().unwrap();
    let lines = code.attributes.line_numbers().unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].line_number, 3);
}

#[test]
fn test_unknown_method_attribute_aborts() {
    let vendor = attribute(10, &[0x01, 0x02]);
    let bytes = main_class().method(0x0001, 4, 5, &[vendor]).build();

    let mut parser = Parser::new(Cursor::new(&bytes));
    match parser.parse() {
        Err(ClassFileError::UnknownAttribute { name, .. }) => assert_eq!(name, "SomeVendorExt"),
        other => panic!("expected UnknownAttribute, got {:?}", other),
    }
    assert_eq!(parser.state(), ParseState::Methods);
}

// Unknown field attributes are skipped by their declared length rather than left
// in the stream, so the method table after them still parses.
#[test]
fn test_unknown_field_attribute_is_skipped() {
    let vendor = attribute(10, &[0x01, 0x02, 0x03]);
    let constant = attribute(9, &[0x00, 0x01]);
    let code = attribute(3, &code_body(&[0xb1], &[]));
    let bytes = main_class()
        .field(0x0018, 7, 8, &[vendor, constant])
        .method(0x0001, 4, 5, &[code])
        .build();
    let class_file = parse(&bytes).unwrap();

    let field = &class_file.fields[0];
    assert_eq!(class_file.field_name(field), Some("count"));
    assert_eq!(class_file.field_descriptor(field), Some("I"));
    assert_eq!(field.access_flags, AccessFlags::STATIC | AccessFlags::FINAL);
    assert_eq!(field.attributes.len(), 2);
    assert!(matches!(
        field.attributes.find_by_name("SomeVendorExt").unwrap().info,
        AttributeInfo::Raw(ref data) if data.len() == 3
    ));
    assert_eq!(field.attributes.constant_value_index(), Some(1));
    assert!(class_file.methods[0].attributes.code_attribute().is_some());
}

#[test]
fn test_interfaces() {
    let bytes = main_class().interface(2).interface(2).build();
    let class_file = parse(&bytes).unwrap();

    assert_eq!(class_file.interfaces, vec![2, 2]);
}

#[test]
fn test_long_takes_two_slots() {
    let bytes = ClassBuilder::default()
        .long(-1)
        .utf8("after")
        .build();
    let class_file = parse(&bytes).unwrap();

    assert_eq!(class_file.constant_pool.len(), 3);
    assert_eq!(class_file.constant_pool.get(1).unwrap().info, CpInfo::Long(-1));
    assert!(class_file.constant_pool.get(2).is_none());
    assert_eq!(class_file.constant_pool.utf8(3), Some("after"));
}

#[test]
fn test_pool_count_is_wire_count_minus_one() {
    let bytes = main_class().build();
    let wire_count = u16::from_be_bytes([bytes[8], bytes[9]]);
    let class_file = parse(&bytes).unwrap();

    assert_eq!(class_file.constant_pool.len(), wire_count as usize - 1);
    for entry in class_file.constant_pool.entries() {
        match entry.info {
            CpInfo::Utf8(ref s) => assert_eq!(entry.length as usize, s.len()),
            _ => assert_eq!(entry.length, entry.tag.payload_len()),
        }
    }
}

#[test]
fn test_bad_magic() {
    let mut bytes = main_class().build();
    bytes[3] = 0xbf;

    assert!(matches!(
        parse(&bytes),
        Err(ClassFileError::InvalidMagicIdentifier(0xcafebabf))
    ));
}

#[test]
fn test_every_truncation_fails() {
    let code = attribute(3, &code_body(&[0x2a, 0xb7, 0x00, 0x01, 0xb1], &[]));
    let bytes = main_class()
        .interface(2)
        .field(0x0002, 7, 8, &[attribute(9, &[0x00, 0x01])])
        .method(0x0001, 4, 5, &[code])
        .build();
    assert!(parse(&bytes).is_ok());

    for len in 0..bytes.len() {
        match parse(&bytes[..len]) {
            Err(ClassFileError::TruncatedStream { offset, .. }) => {
                assert!(offset <= len as u64, "offset {} past end {}", offset, len)
            }
            other => panic!("truncated at {} but got {:?}", len, other),
        }
    }
}

#[test]
fn test_open_and_close() {
    let path: PathBuf = env::temp_dir().join(format!("jbin-{}-Main.class", std::process::id()));
    let code = attribute(3, &code_body(&[0xb1], &[]));
    fs::write(&path, main_class().method(0x0001, 4, 5, &[code]).build()).unwrap();

    let bin = JavaBin::open(&path).unwrap();
    assert_eq!(bin.path(), path.as_path());
    assert_eq!(bin.version(), "0x0034 0x0000");
    assert_eq!(bin.constant_pool_count(), 10);
    assert_eq!(bin.symbols_count(), 10);
    assert!(matches!(bin.entrypoint(), Err(ClassFileError::NotAvailable(_))));
    assert!(matches!(bin.symbols(), Err(ClassFileError::NotAvailable(_))));
    assert_eq!(bin.class_file().methods.len(), 1);
    bin.close();

    fs::remove_file(&path).unwrap();
}

#[test]
fn test_open_missing_file() {
    assert!(matches!(
        JavaBin::open("does/not/exist/Missing.class"),
        Err(ClassFileError::IOError(_))
    ));
}
