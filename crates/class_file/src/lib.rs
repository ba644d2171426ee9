// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html

mod access_flags;
pub mod attributes;
mod class_file;
pub mod constant_pool;
mod error;
mod java_bin;
pub mod opcodes;
mod parser;
mod reader;

pub use self::class_file::{ClassFile, FieldInfo, MethodInfo, MAGIC};
pub use access_flags::AccessFlags;
pub use constant_pool::ConstantPool;
pub use error::ClassFileError;
pub use java_bin::JavaBin;
pub use parser::{ParseState, Parser, MAX_ATTRIBUTE_DEPTH, MAX_CODE_LENGTH};
pub use reader::ByteReader;

pub type Result<T, E = ClassFileError> = std::result::Result<T, E>;
