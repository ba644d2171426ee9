use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassFileError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error("Unexpected end of stream at offset 0x{offset:x}: wanted {wanted} more bytes")]
    TruncatedStream { offset: u64, wanted: u64 },
    #[error("Invalid magic identifier: 0x{0:X}")]
    InvalidMagicIdentifier(u32),
    #[error("Major version is zero, this is not a class file")]
    NotAClassFile,
    #[error("Invalid cp info tag {tag} at offset 0x{offset:x}")]
    InvalidCpInfoTag { tag: u8, offset: u64 },
    #[error("Cannot resolve attribute name index {index} at offset 0x{offset:x}")]
    UnresolvedAttributeName { index: u16, offset: u64 },
    #[error("Unknown attribute '{name}' at offset 0x{offset:x}")]
    UnknownAttribute { name: String, offset: u64 },
    #[error("Read of {requested} bytes exceeds buffer capacity of {capacity} bytes")]
    BufferOverflow { requested: u64, capacity: u64 },
    #[error("Attributes nested deeper than {depth} levels")]
    AttributeNestingTooDeep { depth: usize },
    #[error("{0} is not available for class files")]
    NotAvailable(&'static str),
}
