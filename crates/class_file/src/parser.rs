mod attributes;
mod constant_pool;

use std::io::{Read, Seek};

use log::debug;

use crate::{
    attributes::AttributeContext,
    class_file::{FieldInfo, MethodInfo, MAGIC},
    reader::ByteReader,
    AccessFlags, ClassFile, ClassFileError, ConstantPool, Result,
};

/// Deepest nesting of attribute lists (a `Code` attribute opens one level).
pub const MAX_ATTRIBUTE_DEPTH: usize = 16;

/// Largest instruction stream a `Code` attribute may carry.
pub const MAX_CODE_LENGTH: u64 = 65535;

/// Progress of a [`Parser`] through the class file. States only move forward.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum ParseState {
    Start,
    Header,
    ConstantPool,
    ClassHeader2,
    Interfaces,
    Fields,
    Methods,
    Done,
}

pub struct Parser<R> {
    r: ByteReader<R>,
    state: ParseState,
    constant_pool: ConstantPool,
}
impl<R: Read + Seek> Parser<R> {
    pub fn new(r: R) -> Self {
        Self {
            r: ByteReader::new(r),
            state: ParseState::Start,
            constant_pool: ConstantPool::default(),
        }
    }

    /// The state reached so far. After a failed parse this names the section that failed.
    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> u64 {
        self.r.position()
    }

    pub fn parse(&mut self) -> Result<ClassFile> {
        self.enter(ParseState::Header);
        self.parse_magic_identifier()?;
        let (major_version, minor_version) = self.parse_version()?;
        let constant_pool_count = self.read_u16()?;
        if major_version == 0 {
            return Err(ClassFileError::NotAClassFile);
        }
        debug!("ConstantPoolCount {}", constant_pool_count.saturating_sub(1));

        self.enter(ParseState::ConstantPool);
        self.constant_pool = self.parse_constant_pool(constant_pool_count)?;

        self.enter(ParseState::ClassHeader2);
        let access_flags = AccessFlags::from_bits_retain(self.read_u16()?);
        let this_class = self.read_u16()?;
        let super_class = self.read_u16()?;
        self.r.check_eof()?;
        debug!("Access flags: 0x{:04x}", access_flags.bits());
        debug!("This class: {}", this_class);
        debug!("Super class: {}", super_class);

        self.enter(ParseState::Interfaces);
        let interfaces_count = self.read_u16()?;
        debug!("Interfaces count: {}", interfaces_count);
        let interfaces = self.r.read_u16_vec(interfaces_count)?;

        self.enter(ParseState::Fields);
        let fields_count = self.read_u16()?;
        debug!("Fields count: {}", fields_count);
        let fields = (0..fields_count)
            .map(|i| self.parse_field_info(i))
            .collect::<Result<Vec<_>>>()?;

        self.enter(ParseState::Methods);
        let methods_count = self.read_u16()?;
        debug!("Methods count: {}", methods_count);
        let methods = (0..methods_count)
            .map(|i| self.parse_method_info(i))
            .collect::<Result<Vec<_>>>()?;

        self.enter(ParseState::Done);

        Ok(ClassFile {
            minor_version,
            major_version,
            constant_pool: std::mem::take(&mut self.constant_pool),
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
        })
    }

    fn enter(&mut self, state: ParseState) {
        debug!("-> {:?}", state);
        self.state = state;
    }

    fn parse_field_info(&mut self, i: u16) -> Result<FieldInfo> {
        let access_flags = AccessFlags::from_bits_retain(self.read_u16()?);
        let name_index = self.read_u16()?;
        let descriptor_index = self.read_u16()?;
        let attributes_count = self.read_u16()?;
        debug!(
            "{:2}: field {} {} flags 0x{:04x}, {} attributes",
            i,
            self.constant_pool.utf8_or_null(name_index),
            self.constant_pool.utf8_or_null(descriptor_index),
            access_flags.bits(),
            attributes_count
        );
        let attributes = self.parse_attributes(attributes_count, AttributeContext::Field)?;

        Ok(FieldInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    fn parse_method_info(&mut self, i: u16) -> Result<MethodInfo> {
        let access_flags = AccessFlags::from_bits_retain(self.read_u16()?);
        let name_index = self.read_u16()?;
        let descriptor_index = self.read_u16()?;
        let attributes_count = self.read_u16()?;
        if attributes_count > 0 {
            self.r.check_eof()?;
        }
        debug!(
            "{:2}: method {} {} flags 0x{:04x}, {} attributes",
            i,
            self.constant_pool.utf8_or_null(name_index),
            self.constant_pool.utf8_or_null(descriptor_index),
            access_flags.bits(),
            attributes_count
        );
        let attributes = self.parse_attributes(attributes_count, AttributeContext::Method)?;

        Ok(MethodInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    fn parse_magic_identifier(&mut self) -> Result<()> {
        match self.read_u32()? {
            MAGIC => Ok(()),
            magic_identifier => Err(ClassFileError::InvalidMagicIdentifier(magic_identifier)),
        }
    }

    fn parse_version(&mut self) -> Result<(u16, u16)> {
        let minor = self.read_u16()?;
        let major = self.read_u16()?;
        debug!("Version: {}.{}", major, minor);
        Ok((major, minor))
    }

    fn read_u32(&mut self) -> Result<u32> {
        self.r.read_u32()
    }

    fn read_u16(&mut self) -> Result<u16> {
        self.r.read_u16()
    }

    fn read_u8(&mut self) -> Result<u8> {
        self.r.read_u8()
    }
}

#[cfg(test)]
pub(crate) fn test_parser(bytes: &[u8]) -> Parser<std::io::Cursor<&[u8]>> {
    Parser::new(std::io::Cursor::new(bytes))
}
