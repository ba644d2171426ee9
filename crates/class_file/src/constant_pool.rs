use strum::{Display, FromRepr, IntoStaticStr};

use crate::{ClassFileError, Result};

/// Displayed in place of a name whose pool entry is missing or is not a string.
pub const NULL_NAME: &str = "(null)";

/// Upper bound on the raw payload bytes cached per entry.
pub const RETAINED_BYTES: usize = 5;

#[derive(Debug, Default)]
pub struct ConstantPool {
    slots: Vec<Option<ConstantPoolEntry>>,
}
impl ConstantPool {
    pub fn new(slots: Vec<Option<ConstantPoolEntry>>) -> Self {
        Self { slots }
    }

    /// Looks up an entry by its 1-based index, as used everywhere in the class file.
    ///
    /// Index 0, indices past the end of the pool and the unusable slot following a
    /// `Long` or `Double` all resolve to `None`.
    pub fn get(&self, index: u16) -> Option<&ConstantPoolEntry> {
        let slot = (index as usize).checked_sub(1)?;
        self.slots.get(slot)?.as_ref()
    }

    pub fn utf8(&self, index: u16) -> Option<&str> {
        match self.get(index)?.info {
            CpInfo::Utf8(ref s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Like [`ConstantPool::utf8`], falling back to [`NULL_NAME`].
    pub fn utf8_or_null(&self, index: u16) -> &str {
        self.utf8(index).unwrap_or(NULL_NAME)
    }

    /// Number of pool slots, one less than the count declared on the wire.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &ConstantPoolEntry> {
        self.slots.iter().flatten()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Display, FromRepr, IntoStaticStr)]
#[repr(u8)]
pub enum ConstantTag {
    Utf8 = 1,
    Integer = 3,
    Float = 4,
    Long = 5,
    Double = 6,
    Class = 7,
    String = 8,
    FieldRef = 9,
    MethodRef = 10,
    InterfaceMethodRef = 11,
    NameAndType = 12,
}
impl ConstantTag {
    pub fn from_u8(tag: u8) -> Option<Self> {
        Self::from_repr(tag)
    }

    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Fixed payload size following the tag byte. For `Utf8` this is the size of the
    /// length prefix; the string bytes follow it.
    pub fn payload_len(self) -> u16 {
        match self {
            ConstantTag::Class | ConstantTag::String | ConstantTag::Utf8 => 2,
            ConstantTag::Long | ConstantTag::Double => 8,
            _ => 4,
        }
    }

    /// Pool slots taken by an entry of this kind.
    pub fn slot_size(self) -> usize {
        match self {
            ConstantTag::Long | ConstantTag::Double => 2,
            _ => 1,
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct ConstantPoolEntry {
    pub tag: ConstantTag,
    /// File offset of the tag byte.
    pub offset: u64,
    /// Declared payload length: the fixed table length, or the string length for `Utf8`.
    pub length: u16,
    pub bytes: [u8; RETAINED_BYTES],
    pub info: CpInfo,
}
impl ConstantPoolEntry {
    /// Fails with [`ClassFileError::BufferOverflow`] if the payload is longer than a
    /// pool entry can declare.
    pub fn new(tag: ConstantTag, offset: u64, payload: &[u8], info: CpInfo) -> Result<Self> {
        let length = u16::try_from(payload.len()).map_err(|_| ClassFileError::BufferOverflow {
            requested: payload.len() as u64,
            capacity: u16::MAX as u64,
        })?;
        let mut bytes = [0u8; RETAINED_BYTES];
        let n = payload.len().min(RETAINED_BYTES);
        bytes[..n].copy_from_slice(&payload[..n]);

        Ok(Self {
            tag,
            offset,
            length,
            bytes,
            info,
        })
    }

    pub fn kind_name(&self) -> &'static str {
        self.tag.name()
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum CpInfo {
    Class(ClassInfo),
    FieldRef(RefInfo),
    MethodRef(RefInfo),
    InterfaceMethodRef(RefInfo),
    String { string_index: u16 },
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    NameAndType(NameAndTypeInfo),
    Utf8(String),
}

#[derive(Debug, PartialEq, Clone)]
pub struct RefInfo {
    pub class_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ClassInfo {
    pub name_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct NameAndTypeInfo {
    pub name_index: u16,
    pub descriptor_index: u16,
}
