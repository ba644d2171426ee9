use std::io::{Read, Seek};

use byteorder::ByteOrder;
use log::debug;

use super::Parser;
use crate::{
    constant_pool::{
        ClassInfo, ConstantPoolEntry, ConstantTag, CpInfo, NameAndTypeInfo, RefInfo,
    },
    reader::Endian,
    ClassFileError, ConstantPool, Result,
};

impl<R: Read + Seek> Parser<R> {
    /// Decodes `constant_pool_count - 1` pool slots.
    pub(super) fn parse_constant_pool(&mut self, constant_pool_count: u16) -> Result<ConstantPool> {
        let count = (constant_pool_count as usize).saturating_sub(1);
        let mut slots = Vec::with_capacity(count);
        while slots.len() < count {
            let cp_info = self.parse_cp_info(slots.len() + 1)?;
            let slot_size = cp_info.tag.slot_size();
            slots.push(Some(cp_info));
            (1..slot_size).for_each(|_| slots.push(None));
        }
        // A trailing Long or Double may claim a slot beyond the declared count.
        slots.truncate(count);

        Ok(ConstantPool::new(slots))
    }

    fn parse_cp_info(&mut self, index: usize) -> Result<ConstantPoolEntry> {
        let offset = self.r.position();
        let tag = self.read_u8()?;
        let tag =
            ConstantTag::from_u8(tag).ok_or(ClassFileError::InvalidCpInfoTag { tag, offset })?;

        let payload = match tag {
            ConstantTag::Utf8 => {
                let length = self.read_u16()?;
                self.r.read_bytes(length as u64)?
            }
            _ => self.r.read_bytes(tag.payload_len() as u64)?,
        };
        let info = decode_cp_info(tag, &payload);
        debug!(" {:3} {}: {:?}", index, tag, info);

        ConstantPoolEntry::new(tag, offset, &payload, info)
    }
}

/// `payload` holds exactly the bytes read for `tag`.
fn decode_cp_info(tag: ConstantTag, payload: &[u8]) -> CpInfo {
    match tag {
        ConstantTag::Class => CpInfo::Class(ClassInfo {
            name_index: Endian::read_u16(payload),
        }),
        ConstantTag::FieldRef => CpInfo::FieldRef(decode_ref_info(payload)),
        ConstantTag::MethodRef => CpInfo::MethodRef(decode_ref_info(payload)),
        ConstantTag::InterfaceMethodRef => CpInfo::InterfaceMethodRef(decode_ref_info(payload)),
        ConstantTag::String => CpInfo::String {
            string_index: Endian::read_u16(payload),
        },
        ConstantTag::Integer => CpInfo::Integer(Endian::read_i32(payload)),
        ConstantTag::Float => CpInfo::Float(Endian::read_f32(payload)),
        ConstantTag::Long => CpInfo::Long(Endian::read_i64(payload)),
        ConstantTag::Double => CpInfo::Double(Endian::read_f64(payload)),
        ConstantTag::NameAndType => CpInfo::NameAndType(NameAndTypeInfo {
            name_index: Endian::read_u16(payload),
            descriptor_index: Endian::read_u16(&payload[2..]),
        }),
        ConstantTag::Utf8 => CpInfo::Utf8(String::from_utf8_lossy(payload).into()),
    }
}

fn decode_ref_info(payload: &[u8]) -> RefInfo {
    RefInfo {
        class_index: Endian::read_u16(payload),
        name_and_type_index: Endian::read_u16(&payload[2..]),
    }
}
