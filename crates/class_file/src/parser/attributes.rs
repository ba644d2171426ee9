use std::io::{Read, Seek};

use byteorder::ByteOrder;
use log::{debug, trace, warn};

use super::{Parser, MAX_ATTRIBUTE_DEPTH, MAX_CODE_LENGTH};
use crate::{
    attributes::{
        Attribute, AttributeContext, AttributeInfo, Attributes, CodeAttribute,
        ExceptionTableEntry, LineNumber,
    },
    constant_pool::NULL_NAME,
    reader::Endian,
    ClassFileError, Result,
};

impl<R: Read + Seek> Parser<R> {
    pub(super) fn parse_attributes(
        &mut self,
        attributes_count: u16,
        context: AttributeContext,
    ) -> Result<Attributes> {
        self.walk_attributes(attributes_count, context, 0)
    }

    fn walk_attributes(
        &mut self,
        attributes_count: u16,
        context: AttributeContext,
        depth: usize,
    ) -> Result<Attributes> {
        if attributes_count > 0 && depth > MAX_ATTRIBUTE_DEPTH {
            return Err(ClassFileError::AttributeNestingTooDeep {
                depth: MAX_ATTRIBUTE_DEPTH,
            });
        }

        (0..attributes_count)
            .map(|i| self.parse_attribute(i, context, depth))
            .collect::<Result<Vec<_>>>()
            .map(Attributes)
    }

    fn parse_attribute(
        &mut self,
        i: u16,
        context: AttributeContext,
        depth: usize,
    ) -> Result<Attribute> {
        let offset = self.r.position();
        let attribute_name_index = self.read_u16()?;
        let attribute_length = self.read_u32()?;
        let name = self
            .constant_pool
            .utf8(attribute_name_index)
            .map(str::to_owned);
        debug!(
            "   {:2}: Name Index: {} ({}), Length: {}",
            i,
            attribute_name_index,
            name.as_deref().unwrap_or(NULL_NAME),
            attribute_length
        );

        let (name, info) = match context {
            AttributeContext::Field => {
                let name = name.unwrap_or_else(|| NULL_NAME.to_owned());
                let info = self.parse_field_attribute(&name, attribute_length)?;
                (name, info)
            }
            AttributeContext::Method => {
                let name = name.ok_or(ClassFileError::UnresolvedAttributeName {
                    index: attribute_name_index,
                    offset,
                })?;
                let body_start = self.r.position();
                let info = self.parse_method_attribute(&name, offset, depth)?;

                let consumed = self.r.position() - body_start;
                if consumed != attribute_length as u64 {
                    warn!(
                        "attribute '{}' at 0x{:x} declares {} bytes but {} were read",
                        name, offset, attribute_length, consumed
                    );
                }
                (name, info)
            }
        };

        Ok(Attribute {
            attribute_name_index,
            name,
            attribute_length,
            offset,
            info,
        })
    }

    /// Field attributes are skipped by their declared length; only a well-formed
    /// `ConstantValue` body is interpreted.
    fn parse_field_attribute(&mut self, name: &str, attribute_length: u32) -> Result<AttributeInfo> {
        let info = self.r.read_bytes(attribute_length as u64)?;

        match name {
            "ConstantValue" if info.len() == 2 => {
                let constant_value_index = Endian::read_u16(&info);
                debug!("     ConstValueIndex: {}", constant_value_index);
                Ok(AttributeInfo::ConstantValue {
                    constant_value_index,
                })
            }
            _ => Ok(AttributeInfo::Raw(info)),
        }
    }

    fn parse_method_attribute(
        &mut self,
        name: &str,
        offset: u64,
        depth: usize,
    ) -> Result<AttributeInfo> {
        match name {
            "Code" => Ok(AttributeInfo::Code(self.parse_code_attribute(depth)?)),
            "LineNumberTable" => Ok(AttributeInfo::LineNumberTable(
                self.parse_line_number_table()?,
            )),
            "ConstantValue" => {
                let constant_value_index = self.read_u16()?;
                debug!("     ConstValueIndex: {}", constant_value_index);
                Ok(AttributeInfo::ConstantValue {
                    constant_value_index,
                })
            }
            _ => Err(ClassFileError::UnknownAttribute {
                name: name.to_owned(),
                offset,
            }),
        }
    }

    fn parse_code_attribute(&mut self, depth: usize) -> Result<CodeAttribute> {
        let max_stack = self.read_u16()?;
        let max_locals = self.read_u16()?;
        let code_length = self.read_u32()? as u64;
        debug!(
            "      Max Stack: {}, Max Locals: {}, Code Length: {}, Code At Offset: 0x{:08x}",
            max_stack,
            max_locals,
            code_length,
            self.r.position()
        );
        if code_length > MAX_CODE_LENGTH {
            return Err(ClassFileError::BufferOverflow {
                requested: code_length,
                capacity: MAX_CODE_LENGTH,
            });
        }
        let code = self.r.read_bytes(code_length)?;

        let exception_table_length = self.read_u16()?;
        debug!("      Exception table length: {}", exception_table_length);
        let exception_table = (0..exception_table_length)
            .map(|_| self.parse_exception_table_entry())
            .collect::<Result<Vec<_>>>()?;

        let attributes_count = self.read_u16()?;
        debug!("      code Attributes_count: {}", attributes_count);
        let attributes =
            self.walk_attributes(attributes_count, AttributeContext::Method, depth + 1)?;

        Ok(CodeAttribute {
            max_stack,
            max_locals,
            code,
            exception_table,
            attributes,
        })
    }

    fn parse_exception_table_entry(&mut self) -> Result<ExceptionTableEntry> {
        let start_pc = self.read_u16()?;
        let end_pc = self.read_u16()?;
        let handler_pc = self.read_u16()?;
        let catch_type = self.read_u16()?;
        trace!(
            "       start_pc: 0x{:04x} end_pc: 0x{:04x} handler_pc: 0x{:04x} catch_type: {}",
            start_pc,
            end_pc,
            handler_pc,
            catch_type
        );

        Ok(ExceptionTableEntry {
            start_pc,
            end_pc,
            handler_pc,
            catch_type,
        })
    }

    fn parse_line_number_table(&mut self) -> Result<Vec<LineNumber>> {
        let table_length = self.read_u16()?;
        debug!("     Table Length: {}", table_length);

        (0..table_length)
            .map(|k| {
                let start_pc = self.read_u16()?;
                let line_number = self.read_u16()?;
                trace!(
                    "     {:2}: start_pc: 0x{:04x} line_number: {}",
                    k,
                    start_pc,
                    line_number
                );
                Ok(LineNumber {
                    start_pc,
                    line_number,
                })
            })
            .collect()
    }
}
