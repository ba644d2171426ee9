use std::fmt;

/// Where an attribute list appears, which decides how unknown attributes are handled.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AttributeContext {
    /// Bodies are consumed by their declared length and kept raw.
    Field,
    /// Bodies are decoded by name; unknown names are an error.
    Method,
}

#[derive(Debug, Default)]
pub struct Attributes(pub Vec<Attribute>);
impl Attributes {
    pub fn find_by_name(&self, name: &str) -> Option<&Attribute> {
        self.0.iter().find(|a| a.name == name)
    }

    pub fn code_attribute(&self) -> Option<&CodeAttribute> {
        self.0.iter().find_map(|a| match a.info {
            AttributeInfo::Code(ref code) => Some(code),
            _ => None,
        })
    }

    pub fn line_numbers(&self) -> Option<&[LineNumber]> {
        self.0.iter().find_map(|a| match a.info {
            AttributeInfo::LineNumberTable(ref lines) => Some(lines.as_slice()),
            _ => None,
        })
    }

    pub fn constant_value_index(&self) -> Option<u16> {
        self.0.iter().find_map(|a| match a.info {
            AttributeInfo::ConstantValue {
                constant_value_index,
            } => Some(constant_value_index),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug)]
pub struct Attribute {
    pub attribute_name_index: u16,
    /// Name resolved through the constant pool.
    pub name: String,
    pub attribute_length: u32,
    /// File offset of the attribute header.
    pub offset: u64,
    pub info: AttributeInfo,
}

pub enum AttributeInfo {
    Code(CodeAttribute),
    LineNumberTable(Vec<LineNumber>),
    ConstantValue { constant_value_index: u16 },
    Raw(Vec<u8>),
}
impl fmt::Debug for AttributeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeInfo::Code(code) => f.debug_tuple("Code").field(code).finish(),
            AttributeInfo::LineNumberTable(lines) => {
                f.debug_tuple("LineNumberTable").field(lines).finish()
            }
            AttributeInfo::ConstantValue {
                constant_value_index,
            } => f
                .debug_struct("ConstantValue")
                .field("constant_value_index", constant_value_index)
                .finish(),
            AttributeInfo::Raw(data) => f
                .debug_tuple("Raw")
                .field(&format!("({} bytes)", data.len()))
                .finish(),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct ExceptionTableEntry {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    pub catch_type: u16,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct LineNumber {
    pub start_pc: u16,
    pub line_number: u16,
}

#[derive(Debug)]
pub struct CodeAttribute {
    pub max_stack: u16,
    pub max_locals: u16,
    /// Raw instruction stream, not decoded.
    pub code: Vec<u8>,
    pub exception_table: Vec<ExceptionTableEntry>,
    pub attributes: Attributes,
}
