use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};

use byteorder::{BigEndian, ReadBytesExt};

use crate::{ClassFileError, Result};

pub(crate) type Endian = BigEndian;

/// Sequential big-endian reader over a seekable stream.
///
/// Every read either yields exactly the requested bytes or fails with
/// [`ClassFileError::TruncatedStream`] carrying the offset at which the read started.
///
/// Offsets count from the stream position at construction, not from the start of the
/// underlying stream. Hand over a stream positioned at the first byte of the class file.
pub struct ByteReader<R> {
    r: BufReader<R>,
    position: u64,
    end: Option<u64>,
}
impl<R: Read + Seek> ByteReader<R> {
    pub fn new(r: R) -> Self {
        Self {
            r: BufReader::new(r),
            position: 0,
            end: None,
        }
    }

    /// Number of bytes consumed since the reader was created, which is also the offset of
    /// the next read.
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.read_with(1, |r| r.read_u8())
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_with(2, |r| r.read_u16::<Endian>())
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_with(4, |r| r.read_u32::<Endian>())
    }

    pub fn read_bytes(&mut self, len: u64) -> Result<Vec<u8>> {
        self.ensure_remaining(len)?;

        let mut bytes = vec![0u8; len as usize];
        self.read_with(len, |r| r.read_exact(&mut bytes))?;

        Ok(bytes)
    }

    pub fn read_u16_vec(&mut self, count: u16) -> Result<Vec<u16>> {
        let len = count as u64 * 2;
        self.ensure_remaining(len)?;

        let mut values = vec![0u16; count as usize];
        self.read_with(len, |r| r.read_u16_into::<Endian>(&mut values))?;

        Ok(values)
    }

    /// Fails if the stream has no further bytes.
    pub fn check_eof(&mut self) -> Result<()> {
        if self.r.fill_buf()?.is_empty() {
            return Err(ClassFileError::TruncatedStream {
                offset: self.position,
                wanted: 1,
            });
        }

        Ok(())
    }

    fn read_with<T>(
        &mut self,
        len: u64,
        f: impl FnOnce(&mut BufReader<R>) -> io::Result<T>,
    ) -> Result<T> {
        match f(&mut self.r) {
            Ok(value) => {
                self.position += len;
                Ok(value)
            }
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                Err(ClassFileError::TruncatedStream {
                    offset: self.position,
                    wanted: len,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    fn ensure_remaining(&mut self, len: u64) -> Result<()> {
        if len > self.remaining()? {
            return Err(ClassFileError::TruncatedStream {
                offset: self.position,
                wanted: len,
            });
        }

        Ok(())
    }

    fn remaining(&mut self) -> Result<u64> {
        let end = match self.end {
            Some(end) => end,
            None => {
                let current = self.r.stream_position()?;
                let stream_end = self.r.seek(SeekFrom::End(0))?;
                self.r.seek(SeekFrom::Start(current))?;

                let end = self.position + stream_end.saturating_sub(current);
                self.end = Some(end);
                end
            }
        };

        Ok(end.saturating_sub(self.position))
    }
}
