use crate::action::{ParamSlot, ParameterVisitor};

use super::CodecError;

/// Cursor over a frame that fills visited fields from big-endian bytes.
#[derive(Debug)]
pub struct FrameReader<'a> {
    bytes: &'a [u8],
}

impl<'a> FrameReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len()
    }

    fn take<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N], CodecError> {
        let Some((head, rest)) = self.bytes.split_first_chunk::<N>() else {
            return Err(CodecError::UnexpectedEof {
                field,
                needed: N,
                remaining: self.bytes.len(),
            });
        };
        self.bytes = rest;
        Ok(*head)
    }

    pub fn read_u32(&mut self, field: &'static str) -> Result<u32, CodecError> {
        self.take::<4>(field).map(u32::from_be_bytes)
    }

    /// Fails unless every byte has been consumed.
    pub fn finish(self) -> Result<(), CodecError> {
        if self.bytes.is_empty() {
            Ok(())
        } else {
            Err(CodecError::TrailingBytes(self.bytes.len()))
        }
    }
}

impl ParameterVisitor for FrameReader<'_> {
    type Error = CodecError;

    fn visit(&mut self, name: &'static str, slot: ParamSlot<'_>) -> Result<(), CodecError> {
        match slot {
            ParamSlot::Bool(v) => {
                let [byte] = self.take::<1>(name)?;
                *v = match byte {
                    0 => false,
                    1 => true,
                    value => return Err(CodecError::InvalidBool { field: name, value }),
                };
            }
            ParamSlot::U8(v) => *v = self.take::<1>(name)?[0],
            ParamSlot::U16(v) => *v = u16::from_be_bytes(self.take(name)?),
            ParamSlot::U32(v) => *v = u32::from_be_bytes(self.take(name)?),
            ParamSlot::I32(v) => *v = i32::from_be_bytes(self.take(name)?),
        }
        Ok(())
    }
}
