use crate::action::{ParamSlot, ParameterVisitor};

use core::convert::Infallible;

/// Appends big-endian encodings of visited fields to a byte buffer.
#[derive(Debug, Default)]
pub struct FrameWriter {
    buf: Vec<u8>,
}

impl FrameWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

impl ParameterVisitor for FrameWriter {
    type Error = Infallible;

    fn visit(&mut self, _name: &'static str, slot: ParamSlot<'_>) -> Result<(), Infallible> {
        match slot {
            ParamSlot::Bool(v) => self.buf.push(u8::from(*v)),
            ParamSlot::U8(v) => self.buf.push(*v),
            ParamSlot::U16(v) => self.buf.extend_from_slice(&v.to_be_bytes()),
            ParamSlot::U32(v) => self.buf.extend_from_slice(&v.to_be_bytes()),
            ParamSlot::I32(v) => self.buf.extend_from_slice(&v.to_be_bytes()),
        }
        Ok(())
    }
}
