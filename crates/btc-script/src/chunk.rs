//! Script chunk parsing and encoding.
//!
//! A chunk is either a bare opcode or a data push together with the bytes
//! it pushes. Decoding keeps the original push opcode so that a chunk
//! re-encodes to exactly the bytes it was read from.

use crate::opcodes::*;
use crate::ScriptError;

/// A single parsed element of a script.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptChunk {
    /// The opcode byte. For direct pushes (1-75 bytes) this is the length.
    pub op: u8,
    /// The pushed bytes, if this chunk is a push.
    pub data: Option<Vec<u8>>,
}

impl ScriptChunk {
    /// Build the minimal push of `data`.
    pub fn push(data: &[u8]) -> Result<Self, ScriptError> {
        let prefix = push_data_prefix(data.len())?;
        Ok(ScriptChunk {
            op: prefix[0],
            data: Some(data.to_vec()),
        })
    }

    /// True for OP_0, direct pushes, OP_PUSHDATA1/2/4, OP_1NEGATE and OP_1..OP_16.
    pub fn is_push(&self) -> bool {
        self.op <= OP_16 && self.op != OP_RESERVED
    }

    /// Append this chunk's wire encoding to `out`.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.push(self.op);
        let data = match &self.data {
            Some(data) => data,
            None => return,
        };
        match self.op {
            OP_PUSHDATA1 => out.push(data.len() as u8),
            OP_PUSHDATA2 => out.extend_from_slice(&(data.len() as u16).to_le_bytes()),
            OP_PUSHDATA4 => out.extend_from_slice(&(data.len() as u32).to_le_bytes()),
            _ => {}
        }
        out.extend_from_slice(data);
    }

    /// Data pushes render as hex, everything else by opcode name.
    pub fn to_asm_string(&self) -> String {
        match &self.data {
            Some(data) => hex::encode(data),
            None => opcode_to_string(self.op),
        }
    }
}

/// Decode raw script bytes into chunks.
///
/// # Returns
/// The parsed chunks, or `DataTooSmall` if any push runs past the end.
pub fn decode_script(bytes: &[u8]) -> Result<Vec<ScriptChunk>, ScriptError> {
    let mut chunks = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let op = bytes[pos];
        pos += 1;

        let length = match op {
            0x01..=OP_DATA_75 => op as usize,
            OP_PUSHDATA1 => read_length(bytes, &mut pos, 1)?,
            OP_PUSHDATA2 => read_length(bytes, &mut pos, 2)?,
            OP_PUSHDATA4 => read_length(bytes, &mut pos, 4)?,
            _ => {
                chunks.push(ScriptChunk { op, data: None });
                continue;
            }
        };

        let end = pos.checked_add(length).ok_or(ScriptError::DataTooSmall)?;
        if end > bytes.len() {
            return Err(ScriptError::DataTooSmall);
        }
        chunks.push(ScriptChunk {
            op,
            data: Some(bytes[pos..end].to_vec()),
        });
        pos = end;
    }

    Ok(chunks)
}

/// Re-encode chunks into raw script bytes.
pub fn encode_chunks(chunks: &[ScriptChunk]) -> Vec<u8> {
    let mut out = Vec::new();
    for chunk in chunks {
        chunk.write_to(&mut out);
    }
    out
}

/// Read a little-endian push length of `width` bytes.
fn read_length(bytes: &[u8], pos: &mut usize, width: usize) -> Result<usize, ScriptError> {
    if bytes.len() < *pos + width {
        return Err(ScriptError::DataTooSmall);
    }
    let mut buf = [0u8; 4];
    buf[..width].copy_from_slice(&bytes[*pos..*pos + width]);
    *pos += width;
    Ok(u32::from_le_bytes(buf) as usize)
}

/// The minimal push prefix for a payload of `data_len` bytes.
pub fn push_data_prefix(data_len: usize) -> Result<Vec<u8>, ScriptError> {
    if data_len <= OP_DATA_75 as usize {
        Ok(vec![data_len as u8])
    } else if data_len <= 0xff {
        Ok(vec![OP_PUSHDATA1, data_len as u8])
    } else if data_len <= 0xffff {
        let mut buf = vec![OP_PUSHDATA2];
        buf.extend_from_slice(&(data_len as u16).to_le_bytes());
        Ok(buf)
    } else if data_len <= 0xffff_ffff {
        let mut buf = vec![OP_PUSHDATA4];
        buf.extend_from_slice(&(data_len as u32).to_le_bytes());
        Ok(buf)
    } else {
        Err(ScriptError::DataTooBig)
    }
}
