/// Bitcoin wallet scripts - script parsing, P2PKH addresses and execution.
///
/// Provides the `Script` type, opcode constants, push-data chunk parsing,
/// mainnet P2PKH address validation, and the interpreter used to verify
/// signed inputs before broadcast.

pub mod script;
pub mod opcodes;
pub mod chunk;
pub mod address;
pub mod interpreter;

mod error;
pub use error::ScriptError;
pub use script::Script;
pub use address::Address;
pub use chunk::ScriptChunk;
