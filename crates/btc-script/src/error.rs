use crate::interpreter::InterpreterError;

/// Error types for script operations.
///
/// Covers script parsing and encoding, address validation and
/// interpreter failures.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("invalid script: {0}")]
    InvalidScript(String),

    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// Attempted to append a push opcode without its data.
    #[error("use append_push_data for push data opcodes: {0}")]
    InvalidOpcodeType(String),

    /// A push runs past the end of the script.
    #[error("not enough data")]
    DataTooSmall,

    #[error("data too big")]
    DataTooBig,

    #[error("not a P2PKH script")]
    NotP2PKH,

    /// Malformed address text: bad characters or wrong decoded length.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("address checksum mismatch")]
    AddressChecksum,

    /// A well-formed address for a network other than mainnet.
    #[error("wrong network: {0}")]
    WrongNetwork(String),

    /// A well-formed mainnet address of a type the wallet cannot pay.
    #[error("unsupported address type: {0}")]
    UnsupportedAddress(String),

    #[error("interpreter error: {0}")]
    Interpreter(#[from] InterpreterError),

    #[error("primitives error: {0}")]
    Primitives(#[from] btc_primitives::PrimitivesError),
}
