use thiserror::Error as ThisError;

#[derive(ThisError, Debug, PartialEq, Eq)]
pub enum Error {
  #[error("should receive more data to restore the entire message: required={required}, remaining={remaining}")]
  BufferTooShort { required: usize, remaining: usize },
  #[error("caller buffer too small to write the entity: required={required}, available={available}")]
  CallerBufferTooSmall { required: usize, available: usize },

  #[error("unresolved string reference: {id}")]
  UnresolvedReference { id: u32 },
  #[error("string reference already registered with different text: {id}")]
  DuplicateReference { id: u32 },

  #[error("unknown message type: {value:#04X}")]
  UnknownMessageType { value: u8 },
  #[error("unexpected message type: {actual}, expected={expected}")]
  UnexpectedMessageType { expected: crate::msg::MessageType, actual: crate::msg::MessageType },

  #[error("too long string: {length}, max={maximum}")]
  StringTooLong { length: usize, maximum: usize },
  #[error("illegal UTF-8 string representation")]
  IllegalString,

  #[error("underlying I/O layer error: {message}")]
  Io { kind: std::io::ErrorKind, message: String },
}

/// ストリームの終端は読み出し側で `BufferTooShort` として検出するため、ここではすべて I/O エラーとして扱います。
impl From<std::io::Error> for Error {
  fn from(err: std::io::Error) -> Error {
    Error::Io { kind: err.kind(), message: err.to_string() }
  }
}

impl From<std::string::FromUtf8Error> for Error {
  fn from(_: std::string::FromUtf8Error) -> Error {
    Error::IllegalString
  }
}
