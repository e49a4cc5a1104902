use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

use byteorder::{ByteOrder, LittleEndian};

use super::error::Error;
use super::Result;

pub use self::game::{
  AddSkillKind, AddSkillMessage, GameMessage, LookSkillKind, LookSkillMessage, RemoveSkillMessage, SkillMessage,
  SkillMessageKind, SystemTextMessage,
};
pub use self::lookup::StringDictionary;
pub use self::skill::SkillInfo;

pub mod game;
pub mod lookup;
pub mod skill;


/// シリアライズした 1 メッセージの最大バイナリ長です。IPv4 のデータ部最大長である 65,507 を表します。
pub const MAX_MESSAGE_SIZE: usize = 65507;

/// メッセージに直接埋め込むことのできる文字列の最大バイト長です。ヘッダと長さプレフィクスを含めて
/// `MAX_MESSAGE_SIZE` に収まる値を表しています。
pub const MAX_STRING_LENGTH: usize = MAX_MESSAGE_SIZE - MessageHeader::LENGTH - 2;

/// バイナリ表現への変換と復元を行うことのできるエンティティが実装するトレイトです。ヘッダ、複合ペイロード、
/// メッセージのいずれもこのトレイトを実装し、`byte_length()` と `write_to()` が書き込むバイト数、
/// `read_from()` が消費するバイト数は常に一致します。
pub trait ByteSerializable {
  /// 現在のフィールド値をシリアライズしたときのバイト長を返します。
  fn byte_length(&self) -> usize;

  /// `buf` の `offset` 位置からこのエンティティをシリアライズし、書き込んだバイト数を返します。`buf` の長さは
  /// 変更しません。`offset` 以降に `byte_length()` バイトの領域がない場合は何も書き込まずに
  /// `Error::CallerBufferTooSmall` を返します。
  fn write_to(&self, buf: &mut [u8], offset: usize) -> Result<usize>;

  /// `buf` の `offset` 位置からフィールドを復元してこのエンティティの状態を置き換え、消費したバイト数を返します。
  /// 文字列参照は `lookup` で解決されます。ただし辞書を保持しているメッセージは自身の辞書で解決します。エラーが
  /// 発生した場合、このエンティティの状態は変更されません。
  fn read_from(&mut self, lookup: &StringDictionary, buf: &[u8], offset: usize) -> Result<usize>;

  /// `byte_length()` ちょうどの長さを持つバッファを確保してシリアライズします。
  fn to_bytes(&self) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; self.byte_length()];
    let length = self.write_to(&mut buf, 0)?;
    debug_assert_eq!(length, buf.len());
    Ok(buf)
  }
}

/// ゲームモードのメッセージ種別を表す 1 バイトのタグです。
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
  /// スキルの詳細表示
  LookSkill = 7,
  /// スキルの習得
  AddSkill = 8,
  /// スキルの喪失
  RemoveSkill = 9,
  /// サーバからのテキスト通知
  SystemText = 10,
}

impl MessageType {
  /// `buf` の `offset` 位置にあるタグを消費せずに参照します。タグを先に確認してからメッセージ全体を復元する
  /// ディスパッチのために使用します。
  pub fn peek(buf: &[u8], offset: usize) -> Result<MessageType> {
    MessageType::try_from(read_u8(buf, offset)?)
  }
}

impl From<MessageType> for u8 {
  fn from(value: MessageType) -> u8 {
    value as u8
  }
}

impl TryFrom<u8> for MessageType {
  type Error = Error;
  fn try_from(value: u8) -> Result<Self> {
    match value {
      7 => Ok(MessageType::LookSkill),
      8 => Ok(MessageType::AddSkill),
      9 => Ok(MessageType::RemoveSkill),
      10 => Ok(MessageType::SystemText),
      unexpected => Err(Error::UnknownMessageType { value: unexpected }),
    }
  }
}

impl Display for MessageType {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let name = match self {
      MessageType::LookSkill => "LookSkill",
      MessageType::AddSkill => "AddSkill",
      MessageType::RemoveSkill => "RemoveSkill",
      MessageType::SystemText => "SystemText",
    };
    write!(f, "{}", name)
  }
}

/// ゲームモードのメッセージに共通するヘッダです。メッセージ種別のタグは常に先頭に書き込まれます。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
  message_type: MessageType,
}

impl MessageHeader {
  /// ヘッダのバイト長です。
  pub const LENGTH: usize = 1;

  pub fn new(message_type: MessageType) -> MessageHeader {
    MessageHeader { message_type }
  }

  pub fn message_type(&self) -> MessageType {
    self.message_type
  }

  /// `buf` の `offset` 位置からヘッダを復元します。
  pub fn from_bytes(buf: &[u8], offset: usize) -> Result<MessageHeader> {
    Ok(MessageHeader { message_type: MessageType::try_from(read_u8(buf, offset)?)? })
  }

  /// ヘッダを復元し、そのタグが `expected` であることを確認します。
  pub(crate) fn from_bytes_expecting(buf: &[u8], offset: usize, expected: MessageType) -> Result<MessageHeader> {
    let header = MessageHeader::from_bytes(buf, offset)?;
    if header.message_type != expected {
      Err(Error::UnexpectedMessageType { expected, actual: header.message_type })
    } else {
      Ok(header)
    }
  }
}

impl ByteSerializable for MessageHeader {
  fn byte_length(&self) -> usize {
    MessageHeader::LENGTH
  }

  fn write_to(&self, buf: &mut [u8], offset: usize) -> Result<usize> {
    ensure_capacity(buf, offset, self.byte_length())?;
    Ok(write_u8(buf, offset, self.message_type.into()))
  }

  fn read_from(&mut self, _lookup: &StringDictionary, buf: &[u8], offset: usize) -> Result<usize> {
    *self = MessageHeader::from_bytes(buf, offset)?;
    Ok(MessageHeader::LENGTH)
  }
}

/// `offset` 以降に `required` バイトを書き込める領域があることを確認します。
#[inline]
pub(crate) fn ensure_capacity(buf: &[u8], offset: usize, required: usize) -> Result<()> {
  let available = buf.len().saturating_sub(offset);
  if available < required {
    Err(Error::CallerBufferTooSmall { required, available })
  } else {
    Ok(())
  }
}

/// `offset` 以降に `required` バイトが読み出せることを確認します。
#[inline]
pub(crate) fn ensure_remaining(buf: &[u8], offset: usize, required: usize) -> Result<()> {
  let remaining = buf.len().saturating_sub(offset);
  if remaining < required {
    Err(Error::BufferTooShort { required, remaining })
  } else {
    Ok(())
  }
}

#[inline]
pub(crate) fn write_u8(buf: &mut [u8], offset: usize, value: u8) -> usize {
  buf[offset] = value;
  1
}

#[inline]
pub(crate) fn read_u8(buf: &[u8], offset: usize) -> Result<u8> {
  ensure_remaining(buf, offset, 1)?;
  Ok(buf[offset])
}

#[inline]
pub(crate) fn write_u16(buf: &mut [u8], offset: usize, value: u16) -> usize {
  LittleEndian::write_u16(&mut buf[offset..], value);
  2
}

#[inline]
pub(crate) fn read_u16(buf: &[u8], offset: usize) -> Result<u16> {
  ensure_remaining(buf, offset, 2)?;
  Ok(LittleEndian::read_u16(&buf[offset..]))
}

/// 長さプレフィクス付き文字列のバイト長です。
#[inline]
pub(crate) fn string_length(value: &str) -> usize {
  2 + value.len()
}

/// 文字列を 2 バイトの長さと UTF-8 バイト列として書き込みます。長さは呼び出し側で `MAX_STRING_LENGTH` 以下で
/// あることを保証しなければなりません。
#[inline]
pub(crate) fn write_string(buf: &mut [u8], offset: usize, value: &str) -> usize {
  debug_assert!(value.len() <= MAX_STRING_LENGTH);
  let bytes = value.as_bytes();
  let prefix = write_u16(buf, offset, bytes.len() as u16);
  buf[offset + prefix..offset + prefix + bytes.len()].copy_from_slice(bytes);
  prefix + bytes.len()
}

/// 長さプレフィクス付き文字列を読み出し、文字列と消費したバイト数を返します。
#[inline]
pub(crate) fn read_string(buf: &[u8], offset: usize) -> Result<(String, usize)> {
  let length = read_u16(buf, offset)? as usize;
  ensure_remaining(buf, offset + 2, length)?;
  let text = String::from_utf8(buf[offset + 2..offset + 2 + length].to_vec())?;
  Ok((text, 2 + length))
}

/// 埋め込み文字列の長さが上限以内であることを確認します。
#[inline]
pub(crate) fn verify_string_length(value: &str) -> Result<()> {
  if value.len() > MAX_STRING_LENGTH {
    Err(Error::StringTooLong { length: value.len(), maximum: MAX_STRING_LENGTH })
  } else {
    Ok(())
  }
}
