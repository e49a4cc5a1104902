use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;

use crate::msg::{
  ensure_capacity, read_string, read_u16, string_length, verify_string_length, write_string, write_u16,
  ByteSerializable, MessageHeader, MessageType, SkillInfo, StringDictionary,
};
use crate::Result;


/// `SkillMessage` の種別を決めるマーカー型が実装するトレイトです。
pub trait SkillMessageKind {
  const MESSAGE_TYPE: MessageType;
}

/// スキルの詳細表示を示す種別です。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookSkillKind {}

impl SkillMessageKind for LookSkillKind {
  const MESSAGE_TYPE: MessageType = MessageType::LookSkill;
}

/// 新しいスキルの習得を示す種別です。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddSkillKind {}

impl SkillMessageKind for AddSkillKind {
  const MESSAGE_TYPE: MessageType = MessageType::AddSkill;
}

/// スキルの詳細表示を示すメッセージ。
pub type LookSkillMessage<'d> = SkillMessage<'d, LookSkillKind>;

/// 新しいスキルを習得したことを示すメッセージ。
pub type AddSkillMessage<'d> = SkillMessage<'d, AddSkillKind>;

/// ヘッダと SkillInfo から構成されるメッセージです。タグは種別 `K` によって決まります。
///
/// ```text
/// [header: 1][SkillInfo: 4]
/// ```
///
/// スキル名を再度参照できるように、構築に使用した辞書への参照を保持します。復元時のスキル名の ID もこの辞書で
/// 解決されます。辞書の所有権はセッションにあり、このメッセージが辞書を変更することはありません。
pub struct SkillMessage<'d, K: SkillMessageKind> {
  header: MessageHeader,
  skill_info: SkillInfo,
  lookup: &'d StringDictionary,
  kind: PhantomData<K>,
}

impl<'d, K: SkillMessageKind> SkillMessage<'d, K> {
  /// 送信するメッセージを構築します。
  pub fn new(skill_info: SkillInfo, lookup: &'d StringDictionary) -> SkillMessage<'d, K> {
    SkillMessage { header: MessageHeader::new(K::MESSAGE_TYPE), skill_info, lookup, kind: PhantomData }
  }

  /// `buf` の `offset` 位置から受信したメッセージを復元します。
  pub fn from_bytes(lookup: &'d StringDictionary, buf: &[u8], offset: usize) -> Result<SkillMessage<'d, K>> {
    let mut msg = SkillMessage::new(SkillInfo::default(), lookup);
    msg.read_from(lookup, buf, offset)?;
    Ok(msg)
  }

  pub fn message_type(&self) -> MessageType {
    self.header.message_type()
  }

  pub fn skill_info(&self) -> &SkillInfo {
    &self.skill_info
  }

  pub fn set_skill_info(&mut self, skill_info: SkillInfo) {
    self.skill_info = skill_info;
  }

  pub fn lookup(&self) -> &'d StringDictionary {
    self.lookup
  }

  /// スキル名を保持している辞書から参照します。
  pub fn skill_name(&self) -> Result<&'d str> {
    self.skill_info.name(self.lookup)
  }
}

impl<'d, K: SkillMessageKind> ByteSerializable for SkillMessage<'d, K> {
  fn byte_length(&self) -> usize {
    self.header.byte_length() + self.skill_info.byte_length()
  }

  fn write_to(&self, buf: &mut [u8], offset: usize) -> Result<usize> {
    ensure_capacity(buf, offset, self.byte_length())?;
    let mut cursor = offset;
    cursor += self.header.write_to(buf, cursor)?;
    cursor += self.skill_info.write_to(buf, cursor)?;
    Ok(cursor - offset)
  }

  /// スキル名の ID は引数の辞書ではなく、このメッセージが保持している辞書で解決します。
  fn read_from(&mut self, _lookup: &StringDictionary, buf: &[u8], offset: usize) -> Result<usize> {
    let mut cursor = offset;
    let header = MessageHeader::from_bytes_expecting(buf, cursor, K::MESSAGE_TYPE)?;
    cursor += header.byte_length();
    let skill_info = SkillInfo::from_bytes(self.lookup, buf, cursor)?;
    cursor += skill_info.byte_length();
    self.skill_info = skill_info;
    Ok(cursor - offset)
  }
}

impl<'d, K: SkillMessageKind> Clone for SkillMessage<'d, K> {
  fn clone(&self) -> Self {
    SkillMessage { header: self.header, skill_info: self.skill_info, lookup: self.lookup, kind: PhantomData }
  }
}

impl<'d, K: SkillMessageKind> PartialEq for SkillMessage<'d, K> {
  fn eq(&self, other: &Self) -> bool {
    self.header == other.header && self.skill_info == other.skill_info
  }
}

impl<'d, K: SkillMessageKind> Debug for SkillMessage<'d, K> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SkillMessage").field("header", &self.header).field("skill_info", &self.skill_info).finish()
  }
}

/// スキルを失ったことを示すメッセージです。
///
/// ```text
/// [header: 1][skill_id: u16 LE]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveSkillMessage {
  header: MessageHeader,
  skill_id: u16,
}

impl RemoveSkillMessage {
  pub fn new(skill_id: u16) -> RemoveSkillMessage {
    RemoveSkillMessage { header: MessageHeader::new(MessageType::RemoveSkill), skill_id }
  }

  pub fn from_bytes(buf: &[u8], offset: usize) -> Result<RemoveSkillMessage> {
    let header = MessageHeader::from_bytes_expecting(buf, offset, MessageType::RemoveSkill)?;
    let skill_id = read_u16(buf, offset + header.byte_length())?;
    Ok(RemoveSkillMessage { header, skill_id })
  }

  pub fn message_type(&self) -> MessageType {
    self.header.message_type()
  }

  pub fn skill_id(&self) -> u16 {
    self.skill_id
  }

  pub fn set_skill_id(&mut self, skill_id: u16) {
    self.skill_id = skill_id;
  }
}

impl ByteSerializable for RemoveSkillMessage {
  fn byte_length(&self) -> usize {
    self.header.byte_length() + 2
  }

  fn write_to(&self, buf: &mut [u8], offset: usize) -> Result<usize> {
    ensure_capacity(buf, offset, self.byte_length())?;
    let mut cursor = offset;
    cursor += self.header.write_to(buf, cursor)?;
    cursor += write_u16(buf, cursor, self.skill_id);
    Ok(cursor - offset)
  }

  fn read_from(&mut self, _lookup: &StringDictionary, buf: &[u8], offset: usize) -> Result<usize> {
    *self = RemoveSkillMessage::from_bytes(buf, offset)?;
    Ok(self.byte_length())
  }
}

/// サーバからのテキスト通知です。辞書を参照せず、文字列をメッセージに直接埋め込みます。
///
/// ```text
/// [header: 1][length: u16 LE][text: UTF-8]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemTextMessage {
  header: MessageHeader,
  text: String,
}

impl SystemTextMessage {
  /// テキストのバイト長が `MAX_STRING_LENGTH` を超える場合は `Error::StringTooLong` を返します。
  pub fn new<S: Into<String>>(text: S) -> Result<SystemTextMessage> {
    let text = text.into();
    verify_string_length(&text)?;
    Ok(SystemTextMessage { header: MessageHeader::new(MessageType::SystemText), text })
  }

  pub fn from_bytes(buf: &[u8], offset: usize) -> Result<SystemTextMessage> {
    let header = MessageHeader::from_bytes_expecting(buf, offset, MessageType::SystemText)?;
    let (text, _) = read_string(buf, offset + header.byte_length())?;
    verify_string_length(&text)?;
    Ok(SystemTextMessage { header, text })
  }

  pub fn message_type(&self) -> MessageType {
    self.header.message_type()
  }

  pub fn text(&self) -> &str {
    &self.text
  }

  pub fn set_text<S: Into<String>>(&mut self, text: S) -> Result<()> {
    let text = text.into();
    verify_string_length(&text)?;
    self.text = text;
    Ok(())
  }
}

impl ByteSerializable for SystemTextMessage {
  fn byte_length(&self) -> usize {
    self.header.byte_length() + string_length(&self.text)
  }

  fn write_to(&self, buf: &mut [u8], offset: usize) -> Result<usize> {
    ensure_capacity(buf, offset, self.byte_length())?;
    let mut cursor = offset;
    cursor += self.header.write_to(buf, cursor)?;
    cursor += write_string(buf, cursor, &self.text);
    Ok(cursor - offset)
  }

  fn read_from(&mut self, _lookup: &StringDictionary, buf: &[u8], offset: usize) -> Result<usize> {
    *self = SystemTextMessage::from_bytes(buf, offset)?;
    Ok(self.byte_length())
  }
}

/// ゲームモードのメッセージのいずれかを表す列挙型です。先頭のタグから対応するメッセージを選択して復元します。
#[derive(Debug, Clone, PartialEq)]
pub enum GameMessage<'d> {
  LookSkill(LookSkillMessage<'d>),
  AddSkill(AddSkillMessage<'d>),
  RemoveSkill(RemoveSkillMessage),
  SystemText(SystemTextMessage),
}

impl<'d> GameMessage<'d> {
  /// `buf` の `offset` 位置にあるタグを参照し、対応するメッセージとして復元します。
  pub fn decode(lookup: &'d StringDictionary, buf: &[u8], offset: usize) -> Result<GameMessage<'d>> {
    let message_type = MessageType::peek(buf, offset).map_err(|err| {
      log::warn!("failed to read message type at offset {}: {}", offset, err);
      err
    })?;
    let decoded = match message_type {
      MessageType::LookSkill => LookSkillMessage::from_bytes(lookup, buf, offset).map(GameMessage::LookSkill),
      MessageType::AddSkill => AddSkillMessage::from_bytes(lookup, buf, offset).map(GameMessage::AddSkill),
      MessageType::RemoveSkill => RemoveSkillMessage::from_bytes(buf, offset).map(GameMessage::RemoveSkill),
      MessageType::SystemText => SystemTextMessage::from_bytes(buf, offset).map(GameMessage::SystemText),
    };
    match &decoded {
      Ok(msg) => log::trace!("{} decoded: offset={}, length={}", message_type, offset, msg.byte_length()),
      Err(err) => log::warn!("failed to decode {} at offset {}: {}", message_type, offset, err),
    }
    decoded
  }

  /// `buf` に連続して格納されているメッセージをすべて復元します。いずれかの復元に失敗した場合、それ以降の
  /// 位置を特定できないためその時点でエラーを返します。
  pub fn decode_all(lookup: &'d StringDictionary, buf: &[u8]) -> Result<Vec<GameMessage<'d>>> {
    let mut messages = Vec::new();
    let mut cursor = 0;
    while cursor < buf.len() {
      let msg = GameMessage::decode(lookup, buf, cursor)?;
      cursor += msg.byte_length();
      messages.push(msg);
    }
    Ok(messages)
  }

  pub fn message_type(&self) -> MessageType {
    match self {
      GameMessage::LookSkill(msg) => msg.message_type(),
      GameMessage::AddSkill(msg) => msg.message_type(),
      GameMessage::RemoveSkill(msg) => msg.message_type(),
      GameMessage::SystemText(msg) => msg.message_type(),
    }
  }

  fn as_serializable(&self) -> &dyn ByteSerializable {
    match self {
      GameMessage::LookSkill(msg) => msg,
      GameMessage::AddSkill(msg) => msg,
      GameMessage::RemoveSkill(msg) => msg,
      GameMessage::SystemText(msg) => msg,
    }
  }

  pub fn byte_length(&self) -> usize {
    self.as_serializable().byte_length()
  }

  pub fn write_to(&self, buf: &mut [u8], offset: usize) -> Result<usize> {
    self.as_serializable().write_to(buf, offset)
  }

  pub fn to_bytes(&self) -> Result<Vec<u8>> {
    self.as_serializable().to_bytes()
  }
}
