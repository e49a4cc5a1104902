use crate::msg::{ensure_capacity, read_u16, write_u16, ByteSerializable, StringDictionary};
use crate::Result;


/// スキルの情報を表す複合ペイロードです。スキル名は文字列そのものではなく辞書の ID として転送されます。
///
/// ```text
/// [skill_id: u16 LE][name_ref: u16 LE]
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SkillInfo {
  /// スキルを識別する ID
  skill_id: u16,
  /// スキル名を示す辞書 ID
  name_ref: u16,
}

impl SkillInfo {
  /// SkillInfo のバイト長です。
  pub const LENGTH: usize = 4;

  pub fn new(skill_id: u16, name_ref: u16) -> SkillInfo {
    SkillInfo { skill_id, name_ref }
  }

  /// `buf` の `offset` 位置から SkillInfo を復元します。スキル名の ID は `lookup` で解決できなければなりません。
  pub fn from_bytes(lookup: &StringDictionary, buf: &[u8], offset: usize) -> Result<SkillInfo> {
    let mut skill_info = SkillInfo::default();
    skill_info.read_from(lookup, buf, offset)?;
    Ok(skill_info)
  }

  pub fn skill_id(&self) -> u16 {
    self.skill_id
  }

  pub fn set_skill_id(&mut self, skill_id: u16) {
    self.skill_id = skill_id;
  }

  pub fn name_ref(&self) -> u16 {
    self.name_ref
  }

  pub fn set_name_ref(&mut self, name_ref: u16) {
    self.name_ref = name_ref;
  }

  /// スキル名を辞書から参照します。
  pub fn name<'d>(&self, lookup: &'d StringDictionary) -> Result<&'d str> {
    lookup.resolve(self.name_ref as u32)
  }
}

impl ByteSerializable for SkillInfo {
  fn byte_length(&self) -> usize {
    SkillInfo::LENGTH
  }

  fn write_to(&self, buf: &mut [u8], offset: usize) -> Result<usize> {
    ensure_capacity(buf, offset, self.byte_length())?;
    let mut cursor = offset;
    cursor += write_u16(buf, cursor, self.skill_id);
    cursor += write_u16(buf, cursor, self.name_ref);
    Ok(cursor - offset)
  }

  fn read_from(&mut self, lookup: &StringDictionary, buf: &[u8], offset: usize) -> Result<usize> {
    let mut cursor = offset;
    let skill_id = read_u16(buf, cursor)?;
    cursor += 2;
    let name_ref = read_u16(buf, cursor)?;
    cursor += 2;

    // 解決できない ID を既定値で置き換えてはならない
    lookup.resolve(name_ref as u32)?;

    self.skill_id = skill_id;
    self.name_ref = name_ref;
    Ok(cursor - offset)
  }
}
