use std::collections::btree_map::{BTreeMap, Entry};
use std::io::{Read, Write};
use std::iter::FromIterator;

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

use crate::error::Error;
use crate::msg::verify_string_length;
use crate::Result;

#[cfg(test)]
mod test;

/// セッション単位で共有される、整数 ID から文字列を引くための辞書です。メッセージは繰り返し現れる文字列を
/// 送信する代わりにこの辞書の ID を参照します。
///
/// 辞書はセッションによって構築され、メッセージの復元からは読み取り専用の参照として借用されます。項目の追加は
/// 追記のみで、既存の ID の文字列を変更することはできません。構築が完了した辞書は複数スレッドから同時に参照
/// することができますが、辞書自体は内部で同期を行いません。
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StringDictionary {
  entries: BTreeMap<u32, String>,
}

impl StringDictionary {
  pub fn new() -> StringDictionary {
    StringDictionary { entries: BTreeMap::new() }
  }

  /// 指定された ID の文字列を参照します。ID が登録されていない場合は `Error::UnresolvedReference` を返します。
  pub fn resolve(&self, id: u32) -> Result<&str> {
    self.entries.get(&id).map(|text| text.as_str()).ok_or(Error::UnresolvedReference { id })
  }

  pub fn contains(&self, id: u32) -> bool {
    self.entries.contains_key(&id)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// ID の昇順で全項目を参照します。
  pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
    self.entries.iter().map(|(id, text)| (*id, text.as_str()))
  }

  /// 辞書に文字列を追加します。同じ ID に同じ文字列を追加した場合は何もしません。異なる文字列が既に登録されて
  /// いる場合は `Error::DuplicateReference`、バイト長が `MAX_STRING_LENGTH` を超える場合は `Error::StringTooLong`
  /// を返します。
  pub fn insert<S: Into<String>>(&mut self, id: u32, text: S) -> Result<()> {
    let text = text.into();
    verify_string_length(&text)?;
    match self.entries.entry(id) {
      Entry::Vacant(entry) => {
        entry.insert(text);
        Ok(())
      }
      Entry::Occupied(entry) if *entry.get() == text => Ok(()),
      Entry::Occupied(_) => Err(Error::DuplicateReference { id }),
    }
  }

  /// リソース形式で辞書を書き出します。項目数 (u32) に続いて各項目の ID (u32)、バイト長 (u16)、UTF-8 バイト列
  /// が ID の昇順に並びます。書き出せない項目が含まれている場合は何も書き出さずにエラーを返します。
  pub fn write_resources<W: Write>(&self, buf: &mut W) -> Result<()> {
    for text in self.entries.values() {
      verify_string_length(text)?;
    }
    write_u32(buf, self.entries.len() as u32)?;
    for (id, text) in self.entries.iter() {
      write_u32(buf, *id)?;
      write_u16(buf, text.len() as u16)?;
      buf.write_all(text.as_bytes())?;
    }
    Ok(())
  }

  /// リソース形式で書き出された辞書を読み込みます。
  pub fn read_resources<R: Read>(buf: &mut R) -> Result<StringDictionary> {
    let count = read_u32(buf)?;
    let mut dictionary = StringDictionary::new();
    for _ in 0..count {
      let id = read_u32(buf)?;
      let length = read_u16(buf)? as usize;
      let bytes = read_bytes(buf, length)?;
      dictionary.insert(id, String::from_utf8(bytes)?)?;
    }
    log::debug!("{} string resources loaded", dictionary.len());
    Ok(dictionary)
  }
}

/// 同じ ID が複数回現れた場合は後の文字列が採用されます。文字列の長さは検査しないため、上限を超える項目は
/// `write_resources()` で拒否されます。
impl FromIterator<(u32, String)> for StringDictionary {
  fn from_iter<I: IntoIterator<Item = (u32, String)>>(iter: I) -> Self {
    StringDictionary { entries: iter.into_iter().collect() }
  }
}

#[inline]
fn write_u16<W: Write>(buf: &mut W, value: u16) -> Result<()> {
  buf.write_u16::<LittleEndian>(value).map_err(Error::from)
}

#[inline]
fn read_u16<R: Read>(buf: &mut R) -> Result<u16> {
  Ok(LittleEndian::read_u16(&read_bytes(buf, 2)?))
}

#[inline]
fn write_u32<W: Write>(buf: &mut W, value: u32) -> Result<()> {
  buf.write_u32::<LittleEndian>(value).map_err(Error::from)
}

#[inline]
fn read_u32<R: Read>(buf: &mut R) -> Result<u32> {
  Ok(LittleEndian::read_u32(&read_bytes(buf, 4)?))
}

/// `required` バイトを読み出します。ストリームが途中で終端した場合は実際に読み出せたバイト数とともに
/// `Error::BufferTooShort` を返します。
fn read_bytes<R: Read>(buf: &mut R, required: usize) -> Result<Vec<u8>> {
  let mut bytes = Vec::with_capacity(required);
  let remaining = buf.by_ref().take(required as u64).read_to_end(&mut bytes)?;
  if remaining < required {
    Err(Error::BufferTooShort { required, remaining })
  } else {
    Ok(bytes)
  }
}
