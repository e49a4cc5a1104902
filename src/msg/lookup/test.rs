use std::io::Cursor;

use crate::error::Error;
use crate::msg::lookup::StringDictionary;
use crate::msg::MAX_STRING_LENGTH;
use crate::test::{init_logging, SampleValues};

#[test]
fn test_resolve() {
  let mut lookup = StringDictionary::new();
  assert!(lookup.is_empty());
  lookup.insert(3, "Fireball").unwrap();
  lookup.insert(0, "").unwrap();

  assert_eq!("Fireball", lookup.resolve(3).unwrap());
  assert_eq!("", lookup.resolve(0).unwrap());
  assert!(lookup.contains(3));
  assert_eq!(2, lookup.len());

  // 未登録の ID は既定値を返さずにエラーとなる
  assert!(!lookup.contains(4));
  assert_eq!(Err(Error::UnresolvedReference { id: 4 }), lookup.resolve(4));
  assert_eq!(Err(Error::UnresolvedReference { id: u32::MAX }), lookup.resolve(u32::MAX));
}

#[test]
fn test_insert_is_append_only() {
  let mut lookup = StringDictionary::new();
  lookup.insert(10, "Heal").unwrap();

  // 同じ内容の再登録は許可される
  assert_eq!(Ok(()), lookup.insert(10, "Heal"));

  // 既存の文字列は変更できない
  assert_eq!(Err(Error::DuplicateReference { id: 10 }), lookup.insert(10, "Harm"));
  assert_eq!("Heal", lookup.resolve(10).unwrap());
}

#[test]
fn test_iter_ordered_by_id() {
  let lookup: StringDictionary =
    vec![(30u32, "c".to_string()), (10, "a".to_string()), (20, "b".to_string())].into_iter().collect();
  let ids = lookup.iter().map(|(id, _)| id).collect::<Vec<_>>();
  assert_eq!(vec![10, 20, 30], ids);
  assert_eq!(Some((10, "a")), lookup.iter().next());
}

#[test]
fn test_resources() {
  init_logging();
  let mut sample = SampleValues::new(8803461203u64);
  let mut lookup = StringDictionary::new();
  for _ in 0..100 {
    let id = sample.next_u32();
    let length = (sample.next_u8() % 64) as usize;
    lookup.insert(id, sample.next_string(length)).unwrap();
  }
  lookup.insert(7, "アイスボルト").unwrap();

  let mut buf = Vec::new();
  lookup.write_resources(&mut buf).unwrap();
  let restored = StringDictionary::read_resources(&mut Cursor::new(&buf)).unwrap();
  assert_eq!(lookup, restored);

  // 途中で途切れたリソース
  let truncated = &buf[..buf.len() - 1];
  assert!(matches!(
    StringDictionary::read_resources(&mut Cursor::new(truncated)),
    Err(Error::BufferTooShort { .. })
  ));
}

#[test]
fn test_resources_layout() {
  let mut lookup = StringDictionary::new();
  lookup.insert(3, "Fireball").unwrap();

  let mut buf = Vec::new();
  lookup.write_resources(&mut buf).unwrap();
  let mut expected = vec![1u8, 0, 0, 0, 3, 0, 0, 0, 8, 0];
  expected.extend_from_slice(b"Fireball");
  assert_eq!(expected, buf);

  // 同じ ID に異なる文字列が含まれている
  let duplicated = vec![2u8, 0, 0, 0, 3, 0, 0, 0, 1, 0, b'a', 3, 0, 0, 0, 1, 0, b'b'];
  assert_eq!(
    Err(Error::DuplicateReference { id: 3 }),
    StringDictionary::read_resources(&mut Cursor::new(&duplicated))
  );
}

#[test]
fn test_concurrent_resolve() {
  let lookup: StringDictionary = (0u32..1000).map(|id| (id, format!("text-{}", id))).collect();
  let lookup = &lookup;
  std::thread::scope(|scope| {
    let handles = (0..4)
      .map(|_| scope.spawn(move || (0u32..1000).map(|id| lookup.resolve(id).unwrap().to_string()).collect::<Vec<_>>()))
      .collect::<Vec<_>>();
    let expected = (0u32..1000).map(|id| format!("text-{}", id)).collect::<Vec<_>>();
    for handle in handles {
      assert_eq!(expected, handle.join().unwrap());
    }
  });
}

#[test]
fn test_insert_rejects_too_long() {
  let mut lookup = StringDictionary::new();
  let too_long = "x".repeat(MAX_STRING_LENGTH + 1);
  assert_eq!(
    Err(Error::StringTooLong { length: MAX_STRING_LENGTH + 1, maximum: MAX_STRING_LENGTH }),
    lookup.insert(2, too_long)
  );
  assert!(!lookup.contains(2));
  assert!(lookup.insert(2, "x".repeat(MAX_STRING_LENGTH)).is_ok());
}

#[test]
fn test_write_resources_is_all_or_nothing() {
  let lookup: StringDictionary =
    vec![(1u32, "ok".to_string()), (2, "x".repeat(MAX_STRING_LENGTH + 10))].into_iter().collect();

  // 書き出せない項目があれば先頭の項目数も書き出さない
  let mut buf = Vec::new();
  assert_eq!(
    Err(Error::StringTooLong { length: MAX_STRING_LENGTH + 10, maximum: MAX_STRING_LENGTH }),
    lookup.write_resources(&mut buf)
  );
  assert!(buf.is_empty());
}

#[test]
fn test_read_resources_reports_missing_length() {
  let mut lookup = StringDictionary::new();
  lookup.insert(3, "Fireball").unwrap();
  let mut buf = Vec::new();
  lookup.write_resources(&mut buf).unwrap();

  // 文字列の途中で途切れている
  let truncated = &buf[..buf.len() - 1];
  assert_eq!(
    Err(Error::BufferTooShort { required: 8, remaining: 7 }),
    StringDictionary::read_resources(&mut Cursor::new(truncated))
  );

  // ID の途中で途切れている
  assert_eq!(
    Err(Error::BufferTooShort { required: 4, remaining: 2 }),
    StringDictionary::read_resources(&mut Cursor::new(&buf[..6]))
  );

  assert_eq!(
    Err(Error::BufferTooShort { required: 4, remaining: 0 }),
    StringDictionary::read_resources(&mut Cursor::new(&[] as &[u8]))
  );
}
