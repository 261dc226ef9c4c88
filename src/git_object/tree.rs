use super::{space_position, zero_position};
use crate::{Error, Result, Sha1Hash, SHA1_HASH_SIZE};
use std::io::Cursor;

const MODE_DIR: &str = "40000";

/// One `<mode> <name>\0<20-byte-oid>` record of a tree object payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TreeEntry {
    mode: String,
    name: String,
    hash: Sha1Hash,
}

impl TreeEntry {
    fn parse(buf: &[u8]) -> Result<Self> {
        let sp_pos = space_position(buf)
            .ok_or_else(|| Error::CorruptObject("tree entry missing space".into()))?;
        let zero_pos = zero_position(buf)
            .ok_or_else(|| Error::CorruptObject("tree entry missing name terminator".into()))?;
        if sp_pos >= zero_pos {
            return Err(Error::CorruptObject("tree entry mode runs into name".into()));
        }

        let mode = std::str::from_utf8(&buf[..sp_pos])
            .map_err(|_| Error::CorruptObject("tree entry mode is not utf-8".into()))?
            .to_string();
        let name = String::from_utf8_lossy(&buf[(sp_pos + 1)..zero_pos]).to_string();
        let hash = Sha1Hash::try_from(&buf[(zero_pos + 1)..])
            .map_err(|_| Error::CorruptObject("tree entry oid is not 20 bytes".into()))?;

        Ok(Self { mode, name, hash })
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn hash(&self) -> &Sha1Hash {
        &self.hash
    }

    pub(crate) fn is_dir(&self) -> bool {
        self.mode == MODE_DIR
    }
}

/// Iterates the entries of a tree object payload.
#[derive(Debug)]
pub(crate) struct TreeRecords<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> TreeRecords<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(bytes),
        }
    }
}

impl Iterator for TreeRecords<'_> {
    type Item = Result<TreeEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.cursor.position() as usize;
        let bytes = *self.cursor.get_ref();
        if current >= bytes.len() {
            return None;
        }

        let remaining = &bytes[current..];
        let Some(zero_pos) = zero_position(remaining) else {
            return Some(Err(Error::CorruptObject(
                "tree entry missing name terminator".into(),
            )));
        };
        let entry_size = zero_pos + 1 + SHA1_HASH_SIZE;
        if remaining.len() < entry_size {
            return Some(Err(Error::CorruptObject("tree entry truncated".into())));
        }

        self.cursor.set_position((current + entry_size) as u64);
        Some(TreeEntry::parse(&remaining[..entry_size]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_parses_file_entry() {
        let bytes = b"100644 file1\x0011111111111111111111";
        let entry = TreeEntry::parse(bytes).unwrap();
        assert_eq!(entry.name(), "file1");
        assert_eq!(entry.hash(), &Sha1Hash::from([b'1'; 20]));
        assert!(!entry.is_dir());
    }

    #[test]
    fn it_parses_dir_entry() {
        let bytes = b"40000 dir1\x0099999999999999999999";
        let entry = TreeEntry::parse(bytes).unwrap();
        assert_eq!(entry.name(), "dir1");
        assert!(entry.is_dir());
    }

    #[test]
    fn it_iterates_tree_records() {
        let bytes = b"100644 file1\x001111111111111111111140000 dir1\x0099999999999999999999";
        let mut records = TreeRecords::new(&bytes[..]);

        let entry = records.next().unwrap().unwrap();
        assert_eq!(entry.name(), "file1");

        let entry = records.next().unwrap().unwrap();
        assert_eq!(entry.name(), "dir1");
        assert!(entry.is_dir());

        assert!(records.next().is_none());
    }

    #[test]
    fn it_reports_truncated_records() {
        let mut records = TreeRecords::new(&b"100644 file1\x001111"[..]);
        assert!(records.next().unwrap().is_err());
    }
}
