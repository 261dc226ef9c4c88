use super::delta::RefDelta;
use super::varint;
use crate::{Error, GitObject, ObjectKind, Result, Sha1Hash, SHA1_HASH_SIZE};
use flate2::read::ZlibDecoder;
use std::io::{Cursor, Read};
use std::path::Path;

const MAGIC: &[u8] = b"PACK";
const VERSION: u32 = 2;
const HEADER_SIZE: usize = 12;
const TRAILER_SIZE: usize = SHA1_HASH_SIZE;

/// Compares the trailing 20 bytes against the SHA-1 of everything before
/// them.
pub(crate) fn verify_checksum(pack: &[u8]) -> Result<()> {
    if pack.len() < TRAILER_SIZE {
        return Err(Error::CorruptPack(
            "pack shorter than its checksum trailer".into(),
        ));
    }
    let (body, trailer) = pack.split_at(pack.len() - TRAILER_SIZE);
    if Sha1Hash::digest(body).as_bytes() != trailer {
        return Err(Error::ChecksumMismatch);
    }
    Ok(())
}

/// A verified packfile positioned at its first object record.
#[derive(Debug)]
pub struct PackFile {
    count: u32,
    cursor: Cursor<Vec<u8>>,
}

/// What a full scan of the pack produced: ids of the full objects now in
/// the store, plus the delta records still waiting on their bases.
#[derive(Debug)]
pub struct Unpacked {
    pub written: Vec<Sha1Hash>,
    pub deltas: Vec<RefDelta>,
}

enum Record {
    Full { kind: ObjectKind, data: Vec<u8> },
    Delta(RefDelta),
}

impl PackFile {
    /// Validates the envelope: length, magic, trailing checksum, version.
    /// The returned value holds only the object records.
    pub fn parse(bytes: Vec<u8>) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(Error::CorruptPack(format!(
                "pack is only {} bytes",
                bytes.len()
            )));
        }
        if &bytes[..4] != MAGIC {
            return Err(Error::CorruptPack("missing PACK magic".into()));
        }
        verify_checksum(&bytes)?;

        let version = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        if version != VERSION {
            return Err(Error::CorruptPack(format!(
                "unsupported pack version {version}"
            )));
        }
        if bytes.len() < HEADER_SIZE + TRAILER_SIZE {
            return Err(Error::CorruptPack(
                "pack trailer overlaps its header".into(),
            ));
        }

        let count = u32::from_be_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
        let body = bytes[HEADER_SIZE..bytes.len() - TRAILER_SIZE].to_vec();

        Ok(Self {
            count,
            cursor: Cursor::new(body),
        })
    }

    pub fn object_count(&self) -> u32 {
        self.count
    }

    /// Walks every record. Full objects go straight into the store; delta
    /// records come back unresolved, in pack order.
    pub fn unpack(mut self, root: &Path) -> Result<Unpacked> {
        let mut written = vec![];
        let mut deltas = vec![];

        for _ in 0..self.count {
            match self.read_record()? {
                Record::Full { kind, data } => {
                    written.push(GitObject::new(kind, data).write(root)?);
                }
                Record::Delta(record) => deltas.push(record),
            }
        }

        Ok(Unpacked { written, deltas })
    }

    fn read_record(&mut self) -> Result<Record> {
        let first = *self
            .remaining()
            .first()
            .ok_or_else(|| Error::CorruptPack("unexpected end of pack".into()))?;

        match (first >> 4) & 0b111 {
            bits @ (0 | 5) => Err(Error::CorruptPack(format!(
                "bad object type {bits} in pack record"
            ))),
            6 => Err(Error::Unsupported("ofs-delta pack records".into())),
            7 => {
                let size = self.read_size()?;
                let base = self.read_base_id()?;
                let data = self.read_payload(size)?;
                Ok(Record::Delta(RefDelta { base, data }))
            }
            bits => {
                let kind = ObjectKind::from_pack_type(bits).ok_or_else(|| {
                    Error::CorruptPack(format!("bad object type {bits} in pack record"))
                })?;
                let size = self.read_size()?;
                let data = self.read_payload(size)?;
                Ok(Record::Full { kind, data })
            }
        }
    }

    fn remaining(&self) -> &[u8] {
        &self.cursor.get_ref()[self.cursor.position() as usize..]
    }

    fn read_size(&mut self) -> Result<i64> {
        let pos = self.cursor.position();
        let (size, used) = varint::decode_obj_size(self.remaining())?;
        self.cursor.set_position(pos + used as u64);
        Ok(size)
    }

    fn read_base_id(&mut self) -> Result<Sha1Hash> {
        let mut buf = [0u8; SHA1_HASH_SIZE];
        self.cursor
            .read_exact(&mut buf)
            .map_err(|_| Error::CorruptPack("unexpected end of pack in delta base id".into()))?;
        Ok(Sha1Hash::from(buf))
    }

    /// Runs the zlib stream to its end and advances the cursor by exactly
    /// the compressed bytes the decoder consumed; the compressed length is
    /// not recorded anywhere in the pack. The advisory size from the record
    /// header must match what came out.
    fn read_payload(&mut self, declared: i64) -> Result<Vec<u8>> {
        let start = self.cursor.position();

        let mut decoder = ZlibDecoder::new(&mut self.cursor);
        let mut data = vec![];
        decoder
            .read_to_end(&mut data)
            .map_err(|err| Error::CorruptPack(format!("zlib stream: {err}")))?;
        let consumed = decoder.total_in();

        self.cursor.set_position(start + consumed);

        if data.len() as i64 != declared {
            return Err(Error::SizeMismatch {
                declared,
                actual: data.len() as i64,
            });
        }
        Ok(data)
    }
}
