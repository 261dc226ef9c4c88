use super::varint;
use crate::{Error, GitObject, Result, Sha1Hash};
use std::collections::VecDeque;
use std::path::Path;

const MASK_LAST_7: u8 = 0b01111111;
const MASK_MSB: u8 = 0b10000000;

/// A delta record lifted out of a pack: the object it patches, named by id,
/// and the raw delta payload.
#[derive(Debug, Clone, PartialEq)]
pub struct RefDelta {
    pub base: Sha1Hash,
    pub data: Vec<u8>,
}

/// A parsed delta payload: declared base and target sizes plus the
/// copy/insert instruction stream that rebuilds the target from the base.
#[derive(Debug)]
pub struct Delta {
    base_size: i64,
    target_size: i64,
    instructions: Vec<Instruction>,
}

#[derive(Debug, PartialEq)]
enum Instruction {
    Copy { offset: usize, size: usize },
    Insert(Vec<u8>),
}

impl Delta {
    pub fn parse(data: &[u8]) -> Result<Self> {
        let (base_size, used) = varint::decode_delta_size(data)?;
        let mut off = used;
        let (target_size, used) = varint::decode_delta_size(&data[off..])?;
        off += used;

        let mut instructions: Vec<Instruction> = vec![];
        while off < data.len() {
            let op = data[off];
            off += 1;

            if op == 0 {
                return Err(Error::CorruptDelta("reserved zero opcode".into()));
            }
            if op & MASK_MSB != 0 {
                let (inst, used) = copy_instruction(op, &data[off..])?;
                off += used;
                instructions.push(inst);
            } else {
                let len = (op & MASK_LAST_7) as usize;
                let bytes = data.get(off..off + len).ok_or_else(|| {
                    Error::CorruptDelta("insert runs past end of delta".into())
                })?;
                instructions.push(Instruction::Insert(bytes.to_vec()));
                off += len;
            }
        }

        Ok(Self {
            base_size,
            target_size,
            instructions,
        })
    }

    pub fn apply(&self, base: &[u8]) -> Result<Vec<u8>> {
        if base.len() as i64 != self.base_size {
            return Err(Error::CorruptDelta(format!(
                "base is {} bytes but delta declares {}",
                base.len(),
                self.base_size
            )));
        }

        let mut target: Vec<u8> = Vec::with_capacity(self.target_size.max(0) as usize);
        for inst in &self.instructions {
            match inst {
                Instruction::Copy { offset, size } => {
                    let bytes = base.get(*offset..offset + size).ok_or_else(|| {
                        Error::CorruptDelta("copy range outside base object".into())
                    })?;
                    target.extend_from_slice(bytes);
                }
                Instruction::Insert(bytes) => {
                    target.extend_from_slice(bytes);
                }
            }
        }

        if target.len() as i64 != self.target_size {
            return Err(Error::CorruptDelta(format!(
                "target is {} bytes but delta declares {}",
                target.len(),
                self.target_size
            )));
        }
        Ok(target)
    }
}

/// Assembles a copy instruction. The opcode's low four bits select which of
/// the little-endian offset bytes follow, the next three bits select the
/// size bytes. A size of zero means 0x10000.
fn copy_instruction(op: u8, data: &[u8]) -> Result<(Instruction, usize)> {
    let mut used = 0usize;
    let mut offset = 0usize;
    let mut size = 0usize;

    for i in 0..4 {
        if op & (1 << i) != 0 {
            let byte = *data.get(used).ok_or_else(|| {
                Error::CorruptDelta("copy instruction runs past end of delta".into())
            })?;
            offset |= (byte as usize) << (8 * i);
            used += 1;
        }
    }
    for i in 0..3 {
        if op & (0x10 << i) != 0 {
            let byte = *data.get(used).ok_or_else(|| {
                Error::CorruptDelta("copy instruction runs past end of delta".into())
            })?;
            size |= (byte as usize) << (8 * i);
            used += 1;
        }
    }
    if size == 0 {
        size = 0x10000;
    }

    Ok((Instruction::Copy { offset, size }, used))
}

/// Resolves deltas against the store in arrival order. A delta whose base is
/// not stored yet is deferred to the next pass; in a self-contained pack
/// every base eventually reduces to a full object, so a pass that resolves
/// nothing means the remaining bases are genuinely absent.
pub fn resolve_deltas(root: &Path, deltas: Vec<RefDelta>) -> Result<Vec<Sha1Hash>> {
    let mut written: Vec<Sha1Hash> = vec![];
    let mut pending: VecDeque<RefDelta> = deltas.into();

    while !pending.is_empty() {
        let before = pending.len();
        let mut deferred: VecDeque<RefDelta> = VecDeque::new();

        for record in pending.drain(..) {
            if !GitObject::exists(root, &record.base) {
                deferred.push_back(record);
                continue;
            }
            let base = GitObject::open(root, &record.base)?;
            let target = Delta::parse(&record.data)?.apply(base.data())?;
            written.push(GitObject::new(base.kind(), target).write(root)?);
        }

        if deferred.len() == before {
            let bases: Vec<String> = deferred.iter().map(|d| d.base.hex()).collect();
            return Err(Error::MissingBase(bases.join(", ")));
        }
        pending = deferred;
    }

    Ok(written)
}
