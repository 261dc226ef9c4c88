pub(crate) mod tree;

use super::{Error, Result, Sha1Hash, GIT_OBJ_DIR};
use bytes::Bytes;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::fmt;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// The four kinds of objects that live in the store. Deltas exist only
/// inside packfiles and are resolved before anything is written.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ObjectKind {
    Commit,
    Tree,
    Blob,
    Tag,
}

impl ObjectKind {
    /// Maps the 3-bit type field of a pack record header. Types 6 and 7
    /// (the delta kinds) are not full objects and map to `None` here.
    pub(crate) fn from_pack_type(bits: u8) -> Option<Self> {
        match bits {
            1 => Some(Self::Commit),
            2 => Some(Self::Tree),
            3 => Some(Self::Blob),
            4 => Some(Self::Tag),
            _ => None,
        }
    }

    pub(crate) fn from_name(name: &str) -> Option<Self> {
        match name {
            "commit" => Some(Self::Commit),
            "tree" => Some(Self::Tree),
            "blob" => Some(Self::Blob),
            "tag" => Some(Self::Tag),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Commit => "commit",
            Self::Tree => "tree",
            Self::Blob => "blob",
            Self::Tag => "tag",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A full object: its kind plus raw payload. Stored loose under
/// `.git/objects/<first-2-hex>/<remaining-38-hex>` as the zlib-compressed
/// framed form `"<kind> <size>\0<payload>"`.
#[derive(Debug, Clone, PartialEq)]
pub struct GitObject {
    kind: ObjectKind,
    data: Bytes,
}

impl GitObject {
    pub fn new(kind: ObjectKind, data: impl Into<Bytes>) -> Self {
        Self {
            kind,
            data: data.into(),
        }
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The canonical serialization the object id is computed over.
    fn framed(&self) -> Vec<u8> {
        let mut out = format!("{} {}\0", self.kind, self.data.len()).into_bytes();
        out.extend_from_slice(&self.data);
        out
    }

    pub fn hash(&self) -> Sha1Hash {
        Sha1Hash::digest(&self.framed())
    }

    fn path(root: &Path, hash: &Sha1Hash) -> PathBuf {
        let hex = hash.hex();
        root.join(GIT_OBJ_DIR).join(&hex[..2]).join(&hex[2..])
    }

    pub fn exists(root: &Path, hash: &Sha1Hash) -> bool {
        Self::path(root, hash).exists()
    }

    /// Writes the object under its content hash. A file already present at
    /// the destination is trusted and left alone, so rewriting an object is
    /// a no-op.
    pub fn write(&self, root: &Path) -> Result<Sha1Hash> {
        let hash = self.hash();
        let path = Self::path(root, &hash);

        if path.exists() {
            return Ok(hash);
        }
        if let Some(shard) = path.parent() {
            fs::create_dir_all(shard)?;
        }

        let f = File::create(&path)?;
        let mut encoder = ZlibEncoder::new(f, Compression::default());
        encoder.write_all(&self.framed())?;
        encoder.finish()?;

        Ok(hash)
    }

    pub fn open(root: &Path, hash: &Sha1Hash) -> Result<Self> {
        let f = File::open(Self::path(root, hash))?;
        let mut decoder = ZlibDecoder::new(f);
        let mut data = vec![];
        decoder
            .read_to_end(&mut data)
            .map_err(|err| Error::CorruptObject(format!("{hash}: {err}")))?;

        Self::parse(&data)
            .map_err(|err| Error::CorruptObject(format!("{hash}: {err}")))
    }

    /// Splits a decompressed loose-object file into kind and payload,
    /// checking the header against the payload it frames.
    fn parse(data: &[u8]) -> std::result::Result<Self, String> {
        let zero_pos = zero_position(data).ok_or("missing header terminator")?;
        let header = &data[..zero_pos];
        let payload = &data[zero_pos + 1..];

        let sp_pos = space_position(header).ok_or("missing space in header")?;
        let name = std::str::from_utf8(&header[..sp_pos]).map_err(|_| "header is not utf-8")?;
        let kind = ObjectKind::from_name(name).ok_or_else(|| format!("bad kind {name:?}"))?;

        let size: usize = std::str::from_utf8(&header[sp_pos + 1..])
            .ok()
            .and_then(|v| v.parse().ok())
            .ok_or("bad size in header")?;
        if size != payload.len() {
            return Err(format!(
                "declared size {size} but payload is {} bytes",
                payload.len()
            ));
        }

        Ok(Self::new(kind, Bytes::copy_from_slice(payload)))
    }
}

pub(crate) fn zero_position(bytes: &[u8]) -> Option<usize> {
    bytes.iter().position(|&b| b == b'\0')
}

pub(crate) fn space_position(bytes: &[u8]) -> Option<usize> {
    bytes.iter().position(|&b| b == b' ')
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn it_creates_filepath_from_sha1_hash() {
        let hash = Sha1Hash::from_hex("e88f7a929cd70b0274c4ea33b209c97fa845fdbc").unwrap();
        assert_eq!(
            GitObject::path(Path::new("."), &hash),
            Path::new("./.git/objects/e8/8f7a929cd70b0274c4ea33b209c97fa845fdbc")
        );
    }

    #[test]
    fn it_hashes_canonical_form() {
        let obj = GitObject::new(ObjectKind::Blob, &b"hello world"[..]);
        assert_eq!(obj.hash().hex(), "95d09f2b10159347eece71399a7e2e907ea3df4f");
    }

    #[test]
    fn it_round_trips_through_the_store() {
        let dir = TempDir::new().unwrap();
        let obj = GitObject::new(ObjectKind::Blob, &b"test content\n"[..]);

        let hash = obj.write(dir.path()).unwrap();
        assert_eq!(hash.hex(), "d670460b4b4aece5915caf5c68d12f560a9fe3e4");

        let read_back = GitObject::open(dir.path(), &hash).unwrap();
        assert_eq!(read_back, obj);
    }

    #[test]
    fn it_skips_rewrites_of_the_same_object() {
        let dir = TempDir::new().unwrap();
        let obj = GitObject::new(ObjectKind::Blob, &b"same"[..]);

        let first = obj.write(dir.path()).unwrap();
        let bytes = fs::read(GitObject::path(dir.path(), &first)).unwrap();

        let second = obj.write(dir.path()).unwrap();
        assert_eq!(first, second);
        assert_eq!(bytes, fs::read(GitObject::path(dir.path(), &second)).unwrap());
    }

    #[test]
    fn it_parses_framed_objects() {
        let obj = GitObject::parse(b"blob 11\0hello world").unwrap();
        assert_eq!(obj.kind(), ObjectKind::Blob);
        assert_eq!(obj.data(), b"hello world");

        let obj = GitObject::parse(b"tag 3\0abc").unwrap();
        assert_eq!(obj.kind(), ObjectKind::Tag);
    }

    #[test]
    fn it_rejects_malformed_headers() {
        assert!(GitObject::parse(b"blob 11 hello world").is_err());
        assert!(GitObject::parse(b"glob 3\0abc").is_err());
        assert!(GitObject::parse(b"blob\0abc").is_err());
        assert!(GitObject::parse(b"blob x\0abc").is_err());
        assert!(GitObject::parse(b"blob 4\0abc").is_err());
    }

    #[test]
    fn it_reports_corrupt_store_files() {
        let dir = TempDir::new().unwrap();
        let obj = GitObject::new(ObjectKind::Blob, &b"payload"[..]);
        let hash = obj.write(dir.path()).unwrap();

        fs::write(GitObject::path(dir.path(), &hash), b"not zlib at all").unwrap();
        assert!(matches!(
            GitObject::open(dir.path(), &hash),
            Err(Error::CorruptObject(_))
        ));
    }
}
