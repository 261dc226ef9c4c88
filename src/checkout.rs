use crate::git_object::tree::TreeRecords;
use crate::{Error, GitObject, ObjectKind, Result, Sha1Hash};
use std::fs;
use std::path::Path;

/// Materializes the working tree for the commit at `tip`: resolves its root
/// tree, then walks tree objects recursively, creating directories and
/// writing blob payloads under `root`.
pub(crate) fn run(root: &Path, tip: &Sha1Hash) -> Result<()> {
    let commit = GitObject::open(root, tip)?;
    if commit.kind() != ObjectKind::Commit {
        return Err(Error::CorruptObject(format!("{tip} is not a commit")));
    }

    let tree = tree_of_commit(commit.data())?;
    write_tree(root, root, &tree)
}

/// The first line of a commit payload is `tree <40-hex-oid>`.
fn tree_of_commit(payload: &[u8]) -> Result<Sha1Hash> {
    let line = payload.split(|&b| b == b'\n').next().unwrap_or_default();
    let hex = line
        .strip_prefix(b"tree ")
        .and_then(|rest| std::str::from_utf8(rest).ok())
        .ok_or_else(|| Error::CorruptObject("commit does not start with a tree line".into()))?;

    Sha1Hash::from_hex(hex)
        .map_err(|_| Error::CorruptObject(format!("bad tree id {hex:?} in commit")))
}

fn write_tree(root: &Path, dir: &Path, tree: &Sha1Hash) -> Result<()> {
    let obj = GitObject::open(root, tree)?;
    if obj.kind() != ObjectKind::Tree {
        return Err(Error::CorruptObject(format!("{tree} is not a tree")));
    }

    for entry in TreeRecords::new(obj.data()) {
        let entry = entry?;
        let path = dir.join(entry.name());

        if entry.is_dir() {
            fs::create_dir_all(&path)?;
            write_tree(root, &path, entry.hash())?;
        } else {
            let blob = GitObject::open(root, entry.hash())?;
            fs::write(path, blob.data())?;
        }
    }
    Ok(())
}
