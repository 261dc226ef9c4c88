use crate::{Result, Sha1Hash, GIT_DIR, GIT_HEADS_DIR, GIT_OBJ_DIR, GIT_REF_DIR};
use std::fs;
use std::path::Path;

/// Lays down the repository skeleton under `root`: the `.git` directory
/// tree, a symbolic HEAD, and the branch ref pointing at `tip`.
pub(crate) fn run(root: &Path, branch: &str, tip: &Sha1Hash) -> Result<()> {
    for dir in [GIT_DIR, GIT_OBJ_DIR, GIT_REF_DIR, GIT_HEADS_DIR] {
        fs::create_dir_all(root.join(dir))?;
    }

    fs::write(
        root.join(GIT_DIR).join("HEAD"),
        format!("ref: refs/heads/{branch}\n"),
    )?;

    // branch names may carry slashes, e.g. release/1.x
    let branch_path = root.join(GIT_HEADS_DIR).join(branch);
    if let Some(parent) = branch_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(branch_path, format!("{}\n", tip.hex()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const TIP: &str = "3b1031798a00fdf9b574b5857b1721bc4b0e6bac";

    #[test]
    fn it_writes_head_and_branch_ref() {
        let dir = TempDir::new().unwrap();
        let tip = Sha1Hash::from_hex(TIP).unwrap();

        run(dir.path(), "main", &tip).unwrap();

        assert!(dir.path().join(".git/objects").is_dir());
        assert_eq!(
            fs::read_to_string(dir.path().join(".git/HEAD")).unwrap(),
            "ref: refs/heads/main\n"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join(".git/refs/heads/main")).unwrap(),
            format!("{TIP}\n")
        );
    }

    #[test]
    fn it_handles_slashed_branch_names() {
        let dir = TempDir::new().unwrap();
        let tip = Sha1Hash::from_hex(TIP).unwrap();

        run(dir.path(), "release/1.x", &tip).unwrap();

        assert_eq!(
            fs::read_to_string(dir.path().join(".git/refs/heads/release/1.x")).unwrap(),
            format!("{TIP}\n")
        );
    }
}
