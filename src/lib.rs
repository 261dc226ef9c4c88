mod args;
mod checkout;
mod cmd;
mod error;
mod git_object;
mod git_protocol;
mod hash;

const GIT_DIR: &str = ".git";
const GIT_OBJ_DIR: &str = ".git/objects";
const GIT_REF_DIR: &str = ".git/refs";
const GIT_HEADS_DIR: &str = ".git/refs/heads";

pub use cmd::Cli;
pub use error::Error;
pub use git_object::{GitObject, ObjectKind};
pub use git_protocol::varint;
pub use git_protocol::{
    resolve_deltas, Advertisement, Delta, PackFile, PktLine, PktLines, RefDelta, Unpacked,
};
pub use hash::{Sha1Hash, SHA1_HASH_SIZE};

pub type Result<T> = std::result::Result<T, Error>;
