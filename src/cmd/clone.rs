use super::init;
use crate::checkout;
use crate::git_protocol::{resolve_deltas, Advertisement, PackFile, PktLine};
use crate::{Error, Result, Sha1Hash};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use std::fs;
use std::path::PathBuf;

/// The whole clone, in order: discover the default branch tip, fetch one
/// pack, initialize the repository skeleton, unpack, resolve deltas, and
/// materialize the working tree. Nothing is rolled back on failure.
pub(crate) async fn run(url: String, dir: String) -> Result<()> {
    let root = PathBuf::from(&dir);
    fs::create_dir_all(&root)?;

    let body = reqwest::get(format!("{url}/info/refs?service=git-upload-pack"))
        .await?
        .error_for_status()?
        .bytes()
        .await?;

    let advertisement = Advertisement::parse(body)?;
    let (branch, tip) = advertisement.default_branch()?;
    println!("Cloning {branch} ({tip}) into {dir}");

    let pack_bytes = fetch_pack(&url, &tip).await?;

    init::run(&root, &branch, &tip)?;

    let pack = PackFile::parse(pack_bytes)?;
    let count = pack.object_count();
    let unpacked = pack.unpack(&root)?;
    println!(
        "Unpacked {count} objects, {} of them deltified",
        unpacked.deltas.len()
    );

    resolve_deltas(&root, unpacked.deltas)?;
    checkout::run(&root, &tip)
}

/// One `want` for the tip, a flush, then `done`. No capabilities are
/// requested, so the reply is a bare `NAK` followed by the pack.
async fn fetch_pack(url: &str, want: &Sha1Hash) -> Result<Vec<u8>> {
    let body = format!(
        "{}{}{}",
        PktLine::new(format!("want {}\n", want.hex()).into_bytes()),
        PktLine::flush(),
        PktLine::new(b"done\n".to_vec()),
    );

    let client = reqwest::Client::new();
    let res = client
        .post(format!("{url}/git-upload-pack"))
        .header(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-git-upload-pack-request"),
        )
        .body(body)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;

    strip_nak(&res).map(|pack| pack.to_vec())
}

const NAK: &[u8] = b"0008NAK\n";

/// The pack starts at byte 8, right after the framed `NAK`.
fn strip_nak(body: &[u8]) -> Result<&[u8]> {
    body.strip_prefix(NAK).ok_or_else(|| {
        Error::Protocol(format!(
            "fetch response does not start with NAK: {:?}",
            &body[..body.len().min(NAK.len())]
        ))
    })
}
