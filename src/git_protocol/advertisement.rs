use super::PktLines;
use crate::{Error, Result, Sha1Hash};
use bytes::Bytes;
use regex::Regex;

/// The `info/refs` response: one line per advertised ref, pkt-line framing
/// and the leading `# service=` comment already stripped.
#[derive(Debug)]
pub struct Advertisement {
    lines: Vec<String>,
}

impl Advertisement {
    pub fn parse(body: Bytes) -> Result<Self> {
        let mut lines = vec![];
        for line in PktLines::from(body) {
            let line = line?;
            if line.is_flush() {
                continue;
            }
            let text = String::from_utf8_lossy(line.payload()).to_string();
            if text.starts_with('#') {
                continue;
            }
            lines.push(text);
        }
        Ok(Self { lines })
    }

    /// The default branch name and its tip. The symbolic-ref capability
    /// (`HEAD:refs/heads/<branch>`) decides when advertised; otherwise
    /// `main` and then `master` are tried.
    pub fn default_branch(&self) -> Result<(String, Sha1Hash)> {
        if let Some(branch) = self.symref_branch() {
            let tip = self.tip_of(&branch).ok_or(Error::DefaultBranchNotFound)?;
            return Ok((branch, tip));
        }

        for branch in ["main", "master"] {
            if let Some(tip) = self.tip_of(branch) {
                return Ok((branch.to_string(), tip));
            }
        }
        Err(Error::DefaultBranchNotFound)
    }

    fn symref_branch(&self) -> Option<String> {
        let re = Regex::new(r"HEAD:refs/heads/([^\s\x00]+)").unwrap();
        self.lines
            .iter()
            .find_map(|line| re.captures(line).map(|caps| caps[1].to_string()))
    }

    /// Finds the `<oid-hex> <ref-name>` line for `refs/heads/<branch>`.
    fn tip_of(&self, branch: &str) -> Option<Sha1Hash> {
        let want = format!("refs/heads/{branch}");
        for line in &self.lines {
            if line.len() < 42 || !line.is_char_boundary(40) || line.as_bytes()[40] != b' ' {
                continue;
            }
            let name = line[41..].split(['\0', '\n']).next().unwrap_or_default();
            if name == want {
                return Sha1Hash::from_hex(&line[..40]).ok();
            }
        }
        None
    }
}
