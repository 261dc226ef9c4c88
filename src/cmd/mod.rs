mod clone;
mod init;

use super::{args::Args, Error, Result};

/// The command line: `gitclone <repo-url> <target-dir>`.
#[derive(Debug)]
pub struct Cli {
    url: String,
    dir: String,
}

impl Cli {
    pub fn new(args: &[String]) -> Result<Self> {
        let args = Args::builder()
            .position(0, "url")
            .position(1, "dir")
            .build(args);

        match (args.value("url"), args.value("dir")) {
            (Some(url), Some(dir)) => Ok(Self { url, dir }),
            _ => Err(Error::InvalidArgs(
                "usage: gitclone <repo-url> <target-dir>".into(),
            )),
        }
    }

    pub async fn run(self) -> Result<()> {
        clone::run(self.url, self.dir).await
    }
}
