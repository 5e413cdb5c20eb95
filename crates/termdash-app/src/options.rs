//! Command-line options.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};

pub const USAGE: &str = "usage: termdash -c <config.yml> [--log-file <file>] [--timeout-ms <n>]";

/// Options given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub config: PathBuf,
    pub log_file: Option<PathBuf>,
    /// Default timeout for shell commands without their own `timeoutMs`.
    pub timeout: Option<Duration>,
}

impl Options {
    /// Parse arguments, not including the program name.
    pub fn parse<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = None;
        let mut log_file = None;
        let mut timeout = None;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-c" | "--config" => config = Some(PathBuf::from(value(&arg, args.next())?)),
                "--log-file" => log_file = Some(PathBuf::from(value(&arg, args.next())?)),
                "--timeout-ms" => {
                    let raw = value(&arg, args.next())?;
                    let ms: u64 = raw
                        .parse()
                        .with_context(|| format!("--timeout-ms: '{raw}' is not a number"))?;
                    timeout = Some(Duration::from_millis(ms));
                },
                other => bail!("unexpected argument '{other}'\n{USAGE}"),
            }
        }

        let Some(config) = config else {
            bail!("no configuration file given\n{USAGE}");
        };
        Ok(Self {
            config,
            log_file,
            timeout,
        })
    }
}

fn value(flag: &str, next: Option<String>) -> Result<String> {
    next.with_context(|| format!("{flag} needs a value"))
}
