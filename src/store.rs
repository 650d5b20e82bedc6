use crate::chain::SimpleBlockchain;
use crate::codec::ChainCodec;
use crate::error::{ChainError, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

const CHAINS_DIR: &str = "chains";
const LOG_FILE: &str = "saves.jsonl";
const TMP_EXT: &str = "tmp";

/// Directory-backed store of serialized chains.
///
/// Each chain lives in `chains/<id>.<format>`. Every save is also recorded
/// in an append-only `saves.jsonl` log for auditing.
pub struct ChainStore {
    dir: PathBuf,
}

/// One line of the save log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SaveEntry {
    pub sequence: u64,
    pub chain_id: String,
    pub format: String,
    pub count: u64,
    pub head_hash: Option<String>,
    pub timestamp: String,
}

impl ChainStore {
    /// Open or create a store at the given directory.
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir.join(CHAINS_DIR))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write a chain with `codec`, replacing any earlier save in that format.
    pub fn save(&self, chain: &SimpleBlockchain, codec: &dyn ChainCodec) -> Result<PathBuf> {
        let path = self.chain_path(chain.id(), codec.format())?;
        let text = codec.serialize(chain)?;
        let tmp = path.with_extension(format!("{}.{}", codec.format(), TMP_EXT));
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &path)?;
        self.append_log(chain, codec.format())?;
        info!(
            "saved chain {} ({} links) to {}",
            chain.id(),
            chain.count(),
            path.display()
        );
        Ok(path)
    }

    /// Load and verify a chain previously saved with `codec`.
    pub fn load(&self, id: &str, codec: &dyn ChainCodec) -> Result<SimpleBlockchain> {
        let chain = self.load_unverified(id, codec)?;
        chain.verify()?;
        info!("loaded chain {} ({} links)", id, chain.count());
        Ok(chain)
    }

    /// Load a chain without verifying its links, for auditing damaged files.
    pub fn load_unverified(&self, id: &str, codec: &dyn ChainCodec) -> Result<SimpleBlockchain> {
        let path = self.chain_path(id, codec.format())?;
        if !path.exists() {
            return Err(ChainError::ChainNotFound(id.into()));
        }
        let text = fs::read_to_string(&path)?;
        let chain = codec.deserialize_unverified(&text)?;
        if chain.id() != id {
            return Err(ChainError::Malformed(format!(
                "file for chain {} holds chain {}",
                id,
                chain.id()
            )));
        }
        Ok(chain)
    }

    pub fn contains(&self, id: &str, format: &str) -> bool {
        self.chain_path(id, format)
            .map(|p| p.exists())
            .unwrap_or(false)
    }

    /// Stored `(id, format)` pairs, sorted.
    pub fn list(&self) -> Result<Vec<(String, String)>> {
        let mut out = Vec::new();
        for entry in fs::read_dir(self.dir.join(CHAINS_DIR))? {
            let path = entry?.path();
            let (Some(stem), Some(ext)) = (
                path.file_stem().and_then(|s| s.to_str()),
                path.extension().and_then(|s| s.to_str()),
            ) else {
                continue;
            };
            if ext == TMP_EXT {
                continue;
            }
            out.push((stem.to_string(), ext.to_string()));
        }
        out.sort();
        Ok(out)
    }

    /// Read back the save log in order.
    pub fn history(&self) -> Result<Vec<SaveEntry>> {
        let path = self.dir.join(LOG_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(path)?;
        content
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str::<SaveEntry>(l).map_err(ChainError::from))
            .collect()
    }

    fn chain_path(&self, id: &str, format: &str) -> Result<PathBuf> {
        let bad = |s: &str| {
            s.is_empty() || s == "." || s == ".." || s.contains(&['/', '\\', '\0'][..])
        };
        if bad(id) || bad(format) {
            return Err(ChainError::Malformed(format!(
                "unusable chain file name: {}.{}",
                id, format
            )));
        }
        Ok(self
            .dir
            .join(CHAINS_DIR)
            .join(format!("{}.{}", id, format)))
    }

    fn append_log(&self, chain: &SimpleBlockchain, format: &str) -> Result<()> {
        let entry = SaveEntry {
            sequence: self.next_sequence()?,
            chain_id: chain.id().into(),
            format: format.into(),
            count: chain.count() as u64,
            head_hash: chain.last().map(|l| l.hash().to_string()),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        let mut line = serde_json::to_string(&entry)?;
        line.push('\n');
        let mut f = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.dir.join(LOG_FILE))?;
        f.write_all(line.as_bytes())?;
        Ok(())
    }

    fn next_sequence(&self) -> Result<u64> {
        let path = self.dir.join(LOG_FILE);
        if !path.exists() {
            return Ok(1);
        }
        let reader = BufReader::new(fs::File::open(path)?);
        let mut count = 0u64;
        for line in reader.lines() {
            if !line?.trim().is_empty() {
                count += 1;
            }
        }
        Ok(count + 1)
    }
}
