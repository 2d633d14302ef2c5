//! The storage size report produced by the snapshot analyzer.
//!
//! A report is read once, never mutated, and handed to [`summary`] to derive the text breakdown
//! and the pie slices.

use serde::Deserialize;
use std::{
    fs, io,
    path::{Path, PathBuf},
    str::FromStr,
};

pub mod summary;

pub use summary::{pie_data, text_summary, PieData};

/// Failures while loading a report or deriving views from it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("could not read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed report")]
    Json(#[from] serde_json::Error),
    /// Every pallet has size zero, so no share can be computed.
    #[error("total pallet size is zero")]
    EmptyTotal,
    #[error("no compressed size recorded for {}", item_path(.pallet, .entry))]
    MissingCompressed {
        pallet: String,
        entry: Option<String>,
    },
    /// A size, or a running total of sizes, does not fit in 64 bits.
    #[error("size of {} overflows", item_path(.pallet, .entry))]
    SizeOverflow {
        pallet: String,
        entry: Option<String>,
    },
}

fn item_path(pallet: &str, entry: &Option<String>) -> String {
    match entry {
        Some(entry) => format!("{pallet}::{entry}"),
        None => pallet.to_owned(),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Report {
    /// Name of the chain the snapshot was taken from.
    pub network: String,
    pub pallets: Vec<Pallet>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Pallet {
    pub name: String,
    /// Total bytes (keys and values) under this pallet's prefix.
    pub size: u64,
    #[serde(default)]
    pub compressed_size: Option<u64>,
    #[serde(default)]
    pub storage: Option<Vec<Entry>>,
    #[serde(default)]
    pub items: Option<Vec<Entry>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Entry {
    pub name: String,
    pub key_len: u64,
    pub value_len: u64,
    #[serde(default)]
    pub compressed_key_len: Option<u64>,
    #[serde(default)]
    pub compressed_value_len: Option<u64>,
}

impl Entry {
    /// `key_len + value_len`, or `None` if that does not fit in a `u64`.
    pub fn size(&self) -> Option<u64> {
        self.key_len.checked_add(self.value_len)
    }

    fn overflow(&self, pallet: &Pallet) -> Error {
        Error::SizeOverflow {
            pallet: pallet.name.clone(),
            entry: Some(self.name.clone()),
        }
    }
}

/// Which byte count the derived views are built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeMetric {
    #[default]
    Raw,
    Compressed,
}

impl SizeMetric {
    pub fn pallet_size(self, pallet: &Pallet) -> Result<u64, Error> {
        match self {
            SizeMetric::Raw => Ok(pallet.size),
            SizeMetric::Compressed => {
                pallet
                    .compressed_size
                    .ok_or_else(|| Error::MissingCompressed {
                        pallet: pallet.name.clone(),
                        entry: None,
                    })
            }
        }
    }

    pub fn entry_size(self, pallet: &Pallet, entry: &Entry) -> Result<u64, Error> {
        match self {
            SizeMetric::Raw => entry.size().ok_or_else(|| entry.overflow(pallet)),
            SizeMetric::Compressed => match (entry.compressed_key_len, entry.compressed_value_len) {
                (Some(key), Some(value)) => {
                    key.checked_add(value).ok_or_else(|| entry.overflow(pallet))
                }
                _ => Err(Error::MissingCompressed {
                    pallet: pallet.name.clone(),
                    entry: Some(entry.name.clone()),
                }),
            },
        }
    }
}

impl Report {
    /// Read and parse the report at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let file = fs::File::open(path).map_err(|source| Error::Io {
            path: path.to_owned(),
            source,
        })?;
        let report = Self::from_reader(io::BufReader::new(file))?;
        tracing::debug!(
            path = %path.display(),
            network = %report.network,
            pallets = report.pallets.len(),
            "loaded report"
        );
        Ok(report)
    }

    pub fn from_reader(reader: impl io::Read) -> Result<Self, Error> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Sum of all pallet sizes under `metric`. Zero is an error since every share divides by it.
    pub fn total_size(&self, metric: SizeMetric) -> Result<u64, Error> {
        let mut total: u64 = 0;
        for pallet in &self.pallets {
            total = total
                .checked_add(metric.pallet_size(pallet)?)
                .ok_or_else(|| Error::SizeOverflow {
                    pallet: pallet.name.clone(),
                    entry: None,
                })?;
        }
        if total == 0 {
            return Err(Error::EmptyTotal);
        }
        Ok(total)
    }
}

impl FromStr for Report {
    type Err = Error;

    fn from_str(src: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(src)?)
    }
}
