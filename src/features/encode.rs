use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Maps team abbreviations to dense integer codes, classes in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn fit<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        let classes: BTreeSet<&str> = labels.into_iter().collect();
        LabelEncoder {
            classes: classes.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn transform(&self, label: &str) -> Result<usize> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(label))
            .map_err(|_| Error::UnseenLabel {
                label: label.to_string(),
            })
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self).context("serialising encoder")?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes_sorted_and_deduplicated() {
        let enc = LabelEncoder::fit(["NYY", "BOS", "NYY", "ATL"]);
        assert_eq!(enc.classes(), &["ATL", "BOS", "NYY"]);
        assert_eq!(enc.transform("BOS").unwrap(), 1);
        assert!(matches!(
            enc.transform("LAD"),
            Err(Error::UnseenLabel { label }) if label == "LAD"
        ));
    }

    #[test]
    fn saved_encoder_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("encoder.json");
        let enc = LabelEncoder::fit(["SFG", "CHC"]);
        enc.save(&path).unwrap();
        assert_eq!(LabelEncoder::load(&path).unwrap(), enc);
    }
}
