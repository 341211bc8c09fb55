//! The pairs dataset (`sample_pairs.csv`).

use std::collections::HashSet;

use mtlab_core::model::TranslationPair;

use crate::{DataDir, Result, StoreError};

/// Demo dataset: `(id, English source, Arabic reference)`.
pub const SAMPLE_PAIRS: [(&str, &str, &str); 3] = [
    (
        "1",
        "Please submit your application before the deadline.",
        "يرجى تقديم طلبك قبل الموعد النهائي.",
    ),
    (
        "2",
        "Health authorities recommend drinking water regularly.",
        "تنصح السلطات الصحية بشرب الماء بانتظام.",
    ),
    (
        "3",
        "The museum will extend its opening hours during the festival.",
        "سيُمدد المتحف ساعات عمله خلال المهرجان.",
    ),
];

fn sample_pairs() -> Vec<TranslationPair> {
    SAMPLE_PAIRS
        .iter()
        .map(|(id, source, reference)| TranslationPair {
            id: id.to_string(),
            source: source.to_string(),
            reference: reference.to_string(),
            src_lang: "en".into(),
            tgt_lang: "ar".into(),
        })
        .collect()
}

/// A problem found in the pairs dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationWarning {
    pub item_id: Option<String>,
    pub message: String,
}

impl DataDir {
    /// Seed the demo dataset if the file is missing. Returns true if written.
    pub fn ensure_sample_pairs(&self) -> Result<bool> {
        if self.pairs_path().exists() {
            return Ok(false);
        }
        self.reset_sample_pairs()?;
        Ok(true)
    }

    /// Overwrite the dataset with the demo pairs.
    pub fn reset_sample_pairs(&self) -> Result<()> {
        self.save_pairs(&sample_pairs())
    }

    pub fn save_pairs(&self, pairs: &[TranslationPair]) -> Result<()> {
        let path = self.pairs_path();
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        wtr.write_record(["id", "source", "reference", "src_lang", "tgt_lang"])
            .map_err(|e| StoreError::csv(&path, e))?;
        for pair in pairs {
            wtr.serialize(pair).map_err(|e| StoreError::csv(&path, e))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| StoreError::io(&path, e.into_error()))?;
        self.write_atomic(&path, &bytes)?;
        tracing::debug!(path = %path.display(), count = pairs.len(), "saved pairs");
        Ok(())
    }

    /// Load the dataset. A missing file is an empty dataset.
    pub fn load_pairs(&self) -> Result<Vec<TranslationPair>> {
        let path = self.pairs_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let mut rdr = csv::Reader::from_path(&path).map_err(|e| StoreError::csv(&path, e))?;
        rdr.deserialize()
            .collect::<std::result::Result<Vec<TranslationPair>, _>>()
            .map_err(|e| StoreError::csv(&path, e))
    }

    pub fn find_pair(&self, item_id: &str) -> Result<TranslationPair> {
        self.load_pairs()?
            .into_iter()
            .find(|p| p.id == item_id)
            .ok_or_else(|| StoreError::PairNotFound(item_id.to_string()))
    }
}

/// Check a dataset for duplicate ids and blank fields.
pub fn validate_pairs(pairs: &[TranslationPair]) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let mut seen = HashSet::new();
    for pair in pairs {
        if !seen.insert(pair.id.as_str()) {
            warnings.push(ValidationWarning {
                item_id: Some(pair.id.clone()),
                message: format!("duplicate id: {}", pair.id),
            });
        }
    }

    for pair in pairs {
        if pair.source.trim().is_empty() {
            warnings.push(ValidationWarning {
                item_id: Some(pair.id.clone()),
                message: "source is empty".into(),
            });
        }
        if pair.reference.trim().is_empty() {
            warnings.push(ValidationWarning {
                item_id: Some(pair.id.clone()),
                message: "reference is empty; the item cannot be scored".into(),
            });
        }
    }

    if pairs.is_empty() {
        warnings.push(ValidationWarning {
            item_id: None,
            message: "dataset has no pairs".into(),
        });
    }

    warnings
}
