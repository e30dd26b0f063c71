//! Transition table YAML files.
//!
//! ```yaml
//! rows: 3
//! cols: 3
//! entries:
//!   - { from: [1, 1], to: [1, 1], p: 0.6 }
//!   - { from: [1, 1], to: [1, 2], p: 0.4 }
//! ```
//!
//! Cells are `[row, col]`. Pairs not listed have probability 0.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::GridCoord;
use crate::error::Result;
use crate::estimation::TransitionModel;

/// On-disk form of a transition table
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransitionTableFile {
    /// Grid rows
    pub rows: usize,
    /// Grid columns
    pub cols: usize,
    /// Non-zero transitions
    #[serde(default)]
    pub entries: Vec<TransitionEntry>,
}

/// One `from -> to` probability
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionEntry {
    pub from: [i32; 2],
    pub to: [i32; 2],
    pub p: f64,
}

impl TransitionTableFile {
    /// Snapshot a model.
    pub fn from_model(model: &TransitionModel) -> Self {
        Self {
            rows: model.rows(),
            cols: model.cols(),
            entries: model
                .entries()
                .into_iter()
                .map(|(from, to, p)| TransitionEntry {
                    from: [from.row, from.col],
                    to: [to.row, to.col],
                    p,
                })
                .collect(),
        }
    }

    /// Validate and build the model.
    pub fn into_model(self) -> Result<TransitionModel> {
        let entries = self.entries.into_iter().map(|e| {
            (
                GridCoord::new(e.from[0], e.from[1]),
                GridCoord::new(e.to[0], e.to[1]),
                e.p,
            )
        });
        TransitionModel::from_entries(self.rows, self.cols, entries)
    }
}

/// Parse a transition table from YAML
pub fn parse_transition_table(yaml: &str) -> Result<TransitionModel> {
    let file: TransitionTableFile = serde_yaml::from_str(yaml)?;
    file.into_model()
}

/// Load a transition table from a YAML file
pub fn load_transition_table(path: &Path) -> Result<TransitionModel> {
    let contents = std::fs::read_to_string(path)?;
    parse_transition_table(&contents)
}

/// Serialize a transition table to YAML
pub fn transition_table_to_yaml(model: &TransitionModel) -> Result<String> {
    Ok(serde_yaml::to_string(&TransitionTableFile::from_model(model))?)
}

/// Write a transition table to a YAML file
pub fn save_transition_table(model: &TransitionModel, path: &Path) -> Result<()> {
    std::fs::write(path, transition_table_to_yaml(model)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MargaError;

    #[test]
    fn test_parse() {
        let yaml = r#"
rows: 3
cols: 3
entries:
  - { from: [1, 1], to: [1, 1], p: 0.6 }
  - { from: [1, 1], to: [1, 2], p: 0.4 }
"#;
        let model = parse_transition_table(yaml).unwrap();
        assert_eq!(model.rows(), 3);
        assert_eq!(model.probability(GridCoord::new(1, 1), GridCoord::new(1, 2)), 0.4);
        assert_eq!(model.probability(GridCoord::new(0, 0), GridCoord::new(0, 0)), 0.0);
    }

    #[test]
    fn test_rejects_non_adjacent() {
        let yaml = "rows: 3\ncols: 3\nentries:\n  - { from: [0, 0], to: [2, 2], p: 0.5 }\n";
        assert!(matches!(
            parse_transition_table(yaml),
            Err(MargaError::InvalidTransition(_))
        ));
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transitions.yaml");
        let model = TransitionModel::uniform_neighbors(4, 3).unwrap();

        save_transition_table(&model, &path).unwrap();
        let loaded = load_transition_table(&path).unwrap();
        assert_eq!(loaded, model);
    }
}
