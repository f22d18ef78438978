//! Upstream predictive-model identifiers.
//!
//! The engine never trains or runs these models; it only records which one
//! produced the probability surface. Unimplemented deep variants resolve to
//! an implemented one through an explicit fallback table rather than ad hoc
//! string matching.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ForecastError;

/// Known upstream predictor kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    RandomForest,
    Lstm,
    Gru,
    CnnLstm,
    Cnn3dLstm,
    AttentionLstm,
    Transformer,
}

impl ModelKind {
    /// Resolve to an implemented kind.
    ///
    /// Returns the kind to actually use and whether a fallback occurred.
    /// The advanced sequence variants are not implemented upstream and
    /// substitute LSTM.
    pub fn resolve(self) -> (ModelKind, bool) {
        match self {
            Self::CnnLstm | Self::Cnn3dLstm | Self::AttentionLstm | Self::Transformer => {
                (Self::Lstm, true)
            }
            implemented => (implemented, false),
        }
    }

    /// Identifier used in config files and metadata sidecars.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RandomForest => "random_forest",
            Self::Lstm => "lstm",
            Self::Gru => "gru",
            Self::CnnLstm => "cnn_lstm",
            Self::Cnn3dLstm => "cnn3d_lstm",
            Self::AttentionLstm => "attention_lstm",
            Self::Transformer => "transformer",
        }
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random_forest" => Ok(Self::RandomForest),
            "lstm" => Ok(Self::Lstm),
            "gru" => Ok(Self::Gru),
            "cnn_lstm" => Ok(Self::CnnLstm),
            "cnn3d_lstm" => Ok(Self::Cnn3dLstm),
            "attention_lstm" => Ok(Self::AttentionLstm),
            "transformer" => Ok(Self::Transformer),
            other => Err(ForecastError::UnknownModel(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_implemented_kinds_resolve_to_themselves() {
        assert_eq!(ModelKind::RandomForest.resolve(), (ModelKind::RandomForest, false));
        assert_eq!(ModelKind::Lstm.resolve(), (ModelKind::Lstm, false));
        assert_eq!(ModelKind::Gru.resolve(), (ModelKind::Gru, false));
    }

    #[test]
    fn test_advanced_kinds_fall_back_to_lstm() {
        for kind in [
            ModelKind::CnnLstm,
            ModelKind::Cnn3dLstm,
            ModelKind::AttentionLstm,
            ModelKind::Transformer,
        ] {
            assert_eq!(kind.resolve(), (ModelKind::Lstm, true));
        }
    }

    #[test]
    fn test_unknown_name_is_an_error() {
        assert!("diffusion_net".parse::<ModelKind>().is_err());
        assert_eq!("gru".parse::<ModelKind>().unwrap(), ModelKind::Gru);
    }
}
