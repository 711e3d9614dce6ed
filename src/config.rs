use thiserror::Error;

/// Default amount of classes ranked and tracked by the analyzer.
pub const DEFAULT_RANKING_SIZE: usize = 16;
/// Default amount of consecutive suspicions before a class is reported.
pub const DEFAULT_SCORE_THRESHOLD: u32 = 4;

/// Configuration error
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("ranking size must be greater than zero")]
    ZeroRankingSize,
    #[error("score threshold must be greater than zero")]
    ZeroScoreThreshold,
}

/// Configuration for the [`crate::LeakAnalyzer`].
///
/// ```rust
/// use leakanalyzer::AnalyzerConfig;
///
/// let config = AnalyzerConfig::default().with_score_threshold(8);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AnalyzerConfig {
    /// Capacity of every ranking built by the analyzer, and of the suspicion table.
    pub ranking_size: usize,
    /// Score a class must reach before being reported as a suspect.
    pub score_threshold: u32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            ranking_size: DEFAULT_RANKING_SIZE,
            score_threshold: DEFAULT_SCORE_THRESHOLD,
        }
    }
}

impl AnalyzerConfig {
    pub fn new(ranking_size: usize, score_threshold: u32) -> Self {
        Self {
            ranking_size,
            score_threshold,
        }
    }

    pub fn with_ranking_size(mut self, ranking_size: usize) -> Self {
        self.ranking_size = ranking_size;
        self
    }

    pub fn with_score_threshold(mut self, score_threshold: u32) -> Self {
        self.score_threshold = score_threshold;
        self
    }

    /// Checks both the ranking size and the threshold are positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ranking_size == 0 {
            return Err(ConfigError::ZeroRankingSize);
        }
        if self.score_threshold == 0 {
            return Err(ConfigError::ZeroScoreThreshold);
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn test_should_use_default_config() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.ranking_size, 16);
        assert_eq!(config.score_threshold, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_should_reject_zero_values() {
        assert_eq!(
            AnalyzerConfig::new(0, 1).validate(),
            Err(ConfigError::ZeroRankingSize)
        );
        assert_eq!(
            AnalyzerConfig::default()
                .with_score_threshold(0)
                .validate(),
            Err(ConfigError::ZeroScoreThreshold)
        );
        assert_eq!(
            ConfigError::ZeroRankingSize.to_string(),
            "ranking size must be greater than zero"
        );
    }

    #[test]
    fn test_should_build_config() {
        let config = AnalyzerConfig::default()
            .with_ranking_size(3)
            .with_score_threshold(2);
        assert_eq!(config, AnalyzerConfig::new(3, 2));
    }
}
