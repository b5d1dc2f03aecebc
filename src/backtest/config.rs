//! Backtest configuration and builder.

use serde::{Deserialize, Serialize};

use super::error::{BacktestError, Result};

/// Configuration for backtest execution.
///
/// Use [`BacktestConfig::builder`] for validated construction.
///
/// # Example
///
/// ```
/// use tickframe::backtest::BacktestConfig;
///
/// let config = BacktestConfig::builder()
///     .initial_capital(50_000.0)
///     .commission(0.001)
///     .slippage(0.0005)
///     .build()
///     .unwrap();
/// assert_eq!(config.price_col, "close");
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// Starting cash in base currency
    pub initial_capital: f64,

    /// Commission per trade as a fraction of trade value (0.001 = 0.1%)
    pub commission: f64,

    /// Slippage as a fraction of price, applied against the trade on both
    /// entry and exit
    pub slippage: f64,

    /// Column holding the execution price
    pub price_col: String,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_capital: 10_000.0,
            commission: 0.001,  // 0.1% per trade
            slippage: 0.0005,   // 0.05% per fill
            price_col: "close".to_string(),
        }
    }
}

impl BacktestConfig {
    /// Start building a configuration from the defaults.
    pub fn builder() -> BacktestConfigBuilder {
        BacktestConfigBuilder::default()
    }

    /// A zero-cost configuration with no commission or slippage, useful for
    /// testing strategy logic in isolation.
    pub fn frictionless() -> Self {
        Self {
            commission: 0.0,
            slippage: 0.0,
            ..Self::default()
        }
    }

    /// Check the parameter bounds.
    pub(crate) fn validate(&self) -> Result<()> {
        if !(self.initial_capital > 0.0) {
            return Err(BacktestError::invalid_param(
                "initial_capital",
                "must be positive",
            ));
        }
        if !(self.commission >= 0.0) {
            return Err(BacktestError::invalid_param(
                "commission",
                "must be non-negative",
            ));
        }
        if !(self.slippage >= 0.0) {
            return Err(BacktestError::invalid_param(
                "slippage",
                "must be non-negative",
            ));
        }
        Ok(())
    }
}

/// Builder for [`BacktestConfig`] with validation at `build()`.
#[derive(Debug, Clone, Default)]
pub struct BacktestConfigBuilder {
    config: BacktestConfig,
}

impl BacktestConfigBuilder {
    /// Set the starting cash.
    pub fn initial_capital(mut self, capital: f64) -> Self {
        self.config.initial_capital = capital;
        self
    }

    /// Set the per-trade commission fraction.
    pub fn commission(mut self, commission: f64) -> Self {
        self.config.commission = commission;
        self
    }

    /// Set the per-fill slippage fraction.
    pub fn slippage(mut self, slippage: f64) -> Self {
        self.config.slippage = slippage;
        self
    }

    /// Set the execution price column.
    pub fn price_col(mut self, col: impl Into<String>) -> Self {
        self.config.price_col = col.into();
        self
    }

    /// Validate and return the configuration.
    pub fn build(self) -> Result<BacktestConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BacktestConfig::default();
        assert_eq!(config.initial_capital, 10_000.0);
        assert_eq!(config.commission, 0.001);
        assert_eq!(config.slippage, 0.0005);
        assert_eq!(config.price_col, "close");
    }

    #[test]
    fn test_builder_rejects_nonpositive_capital() {
        let err = BacktestConfig::builder()
            .initial_capital(0.0)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("initial_capital"));

        // NaN must not slip through the comparison either.
        assert!(
            BacktestConfig::builder()
                .initial_capital(f64::NAN)
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_builder_rejects_negative_costs() {
        assert!(BacktestConfig::builder().commission(-0.1).build().is_err());
        assert!(BacktestConfig::builder().slippage(-0.1).build().is_err());
    }

    #[test]
    fn test_config_serde_round_trip() {
        let config = BacktestConfig::builder()
            .initial_capital(25_000.0)
            .price_col("adj_close")
            .build()
            .unwrap();
        let json = serde_json::to_string(&config).unwrap();
        let back: BacktestConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.initial_capital, 25_000.0);
        assert_eq!(back.price_col, "adj_close");
    }
}
