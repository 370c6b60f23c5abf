// src/config.rs

use crate::indicators::IndicatorParams;
use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StrategyConfig {
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub macd_signal: usize,
    pub rsi_period: usize,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    pub bb_period: usize,
    pub bb_std_dev: f64,
    pub profit_target_multiplier: Decimal,
    pub stop_loss_multiplier: Decimal,
    /// Buys are skipped while the free quote balance is at or below this.
    pub min_quote_reserve: Decimal,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            ema_fast: 12,
            ema_slow: 26,
            macd_signal: 9,
            rsi_period: 14,
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            bb_period: 20,
            bb_std_dev: 2.0,
            profit_target_multiplier: Decimal::new(1008, 3),
            stop_loss_multiplier: Decimal::new(98, 2),
            min_quote_reserve: Decimal::ONE,
        }
    }
}

impl StrategyConfig {
    /// Candles needed before every indicator has a value.
    pub fn required_candles(&self) -> usize {
        IndicatorParams::from(self).required_candles()
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SymbolConfig {
    pub symbol: String,
    /// Quote currency spent on each buy.
    pub investment: Decimal,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub directory: String,
    pub file_prefix: String,
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: "logs".to_string(),
            file_prefix: "the_signal.log".to_string(),
            filter: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub api_key: String,
    pub secret_key: String,
    pub base_url: String,
    pub live_trading: bool,
    pub paper_quote_balance: Decimal,
    pub quote_asset: String,
    pub poll_interval_secs: u64,
    pub kline_interval: String,
    pub kline_limit: u16,
    pub symbols: Vec<SymbolConfig>,
    pub strategy: StrategyConfig,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let investment = Decimal::new(15, 1);
        Self {
            api_key: String::new(),
            secret_key: String::new(),
            base_url: "https://api.binance.com".to_string(),
            live_trading: false,
            paper_quote_balance: Decimal::from(100),
            quote_asset: "USDT".to_string(),
            poll_interval_secs: 10,
            kline_interval: "1m".to_string(),
            kline_limit: 100,
            symbols: vec![
                SymbolConfig {
                    symbol: "SHIBUSDT".to_string(),
                    investment,
                },
                SymbolConfig {
                    symbol: "NEIROUSDT".to_string(),
                    investment,
                },
            ],
            strategy: StrategyConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name("Settings").required(false))
            // BINANCE_API_KEY, BINANCE_SECRET_KEY, BINANCE_BASE_URL
            .add_source(Environment::with_prefix("BINANCE"))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbols.is_empty() {
            return Err(ConfigError::Message("no symbols configured".into()));
        }
        if let Some(bad) = self.symbols.iter().find(|s| s.investment <= Decimal::ZERO) {
            return Err(ConfigError::Message(format!(
                "investment for {} must be positive",
                bad.symbol
            )));
        }
        if self.strategy.profit_target_multiplier <= Decimal::ONE {
            return Err(ConfigError::Message(
                "profit_target_multiplier must be above 1".into(),
            ));
        }
        if self.strategy.stop_loss_multiplier <= Decimal::ZERO
            || self.strategy.stop_loss_multiplier >= Decimal::ONE
        {
            return Err(ConfigError::Message(
                "stop_loss_multiplier must be between 0 and 1".into(),
            ));
        }
        let s = &self.strategy;
        if s.rsi_oversold >= s.rsi_overbought {
            return Err(ConfigError::Message(format!(
                "rsi_oversold {} must be below rsi_overbought {}",
                s.rsi_oversold, s.rsi_overbought
            )));
        }
        if s.bb_std_dev.is_nan() || s.bb_std_dev < 0.0 {
            return Err(ConfigError::Message("bb_std_dev must not be negative".into()));
        }
        if [s.ema_fast, s.ema_slow, s.macd_signal, s.rsi_period].contains(&0) || s.bb_period < 2 {
            return Err(ConfigError::Message("indicator periods must be positive".into()));
        }
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Message("poll_interval_secs must be positive".into()));
        }
        let required = self.strategy.required_candles();
        if usize::from(self.kline_limit) < required {
            return Err(ConfigError::Message(format!(
                "kline_limit {} is below the {} candles the indicators need",
                self.kline_limit, required
            )));
        }
        if self.live_trading && (self.api_key.is_empty() || self.secret_key.is_empty()) {
            return Err(ConfigError::Message(
                "live trading needs BINANCE_API_KEY and BINANCE_SECRET_KEY".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.strategy.required_candles(), 26);
        assert_eq!(config.symbols.len(), 2);
        assert_eq!(config.symbols[0].investment, Decimal::new(15, 1));
    }

    #[test]
    fn live_mode_requires_credentials() {
        let config = AppConfig {
            live_trading: true,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());

        let config = AppConfig {
            live_trading: true,
            api_key: "key".into(),
            secret_key: "secret".into(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_short_kline_window() {
        let config = AppConfig {
            kline_limit: 20,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_inverted_exit_multipliers() {
        let mut config = AppConfig::default();
        config.strategy.stop_loss_multiplier = Decimal::new(102, 2);
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.strategy.profit_target_multiplier = Decimal::new(99, 2);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_inverted_rsi_thresholds_and_negative_band_width() {
        let mut config = AppConfig::default();
        config.strategy.rsi_oversold = 70.0;
        config.strategy.rsi_overbought = 30.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.strategy.rsi_oversold = 50.0;
        config.strategy.rsi_overbought = 50.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.strategy.bb_std_dev = -1.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.strategy.bb_std_dev = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn loads_symbols_from_toml() {
        let raw = r#"
            live_trading = false
            poll_interval_secs = 5

            [[symbols]]
            symbol = "DOGEUSDT"
            investment = "2.5"

            [strategy]
            rsi_period = 10
        "#;
        let config: AppConfig = Config::builder()
            .add_source(File::from_str(raw, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.poll_interval_secs, 5);
        assert_eq!(
            config.symbols,
            vec![SymbolConfig {
                symbol: "DOGEUSDT".into(),
                investment: Decimal::new(25, 1),
            }]
        );
        assert_eq!(config.strategy.rsi_period, 10);
        assert_eq!(config.strategy.ema_slow, 26);
    }
}
