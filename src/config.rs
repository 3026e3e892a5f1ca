use chrono::Duration;
use thiserror::Error;

use crate::domain::{Money, RenewalLimit};

/// 設定のエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    /// エラーコード（1xx: 設定）
    pub fn code(&self) -> u16 {
        match self {
            ConfigError::InvalidValue { .. } => 101,
        }
    }
}

/// 貸出業務の設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LibrarySettings {
    /// 延滞1日あたりの罰金
    pub fine_rate_per_day: Money,
    /// 更新回数の上限（0は無制限）
    pub renewal_limit: RenewalLimit,
    /// `loan_item`で返却期限を省略したときの貸出日数
    pub loan_length_days: i64,
}

/// 貸出日数の上限（10年）
pub const MAX_LOAN_LENGTH_DAYS: i64 = 3_650;

/// 罰金日額の上限（10,000.00）
pub const MAX_FINE_RATE_PER_DAY: Money = Money::from_minor(1_000_000);

impl LibrarySettings {
    /// 既定の貸出期間。`Duration`で表せない日数なら`None`。
    pub fn loan_length(&self) -> Option<Duration> {
        Duration::try_days(self.loan_length_days)
    }
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            fine_rate_per_day: Money::from_minor(20),
            renewal_limit: RenewalLimit::new(2),
            loan_length_days: 12,
        }
    }
}

/// アプリケーション全体の設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub settings: LibrarySettings,
}

impl AppConfig {
    /// 環境変数から設定を読み込む
    ///
    /// 未設定の項目は既定値を使う。値が不正な場合はエラー。
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意の参照関数から設定を読み込む（テスト用に分離）
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = LibrarySettings::default();

        let database_url = lookup("DATABASE_URL")
            .unwrap_or_else(|| "postgres://localhost/librarian".to_string());

        let port = parse_or("PORT", &lookup, 3000u16)?;

        let fine_rate_per_day = match lookup("LIBRARIAN_FINE_RATE") {
            Some(raw) => {
                let rate: Money = raw.parse().map_err(|e: crate::domain::ParseMoneyError| {
                    ConfigError::InvalidValue {
                        key: "LIBRARIAN_FINE_RATE",
                        value: raw.clone(),
                        reason: e.to_string(),
                    }
                })?;
                if rate < Money::ZERO {
                    return Err(ConfigError::InvalidValue {
                        key: "LIBRARIAN_FINE_RATE",
                        value: raw,
                        reason: "must not be negative".to_string(),
                    });
                }
                if rate > MAX_FINE_RATE_PER_DAY {
                    return Err(ConfigError::InvalidValue {
                        key: "LIBRARIAN_FINE_RATE",
                        value: raw,
                        reason: format!("must not exceed {}", MAX_FINE_RATE_PER_DAY),
                    });
                }
                rate
            }
            None => defaults.fine_rate_per_day,
        };

        let renewal_limit = RenewalLimit::new(parse_or(
            "LIBRARIAN_RENEWAL_LIMIT",
            &lookup,
            defaults.renewal_limit.value(),
        )?);

        let loan_length_days = parse_or(
            "LIBRARIAN_LOAN_LENGTH_DAYS",
            &lookup,
            defaults.loan_length_days,
        )?;
        if !(1..=MAX_LOAN_LENGTH_DAYS).contains(&loan_length_days) {
            return Err(ConfigError::InvalidValue {
                key: "LIBRARIAN_LOAN_LENGTH_DAYS",
                value: loan_length_days.to_string(),
                reason: format!("must be between 1 and {} days", MAX_LOAN_LENGTH_DAYS),
            });
        }

        Ok(Self {
            database_url,
            port,
            settings: LibrarySettings {
                fine_rate_per_day,
                renewal_limit,
                loan_length_days,
            },
        })
    }
}

fn parse_or<T>(
    key: &'static str,
    lookup: &impl Fn(&str) -> Option<String>,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
