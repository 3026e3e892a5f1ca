use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::LoanStatus;

/// 基準日時のクエリパラメータ（省略時は現在時刻）
#[derive(Debug, Default, Deserialize)]
pub struct AsOfQuery {
    pub as_of: Option<DateTime<Utc>>,
}

impl AsOfQuery {
    pub fn resolve(&self) -> DateTime<Utc> {
        self.as_of.unwrap_or_else(Utc::now)
    }
}

/// 会員の貸出一覧取得のクエリパラメータ
#[derive(Debug, Default, Deserialize)]
pub struct MemberLoansQuery {
    /// ステータスでフィルタリング（scheduled, on_loan, returned, ...）
    pub status: Option<LoanStatus>,
}

/// エラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code,
            message: message.into(),
        }
    }
}
