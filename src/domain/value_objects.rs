use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul, Sub};
use std::str::FromStr;
use uuid::Uuid;

/// UUIDをラップした識別子型を定義する
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn value(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

uuid_id!(
    /// 貸出ID
    LoanId
);
uuid_id!(
    /// 資料ID - 貸出対象の所蔵品
    ItemId
);
uuid_id!(
    /// 会員ID
    MemberId
);
uuid_id!(
    /// 罰金ID
    FineId
);

// ============================================================================
// 期間
// ============================================================================

/// 期間エラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateRangeError {
    /// 終了日時が開始日時以前
    EndNotAfterStart,
}

impl fmt::Display for DateRangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateRangeError::EndNotAfterStart => write!(f, "end must be after start"),
        }
    }
}

impl std::error::Error for DateRangeError {}

/// 永続化と同じ精度（マイクロ秒）に丸める
///
/// TIMESTAMPTZはマイクロ秒精度のため、保存前後で区間の前後関係が変わらないよう
/// 区間の両端は常にこの精度で保持する。
pub fn truncate_to_micros(at: DateTime<Utc>) -> DateTime<Utc> {
    at.trunc_subsecs(6)
}

/// 貸出期間 `[start, end]`
///
/// 不変条件：`end > start`（`new`経由の場合）。両端はマイクロ秒精度。
/// 返却済み貸出の占有区間のみ`start == end`を取り得る。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawDateRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = DateRangeError;

    fn try_from(raw: RawDateRange) -> Result<Self, Self::Error> {
        DateRange::new(raw.start, raw.end)
    }
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, DateRangeError> {
        let (start, end) = (truncate_to_micros(start), truncate_to_micros(end));
        if end <= start {
            return Err(DateRangeError::EndNotAfterStart);
        }
        Ok(Self { start, end })
    }

    /// 検証なしで区間を作る（占有区間の算出用）
    pub(crate) fn spanning(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        let start = truncate_to_micros(start);
        Self {
            start,
            end: truncate_to_micros(end).max(start),
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// 両端を含めて`at`が区間内か
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }

    /// 終了日時だけを差し替えた区間
    pub fn with_end(&self, end: DateTime<Utc>) -> Result<Self, DateRangeError> {
        Self::new(self.start, end)
    }
}

// ============================================================================
// 金額
// ============================================================================

/// 金額のパースエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMoneyError(pub String);

impl fmt::Display for ParseMoneyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid money amount: {}", self.0)
    }
}

impl std::error::Error for ParseMoneyError {}

/// 金額（補助通貨単位の整数、例: セント）
///
/// 浮動小数点は使わない。`Display`は`"6.00"`形式。
/// 演算はi64の範囲で飽和する。
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    pub fn minor(&self) -> i64 {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl Mul<i64> for Money {
    type Output = Money;

    fn mul(self, rhs: i64) -> Money {
        Money(self.0.saturating_mul(rhs))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl FromStr for Money {
    type Err = ParseMoneyError;

    /// `"2"`, `"2.5"`, `"2.50"`を受け付ける。小数点以下3桁以上は不可。
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseMoneyError(s.to_string());
        let trimmed = s.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
        if whole.is_empty() || fraction.len() > 2 {
            return Err(invalid());
        }
        if !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let whole: i64 = whole.parse().map_err(|_| invalid())?;
        let cents: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse().map_err(|_| invalid())?,
        };
        let minor = whole
            .checked_mul(100)
            .and_then(|w| w.checked_add(cents))
            .ok_or_else(invalid)?;
        Ok(Money(if negative { -minor } else { minor }))
    }
}

// ============================================================================
// 貸出状態
// ============================================================================

/// 貸出ステータス
///
/// 数値コードは永続化とAPIで使われるため変更しないこと。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    /// 貸出中
    OnLoan,
    /// 返却済み
    Returned,
    /// 延滞返却（罰金免除）
    ReturnedLate,
    /// 延滞返却（罰金あり）
    ReturnedLateFined,
    /// 予約済み（未貸出）
    Scheduled,
}

impl LoanStatus {
    pub fn code(&self) -> u8 {
        match self {
            LoanStatus::OnLoan => 1,
            LoanStatus::Returned => 2,
            LoanStatus::ReturnedLate => 3,
            LoanStatus::ReturnedLateFined => 4,
            LoanStatus::Scheduled => 5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::OnLoan => "on_loan",
            LoanStatus::Returned => "returned",
            LoanStatus::ReturnedLate => "returned_late",
            LoanStatus::ReturnedLateFined => "returned_late_fined",
            LoanStatus::Scheduled => "scheduled",
        }
    }

    /// 終端状態か
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LoanStatus::Returned | LoanStatus::ReturnedLate | LoanStatus::ReturnedLateFined
        )
    }
}

impl TryFrom<u8> for LoanStatus {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(LoanStatus::OnLoan),
            2 => Ok(LoanStatus::Returned),
            3 => Ok(LoanStatus::ReturnedLate),
            4 => Ok(LoanStatus::ReturnedLateFined),
            5 => Ok(LoanStatus::Scheduled),
            _ => Err(format!("Invalid loan status code: {}", code)),
        }
    }
}

// ============================================================================
// 更新回数
// ============================================================================

/// 更新回数の上限（0は無制限）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenewalLimit(u32);

impl RenewalLimit {
    pub const UNLIMITED: RenewalLimit = RenewalLimit(0);

    pub fn new(limit: u32) -> Self {
        Self(limit)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    /// `count`回更新済みの貸出をさらに更新できるか
    pub fn allows(&self, count: RenewalCount) -> bool {
        self.0 == 0 || count.value() < self.0
    }
}

/// 更新回数エラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenewalError {
    /// 更新回数の上限に達した
    LimitReached,
}

/// 更新回数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenewalCount(u32);

impl RenewalCount {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn from_value(value: u32) -> Self {
        Self(value)
    }

    /// 上限を確認したうえで回数を増やす
    ///
    /// # エラー
    /// 上限に達している場合は`RenewalError::LimitReached`を返す
    pub fn increment(self, limit: RenewalLimit) -> Result<Self, RenewalError> {
        if !limit.allows(self) {
            return Err(RenewalError::LimitReached);
        }
        Ok(Self(self.0 + 1))
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

// ============================================================================
// 資料・罰金の属性
// ============================================================================

/// 資料の状態評価
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCondition {
    Perfect,
    Good,
    Acceptable,
    Poor,
    Broken,
}

impl ItemCondition {
    /// 評価値（4が最良、0が破損）
    pub fn rating(&self) -> u8 {
        match self {
            ItemCondition::Perfect => 4,
            ItemCondition::Good => 3,
            ItemCondition::Acceptable => 2,
            ItemCondition::Poor => 1,
            ItemCondition::Broken => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemCondition::Perfect => "perfect",
            ItemCondition::Good => "good",
            ItemCondition::Acceptable => "acceptable",
            ItemCondition::Poor => "poor",
            ItemCondition::Broken => "broken",
        }
    }
}

impl FromStr for ItemCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "perfect" => Ok(ItemCondition::Perfect),
            "good" => Ok(ItemCondition::Good),
            "acceptable" => Ok(ItemCondition::Acceptable),
            "poor" => Ok(ItemCondition::Poor),
            "broken" => Ok(ItemCondition::Broken),
            _ => Err(format!("Invalid item condition: {}", s)),
        }
    }
}

/// 罰金ステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FineStatus {
    Active,
    Cancelled,
}

impl FineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FineStatus::Active => "active",
            FineStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for FineStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(FineStatus::Active),
            "cancelled" => Ok(FineStatus::Cancelled),
            _ => Err(format!("Invalid fine status: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(n)
    }

    #[test]
    fn test_date_range_rejects_end_before_or_at_start() {
        assert_eq!(
            DateRange::new(day(5), day(5)),
            Err(DateRangeError::EndNotAfterStart)
        );
        assert_eq!(
            DateRange::new(day(5), day(4)),
            Err(DateRangeError::EndNotAfterStart)
        );
        assert!(DateRange::new(day(4), day(5)).is_ok());
    }

    #[test]
    fn test_date_range_is_kept_at_microsecond_precision() {
        let range =
            DateRange::new(day(1) + Duration::nanoseconds(1_500), day(2) + Duration::nanoseconds(999))
                .unwrap();
        assert_eq!(range.start(), day(1) + Duration::microseconds(1));
        assert_eq!(range.end(), day(2));

        // 丸めた結果が同じ時刻になる区間は作れない
        assert_eq!(
            DateRange::new(day(3), day(3) + Duration::nanoseconds(500)),
            Err(DateRangeError::EndNotAfterStart)
        );
    }

    #[test]
    fn test_date_range_deserialize_is_validated() {
        let valid = serde_json::json!({ "start": day(1), "end": day(2) });
        let range: DateRange = serde_json::from_value(valid).unwrap();
        assert_eq!(range, DateRange::new(day(1), day(2)).unwrap());

        let inverted = serde_json::json!({ "start": day(2), "end": day(1) });
        assert!(serde_json::from_value::<DateRange>(inverted).is_err());
    }

    #[test]
    fn test_date_range_contains_is_inclusive() {
        let range = DateRange::new(day(10), day(20)).unwrap();
        assert!(range.contains(day(10)));
        assert!(range.contains(day(20)));
        assert!(!range.contains(day(21)));
        assert!(!range.contains(day(9)));
    }

    #[test]
    fn test_money_arithmetic_saturates() {
        let huge = Money::from_minor(i64::MAX / 2);
        assert_eq!(huge * 3, Money::from_minor(i64::MAX));
        assert_eq!(huge + huge + huge, Money::from_minor(i64::MAX));
        assert_eq!(
            Money::from_minor(i64::MIN) - Money::from_minor(1),
            Money::from_minor(i64::MIN)
        );
        assert_eq!(Money::from_minor(200) * 3, Money::from_minor(600));
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::from_minor(600).to_string(), "6.00");
        assert_eq!(Money::from_minor(5).to_string(), "0.05");
        assert_eq!(Money::from_minor(-125).to_string(), "-1.25");
    }

    #[test]
    fn test_money_parse() {
        assert_eq!("2".parse::<Money>().unwrap(), Money::from_minor(200));
        assert_eq!("2.5".parse::<Money>().unwrap(), Money::from_minor(250));
        assert_eq!("0.20".parse::<Money>().unwrap(), Money::from_minor(20));
        assert!("2.555".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!(".5".parse::<Money>().is_err());
    }

    #[test]
    fn test_money_arithmetic() {
        let rate = Money::from_minor(200);
        assert_eq!(rate * 3, Money::from_minor(600));
        let total: Money = vec![rate, rate].into_iter().sum();
        assert_eq!(total - rate, rate);
    }

    #[test]
    fn test_loan_status_codes_round_trip() {
        for status in [
            LoanStatus::OnLoan,
            LoanStatus::Returned,
            LoanStatus::ReturnedLate,
            LoanStatus::ReturnedLateFined,
            LoanStatus::Scheduled,
        ] {
            assert_eq!(LoanStatus::try_from(status.code()), Ok(status));
        }
        assert!(LoanStatus::try_from(0).is_err());
        assert_eq!(LoanStatus::Scheduled.code(), 5);
    }

    #[test]
    fn test_renewal_count_unlimited() {
        let mut count = RenewalCount::new();
        for _ in 0..50 {
            count = count.increment(RenewalLimit::UNLIMITED).unwrap();
        }
        assert_eq!(count.value(), 50);
    }

    #[test]
    fn test_renewal_count_stops_at_limit() {
        let limit = RenewalLimit::new(2);
        let count = RenewalCount::new().increment(limit).unwrap();
        let count = count.increment(limit).unwrap();
        assert_eq!(count.value(), 2);
        assert_eq!(count.increment(limit), Err(RenewalError::LimitReached));
    }

    #[test]
    fn test_id_creation() {
        assert_ne!(LoanId::new(), LoanId::new());
        let uuid = Uuid::new_v4();
        assert_eq!(ItemId::from_uuid(uuid).value(), uuid);
    }
}
