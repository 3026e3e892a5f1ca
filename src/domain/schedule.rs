//! 貸出スケジュールの区間エンジン
//!
//! 1つの資料に対する貸出区間（過去・現在・予約）を時系列で保持し、
//! 新しい区間が既存のどの区間とも重ならず、接しもしないかを判定する。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DateRange, LoanId};

/// 純粋関数：提案された区間が既存区間の隙間に収まるか
///
/// `existing`は開始日時でソート済みかつ互いに重ならないこと。
/// 判定は厳密：前の区間の終了と同時刻に開始する、または次の区間の開始と
/// 同時刻に終了する提案は拒否される。空のリストなら常に受け入れる。
pub fn is_proposal_viable(proposed: &DateRange, existing: &[DateRange]) -> bool {
    // 提案の開始以降に終わる最初の区間
    let next = existing.partition_point(|interval| interval.end() < proposed.start());

    match existing.get(next) {
        Some(interval) => proposed.end() < interval.start(),
        None => true,
    }
}

/// 純粋関数：返却期限までの日数
///
/// 正なら残り日数、負なら延滞日数、0なら当日。
/// 1日未満の差は0に切り捨てる（小数は返さない）。
pub fn days_until_due(due_date: DateTime<Utc>, as_of: DateTime<Utc>) -> i64 {
    (due_date - as_of).num_days()
}

/// 純粋関数：延滞判定
pub fn is_late(due_date: DateTime<Utc>, as_of: DateTime<Utc>) -> bool {
    days_until_due(due_date, as_of) < 0
}

/// タイムライン上の1区間
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub loan_id: LoanId,
    pub period: DateRange,
}

/// 資料ごとの貸出タイムライン
///
/// 常に開始日時の昇順で保持する。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoanTimeline {
    entries: Vec<TimelineEntry>,
    periods: Vec<DateRange>,
}

impl LoanTimeline {
    pub fn new(entries: impl IntoIterator<Item = TimelineEntry>) -> Self {
        let mut entries: Vec<TimelineEntry> = entries.into_iter().collect();
        entries.sort_by_key(|entry| (entry.period.start(), entry.period.end()));
        let periods = entries.iter().map(|entry| entry.period).collect();
        Self { entries, periods }
    }

    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 区間を追加できるか
    pub fn accepts(&self, proposed: &DateRange) -> bool {
        is_proposal_viable(proposed, &self.periods)
    }

    /// 指定した貸出を除いたタイムライン（更新時の再判定用）
    pub fn without(&self, loan_id: LoanId) -> LoanTimeline {
        LoanTimeline::new(
            self.entries
                .iter()
                .filter(|entry| entry.loan_id != loan_id)
                .copied(),
        )
    }

    /// `at`を含む区間
    pub fn covering(&self, at: DateTime<Utc>) -> Option<&TimelineEntry> {
        let candidate = self.periods.partition_point(|period| period.start() <= at);
        candidate
            .checked_sub(1)
            .map(|index| &self.entries[index])
            .filter(|entry| entry.period.contains(at))
    }

    /// `after`より後に始まる区間
    pub fn upcoming(&self, after: DateTime<Utc>) -> impl Iterator<Item = &TimelineEntry> {
        let first = self.periods.partition_point(|period| period.start() <= after);
        self.entries[first..].iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap() + Duration::days(n)
    }

    fn range(start: i64, end: i64) -> DateRange {
        DateRange::new(day(start), day(end)).unwrap()
    }

    /// 1区間ずつ前後の隙間を確認する素朴な走査
    fn viable_by_walk(proposed: &DateRange, existing: &[DateRange]) -> bool {
        let mut previous_end: Option<DateTime<Utc>> = None;
        for interval in existing {
            let after_previous = previous_end.is_none_or(|end| proposed.start() > end);
            if after_previous && proposed.end() < interval.start() {
                return true;
            }
            previous_end = Some(interval.end());
        }
        previous_end.is_none_or(|end| proposed.start() > end)
    }

    #[test]
    fn test_empty_list_accepts_any_proposal() {
        assert!(is_proposal_viable(&range(0, 1), &[]));
        assert!(is_proposal_viable(&range(-100, 100), &[]));
    }

    #[test]
    fn test_touching_end_boundary_is_rejected() {
        let existing = [range(10, 20)];
        assert!(!is_proposal_viable(&range(20, 30), &existing));
        assert!(is_proposal_viable(&range(21, 30), &existing));
    }

    #[test]
    fn test_sub_microsecond_gap_counts_as_touching() {
        let existing = [range(10, 20)];
        let proposed = DateRange::new(day(20) + Duration::nanoseconds(500), day(30)).unwrap();
        assert!(!is_proposal_viable(&proposed, &existing));

        let proposed = DateRange::new(day(20) + Duration::microseconds(1), day(30)).unwrap();
        assert!(is_proposal_viable(&proposed, &existing));
    }

    #[test]
    fn test_touching_start_boundary_is_rejected() {
        let existing = [range(10, 20)];
        assert!(!is_proposal_viable(&range(5, 10), &existing));
        assert!(is_proposal_viable(&range(5, 9), &existing));
    }

    #[test]
    fn test_gap_between_neighbours() {
        let existing = [range(0, 5), range(10, 15), range(30, 40)];
        assert!(is_proposal_viable(&range(16, 29), &existing));
        assert!(!is_proposal_viable(&range(16, 30), &existing));
        assert!(!is_proposal_viable(&range(15, 20), &existing));
        assert!(!is_proposal_viable(&range(6, 16), &existing));
        assert!(is_proposal_viable(&range(41, 50), &existing));
        assert!(is_proposal_viable(&range(-10, -1), &existing));
    }

    #[test]
    fn test_proposal_enclosing_existing_is_rejected() {
        let existing = [range(10, 12)];
        assert!(!is_proposal_viable(&range(0, 30), &existing));
        assert!(!is_proposal_viable(&range(11, 30), &existing));
    }

    #[test]
    fn test_matches_linear_walk_on_grid() {
        let existing = [range(2, 4), range(7, 8), range(12, 18), range(20, 21)];
        for start in -1..24 {
            for end in (start + 1)..25 {
                let proposed = range(start, end);
                assert_eq!(
                    is_proposal_viable(&proposed, &existing),
                    viable_by_walk(&proposed, &existing),
                    "proposal [{}, {}]",
                    start,
                    end
                );
            }
        }
    }

    #[test]
    fn test_sub_day_difference_is_zero() {
        let due = day(15);
        assert_eq!(days_until_due(due, due), 0);
        assert_eq!(days_until_due(due, due - Duration::hours(23)), 0);
        assert_eq!(days_until_due(due, due + Duration::hours(23)), 0);
    }

    #[test]
    fn test_days_until_due_sign() {
        let due = day(15);
        assert_eq!(days_until_due(due, day(10)), 5);
        assert_eq!(days_until_due(due, day(18)), -3);
    }

    #[test]
    fn test_is_late_boundaries() {
        let due = day(15);
        assert!(!is_late(due, due));
        assert!(is_late(due, due + Duration::days(1)));
    }

    #[test]
    fn test_timeline_sorts_entries() {
        let late = TimelineEntry {
            loan_id: LoanId::new(),
            period: range(30, 40),
        };
        let early = TimelineEntry {
            loan_id: LoanId::new(),
            period: range(0, 10),
        };
        let timeline = LoanTimeline::new([late, early]);
        assert_eq!(timeline.entries(), &[early, late]);
        assert!(timeline.accepts(&range(11, 29)));
        assert!(!timeline.accepts(&range(10, 29)));
    }

    #[test]
    fn test_timeline_without_frees_slot() {
        let current = TimelineEntry {
            loan_id: LoanId::new(),
            period: range(0, 10),
        };
        let next = TimelineEntry {
            loan_id: LoanId::new(),
            period: range(20, 25),
        };
        let timeline = LoanTimeline::new([current, next]);
        let remaining = timeline.without(current.loan_id);

        assert!(remaining.accepts(&range(0, 19)));
        assert!(!remaining.accepts(&range(0, 20)));
    }

    #[test]
    fn test_timeline_covering() {
        let first = TimelineEntry {
            loan_id: LoanId::new(),
            period: range(0, 10),
        };
        let second = TimelineEntry {
            loan_id: LoanId::new(),
            period: range(20, 25),
        };
        let timeline = LoanTimeline::new([first, second]);

        assert_eq!(timeline.covering(day(0)), Some(&first));
        assert_eq!(timeline.covering(day(10)), Some(&first));
        assert_eq!(timeline.covering(day(15)), None);
        assert_eq!(timeline.covering(day(22)), Some(&second));
        assert_eq!(timeline.covering(day(-1)), None);
    }

    #[test]
    fn test_timeline_upcoming() {
        let first = TimelineEntry {
            loan_id: LoanId::new(),
            period: range(0, 10),
        };
        let second = TimelineEntry {
            loan_id: LoanId::new(),
            period: range(20, 25),
        };
        let timeline = LoanTimeline::new([first, second]);

        let upcoming: Vec<_> = timeline.upcoming(day(5)).collect();
        assert_eq!(upcoming, vec![&second]);
        assert_eq!(timeline.upcoming(day(30)).count(), 0);
    }
}
