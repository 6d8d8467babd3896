// libs/progress-cell/src/services/aggregator.rs
use chrono::{Datelike, Duration, NaiveDate};

use crate::models::{ProgressRecord, ProgressSummary};

pub const DAILY_WINDOW: usize = 7;
pub const WEEKLY_WINDOW: usize = 6;

/// Monday of the ISO week containing `day`.
pub fn week_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(i64::from(day.weekday().num_days_from_monday()))
}

/// Earliest date that can affect a summary anchored at `today`.
pub fn window_start(today: NaiveDate) -> NaiveDate {
    week_start(today) - Duration::weeks(WEEKLY_WINDOW as i64 - 1)
}

/// Roll raw check-ins up into the chart series and headline numbers.
/// Output depends only on `records` and `today`.
pub fn summarize(records: &[ProgressRecord], today: NaiveDate) -> ProgressSummary {
    let daily = DailyPain::collect(records, today);
    let daily_pain = daily.series();
    let weekly_adherence = weekly_adherence_series(records, today);

    ProgressSummary {
        daily_pain,
        weekly_adherence,
        weekly_adherence_percent: weekly_adherence[WEEKLY_WINDOW - 1],
        pain_delta_percent: daily.delta_percent(),
        average_pain: daily_pain.iter().sum::<f64>() / DAILY_WINDOW as f64,
    }
}

/// Per-day pain totals, kept as integers so the delta can be computed exactly.
struct DailyPain {
    sums: [u32; DAILY_WINDOW],
    counts: [u32; DAILY_WINDOW],
}

impl DailyPain {
    fn collect(records: &[ProgressRecord], today: NaiveDate) -> Self {
        let mut sums = [0u32; DAILY_WINDOW];
        let mut counts = [0u32; DAILY_WINDOW];

        for record in records {
            let Some(pain) = record.pain_level else {
                continue;
            };
            let days_ago = (today - record.date).num_days();
            if !(0..DAILY_WINDOW as i64).contains(&days_ago) {
                continue;
            }
            let index = DAILY_WINDOW - 1 - days_ago as usize;
            sums[index] += u32::from(pain);
            counts[index] += 1;
        }

        Self { sums, counts }
    }

    /// Average pain per day; days without data are 0.
    fn series(&self) -> [f64; DAILY_WINDOW] {
        let mut series = [0.0; DAILY_WINDOW];
        for (index, value) in series.iter_mut().enumerate() {
            if self.counts[index] > 0 {
                *value = f64::from(self.sums[index]) / f64::from(self.counts[index]);
            }
        }
        series
    }

    /// Percentage change from the first to the last day, truncated toward zero.
    /// A zero baseline yields 0.
    ///
    /// With first = s0/c0 and last = s6/c6 this is
    /// (s6*c0 - s0*c6) * 100 / (s0*c6), evaluated in integers.
    fn delta_percent(&self) -> i64 {
        let (first_sum, first_count) = (i64::from(self.sums[0]), i64::from(self.counts[0]));
        let last = DAILY_WINDOW - 1;
        let (last_sum, last_count) = (i64::from(self.sums[last]), i64::from(self.counts[last]));

        if first_sum == 0 {
            return 0;
        }
        // An empty last day averages to 0.
        if last_count == 0 {
            return -100;
        }

        (last_sum * first_count - first_sum * last_count) * 100 / (first_sum * last_count)
    }
}

fn weekly_adherence_series(records: &[ProgressRecord], today: NaiveDate) -> [u32; WEEKLY_WINDOW] {
    let current_week = week_start(today);
    let mut completed = [0u32; WEEKLY_WINDOW];
    let mut totals = [0u32; WEEKLY_WINDOW];

    for record in records {
        let weeks_ago = (current_week - week_start(record.date)).num_days() / 7;
        if !(0..WEEKLY_WINDOW as i64).contains(&weeks_ago) {
            continue;
        }
        let index = WEEKLY_WINDOW - 1 - weeks_ago as usize;
        totals[index] += 1;
        if record.is_completed {
            completed[index] += 1;
        }
    }

    let mut series = [0u32; WEEKLY_WINDOW];
    for (index, value) in series.iter_mut().enumerate() {
        if totals[index] > 0 {
            *value = completed[index] * 100 / totals[index];
        }
    }
    series
}
