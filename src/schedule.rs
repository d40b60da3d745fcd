//! Expansion of nested day/week/period schedules into full-year series.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeDelta, TimeZone};
use chrono_tz::Tz;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::frame::TimeFrame;

/// Weekday keys accepted in week patterns, Monday first.
const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Compact nested schedule specification.
///
/// Three nesting levels: day patterns give intraday `"HH:MM"` breakpoints
/// carrying partial setpoint updates, week patterns assign a day pattern to
/// each weekday, and periods assign a week pattern to inclusive `"MM-DD"`
/// date ranges covering the whole year. Derives `Deserialize`, so it can be
/// fed from any serde format; the crate mandates none.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduleSpec {
    /// Day-pattern name to ordered `"HH:MM"` breakpoints to partial updates.
    pub days: BTreeMap<String, BTreeMap<String, BTreeMap<String, f64>>>,
    /// Week-pattern name to weekday name to day-pattern name.
    pub weeks: BTreeMap<String, BTreeMap<String, String>>,
    /// Inclusive `"MM-DD"` ranges with their week pattern.
    pub periods: Vec<PeriodSpec>,
    /// IANA timezone the expanded series is localized to.
    pub tz: String,
}

/// One date range of a [`ScheduleSpec`].
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PeriodSpec {
    /// First covered day, `"MM-DD"`.
    pub start: String,
    /// Last covered day, `"MM-DD"`, inclusive.
    pub end: String,
    /// Name of the week pattern applied over the range.
    pub week: String,
}

/// A day pattern compiled to sorted breakpoints over column indices.
#[derive(Debug, Clone)]
struct DayPattern {
    breakpoints: Vec<(NaiveTime, Vec<(usize, f64)>)>,
}

/// A week pattern compiled to day-pattern indices, Monday first.
#[derive(Debug, Clone)]
struct WeekPattern {
    day_for_weekday: [usize; 7],
}

/// A period compiled to month/day bounds and a week-pattern index.
#[derive(Debug, Clone)]
struct Period {
    start: (u32, u32),
    end: (u32, u32),
    week: usize,
}

/// Expands a [`ScheduleSpec`] into timezone-localized step series.
///
/// All cross-references and the year partition are validated once at
/// construction; expansion itself only fails on degenerate arguments.
///
/// # Examples
///
/// ```
/// use building_profiles::schedule::{ScheduleSpec, Scheduler};
/// use chrono::TimeDelta;
///
/// let spec: ScheduleSpec = toml::from_str(
///     r#"
///     tz = "Europe/Paris"
///     [days.every_day]
///     "06:00" = { heating = 20.0 }
///     "22:00" = { heating = 17.0 }
///     [weeks.all_year]
///     Monday = "every_day"
///     Tuesday = "every_day"
///     Wednesday = "every_day"
///     Thursday = "every_day"
///     Friday = "every_day"
///     Saturday = "every_day"
///     Sunday = "every_day"
///     [[periods]]
///     start = "01-01"
///     end = "12-31"
///     week = "all_year"
///     "#,
/// )
/// .expect("valid spec");
///
/// let scheduler = Scheduler::new(&spec).expect("consistent spec");
/// let series = scheduler
///     .get_full_year_time_series(TimeDelta::hours(1), 2009)
///     .expect("expansion");
/// assert_eq!(series.len(), 8760);
/// ```
#[derive(Debug, Clone)]
pub struct Scheduler {
    tz: Tz,
    columns: Vec<String>,
    days: Vec<DayPattern>,
    weeks: Vec<WeekPattern>,
    periods: Vec<Period>,
}

impl Scheduler {
    /// Compiles and validates a schedule specification.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for an unknown timezone, malformed
    /// `HH:MM` or `MM-DD` literals, dangling pattern references, a week
    /// pattern not covering all seven weekdays, or periods that fail to
    /// partition the year.
    pub fn new(spec: &ScheduleSpec) -> Result<Self> {
        let tz: Tz = spec
            .tz
            .parse()
            .map_err(|_| Error::Configuration(format!("unknown timezone \"{}\"", spec.tz)))?;

        // Setpoint columns: union over every day pattern, sorted by name.
        let names: BTreeSet<&str> = spec
            .days
            .values()
            .flat_map(|p| p.values())
            .flat_map(|u| u.keys())
            .map(String::as_str)
            .collect();
        let columns: Vec<String> = names.iter().map(|s| (*s).to_string()).collect();
        let col_index: BTreeMap<&str, usize> =
            names.iter().enumerate().map(|(i, s)| (*s, i)).collect();

        let mut day_index = BTreeMap::new();
        let mut days = Vec::new();
        for (name, pattern) in &spec.days {
            let mut breakpoints = Vec::new();
            for (hhmm, updates) in pattern {
                let time = NaiveTime::parse_from_str(hhmm, "%H:%M").map_err(|_| {
                    Error::Configuration(format!(
                        "day pattern \"{name}\": invalid breakpoint time \"{hhmm}\""
                    ))
                })?;
                let updates: Vec<(usize, f64)> = updates
                    .iter()
                    .map(|(col, v)| (col_index[col.as_str()], *v))
                    .collect();
                breakpoints.push((time, updates));
            }
            breakpoints.sort_by_key(|(t, _)| *t);
            day_index.insert(name.as_str(), days.len());
            days.push(DayPattern { breakpoints });
        }

        let mut week_index = BTreeMap::new();
        let mut weeks = Vec::new();
        for (name, mapping) in &spec.weeks {
            for key in mapping.keys() {
                if !WEEKDAYS.contains(&key.as_str()) {
                    return Err(Error::Configuration(format!(
                        "week pattern \"{name}\": unknown weekday \"{key}\""
                    )));
                }
            }
            let mut day_for_weekday = [0_usize; 7];
            for (wi, weekday) in WEEKDAYS.iter().enumerate() {
                let day_name = mapping.get(*weekday).ok_or_else(|| {
                    Error::Configuration(format!(
                        "week pattern \"{name}\" has no entry for {weekday}"
                    ))
                })?;
                day_for_weekday[wi] = *day_index.get(day_name.as_str()).ok_or_else(|| {
                    Error::Configuration(format!(
                        "week pattern \"{name}\": unknown day pattern \"{day_name}\""
                    ))
                })?;
            }
            week_index.insert(name.as_str(), weeks.len());
            weeks.push(WeekPattern { day_for_weekday });
        }

        if spec.periods.is_empty() {
            return Err(Error::Configuration("periods must not be empty".to_string()));
        }
        let mut periods = Vec::new();
        for p in &spec.periods {
            let start = parse_month_day(&p.start)?;
            let end = parse_month_day(&p.end)?;
            if start > end {
                return Err(Error::Configuration(format!(
                    "period {}..{} is reversed",
                    p.start, p.end
                )));
            }
            let week = *week_index.get(p.week.as_str()).ok_or_else(|| {
                Error::Configuration(format!("period references unknown week pattern \"{}\"", p.week))
            })?;
            periods.push(Period { start, end, week });
        }
        validate_partition(&periods)?;

        Ok(Self {
            tz,
            columns,
            days,
            weeks,
            periods,
        })
    }

    /// The configured timezone.
    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Setpoint column names, in output order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Expands the schedule over a full calendar year.
    ///
    /// Rows are stepped in absolute time from local Jan 1 00:00 and labeled
    /// in the configured timezone, so a spring-forward day carries one
    /// step-hour less and a fall-back day one more. Breakpoints apply
    /// chronologically with forward-fill; each day starts from the previous
    /// day's final state, and Jan 1 inherits the year-end state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a non-positive frequency or an
    /// unrepresentable year, and [`Error::Configuration`] if a setpoint is
    /// never assigned by any scheduled day pattern.
    pub fn get_full_year_time_series(
        &self,
        freq: TimeDelta,
        year: i32,
    ) -> Result<TimeFrame<DateTime<Tz>>> {
        if freq <= TimeDelta::zero() {
            return Err(Error::InvalidInput("frequency must be positive".to_string()));
        }
        let start = self
            .tz
            .with_ymd_and_hms(year, 1, 1, 0, 0, 0)
            .earliest()
            .ok_or_else(|| {
                Error::InvalidInput(format!("cannot localize {year}-01-01 00:00 in {}", self.tz))
            })?;

        let mut state = self.year_end_state(year)?;
        let mut index: Vec<DateTime<Tz>> = Vec::new();
        let mut values: Vec<Vec<f64>> = vec![Vec::new(); self.columns.len()];

        let mut t = start;
        let mut current = t.date_naive();
        let mut pattern = &self.days[self.day_pattern_index(current)?];
        let mut bp_pos = 0;
        while t.year() == year {
            let date = t.date_naive();
            while current < date {
                // Close out the finished day so midnight wraps its last state.
                for (_, updates) in &pattern.breakpoints[bp_pos..] {
                    for &(ci, v) in updates {
                        state[ci] = v;
                    }
                }
                current = current.succ_opt().unwrap_or(date);
                pattern = &self.days[self.day_pattern_index(current)?];
                bp_pos = 0;
            }
            let local_time = t.time();
            while bp_pos < pattern.breakpoints.len() && pattern.breakpoints[bp_pos].0 <= local_time
            {
                for &(ci, v) in &pattern.breakpoints[bp_pos].1 {
                    state[ci] = v;
                }
                bp_pos += 1;
            }
            index.push(t);
            for (ci, column) in values.iter_mut().enumerate() {
                column.push(state[ci]);
            }
            t = t + freq;
        }
        debug!(rows = index.len(), year, tz = %self.tz, "expanded full-year schedule");

        let mut frame = TimeFrame::new(index)?;
        for (ci, column) in values.into_iter().enumerate() {
            frame.insert(self.columns[ci].clone(), column)?;
        }
        Ok(frame)
    }

    /// State after the last breakpoint of Dec 31, used to seed Jan 1.
    fn year_end_state(&self, year: i32) -> Result<Vec<f64>> {
        let mut seed: Vec<Option<f64>> = vec![None; self.columns.len()];
        let mut date = NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(|| Error::InvalidInput(format!("unrepresentable year {year}")))?;
        while date.year() == year {
            let pattern = &self.days[self.day_pattern_index(date)?];
            for (_, updates) in &pattern.breakpoints {
                for &(ci, v) in updates {
                    seed[ci] = Some(v);
                }
            }
            date = match date.succ_opt() {
                Some(next) => next,
                None => break,
            };
        }
        seed.into_iter()
            .enumerate()
            .map(|(ci, v)| {
                v.ok_or_else(|| {
                    Error::Configuration(format!(
                        "setpoint \"{}\" is never set by any scheduled day pattern",
                        self.columns[ci]
                    ))
                })
            })
            .collect()
    }

    /// Day-pattern index governing `date`.
    fn day_pattern_index(&self, date: NaiveDate) -> Result<usize> {
        let md = (date.month(), date.day());
        let period = self
            .periods
            .iter()
            .find(|p| p.start <= md && md <= p.end)
            .ok_or_else(|| {
                Error::Configuration(format!("date {date} is not covered by any period"))
            })?;
        let weekday = date.weekday().num_days_from_monday() as usize;
        Ok(self.weeks[period.week].day_for_weekday[weekday])
    }
}

/// Parses an `"MM-DD"` literal, accepting Feb 29.
fn parse_month_day(s: &str) -> Result<(u32, u32)> {
    let parsed = s.split_once('-').and_then(|(m, d)| {
        let month: u32 = m.parse().ok()?;
        let day: u32 = d.parse().ok()?;
        // Leap reference year so 02-29 validates.
        NaiveDate::from_ymd_opt(2000, month, day)?;
        Some((month, day))
    });
    parsed.ok_or_else(|| Error::Configuration(format!("invalid month-day \"{s}\"")))
}

/// Checks that the periods cover 01-01 through 12-31 without gap or overlap.
fn validate_partition(periods: &[Period]) -> Result<()> {
    let mut expected = (1, 1);
    for p in periods {
        if p.start != expected {
            return Err(Error::Configuration(format!(
                "periods leave a gap or overlap before {:02}-{:02}",
                p.start.0, p.start.1
            )));
        }
        let end = NaiveDate::from_ymd_opt(2000, p.end.0, p.end.1).ok_or_else(|| {
            Error::Configuration(format!("invalid month-day {:02}-{:02}", p.end.0, p.end.1))
        })?;
        expected = match end.succ_opt() {
            Some(next) if next.year() == 2000 => (next.month(), next.day()),
            _ => (13, 1), // past year end
        };
    }
    if expected != (13, 1) {
        return Err(Error::Configuration(
            "periods do not extend through 12-31".to_string(),
        ));
    }
    Ok(())
}
