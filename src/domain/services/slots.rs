use crate::domain::models::availability::{AvailabilityException, AvailabilityWindow, ExceptionKind};
use crate::domain::models::booking::BookingRequest;
use crate::domain::models::calendar::BusyInterval;
use crate::error::EngineError;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use std::cmp::{max, min};

const TOTAL_MINUTES: usize = 1440;
const GRID_MINUTES: usize = 15;

/// Everything slot generation needs, pre-fetched by the caller. Generation
/// itself is pure: identical input yields identical output.
pub struct SlotQuery<'a> {
    pub timezone: &'a str,
    pub min_notice_hours: i32,
    pub max_days_out: i32,
    pub buffer_minutes: i32,
    pub windows: &'a [AvailabilityWindow],
    pub exceptions: &'a [AvailabilityException],
    pub existing_bookings: &'a [BookingRequest],
    pub busy_intervals: &'a [BusyInterval],
    pub service_duration_minutes: i32,
    pub target_date: NaiveDate,
    pub now: DateTime<Utc>,
}

/// Computes the bookable start times for `target_date`, as ascending RFC 3339
/// UTC strings. An empty list means no availability, not an error.
pub fn calculate_slots(query: &SlotQuery) -> Result<Vec<String>, EngineError> {
    if query.service_duration_minutes <= 0 {
        return Err(EngineError::Validation(
            "Service duration must be positive".into(),
        ));
    }

    let tz: Tz = query.timezone.parse().unwrap_or(chrono_tz::UTC);

    // Dates beyond the lookahead horizon produce nothing at all.
    let horizon = (query.now + Duration::days(query.max_days_out as i64))
        .with_timezone(&tz)
        .date_naive();
    if query.target_date > horizon {
        return Ok(Vec::new());
    }

    let day_start_tz = tz
        .from_local_datetime(&query.target_date.and_hms_opt(0, 0, 0).unwrap())
        .earliest()
        .ok_or_else(|| EngineError::Validation("Invalid local day start".into()))?;
    let day_start_utc = day_start_tz.with_timezone(&Utc);
    let day_end_utc = day_start_utc + Duration::minutes(TOTAL_MINUTES as i64);

    let mut open = [false; TOTAL_MINUTES];

    let weekday = query.target_date.weekday().num_days_from_sunday() as i32;
    for window in query.windows {
        if window.day_of_week != weekday || !window.is_enabled {
            continue;
        }
        if let Some((s, e)) = parse_local_range(&window.start_time, &window.end_time) {
            open[s..e].fill(true);
        }
    }

    // Exceptions override windows for this date only: OPEN ranges add time,
    // BLOCKED ranges remove it, and BLOCKED always wins on overlap.
    let todays: Vec<_> = query
        .exceptions
        .iter()
        .filter(|ex| ex.date == query.target_date)
        .collect();

    for ex in todays.iter().filter(|ex| ex.kind == ExceptionKind::Open) {
        match exception_range(ex) {
            Some((s, e)) => open[s..e].fill(true),
            None if ex.whole_day() => open.fill(true),
            None => {}
        }
    }
    for ex in todays.iter().filter(|ex| ex.kind == ExceptionKind::Blocked) {
        match exception_range(ex) {
            Some((s, e)) => open[s..e].fill(false),
            None if ex.whole_day() => return Ok(Vec::new()),
            None => {}
        }
    }

    // Two busy layers: the raw intervals, which no slot body may overlap, and
    // the buffer-expanded intervals, inside which no slot may start. A slot
    // ending exactly where a booking begins stays valid; a slot starting
    // inside the padding does not.
    let mut busy = [false; TOTAL_MINUTES];
    let mut padded = [false; TOTAL_MINUTES];
    let buffer = Duration::minutes(query.buffer_minutes as i64);

    let booked = query
        .existing_bookings
        .iter()
        .filter(|b| !b.status.is_terminal())
        .filter_map(|b| b.occupied_interval());
    let external = query.busy_intervals.iter().map(|i| (i.start, i.end));

    for (start, end) in booked.chain(external) {
        if end <= start {
            continue;
        }
        mark_busy(&mut busy, start, end, day_start_utc, day_end_utc);
        mark_busy(
            &mut padded,
            start - buffer,
            end + buffer,
            day_start_utc,
            day_end_utc,
        );
    }

    let cutoff = query.now + Duration::hours(query.min_notice_hours as i64);
    let duration_min = query.service_duration_minutes as usize;

    let mut valid_slots = Vec::new();
    let mut cursor = 0usize;
    while cursor + duration_min <= TOTAL_MINUTES {
        if !padded[cursor] && (cursor..cursor + duration_min).all(|i| open[i] && !busy[i]) {
            let hour = (cursor / 60) as u32;
            let minute = (cursor % 60) as u32;

            if let Some(nt) = NaiveTime::from_hms_opt(hour, minute, 0)
                && let Some(slot_tz) = tz
                    .from_local_datetime(&query.target_date.and_time(nt))
                    .single()
            {
                let slot_utc = slot_tz.with_timezone(&Utc);
                if slot_utc >= cutoff {
                    valid_slots.push(slot_utc.to_rfc3339());
                }
            }
        }
        cursor += GRID_MINUTES;
    }

    valid_slots.sort();
    valid_slots.dedup();
    Ok(valid_slots)
}

/// Rounds a timestamp to the nearest 15-minute boundary. Callers must re-check
/// membership in a fresh slot list before trusting the snapped time.
pub fn snap_to_grid(t: DateTime<Utc>) -> DateTime<Utc> {
    let grid = (GRID_MINUTES * 60) as i64;
    let ts = t.timestamp();
    let snapped = ((ts + grid / 2).div_euclid(grid)) * grid;
    Utc.timestamp_opt(snapped, 0).single().unwrap_or(t)
}

fn parse_local_range(start: &str, end: &str) -> Option<(usize, usize)> {
    let start = NaiveTime::parse_from_str(start, "%H:%M").ok()?;
    let end = NaiveTime::parse_from_str(end, "%H:%M").ok()?;

    let s_idx = (start.hour() * 60 + start.minute()) as usize;
    let mut e_idx = (end.hour() * 60 + end.minute()) as usize;
    if e_idx == TOTAL_MINUTES - 1 {
        e_idx = TOTAL_MINUTES;
    }

    // Zero-length and inverted ranges are ignored.
    if s_idx >= e_idx { None } else { Some((s_idx, e_idx)) }
}

fn exception_range(ex: &AvailabilityException) -> Option<(usize, usize)> {
    match (&ex.start_time, &ex.end_time) {
        (Some(s), Some(e)) => parse_local_range(s, e),
        _ => None,
    }
}

fn mark_busy(
    busy: &mut [bool; TOTAL_MINUTES],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    day_start_utc: DateTime<Utc>,
    day_end_utc: DateTime<Utc>,
) {
    let b_start = max(start, day_start_utc);
    let b_end = min(end, day_end_utc);
    if b_start >= b_end {
        return;
    }

    let start_diff = (b_start - day_start_utc).num_minutes();
    let end_diff = (b_end - day_start_utc).num_minutes();
    // A partially covered minute blocks the whole minute.
    let end_diff = if (b_end - day_start_utc).num_seconds() % 60 != 0 {
        end_diff + 1
    } else {
        end_diff
    };

    let s_idx = max(0, min(start_diff, TOTAL_MINUTES as i64)) as usize;
    let e_idx = max(0, min(end_diff, TOTAL_MINUTES as i64)) as usize;
    busy[s_idx..e_idx].fill(true);
}
