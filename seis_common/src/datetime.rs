/*
 * Copyright © 2024, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

use std::fmt;
use std::time::Duration;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use serde::{Serialize,Deserialize,Deserializer};
use parse_duration::parse;

use crate::errors::{Result,SeisCommonError,time_range_error};

pub const SECS_PER_DAY: i64 = 86400;

#[inline] pub fn one_day ()->TimeDelta { TimeDelta::seconds(SECS_PER_DAY) }

/// fractional seconds as TimeDelta (rounded to nanos)
#[inline] pub fn delta_secs (secs: f64)->TimeDelta { TimeDelta::nanoseconds( (secs * 1e9).round() as i64) }

#[inline]
pub fn add_secs (dt: &DateTime<Utc>, secs: f64)->DateTime<Utc> {
    *dt + delta_secs(secs)
}

/// fractional seconds from `earlier` to `later` (negative if `later` precedes `earlier`)
pub fn secs_between (earlier: &DateTime<Utc>, later: &DateTime<Utc>)->f64 {
    let d = *later - *earlier;
    d.num_seconds() as f64 + d.subsec_nanos() as f64 * 1e-9
}

/// the timestamp format we use in cache filenames - note this truncates to minutes
pub fn minute_stamp (dt: &DateTime<Utc>)->String {
    dt.format("%Y%m%d%H%M").to_string()
}

pub fn start_of_day (dt: &DateTime<Utc>)->DateTime<Utc> {
    naive_utc_date_to_utc_datetime( dt.date_naive())
}

/// get a DateTime<Utc> from a NaiveDate that is supposed to be in Utc
pub fn naive_utc_date_to_utc_datetime (nd: NaiveDate) -> DateTime<Utc> {
    let ndt = nd.and_hms_opt(0, 0, 0).unwrap_or_default(); // 00:00:00 can't fail
    DateTime::from_naive_utc_and_offset(ndt,Utc)
}

/// parse either a plain "%Y-%m-%d" UTC date, a "%Y-%m-%dT%H:%M:%S[.f]" naive UTC datetime or a RFC3339 string
pub fn parse_utc_datetime (s: &str)->Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        Some(dt.to_utc())
    } else if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        Some( DateTime::from_naive_utc_and_offset(ndt,Utc))
    } else if let Ok(nd) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        Some( naive_utc_date_to_utc_datetime(nd))
    } else {
        None
    }
}

pub fn deserialize_optional_duration <'a,D>(deserializer: D) -> std::result::Result<Option<Duration>,D::Error>
    where D: Deserializer<'a>
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    if let Some(s) = s {
        let d =  parse(s.as_str()).map_err( |e| serde::de::Error::custom(format!("{:?}",e)))?;
        return Ok( Some(d) )
    }
    Ok(None)
}

/* #region TimeRange **********************************************************************************/

/// a non-empty, ordered interval of UTC timestamps
#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash,Serialize,Deserialize)]
#[serde(try_from="TimeRangeRepr")]
pub struct TimeRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new (start: DateTime<Utc>, end: DateTime<Utc>)->Result<Self> {
        if start < end {
            Ok( TimeRange{start,end} )
        } else {
            Err( time_range_error( format!("start {start} not before end {end}")))
        }
    }

    /// the range of `duration` starting at `start`. Fails for non-positive durations
    pub fn starting_at (start: DateTime<Utc>, duration: TimeDelta)->Result<Self> {
        TimeRange::new( start, start + duration)
    }

    /// the UTC day containing `dt`
    pub fn day_of (dt: &DateTime<Utc>)->Self {
        let start = start_of_day(dt);
        TimeRange{ start, end: start + one_day() }
    }

    #[inline] pub fn start (&self)->DateTime<Utc> { self.start }
    #[inline] pub fn end (&self)->DateTime<Utc> { self.end }

    pub fn duration (&self)->TimeDelta { self.end - self.start }

    pub fn duration_secs (&self)->f64 { secs_between( &self.start, &self.end) }

    /// note this includes both start and end
    pub fn contains (&self, dt: &DateTime<Utc>)->bool {
        *dt >= self.start && *dt <= self.end
    }

    pub fn intersection (&self, other: &TimeRange)->Option<TimeRange> {
        let start = self.start.max( other.start);
        let end = self.end.min( other.end);
        if start < end { Some( TimeRange{start,end}) } else { None }
    }

    /// a range that is padded by `before` at the start and `after` at the end
    pub fn extended (&self, before: TimeDelta, after: TimeDelta)->TimeRange {
        let start = self.start - before;
        let end = self.end + after;
        if start < end { TimeRange{start,end} } else { *self }
    }

    /// iterate in fixed increments over this range. Each step is `[pointer, pointer+inc]` - the last step is not
    /// clipped to our end. Iteration stops once the pointer reaches or exceeds our end.
    pub fn steps (&self, inc: TimeDelta)->TimeSteps {
        TimeSteps { pointer: self.start, end: self.end, inc }
    }

    /// the UTC calendar days touched by this range (an end exactly at midnight does not add a day)
    pub fn days (&self)->Vec<NaiveDate> {
        let mut list = Vec::new();
        let mut d = self.start.date_naive();
        let last = (self.end - TimeDelta::nanoseconds(1)).date_naive();
        while d <= last {
            list.push(d);
            match d.succ_opt() {
                Some(next) => d = next,
                None => break
            }
        }
        list
    }
}

// unchecked serde representation
#[derive(Deserialize)]
struct TimeRangeRepr {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<TimeRangeRepr> for TimeRange {
    type Error = SeisCommonError;
    fn try_from (repr: TimeRangeRepr)->Result<Self> { TimeRange::new( repr.start, repr.end) }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} - {}]", self.start.format("%Y-%m-%dT%H:%M:%S%.3f"), self.end.format("%Y-%m-%dT%H:%M:%S%.3f"))
    }
}

/// iterator over consecutive fixed length steps of a TimeRange
pub struct TimeSteps {
    pointer: DateTime<Utc>,
    end: DateTime<Utc>,
    inc: TimeDelta,
}

impl Iterator for TimeSteps {
    type Item = TimeRange;

    fn next (&mut self)->Option<TimeRange> {
        if self.pointer < self.end && self.inc > TimeDelta::zero() {
            let step = TimeRange { start: self.pointer, end: self.pointer + self.inc };
            self.pointer = self.pointer + self.inc;
            Some(step)
        } else {
            None
        }
    }
}

/* #endregion TimeRange */
