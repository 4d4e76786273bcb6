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

use std::collections::BTreeMap;
use std::path::{Path,PathBuf};
use chrono::{Datelike, NaiveDate, TimeDelta};
use lazy_static::lazy_static;
use regex::Regex;

use seis_common::{debug, info, warn};
use seis_common::datetime::{naive_utc_date_to_utc_datetime, one_day, secs_between, TimeRange};
use seis_fdsn::{mseed, mseed_error, ChannelId, FdsnError, Stream, Trace};
use seis_fdsn::merge::same_rate;

use crate::{DayArchive, ReadSpeed, ReadStatus, WriteSummary};
use crate::errors::Result;

lazy_static! {
    // NET.STA.LOC.CHA.D.YYYY.JJJ
    static ref DAY_FILE_RE: Regex = Regex::new(r"^([^.]+)\.([^.]+)\.([^.]*)\.([^.]+)\.D\.(\d{4})\.(\d{3})$").unwrap();
}

/// a SeisComP Data Structure archive rooted at `top`
#[derive(Debug,Clone)]
pub struct SdsArchive {
    top: PathBuf,
    stream: Stream,
}

impl SdsArchive {
    pub fn new (top: impl AsRef<Path>)->Self {
        SdsArchive { top: top.as_ref().to_path_buf(), stream: Stream::new() }
    }

    /// an archive of a derived product (e.g. "RSAM") that is stored in a sub dir of `top`
    pub fn for_product (top: impl AsRef<Path>, product: &str)->Self {
        SdsArchive::new( top.as_ref().join(product))
    }

    pub fn top (&self)->&Path { &self.top }

    pub fn day_file_path (&self, id: &ChannelId, day: NaiveDate)->PathBuf {
        let year = day.year();
        let fname = format!("{}.{}.{}.{}.D.{:04}.{:03}", id.network, id.station, id.location, id.channel, year, day.ordinal());
        self.top.join( format!("{year:04}"))
            .join( &id.network)
            .join( &id.station)
            .join( format!("{}.D", id.channel))
            .join( fname)
    }

    /// all day files of `day` that exist in this archive
    pub fn day_files (&self, day: NaiveDate)->Result<Vec<PathBuf>> {
        let pattern = self.top.join( format!("{:04}", day.year()))
            .join("*").join("*").join("*.D")
            .join( format!("*.{:04}.{:03}", day.year(), day.ordinal()));

        let mut files: Vec<PathBuf> = glob::glob( &pattern.to_string_lossy())?
            .filter_map( |e| e.ok())
            .filter( |p| p.is_file() && parse_day_file_name(p).is_some())
            .collect();
        files.sort();
        Ok(files)
    }

    /// the data of an existing day file that is about to be updated. Files that can't be decoded are
    /// moved aside to "<name>.corrupt" and replaced by the new data. IO errors are passed up
    fn read_stored (&self, path: &Path)->Result<Option<Stream>> {
        let stored = if std::fs::metadata( path)?.len() == 0 {
            Err( mseed_error("empty day file"))
        } else {
            mseed::read_file( path)
        };
        match stored {
            Ok(st) => Ok( Some(st)),
            Err( FdsnError::MseedError(msg)) => {
                let aside = corrupt_path( path);
                warn!("moving undecodable day file {path:?} to {aside:?}: {msg}");
                std::fs::rename( path, &aside)?;
                Ok(None)
            }
            Err(e) => Err( e.into())
        }
    }

    fn read_day_file (&self, path: &Path)->Option<Stream> {
        match mseed::read_file( path) {
            Ok(st) => Some(st),
            Err(e) => {
                warn!("skipping unreadable day file {path:?}: {e}");
                None
            }
        }
    }
}

/// where undecodable day files are moved to
pub fn corrupt_path (path: &Path)->PathBuf {
    let mut name = path.file_name().map( |n| n.to_os_string()).unwrap_or_default();
    name.push(".corrupt");
    path.with_file_name( name)
}

/// channel id and day of a SDS day file name
pub fn parse_day_file_name (path: &Path)->Option<(ChannelId,NaiveDate)> {
    let fname = path.file_name()?.to_str()?;
    let caps = DAY_FILE_RE.captures(fname)?;
    let id = ChannelId::new( &caps[1], &caps[2], &caps[3], &caps[4]);
    let year: i32 = caps[5].parse().ok()?;
    let doy: u32 = caps[6].parse().ok()?;
    Some( (id, NaiveDate::from_yo_opt( year, doy)?) )
}

impl DayArchive for SdsArchive {
    fn read (&mut self, range: &TimeRange, speed: ReadSpeed, ids: Option<&[ChannelId]>)->Result<ReadStatus> {
        self.stream = Stream::new();

        let mut loaded = Stream::new();
        for day in range.days() {
            let files = match ids {
                Some(ids) => ids.iter().map( |id| self.day_file_path( id, day)).filter( |p| p.is_file()).collect(),
                None => self.day_files(day)?
            };
            for path in &files {
                if let Some(st) = self.read_day_file( path) {
                    loaded.extend(st);
                }
            }
        }

        let loaded = loaded.trimmed(range);
        self.stream = match speed {
            ReadSpeed::Careful => loaded.merged_with_rate_repair(),
            ReadSpeed::Fast => loaded,
        };

        if self.stream.is_empty() {
            debug!("no data in {:?} for {range}", self.top);
            Ok( ReadStatus::NoData)
        } else {
            Ok( ReadStatus::Loaded( self.stream.len()))
        }
    }

    fn write (&mut self, overwrite: bool)->Result<WriteSummary> {
        // group the day pieces of all traces by (channel, day)
        let mut pieces: BTreeMap<(ChannelId,NaiveDate),Stream> = BTreeMap::new();
        for tr in self.stream.iter() {
            for (day, piece) in split_at_days(tr) {
                pieces.entry( (tr.id.clone(), day)).or_default().push(piece);
            }
        }

        let mut summary = WriteSummary::default();
        for ((id,day), new_data) in pieces {
            let path = self.day_file_path( &id, day);

            let stored = if path.is_file() && !overwrite { self.read_stored( &path)? } else { None };
            let mut merged = match stored {
                Some(stored) => merge_under( &stored, &new_data),
                None => new_data.merged_with_rate_repair()
            };

            let day_range = TimeRange::day_of( &naive_utc_date_to_utc_datetime(day));
            merged = clip_to_day( &merged, &day_range);
            if merged.is_empty() { continue }

            mseed::write_file( &path, &merged)?;
            summary.files_written += 1;
            summary.samples_written += merged.total_npts();
        }

        if summary.files_written > 0 {
            info!("wrote {} day file(s) with {} samples to {:?}", summary.files_written, summary.samples_written, self.top);
        }
        Ok(summary)
    }

    fn stream (&self)->&Stream { &self.stream }

    fn stream_mut (&mut self)->&mut Stream { &mut self.stream }

    fn set_stream (&mut self, stream: Stream) { self.stream = stream }

    fn take_stream (&mut self)->Stream { std::mem::take( &mut self.stream) }
}

/// split a trace into pieces that each lie within one UTC day
pub fn split_at_days (tr: &Trace)->Vec<(NaiveDate,Trace)> {
    let mut pieces = Vec::new();
    let n = tr.npts();
    let mut i0 = 0;

    while i0 < n {
        // guard against sample times that are rounded to just before midnight
        let day = (tr.sample_time(i0) + TimeDelta::microseconds(1)).date_naive();
        let next_day = naive_utc_date_to_utc_datetime(day) + one_day();
        let i1 = (secs_between( &tr.start, &next_day) * tr.sampling_rate - 1e-6).ceil().max(0.0) as usize;
        let i1 = i1.clamp( i0 + 1, n);

        pieces.push( (day, tr.slice( i0, i1)));
        i0 = i1;
    }
    pieces
}

// samples at or after the end of the day belong to the next day file
fn clip_to_day (stream: &Stream, day: &TimeRange)->Stream {
    stream.iter().filter_map( |tr| {
        let n = (secs_between( &tr.start, &day.end()) * tr.sampling_rate - 1e-6).ceil().max(0.0) as usize;
        let n = n.min( tr.npts());
        if n > 0 { Some( tr.slice( 0, n)) } else { None }
    }).collect()
}

/// merge `new_data` into `stored` so that stored samples are kept wherever they exist and gaps
/// are filled from the new data
pub fn merge_under (stored: &Stream, new_data: &Stream)->Stream {
    let mut all = new_data.clone();
    all.extend( stored.clone());
    let mut merged = all.merged_with_rate_repair();

    for m in merged.iter_mut() {
        for s in stored.iter().filter( |s| s.id == m.id) {
            if !same_rate( s.sampling_rate, m.sampling_rate) {
                warn!("stored data of {} has a different sampling rate, not restoring it", s.id);
                continue
            }
            let offset = secs_between( &m.start, &s.start) * m.sampling_rate;
            if offset < -0.5 { continue }
            let i0 = offset.round() as usize;
            if i0 >= m.data.len() { continue }
            let len = s.data.len().min( m.data.len() - i0);
            m.data[i0..i0+len].copy_from_slice( &s.data[..len]);
        }
    }
    merged
}
