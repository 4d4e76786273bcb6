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

use std::{io, path::{Path,PathBuf}, time::Duration};
use std::io::ErrorKind::InvalidInput;

use seis_common::{io_error, debug};
use seis_common::datetime::{minute_stamp, TimeRange};
use seis_common::fs::{ensure_dir, remove_old_files};
use seis_common::geo::GeoPos;

use crate::model::ChannelId;

/// the flat file cache for FDSN station and waveform requests.
///
/// Filenames are derived from the request parameters, with time ranges truncated to minutes:
///  - inventories: `{start}_{end}_{lat:.4}_{lon:.4}_{radius:.2}.SML`
///  - waveforms:   `{start}_{end}_{first-id}_{last-id}.MSEED`
#[derive(Debug,Clone)]
pub struct FdsnCache {
    dir: PathBuf,
}

impl FdsnCache {
    pub fn new (dir: impl AsRef<Path>)->Self {
        FdsnCache { dir: dir.as_ref().to_path_buf() }
    }

    pub fn dir (&self)->&Path { &self.dir }

    /// cache file for a circular station search. Creates the cache dir if it does not exist yet
    pub fn inventory_path (&self, range: &TimeRange, center: &GeoPos, radius_deg: f64)->io::Result<PathBuf> {
        ensure_dir( &self.dir)?;
        let fname = format!("{}_{}_{:.4}_{:.4}_{:.2}.SML",
            minute_stamp( &range.start()), minute_stamp( &range.end()), center.lat, center.lon, radius_deg);
        Ok( self.dir.join(fname))
    }

    /// cache file for waveforms of `ids`. Only the first and last id are part of the name.
    /// Creates the cache dir if it does not exist yet
    pub fn stream_path (&self, range: &TimeRange, ids: &[ChannelId])->io::Result<PathBuf> {
        let (Some(first), Some(last)) = (ids.first(), ids.last()) else {
            return Err( io_error!( InvalidInput, "no channel ids for waveform cache file"))
        };
        ensure_dir( &self.dir)?;
        let fname = format!("{}_{}_{}_{}.MSEED", minute_stamp( &range.start()), minute_stamp( &range.end()), first, last);
        Ok( self.dir.join(fname))
    }

    /// remove cache files that have not been modified within `max_age`
    pub fn purge_older_than (&self, max_age: Duration)->io::Result<usize> {
        if !self.dir.is_dir() { return Ok(0) }
        let n = remove_old_files( &self.dir, max_age)?;
        if n > 0 { debug!("removed {n} outdated files from cache {:?}", self.dir) }
        Ok(n)
    }
}
