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

//! cache-aware retrieval of station metadata and waveforms.
//!
//! Both fetchers first look for a cache file matching the request. If there is one (and we are not told to
//! overwrite) it is used without contacting the server. Otherwise the [`FdsnSource`] is queried and results
//! are optionally stored in the cache. Remote failures are reported as values, only local (filesystem or cache
//! format) problems are returned as errors.

use std::path::Path;

use seis_common::{debug, info, warn};
use seis_common::datetime::TimeRange;
use seis_common::fs::{filepath_contents, write_file_atomic};
use seis_common::geo::GeoPos;

use crate::cache::FdsnCache;
use crate::errors::{cache_format_error, Result};
use crate::inventory::Inventory;
use crate::model::{ChannelId, Stream};
use crate::mseed;
use crate::stationxml;
use crate::source::{DetailLevel, FdsnSource, RemoteError, StationQuery, WaveformQuery};

/* #region inventory **********************************************************************************/

/// parameters of a circular station search. Network/station/channel filters default to "*"
#[derive(Debug,Clone,PartialEq)]
pub struct StationRequest {
    pub range: TimeRange,
    pub center: GeoPos,
    pub radius_deg: f64,
    pub network: String,
    pub station: String,
    pub channel: String,
}

impl StationRequest {
    pub fn new (range: TimeRange, center: GeoPos, radius_deg: f64)->Self {
        StationRequest { range, center, radius_deg, network: "*".into(), station: "*".into(), channel: "*".into() }
    }

    pub fn with_network (mut self, network: impl ToString)->Self { self.network = network.to_string(); self }
    pub fn with_station (mut self, station: impl ToString)->Self { self.station = station.to_string(); self }
    pub fn with_channel (mut self, channel: impl ToString)->Self { self.channel = channel.to_string(); self }

    fn query (&self)->StationQuery {
        StationQuery {
            network: self.network.clone(),
            station: self.station.clone(),
            channel: self.channel.clone(),
            center: self.center,
            max_radius_deg: self.radius_deg,
            range: self.range,
            level: DetailLevel::Response,
        }
    }
}

/// outcome of [`get_inventory`]
#[derive(Debug,Clone,PartialEq)]
pub enum InventoryFetch {
    Cached(Inventory),
    Retrieved(Inventory),
    Unavailable(RemoteError),
}

impl InventoryFetch {
    pub fn inventory (&self)->Option<&Inventory> {
        match self {
            InventoryFetch::Cached(inv) | InventoryFetch::Retrieved(inv) => Some(inv),
            InventoryFetch::Unavailable(_) => None
        }
    }

    pub fn into_inventory (self)->Option<Inventory> {
        match self {
            InventoryFetch::Cached(inv) | InventoryFetch::Retrieved(inv) => Some(inv),
            InventoryFetch::Unavailable(_) => None
        }
    }

    pub fn is_cached (&self)->bool { matches!( self, InventoryFetch::Cached(_)) }
}

/// get the station inventory for `request`, from the cache if there is a matching file and `overwrite` is
/// not set. Retrieved inventories are stored in the cache if `use_cache` is set
pub fn get_inventory<S> (source: &S, cache: &FdsnCache, request: &StationRequest, overwrite: bool, use_cache: bool)->Result<InventoryFetch>
    where S: FdsnSource + ?Sized
{
    let path = cache.inventory_path( &request.range, &request.center, request.radius_deg)?;

    if path.is_file() && !overwrite {
        debug!("loading inventory from {path:?}");
        return Ok( InventoryFetch::Cached( read_inventory( &path)?))
    }

    info!("retrieving inventory for {} around {} (radius {} deg)", request.range, request.center, request.radius_deg);
    match source.get_stations( &request.query()) {
        Ok(inv) => {
            if use_cache {
                match write_inventory( &path, &inv) {
                    Ok(()) => info!("inventory saved to {path:?}"),
                    Err(e) => warn!("failed to save inventory to {path:?}: {e}")
                }
            }
            Ok( InventoryFetch::Retrieved(inv))
        }
        Err(e) => {
            warn!("no inventory available: {e}");
            Ok( InventoryFetch::Unavailable(e))
        }
    }
}

/// read a StationXML file
pub fn read_inventory (path: &Path)->Result<Inventory> {
    let data = filepath_contents( &path)?;
    let xml = std::str::from_utf8( &data).map_err( |e| cache_format_error( format!("{path:?}: {e}")))?;
    stationxml::from_stationxml( xml).map_err( |e| cache_format_error( format!("{path:?}: {e}")))
}

pub fn write_inventory (path: &Path, inv: &Inventory)->Result<()> {
    let xml = stationxml::to_stationxml( inv)?;
    write_file_atomic( path, xml.as_bytes())?;
    Ok(())
}

/* #endregion inventory */

/* #region waveforms **********************************************************************************/

#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum DataOrigin {
    Cache,
    Remote,
}

/// outcome of [`get_stream`]. The stream can be empty
#[derive(Debug,Clone)]
pub struct StreamFetch {
    pub stream: Stream,
    pub origin: DataOrigin,
    /// ids for which the remote request failed
    pub failures: Vec<(ChannelId,RemoteError)>,
}

impl StreamFetch {
    pub fn is_empty (&self)->bool { self.stream.is_empty() }
}

/// get waveforms of `ids` within `range`, from the cache if there is a matching file and `overwrite` is not set.
/// Otherwise each id is requested separately, failing ids are skipped and the segments of each channel are
/// merged. A non-empty result is stored in the cache if `use_cache` is set
pub fn get_stream<S> (source: &S, cache: &FdsnCache, ids: &[ChannelId], range: &TimeRange, overwrite: bool, use_cache: bool)->Result<StreamFetch>
    where S: FdsnSource + ?Sized
{
    let path = cache.stream_path( range, ids)?;

    if path.is_file() && !overwrite {
        debug!("loading waveforms from {path:?}");
        let stream = mseed::read_file( &path).map_err( |e| cache_format_error( format!("{path:?}: {e}")))?;
        return Ok( StreamFetch { stream, origin: DataOrigin::Cache, failures: Vec::new() })
    }

    let mut stream = Stream::new();
    let mut failures: Vec<(ChannelId,RemoteError)> = Vec::new();

    for id in ids {
        let query = WaveformQuery { id: id.clone(), range: *range, attach_response: true };
        let this_stream = match source.get_waveforms( &query) {
            Ok(st) => st,
            Err(e) => {
                warn!("failed to get waveforms for {id}: {e}");
                failures.push( (id.clone(), e));
                Stream::new()
            }
        };

        if !this_stream.is_empty() {
            stream.extend( this_stream.merged_with_rate_repair());
        }
    }

    // ids are disjoint so this normally does not change anything
    let stream = stream.merged_with_rate_repair();

    if stream.is_empty() {
        info!("no waveform data for {} channel(s) in {range}", ids.len());
    } else if use_cache {
        match mseed::write_file( &path, &stream) {
            Ok(()) => info!("waveforms saved to {path:?}"),
            Err(e) => warn!("failed to save waveforms to {path:?}: {e}")
        }
    }

    Ok( StreamFetch { stream, origin: DataOrigin::Remote, failures })
}

/* #endregion waveforms */
