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

use std::{fmt, str::FromStr};
use chrono::{DateTime, Utc};
use serde::{Serialize,Serializer,Deserialize,Deserializer};

use seis_common::datetime::{add_secs, secs_between, TimeRange};
use seis_common::geo::GeoPos3;

use crate::errors::{FdsnError, MergeError, Result};
use crate::merge;

/* #region ChannelId **********************************************************************************/

/// the NET.STA.LOC.CHA identifier of a seismic channel. The location code can be empty
#[derive(Debug,Clone,PartialEq,Eq,Hash,PartialOrd,Ord)]
pub struct ChannelId {
    pub network: String,
    pub station: String,
    pub location: String,
    pub channel: String,
}

impl ChannelId {
    pub fn new (network: impl ToString, station: impl ToString, location: impl ToString, channel: impl ToString)->Self {
        ChannelId {
            network: network.to_string(),
            station: station.to_string(),
            location: location.to_string(),
            channel: channel.to_string()
        }
    }

    /// match against a "N.S.L.C" pattern where each component is a glob ('*', '?' and '[..]' classes).
    /// Patterns with fewer than 4 components match any value for the missing ones
    pub fn matches (&self, pattern: &str)->bool {
        let mut parts = pattern.split('.');
        for value in [&self.network, &self.station, &self.location, &self.channel] {
            match parts.next() {
                Some(p) => if !component_matches( p, value) { return false }
                None => return true
            }
        }
        parts.next().is_none()
    }

    /// the band/instrument/orientation char at `idx` of the channel code (if any)
    pub fn channel_char (&self, idx: usize)->Option<char> {
        self.channel.chars().nth(idx)
    }

    /// the orientation code (3rd char of channel)
    pub fn component (&self)->Option<char> { self.channel_char(2) }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}.{}", self.network, self.station, self.location, self.channel)
    }
}

impl FromStr for ChannelId {
    type Err = FdsnError;

    fn from_str (s: &str)->Result<Self> {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != 4 || parts[0].is_empty() || parts[1].is_empty() || parts[3].is_empty() {
            return Err( FdsnError::InvalidChannelId(s.to_string()))
        }
        Ok( ChannelId::new( parts[0], parts[1], parts[2], parts[3]) )
    }
}

impl Serialize for ChannelId {
    fn serialize<S: Serializer> (&self, serializer: S)->std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ChannelId {
    fn deserialize<D: Deserializer<'de>> (deserializer: D)->std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ChannelId::from_str(&s).map_err( serde::de::Error::custom)
    }
}

/// glob match of a single id component. Invalid patterns match nothing
fn component_matches (pattern: &str, value: &str)->bool {
    match glob::Pattern::new( pattern) {
        Ok(p) => p.matches( value),
        Err(_) => false
    }
}

/* #endregion ChannelId */

/* #region Trace **************************************************************************************/

/// physical units of trace samples
#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize,Deserialize,Default)]
pub enum Units {
    #[default]
    Counts,
    MetersPerSecond,
    Meters,
    /// reduced displacement
    SquareCentimeters,
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Units::Counts => "counts",
            Units::MetersPerSecond => "m/s",
            Units::Meters => "m",
            Units::SquareCentimeters => "cm2",
        };
        write!(f, "{s}")
    }
}

/// one contiguous, evenly sampled series of a single channel
#[derive(Debug,Clone,PartialEq)]
pub struct Trace {
    pub id: ChannelId,
    pub start: DateTime<Utc>,
    /// samples per second
    pub sampling_rate: f64,
    pub data: Vec<f64>,
    pub units: Units,

    // attached by inventory tools
    pub coordinates: Option<GeoPos3>,
    /// distance in meters from a reference (source) position
    pub distance: Option<f64>,
}

impl Trace {
    pub fn new (id: ChannelId, start: DateTime<Utc>, sampling_rate: f64, data: Vec<f64>)->Self {
        Trace { id, start, sampling_rate, data, units: Units::Counts, coordinates: None, distance: None }
    }

    #[inline] pub fn npts (&self)->usize { self.data.len() }

    /// sample interval in seconds
    #[inline] pub fn delta (&self)->f64 { 1.0 / self.sampling_rate }

    /// time of the last sample (start for empty traces)
    pub fn end (&self)->DateTime<Utc> {
        if self.data.len() > 1 {
            add_secs( &self.start, (self.data.len() - 1) as f64 / self.sampling_rate)
        } else {
            self.start
        }
    }

    /// time of sample `idx`
    pub fn sample_time (&self, idx: usize)->DateTime<Utc> {
        add_secs( &self.start, idx as f64 / self.sampling_rate)
    }

    /// the covered interval from first to last sample. None if there are less than two samples
    pub fn time_range (&self)->Option<TimeRange> {
        TimeRange::new( self.start, self.end()).ok()
    }

    /// a copy that carries our metadata but different samples, starting at `start`
    pub fn with_data (&self, start: DateTime<Utc>, data: Vec<f64>)->Trace {
        Trace {
            id: self.id.clone(),
            start,
            sampling_rate: self.sampling_rate,
            data,
            units: self.units,
            coordinates: self.coordinates,
            distance: self.distance,
        }
    }

    /// the samples `[from,to)` as a new trace
    pub fn slice (&self, from: usize, to: usize)->Trace {
        let to = to.min( self.data.len());
        let from = from.min(to);
        self.with_data( self.sample_time(from), self.data[from..to].to_vec())
    }

    /// the samples that fall into `range` (both ends inclusive). None if there are none
    pub fn trimmed (&self, range: &TimeRange)->Option<Trace> {
        if self.data.is_empty() || !(self.sampling_rate > 0.0) { return None }

        let eps = 1e-6;
        let first = secs_between( &self.start, &range.start()) * self.sampling_rate;
        let last = secs_between( &self.start, &range.end()) * self.sampling_rate;

        let i0 = (first - eps).ceil().max(0.0);
        let i1 = (last + eps).floor().min( (self.data.len() - 1) as f64);
        if i1 < i0 { return None }

        Some( self.slice( i0 as usize, i1 as usize + 1))
    }
}

/* #endregion Trace */

/* #region Stream *************************************************************************************/

/// an unordered collection of traces that can hold several channels and several segments per channel
#[derive(Debug,Clone,Default,PartialEq)]
pub struct Stream {
    traces: Vec<Trace>,
}

impl Stream {
    pub fn new ()->Self { Stream { traces: Vec::new() } }

    pub fn from_traces (traces: Vec<Trace>)->Self { Stream { traces } }

    pub fn push (&mut self, trace: Trace) { self.traces.push(trace) }

    /// move all traces of `other` into self
    pub fn append (&mut self, other: &mut Stream) { self.traces.append( &mut other.traces) }

    pub fn extend (&mut self, other: Stream) { self.traces.extend( other.traces) }

    #[inline] pub fn len (&self)->usize { self.traces.len() }
    #[inline] pub fn is_empty (&self)->bool { self.traces.is_empty() }

    pub fn iter (&self)->impl Iterator<Item=&Trace> { self.traces.iter() }
    pub fn iter_mut (&mut self)->impl Iterator<Item=&mut Trace> { self.traces.iter_mut() }

    pub fn traces (&self)->&[Trace] { &self.traces }
    pub fn traces_mut (&mut self)->&mut Vec<Trace> { &mut self.traces }
    pub fn into_traces (self)->Vec<Trace> { self.traces }

    pub fn get (&self, idx: usize)->Option<&Trace> { self.traces.get(idx) }

    /// unique channel ids in first-seen order
    pub fn ids (&self)->Vec<ChannelId> {
        let mut ids: Vec<ChannelId> = Vec::new();
        for tr in &self.traces {
            if !ids.contains( &tr.id) { ids.push( tr.id.clone()) }
        }
        ids
    }

    /// the traces whose id matches the N.S.L.C wildcard `pattern`
    pub fn select (&self, pattern: &str)->Stream {
        self.traces.iter().filter( |tr| tr.id.matches(pattern)).cloned().collect()
    }

    /// the traces whose channel code matches `pattern` (e.g. "*H*")
    pub fn select_channel (&self, pattern: &str)->Stream {
        self.traces.iter().filter( |tr| component_matches( pattern, &tr.id.channel)).cloned().collect()
    }

    /// all traces trimmed to `range`, dropping the ones without samples in it
    pub fn trimmed (&self, range: &TimeRange)->Stream {
        self.traces.iter().filter_map( |tr| tr.trimmed(range)).collect()
    }

    /// number of samples of the longest trace
    pub fn max_npts (&self)->usize {
        self.traces.iter().map( |tr| tr.npts()).max().unwrap_or(0)
    }

    pub fn total_npts (&self)->usize {
        self.traces.iter().map( |tr| tr.npts()).sum()
    }

    /// earliest start time of all traces
    pub fn start (&self)->Option<DateTime<Utc>> {
        self.traces.iter().map( |tr| tr.start).min()
    }

    /// one trace per channel id. Fails if segments of the same id have different sampling rates
    pub fn merged (&self)->std::result::Result<Stream, MergeError> {
        merge::merge_stream(self)
    }

    /// merge, and if that fails set the sampling rates of inconsistent channels to their NaN-ignoring
    /// mean rate and merge again
    pub fn merged_with_rate_repair (&self)->Stream {
        merge::merge_with_rate_repair(self)
    }
}

impl FromIterator<Trace> for Stream {
    fn from_iter<I: IntoIterator<Item=Trace>> (iter: I)->Self {
        Stream { traces: iter.into_iter().collect() }
    }
}

impl IntoIterator for Stream {
    type Item = Trace;
    type IntoIter = std::vec::IntoIter<Trace>;
    fn into_iter (self)->Self::IntoIter { self.traces.into_iter() }
}

impl<'a> IntoIterator for &'a Stream {
    type Item = &'a Trace;
    type IntoIter = std::slice::Iter<'a,Trace>;
    fn into_iter (self)->Self::IntoIter { self.traces.iter() }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} trace(s):", self.traces.len())?;
        for tr in &self.traces {
            writeln!(f, "  {} | {} - {} | {} Hz, {} samples", tr.id,
                tr.start.format("%Y-%m-%dT%H:%M:%S%.3f"), tr.end().format("%Y-%m-%dT%H:%M:%S%.3f"),
                tr.sampling_rate, tr.npts())?;
        }
        Ok(())
    }
}

/* #endregion Stream */
