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

//! day partitioned waveform archives.
//!
//! [`DayArchive`] is the abstract interface used by the processing loops: read a time range into an
//! in-memory stream, replace or modify that stream, and write it back. [`SdsArchive`] implements it on
//! top of a SeisComP Data Structure (SDS) directory tree with one miniSEED file per channel and day:
//! `{top}/{YYYY}/{NET}/{STA}/{CHA}.D/{NET}.{STA}.{LOC}.{CHA}.D.{YYYY}.{JJJ}`

use seis_common::datetime::TimeRange;
use seis_fdsn::{ChannelId, Stream};

pub mod sds;
pub use sds::SdsArchive;

mod errors;
pub use errors::*;

/// how much work to spend on reading
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum ReadSpeed {
    /// merge segments of each channel into a single trace
    Careful,
    /// return segments as they are stored
    Fast,
}

#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum ReadStatus {
    /// number of traces loaded
    Loaded(usize),
    NoData,
}

impl ReadStatus {
    pub fn has_data (&self)->bool { matches!( self, ReadStatus::Loaded(n) if *n > 0) }
}

#[derive(Debug,Clone,Copy,PartialEq,Eq,Default)]
pub struct WriteSummary {
    pub files_written: usize,
    pub samples_written: usize,
}

pub trait DayArchive {
    /// replace the current stream with the archived data within `range`, optionally restricted to `ids`
    fn read (&mut self, range: &TimeRange, speed: ReadSpeed, ids: Option<&[ChannelId]>)->Result<ReadStatus>;

    /// store the current stream. Without `overwrite` already archived samples take precedence
    fn write (&mut self, overwrite: bool)->Result<WriteSummary>;

    fn stream (&self)->&Stream;
    fn stream_mut (&mut self)->&mut Stream;
    fn set_stream (&mut self, stream: Stream);
    fn take_stream (&mut self)->Stream;
}
