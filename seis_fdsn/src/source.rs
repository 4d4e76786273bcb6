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

use serde::{Serialize,Deserialize};
use thiserror::Error;

use seis_common::datetime::TimeRange;
use seis_common::geo::GeoPos;

use crate::inventory::Inventory;
use crate::model::{ChannelId, Stream};

/// level of detail for station requests
#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize,Deserialize)]
pub enum DetailLevel {
    Network,
    Station,
    Channel,
    Response,
}

/// a circular station search
#[derive(Debug,Clone,PartialEq)]
pub struct StationQuery {
    pub network: String,
    pub station: String,
    pub channel: String,
    pub center: GeoPos,
    pub max_radius_deg: f64,
    pub range: TimeRange,
    pub level: DetailLevel,
}

#[derive(Debug,Clone,PartialEq)]
pub struct WaveformQuery {
    pub id: ChannelId,
    pub range: TimeRange,
    /// ask the server to attach instrument response metadata
    pub attach_response: bool,
}

/// why a remote request did not produce data. Neither is fatal for the caller
#[derive(Error,Debug,Clone,PartialEq)]
pub enum RemoteError {
    #[error("no data available")]
    NoData,

    /// network or server failures. Retrying the request later might succeed
    #[error("remote request failed: {0}")]
    Transient(String),
}

impl RemoteError {
    pub fn is_retry_advised (&self)->bool {
        matches!( self, RemoteError::Transient(_))
    }
}

/// abstraction of a FDSN data center (station and dataselect web services)
pub trait FdsnSource {
    fn get_stations (&self, query: &StationQuery)->Result<Inventory,RemoteError>;

    fn get_waveforms (&self, query: &WaveformQuery)->Result<Stream,RemoteError>;
}

impl<T> FdsnSource for &T where T: FdsnSource + ?Sized {
    fn get_stations (&self, query: &StationQuery)->Result<Inventory,RemoteError> {
        (**self).get_stations(query)
    }

    fn get_waveforms (&self, query: &WaveformQuery)->Result<Stream,RemoteError> {
        (**self).get_waveforms(query)
    }
}
