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

use chrono::{DateTime, Utc};
use serde::{Serialize,Deserialize};

use seis_common::geo::GeoPos3;
use crate::model::{ChannelId, Stream};

/// station metadata tree as returned by FDSN station services (network -> station -> channel)
#[derive(Debug,Clone,Default,PartialEq,Serialize,Deserialize)]
pub struct Inventory {
    #[serde(skip_serializing_if="seis_common::is_none", default)]
    pub source: Option<String>,
    #[serde(skip_serializing_if="seis_common::is_none", default)]
    pub created: Option<DateTime<Utc>>,
    pub networks: Vec<Network>,
}

#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct Network {
    pub code: String,
    #[serde(skip_serializing_if="seis_common::is_none", default)]
    pub description: Option<String>,
    pub stations: Vec<Station>,
}

#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct Station {
    pub code: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
    #[serde(skip_serializing_if="seis_common::is_none", default)]
    pub site_name: Option<String>,
    pub channels: Vec<Channel>,
}

#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct Channel {
    pub code: String,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
    #[serde(default)]
    pub depth: f64,
    #[serde(skip_serializing_if="seis_common::is_none", default)]
    pub sample_rate: Option<f64>,
    #[serde(skip_serializing_if="seis_common::is_none", default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if="seis_common::is_none", default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if="seis_common::is_none", default)]
    pub response: Option<InstrumentResponse>,
}

/// the overall (scalar) instrument sensitivity of a channel
#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct InstrumentResponse {
    /// counts per input unit
    pub sensitivity: f64,
    /// frequency (Hz) at which the sensitivity is valid
    pub frequency: f64,
    /// e.g. "M/S", "M", "M/S**2"
    pub input_units: String,
    pub output_units: String,
}

impl Channel {
    /// is `t` within this channel epoch (start inclusive, end exclusive, missing dates are open)
    pub fn is_active_at (&self, t: &DateTime<Utc>)->bool {
        self.start_date.map_or( true, |start| start <= *t) && self.end_date.map_or( true, |end| *t < end)
    }
}

impl InstrumentResponse {
    pub fn is_velocity (&self)->bool { self.input_units.eq_ignore_ascii_case("M/S") }
    pub fn is_displacement (&self)->bool { self.input_units.eq_ignore_ascii_case("M") }
}

impl Inventory {
    pub fn new (networks: Vec<Network>)->Self {
        Inventory { source: None, created: None, networks }
    }

    pub fn is_empty (&self)->bool {
        self.networks.iter().all( |n| n.stations.iter().all( |s| s.channels.is_empty()))
    }

    /// all channel ids in inventory order, without duplicates (channels can have several epochs)
    pub fn channel_ids (&self)->Vec<ChannelId> {
        let mut ids: Vec<ChannelId> = Vec::new();
        for net in &self.networks {
            for sta in &net.stations {
                for cha in &sta.channels {
                    let id = ChannelId::new( &net.code, &sta.code, &cha.location, &cha.code);
                    if !ids.contains(&id) { ids.push(id) }
                }
            }
        }
        ids
    }

    /// the station and the channel epoch of `id` that is active at `t`
    pub fn channel (&self, id: &ChannelId, t: &DateTime<Utc>)->Option<(&Station,&Channel)> {
        self.networks.iter()
            .filter( |n| n.code == id.network)
            .flat_map( |n| n.stations.iter())
            .filter( |s| s.code == id.station)
            .find_map( |s| {
                s.channels.iter()
                    .find( |c| c.code == id.channel && c.location == id.location && c.is_active_at(t))
                    .map( |c| (s,c))
            })
    }

    pub fn station (&self, network: &str, station: &str)->Option<&Station> {
        self.networks.iter()
            .filter( |n| n.code == network)
            .flat_map( |n| n.stations.iter())
            .find( |s| s.code == station)
    }

    /// channel coordinates of `id` at `t`, falling back to the station position if there is no such channel epoch
    pub fn coordinates (&self, id: &ChannelId, t: &DateTime<Utc>)->Option<GeoPos3> {
        if let Some((_,c)) = self.channel( id, t) {
            Some( GeoPos3::new( c.latitude, c.longitude, c.elevation))
        } else {
            self.station( &id.network, &id.station).map( |s| GeoPos3::new( s.latitude, s.longitude, s.elevation))
        }
    }

    /// the response of the `id` channel epoch that is active at `t`
    pub fn response (&self, id: &ChannelId, t: &DateTime<Utc>)->Option<&InstrumentResponse> {
        self.channel( id, t).and_then( |(_,c)| c.response.as_ref())
    }

    /// set the coordinates of all traces we have metadata for at their start times. Returns the number of
    /// traces that were updated
    pub fn attach_coordinates (&self, stream: &mut Stream)->usize {
        let mut n = 0;
        for tr in stream.iter_mut() {
            if let Some(pos) = self.coordinates( &tr.id, &tr.start) {
                tr.coordinates = Some(pos);
                n += 1;
            }
        }
        n
    }
}
