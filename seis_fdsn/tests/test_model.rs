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
#![allow(unused)]

use std::str::FromStr;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use seis_common::datetime::TimeRange;
use seis_fdsn::*;

// run with "cargo test test_xx -- --nocapture"

fn utc (y: i32, m: u32, d: u32, hh: u32, mm: u32, ss: u32)->DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, hh, mm, ss).unwrap()
}

#[test]
fn test_channel_id () {
    let id = ChannelId::from_str("AV.SPCP..BHZ").unwrap();
    assert_eq!( id.network, "AV");
    assert_eq!( id.station, "SPCP");
    assert_eq!( id.location, "");
    assert_eq!( id.channel, "BHZ");
    assert_eq!( id.to_string(), "AV.SPCP..BHZ");
    assert_eq!( id.component(), Some('Z'));

    assert!( ChannelId::from_str("AV.SPCP.BHZ").is_err());
    assert!( ChannelId::from_str("AV.SPCP..BHZ.x").is_err());

    let json = serde_json::to_string(&id).unwrap();
    assert_eq!( json, "\"AV.SPCP..BHZ\"");
    let id2: ChannelId = serde_json::from_str(&json).unwrap();
    assert_eq!( id, id2);
}

#[test]
fn test_wildcards () {
    let id = ChannelId::new("AV", "SPCP", "", "BHZ");
    assert!( id.matches("*.*.*.*"));
    assert!( id.matches("AV.SP??..B?Z"));
    assert!( id.matches("*.*.*.*H*"));
    assert!( id.matches("AV"));
    assert!( !id.matches("AK.*.*.*"));
    assert!( !id.matches("*.*.*.EH?"));

    assert!( id.matches("AV.SPCP.*.BH[ZN]"));
    assert!( !id.matches("AV.SPCP.*.BH[EN]"));
    assert!( id.matches("AV.SPCP..BHZ"));  // empty location only matches empty or '*'
    assert!( !id.matches("AV.SPCP.?.BHZ"));
    assert!( !id.matches("AV.SPCP.*.BH[Z")); // invalid glob
}

#[test]
fn test_trace_times () {
    let t0 = utc(2024,3,1,0,0,0);
    let tr = Trace::new( ChannelId::new("AV","SPCP","","BHZ"), t0, 10.0, vec![0.0; 101]);
    assert_eq!( tr.delta(), 0.1);
    assert_eq!( tr.end(), utc(2024,3,1,0,0,10));

    // both ends inclusive
    let range = TimeRange::new( utc(2024,3,1,0,0,2), utc(2024,3,1,0,0,3)).unwrap();
    let trimmed = tr.trimmed(&range).unwrap();
    assert_eq!( trimmed.start, utc(2024,3,1,0,0,2));
    assert_eq!( trimmed.npts(), 11);

    let outside = TimeRange::new( utc(2024,3,2,0,0,0), utc(2024,3,3,0,0,0)).unwrap();
    assert!( tr.trimmed(&outside).is_none());
}

#[test]
fn test_stream_select () {
    let t0 = utc(2024,3,1,0,0,0);
    let st = Stream::from_traces( vec![
        Trace::new( ChannelId::new("AV","SPCP","","BHZ"), t0, 1.0, vec![1.0]),
        Trace::new( ChannelId::new("AV","SPCP","","BDF"), t0, 1.0, vec![1.0]),
        Trace::new( ChannelId::new("AV","SPCP","","BHZ"), t0 + TimeDelta::seconds(10), 1.0, vec![1.0, 2.0]),
    ]);
    println!("{st}");

    assert_eq!( st.ids().len(), 2);
    assert_eq!( st.select_channel("*H*").len(), 2);
    assert_eq!( st.select_channel("B[HD]?").len(), 3);
    assert_eq!( st.select("AV.SPCP.*.BDF").len(), 1);
    assert_eq!( st.max_npts(), 2);
}

#[test]
fn test_inventory () {
    let inv = Inventory::new( vec![
        Network { code: "AV".into(), description: None, stations: vec![
            Station { code: "SPCP".into(), latitude: 61.2, longitude: -152.1, elevation: 1000.0, site_name: None, channels: vec![
                Channel { code: "BHZ".into(), location: "".into(), latitude: 61.25, longitude: -152.15, elevation: 990.0, depth: 0.0,
                          sample_rate: Some(50.0), start_date: None, end_date: None,
                          response: Some( InstrumentResponse { sensitivity: 1e9, frequency: 1.0, input_units: "M/S".into(), output_units: "COUNTS".into() }) },
                Channel { code: "BHZ".into(), location: "".into(), latitude: 61.25, longitude: -152.15, elevation: 990.0, depth: 0.0,
                          sample_rate: Some(50.0), start_date: None, end_date: None, response: None },
            ]}
        ]}
    ]);

    let t = utc(2024,3,1,0,0,0);
    let ids = inv.channel_ids();
    assert_eq!( ids, vec![ ChannelId::new("AV","SPCP","","BHZ") ]);
    assert!( inv.response(&ids[0], &t).unwrap().is_velocity());
    assert_eq!( inv.coordinates(&ids[0], &t).unwrap().lat, 61.25);

    // unknown channel of known station falls back to station coordinates
    assert_eq!( inv.coordinates( &ChannelId::new("AV","SPCP","","BDF"), &t).unwrap().lat, 61.2);
    assert!( inv.coordinates( &ChannelId::new("AK","XX","","BHZ"), &t).is_none());
}

#[test]
fn test_inventory_epochs () {
    let response = |sensitivity: f64| InstrumentResponse { sensitivity, frequency: 1.0, input_units: "M/S".into(), output_units: "COUNTS".into() };
    let switch = utc(2020,6,1,0,0,0);
    let inv = Inventory::new( vec![
        Network { code: "AV".into(), description: None, stations: vec![
            Station { code: "SPCP".into(), latitude: 61.2, longitude: -152.1, elevation: 1000.0, site_name: None, channels: vec![
                Channel { code: "BHZ".into(), location: "".into(), latitude: 61.25, longitude: -152.15, elevation: 990.0, depth: 0.0,
                          sample_rate: Some(50.0), start_date: Some( utc(2010,1,1,0,0,0)), end_date: Some(switch),
                          response: Some( response(1e8)) },
                Channel { code: "BHZ".into(), location: "".into(), latitude: 61.26, longitude: -152.16, elevation: 995.0, depth: 0.0,
                          sample_rate: Some(50.0), start_date: Some(switch), end_date: None,
                          response: Some( response(1e9)) },
            ]}
        ]}
    ]);
    let id = ChannelId::new("AV","SPCP","","BHZ");

    assert_eq!( inv.channel_ids(), vec![ id.clone() ]);
    assert_eq!( inv.response( &id, &utc(2015,1,1,0,0,0)).unwrap().sensitivity, 1e8);
    assert_eq!( inv.response( &id, &switch).unwrap().sensitivity, 1e9);
    assert_eq!( inv.response( &id, &utc(2024,3,1,0,0,0)).unwrap().sensitivity, 1e9);
    assert!( inv.response( &id, &utc(2005,1,1,0,0,0)).is_none());

    assert_eq!( inv.coordinates( &id, &utc(2015,1,1,0,0,0)).unwrap().lat, 61.25);
    assert_eq!( inv.coordinates( &id, &utc(2024,3,1,0,0,0)).unwrap().lat, 61.26);
    assert_eq!( inv.coordinates( &id, &utc(2005,1,1,0,0,0)).unwrap().lat, 61.2); // station

    let mut st = Stream::from_traces( vec![
        Trace::new( id.clone(), utc(2015,1,1,0,0,0), 1.0, vec![0.0]),
        Trace::new( id.clone(), utc(2024,3,1,0,0,0), 1.0, vec![0.0]),
    ]);
    assert_eq!( inv.attach_coordinates( &mut st), 2);
    assert_eq!( st.get(0).unwrap().coordinates.unwrap().lat, 61.25);
    assert_eq!( st.get(1).unwrap().coordinates.unwrap().lat, 61.26);
}
