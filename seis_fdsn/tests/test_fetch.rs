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

use std::cell::Cell;
use std::result::Result;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use seis_common::datetime::TimeRange;
use seis_common::geo::GeoPos;
use seis_fdsn::*;

// run with "cargo test test_xx -- --nocapture"

/// a source that counts requests, returns 10 samples per channel and fails for configured stations
struct MockSource {
    inventory: Option<Inventory>,
    failing_stations: Vec<String>,
    split_rates: bool,
    station_calls: Cell<usize>,
    waveform_calls: Cell<usize>,
}

impl MockSource {
    fn new (inventory: Option<Inventory>)->Self {
        MockSource { inventory, failing_stations: Vec::new(), split_rates: false, station_calls: Cell::new(0), waveform_calls: Cell::new(0) }
    }
}

impl FdsnSource for MockSource {
    fn get_stations (&self, query: &StationQuery)->Result<Inventory,RemoteError> {
        assert_eq!( query.level, DetailLevel::Response);
        self.station_calls.set( self.station_calls.get() + 1);
        self.inventory.clone().ok_or( RemoteError::NoData)
    }

    fn get_waveforms (&self, query: &WaveformQuery)->Result<Stream,RemoteError> {
        self.waveform_calls.set( self.waveform_calls.get() + 1);
        if self.failing_stations.contains( &query.id.station) {
            return Err( RemoteError::Transient("timeout".into()))
        }

        let t = query.range.start();
        let mut traces = vec![ Trace::new( query.id.clone(), t, 1.0, vec![1.0; 10]) ];
        if self.split_rates {
            traces.push( Trace::new( query.id.clone(), t + TimeDelta::seconds(20), 3.0, vec![2.0; 10]));
        }
        Ok( Stream::from_traces(traces))
    }
}

fn range ()->TimeRange {
    let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    TimeRange::new( start, start + TimeDelta::days(1)).unwrap()
}

fn inventory ()->Inventory {
    Inventory::new( vec![
        Network { code: "AV".into(), description: None, stations: vec![
            Station { code: "SPCP".into(), latitude: 61.2, longitude: -152.1, elevation: 1000.0, site_name: None, channels: vec![
                Channel { code: "BHZ".into(), location: "".into(), latitude: 61.2, longitude: -152.1, elevation: 1000.0, depth: 0.0,
                          sample_rate: Some(50.0), start_date: None, end_date: None, response: None },
            ]}
        ]}
    ])
}

fn ids ()->Vec<ChannelId> {
    vec![ ChannelId::new("AV","SPCP","","BHZ"), ChannelId::new("AV","SPBG","","BHZ"), ChannelId::new("AV","SPU","","BHZ") ]
}

#[test]
fn test_inventory_cache () {
    let tmp = tempfile::tempdir().unwrap();
    let cache = FdsnCache::new( tmp.path());
    let source = MockSource::new( Some( inventory()));
    let request = StationRequest::new( range(), GeoPos::new( 61.3, -152.25), 0.5).with_channel("BH?");

    let res = get_inventory( &source, &cache, &request, false, true).unwrap();
    assert!( matches!( res, InventoryFetch::Retrieved(_)));
    assert_eq!( source.station_calls.get(), 1);

    // cache hit - no remote call
    let res = get_inventory( &source, &cache, &request, false, true).unwrap();
    assert!( res.is_cached());
    assert_eq!( res.inventory(), Some( &inventory()));
    assert_eq!( source.station_calls.get(), 1);

    // forced
    let res = get_inventory( &source, &cache, &request, true, true).unwrap();
    assert!( matches!( res, InventoryFetch::Retrieved(_)));
    assert_eq!( source.station_calls.get(), 2);
}

#[test]
fn test_inventory_unavailable () {
    let tmp = tempfile::tempdir().unwrap();
    let cache = FdsnCache::new( tmp.path());
    let source = MockSource::new( None);
    let request = StationRequest::new( range(), GeoPos::new( 61.3, -152.25), 0.5);

    let res = get_inventory( &source, &cache, &request, false, true).unwrap();
    assert_eq!( res, InventoryFetch::Unavailable( RemoteError::NoData));
    assert!( res.inventory().is_none());

    // nothing cached
    let path = cache.inventory_path( &request.range, &request.center, request.radius_deg).unwrap();
    assert!( !path.exists());
}

#[test]
fn test_corrupt_inventory_cache () {
    let tmp = tempfile::tempdir().unwrap();
    let cache = FdsnCache::new( tmp.path());
    let source = MockSource::new( Some( inventory()));
    let request = StationRequest::new( range(), GeoPos::new( 61.3, -152.25), 0.5);

    let path = cache.inventory_path( &request.range, &request.center, request.radius_deg).unwrap();
    // station without coordinates
    std::fs::write( &path, br#"<FDSNStationXML><Network code="AV"><Station code="SPCP"></Station></Network></FDSNStationXML>"#).unwrap();

    let res = get_inventory( &source, &cache, &request, false, true);
    assert!( matches!( res, Err( FdsnError::CacheFormat(_))));
    assert_eq!( source.station_calls.get(), 0);
}

#[test]
fn test_stream_cache () {
    let tmp = tempfile::tempdir().unwrap();
    let cache = FdsnCache::new( tmp.path());
    let source = MockSource::new( None);
    let ids = ids();

    let res = get_stream( &source, &cache, &ids, &range(), false, true).unwrap();
    assert_eq!( res.origin, DataOrigin::Remote);
    assert_eq!( res.stream.len(), 3);
    assert_eq!( source.waveform_calls.get(), 3);
    assert!( cache.stream_path( &range(), &ids).unwrap().is_file());

    let res = get_stream( &source, &cache, &ids, &range(), false, true).unwrap();
    assert_eq!( res.origin, DataOrigin::Cache);
    assert_eq!( res.stream.len(), 3);
    assert_eq!( res.stream.get(0).unwrap().data, vec![1.0; 10]);
    assert_eq!( source.waveform_calls.get(), 3);

    let res = get_stream( &source, &cache, &ids, &range(), true, true).unwrap();
    assert_eq!( res.origin, DataOrigin::Remote);
    assert_eq!( source.waveform_calls.get(), 6);
}

#[test]
fn test_no_cache () {
    let tmp = tempfile::tempdir().unwrap();
    let cache = FdsnCache::new( tmp.path());
    let source = MockSource::new( None);

    let res = get_stream( &source, &cache, &ids(), &range(), false, false).unwrap();
    assert_eq!( res.stream.len(), 3);
    assert!( !cache.stream_path( &range(), &ids()).unwrap().exists());
}

#[test]
fn test_failing_channel () {
    let tmp = tempfile::tempdir().unwrap();
    let cache = FdsnCache::new( tmp.path());
    let mut source = MockSource::new( None);
    source.failing_stations.push( "SPBG".into());

    let res = get_stream( &source, &cache, &ids(), &range(), false, false).unwrap();
    assert_eq!( source.waveform_calls.get(), 3);
    assert_eq!( res.stream.len(), 2);
    assert_eq!( res.failures.len(), 1);
    assert_eq!( res.failures[0].0.station, "SPBG");
    assert!( res.failures[0].1.is_retry_advised());
}

#[test]
fn test_all_failing () {
    let tmp = tempfile::tempdir().unwrap();
    let cache = FdsnCache::new( tmp.path());
    let mut source = MockSource::new( None);
    source.failing_stations = vec![ "SPCP".into(), "SPBG".into(), "SPU".into() ];

    let res = get_stream( &source, &cache, &ids(), &range(), false, true).unwrap();
    assert!( res.is_empty());
    assert_eq!( res.failures.len(), 3);
    assert!( !cache.stream_path( &range(), &ids()).unwrap().exists()); // empty results are not cached
}

#[test]
fn test_inconsistent_rates () {
    let tmp = tempfile::tempdir().unwrap();
    let cache = FdsnCache::new( tmp.path());
    let mut source = MockSource::new( None);
    source.split_rates = true;

    let res = get_stream( &source, &cache, &ids()[..1], &range(), false, false).unwrap();
    assert_eq!( res.stream.len(), 1);
    let tr = res.stream.get(0).unwrap();
    assert_eq!( tr.sampling_rate, 2.0);
    assert_eq!( tr.npts(), 50); // second segment starts at 20s -> sample 40
}

#[test]
fn test_empty_ids () {
    let tmp = tempfile::tempdir().unwrap();
    let cache = FdsnCache::new( tmp.path());
    let source = MockSource::new( None);
    assert!( get_stream( &source, &cache, &[], &range(), false, false).is_err());
}
