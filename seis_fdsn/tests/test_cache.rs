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

use std::time::Duration;
use chrono::{DateTime, TimeZone, Utc};
use seis_common::datetime::TimeRange;
use seis_common::geo::GeoPos;
use seis_fdsn::*;

// run with "cargo test test_xx -- --nocapture"

fn utc (y: i32, m: u32, d: u32, hh: u32, mm: u32, ss: u32)->DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, hh, mm, ss).unwrap()
}

#[test]
fn test_inventory_path () {
    let tmp = tempfile::tempdir().unwrap();
    let cache = FdsnCache::new( tmp.path().join("cache"));

    let range = TimeRange::new( utc(2024,3,1,0,0,0), utc(2024,3,2,0,0,0)).unwrap();
    let path = cache.inventory_path( &range, &GeoPos::new( 60.48, -152.74), 0.5).unwrap();
    println!("{path:?}");
    assert_eq!( path.file_name().unwrap().to_str().unwrap(), "202403010000_202403020000_60.4800_-152.7400_0.50.SML");
    assert!( cache.dir().is_dir());

    // seconds are not part of the key
    let range2 = TimeRange::new( utc(2024,3,1,0,0,30), utc(2024,3,2,0,0,59)).unwrap();
    assert_eq!( path, cache.inventory_path( &range2, &GeoPos::new( 60.48, -152.74), 0.5).unwrap());

    // coordinates are rounded to 4 digits
    assert_eq!( path, cache.inventory_path( &range, &GeoPos::new( 60.480001, -152.74), 0.5).unwrap());
    assert_ne!( path, cache.inventory_path( &range, &GeoPos::new( 60.4801, -152.74), 0.5).unwrap());
    assert_ne!( path, cache.inventory_path( &range, &GeoPos::new( 60.48, -152.7401), 0.5).unwrap());
}

#[test]
fn test_inventory_path_radius () {
    let tmp = tempfile::tempdir().unwrap();
    let cache = FdsnCache::new( tmp.path());
    let range = TimeRange::new( utc(2024,3,1,0,0,0), utc(2024,3,2,0,0,0)).unwrap();
    let center = GeoPos::new( 60.48, -152.74);
    let path = |radius: f64| cache.inventory_path( &range, &center, radius).unwrap();

    // radius is rounded to 2 digits
    assert_eq!( path(0.5), path(0.501));
    assert_eq!( path(0.501), path(0.504));
    assert_ne!( path(0.504), path(0.506));
    assert_eq!( path(0.506), path(0.51));
    assert!( path(0.506).to_str().unwrap().ends_with("_60.4800_-152.7400_0.51.SML"));
    assert_ne!( path(0.5), path(1.5));
}

#[test]
fn test_stream_path () {
    let tmp = tempfile::tempdir().unwrap();
    let cache = FdsnCache::new( tmp.path());

    let range = TimeRange::new( utc(2024,3,1,0,0,0), utc(2024,3,2,0,0,0)).unwrap();
    let ids = vec![
        ChannelId::new("AV","SPCP","","BHZ"),
        ChannelId::new("AV","SPCP","","BHN"),
        ChannelId::new("AV","SPBG","","BHZ"),
    ];
    let path = cache.stream_path( &range, &ids).unwrap();
    assert_eq!( path.file_name().unwrap().to_str().unwrap(), "202403010000_202403020000_AV.SPCP..BHZ_AV.SPBG..BHZ.MSEED");

    // only first and last id matter
    let ids2 = vec![ ids[0].clone(), ids[2].clone() ];
    assert_eq!( path, cache.stream_path( &range, &ids2).unwrap());

    assert!( cache.stream_path( &range, &[]).is_err());
}

#[test]
fn test_cache_dir_is_file () {
    let tmp = tempfile::tempdir().unwrap();
    let file = tmp.path().join("cache");
    std::fs::write( &file, b"x").unwrap();

    let cache = FdsnCache::new( &file);
    let range = TimeRange::new( utc(2024,3,1,0,0,0), utc(2024,3,2,0,0,0)).unwrap();
    assert!( cache.inventory_path( &range, &GeoPos::new( 0.0, 0.0), 1.0).is_err());
}

#[test]
fn test_purge () {
    let tmp = tempfile::tempdir().unwrap();
    let cache = FdsnCache::new( tmp.path().join("cache"));
    assert_eq!( cache.purge_older_than( Duration::from_secs(1)).unwrap(), 0); // no dir yet

    std::fs::create_dir_all( cache.dir()).unwrap();
    std::fs::write( cache.dir().join("a.MSEED"), b"x").unwrap();
    std::thread::sleep( Duration::from_millis(20));
    assert_eq!( cache.purge_older_than( Duration::from_millis(1)).unwrap(), 1);
}
