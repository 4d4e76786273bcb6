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

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use seis_fdsn::*;

// run with "cargo test test_xx -- --nocapture"

fn t0 ()->DateTime<Utc> { Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap() }

fn bhz ()->ChannelId { ChannelId::new("AV","SPCP","","BHZ") }

#[test]
fn test_gap_is_zero_filled () {
    let st = Stream::from_traces( vec![
        Trace::new( bhz(), t0() + TimeDelta::seconds(5), 1.0, vec![4.0, 5.0]),
        Trace::new( bhz(), t0(), 1.0, vec![1.0, 2.0, 3.0]),
    ]);

    let merged = st.merged().unwrap();
    assert_eq!( merged.len(), 1);
    let tr = merged.get(0).unwrap();
    assert_eq!( tr.start, t0());
    assert_eq!( tr.data, vec![1.0, 2.0, 3.0, 0.0, 0.0, 4.0, 5.0]);
}

#[test]
fn test_later_segment_wins () {
    let st = Stream::from_traces( vec![
        Trace::new( bhz(), t0(), 1.0, vec![1.0, 2.0, 3.0, 4.0]),
        Trace::new( bhz(), t0() + TimeDelta::seconds(2), 1.0, vec![9.0, 9.0]),
    ]);
    let merged = st.merged().unwrap();
    assert_eq!( merged.get(0).unwrap().data, vec![1.0, 2.0, 9.0, 9.0]);
}

#[test]
fn test_channels_stay_separate () {
    let bdf = ChannelId::new("AV","SPCP","","BDF");
    let st = Stream::from_traces( vec![
        Trace::new( bhz(), t0(), 1.0, vec![1.0]),
        Trace::new( bdf.clone(), t0(), 1.0, vec![2.0]),
        Trace::new( bhz(), t0() + TimeDelta::seconds(1), 1.0, vec![3.0]),
    ]);
    let merged = st.merged().unwrap();
    assert_eq!( merged.len(), 2);
    assert_eq!( merged.get(0).unwrap().id, bhz());
    assert_eq!( merged.get(0).unwrap().data, vec![1.0, 3.0]);
    assert_eq!( merged.get(1).unwrap().id, bdf);
}

#[test]
fn test_rate_repair () {
    let st = Stream::from_traces( vec![
        Trace::new( bhz(), t0(), 100.0, vec![1.0; 10]),
        Trace::new( bhz(), t0() + TimeDelta::seconds(10), 50.0, vec![2.0; 10]),
    ]);

    assert!( st.merged().is_err());

    let merged = st.merged_with_rate_repair();
    println!("{merged}");
    assert_eq!( merged.len(), 1);
    let tr = merged.get(0).unwrap();
    assert_eq!( tr.sampling_rate, 75.0);
    assert_eq!( tr.npts(), 750 + 10);
    assert_eq!( tr.data[0], 1.0);
    assert_eq!( tr.data[10], 0.0);
    assert_eq!( tr.data[750], 2.0);

    // the input is not modified
    assert_eq!( st.get(0).unwrap().sampling_rate, 100.0);
}

#[test]
fn test_rate_repair_is_per_channel () {
    let bdf = ChannelId::new("AV","SPCP","","BDF");
    let st = Stream::from_traces( vec![
        Trace::new( bhz(), t0(), 100.0, vec![1.0; 10]),
        Trace::new( bhz(), t0() + TimeDelta::seconds(1), 50.0, vec![2.0; 10]),
        Trace::new( bdf.clone(), t0(), 25.0, vec![3.0; 10]),
    ]);

    let merged = st.merged_with_rate_repair();
    assert_eq!( merged.len(), 2);
    assert_eq!( merged.get(0).unwrap().sampling_rate, 75.0);
    assert_eq!( merged.get(1).unwrap().sampling_rate, 25.0);
}
