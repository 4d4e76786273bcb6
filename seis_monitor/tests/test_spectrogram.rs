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

use std::path::{Path,PathBuf};
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use seis_common::datetime::TimeRange;
use seis_fdsn::{ChannelId, Stream, Trace};
use seis_monitor::{render_error, Result};
use seis_monitor::spectrogram::*;

// run with "cargo test test_xx -- --nocapture"

/// records render calls and writes a placeholder image
#[derive(Default)]
struct MockRenderer {
    calls: Vec<(PathBuf,usize,String)>,
    fail: bool,
}

impl SpectrogramRenderer for MockRenderer {
    fn render (&mut self, stream: &Stream, path: &Path, options: &SpectrogramOptions)->Result<()> {
        if self.fail { return Err( render_error("no colormap")) }
        std::fs::write( path, b"png")?;
        self.calls.push( (path.to_path_buf(), stream.max_npts(), options.title.clone()));
        Ok(())
    }
}

fn t0 ()->DateTime<Utc> { Utc.with_ymd_and_hms(2024, 3, 1, 0, 10, 0).unwrap() }

fn stream (n: usize)->Stream {
    Stream::from_traces( vec![ Trace::new( ChannelId::new("AV","SPCP","","BHZ"), t0(), 10.0, vec![1.0; n]) ])
}

#[test]
fn test_naming () {
    let flat = SpectrogramNaming::Flat { dir: PathBuf::from("/data/sgram") };
    assert_eq!( flat.path( "AV", &t0()), PathBuf::from("/data/sgram/AV.20240301T001000.png"));

    let iceweb = SpectrogramNaming::Iceweb { top: PathBuf::from("/data/iceweb"), subnet: "Spurr".into() };
    assert_eq!( iceweb.path( "AV", &t0()), PathBuf::from("/data/iceweb/AV/2024/061/Spurr_20240301-0010.png"));
}

#[test]
fn test_render_window () {
    let tmp = tempfile::tempdir().unwrap();
    let naming = SpectrogramNaming::Flat { dir: tmp.path().join("sgram") };
    let options = SpectrogramOptions::default();
    let mut renderer = MockRenderer::default();

    let res = render_window( &mut renderer, &Stream::new(), &t0(), &naming, &options, false).unwrap();
    assert_eq!( res, WindowOutcome::NoData);

    let res = render_window( &mut renderer, &stream(999), &t0(), &naming, &options, false).unwrap();
    assert_eq!( res, WindowOutcome::TooShort);
    assert!( renderer.calls.is_empty());

    let path = naming.path( "AV", &t0());
    let res = render_window( &mut renderer, &stream(1000), &t0(), &naming, &options, false).unwrap();
    assert_eq!( res, WindowOutcome::Rendered( path.clone()));
    assert!( path.is_file());
    assert_eq!( renderer.calls.len(), 1);
    assert_eq!( renderer.calls[0].2, path.to_string_lossy());

    // exists
    let res = render_window( &mut renderer, &stream(1000), &t0(), &naming, &options, false).unwrap();
    assert_eq!( res, WindowOutcome::Exists( path.clone()));
    assert_eq!( renderer.calls.len(), 1);

    let res = render_window( &mut renderer, &stream(1000), &t0(), &naming, &options, true).unwrap();
    assert_eq!( res, WindowOutcome::Rendered( path.clone()));
    assert_eq!( renderer.calls.len(), 2);
}

#[test]
fn test_render_failure () {
    let tmp = tempfile::tempdir().unwrap();
    let naming = SpectrogramNaming::Flat { dir: tmp.path().to_path_buf() };
    let mut renderer = MockRenderer { fail: true, ..MockRenderer::default() };

    assert!( render_window( &mut renderer, &stream(2000), &t0(), &naming, &SpectrogramOptions::default(), false).is_err());

    let res = try_render_window( &mut renderer, &stream(2000), &t0(), &naming, &SpectrogramOptions::default(), false).unwrap();
    assert!( matches!( res, WindowOutcome::Failed(_)));
}

#[test]
fn test_spectrogram_windows () {
    let tmp = tempfile::tempdir().unwrap();
    let naming = SpectrogramNaming::Flat { dir: tmp.path().to_path_buf() };
    let mut renderer = MockRenderer::default();
    let range = TimeRange::new( t0(), t0() + TimeDelta::minutes(30)).unwrap();

    // 20 min of data
    let outcomes = spectrogram_windows( &mut renderer, &stream(12000), &range, TimeDelta::minutes(10), &naming,
                                        &SpectrogramOptions::default(), false).unwrap();
    assert_eq!( outcomes.len(), 3);
    assert!( matches!( outcomes[0], WindowOutcome::Rendered(_)));
    assert!( matches!( outcomes[1], WindowOutcome::Rendered(_)));
    assert_eq!( outcomes[2], WindowOutcome::NoData);

    assert_eq!( renderer.calls[0].0, tmp.path().join("AV.20240301T001000.png"));
    assert_eq!( renderer.calls[1].0, tmp.path().join("AV.20240301T002000.png"));
    assert_eq!( renderer.calls[0].1, 6001); // both window ends are inclusive
    assert_eq!( renderer.calls[1].1, 6000);
}
