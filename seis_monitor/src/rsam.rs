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

//! Real-time Seismic Amplitude Measurement: the mean absolute amplitude within fixed time bins

use seis_common::{debug, warn};
use seis_common::datetime::{add_secs, secs_between, TimeRange};
use seis_fdsn::{Stream, Trace};
use seis_sds::{DayArchive, WriteSummary};

use crate::errors::Result;
use crate::processing::{BandPass, SignalProcessor};

pub const DEFAULT_SAMPLING_INTERVAL: f64 = 60.0;

#[derive(Debug,Clone,PartialEq)]
pub struct RsamOptions {
    /// bin length in seconds
    pub sampling_interval: f64,
    pub filter: Option<BandPass>,
}

impl Default for RsamOptions {
    fn default()->Self {
        RsamOptions { sampling_interval: DEFAULT_SAMPLING_INTERVAL, filter: Some( BandPass::default()) }
    }
}

/// mean absolute value of the samples of `trace` in consecutive `interval` bins starting at `range.start()`.
/// Bins without (finite) samples are NaN. Leading and trailing empty bins are dropped. Returns None if all
/// bins are empty
pub fn bin_mean_abs (trace: &Trace, range: &TimeRange, interval: f64)->Option<Trace> {
    if !(interval > 0.0) || trace.data.is_empty() { return None }

    let n_bins = (range.duration_secs() / interval).ceil() as usize;
    let mut sums = vec![0.0; n_bins];
    let mut counts = vec![0usize; n_bins];

    let t0 = secs_between( &range.start(), &trace.start);
    let span = n_bins as f64 * interval;
    for (i,v) in trace.data.iter().enumerate() {
        let t = t0 + i as f64 / trace.sampling_rate;
        if t < 0.0 || t >= span || !v.is_finite() { continue }
        let bin = ((t / interval).floor() as usize).min( n_bins - 1);
        sums[bin] += v.abs();
        counts[bin] += 1;
    }

    let first = counts.iter().position( |c| *c > 0)?;
    let last = counts.iter().rposition( |c| *c > 0)?;
    let data: Vec<f64> = (first..=last).map( |i| {
        if counts[i] > 0 { sums[i] / counts[i] as f64 } else { f64::NAN }
    }).collect();

    let mut binned = trace.with_data( add_secs( &range.start(), first as f64 * interval), data);
    binned.sampling_rate = 1.0 / interval;
    Some(binned)
}

/// the RSAM of all traces in `stream` within `range`, optionally band-pass filtered first. Traces that can't
/// be filtered or don't have data in `range` are skipped
pub fn rsam<P> (processor: &P, stream: &Stream, range: &TimeRange, options: &RsamOptions)->Stream
    where P: SignalProcessor + ?Sized
{
    let mut result = Stream::new();

    for tr in stream.iter() {
        let mut tr = tr.clone();
        if let Some(filter) = &options.filter {
            if let Err(e) = processor.bandpass( &mut tr, filter) {
                warn!("skipping RSAM of {}: {e}", tr.id);
                continue
            }
        }

        match bin_mean_abs( &tr, range, options.sampling_interval) {
            Some(binned) => result.push(binned),
            None => debug!("no RSAM samples for {} in {range}", tr.id)
        }
    }

    result
}

/// write a product stream into its archive. Empty streams are not written
pub fn write_product<A> (archive: &mut A, product: Stream, overwrite: bool)->Result<Option<WriteSummary>>
    where A: DayArchive + ?Sized
{
    if product.is_empty() { return Ok(None) }

    archive.set_stream( product);
    Ok( Some( archive.write( overwrite)?))
}
