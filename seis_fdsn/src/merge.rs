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

//! merging of trace segments that belong to the same channel.
//!
//! Segments are laid out on the sample grid of the earliest segment. Where segments overlap the one that
//! starts later wins, gaps are filled with zeros. Merging requires all segments of a channel to have the
//! same sampling rate - [`merge_with_rate_repair`] resolves conflicts by setting all rates of the affected
//! channel to their mean.

use itertools::Itertools;
use seis_common::{nan_mean, warn};
use seis_common::datetime::secs_between;

use crate::errors::MergeError;
use crate::model::{ChannelId, Stream, Trace};

/// relative tolerance for considering two sampling rates equal. Rates stored in miniSEED headers
/// are not exact
pub const RATE_TOLERANCE: f64 = 1e-6;

pub fn same_rate (a: f64, b: f64)->bool {
    (a - b).abs() <= RATE_TOLERANCE * a.abs().max( b.abs())
}

/// merge segments of a single channel into one trace. Later segments (by start time) overwrite earlier
/// ones, gaps are zero filled
pub fn merge_traces (traces: &[&Trace])->Result<Trace,MergeError> {
    let Some(first) = traces.first() else {
        return Err( MergeError::SamplingRates { id: String::new(), rates: Vec::new() })
    };
    if traces.len() == 1 { return Ok( (*first).clone()) }

    let rate = first.sampling_rate;
    if traces.iter().any( |tr| !same_rate( tr.sampling_rate, rate)) {
        let rates = traces.iter().map( |tr| tr.sampling_rate).collect();
        return Err( MergeError::SamplingRates { id: first.id.to_string(), rates })
    }

    let segments: Vec<&Trace> = traces.iter().copied()
        .filter( |tr| !tr.data.is_empty())
        .sorted_by_key( |tr| tr.start) // stable, so equal starts keep their input order
        .collect();
    let Some(head) = segments.first() else { return Ok( (*first).clone()) };

    let t0 = head.start;
    let offset = |tr: &Trace| (secs_between( &t0, &tr.start) * rate).round() as usize;

    let len = segments.iter().map( |tr| offset(tr) + tr.data.len()).max().unwrap_or(0);
    let mut data = vec![0.0; len];
    for tr in &segments {
        let i0 = offset(tr);
        data[i0..i0 + tr.data.len()].copy_from_slice( &tr.data);
    }

    let mut merged = head.with_data( t0, data);
    merged.sampling_rate = rate;
    Ok(merged)
}

/// merge each channel of `stream` into a single trace. Channels appear in first-seen order
pub fn merge_stream (stream: &Stream)->Result<Stream,MergeError> {
    let mut merged = Stream::new();
    for id in stream.ids() {
        let group = channel_group( stream, &id);
        merged.push( merge_traces( &group)?);
    }
    Ok(merged)
}

/// set the sampling rate of all segments of channels with inconsistent rates to the NaN-ignoring
/// mean of their rates
pub fn repair_sampling_rates (stream: &Stream)->Stream {
    let mut repaired = stream.clone();
    for id in stream.ids() {
        let rates: Vec<f64> = stream.iter().filter( |tr| tr.id == id).map( |tr| tr.sampling_rate).collect();
        let r0 = rates[0];
        if rates.iter().any( |r| !same_rate( *r, r0)) {
            let mean = nan_mean( rates.iter().copied());
            warn!("setting inconsistent sampling rates of {id} {rates:?} to {mean}");
            for tr in repaired.iter_mut().filter( |tr| tr.id == id) {
                tr.sampling_rate = mean;
            }
        }
    }
    repaired
}

/// [`merge_stream`], falling back to merging a rate repaired copy if rates are inconsistent.
/// Never fails - if the repaired copy still can't be merged the repaired segments are returned as they are
pub fn merge_with_rate_repair (stream: &Stream)->Stream {
    match merge_stream(stream) {
        Ok(merged) => merged,
        Err(e) => {
            warn!("merge failed: {e}, repairing sampling rates");
            let repaired = repair_sampling_rates(stream);
            match merge_stream( &repaired) {
                Ok(merged) => merged,
                Err(e) => {
                    warn!("merge of repaired stream failed: {e}");
                    repaired
                }
            }
        }
    }
}

fn channel_group<'a> (stream: &'a Stream, id: &ChannelId)->Vec<&'a Trace> {
    stream.iter().filter( |tr| tr.id == *id).collect()
}
