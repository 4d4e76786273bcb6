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

use std::cmp::Ordering;
use itertools::Itertools;

use seis_common::debug;
use seis_common::geo::GeoPos;
use seis_fdsn::{Stream, Trace};

/// channel orientation/sensor codes in display order
const CHANNEL_ORDER: &str = "ZNEF0123456789";

/// set the distance (in meters) from `source` for all traces with coordinates. Returns the number of updated traces
pub fn attach_distances (stream: &mut Stream, source: &GeoPos)->usize {
    let mut n = 0;
    for tr in stream.iter_mut() {
        if let Some(pos) = &tr.coordinates {
            tr.distance = Some( source.distance_to( &pos.pos()));
            n += 1;
        } else {
            debug!("no coordinates for {}", tr.id);
        }
    }
    n
}

/// small offset that sorts co-located channels by location code and then by component (Z,N,E,F,0..9)
pub fn channel_order_offset (tr: &Trace)->f64 {
    let loc = tr.id.location.parse::<u32>().unwrap_or(0) as f64;
    let comp = tr.id.component()
        .and_then( |c| CHANNEL_ORDER.find(c))
        .map( |i| i as f64)
        .unwrap_or(-1.0);
    loc / 1e6 + comp / 1e9
}

/// a copy of `stream` with traces in ascending order of distance. Explicit `distances` (one per trace) take precedence
/// over attached trace distances, traces without distance go last. With `channel_order`, co-located channels are
/// sorted by [`channel_order_offset`]
pub fn order_by_distance (stream: &Stream, distances: Option<&[f64]>, channel_order: bool)->Stream {
    let keys: Vec<f64> = stream.iter().enumerate().map( |(i,tr)| {
        let r = distances.and_then( |d| d.get(i).copied())
            .or( tr.distance)
            .unwrap_or( f64::INFINITY);
        if channel_order { r + channel_order_offset(tr) } else { r }
    }).collect();

    stream.iter().zip( keys.iter())
        .sorted_by( |a,b| a.1.partial_cmp(b.1).unwrap_or( Ordering::Equal))
        .map( |(tr,_)| tr.clone())
        .collect()
}
