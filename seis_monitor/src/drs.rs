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

//! surface wave reduced displacement (DRS).
//!
//! For a point source at distance `r` and a dominant wavelength `λ` the reduced displacement is
//! `|d| * sqrt(r * λ)`, i.e. the ground displacement corrected for cylindrical spreading. We report it in cm²

use serde::{Serialize,Deserialize};

use seis_common::{debug, warn};
use seis_common::datetime::TimeRange;
use seis_common::geo::GeoPos;
use seis_fdsn::{Inventory, Stream, Units};

use crate::rsam::{bin_mean_abs, DEFAULT_SAMPLING_INTERVAL};

const SQ_METERS_TO_SQ_CM: f64 = 1e4;

#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct DrsOptions {
    pub source: GeoPos,
    pub sampling_interval: f64,
    /// surface wave speed in m/s
    pub wave_speed: f64,
    /// dominant frequency in Hz
    pub peak_frequency: f64,
}

impl DrsOptions {
    pub fn new (source: GeoPos)->Self {
        DrsOptions { source, sampling_interval: DEFAULT_SAMPLING_INTERVAL, wave_speed: 2000.0, peak_frequency: 2.0 }
    }

    pub fn wavelength (&self)->f64 { self.wave_speed / self.peak_frequency }
}

/// reduced displacement of the displacement traces in `disp`, binned like RSAM. Station positions are taken
/// from the traces if attached, otherwise from `inventory`. Traces without position are skipped
pub fn reduced_displacement (disp: &Stream, inventory: &Inventory, range: &TimeRange, options: &DrsOptions)->Stream {
    let wavelength = options.wavelength();
    let mut result = Stream::new();

    for tr in disp.iter() {
        let Some(pos) = tr.coordinates.or_else( || inventory.coordinates( &tr.id, &tr.start)) else {
            warn!("no coordinates for {}, skipping DRS", tr.id);
            continue
        };
        if tr.units != Units::Meters {
            warn!("DRS input {} is in {} not m", tr.id, tr.units);
        }

        let r = options.source.distance_to( &pos.pos());
        let scale = (r * wavelength).sqrt() * SQ_METERS_TO_SQ_CM;
        let data: Vec<f64> = tr.data.iter().map( |d| d.abs() * scale).collect();

        let mut reduced = tr.with_data( tr.start, data);
        reduced.coordinates = Some(pos);
        reduced.distance = Some(r);

        match bin_mean_abs( &reduced, range, options.sampling_interval) {
            Some(mut binned) => {
                binned.units = Units::SquareCentimeters;
                result.push(binned)
            }
            None => debug!("no DRS samples for {} in {range}", tr.id)
        }
    }

    result
}
