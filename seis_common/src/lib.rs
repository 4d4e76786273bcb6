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

//! common infrastructure shared by the seis crates: logging macros, filesystem helpers,
//! time ranges, geodetic distances and RON config lookup

// re-exported so that our logging macros resolve in crates that do not depend on tracing themselves
pub use tracing;

pub mod macros;
pub mod fs;
pub mod datetime;
pub mod geo;
pub mod config;

mod errors;
pub use errors::*;

// a global fn that can be used with serde(skip_serializing_if="seis_common::is_none")
#[inline] pub fn is_none<T> (opt: &Option<T>)->bool { opt.is_none() }

/// NaN-ignoring arithmetic mean. Returns NaN if there are no finite values
pub fn nan_mean<I> (values: I)->f64 where I: IntoIterator<Item=f64> {
    let mut n = 0usize;
    let mut sum = 0.0;
    for v in values {
        if !v.is_nan() {
            sum += v;
            n += 1;
        }
    }
    if n > 0 { sum / n as f64 } else { f64::NAN }
}
