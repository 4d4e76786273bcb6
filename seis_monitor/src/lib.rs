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

//! derived products of the seismic day archive: RSAM, reduced displacement and spectrograms, together with
//! the loops that keep the archive and its products current

pub mod processing;
pub mod rsam;
pub mod drs;
pub mod distance;
pub mod spectrogram;
pub mod wrappers;

mod config;
pub use config::*;

mod errors;
pub use errors::*;

seis_common::define_load_config!{}
