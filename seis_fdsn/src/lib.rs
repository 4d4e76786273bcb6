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

//! station metadata and waveform data model, plus the FDSN fetch/cache layer.
//!
//! Remote services are accessed through the [`FdsnSource`] trait. Retrieved data is kept in a flat file
//! cache (see [`FdsnCache`]) so that repeated requests for the same time window and channels do not hit
//! the server again.

pub mod model;
pub use model::*;

pub mod inventory;
pub use inventory::*;
pub mod stationxml;

pub mod merge;
pub mod mseed;

pub mod cache;
pub use cache::FdsnCache;

pub mod source;
pub use source::*;

pub mod fetch;
pub use fetch::*;

mod errors;
pub use errors::*;
