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

//! runtime configuration of the monitoring loops, loaded from RON files (see `seis_common::config`)

use std::{path::PathBuf, time::Duration};
use serde::{Serialize,Deserialize};

use seis_common::datetime::deserialize_optional_duration;
use seis_common::geo::GeoPos;
use seis_common::info;
use seis_fdsn::{ChannelId, FdsnCache};

use crate::errors::Result;
use crate::processing::BandPass;
use crate::rsam::DEFAULT_SAMPLING_INTERVAL;
use crate::spectrogram::SpectrogramOptions;

/// center and radius of a circular station search
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct CircleSearch {
    pub center: GeoPos,
    pub radius_deg: f64,
}

#[derive(Debug,Clone,Serialize,Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub cache_dir: PathBuf,
    pub use_cache: bool,
    /// cache files older than this are purged when the cache is opened
    #[serde(deserialize_with="deserialize_optional_duration", skip_serializing)]
    pub cache_max_age: Option<Duration>,

    /// top dir of the waveform SDS archive. Derived products go into `{sds_top}/RSAM` and `{sds_top}/DRS`
    pub sds_top: PathBuf,
    pub sgram_top: PathBuf,
    /// IceWeb subnet name used for spectrogram file names
    pub subnet: String,

    // channel selection, in order of precedence
    pub trace_ids: Option<Vec<ChannelId>>,
    pub inventory: Option<PathBuf>,
    pub search: Option<CircleSearch>,

    /// source location for reduced displacement
    pub source: Option<GeoPos>,

    pub filter: BandPass,
    /// RSAM/DRS bin length in seconds
    pub sampling_interval: f64,
    /// spectrogram window of the SDS→spectrogram loop in seconds
    pub sgram_window_secs: i64,
    /// spectrogram window of the IceWeb loop in minutes
    pub sgram_minutes: i64,
    pub spectrogram: SpectrogramOptions,

    pub overwrite: bool,
}

impl Default for MonitorConfig {
    fn default()->Self {
        MonitorConfig {
            cache_dir: PathBuf::from("cache"),
            use_cache: true,
            cache_max_age: None,
            sds_top: PathBuf::from("SDS"),
            sgram_top: PathBuf::from("spectrograms"),
            subnet: "subnet".into(),
            trace_ids: None,
            inventory: None,
            search: None,
            source: None,
            filter: BandPass::default(),
            sampling_interval: DEFAULT_SAMPLING_INTERVAL,
            sgram_window_secs: 600,
            sgram_minutes: 10,
            spectrogram: SpectrogramOptions { clim: Some([1e-8, 1e-5]), ..SpectrogramOptions::default() },
            overwrite: false,
        }
    }
}

impl MonitorConfig {
    /// the FDSN cache in `cache_dir`, with files older than `cache_max_age` removed
    pub fn open_cache (&self)->Result<FdsnCache> {
        let cache = FdsnCache::new( &self.cache_dir);
        if let Some(max_age) = self.cache_max_age {
            let n = cache.purge_older_than( max_age)?;
            if n > 0 { info!("purged {n} cache files older than {max_age:?} from {:?}", self.cache_dir) }
        }
        Ok(cache)
    }
}
