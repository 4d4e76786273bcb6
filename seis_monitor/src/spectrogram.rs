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

//! windowed spectrogram generation.
//!
//! The driver cuts a stream into consecutive windows and hands each window to a [`SpectrogramRenderer`],
//! unless the window is too short or its image already exists

use std::path::{Path,PathBuf};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Serialize,Deserialize};

use seis_common::{debug, info, warn};
use seis_common::datetime::TimeRange;
use seis_common::fs::ensure_dir;
use seis_fdsn::Stream;

use crate::errors::{MonitorError, Result};

/// windows whose longest trace has fewer samples are not rendered
pub const MIN_SAMPLES: usize = 1000;

#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct SpectrogramOptions {
    /// log amplitude scale
    pub dbscale: bool,
    /// use the same color limits for all channels
    pub equal_scale: bool,
    pub clim: Option<[f64;2]>,
    pub fmin: f64,
    pub fmax: f64,
    #[serde(default)]
    pub title: String,
}

impl Default for SpectrogramOptions {
    fn default()->Self {
        SpectrogramOptions { dbscale: true, equal_scale: true, clim: None, fmin: 0.5, fmax: 15.0, title: String::new() }
    }
}

pub trait SpectrogramRenderer {
    /// render a spectrogram image of `stream` to `path`. Resources are released before returning
    fn render (&mut self, stream: &Stream, path: &Path, options: &SpectrogramOptions)->Result<()>;
}

/// how image files are named
#[derive(Debug,Clone,PartialEq)]
pub enum SpectrogramNaming {
    /// `{dir}/{NET}.{%Y%m%dT%H%M%S}.png`
    Flat { dir: PathBuf },
    /// `{top}/{NET}/{%Y}/{%j}/{subnet}_{%Y%m%d-%H%M}.png`
    Iceweb { top: PathBuf, subnet: String },
}

impl SpectrogramNaming {
    pub fn path (&self, network: &str, window_start: &DateTime<Utc>)->PathBuf {
        match self {
            SpectrogramNaming::Flat { dir } => {
                dir.join( format!("{}.{}.png", network, window_start.format("%Y%m%dT%H%M%S")))
            }
            SpectrogramNaming::Iceweb { top, subnet } => {
                top.join(network)
                    .join( window_start.format("%Y").to_string())
                    .join( window_start.format("%j").to_string())
                    .join( format!("{}_{}.png", subnet, window_start.format("%Y%m%d-%H%M")))
            }
        }
    }
}

#[derive(Debug,Clone,PartialEq)]
pub enum WindowOutcome {
    Rendered(PathBuf),
    /// file exists and we don't overwrite
    Exists(PathBuf),
    TooShort,
    NoData,
    Failed(String),
}

/// render the spectrogram of one (already trimmed) window stream
pub fn render_window<R> (renderer: &mut R, window_stream: &Stream, window_start: &DateTime<Utc>, naming: &SpectrogramNaming,
                         options: &SpectrogramOptions, overwrite: bool)->Result<WindowOutcome>
    where R: SpectrogramRenderer + ?Sized
{
    let Some(first) = window_stream.get(0) else { return Ok( WindowOutcome::NoData) };
    if window_stream.max_npts() < MIN_SAMPLES {
        debug!("window at {window_start} too short ({} samples)", window_stream.max_npts());
        return Ok( WindowOutcome::TooShort)
    }

    let path = naming.path( &first.id.network, window_start);
    if path.is_file() && !overwrite {
        return Ok( WindowOutcome::Exists(path))
    }
    if let Some(dir) = path.parent() { ensure_dir(dir)? }

    let options = SpectrogramOptions { title: path.to_string_lossy().to_string(), ..options.clone() };
    renderer.render( window_stream, &path, &options)?;
    info!("rendered spectrogram {path:?}");
    Ok( WindowOutcome::Rendered(path))
}

/// [`render_window`] where render failures are logged and reported as [`WindowOutcome::Failed`]. Directory
/// errors are still returned
pub fn try_render_window<R> (renderer: &mut R, window_stream: &Stream, window_start: &DateTime<Utc>, naming: &SpectrogramNaming,
                             options: &SpectrogramOptions, overwrite: bool)->Result<WindowOutcome>
    where R: SpectrogramRenderer + ?Sized
{
    match render_window( renderer, window_stream, window_start, naming, options, overwrite) {
        Err(MonitorError::RenderError(msg)) => {
            warn!("spectrogram for window at {window_start} failed: {msg}");
            Ok( WindowOutcome::Failed(msg))
        }
        other => other
    }
}

/// render spectrograms for all consecutive `window_len` windows of `range`
pub fn spectrogram_windows<R> (renderer: &mut R, stream: &Stream, range: &TimeRange, window_len: TimeDelta,
                               naming: &SpectrogramNaming, options: &SpectrogramOptions, overwrite: bool)->Result<Vec<WindowOutcome>>
    where R: SpectrogramRenderer + ?Sized
{
    let mut outcomes = Vec::new();
    for window in range.steps( window_len) {
        let window_stream = stream.trimmed( &window);
        outcomes.push( try_render_window( renderer, &window_stream, &window.start(), naming, options, overwrite)?);
    }
    Ok(outcomes)
}
