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

//! the orchestration loops that keep the day archive and its derived products current.
//!
//! All loops step through a time range in fixed increments (days or spectrogram windows). Each step is
//! independent: remote failures, missing data and unreadable archive files are logged and the loop moves
//! on. Only local infrastructure errors (unwritable archive or cache dirs) terminate a loop.

use chrono::TimeDelta;

use seis_common::{debug, info, warn};
use seis_common::datetime::{one_day, TimeRange};
use seis_common::geo::GeoPos;
use seis_fdsn::{get_inventory, get_stream, ChannelId, FdsnCache, FdsnSource, Inventory, StationRequest, Stream};
use seis_sds::{DayArchive, ReadSpeed};

use crate::config::{CircleSearch, MonitorConfig};
use crate::distance::{attach_distances, order_by_distance};
use crate::drs::{reduced_displacement, DrsOptions};
use crate::errors::Result;
use crate::processing::{remove_response_stream, BandPass, ResponseOutput, SignalProcessor};
use crate::rsam::{rsam, write_product, RsamOptions};
use crate::spectrogram::{spectrogram_windows, try_render_window, SpectrogramNaming, SpectrogramOptions, SpectrogramRenderer, WindowOutcome};

/// padding in seconds around each day to avoid filter edge effects
pub const TAPER_SECS: i64 = 3600;

#[derive(Debug,Clone,Copy,Default,PartialEq,Eq)]
pub struct LoopSummary {
    pub iterations: usize,
    /// iterations that had to go to the remote source
    pub fallbacks: usize,
    pub archive_writes: usize,
    pub products_written: usize,
    pub spectrograms_rendered: usize,
}

/// where the channel ids of the FDSN→SDS loop come from
#[derive(Debug,Clone)]
pub enum ChannelSelection {
    Ids(Vec<ChannelId>),
    Inventory(Inventory),
    /// stations within a circle, looked up for each day
    Search(CircleSearch),
}

impl ChannelSelection {
    /// explicit ids take precedence over an inventory, which takes precedence over a circle search
    pub fn from_options (ids: Option<Vec<ChannelId>>, inventory: Option<Inventory>, search: Option<CircleSearch>)->Option<Self> {
        if let Some(ids) = ids {
            Some( ChannelSelection::Ids(ids))
        } else if let Some(inv) = inventory {
            Some( ChannelSelection::Inventory(inv))
        } else {
            search.map( ChannelSelection::Search)
        }
    }

    fn resolve<S> (&self, source: &S, cache: &FdsnCache, day: &TimeRange, overwrite: bool, use_cache: bool)->Result<Vec<ChannelId>>
        where S: FdsnSource + ?Sized
    {
        match self {
            ChannelSelection::Ids(ids) => Ok( ids.clone()),
            ChannelSelection::Inventory(inv) => Ok( inv.channel_ids()),
            ChannelSelection::Search(search) => {
                let request = StationRequest::new( *day, search.center, search.radius_deg);
                let fetch = get_inventory( source, cache, &request, overwrite, use_cache)?;
                Ok( fetch.inventory().map( |inv| inv.channel_ids()).unwrap_or_default())
            }
        }
    }
}

/// read `range` into the archive stream. Read errors count as missing data
fn read_archive<A> (archive: &mut A, range: &TimeRange, speed: ReadSpeed, ids: Option<&[ChannelId]>)->bool
    where A: DayArchive + ?Sized
{
    match archive.read( range, speed, ids) {
        Ok(status) => status.has_data(),
        Err(e) => {
            warn!("failed to read archive for {range}: {e}");
            archive.set_stream( Stream::new());
            false
        }
    }
}

/* #region FDSN -> SDS ********************************************************************************/

/// fill the day archive for each day of `range`. Days that are already archived are skipped unless
/// `overwrite` is set, all others are fetched from `source` (or the FDSN cache) and written back
pub fn fdsn_to_sds_daily<S,A> (source: &S, cache: &FdsnCache, archive: &mut A, range: &TimeRange, selection: &ChannelSelection,
                               overwrite: bool, use_cache: bool)->Result<LoopSummary>
    where S: FdsnSource + ?Sized, A: DayArchive + ?Sized
{
    let mut summary = LoopSummary::default();

    for day in range.steps( one_day()) {
        summary.iterations += 1;

        if read_archive( archive, &day, ReadSpeed::Fast, None) && !overwrite {
            debug!("archive already has data for {day}");
            continue
        }
        summary.fallbacks += 1;

        let ids = selection.resolve( source, cache, &day, overwrite, use_cache)?;
        if ids.is_empty() {
            info!("no channels to fetch for {day}");
            continue
        }

        let fetch = get_stream( source, cache, &ids, &day, overwrite, use_cache)?;
        for (id,e) in &fetch.failures {
            warn!("no waveforms for {id} in {day}: {e}");
        }

        archive.set_stream( fetch.stream);
        let written = archive.write( overwrite)?;
        info!("archived {} samples in {} files for {day}", written.samples_written, written.files_written);
        summary.archive_writes += 1;
    }

    Ok(summary)
}

/* #endregion FDSN -> SDS */

/* #region derived products ***************************************************************************/

/// parameters of the RSAM/DRS loops
#[derive(Debug,Clone)]
pub struct ProductRun<'a> {
    pub ids: Option<&'a [ChannelId]>,
    /// with an inventory products are computed from instrument corrected data
    pub inventory: Option<&'a Inventory>,
    /// DRS is only computed if there is a source location (and an inventory)
    pub source: Option<GeoPos>,
    pub filter: Option<BandPass>,
    pub sampling_interval: f64,
    pub overwrite: bool,
}

impl<'a> ProductRun<'a> {
    pub fn new (overwrite: bool)->Self {
        let rsam = RsamOptions::default();
        ProductRun { ids: None, inventory: None, source: None, filter: rsam.filter, sampling_interval: rsam.sampling_interval, overwrite }
    }

    pub fn from_config (config: &MonitorConfig, ids: Option<&'a [ChannelId]>, inventory: Option<&'a Inventory>)->Self {
        ProductRun {
            ids,
            inventory,
            source: config.source,
            filter: Some( config.filter),
            sampling_interval: config.sampling_interval,
            overwrite: config.overwrite,
        }
    }

    pub fn pre_filt (&self)->[f64;4] {
        self.filter.unwrap_or_default().pre_filt()
    }

    fn rsam_options (&self)->RsamOptions {
        RsamOptions { sampling_interval: self.sampling_interval, filter: self.filter }
    }

    fn drs_options (&self, source: GeoPos)->DrsOptions {
        DrsOptions { sampling_interval: self.sampling_interval, ..DrsOptions::new( source) }
    }
}

fn write_rsam<P,R> (processor: &P, archive: &mut R, stream: &Stream, day: &TimeRange, run: &ProductRun)->Result<usize>
    where P: SignalProcessor + ?Sized, R: DayArchive + ?Sized
{
    let product = rsam( processor, stream, day, &run.rsam_options());
    Ok( write_product( archive, product, run.overwrite)?.map_or( 0, |_| 1))
}

fn write_drs<D> (archive: &mut D, disp: &Stream, inventory: &Inventory, day: &TimeRange, source: GeoPos, run: &ProductRun)->Result<usize>
    where D: DayArchive + ?Sized
{
    let product = reduced_displacement( disp, inventory, day, &run.drs_options( source));
    Ok( write_product( archive, product, run.overwrite)?.map_or( 0, |_| 1))
}

/// compute RSAM (and DRS if configured) for each day of `range` from the waveform archive `sds`
pub fn sds_to_rsam<P,A,R,D> (processor: &P, sds: &mut A, rsam_archive: &mut R, drs_archive: &mut D, range: &TimeRange,
                             run: &ProductRun)->Result<LoopSummary>
    where P: SignalProcessor + ?Sized, A: DayArchive + ?Sized, R: DayArchive + ?Sized, D: DayArchive + ?Sized
{
    let mut summary = LoopSummary::default();
    let taper = TimeDelta::seconds( TAPER_SECS);

    for day in range.steps( one_day()) {
        summary.iterations += 1;

        if !read_archive( sds, &day.extended( taper, taper), ReadSpeed::Careful, run.ids) && !run.overwrite {
            debug!("no waveforms for {day}");
            continue
        }
        let stream = sds.take_stream();

        match run.inventory {
            Some(inv) => {
                let vel = remove_response_stream( processor, &stream, inv, ResponseOutput::Velocity, run.pre_filt());
                summary.products_written += write_rsam( processor, rsam_archive, &vel, &day, run)?;

                if let Some(source) = run.source {
                    let disp = remove_response_stream( processor, &stream, inv, ResponseOutput::Displacement, run.pre_filt());
                    summary.products_written += write_drs( drs_archive, &disp, inv, &day, source, run)?;
                }
            }
            None => {
                summary.products_written += write_rsam( processor, rsam_archive, &stream, &day, run)?;
            }
        }
    }

    Ok(summary)
}

/* #endregion derived products */

/* #region spectrograms *******************************************************************************/

/// parameters of the SDS→spectrogram loop
#[derive(Debug,Clone)]
pub struct SpectrogramRun<'a> {
    pub ids: Option<&'a [ChannelId]>,
    /// with an inventory seismic channels are converted to displacement
    pub inventory: Option<&'a Inventory>,
    pub window: TimeDelta,
    pub naming: SpectrogramNaming,
    pub options: SpectrogramOptions,
    pub overwrite: bool,
}

impl<'a> SpectrogramRun<'a> {
    pub fn new (naming: SpectrogramNaming, overwrite: bool)->Self {
        let options = SpectrogramOptions { fmin: 0.2, fmax: 25.0, ..SpectrogramOptions::default() };
        SpectrogramRun { ids: None, inventory: None, window: TimeDelta::seconds(600), naming, options, overwrite }
    }

    /// flat spectrogram files in `sgram_top` for windows of `sgram_window_secs`. The frequency band is the
    /// 0.2-25Hz band of this loop, the other spectrogram options come from the config
    pub fn from_config (config: &MonitorConfig, ids: Option<&'a [ChannelId]>, inventory: Option<&'a Inventory>)->Self {
        let naming = SpectrogramNaming::Flat { dir: config.sgram_top.clone() };
        let options = SpectrogramOptions { fmin: 0.2, fmax: 25.0, ..config.spectrogram.clone() };
        SpectrogramRun {
            ids,
            inventory,
            window: TimeDelta::seconds( config.sgram_window_secs),
            naming,
            options,
            overwrite: config.overwrite,
        }
    }

    fn pre_filt (&self)->[f64;4] {
        BandPass { freqmin: self.options.fmin, freqmax: self.options.fmax, ..BandPass::default() }.pre_filt()
    }
}

/// instrument correct E/N/Z channels, other channels are passed through
fn correct_seismic<P> (processor: &P, stream: &Stream, inventory: &Inventory, output: ResponseOutput, pre_filt: [f64;4])->Stream
    where P: SignalProcessor + ?Sized
{
    stream.iter().filter_map( |tr| {
        let mut tr = tr.clone();
        if matches!( tr.id.component(), Some('E' | 'N' | 'Z')) {
            if let Err(e) = processor.remove_response( &mut tr, inventory, output, pre_filt) {
                warn!("dropping {} from spectrogram: {e}", tr.id);
                return None
            }
        }
        Some(tr)
    }).collect()
}

/// render a spectrogram for each window of `range`
pub fn sds_to_spectrograms<P,A,S> (processor: &P, sds: &mut A, renderer: &mut S, range: &TimeRange, run: &SpectrogramRun)->Result<LoopSummary>
    where P: SignalProcessor + ?Sized, A: DayArchive + ?Sized, S: SpectrogramRenderer + ?Sized
{
    let mut summary = LoopSummary::default();

    for window in range.steps( run.window) {
        summary.iterations += 1;

        let stream = match run.inventory {
            Some(inv) => {
                let pad = run.window / 2;
                read_archive( sds, &window.extended( pad, pad), ReadSpeed::Careful, run.ids);
                let padded = sds.take_stream();
                correct_seismic( processor, &padded, inv, ResponseOutput::Displacement, run.pre_filt()).trimmed( &window)
            }
            None => {
                read_archive( sds, &window, ReadSpeed::Careful, run.ids);
                sds.take_stream()
            }
        };

        let outcome = try_render_window( renderer, &stream, &window.start(), &run.naming, &run.options, run.overwrite)?;
        if matches!( outcome, WindowOutcome::Rendered(_)) { summary.spectrograms_rendered += 1 }
    }

    Ok(summary)
}

/// parameters of the IceWeb loop
#[derive(Debug,Clone)]
pub struct IcewebRun<'a> {
    pub product: ProductRun<'a>,
    pub sgram_window: TimeDelta,
    pub naming: SpectrogramNaming,
    pub options: SpectrogramOptions,
}

impl<'a> IcewebRun<'a> {
    pub fn from_config (config: &MonitorConfig, ids: Option<&'a [ChannelId]>, inventory: Option<&'a Inventory>)->Self {
        IcewebRun {
            product: ProductRun::from_config( config, ids, inventory),
            sgram_window: TimeDelta::minutes( config.sgram_minutes),
            naming: SpectrogramNaming::Iceweb { top: config.sgram_top.clone(), subnet: config.subnet.clone() },
            options: config.spectrogram.clone(),
        }
    }
}

/// daily IceWeb products: velocity RSAM, DRS and spectrograms of the distance ordered seismic channels.
/// Without inventory only the raw RSAM is computed
pub fn sds_to_iceweb<P,A,R,D,S> (processor: &P, sds: &mut A, rsam_archive: &mut R, drs_archive: &mut D, renderer: &mut S,
                                 range: &TimeRange, run: &IcewebRun)->Result<LoopSummary>
    where P: SignalProcessor + ?Sized, A: DayArchive + ?Sized, R: DayArchive + ?Sized, D: DayArchive + ?Sized,
          S: SpectrogramRenderer + ?Sized
{
    let mut summary = LoopSummary::default();
    let taper = TimeDelta::seconds( TAPER_SECS);
    let product = &run.product;

    for day in range.steps( one_day()) {
        summary.iterations += 1;

        let Some(inv) = product.inventory else {
            if read_archive( sds, &day, ReadSpeed::Careful, product.ids) {
                let stream = sds.take_stream();
                summary.products_written += write_rsam( processor, rsam_archive, &stream, &day, product)?;
            }
            continue
        };

        read_archive( sds, &day.extended( taper, taper), ReadSpeed::Careful, product.ids);
        let mut stream = sds.take_stream();
        if stream.is_empty() {
            info!("no waveforms for {day}");
            continue
        }

        inv.attach_coordinates( &mut stream);
        if let Some(source) = &product.source { attach_distances( &mut stream, source); }
        let stream = order_by_distance( &stream, None, true).select_channel("*H*");

        let vel = remove_response_stream( processor, &stream, inv, ResponseOutput::Velocity, product.pre_filt()).trimmed( &day);
        summary.products_written += write_rsam( processor, rsam_archive, &vel, &day, product)?;

        if let Some(source) = product.source {
            let disp = remove_response_stream( processor, &stream, inv, ResponseOutput::Displacement, product.pre_filt()).trimmed( &day);
            summary.products_written += write_drs( drs_archive, &disp, inv, &day, source, product)?;
        }

        let filter = product.filter.unwrap_or_default();
        let options = SpectrogramOptions { fmin: filter.freqmin, fmax: filter.freqmax, ..run.options.clone() };
        let outcomes = spectrogram_windows( renderer, &vel, &day, run.sgram_window, &run.naming, &options, product.overwrite)?;
        summary.spectrograms_rendered += outcomes.iter().filter( |o| matches!( o, WindowOutcome::Rendered(_))).count();
    }

    Ok(summary)
}

/* #endregion spectrograms */
