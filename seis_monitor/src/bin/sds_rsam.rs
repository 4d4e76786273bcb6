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

use anyhow::{anyhow, Result};
use clap::Parser;
use lazy_static::lazy_static;
use tracing_subscriber::EnvFilter;

use seis_common::info;
use seis_common::datetime::{parse_utc_datetime, TimeRange};
use seis_fdsn::read_inventory;
use seis_sds::SdsArchive;
use seis_monitor::{load_config, MonitorConfig};
use seis_monitor::processing::BasicProcessor;
use seis_monitor::wrappers::{sds_to_rsam, ProductRun};

#[derive(Parser, Debug)]
#[command(version, about, long_about = "compute RSAM and DRS day files from a SDS waveform archive")]
struct Args {
    /// filename of the monitor config
    #[arg(short,long, default_value = "sds_rsam.ron")]
    config: String,

    /// first day to process (YYYY-MM-DD or RFC3339)
    #[arg(short,long)]
    start: String,

    /// end of the time range (exclusive)
    #[arg(short,long)]
    end: String,

    /// replace existing product files
    #[arg(short,long)]
    overwrite: bool,
}

lazy_static! {
    static ref ARGS: Args = Args::parse();
}

fn main ()->Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter( EnvFilter::from_default_env())  // use RUST_LOG to set max level
        .init();

    let config: MonitorConfig = load_config( &ARGS.config)?;
    let start = parse_utc_datetime( &ARGS.start).ok_or_else( || anyhow!("invalid start time {}", ARGS.start))?;
    let end = parse_utc_datetime( &ARGS.end).ok_or_else( || anyhow!("invalid end time {}", ARGS.end))?;
    let range = TimeRange::new( start, end)?;

    let inventory = match &config.inventory {
        Some(path) => Some( read_inventory( path)?),
        None => None
    };

    let mut run = ProductRun::from_config( &config, config.trace_ids.as_deref(), inventory.as_ref());
    run.overwrite |= ARGS.overwrite;

    let mut sds = SdsArchive::new( &config.sds_top);
    let mut rsam = SdsArchive::for_product( &config.sds_top, "RSAM");
    let mut drs = SdsArchive::for_product( &config.sds_top, "DRS");

    let summary = sds_to_rsam( &BasicProcessor, &mut sds, &mut rsam, &mut drs, &range, &run)?;
    info!("processed {} days, wrote {} products", summary.iterations, summary.products_written);
    println!("{summary:?}");

    Ok(())
}
