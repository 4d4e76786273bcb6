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

//! the signal processing interface used by the product builders, and a basic implementation of it.
//!
//! [`BasicProcessor`] only uses the overall sensitivity of channels for instrument correction, and
//! cascaded second order Butterworth sections for band-pass filtering. Applications that need full
//! pole/zero deconvolution provide their own [`SignalProcessor`].

use std::f64::consts::PI;
use serde::{Serialize,Deserialize};

use seis_common::{debug, warn};
use seis_fdsn::{Inventory, Stream, Trace, Units};

use crate::errors::{processing_error, Result};

#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct BandPass {
    pub freqmin: f64,
    pub freqmax: f64,
    /// number of filter passes
    pub corners: usize,
    /// filter forward and backward
    pub zerophase: bool,
}

impl Default for BandPass {
    fn default()->Self {
        BandPass { freqmin: 0.5, freqmax: 15.0, corners: 2, zerophase: false }
    }
}

impl BandPass {
    /// the four corner frequencies of the pre-filter used for instrument correction
    pub fn pre_filt (&self)->[f64;4] {
        [self.freqmin / 1.2, self.freqmin, self.freqmax, self.freqmax * 1.2]
    }
}

#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize,Deserialize)]
pub enum ResponseOutput {
    Velocity,
    Displacement,
}

impl ResponseOutput {
    pub fn units (&self)->Units {
        match self {
            ResponseOutput::Velocity => Units::MetersPerSecond,
            ResponseOutput::Displacement => Units::Meters,
        }
    }

    // number of time derivatives relative to displacement
    fn order (&self)->i32 {
        match self {
            ResponseOutput::Velocity => 1,
            ResponseOutput::Displacement => 0,
        }
    }
}

pub trait SignalProcessor {
    fn bandpass (&self, trace: &mut Trace, filter: &BandPass)->Result<()>;

    /// convert counts into ground motion `output` using the response in `inventory`. The pass band of
    /// `pre_filt` is applied before the conversion
    fn remove_response (&self, trace: &mut Trace, inventory: &Inventory, output: ResponseOutput, pre_filt: [f64;4])->Result<()>;
}

/// correct all traces of `stream`. Traces that can't be corrected are dropped with a warning
pub fn remove_response_stream<P> (processor: &P, stream: &Stream, inventory: &Inventory, output: ResponseOutput, pre_filt: [f64;4])->Stream
    where P: SignalProcessor + ?Sized
{
    stream.iter().filter_map( |tr| {
        let mut tr = tr.clone();
        match processor.remove_response( &mut tr, inventory, output, pre_filt) {
            Ok(()) => Some(tr),
            Err(e) => {
                warn!("dropping {}: {e}", tr.id);
                None
            }
        }
    }).collect()
}

/* #region BasicProcessor *****************************************************************************/

#[derive(Debug,Clone,Copy,Default)]
pub struct BasicProcessor;

impl SignalProcessor for BasicProcessor {
    fn bandpass (&self, trace: &mut Trace, filter: &BandPass)->Result<()> {
        let fs = trace.sampling_rate;
        let nyquist = fs / 2.0;
        if !(filter.freqmin > 0.0) || filter.freqmin >= filter.freqmax {
            return Err( processing_error( format!("invalid band {}-{} Hz", filter.freqmin, filter.freqmax)))
        }
        if filter.freqmin >= nyquist {
            return Err( processing_error( format!("lower corner {} Hz above Nyquist of {}", filter.freqmin, trace.id)))
        }

        let hp = Biquad::highpass( filter.freqmin, fs);
        let lp = if filter.freqmax < nyquist {
            Some( Biquad::lowpass( filter.freqmax, fs))
        } else {
            debug!("upper corner {} Hz above Nyquist of {}, only applying highpass", filter.freqmax, trace.id);
            None
        };

        demean( &mut trace.data);
        for _ in 0..filter.corners.max(1) {
            hp.apply( &mut trace.data, filter.zerophase);
            if let Some(lp) = &lp { lp.apply( &mut trace.data, filter.zerophase) }
        }
        Ok(())
    }

    fn remove_response (&self, trace: &mut Trace, inventory: &Inventory, output: ResponseOutput, pre_filt: [f64;4])->Result<()> {
        let resp = inventory.response( &trace.id, &trace.start)
            .ok_or_else( || processing_error( format!("no response for {} at {}", trace.id, trace.start)))?;
        if !(resp.sensitivity.abs() > 0.0) {
            return Err( processing_error( format!("invalid sensitivity {} for {}", resp.sensitivity, trace.id)))
        }

        let input_order = match resp.input_units.to_ascii_uppercase().as_str() {
            "M" => 0,
            "M/S" => 1,
            "M/S**2" | "M/S/S" | "M/S2" => 2,
            other => return Err( processing_error( format!("unsupported input units {other} for {}", trace.id)))
        };

        let filter = BandPass { freqmin: pre_filt[1], freqmax: pre_filt[2], corners: 1, zerophase: true };
        self.bandpass( trace, &filter)?;

        let sensitivity = resp.sensitivity;
        trace.data.iter_mut().for_each( |v| *v /= sensitivity);

        let dt = trace.delta();
        let mut order = input_order;
        while order > output.order() {
            integrate( &mut trace.data, dt);
            demean( &mut trace.data);
            order -= 1;
        }
        while order < output.order() {
            differentiate( &mut trace.data, dt);
            order += 1;
        }

        trace.units = output.units();
        Ok(())
    }
}

pub fn demean (data: &mut [f64]) {
    let n = data.iter().filter( |v| v.is_finite()).count();
    if n > 0 {
        let mean = data.iter().filter( |v| v.is_finite()).sum::<f64>() / n as f64;
        data.iter_mut().for_each( |v| *v -= mean);
    }
}

/// cumulative trapezoid integration, first value is 0
pub fn integrate (data: &mut [f64], dt: f64) {
    let mut acc = 0.0;
    let mut prev = match data.first() { Some(v) => *v, None => return };
    data[0] = 0.0;
    for v in data.iter_mut().skip(1) {
        let cur = *v;
        acc += 0.5 * (prev + cur) * dt;
        prev = cur;
        *v = acc;
    }
}

/// forward differences, last value repeated
pub fn differentiate (data: &mut [f64], dt: f64) {
    let n = data.len();
    if n < 2 {
        data.iter_mut().for_each( |v| *v = 0.0);
        return
    }
    for i in 0..n-1 {
        data[i] = (data[i+1] - data[i]) / dt;
    }
    data[n-1] = data[n-2];
}

/// second order section (RBJ audio EQ cookbook coefficients, Q = 1/sqrt(2))
struct Biquad {
    b: [f64;3],
    a: [f64;2], // normalized a1, a2
}

impl Biquad {
    fn lowpass (f0: f64, fs: f64)->Self {
        let (cw, alpha) = Self::params( f0, fs);
        Self::normalized( [(1.0 - cw) / 2.0, 1.0 - cw, (1.0 - cw) / 2.0], 1.0 + alpha, [-2.0 * cw, 1.0 - alpha])
    }

    fn highpass (f0: f64, fs: f64)->Self {
        let (cw, alpha) = Self::params( f0, fs);
        Self::normalized( [(1.0 + cw) / 2.0, -(1.0 + cw), (1.0 + cw) / 2.0], 1.0 + alpha, [-2.0 * cw, 1.0 - alpha])
    }

    fn params (f0: f64, fs: f64)->(f64,f64) {
        let w0 = 2.0 * PI * f0 / fs;
        (w0.cos(), w0.sin() / (2.0 * std::f64::consts::FRAC_1_SQRT_2))
    }

    fn normalized (b: [f64;3], a0: f64, a: [f64;2])->Self {
        Biquad { b: [b[0]/a0, b[1]/a0, b[2]/a0], a: [a[0]/a0, a[1]/a0] }
    }

    fn run (&self, data: &mut [f64]) {
        let (mut x1, mut x2, mut y1, mut y2) = (0.0, 0.0, 0.0, 0.0);
        for v in data.iter_mut() {
            let x0 = *v;
            let y0 = self.b[0]*x0 + self.b[1]*x1 + self.b[2]*x2 - self.a[0]*y1 - self.a[1]*y2;
            (x2, x1) = (x1, x0);
            (y2, y1) = (y1, y0);
            *v = y0;
        }
    }

    fn apply (&self, data: &mut [f64], zerophase: bool) {
        self.run(data);
        if zerophase {
            data.reverse();
            self.run(data);
            data.reverse();
        }
    }
}

/* #endregion BasicProcessor */
