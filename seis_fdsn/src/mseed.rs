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

//! a minimal miniSEED 2.4 codec.
//!
//! We write fixed size records with 64bit float samples (encoding 5), big endian, with a blockette 1000
//! (format), a blockette 100 (exact sampling rate) and a blockette 1001 (microseconds of the start time).
//! The reader accepts the encodings used by data centers (16/32 bit integers, 32/64 bit floats, Steim-1 and
//! Steim-2) in either byte order, and joins consecutive records of the same channel into contiguous traces.

use std::path::Path;
use bytes::{BufMut, BytesMut};
use chrono::{DateTime, Datelike, SubsecRound, TimeDelta, Timelike, Utc, NaiveDate};

use seis_common::{trace, warn};
use seis_common::datetime::secs_between;
use seis_common::fs::{filepath_contents, write_file_atomic};

use crate::errors::{mseed_error, Result};
use crate::merge::same_rate;
use crate::model::{ChannelId, Stream, Trace};

pub const DEFAULT_RECORD_LEN: usize = 4096;

const HEADER_LEN: usize = 48;
const DATA_OFFSET: usize = 128;

const ENC_ASCII: u8 = 0;
const ENC_INT16: u8 = 1;
const ENC_INT32: u8 = 3;
const ENC_FLOAT32: u8 = 4;
const ENC_FLOAT64: u8 = 5;
const ENC_STEIM1: u8 = 10;
const ENC_STEIM2: u8 = 11;

const STEIM_FRAME_LEN: usize = 64;

/* #region writer *************************************************************************************/

pub fn write_file (path: impl AsRef<Path>, stream: &Stream)->Result<()> {
    let buf = encode_stream( stream, DEFAULT_RECORD_LEN)?;
    write_file_atomic( path, &buf)?;
    Ok(())
}

/// encode all traces of `stream` as float64 records of `record_len` bytes (a power of two >= 256)
pub fn encode_stream (stream: &Stream, record_len: usize)->Result<Vec<u8>> {
    if !record_len.is_power_of_two() || record_len < 256 {
        return Err( mseed_error( format!("invalid record length {record_len}")))
    }

    let mut buf = BytesMut::new();
    let mut seq_no = 1usize;
    for tr in stream {
        encode_trace( &mut buf, tr, record_len, &mut seq_no)?;
    }
    Ok( buf.to_vec())
}

fn encode_trace (buf: &mut BytesMut, tr: &Trace, record_len: usize, seq_no: &mut usize)->Result<()> {
    if !(tr.sampling_rate > 0.0) || !tr.sampling_rate.is_finite() {
        return Err( mseed_error( format!("invalid sampling rate {} of {}", tr.sampling_rate, tr.id)))
    }
    let (factor, multiplier) = rate_factors( tr.sampling_rate);
    let samples_per_record = (record_len - DATA_OFFSET) / 8;

    for (i,chunk) in tr.data.chunks( samples_per_record).enumerate() {
        let t = tr.sample_time( i * samples_per_record);
        let rec_start = buf.len();

        // fixed header
        put_ascii( buf, &format!("{:06}", *seq_no % 1_000_000), 6);
        buf.put_u8( b'D');
        buf.put_u8( b' ');
        put_ascii( buf, &tr.id.station, 5);
        put_ascii( buf, &tr.id.location, 2);
        put_ascii( buf, &tr.id.channel, 3);
        put_ascii( buf, &tr.id.network, 2);
        let micro_secs = put_btime( buf, &t);
        buf.put_u16( chunk.len() as u16);
        buf.put_i16( factor);
        buf.put_i16( multiplier);
        buf.put_u8( 0); // activity flags
        buf.put_u8( 0); // io flags
        buf.put_u8( 0); // data quality flags
        buf.put_u8( 3); // number of blockettes
        buf.put_i32( 0); // time correction
        buf.put_u16( DATA_OFFSET as u16);
        buf.put_u16( HEADER_LEN as u16);

        // blockette 1000
        buf.put_u16( 1000);
        buf.put_u16( (HEADER_LEN + 8) as u16);
        buf.put_u8( ENC_FLOAT64);
        buf.put_u8( 1); // big endian
        buf.put_u8( record_len.trailing_zeros() as u8);
        buf.put_u8( 0);

        // blockette 100
        buf.put_u16( 100);
        buf.put_u16( (HEADER_LEN + 20) as u16);
        buf.put_f32( tr.sampling_rate as f32);
        buf.put_u8( 0);
        buf.put_bytes( 0, 3);

        // blockette 1001
        buf.put_u16( 1001);
        buf.put_u16( 0);
        buf.put_u8( 0); // timing quality
        buf.put_i8( micro_secs);
        buf.put_u8( 0);
        buf.put_u8( 0); // frame count (not Steim)

        buf.put_bytes( 0, rec_start + DATA_OFFSET - buf.len());
        for v in chunk {
            buf.put_f64( *v);
        }
        buf.put_bytes( 0, rec_start + record_len - buf.len());

        *seq_no += 1;
    }
    Ok(())
}

fn put_ascii (buf: &mut BytesMut, s: &str, len: usize) {
    let bs = s.as_bytes();
    let n = bs.len().min(len);
    buf.put_slice( &bs[..n]);
    buf.put_bytes( b' ', len - n);
}

/// put the BTIME of `t` (0.1ms resolution) and return the microseconds it is missing
fn put_btime (buf: &mut BytesMut, t: &DateTime<Utc>)->i8 {
    let t = t.round_subsecs(6);
    let micros = t.timestamp_subsec_micros().min( 999_999); // leap seconds
    let ticks = (micros / 100) as u16;

    buf.put_u16( t.year() as u16);
    buf.put_u16( t.ordinal() as u16);
    buf.put_u8( t.hour() as u8);
    buf.put_u8( t.minute() as u8);
    buf.put_u8( t.second() as u8);
    buf.put_u8( 0);
    buf.put_u16( ticks);

    (micros % 100) as i8
}

/// sample rate factor and multiplier as rational approximation of `rate`
fn rate_factors (rate: f64)->(i16,i16) {
    const MAX: i64 = i16::MAX as i64;
    if rate >= 1.0 {
        let (p,q) = rational_approx( rate, MAX);
        if q <= 1 { (p as i16, 1) } else { (p as i16, -(q as i16)) }
    } else {
        let (p,q) = rational_approx( 1.0 / rate, MAX);
        if q <= 1 { (-(p as i16), 1) } else { (-(p as i16), q as i16) }
    }
}

// best continued fraction approximation p/q of x with p,q <= max
fn rational_approx (x: f64, max: i64)->(i64,i64) {
    let (mut h0, mut h1) = (0i64, 1i64);
    let (mut k0, mut k1) = (1i64, 0i64);
    let mut v = x;

    loop {
        let a = v.floor();
        if a > max as f64 { break }
        let a = a as i64;

        let h2 = a * h1 + h0;
        let k2 = a * k1 + k0;
        if h2 > max || k2 > max { break }
        (h0, h1) = (h1, h2);
        (k0, k1) = (k1, k2);

        let frac = v - a as f64;
        if frac.abs() < 1e-9 { break }
        v = 1.0 / frac;
    }

    if k1 == 0 { (max, 1) } else { (h1, k1) }
}

/* #endregion writer */

/* #region reader *************************************************************************************/

pub fn read_file (path: impl AsRef<Path>)->Result<Stream> {
    let buf = filepath_contents( &path.as_ref())?;
    decode_stream( &buf)
}

/// decode a sequence of miniSEED records. Consecutive records of the same channel that are contiguous in
/// time are joined into one trace
pub fn decode_stream (buf: &[u8])->Result<Stream> {
    let mut traces: Vec<Trace> = Vec::new();
    let mut off = 0;

    while off + HEADER_LEN <= buf.len() {
        if buf[off..off+HEADER_LEN].iter().all( |b| *b == 0) { break } // zero padding at end of file

        let rec = parse_record( &buf[off..])?;
        off += rec.record_len;

        if let Some(tr) = rec.trace {
            if let Some(last) = traces.last_mut() {
                if is_continuation( last, &tr) {
                    last.data.extend_from_slice( &tr.data);
                    continue
                }
            }
            traces.push(tr);
        }
    }

    Ok( Stream::from_traces(traces))
}

fn is_continuation (last: &Trace, next: &Trace)->bool {
    if last.id != next.id || !same_rate( last.sampling_rate, next.sampling_rate) { return false }
    let expected = last.sample_time( last.data.len());
    (secs_between( &expected, &next.start)).abs() < 0.5 / last.sampling_rate
}

struct Record {
    record_len: usize,
    trace: Option<Trace>, // None for records without samples
}

#[derive(Clone,Copy)]
struct Reader<'a> {
    buf: &'a [u8],
    big_endian: bool,
}

impl<'a> Reader<'a> {
    fn bytes<const N: usize> (&self, off: usize)->Result<[u8;N]> {
        self.buf.get(off..off+N)
            .and_then( |s| s.try_into().ok())
            .ok_or_else( || mseed_error( format!("record truncated at offset {off}")))
    }
    fn u8 (&self, off: usize)->Result<u8> { Ok( self.bytes::<1>(off)?[0]) }
    fn u16 (&self, off: usize)->Result<u16> {
        let b = self.bytes::<2>(off)?;
        Ok( if self.big_endian { u16::from_be_bytes(b) } else { u16::from_le_bytes(b) })
    }
    fn i16 (&self, off: usize)->Result<i16> { Ok( self.u16(off)? as i16) }
    fn u32 (&self, off: usize)->Result<u32> {
        let b = self.bytes::<4>(off)?;
        Ok( if self.big_endian { u32::from_be_bytes(b) } else { u32::from_le_bytes(b) })
    }
    fn i32 (&self, off: usize)->Result<i32> { Ok( self.u32(off)? as i32) }
    fn f32 (&self, off: usize)->Result<f32> { Ok( f32::from_bits( self.u32(off)?)) }
    fn f64 (&self, off: usize)->Result<f64> {
        let b = self.bytes::<8>(off)?;
        Ok( if self.big_endian { f64::from_be_bytes(b) } else { f64::from_le_bytes(b) })
    }
    fn ascii (&self, off: usize, len: usize)->Result<String> {
        let s = self.buf.get(off..off+len).ok_or_else( || mseed_error("record truncated in header"))?;
        Ok( String::from_utf8_lossy(s).trim().to_string())
    }
}

fn parse_record (buf: &[u8])->Result<Record> {
    // the header byte order is detected from a plausible year
    let be_year = u16::from_be_bytes( [buf[20], buf[21]]);
    let le_year = u16::from_le_bytes( [buf[20], buf[21]]);
    let big_endian = if (1900..=2100).contains(&be_year) {
        true
    } else if (1900..=2100).contains(&le_year) {
        false
    } else {
        return Err( mseed_error( format!("not a miniSEED record (year {be_year})")))
    };
    let hdr = Reader { buf, big_endian };

    let station = hdr.ascii( 8, 5)?;
    let location = hdr.ascii( 13, 2)?;
    let channel = hdr.ascii( 15, 3)?;
    let network = hdr.ascii( 18, 2)?;
    let id = ChannelId { network, station, location, channel };

    let mut start = parse_btime( &hdr, 20)?;
    let nsamples = hdr.u16(30)? as usize;
    let factor = hdr.i16(32)?;
    let multiplier = hdr.i16(34)?;
    let activity_flags = hdr.u8(36)?;
    let n_blockettes = hdr.u8(39)?;
    let time_correction = hdr.i32(40)?;
    let data_offset = hdr.u16(44)? as usize;
    let mut blockette_offset = hdr.u16(46)? as usize;

    let mut rate = rate_from_factors( factor, multiplier);
    let mut encoding: Option<u8> = None;
    let mut data_big_endian = big_endian;
    let mut record_len: Option<usize> = None;
    let mut micro_secs = 0i8;

    let mut n = 0;
    while blockette_offset >= HEADER_LEN && n < n_blockettes.max(1) as usize && blockette_offset + 4 <= buf.len() {
        let btype = hdr.u16( blockette_offset)?;
        let next = hdr.u16( blockette_offset + 2)? as usize;
        match btype {
            1000 => {
                encoding = Some( hdr.u8( blockette_offset + 4)?);
                data_big_endian = hdr.u8( blockette_offset + 5)? == 1;
                let exp = hdr.u8( blockette_offset + 6)?;
                if !(7..=20).contains(&exp) { return Err( mseed_error( format!("invalid record length exponent {exp}"))) }
                record_len = Some( 1usize << exp);
            }
            100 => {
                let r = hdr.f32( blockette_offset + 4)? as f64;
                if r > 0.0 { rate = r }
            }
            1001 => {
                micro_secs = hdr.u8( blockette_offset + 5)? as i8;
            }
            _ => trace!("skipping blockette {btype} of {id}")
        }
        n += 1;
        if next <= blockette_offset { break }
        blockette_offset = next;
    }

    let record_len = record_len.ok_or_else( || mseed_error( format!("record of {id} has no blockette 1000")))?;
    if record_len > buf.len() {
        return Err( mseed_error( format!("record of {id} truncated ({} of {record_len} bytes)", buf.len())))
    }
    let encoding = encoding.unwrap_or(ENC_STEIM1);

    if activity_flags & 0x02 == 0 && time_correction != 0 {
        start = start + TimeDelta::microseconds( time_correction as i64 * 100);
    }
    if micro_secs != 0 {
        start = start + TimeDelta::microseconds( micro_secs as i64);
    }

    if nsamples == 0 || encoding == ENC_ASCII || !(rate > 0.0) {
        return Ok( Record { record_len, trace: None })
    }
    if data_offset < HEADER_LEN || data_offset > record_len {
        return Err( mseed_error( format!("invalid data offset {data_offset} in record of {id}")))
    }

    let data = Reader { buf: &buf[data_offset..record_len], big_endian: data_big_endian };
    let samples = match encoding {
        ENC_INT16 => (0..nsamples).map( |i| data.i16(i*2).map( |v| v as f64)).collect::<Result<Vec<f64>>>()?,
        ENC_INT32 => (0..nsamples).map( |i| data.i32(i*4).map( |v| v as f64)).collect::<Result<Vec<f64>>>()?,
        ENC_FLOAT32 => (0..nsamples).map( |i| data.f32(i*4).map( |v| v as f64)).collect::<Result<Vec<f64>>>()?,
        ENC_FLOAT64 => (0..nsamples).map( |i| data.f64(i*8)).collect::<Result<Vec<f64>>>()?,
        ENC_STEIM1 => decode_steim1( data.buf, nsamples, data_big_endian)?,
        ENC_STEIM2 => decode_steim2( data.buf, nsamples, data_big_endian)?,
        _ => return Err( mseed_error( format!("unsupported encoding {encoding} in record of {id}")))
    };

    Ok( Record { record_len, trace: Some( Trace::new( id, start, rate, samples)) })
}

fn parse_btime (r: &Reader, off: usize)->Result<DateTime<Utc>> {
    let year = r.u16(off)? as i32;
    let doy = r.u16(off+2)? as u32;
    let hour = r.u8(off+4)? as i64;
    let minute = r.u8(off+5)? as i64;
    let second = r.u8(off+6)? as i64;
    let ticks = r.u16(off+8)? as i64;

    let date = NaiveDate::from_yo_opt( year, doy).ok_or_else( || mseed_error( format!("invalid date {year}/{doy}")))?;
    let t0 = seis_common::datetime::naive_utc_date_to_utc_datetime( date);
    Ok( t0 + TimeDelta::seconds( hour*3600 + minute*60 + second) + TimeDelta::microseconds( ticks * 100))
}

pub fn rate_from_factors (factor: i16, multiplier: i16)->f64 {
    let (f,m) = (factor as f64, multiplier as f64);
    match (factor.signum(), multiplier.signum()) {
        (1,1) => f * m,
        (1,-1) => -f / m,
        (-1,1) => -m / f,
        (-1,-1) => 1.0 / (f * m),
        _ => 0.0
    }
}

/* #endregion reader */

/* #region Steim **************************************************************************************/

fn word (frame: &[u8], idx: usize, big_endian: bool)->u32 {
    let b = [frame[idx*4], frame[idx*4+1], frame[idx*4+2], frame[idx*4+3]];
    if big_endian { u32::from_be_bytes(b) } else { u32::from_le_bytes(b) }
}

#[inline]
fn sign_extend (v: u32, bits: u32)->i32 {
    ((v << (32 - bits)) as i32) >> (32 - bits)
}

// push `count` values of `bits` width from `w`, most significant first
fn push_packed (diffs: &mut Vec<i32>, w: u32, count: u32, bits: u32) {
    let mask = (1u32 << bits) - 1;
    for i in 0..count {
        let shift = (count - 1 - i) * bits;
        diffs.push( sign_extend( (w >> shift) & mask, bits));
    }
}

/// decode Steim frames into `n` samples. `steim2` selects the Steim-2 nibble semantics
fn decode_steim (data: &[u8], n: usize, big_endian: bool, steim2: bool)->Result<Vec<f64>> {
    let nframes = data.len() / STEIM_FRAME_LEN;
    let mut diffs: Vec<i32> = Vec::with_capacity(n + 8);
    let mut x0 = 0i32;
    let mut xn = 0i32;

    for f in 0..nframes {
        if diffs.len() >= n { break }
        let frame = &data[f*STEIM_FRAME_LEN..(f+1)*STEIM_FRAME_LEN];
        let ctrl = word( frame, 0, big_endian);

        for w in 1..16 {
            let w_val = word( frame, w, big_endian);
            if f == 0 && w == 1 { x0 = w_val as i32; continue }
            if f == 0 && w == 2 { xn = w_val as i32; continue }

            let nibble = (ctrl >> (30 - 2*w)) & 0x3;
            match (nibble, steim2) {
                (0, _) => {}
                (1, _) => push_packed( &mut diffs, w_val, 4, 8),
                (2, false) => push_packed( &mut diffs, w_val, 2, 16),
                (3, false) => diffs.push( w_val as i32),
                (2, true) => match w_val >> 30 {
                    1 => push_packed( &mut diffs, w_val, 1, 30),
                    2 => push_packed( &mut diffs, w_val, 2, 15),
                    3 => push_packed( &mut diffs, w_val, 3, 10),
                    d => return Err( mseed_error( format!("invalid Steim-2 dnib {d}")))
                }
                (3, true) => match w_val >> 30 {
                    0 => push_packed( &mut diffs, w_val, 5, 6),
                    1 => push_packed( &mut diffs, w_val, 6, 5),
                    2 => push_packed( &mut diffs, w_val, 7, 4),
                    d => return Err( mseed_error( format!("invalid Steim-2 dnib {d}")))
                }
                _ => {}
            }
        }
    }

    if diffs.len() < n {
        return Err( mseed_error( format!("Steim data has {} differences, expected {n}", diffs.len())))
    }

    let mut samples: Vec<f64> = Vec::with_capacity(n);
    if n > 0 {
        let mut x = x0;
        samples.push( x as f64);
        for d in &diffs[1..n] {
            x = x.wrapping_add(*d);
            samples.push( x as f64);
        }
        if x != xn {
            warn!("Steim integration constant mismatch: last sample {x} != {xn}");
        }
    }
    Ok(samples)
}

pub fn decode_steim1 (data: &[u8], n: usize, big_endian: bool)->Result<Vec<f64>> {
    decode_steim( data, n, big_endian, false)
}

pub fn decode_steim2 (data: &[u8], n: usize, big_endian: bool)->Result<Vec<f64>> {
    decode_steim( data, n, big_endian, true)
}

/* #endregion Steim */
