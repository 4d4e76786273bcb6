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

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FdsnError>;

#[derive(Error,Debug)]
pub enum FdsnError {
    #[error("IO error {0}")]
    IOError( #[from] std::io::Error),

    #[error("StationXML error {0}")]
    XmlError(String),

    #[error("common error {0}")]
    CommonError( #[from] seis_common::SeisCommonError),

    #[error("invalid channel id {0}")]
    InvalidChannelId(String),

    #[error("miniSEED error {0}")]
    MseedError(String),

    /// a cache file exists but can't be decoded
    #[error("cache format error {0}")]
    CacheFormat(String),

    #[error("merge error {0}")]
    MergeError( #[from] MergeError),

    /// a generic error
    #[error("operation failed {0}")]
    OpFailed(String)
}

/// the reason why segments of one channel could not be merged
#[derive(Error,Debug,Clone,PartialEq)]
pub enum MergeError {
    #[error("incompatible sampling rates for {id}: {rates:?}")]
    SamplingRates { id: String, rates: Vec<f64> },
}

pub fn op_failed (msg: impl ToString)->FdsnError {
    FdsnError::OpFailed(msg.to_string())
}

pub fn mseed_error (msg: impl ToString)->FdsnError {
    FdsnError::MseedError(msg.to_string())
}

pub fn xml_error (msg: impl ToString)->FdsnError {
    FdsnError::XmlError(msg.to_string())
}

pub fn cache_format_error (msg: impl ToString)->FdsnError {
    FdsnError::CacheFormat(msg.to_string())
}
