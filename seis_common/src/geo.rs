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

use std::fmt;
use serde::{Serialize,Deserialize};
use geo::{Distance, Point};
use geo::algorithm::line_measures::metric_spaces::Haversine;

/// a geodetic position in decimal degrees
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct GeoPos {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPos {
    pub fn new (lat: f64, lon: f64)->Self { GeoPos{lat,lon} }

    // note that geo uses x=lon, y=lat
    pub fn point (&self)->Point { Point::new( self.lon, self.lat) }

    /// great circle distance in meters
    pub fn distance_to (&self, other: &GeoPos)->f64 {
        Haversine.distance( self.point(), other.point())
    }
}

impl fmt::Display for GeoPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.4},{:.4}]", self.lat, self.lon)
    }
}

/// geodetic position plus elevation in meters
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct GeoPos3 {
    pub lat: f64,
    pub lon: f64,
    pub elevation: f64,
}

impl GeoPos3 {
    pub fn new (lat: f64, lon: f64, elevation: f64)->Self { GeoPos3{lat,lon,elevation} }

    pub fn pos (&self)->GeoPos { GeoPos{ lat: self.lat, lon: self.lon } }
}
