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

//! the StationXML subset that maps to [`Inventory`]: networks, stations and channel epochs with coordinates,
//! sample rate and overall instrument sensitivity. Everything else in a StationXML document (stages, comments,
//! equipment, unit attributes) is ignored on input.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize,Deserialize};

use seis_common::datetime::parse_utc_datetime;

use crate::errors::{xml_error, Result};
use crate::inventory::{Channel, InstrumentResponse, Inventory, Network, Station};

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
const XMLNS: &str = "http://www.fdsn.org/xml/station/1";
const SCHEMA_VERSION: &str = "1.2";

/* #region document structure *************************************************************************/

#[derive(Serialize,Deserialize)]
#[serde(rename="FDSNStationXML")]
struct XmlDocument {
    #[serde(rename="@xmlns", default)]
    xmlns: String,
    #[serde(rename="@schemaVersion", default)]
    schema_version: String,
    #[serde(rename="Source", default)]
    source: String,
    #[serde(rename="Created", skip_serializing_if="seis_common::is_none", default)]
    created: Option<String>,
    #[serde(rename="Network", default)]
    networks: Vec<XmlNetwork>,
}

#[derive(Serialize,Deserialize)]
struct XmlNetwork {
    #[serde(rename="@code")]
    code: String,
    #[serde(rename="Description", skip_serializing_if="seis_common::is_none", default)]
    description: Option<String>,
    #[serde(rename="Station", default)]
    stations: Vec<XmlStation>,
}

#[derive(Serialize,Deserialize)]
struct XmlStation {
    #[serde(rename="@code")]
    code: String,
    #[serde(rename="Latitude")]
    latitude: XmlFloat,
    #[serde(rename="Longitude")]
    longitude: XmlFloat,
    #[serde(rename="Elevation")]
    elevation: XmlFloat,
    #[serde(rename="Site", skip_serializing_if="seis_common::is_none", default)]
    site: Option<XmlSite>,
    #[serde(rename="Channel", default)]
    channels: Vec<XmlChannel>,
}

#[derive(Serialize,Deserialize)]
struct XmlSite {
    #[serde(rename="Name")]
    name: String,
}

#[derive(Serialize,Deserialize)]
struct XmlChannel {
    #[serde(rename="@code")]
    code: String,
    #[serde(rename="@locationCode", default)]
    location: String,
    #[serde(rename="@startDate", skip_serializing_if="seis_common::is_none", default)]
    start_date: Option<String>,
    #[serde(rename="@endDate", skip_serializing_if="seis_common::is_none", default)]
    end_date: Option<String>,
    #[serde(rename="Latitude")]
    latitude: XmlFloat,
    #[serde(rename="Longitude")]
    longitude: XmlFloat,
    #[serde(rename="Elevation")]
    elevation: XmlFloat,
    #[serde(rename="Depth", skip_serializing_if="seis_common::is_none", default)]
    depth: Option<XmlFloat>,
    #[serde(rename="SampleRate", skip_serializing_if="seis_common::is_none", default)]
    sample_rate: Option<XmlFloat>,
    #[serde(rename="Response", skip_serializing_if="seis_common::is_none", default)]
    response: Option<XmlResponse>,
}

#[derive(Serialize,Deserialize)]
struct XmlResponse {
    #[serde(rename="InstrumentSensitivity", skip_serializing_if="seis_common::is_none", default)]
    sensitivity: Option<XmlSensitivity>,
}

#[derive(Serialize,Deserialize)]
struct XmlSensitivity {
    #[serde(rename="Value")]
    value: f64,
    #[serde(rename="Frequency")]
    frequency: f64,
    #[serde(rename="InputUnits")]
    input_units: XmlUnits,
    #[serde(rename="OutputUnits")]
    output_units: XmlUnits,
}

#[derive(Serialize,Deserialize)]
struct XmlUnits {
    #[serde(rename="Name")]
    name: String,
}

/// numeric elements that can carry unit/error attributes
#[derive(Serialize,Deserialize)]
struct XmlFloat {
    #[serde(rename="$text")]
    value: f64,
}

impl From<f64> for XmlFloat {
    fn from (value: f64)->Self { XmlFloat { value } }
}

/* #endregion document structure */

/* #region conversion *********************************************************************************/

/// the StationXML document for `inv`, including the xml declaration
pub fn to_stationxml (inv: &Inventory)->Result<String> {
    let doc = XmlDocument {
        xmlns: XMLNS.to_string(),
        schema_version: SCHEMA_VERSION.to_string(),
        source: inv.source.clone().unwrap_or_default(),
        created: inv.created.as_ref().map( format_date),
        networks: inv.networks.iter().map( xml_network).collect(),
    };

    let mut xml = String::from( XML_DECL);
    xml.push('\n');
    let mut ser = quick_xml::se::Serializer::new( &mut xml);
    ser.indent( ' ', 2);
    doc.serialize( ser).map_err( xml_error)?;
    Ok(xml)
}

/// parse a StationXML document
pub fn from_stationxml (xml: &str)->Result<Inventory> {
    let doc: XmlDocument = quick_xml::de::from_str( xml).map_err( xml_error)?;

    Ok( Inventory {
        source: Some(doc.source).filter( |s| !s.is_empty()),
        created: parse_optional_date( doc.created.as_deref())?,
        networks: doc.networks.into_iter().map( network).collect::<Result<Vec<Network>>>()?,
    })
}

fn format_date (date: &DateTime<Utc>)->String {
    date.to_rfc3339_opts( SecondsFormat::AutoSi, true)
}

// StationXML dates often come without time zone designator, which means UTC
fn parse_optional_date (s: Option<&str>)->Result<Option<DateTime<Utc>>> {
    match s {
        Some(s) => parse_utc_datetime( s.trim()).map( Some).ok_or_else( || xml_error( format!("invalid date '{s}'"))),
        None => Ok(None)
    }
}

fn xml_network (net: &Network)->XmlNetwork {
    XmlNetwork {
        code: net.code.clone(),
        description: net.description.clone(),
        stations: net.stations.iter().map( |sta| XmlStation {
            code: sta.code.clone(),
            latitude: sta.latitude.into(),
            longitude: sta.longitude.into(),
            elevation: sta.elevation.into(),
            site: sta.site_name.as_ref().map( |name| XmlSite { name: name.clone() }),
            channels: sta.channels.iter().map( xml_channel).collect(),
        }).collect(),
    }
}

fn xml_channel (cha: &Channel)->XmlChannel {
    XmlChannel {
        code: cha.code.clone(),
        location: cha.location.clone(),
        start_date: cha.start_date.as_ref().map( format_date),
        end_date: cha.end_date.as_ref().map( format_date),
        latitude: cha.latitude.into(),
        longitude: cha.longitude.into(),
        elevation: cha.elevation.into(),
        depth: Some( cha.depth.into()),
        sample_rate: cha.sample_rate.map( XmlFloat::from),
        response: cha.response.as_ref().map( |r| XmlResponse {
            sensitivity: Some( XmlSensitivity {
                value: r.sensitivity,
                frequency: r.frequency,
                input_units: XmlUnits { name: r.input_units.clone() },
                output_units: XmlUnits { name: r.output_units.clone() },
            })
        }),
    }
}

fn network (net: XmlNetwork)->Result<Network> {
    let mut stations = Vec::with_capacity( net.stations.len());
    for sta in net.stations {
        stations.push( Station {
            code: sta.code,
            latitude: sta.latitude.value,
            longitude: sta.longitude.value,
            elevation: sta.elevation.value,
            site_name: sta.site.map( |s| s.name).filter( |s| !s.is_empty()),
            channels: sta.channels.into_iter().map( channel).collect::<Result<Vec<Channel>>>()?,
        });
    }
    Ok( Network { code: net.code, description: net.description, stations })
}

fn channel (cha: XmlChannel)->Result<Channel> {
    Ok( Channel {
        code: cha.code,
        location: cha.location.trim().to_string(),
        latitude: cha.latitude.value,
        longitude: cha.longitude.value,
        elevation: cha.elevation.value,
        depth: cha.depth.map_or( 0.0, |d| d.value),
        sample_rate: cha.sample_rate.map( |r| r.value),
        start_date: parse_optional_date( cha.start_date.as_deref())?,
        end_date: parse_optional_date( cha.end_date.as_deref())?,
        response: cha.response.and_then( |r| r.sensitivity).map( |s| InstrumentResponse {
            sensitivity: s.value,
            frequency: s.frequency,
            input_units: s.input_units.name,
            output_units: s.output_units.name,
        }),
    })
}

/* #endregion conversion */
