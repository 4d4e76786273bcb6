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

//! RON based configuration lookup. Config files are searched in this order:
//!   1. `$SEIS_HOME/configs/<crate>/<filename>`
//!   2. `~/.seis/configs/<crate>/<filename>`
//!   3. `<filename>` itself (relative to the working dir or absolute)
//!
//! Crates that own configs expand [`define_load_config`] at their top level to get a `load_config(filename)`
//! function that uses their own crate name for the lookup.

use std::{env, path::{Path,PathBuf}};
use serde::de::DeserializeOwned;

use crate::errors::{Result,SeisCommonError};
use crate::fs::filepath_contents;

pub const CONFIGS: &str = "configs";

pub fn find_config_file (resource_crate: &str, filename: &str)->Option<PathBuf> {
    if let Ok(seis_home) = env::var("SEIS_HOME") {
        let path = Path::new(&seis_home).join(CONFIGS).join(resource_crate).join(filename);
        if path.is_file() { return Some(path) }
    }

    if let Ok(usr_home) = env::var("HOME") {
        let path = Path::new(&usr_home).join(".seis").join(CONFIGS).join(resource_crate).join(filename);
        if path.is_file() { return Some(path) }
    }

    let path = Path::new(filename);
    if path.is_file() { Some(path.to_path_buf()) } else { None }
}

/// load a config from a known path
pub fn load_config_path<C,P> (path: P)->Result<C> where C: DeserializeOwned, P: AsRef<Path> {
    let data = filepath_contents( &path.as_ref())?;
    Ok( ron::de::from_bytes( data.as_slice())? )
}

/// load config for given resource crate using the lookup order of this module
pub fn load_crate_config<C> (resource_crate: &str, filename: &str)->Result<C> where C: DeserializeOwned {
    match find_config_file( resource_crate, filename) {
        Some(path) => load_config_path( path),
        None => Err( SeisCommonError::ConfigNotFoundError( filename.to_string()))
    }
}

/// this macro needs to be expanded at the top of crates (lib.rs) that define configs.
/// Config users call the defined `load_config(..)` function to instantiate config structs
#[macro_export]
macro_rules! define_load_config {
    () => {
        /// load a RON config for this crate (see seis_common::config for lookup order)
        pub fn load_config<C> (filename: &str)->seis_common::Result<C> where C: serde::de::DeserializeOwned {
            seis_common::config::load_crate_config( env!("CARGO_PKG_NAME"), filename)
        }
    }
}
