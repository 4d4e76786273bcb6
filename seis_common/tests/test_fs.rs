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
#![allow(unused)]

use std::time::Duration;
use serde::Deserialize;
use seis_common::fs::{ensure_dir, filepath_contents, remove_old_files, write_file_atomic};
use seis_common::config::load_config_path;

// run with "cargo test test_xx -- --nocapture"

#[test]
fn test_ensure_dir () {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("a").join("b");

    assert!( ensure_dir(&dir).is_ok());
    assert!( dir.is_dir());
    assert!( ensure_dir(&dir).is_ok()); // no-op the second time

    let file = tmp.path().join("not_a_dir");
    std::fs::write(&file, b"x").unwrap();
    assert!( ensure_dir(&file).is_err());
}

#[test]
fn test_atomic_write () {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("sub").join("data.bin");

    write_file_atomic( &path, b"first").unwrap();
    write_file_atomic( &path, b"second").unwrap();
    assert_eq!( filepath_contents(&path).unwrap(), b"second".to_vec());

    // no temp files left behind
    let n = std::fs::read_dir( path.parent().unwrap()).unwrap().count();
    assert_eq!( n, 1);
}

#[test]
fn test_remove_old_files () {
    let tmp = tempfile::tempdir().unwrap();
    write_file_atomic( tmp.path().join("f1"), b"1").unwrap();
    write_file_atomic( tmp.path().join("f2"), b"2").unwrap();

    assert_eq!( remove_old_files( &tmp.path(), Duration::from_secs(3600)).unwrap(), 0);

    std::thread::sleep( Duration::from_millis(20));
    assert_eq!( remove_old_files( &tmp.path(), Duration::from_millis(1)).unwrap(), 2);
}

#[derive(Deserialize,Debug)]
struct TestConfig {
    name: String,
    #[serde(deserialize_with="seis_common::datetime::deserialize_optional_duration", default)]
    max_age: Option<Duration>,
}

#[test]
fn test_load_config () {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("test.ron");
    std::fs::write( &path, r#"( name: "test", max_age: "2h" )"#).unwrap();

    let conf: TestConfig = load_config_path(&path).unwrap();
    println!("{conf:?}");
    assert_eq!( conf.name, "test");
    assert_eq!( conf.max_age, Some( Duration::from_secs(7200)));
}
