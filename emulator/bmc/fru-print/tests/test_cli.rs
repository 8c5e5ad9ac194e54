// Licensed under the Apache-2.0 license

use clap::Parser;
use fru_common::xilinx::{MAC_ADDRESS_TYPE, XILINX_IANA_ID};
use fru_print::render::LookupError;
use fru_print::{run, Args};
use fru_testing_common::{record, FruImageBuilder, InfoAreaBuilder};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn eeprom_image(product: &str) -> Vec<u8> {
    let board = InfoAreaBuilder::new()
        .bytes(&[0x19, 0x01, 0x00, 0x00])
        .text("XILINX")
        .text(product)
        .text("XFL1QX3TXDN0")
        .build()
        .unwrap();

    let mut mac = XILINX_IANA_ID.to_vec();
    mac.push(0x31);
    mac.extend([0x00, 0x0A, 0x35, 0x12, 0x34, 0x56]);
    let mut dc_load = vec![0x00, 0x04, 0xB0, 0x00, 0x00];
    dc_load.resize(13, 0x00);

    FruImageBuilder::new()
        .board(board)
        .record(record(MAC_ADDRESS_TYPE, false, &mac))
        .record(record(0x02, true, &dc_load))
        .build()
        .unwrap()
}

/// Lays out a fake sysfs i2c tree with a SOM EEPROM at 0x50 and a carrier
/// card EEPROM at 0x51.
fn sysfs() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (device, product) in [("1-0050", "SMK-K26-XCL2G"), ("1-0051", "SCK-KV-G")] {
        let path = dir.path().join(device);
        fs::create_dir(&path).unwrap();
        fs::write(path.join("eeprom"), eeprom_image(product)).unwrap();
    }
    dir
}

fn paths(dir: &Path) -> (PathBuf, PathBuf) {
    (dir.join("*50/eeprom"), dir.join("*51/eeprom"))
}

fn args(dir: &Path, extra: &[&str]) -> Args {
    let (som, cc) = paths(dir);
    let mut argv = vec![
        "fru-print".to_string(),
        "-s".to_string(),
        som.display().to_string(),
        "-c".to_string(),
        cc.display().to_string(),
    ];
    argv.extend(extra.iter().map(|s| s.to_string()));
    Args::parse_from(argv)
}

#[test]
fn test_print_both_boards() {
    let dir = sysfs();
    let output = run(&args(dir.path(), &[])).unwrap();
    let json: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(json["som"]["board"]["product"], "SMK-K26-XCL2G");
    assert_eq!(json["cc"]["board"]["product"], "SCK-KV-G");
    assert_eq!(json["som"]["board"]["date"], 1);
    assert_eq!(json["som"]["multirecord"]["MAC_Addr"]["MAC_ID_0"], "000a35123456");
}

#[test]
fn test_print_one_board_as_toml() {
    let dir = sysfs();
    let output = run(&args(dir.path(), &["-b", "cc", "--format", "toml"])).unwrap();
    let value: toml::Value = toml::from_str(&output).unwrap();
    assert_eq!(value["board"]["product"].as_str(), Some("SCK-KV-G"));
    assert_eq!(value["common"]["version"].as_integer(), Some(1));
}

#[test]
fn test_single_field_from_board_area() {
    let dir = sysfs();
    let output = run(&args(dir.path(), &["-b", "som", "-f", "serial"])).unwrap();
    assert_eq!(output, "XFL1QX3TXDN0\n");
}

#[test]
fn test_field_path() {
    let dir = sysfs();
    let output = run(&args(
        dir.path(),
        &["-b", "som", "-f", "multirecord", "DC_Load_Record", "nominal_voltage"],
    ))
    .unwrap();
    assert_eq!(output, "04b0\n");
}

#[test]
fn test_standard_profile_drops_oem_records() {
    let dir = sysfs();
    let err = run(&args(
        dir.path(),
        &["-b", "som", "--profile", "standard", "-f", "multirecord", "MAC_Addr"],
    ))
    .unwrap_err();
    assert!(err.downcast_ref::<LookupError>().is_some());
}

#[test]
fn test_unknown_field() {
    let dir = sysfs();
    let err = run(&args(dir.path(), &["-b", "som", "-f", "nope"])).unwrap_err();
    assert_eq!(
        err.downcast_ref::<LookupError>(),
        Some(&LookupError::UnknownField {
            keys: vec!["nope".to_string()]
        })
    );
}

#[test]
fn test_missing_eeprom() {
    let dir = tempfile::tempdir().unwrap();
    let err = run(&args(dir.path(), &["-b", "som"])).unwrap_err();
    assert!(err.to_string().starts_with("sompath is incorrect"));
}

#[test]
fn test_corrupt_eeprom() {
    let dir = sysfs();
    let path = dir.path().join("1-0051/eeprom");
    let mut image = fs::read(&path).unwrap();
    image[10] ^= 0x01;
    fs::write(&path, image).unwrap();

    let err = run(&args(dir.path(), &["-b", "cc"])).unwrap_err();
    let fru = err.downcast_ref::<fru_common::FruError>().unwrap();
    assert!(fru.is_checksum());
    assert_eq!(fru.area(), fru_common::Area::Board);
}
