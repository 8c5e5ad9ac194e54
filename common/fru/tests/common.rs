// Licensed under the Apache-2.0 license
#![allow(dead_code)]

use fru_common::xilinx;
use fru_testing_common::{record, FruImageBuilder, InfoAreaBuilder};
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::ops::Range;

pub const INTERNAL_DATA: [u8; 4] = [0x01, 0x02, 0x03, 0x04];
pub const BOARD_DATE: [u8; 3] = [0x40, 0x5D, 0xC6];
pub const PCIE_INFO: [u8; 8] = [0x10, 0xEE, 0x12, 0x34, 0x10, 0xEE, 0x00, 0x07];
pub const MAC: [u8; 6] = [0x00, 0x0A, 0x35, 0x12, 0x34, 0x56];

/// A SOM style image together with the byte ranges protected by checksums.
pub struct Fixture {
    pub image: Vec<u8>,
    pub checked: Vec<Range<usize>>,
}

pub fn init_logger() {
    let _ = SimpleLogger::new().with_level(LevelFilter::Debug).init();
}

pub fn chassis_area() -> Vec<u8> {
    InfoAreaBuilder::new()
        .bytes(&[0x17])
        .text("CHS-1234")
        .text("SN-0042")
        .build()
        .unwrap()
}

pub fn board_area() -> Vec<u8> {
    InfoAreaBuilder::new()
        .bytes(&[0x19])
        .bytes(&BOARD_DATE)
        .text("XILINX")
        .text("SMK-K26-XCL2G")
        .text("XFL1QX3TXDN0")
        .text("5057-04")
        .hex(&[0x01])
        .text("1.0")
        .hex(&PCIE_INFO)
        .hex(&[0xA5; 16])
        .build()
        .unwrap()
}

pub fn product_area() -> Vec<u8> {
    InfoAreaBuilder::new()
        .bytes(&[0x19, 0x00, 0x00, 0x00])
        .text("XILINX")
        .text("SM-K26")
        .text("5057-04")
        .text("2.0")
        .text("XFL1QX3TXDN0")
        .text("AT-77")
        .hex(&[0x02])
        .text("CUSTOM")
        .text("LOT-0001-A")
        .build()
        .unwrap()
}

pub fn records() -> Vec<Vec<u8>> {
    let mut dc_output = vec![0x01, 0xB0, 0x04];
    dc_output.resize(13, 0x00);

    let mut mac = xilinx::XILINX_IANA_ID.to_vec();
    mac.push(0x31);
    mac.extend(MAC);

    let mut memory = xilinx::XILINX_IANA_ID.to_vec();
    for (tag, value) in [
        ("PrimBoot", "QSPI:0"),
        ("SecBoot", "EMMC"),
        ("PS DDR", "PS_DDR4 4GB"),
        ("PL DDR", "PL_DDR4 512MB"),
    ] {
        memory.extend(padded(tag, 8));
        memory.extend(padded(value, 12));
        memory.push(0x00);
    }

    vec![
        record(0x01, false, &dc_output),
        record(xilinx::MAC_ADDRESS_TYPE, false, &mac),
        record(xilinx::MEMORY_CONFIG_TYPE, false, &memory),
        record(0x02, true, &[0x02; 13]),
    ]
}

pub fn som_fixture() -> Fixture {
    let areas = [
        padded_len(1 + INTERNAL_DATA.len()),
        chassis_area().len(),
        board_area().len(),
        product_area().len(),
    ];
    let mut builder = FruImageBuilder::new()
        .internal_use(&INTERNAL_DATA)
        .chassis(chassis_area())
        .board(board_area())
        .product(product_area());
    for r in records() {
        builder = builder.record(r);
    }
    let image = builder.build().unwrap();

    let mut checked = vec![0..8];
    let mut offset = 8 + areas[0];
    for len in &areas[1..] {
        checked.push(offset..offset + len);
        offset += len;
    }
    for r in records() {
        checked.push(offset..offset + r.len());
        offset += r.len();
    }
    assert_eq!(offset, image.len());

    Fixture {
        image,
        checked,
    }
}

pub fn som_image() -> Vec<u8> {
    som_fixture().image
}

fn padded(text: &str, width: usize) -> Vec<u8> {
    let mut bytes = text.as_bytes().to_vec();
    bytes.resize(width, 0);
    bytes
}

fn padded_len(len: usize) -> usize {
    len.div_ceil(8) * 8
}
