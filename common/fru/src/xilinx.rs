// Licensed under the Apache-2.0 license

//! OEM multirecords found on Xilinx/AMD SOM and carrier card EEPROMs.

use crate::field::{Schema, ENCODING_HEX, ENCODING_TEXT};
use crate::record::RecordTemplate;
use crate::registry::TemplateRegistry;

pub const THERMAL_TYPE: u8 = 0xD0;
pub const POWER_TYPE: u8 = 0xD1;
pub const MAC_ADDRESS_TYPE: u8 = 0xD2;
pub const MEMORY_CONFIG_TYPE: u8 = 0xD3;

/// Xilinx IANA enterprise number (10995) as stored in OEM records.
pub const XILINX_IANA_ID: [u8; 3] = [0xF3, 0x2A, 0x00];

fn oem_header() -> Schema {
    Schema::closed()
        .fixed("Xilinx_IANA_ID", 3, ENCODING_HEX)
        .fixed("Version", 1, ENCODING_HEX)
}

pub fn thermal() -> RecordTemplate {
    RecordTemplate::new("Thermal", THERMAL_TYPE, oem_header())
}

pub fn power() -> RecordTemplate {
    RecordTemplate::new("Power", POWER_TYPE, oem_header())
}

pub fn mac_address() -> RecordTemplate {
    RecordTemplate::new(
        "MAC_Addr",
        MAC_ADDRESS_TYPE,
        oem_header().fixed("MAC_ID_0", 6, ENCODING_HEX),
    )
}

/// Boot device and memory description strings, each preceded by an 8-byte
/// label and followed by a separator byte.
pub fn memory_config() -> RecordTemplate {
    RecordTemplate::new(
        "SoM_Memory_Config",
        MEMORY_CONFIG_TYPE,
        Schema::closed()
            .fixed("Xilinx_IANA_ID", 3, ENCODING_HEX)
            .padding(8, ENCODING_HEX)
            .fixed("Primary_boot_device", 12, ENCODING_TEXT)
            .padding(1, ENCODING_HEX)
            .padding(8, ENCODING_HEX)
            .fixed("SOM_secondary_boot_device", 12, ENCODING_TEXT)
            .padding(1, 8)
            .padding(8, 8)
            .fixed("SOM_PS_DDR_memory", 12, ENCODING_TEXT)
            .padding(1, ENCODING_HEX)
            .padding(8, ENCODING_HEX)
            .fixed("SOM_PL_DDR_memory", 12, ENCODING_TEXT)
            .padding(1, ENCODING_HEX),
    )
}

/// Adds the Xilinx OEM templates to `registry`.
pub fn register(registry: &mut TemplateRegistry) -> &mut TemplateRegistry {
    registry
        .register(thermal())
        .register(power())
        .register(mac_address())
        .register(memory_config())
}

/// The standard templates followed by the Xilinx OEM templates.
pub fn registry() -> TemplateRegistry {
    let mut registry = TemplateRegistry::standard();
    register(&mut registry);
    registry
}

/// Formats a 12-digit hex MAC (as decoded from `MAC_ID_0`) with colons.
pub fn format_mac(hex: &str) -> Option<String> {
    if hex.len() != 12 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let octets: Vec<&str> = (0..6).map(|i| &hex[i * 2..i * 2 + 2]).collect();
    Some(octets.join(":"))
}
