// SPDX-FileCopyrightText: The djio authors
// SPDX-License-Identifier: MPL-2.0

use std::borrow::Cow;

pub mod mixtrack_platinum_fx;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    pub vendor_name: Cow<'static, str>,
    pub product_name: Cow<'static, str>,
}

impl DeviceDescriptor {
    /// Vendor and product name.
    #[must_use]
    pub fn name(&self) -> String {
        let Self {
            vendor_name,
            product_name,
        } = self;
        format!("{vendor_name} {product_name}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiDeviceDescriptor {
    pub device: DeviceDescriptor,
    /// Common prefix of the input and output port names.
    pub port_name_prefix: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerDescriptor {
    /// Number of physical decks
    pub num_decks: u8,

    /// Number of virtual decks
    ///
    /// Includes the physical decks.
    pub num_virtual_decks: u8,

    /// Number of pads per deck
    pub num_pads_per_deck: u8,

    /// Number of effect units
    pub num_effect_units: u8,
}
