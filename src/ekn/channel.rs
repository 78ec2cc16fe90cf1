use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub const UNKNOWN: &str = "Unknown";

/// Channel name -> (unit, description), taken from the myGEKKO manual
const BUILTIN: [(&str, &str, &str); 20] = [
    ("All.Aussen", "°C", "Wetterstation.Außentemperatur"),
    ("All.Wind", "m/s", "Wetterstation.Wind"),
    ("All.Regen", "l/h", "Wetterstation.Regen"),
    ("All.Lux", "kLux", "Wetterstation.Helligkeit"),
    ("All.LuxO", "kLux", "Wetterstation.Helligkeit OSt"),
    ("All.LuxW", "kLux", "Wetterstation.Helligkeit West"),
    ("Moon.Azimut", "°", "Mondstand.Richtung"),
    ("Moon.Elevation", "°", "Mondstand.Höhhe"),
    ("Sun.Azimut", "°", "Sonnenstand.Richtung"),
    ("Sun.Elevation", "°", "Sonnenstand.Höhe"),
    ("Energy.", "Lt.", "Einstellung Aktuelle Leistung der Energiezähler"),
    ("ER", "°C", "Einzelraumregelung.Ist-Temperatur"),
    ("ER_V", "°C", "Einzelraumregelung.Ventilstellung"),
    ("ER_S", "°C", "Einzelraumregelung.Soll-Temperatur"),
    ("MK", "°C", "Mischkreis.Ist-Temperatur"),
    ("MK_V", "°C", "Mischkreis.Ventilstellung"),
    ("MK_S", "°C", "Mischkreis.Soll-Temperatur"),
    ("WW_B", "°C", "Puffer&Boiler."),
    ("WW_R", "°C", "Puffer&Boiler."),
    ("WW_S", "°C", "Puffer&Boiler."),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub unit: String,
    pub description: String,
}

impl Channel {
    pub fn new(unit: &str, description: &str) -> Self {
        Self {
            unit: unit.to_string(),
            description: description.to_string(),
        }
    }

    pub fn unknown() -> Self {
        Self::new(UNKNOWN, UNKNOWN)
    }

    pub fn is_unknown(&self) -> bool {
        self.unit == UNKNOWN && self.description == UNKNOWN
    }
}

/// A channel definition supplied through configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub name: String,
    pub unit: String,
    pub description: String,
}

/// Resolves a base name to its channel. Configured channels shadow the
/// builtin table.
#[derive(Debug, Clone, Default)]
pub struct ChannelTable {
    extra: HashMap<String, Channel>,
}

impl ChannelTable {
    pub fn builtin() -> Self {
        Self::default()
    }

    pub fn with_extra(extra: &[ChannelConfig]) -> Self {
        Self {
            extra: extra
                .iter()
                .map(|c| (c.name.clone(), Channel::new(&c.unit, &c.description)))
                .collect(),
        }
    }

    /// Never fails, an unmatched name gives [`Channel::unknown`]
    pub fn resolve(&self, base_name: &str) -> Channel {
        if let Some(channel) = self.extra.get(base_name) {
            return channel.clone();
        }

        BUILTIN
            .iter()
            .find(|(key, _, _)| *key == base_name)
            .map(|(_, unit, description)| Channel::new(unit, description))
            .unwrap_or_else(Channel::unknown)
    }
}
