//! Coordinate Reference System handling
//!
//! CRS values are carried from the input layer to the output sink untouched;
//! no transformation is ever performed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coordinate Reference System representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CRS {
    /// EPSG code if known
    epsg: Option<u32>,
    /// Free-form identifier (WKT, OGC URN, PROJ string...) when no EPSG code applies
    definition: Option<String>,
}

impl CRS {
    /// Create a CRS from an EPSG code
    pub fn from_epsg(code: u32) -> Self {
        Self {
            epsg: Some(code),
            definition: None,
        }
    }

    /// Create a CRS from an opaque definition string
    pub fn from_definition(definition: impl Into<String>) -> Self {
        Self {
            epsg: None,
            definition: Some(definition.into()),
        }
    }

    /// Parse an authority identifier.
    ///
    /// Recognizes `EPSG:<code>`, `urn:ogc:def:crs:EPSG::<code>` and the
    /// GeoJSON default `urn:ogc:def:crs:OGC:1.3:CRS84` (mapped to EPSG:4326).
    /// Anything else is kept verbatim as a definition.
    pub fn parse(identifier: &str) -> Self {
        let trimmed = identifier.trim();
        if trimmed.eq_ignore_ascii_case("urn:ogc:def:crs:OGC:1.3:CRS84")
            || trimmed.eq_ignore_ascii_case("CRS84")
        {
            return Self::wgs84();
        }

        let upper = trimmed.to_ascii_uppercase();
        let code = upper
            .strip_prefix("EPSG:")
            .or_else(|| upper.strip_prefix("URN:OGC:DEF:CRS:EPSG::"))
            .or_else(|| upper.strip_prefix("URN:OGC:DEF:CRS:EPSG:"))
            .and_then(|rest| rest.rsplit(':').next())
            .and_then(|code| code.parse::<u32>().ok());

        match code {
            Some(code) => Self::from_epsg(code),
            None => Self::from_definition(trimmed),
        }
    }

    /// WGS84 geographic CRS (EPSG:4326)
    pub fn wgs84() -> Self {
        Self::from_epsg(4326)
    }

    /// Get EPSG code if known
    pub fn epsg(&self) -> Option<u32> {
        self.epsg
    }

    /// Get the definition string, if this CRS was not built from an EPSG code
    pub fn definition(&self) -> Option<&str> {
        self.definition.as_deref()
    }

    /// Check if two CRS are equivalent
    pub fn is_equivalent(&self, other: &CRS) -> bool {
        if let (Some(a), Some(b)) = (self.epsg, other.epsg) {
            return a == b;
        }
        if let (Some(a), Some(b)) = (&self.definition, &other.definition) {
            return a == b;
        }
        false
    }

    /// Get a string identifier for this CRS
    pub fn identifier(&self) -> String {
        if let Some(code) = self.epsg {
            return format!("EPSG:{}", code);
        }
        match &self.definition {
            Some(def) => def.clone(),
            None => "Unknown".to_string(),
        }
    }

    /// Identifier in the form expected by the legacy GeoJSON `crs` member
    pub fn ogc_urn(&self) -> String {
        match self.epsg {
            Some(code) => format!("urn:ogc:def:crs:EPSG::{}", code),
            None => self.identifier(),
        }
    }
}

impl fmt::Display for CRS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

impl Default for CRS {
    fn default() -> Self {
        Self::wgs84()
    }
}
