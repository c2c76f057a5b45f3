//! Marker icon lookup by location category.

use std::collections::HashMap;

use serde::Serialize;

use crate::location::{KIND_BUILDING_CONTROL, KIND_RISK_ZONE, KIND_ZONING_PLAN};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerIcon {
    pub glyph: String,
    /// CSS hex color, e.g. `#3B82F6`.
    pub color: String,
}

impl MarkerIcon {
    #[must_use]
    pub fn new(glyph: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            glyph: glyph.into(),
            color: color.into(),
        }
    }
}

/// Category-to-icon table with a fallback for unknown categories.
///
/// Built once at startup and passed to whatever renders markers.
#[derive(Debug, Clone)]
pub struct IconRegistry {
    by_kind: HashMap<String, MarkerIcon>,
    fallback: MarkerIcon,
}

impl Default for IconRegistry {
    fn default() -> Self {
        Self::new(MarkerIcon::new("📍", "#6B7280"))
            .with(KIND_BUILDING_CONTROL, MarkerIcon::new("🏗️", "#3B82F6"))
            .with(KIND_RISK_ZONE, MarkerIcon::new("⚠️", "#EF4444"))
            .with(KIND_ZONING_PLAN, MarkerIcon::new("🏛️", "#10B981"))
    }
}

impl IconRegistry {
    /// Empty registry; every lookup returns `fallback`.
    #[must_use]
    pub fn new(fallback: MarkerIcon) -> Self {
        Self {
            by_kind: HashMap::new(),
            fallback,
        }
    }

    #[must_use]
    pub fn with(mut self, kind: impl Into<String>, icon: MarkerIcon) -> Self {
        self.by_kind.insert(kind.into(), icon);
        self
    }

    #[must_use]
    pub fn icon_for(&self, kind: &str) -> &MarkerIcon {
        self.by_kind.get(kind).unwrap_or(&self.fallback)
    }
}
