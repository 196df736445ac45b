//! Chrome regions: host UI surfaces that receive branding.

use std::sync::{Arc, Mutex};

use super::{BrandingElement, BrandingSlot};

/// A UI surface (header, footer, ...) that initializes on its own schedule.
///
/// Implementations own their interior mutability; the propagator only calls
/// `&self` methods.
pub trait ChromeRegion: Send + Sync {
    fn name(&self) -> &str;

    /// Whether this region has a place for `slot` at all.
    fn accepts(&self, _slot: BrandingSlot) -> bool {
        true
    }

    /// Whether the insertion point for `slot` is already filled.
    fn has_slot(&self, slot: BrandingSlot) -> bool;

    fn insert(&self, element: BrandingElement);
}

/// Extension points a region calls around its own lifecycle.
pub trait ChromeHook: Send + Sync {
    /// After the region finished its own initialization.
    fn on_init(&self, region: Arc<dyn ChromeRegion>);

    /// After each render of the region, which may happen many times.
    fn on_render(&self, region: Arc<dyn ChromeRegion>);
}

/// A region kept in memory. Useful for headless hosts and tests.
#[derive(Debug)]
pub struct MemoryRegion {
    name: String,
    slots: Vec<BrandingSlot>,
    elements: Mutex<Vec<BrandingElement>>,
}

impl MemoryRegion {
    /// A region accepting only `slots`.
    pub fn new(name: impl Into<String>, slots: &[BrandingSlot]) -> Self {
        Self {
            name: name.into(),
            slots: slots.to_vec(),
            elements: Mutex::new(Vec::new()),
        }
    }

    /// Header layout: logo, dashboard link and banner color.
    pub fn header() -> Self {
        Self::new(
            "header",
            &[
                BrandingSlot::Logo,
                BrandingSlot::DashboardLink,
                BrandingSlot::BannerColor,
            ],
        )
    }

    /// Footer layout: about/contact/bug links.
    pub fn footer() -> Self {
        Self::new("footer", &[BrandingSlot::FooterLinks])
    }

    pub fn elements(&self) -> Vec<BrandingElement> {
        self.elements
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    /// Drop all inserted elements, as a full rebuild of the region would.
    pub fn clear(&self) {
        self.elements
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clear();
    }
}

impl ChromeRegion for MemoryRegion {
    fn name(&self) -> &str {
        &self.name
    }

    fn accepts(&self, slot: BrandingSlot) -> bool {
        self.slots.contains(&slot)
    }

    fn has_slot(&self, slot: BrandingSlot) -> bool {
        self.elements
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .iter()
            .any(|e| e.slot() == slot)
    }

    fn insert(&self, element: BrandingElement) {
        self.elements
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(element);
    }
}
