use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use super::region::{ChromeHook, ChromeRegion};
use super::{Branding, BrandingContext};
use crate::error::LinkError;
use crate::settings::{SettingsResolver, BRANDING_KEYS};

/// Insert every branding element whose slot the region accepts and has not
/// filled yet. Returns how many elements were inserted.
///
/// Safe to call any number of times on the same region.
pub fn apply_branding(region: &dyn ChromeRegion, branding: &Branding) -> usize {
    let mut inserted = 0;
    for element in branding.elements() {
        let slot = element.slot();
        if !region.accepts(slot) || region.has_slot(slot) {
            continue;
        }
        region.insert(element);
        inserted += 1;
    }
    if inserted > 0 {
        debug!(region = region.name(), inserted, "Applied branding");
    }
    inserted
}

#[derive(Default)]
struct PropagatorState {
    branding: Option<Arc<Branding>>,
    waiting: Vec<Arc<dyn ChromeRegion>>,
}

/// Applies branding to chrome regions once both the region is ready and the
/// settings have arrived, whichever happens last.
///
/// Regions that become ready first are parked until settings are published.
/// Regions that render again after that are re-checked, and only missing
/// slots are filled.
#[derive(Default)]
pub struct BrandingPropagator {
    state: Mutex<PropagatorState>,
}

impl BrandingPropagator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The published branding, if settings have arrived.
    pub fn branding(&self) -> Option<Arc<Branding>> {
        self.lock().branding.clone()
    }

    /// A region finished its own initialization.
    pub fn region_ready(&self, region: Arc<dyn ChromeRegion>) -> usize {
        let branding = {
            let mut state = self.lock();
            match state.branding.clone() {
                Some(branding) => branding,
                None => {
                    if !state.waiting.iter().any(|r| Arc::ptr_eq(r, &region)) {
                        debug!(region = region.name(), "Region waiting for settings");
                        state.waiting.push(region);
                    }
                    return 0;
                }
            }
        };
        apply_branding(region.as_ref(), &branding)
    }

    /// Publish branding and apply it to every waiting region.
    ///
    /// Later publications replace the branding for future regions; slots
    /// already filled are left alone.
    pub fn publish(&self, branding: Branding) -> usize {
        let branding = Arc::new(branding);
        let waiting = {
            let mut state = self.lock();
            state.branding = Some(branding.clone());
            std::mem::take(&mut state.waiting)
        };
        waiting
            .iter()
            .map(|region| apply_branding(region.as_ref(), &branding))
            .sum()
    }

    /// Resolve the branding settings and publish the result.
    ///
    /// On failure nothing is published and waiting regions stay unbranded.
    pub async fn propagate(
        &self,
        resolver: &SettingsResolver,
        ctx: &BrandingContext,
    ) -> Result<usize, LinkError> {
        let settings = resolver.resolve(BRANDING_KEYS).await.map_err(|e| {
            warn!(error = %e, "Branding settings unavailable");
            e
        })?;
        Ok(self.publish(Branding::derive(&settings, ctx)))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PropagatorState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl ChromeHook for BrandingPropagator {
    fn on_init(&self, region: Arc<dyn ChromeRegion>) {
        self.region_ready(region);
    }

    fn on_render(&self, region: Arc<dyn ChromeRegion>) {
        self.region_ready(region);
    }
}
