/// PortalWorld: registry of linked portals and their travellers.
///
/// Owns every portal (SlotMap, stable keys) and every traveller, renders the
/// portal views each frame through a `Renderer` and relocates travellers that
/// cross a portal plane.
///
/// Link changes invalidate the world; `validate()` must succeed before the
/// next `render_frame`, `render_portal` or `update_travellers` call.

use std::sync::Arc;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::camera::{Camera, RenderView, compute_oblique_projection, is_visible};
use crate::config::{PortalConfig, RenderOrder};
use crate::error::{Error, Result};
use crate::math::{Pose, extract_pose, relocate};
use crate::renderer::Renderer;
use crate::{engine_config_err, engine_debug, engine_error, engine_info, engine_trace, engine_warn};
use super::crossing::TeleportEvent;
use super::portal::{Portal, PortalKey};
use super::surface::{self, DisplaySurface, MAIN_TEXTURE};
use super::traveller::{PortalEndpoint, Traveller, TravellerKey};

const SOURCE: &str = "portal3d::PortalWorld";

/// What `render_portal` did for one portal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// View rendered into the portal's texture
    Rendered,
    /// Linked surface not visible from the viewer: nothing allocated or drawn
    Culled,
    /// Texture allocation or rendering failed; the previous image stays on screen
    Skipped,
}

/// Per-frame counters returned by `render_frame`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub rendered: u32,
    pub culled: u32,
    pub skipped: u32,
    pub passes: u32,
}

impl FrameStats {
    fn record(&mut self, outcome: RenderOutcome) {
        match outcome {
            RenderOutcome::Rendered => self.rendered += 1,
            RenderOutcome::Culled => self.culled += 1,
            RenderOutcome::Skipped => self.skipped += 1,
        }
    }
}

fn portal_not_found(key: PortalKey) -> Error {
    let message = format!("Portal {:?} does not exist", key);
    engine_error!(SOURCE, "{}", message);
    Error::InvalidResource(message)
}

fn traveller_not_found(key: TravellerKey) -> Error {
    let message = format!("Traveller {:?} does not exist", key);
    engine_error!(SOURCE, "{}", message);
    Error::InvalidResource(message)
}

pub struct PortalWorld {
    config: PortalConfig,
    portals: SlotMap<PortalKey, Portal>,
    /// Registration order
    order: Vec<PortalKey>,
    names: FxHashMap<String, PortalKey>,
    travellers: SlotMap<TravellerKey, Box<dyn Traveller>>,
    /// Portal currently tracking each traveller (at most one)
    tracking: FxHashMap<TravellerKey, PortalKey>,
    validated: bool,
}

impl PortalWorld {
    /// Create an empty world. Fails if `config` is invalid.
    pub fn new(config: PortalConfig) -> Result<Self> {
        config.validate()?;
        engine_info!(SOURCE, "Portal world created (render order {:?}, {} pass(es) per frame)",
            config.render_order, config.passes_per_frame());

        Ok(Self {
            config,
            portals: SlotMap::with_key(),
            order: Vec::new(),
            names: FxHashMap::default(),
            travellers: SlotMap::with_key(),
            tracking: FxHashMap::default(),
            validated: false,
        })
    }

    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: PortalConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    // ===== PORTALS =====

    /// Register a portal. Names must be unique.
    pub fn add_portal(&mut self, name: &str, pose: Pose, surface: DisplaySurface) -> Result<PortalKey> {
        if self.names.contains_key(name) {
            return Err(engine_config_err!(SOURCE, "Portal '{}' already exists", name));
        }

        let key = self.portals.insert(Portal::new(name.to_string(), pose, surface));
        self.order.push(key);
        self.names.insert(name.to_string(), key);
        self.validated = false;

        engine_debug!(SOURCE, "Portal '{}' added", name);
        Ok(key)
    }

    /// Remove a portal, unlinking its partner and releasing its view texture.
    ///
    /// Travellers it was tracking are notified that they left its threshold.
    pub fn remove_portal(&mut self, key: PortalKey) -> Result<()> {
        let mut portal = self.portals.remove(key).ok_or_else(|| portal_not_found(key))?;

        if let Some(partner) = portal.linked().and_then(|linked| self.portals.get_mut(linked)) {
            if partner.linked() == Some(key) {
                partner.set_linked(None);
            }
            // It was displaying our texture
            partner.surface_mut().material_mut().clear_texture(MAIN_TEXTURE);
        }

        for entry in portal.tracker().tracked().to_vec() {
            if let Some(traveller) = self.travellers.get_mut(entry.key) {
                traveller.exit_portal_threshold();
            }
            self.tracking.remove(&entry.key);
        }
        portal.tracker_mut().clear();
        portal.release_view_texture();

        self.order.retain(|k| *k != key);
        self.names.remove(portal.name());
        self.validated = false;

        engine_debug!(SOURCE, "Portal '{}' removed", portal.name());
        Ok(())
    }

    pub fn portal(&self, key: PortalKey) -> Option<&Portal> {
        self.portals.get(key)
    }

    pub fn portal_mut(&mut self, key: PortalKey) -> Option<&mut Portal> {
        self.portals.get_mut(key)
    }

    pub fn portal_by_name(&self, name: &str) -> Option<PortalKey> {
        self.names.get(name).copied()
    }

    /// Portal keys in registration order.
    pub fn portal_keys(&self) -> &[PortalKey] {
        &self.order
    }

    pub fn portal_count(&self) -> usize {
        self.portals.len()
    }

    pub fn set_portal_pose(&mut self, key: PortalKey, pose: Pose) -> Result<()> {
        let portal = self.portals.get_mut(key).ok_or_else(|| portal_not_found(key))?;
        portal.set_pose(pose);
        Ok(())
    }

    pub fn set_portal_priority(&mut self, key: PortalKey, priority: i32) -> Result<()> {
        let portal = self.portals.get_mut(key).ok_or_else(|| portal_not_found(key))?;
        portal.set_priority(priority);
        Ok(())
    }

    // ===== LINKS =====

    /// Set the link of one portal only. The partner is not touched, so the
    /// world stays invalid until the reverse link is set too.
    pub fn set_linked_portal(&mut self, key: PortalKey, linked: Option<PortalKey>) -> Result<()> {
        if let Some(linked) = linked {
            if !self.portals.contains_key(linked) {
                return Err(portal_not_found(linked));
            }
        }
        let portal = self.portals.get_mut(key).ok_or_else(|| portal_not_found(key))?;
        portal.set_linked(linked);
        self.validated = false;
        Ok(())
    }

    /// Link `a` and `b` to each other, breaking any previous link of either.
    pub fn link(&mut self, a: PortalKey, b: PortalKey) -> Result<()> {
        if a == b {
            return Err(engine_config_err!(SOURCE, "A portal cannot be linked to itself"));
        }
        if !self.portals.contains_key(a) {
            return Err(portal_not_found(a));
        }
        if !self.portals.contains_key(b) {
            return Err(portal_not_found(b));
        }

        self.unlink(a)?;
        self.unlink(b)?;
        self.portals[a].set_linked(Some(b));
        self.portals[b].set_linked(Some(a));

        engine_debug!(SOURCE, "Linked '{}' <-> '{}'", self.portals[a].name(), self.portals[b].name());
        Ok(())
    }

    /// Break the link of `key` (and the partner's link back to it).
    pub fn unlink(&mut self, key: PortalKey) -> Result<()> {
        let portal = self.portals.get_mut(key).ok_or_else(|| portal_not_found(key))?;
        let previous = portal.linked();
        portal.set_linked(None);

        if let Some(partner) = previous.and_then(|p| self.portals.get_mut(p)) {
            if partner.linked() == Some(key) {
                partner.set_linked(None);
            }
        }
        self.validated = false;
        Ok(())
    }

    /// Check that every portal is linked to another existing portal that links back.
    pub fn validate(&mut self) -> Result<()> {
        for &key in &self.order {
            let portal = &self.portals[key];
            let linked = match portal.linked() {
                Some(linked) => linked,
                None => {
                    return Err(engine_config_err!(SOURCE, "Portal '{}' is not linked", portal.name()));
                }
            };
            if linked == key {
                return Err(engine_config_err!(SOURCE, "Portal '{}' is linked to itself", portal.name()));
            }
            let partner = match self.portals.get(linked) {
                Some(partner) => partner,
                None => {
                    return Err(engine_config_err!(SOURCE,
                        "Portal '{}' is linked to a removed portal", portal.name()));
                }
            };
            if partner.linked() != Some(key) {
                return Err(engine_config_err!(SOURCE,
                    "Portal '{}' links to '{}' but '{}' does not link back",
                    portal.name(), partner.name(), partner.name()));
            }
        }

        self.validated = true;
        engine_debug!(SOURCE, "{} portal(s) validated", self.order.len());
        Ok(())
    }

    pub fn is_validated(&self) -> bool {
        self.validated
    }

    fn ensure_validated(&self) -> Result<()> {
        if self.validated {
            Ok(())
        } else {
            Err(engine_config_err!(SOURCE, "Portal links changed since the last validate() call"))
        }
    }

    fn endpoint(&self, key: PortalKey) -> Result<PortalEndpoint> {
        let portal = self.portals.get(key).ok_or_else(|| portal_not_found(key))?;
        Ok(PortalEndpoint { key, pose: *portal.pose() })
    }

    fn linked_of(&self, key: PortalKey) -> Result<PortalKey> {
        let portal = self.portals.get(key).ok_or_else(|| portal_not_found(key))?;
        portal.linked().ok_or_else(|| {
            engine_config_err!(SOURCE, "Portal '{}' is not linked", portal.name())
        })
    }

    // ===== TRAVELLERS =====

    pub fn add_traveller(&mut self, traveller: Box<dyn Traveller>) -> TravellerKey {
        self.travellers.insert(traveller)
    }

    /// Unregister a traveller, leaving any threshold it was in.
    pub fn remove_traveller(&mut self, key: TravellerKey) -> Option<Box<dyn Traveller>> {
        let mut traveller = self.travellers.remove(key)?;
        if let Some(portal_key) = self.tracking.remove(&key) {
            if let Some(portal) = self.portals.get_mut(portal_key) {
                portal.tracker_mut().on_exit_threshold(key, traveller.as_mut());
            }
        }
        Some(traveller)
    }

    pub fn traveller(&self, key: TravellerKey) -> Option<&dyn Traveller> {
        self.travellers.get(key).map(|t| t.as_ref())
    }

    pub fn traveller_mut(&mut self, key: TravellerKey) -> Option<&mut dyn Traveller> {
        let traveller = self.travellers.get_mut(key)?;
        let traveller: &mut dyn Traveller = traveller.as_mut();
        Some(traveller)
    }

    pub fn traveller_keys(&self) -> impl Iterator<Item = TravellerKey> + '_ {
        self.travellers.keys()
    }

    pub fn traveller_count(&self) -> usize {
        self.travellers.len()
    }

    /// Portal currently tracking `traveller`, if any.
    pub fn tracking_portal(&self, traveller: TravellerKey) -> Option<PortalKey> {
        self.tracking.get(&traveller).copied()
    }

    /// Trigger notification: `traveller` entered the threshold of `portal`.
    ///
    /// A traveller tracked by another portal is handed over. Returns false if
    /// `portal` already tracks it.
    pub fn on_enter_threshold(&mut self, portal: PortalKey, traveller: TravellerKey) -> Result<bool> {
        if !self.portals.contains_key(portal) {
            return Err(portal_not_found(portal));
        }
        let body = self.travellers.get_mut(traveller).ok_or_else(|| traveller_not_found(traveller))?;

        if let Some(previous) = self.tracking.get(&traveller).copied() {
            if previous == portal {
                return Ok(false);
            }
            if let Some(previous_portal) = self.portals.get_mut(previous) {
                previous_portal.tracker_mut().on_exit_threshold(traveller, body.as_mut());
            }
            engine_trace!(SOURCE, "Traveller {:?} handed over to '{}'", traveller, self.portals[portal].name());
        }

        let target = &mut self.portals[portal];
        let pose = *target.pose();
        target.tracker_mut().on_enter_threshold(traveller, body.as_mut(), &pose);
        self.tracking.insert(traveller, portal);
        Ok(true)
    }

    /// Trigger notification: `traveller` left the threshold of `portal`.
    /// Returns false if `portal` was not tracking it.
    pub fn on_exit_threshold(&mut self, portal: PortalKey, traveller: TravellerKey) -> Result<bool> {
        let target = self.portals.get_mut(portal).ok_or_else(|| portal_not_found(portal))?;
        let body = self.travellers.get_mut(traveller).ok_or_else(|| traveller_not_found(traveller))?;

        if !target.tracker_mut().on_exit_threshold(traveller, body.as_mut()) {
            return Ok(false);
        }
        self.tracking.remove(&traveller);
        Ok(true)
    }

    /// Evaluate every portal's tracked travellers once and teleport those
    /// that crossed. Call once per frame, before `render_frame`.
    pub fn update_travellers(&mut self) -> Result<Vec<TeleportEvent>> {
        self.ensure_validated()?;

        let mut events = Vec::new();
        for key in self.order.clone() {
            if self.portals[key].tracker().is_empty() {
                continue;
            }
            let from = self.endpoint(key)?;
            let to = self.endpoint(self.linked_of(key)?)?;
            let travellers = &mut self.travellers;
            events.extend(self.portals[key].tracker_mut().update(&from, &to, travellers));
        }
        Ok(events)
    }

    // ===== RENDERING =====

    /// Render the view of portal `key` for `viewer`.
    ///
    /// The view shows what lies behind the linked portal and is displayed on
    /// the linked portal's surface.
    pub fn render_portal(
        &mut self,
        key: PortalKey,
        viewer: &Camera,
        renderer: &mut dyn Renderer,
    ) -> Result<RenderOutcome> {
        self.ensure_validated()?;
        let linked = self.linked_of(key)?;

        let linked_portal = &self.portals[linked];
        let bounds = linked_portal.surface().world_bounds(linked_portal.pose());
        if !is_visible(&bounds, viewer.pose(), viewer.projection_matrix()) {
            engine_trace!(SOURCE, "Portal '{}' culled", self.portals[key].name());
            return Ok(RenderOutcome::Culled);
        }

        // Never draw our own surface into our own view
        self.portals[key].surface_mut().set_enabled(false);
        let outcome = self.render_portal_view(key, linked, viewer, renderer);
        self.portals[key].surface_mut().set_enabled(true);

        Ok(outcome)
    }

    fn render_portal_view(
        &mut self,
        key: PortalKey,
        linked: PortalKey,
        viewer: &Camera,
        renderer: &mut dyn Renderer,
    ) -> RenderOutcome {
        let format = self.config.view_texture_format;
        let texture = match self.portals[key].ensure_view_texture(renderer, viewer.viewport(), format) {
            Ok(texture) => texture,
            Err(err) => {
                engine_warn!(SOURCE, "Portal '{}' skipped, view texture unavailable: {}",
                    self.portals[key].name(), err);
                return RenderOutcome::Skipped;
            }
        };
        self.portals[linked].surface_mut().material_mut().set_texture(MAIN_TEXTURE, Arc::clone(&texture));

        let portal_pose = *self.portals[key].pose();
        let linked_pose = *self.portals[linked].pose();
        let camera_pose = extract_pose(&relocate(&linked_pose, &portal_pose, &viewer.pose().local_to_world()));
        let projection = compute_oblique_projection(
            &portal_pose,
            &camera_pose,
            viewer.projection_matrix(),
            self.config.near_clip_offset,
            self.config.near_clip_limit,
        );

        let camera = self.portals[key].camera_mut();
        camera.set_viewport(*viewer.viewport());
        camera.set_projection(*viewer.projection());
        camera.set_projection_matrix(projection);
        camera.set_pose(camera_pose);
        let camera = camera.clone();

        let visible_surfaces: Vec<PortalKey> = self.order.iter()
            .copied()
            .filter(|k| self.portals[*k].surface().is_enabled())
            .collect();
        let view = RenderView::new(key, camera, visible_surfaces);

        match renderer.render_view(&view, &texture) {
            Ok(()) => RenderOutcome::Rendered,
            Err(err) => {
                engine_warn!(SOURCE, "Portal '{}' skipped, render failed: {}",
                    self.portals[key].name(), err);
                RenderOutcome::Skipped
            }
        }
    }

    /// Thicken the surface of `key` against the viewer's near plane.
    /// Returns the applied thickness.
    pub fn protect_screen_from_clipping(&mut self, key: PortalKey, viewer: &Camera) -> Result<f32> {
        let portal = self.portals.get_mut(key).ok_or_else(|| portal_not_found(key))?;
        let pose = *portal.pose();
        Ok(surface::protect_screen_from_clipping(
            portal.surface_mut(),
            &pose,
            viewer.position(),
            viewer.projection(),
        ))
    }

    /// Portal keys in the order `render_frame` visits them.
    pub fn render_order(&self) -> Vec<PortalKey> {
        let mut order = self.order.clone();
        if self.config.render_order == RenderOrder::Priority {
            // Stable: equal priorities keep registration order
            order.sort_by_key(|k| self.portals[*k].priority());
        }
        order
    }

    /// Render every portal for `viewer`.
    ///
    /// One pass renders each portal once, so a portal seen through another
    /// portal shows the image from the previous pass.
    /// `extra_bounce_passes` adds full passes to refresh those nested views.
    pub fn render_frame(&mut self, viewer: &Camera, renderer: &mut dyn Renderer) -> Result<FrameStats> {
        self.ensure_validated()?;

        let order = self.render_order();
        let mut stats = FrameStats::default();

        for _ in 0..self.config.passes_per_frame() {
            for &key in &order {
                stats.record(self.render_portal(key, viewer, renderer)?);
            }
            stats.passes += 1;
        }

        if self.config.protect_screen_from_clipping {
            for &key in &order {
                self.protect_screen_from_clipping(key, viewer)?;
            }
        }

        engine_trace!(SOURCE, "Frame: {} rendered, {} culled, {} skipped over {} pass(es)",
            stats.rendered, stats.culled, stats.skipped, stats.passes);
        Ok(stats)
    }

    /// Drop every portal and traveller, releasing all view textures.
    pub fn clear(&mut self) {
        for (_, portal) in self.portals.iter_mut() {
            portal.release_view_texture();
            portal.surface_mut().material_mut().clear_texture(MAIN_TEXTURE);
        }
        for (key, traveller) in self.travellers.iter_mut() {
            if self.tracking.contains_key(&key) {
                traveller.exit_portal_threshold();
            }
        }

        let portal_count = self.portals.len();
        self.portals.clear();
        self.order.clear();
        self.names.clear();
        self.travellers.clear();
        self.tracking.clear();
        self.validated = false;

        engine_info!(SOURCE, "Portal world cleared ({} portal(s))", portal_count);
    }
}

#[cfg(test)]
#[path = "world_tests.rs"]
mod tests;
