//! Single preview overlay: at most one popup, anchored below the element
//! that opened it, dismissed by clicks elsewhere.

use crate::catalog::CardDetail;
use serde::{Deserialize, Serialize};

/// Identity of an element on the rendered surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OverlayId(u64);

/// On-screen bounding box, in CSS pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub left: f64,
    pub top: f64,
}

/// A displayed popup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    pub id: OverlayId,
    pub image_url: String,
    pub price: String,
    pub anchor: ElementId,
    pub position: Position,
}

impl Overlay {
    pub fn price_label(&self) -> String {
        format!("Price: {}", self.price)
    }
}

/// Where a click landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    /// Inside the given overlay
    Overlay(OverlayId),
    /// On some element of the surface
    Element(ElementId),
    /// Anywhere else on the document
    Document,
}

/// Document click listener owned by the active overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DismissListener {
    overlay: OverlayId,
    anchor: ElementId,
}

impl DismissListener {
    fn should_dismiss(&self, target: ClickTarget) -> bool {
        match target {
            ClickTarget::Overlay(id) => id != self.overlay,
            ClickTarget::Element(el) => el != self.anchor,
            ClickTarget::Document => true,
        }
    }
}

/// Owns the one active overlay and its dismissal listener
#[derive(Debug, Default)]
pub struct OverlayManager {
    active: Option<Overlay>,
    listener: Option<DismissListener>,
    next_id: u64,
}

impl OverlayManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&Overlay> {
        self.active.as_ref()
    }

    /// Registered dismissal listeners; never more than one
    pub fn listener_count(&self) -> usize {
        usize::from(self.listener.is_some())
    }

    /// Show a popup below `rect`, replacing any current one
    pub fn show(&mut self, detail: CardDetail, anchor: ElementId, rect: Rect) -> &Overlay {
        self.dismiss();

        self.next_id += 1;
        let id = OverlayId(self.next_id);
        self.listener = Some(DismissListener {
            overlay: id,
            anchor,
        });

        tracing::debug!(image = %detail.image_url, "showing overlay");
        self.active.insert(Overlay {
            id,
            image_url: detail.image_url,
            price: detail.price,
            anchor,
            position: Position {
                left: rect.left,
                top: rect.bottom,
            },
        })
    }

    /// Remove the current popup and its listener
    pub fn dismiss(&mut self) -> Option<Overlay> {
        self.listener = None;
        self.active.take()
    }

    /// Route a document click; returns whether the popup was dismissed
    pub fn handle_click(&mut self, target: ClickTarget) -> bool {
        let Some(listener) = self.listener else {
            return false;
        };
        if listener.should_dismiss(target) {
            self.dismiss();
            true
        } else {
            false
        }
    }
}
