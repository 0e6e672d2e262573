//! Marker activation: fetch a card's detail and present it, dropping
//! responses that a newer activation has superseded.

use crate::catalog::{fetch_card_detail, CardDetail, CatalogClient, Currency};
use crate::overlay::{ElementId, Overlay, OverlayManager, Rect};

/// Ticket for one in-flight detail request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

/// Couples detail requests to the overlay they may open
#[derive(Debug, Default)]
pub struct PreviewController {
    generation: u64,
    overlay: OverlayManager,
}

impl PreviewController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn overlay(&self) -> &OverlayManager {
        &self.overlay
    }

    /// Start a request; every earlier token becomes stale
    pub fn begin(&mut self) -> RequestToken {
        self.generation += 1;
        RequestToken(self.generation)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.generation
    }

    /// Deliver a fetched detail. Stale tokens and details without an
    /// image are dropped.
    pub fn complete(
        &mut self,
        token: RequestToken,
        detail: CardDetail,
        anchor: ElementId,
        rect: Rect,
    ) -> Option<&Overlay> {
        if !self.is_current(token) {
            tracing::debug!(?token, "dropping superseded card detail");
            return None;
        }
        if !detail.has_image() {
            return None;
        }
        Some(self.overlay.show(detail, anchor, rect))
    }

    /// Handle a preview marker activation end to end. Rows without a
    /// catalog identifier do nothing.
    pub fn activate<C>(
        &mut self,
        client: &C,
        catalog_id: Option<&str>,
        anchor: ElementId,
        rect: Rect,
        currency: Currency,
    ) -> Option<&Overlay>
    where
        C: CatalogClient + ?Sized,
    {
        let id = catalog_id?;
        let token = self.begin();
        let detail = fetch_card_detail(client, id, currency);
        self.complete(token, detail, anchor, rect)
    }
}
