use crate::{core::geo::LatLng, dom::Document, Result};

/// Shows the coordinate of the last direct map click
#[derive(Debug, Clone)]
pub struct ClickReadout {
    selector: String,
    last: Option<LatLng>,
}

impl ClickReadout {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            last: None,
        }
    }

    /// Overwrites the readout element with `lat_lng`
    pub fn show(&mut self, doc: &mut dyn Document, lat_lng: LatLng) -> Result<()> {
        let element = doc.require(&self.selector)?;
        doc.set_text(element, &lat_lng.to_string())?;
        self.last = Some(lat_lng);
        Ok(())
    }

    pub fn last(&self) -> Option<LatLng> {
        self.last
    }
}
