//! Region screen grab via the `screenshots` crate

use screenshots::Screen;
use tracing::trace;

use crate::capture::FrameSource;
use crate::error::{Result, RondoError};
use crate::types::{CaptureRegion, RawFrame};

/// Frame source that grabs the live region from the display under it.
///
/// The screen is looked up from the region's top-left corner on every call,
/// so a drag across displays follows the overlay without a session restart.
#[derive(Debug, Default)]
pub struct ScreenGrabSource;

impl ScreenGrabSource {
    /// Create a new screen grab source
    pub fn new() -> Self {
        Self
    }
}

/// One-line summary of the displays the grab source can see (diagnostics)
pub fn display_summary() -> String {
    match Screen::all() {
        Ok(screens) if screens.is_empty() => "none found".to_string(),
        Ok(screens) => {
            let primary = screens
                .iter()
                .find(|s| s.display_info.is_primary)
                .or_else(|| screens.first());
            match primary {
                Some(screen) => format!(
                    "{} found, primary {}x{}",
                    screens.len(),
                    screen.display_info.width,
                    screen.display_info.height
                ),
                None => format!("{} found", screens.len()),
            }
        }
        Err(e) => format!("unavailable ({})", e),
    }
}

impl FrameSource for ScreenGrabSource {
    fn acquire(&mut self, region: &CaptureRegion) -> Result<RawFrame> {
        region.validate()?;

        let screen = Screen::from_point(region.left, region.top)
            .map_err(|e| RondoError::capture(format!("no display at {}: {}", region, e)))?;
        let info = screen.display_info;

        // Coordinates relative to the display's own origin; a region that
        // extends past the display edge is a skip, not a session failure.
        let rel_x = region.left - info.x;
        let rel_y = region.top - info.y;
        if rel_x < 0
            || rel_y < 0
            || rel_x as u32 + region.width > info.width
            || rel_y as u32 + region.height > info.height
        {
            return Err(RondoError::capture(format!(
                "region {} exits display bounds {}x{}",
                region, info.width, info.height
            )));
        }

        let img = screen
            .capture_area(rel_x, rel_y, region.width, region.height)
            .map_err(|e| RondoError::capture(format!("grab failed for {}: {}", region, e)))?;

        trace!("Grabbed {}x{} frame at {}", img.width(), img.height(), region);
        RawFrame::new(img.width(), img.height(), img.into_raw())
    }
}
