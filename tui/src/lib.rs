use anyhow::Result;
use pptmaker_common::Presentation;
use pptmaker_core::PresentationService;
use std::sync::Arc;

mod preview;

pub use preview::{PreviewAction, SlidePreview};

/// Browse `presentation` until the user quits and return it with any
/// regenerated slide text applied.
pub async fn run_preview(
    presentation: Presentation,
    service: Option<Arc<PresentationService>>,
) -> Result<Presentation> {
    let mut preview = SlidePreview::new(presentation, service);
    preview.run().await?;
    Ok(preview.into_presentation())
}
