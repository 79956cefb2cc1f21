use crate::models::{DatesPayload, QueryRequest};
use crate::ui::RegionContent;

use super::Renderer;

/// Numbered list of dates.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateListRenderer;

impl Renderer for DateListRenderer {
    type Payload = DatesPayload;

    fn render(&self, payload: &DatesPayload, request: &QueryRequest) -> RegionContent {
        RegionContent::DateList {
            dates: payload.dates.clone(),
            request: request.clone(),
        }
    }
}
