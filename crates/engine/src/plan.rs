//! Render plan stub handed to the UI each evaluation.

use crate::selector::ModeSelectionResult;
use cadence_context::{Confidence, LayoutHint, Mode};
use serde::{Deserialize, Serialize};

/// What to render. Component lists are resolved by the host from `mode`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderPlan {
    pub id: String,
    pub mode: Mode,
    pub layout: LayoutHint,
    pub reason: String,
    pub confidence: Confidence,
    /// Evaluation time (epoch ms).
    pub timestamp: i64,
}

impl RenderPlan {
    pub fn new(selection: &ModeSelectionResult, now_ms: i64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            mode: selection.mode,
            layout: selection.mode.layout(),
            reason: selection.reason.clone(),
            confidence: selection.confidence,
            timestamp: now_ms,
        }
    }
}
