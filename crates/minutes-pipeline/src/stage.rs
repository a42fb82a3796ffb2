//! Pipeline stage names.

/// Stages of one upload's journey, in strict order.
///
/// `Visualized` is the only best-effort stage; every other stage aborts the
/// run when it fails. There is no resumption: a retried upload starts over
/// at `Received` with a fresh meeting id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelineStage {
    Received,
    Transcribed,
    Analyzed,
    Visualized,
    Persisted,
    Indexed,
    Complete,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PipelineStage::Received => "received",
            PipelineStage::Transcribed => "transcribed",
            PipelineStage::Analyzed => "analyzed",
            PipelineStage::Visualized => "visualized",
            PipelineStage::Persisted => "persisted",
            PipelineStage::Indexed => "indexed",
            PipelineStage::Complete => "complete",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_display_names() {
        assert_eq!(PipelineStage::Received.to_string(), "received");
        assert_eq!(PipelineStage::Visualized.to_string(), "visualized");
        assert_eq!(PipelineStage::Complete.to_string(), "complete");
    }

    #[test]
    fn test_stage_order_is_strict() {
        let stages = [
            PipelineStage::Received,
            PipelineStage::Transcribed,
            PipelineStage::Analyzed,
            PipelineStage::Visualized,
            PipelineStage::Persisted,
            PipelineStage::Indexed,
            PipelineStage::Complete,
        ];
        for pair in stages.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }
}
