//! Stages of one error-analysis run and the trace of what executed.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorStage {
    Idle,
    ProjectLightSpace,
    ComputeError,
    BlurHorizontal,
    BlurVertical,
    ExtractGradient,
    SampleGrid,
    Fitted,
}

impl ErrorStage {
    /// The only successor of each stage. Nothing is ever skipped.
    pub fn next(self) -> ErrorStage {
        match self {
            ErrorStage::Idle => ErrorStage::ProjectLightSpace,
            ErrorStage::ProjectLightSpace => ErrorStage::ComputeError,
            ErrorStage::ComputeError => ErrorStage::BlurHorizontal,
            ErrorStage::BlurHorizontal => ErrorStage::BlurVertical,
            ErrorStage::BlurVertical => ErrorStage::ExtractGradient,
            ErrorStage::ExtractGradient => ErrorStage::SampleGrid,
            ErrorStage::SampleGrid => ErrorStage::Fitted,
            ErrorStage::Fitted => ErrorStage::Idle,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ErrorStage::Idle => "idle",
            ErrorStage::ProjectLightSpace => "project-light-space",
            ErrorStage::ComputeError => "compute-error",
            ErrorStage::BlurHorizontal => "blur-horizontal",
            ErrorStage::BlurVertical => "blur-vertical",
            ErrorStage::ExtractGradient => "extract-gradient",
            ErrorStage::SampleGrid => "sample-grid",
            ErrorStage::Fitted => "fitted",
        }
    }
}

impl fmt::Display for ErrorStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Stages entered during one run, in order. The last entry is where a failed
/// run stopped.
///
/// Entering `Fitted` is not completion: the readback and fit happen inside
/// that stage, and only their success returns the run to `Idle`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassTrace {
    stages: Vec<ErrorStage>,
    relax_passes: u32,
    returned_to_idle: bool,
}

impl PassTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn enter(&mut self, stage: ErrorStage) {
        self.stages.push(stage);
    }

    /// `Fitted -> Idle`, taken once the coefficients exist.
    pub(crate) fn finish(&mut self) {
        self.returned_to_idle = self.last().map(ErrorStage::next) == Some(ErrorStage::Idle);
    }

    pub(crate) fn count_relax(&mut self) {
        self.relax_passes += 1;
    }

    pub fn stages(&self) -> &[ErrorStage] {
        &self.stages
    }

    pub fn last(&self) -> Option<ErrorStage> {
        self.stages.last().copied()
    }

    pub fn relax_passes(&self) -> u32 {
        self.relax_passes
    }

    pub fn position(&self, stage: ErrorStage) -> Option<usize> {
        self.stages.iter().position(|s| *s == stage)
    }

    /// Ran every stage and produced coefficients.
    pub fn is_complete(&self) -> bool {
        self.returned_to_idle && self.stages == FULL_RUN
    }
}

pub(crate) const FULL_RUN: [ErrorStage; 7] = [
    ErrorStage::ProjectLightSpace,
    ErrorStage::ComputeError,
    ErrorStage::BlurHorizontal,
    ErrorStage::BlurVertical,
    ErrorStage::ExtractGradient,
    ErrorStage::SampleGrid,
    ErrorStage::Fitted,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successors_form_a_single_cycle() {
        let mut stage = ErrorStage::Idle;
        let mut seen = Vec::new();
        loop {
            stage = stage.next();
            if stage == ErrorStage::Idle {
                break;
            }
            seen.push(stage);
        }
        assert_eq!(seen, FULL_RUN);
    }

    #[test]
    fn trace_reports_completion() {
        let mut trace = PassTrace::new();
        for s in FULL_RUN {
            trace.enter(s);
        }
        assert!(!trace.is_complete(), "entering Fitted is not finishing it");
        trace.finish();
        assert!(trace.is_complete());
        assert!(trace.position(ErrorStage::BlurHorizontal) < trace.position(ErrorStage::BlurVertical));

        let mut partial = PassTrace::new();
        partial.enter(ErrorStage::ProjectLightSpace);
        assert!(!partial.is_complete());
        assert_eq!(partial.last(), Some(ErrorStage::ProjectLightSpace));
        partial.finish();
        assert!(!partial.is_complete());
    }
}
