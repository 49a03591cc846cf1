#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    LoadingConfiguration,
    BuildingProblem,
    RunningTransient,
    SavingResults,
    Completed,
}

impl RunStage {
    pub fn label(&self) -> &'static str {
        match self {
            RunStage::LoadingConfiguration => "loading",
            RunStage::BuildingProblem => "building",
            RunStage::RunningTransient => "transient",
            RunStage::SavingResults => "saving",
            RunStage::Completed => "done",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TransientProgress {
    pub step: usize,
    pub time: f64,
    pub t_end: f64,
    pub fraction_complete: f64,
}

impl TransientProgress {
    pub fn at(step: usize, time: f64, t_end: f64) -> Self {
        let fraction_complete = if t_end > 0.0 {
            (time / t_end).clamp(0.0, 1.0)
        } else {
            1.0
        };
        Self {
            step,
            time,
            t_end,
            fraction_complete,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunProgressEvent {
    /// `heat`, `induction` or `flow`
    pub simulation: &'static str,
    pub stage: RunStage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
    pub transient: Option<TransientProgress>,
}

impl RunProgressEvent {
    pub fn stage(
        simulation: &'static str,
        stage: RunStage,
        elapsed_wall_s: f64,
        message: Option<String>,
    ) -> Self {
        Self {
            simulation,
            stage,
            elapsed_wall_s,
            message,
            transient: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fraction_is_clamped() {
        assert_eq!(TransientProgress::at(5, 0.5, 1.0).fraction_complete, 0.5);
        assert_eq!(TransientProgress::at(0, 0.0, 0.0).fraction_complete, 1.0);
        assert_eq!(TransientProgress::at(11, 1.1, 1.0).fraction_complete, 1.0);
    }
}
