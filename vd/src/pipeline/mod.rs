//! Voice pipeline orchestration
//!
//! capture → recognise → plan → validate → dispatch, one utterance at a time.
//! Every failure ends only the current utterance; the loop keeps listening.

use std::sync::Arc;

use tracing::{debug, info, warn};

mod inflight;
mod source;

pub use inflight::{InFlight, InFlightToken};
pub use source::{LineSource, TranscriptSource, Utterance};

use crate::command::Command;
use crate::dispatch::{self, DispatchError, Transport};
use crate::planner::{CommandPlanner, PlanError};

/// What happened to one utterance
#[derive(Debug)]
pub enum Outcome {
    /// The command reached the device
    Dispatched(Command),
    /// Nothing was heard
    Silence,
    /// The capture was aborted; the planner was not called
    Aborted,
    /// Another command was still in flight; the planner was not called
    Busy,
    /// No command could be planned
    PlanFailed(PlanError),
    /// The command was planned but the transport failed
    DispatchFailed(Command, DispatchError),
}

/// Counters for one `run`
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PipelineStats {
    pub utterances: usize,
    pub dispatched: usize,
    pub skipped: usize,
    pub plan_failures: usize,
    pub dispatch_failures: usize,
}

impl PipelineStats {
    fn record(&mut self, outcome: &Outcome) {
        self.utterances += 1;
        match outcome {
            Outcome::Dispatched(_) => self.dispatched += 1,
            Outcome::Silence | Outcome::Aborted | Outcome::Busy => self.skipped += 1,
            Outcome::PlanFailed(_) => self.plan_failures += 1,
            Outcome::DispatchFailed(..) => self.dispatch_failures += 1,
        }
    }
}

/// Sequential planner-to-device pipeline
pub struct Pipeline {
    planner: Arc<dyn CommandPlanner>,
    transport: Box<dyn Transport>,
    inflight: InFlight,
}

impl Pipeline {
    pub fn new(planner: Arc<dyn CommandPlanner>, transport: Box<dyn Transport>) -> Self {
        Self::with_inflight(planner, transport, InFlight::new())
    }

    /// Share an in-flight slot with other pipelines driving the same device
    pub fn with_inflight(planner: Arc<dyn CommandPlanner>, transport: Box<dyn Transport>, inflight: InFlight) -> Self {
        debug!(planner = %planner.describe(), transport = %transport.describe(), "Pipeline::new: called");
        Self {
            planner,
            transport,
            inflight,
        }
    }

    pub fn inflight(&self) -> &InFlight {
        &self.inflight
    }

    /// Process one utterance end to end
    pub async fn run_utterance(&mut self, utterance: Utterance) -> Outcome {
        let text = match utterance {
            Utterance::Silence => {
                debug!("run_utterance: heard nothing");
                return Outcome::Silence;
            }
            Utterance::Aborted => {
                debug!("run_utterance: capture aborted, discarding");
                return Outcome::Aborted;
            }
            Utterance::Transcript(text) => text,
        };

        let _token = match self.inflight.try_acquire() {
            Ok(token) => token,
            Err(_) => {
                warn!(%text, "run_utterance: command still in flight, dropping utterance");
                return Outcome::Busy;
            }
        };

        let command = match self.planner.plan(&text).await {
            Ok(command) => command,
            Err(e) => {
                warn!(error = %e, "run_utterance: planning failed");
                return Outcome::PlanFailed(e);
            }
        };

        match dispatch::dispatch(command, self.transport.as_mut()).await {
            Ok(()) => Outcome::Dispatched(command),
            Err(e) => Outcome::DispatchFailed(command, e),
        }
    }

    /// Drain a transcript source, reporting each outcome to `on_outcome`
    ///
    /// Returns early only when the source itself fails to read.
    pub async fn run<S, F>(&mut self, source: &mut S, mut on_outcome: F) -> eyre::Result<PipelineStats>
    where
        S: TranscriptSource + ?Sized,
        F: FnMut(&Outcome) + Send,
    {
        info!(planner = %self.planner.describe(), transport = %self.transport.describe(), "Pipeline started");
        let mut stats = PipelineStats::default();

        while let Some(utterance) = source.next_utterance().await? {
            let outcome = self.run_utterance(utterance).await;
            stats.record(&outcome);
            on_outcome(&outcome);
        }

        info!(?stats, "Pipeline finished");
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Planner that maps a few fixed phrases
    #[derive(Default)]
    struct PhrasePlanner {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CommandPlanner for PhrasePlanner {
        async fn plan(&self, text: &str) -> Result<Command, PlanError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match text {
                "water" => Ok(Command::water_on(200)),
                "pills" => Ok(Command::pill_dispense(2)),
                "stop" => Ok(Command::Stop),
                "offline" => Err(PlanError::BackendUnavailable("connection refused".to_string())),
                other => Err(PlanError::MalformedBackendOutput(other.to_string())),
            }
        }

        fn describe(&self) -> String {
            "phrases".to_string()
        }
    }

    /// Transport recording into shared state, optionally failing
    #[derive(Clone, Default)]
    struct Recorder {
        sent: Arc<Mutex<Vec<Command>>>,
        attempts: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl Transport for Recorder {
        async fn send(&mut self, command: &Command) -> Result<(), DispatchError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DispatchError::TransportFailure("unplugged".to_string()));
            }
            self.sent.lock().unwrap().push(*command);
            Ok(())
        }

        fn describe(&self) -> String {
            "recorder".to_string()
        }
    }

    fn pipeline(planner: &Arc<PhrasePlanner>, recorder: &Recorder) -> Pipeline {
        Pipeline::new(planner.clone(), Box::new(recorder.clone()))
    }

    #[tokio::test]
    async fn test_transcript_is_planned_and_dispatched() {
        let planner = Arc::new(PhrasePlanner::default());
        let recorder = Recorder::default();
        let mut pipeline = pipeline(&planner, &recorder);

        let outcome = pipeline.run_utterance(Utterance::Transcript("water".to_string())).await;
        assert!(matches!(outcome, Outcome::Dispatched(cmd) if cmd == Command::water_on(200)));
        assert_eq!(*recorder.sent.lock().unwrap(), vec![Command::water_on(200)]);
        assert!(!pipeline.inflight().is_busy());
    }

    #[tokio::test]
    async fn test_aborted_and_silent_captures_skip_planner() {
        let planner = Arc::new(PhrasePlanner::default());
        let recorder = Recorder::default();
        let mut pipeline = pipeline(&planner, &recorder);

        assert!(matches!(pipeline.run_utterance(Utterance::Aborted).await, Outcome::Aborted));
        assert!(matches!(pipeline.run_utterance(Utterance::Silence).await, Outcome::Silence));
        assert_eq!(planner.calls.load(Ordering::SeqCst), 0);
        assert_eq!(recorder.attempts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_plan_failure_does_not_dispatch() {
        let planner = Arc::new(PhrasePlanner::default());
        let recorder = Recorder::default();
        let mut pipeline = pipeline(&planner, &recorder);

        let outcome = pipeline.run_utterance(Utterance::Transcript("offline".to_string())).await;
        assert!(matches!(outcome, Outcome::PlanFailed(PlanError::BackendUnavailable(_))));
        assert_eq!(recorder.attempts.load(Ordering::SeqCst), 0);
        assert!(!pipeline.inflight().is_busy());
    }

    #[tokio::test]
    async fn test_dispatch_failure_is_not_retried_and_releases_slot() {
        let planner = Arc::new(PhrasePlanner::default());
        let recorder = Recorder {
            fail: true,
            ..Default::default()
        };
        let mut pipeline = pipeline(&planner, &recorder);

        let outcome = pipeline.run_utterance(Utterance::Transcript("pills".to_string())).await;
        assert!(matches!(
            outcome,
            Outcome::DispatchFailed(cmd, DispatchError::TransportFailure(_)) if cmd == Command::pill_dispense(2)
        ));
        assert_eq!(recorder.attempts.load(Ordering::SeqCst), 1);
        assert!(!pipeline.inflight().is_busy());
    }

    #[tokio::test]
    async fn test_busy_slot_blocks_new_cycle() {
        let planner = Arc::new(PhrasePlanner::default());
        let recorder = Recorder::default();
        let inflight = InFlight::new();
        let mut pipeline = Pipeline::with_inflight(planner.clone(), Box::new(recorder.clone()), inflight.clone());

        let held = inflight.try_acquire().unwrap();
        let outcome = pipeline.run_utterance(Utterance::Transcript("water".to_string())).await;
        assert!(matches!(outcome, Outcome::Busy));
        assert_eq!(planner.calls.load(Ordering::SeqCst), 0);
        assert_eq!(recorder.attempts.load(Ordering::SeqCst), 0);

        drop(held);
        let outcome = pipeline.run_utterance(Utterance::Transcript("water".to_string())).await;
        assert!(matches!(outcome, Outcome::Dispatched(_)));
    }

    #[tokio::test]
    async fn test_run_continues_after_failures() {
        let planner = Arc::new(PhrasePlanner::default());
        let recorder = Recorder::default();
        let mut pipeline = pipeline(&planner, &recorder);

        let input: &[u8] = b"water\n\n!abort\nsure, here's water\noffline\nstop\n";
        let mut source = LineSource::new(input, "!abort");
        let mut seen = 0;
        let stats = pipeline.run(&mut source, |_| seen += 1).await.unwrap();

        assert_eq!(seen, 6);
        assert_eq!(
            stats,
            PipelineStats {
                utterances: 6,
                dispatched: 2,
                skipped: 2,
                plan_failures: 2,
                dispatch_failures: 0,
            }
        );
        assert_eq!(*recorder.sent.lock().unwrap(), vec![Command::water_on(200), Command::Stop]);
    }

    #[tokio::test]
    async fn test_run_survives_undecodable_transcript() {
        let planner = Arc::new(PhrasePlanner::default());
        let recorder = Recorder::default();
        let mut pipeline = pipeline(&planner, &recorder);

        let input: &[u8] = b"water\n\xc3\x28\nstop\n";
        let mut source = LineSource::new(input, "!abort");
        let stats = pipeline.run(&mut source, |_| {}).await.unwrap();

        assert_eq!(stats.utterances, 3);
        assert_eq!(stats.skipped, 1);
        assert_eq!(planner.calls.load(Ordering::SeqCst), 2);
        assert_eq!(*recorder.sent.lock().unwrap(), vec![Command::water_on(200), Command::Stop]);
    }
}
