//! Fixtures shared by the unit tests: hand-built frames and an engine that
//! replays a fixed script of trace events.

use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use steprepl_core::{
    CallFrame, Completion, Engine, EngineError, EngineResult, Environment, ExecutionContext,
    FrameRef, Invocation, TraceEvent,
};

use crate::controller::{StepController, TickStatus};
use crate::view::ViewUpdate;

#[derive(Debug)]
pub struct TestFrame {
    depth: usize,
    name: String,
    caller: Option<FrameRef>,
}

impl CallFrame for TestFrame {
    fn depth(&self) -> usize {
        self.depth
    }

    fn caller(&self) -> Option<FrameRef> {
        self.caller.clone()
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

/// A frame called from `caller`, one level deeper
pub fn frame(name: &str, caller: Option<&FrameRef>) -> FrameRef {
    Arc::new(TestFrame {
        depth: caller.map_or(0, |c| c.depth() + 1),
        name: name.to_string(),
        caller: caller.cloned(),
    })
}

/// A straight call chain of `len` frames; returns the innermost
pub fn chain(len: usize) -> FrameRef {
    let mut current = frame("F0", None);
    for i in 1..len {
        current = frame(&format!("F{i}"), Some(&current));
    }
    current
}

#[derive(Debug, Clone)]
pub enum Step {
    Trace(TraceEvent, FrameRef),
    Output(&'static str),
    SetVar(&'static str, &'static str),
    Break(Option<&'static str>),
    Pause,
    Sample,
    Fault(&'static str),
    Panic(&'static str),
    /// Loop on cancellation checkpoints until cancelled
    Spin,
}

/// Enter `frame`, run `body`, then report `Succeed`
pub fn call(frame: &FrameRef, body: Vec<Step>) -> Vec<Step> {
    let mut steps = vec![Step::Trace(TraceEvent::Enter, frame.clone())];
    steps.extend(body);
    steps.push(Step::Trace(TraceEvent::Succeed, frame.clone()));
    steps
}

/// Replays a fixed list of steps against the execution context
#[derive(Debug, Default)]
pub struct ScriptedEngine {
    steps: Vec<Step>,
    /// Trace events the engine reported, in order
    pub reported: Mutex<Vec<(TraceEvent, String)>>,
}

impl ScriptedEngine {
    pub fn new(steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            steps,
            reported: Mutex::new(Vec::new()),
        })
    }

    pub fn trace_count(&self) -> usize {
        self.reported.lock().len()
    }
}

impl Engine for ScriptedEngine {
    fn execute(&self, invocation: Invocation, ctx: &dyn ExecutionContext) -> EngineResult<Completion> {
        let mut output = String::new();
        let mut state = invocation.state;
        for step in &self.steps {
            let env = Environment::new(state.clone());
            match step {
                Step::Trace(event, frame) => {
                    self.reported.lock().push((*event, frame.describe()));
                    ctx.trace(*event, frame, &output, &env)?;
                }
                Step::Output(text) => output.push_str(text),
                Step::SetVar(name, value) => {
                    state.set(*name, *value);
                }
                Step::Break(message) => {
                    ctx.break_here(message.map(String::from), &output, &env, None)?
                }
                Step::Pause => ctx.pause(&output, &env, None)?,
                Step::Sample => ctx.sample_output(&output, &state),
                Step::Fault(message) => return Err(EngineError::fault(*message)),
                Step::Panic(message) => panic!("{}", message),
                Step::Spin => loop {
                    ctx.checkpoint()?;
                    thread::sleep(Duration::from_millis(1));
                },
            }
        }
        Ok(Completion { text: output, state })
    }
}

const DEADLINE: Duration = Duration::from_secs(10);

/// Tick until the controller reports something other than `Running`
pub fn tick_until_settled(controller: &mut StepController, view: &mut Vec<ViewUpdate>) -> TickStatus {
    let started = Instant::now();
    loop {
        let status = controller.tick(view);
        if status != TickStatus::Running {
            return status;
        }
        assert!(started.elapsed() < DEADLINE, "controller never settled");
        thread::sleep(Duration::from_millis(1));
    }
}

/// Number of halts rendered so far
pub fn halts(view: &[ViewUpdate]) -> usize {
    view.iter().filter(|u| matches!(u, ViewUpdate::Halted(_))).count()
}
