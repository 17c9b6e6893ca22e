/// Scripted MegaCLI execution for integration tests
///
/// Responses are keyed by the full argument line (`-AdpAllInfo -a0 -NoLog`).
/// Every invocation is recorded, so tests can assert what ran and in which
/// order. An unscripted command fails to "spawn".

use megaraid_manager::{RaidError, RaidResult, ToolOutput, ToolRunner};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct ScriptedRunner {
    responses: Arc<Mutex<HashMap<String, ToolOutput>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runner that already answers the version probe
    pub fn with_megacli() -> Self {
        let mut runner = Self::new();
        runner.register("-help -NoLog", ToolOutput::success(&super::MockMegaCliData::help("8.07.14")));
        runner
    }

    /// Register a response for an exact argument line
    pub fn register(&mut self, command_key: &str, output: ToolOutput) {
        self.responses
            .lock()
            .unwrap()
            .insert(command_key.to_string(), output);
    }

    pub fn success(&mut self, command_key: &str, stdout: &str) {
        self.register(command_key, ToolOutput::success(stdout));
    }

    pub fn exit_code(&mut self, command_key: &str, stdout: &str, code: i32) {
        self.register(command_key, ToolOutput::failed(stdout, code));
    }

    /// Every argument line run so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls other than the version probe
    pub fn calls_without_probe(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| call != "-help -NoLog")
            .collect()
    }

    pub fn count(&self, command_key: &str) -> usize {
        self.calls().iter().filter(|call| *call == command_key).count()
    }
}

impl ToolRunner for ScriptedRunner {
    fn run(&self, args: &[String]) -> RaidResult<ToolOutput> {
        let key = args.join(" ");
        self.calls.lock().unwrap().push(key.clone());

        self.responses
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .ok_or_else(|| RaidError::ExecutionFailed(format!("unscripted command: {}", key)))
    }
}
