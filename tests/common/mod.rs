/// Common test utilities and mock infrastructure
///
/// This module provides shared functionality for integration tests including:
/// - A scripted MegaCLI runner that records every invocation
/// - Canned MegaCLI transcripts

pub mod mock_commands;
pub mod transcripts;

#[allow(unused_imports)]
pub use mock_commands::ScriptedRunner;
#[allow(unused_imports)]
pub use transcripts::MockMegaCliData;
