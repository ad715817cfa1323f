// Mock interview workflow: start a session, answer its questions in any order,
// read back the scored result. All scoring goes through the ML client.

pub mod engine;
pub mod handlers;
