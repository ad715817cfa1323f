// Resume upload, analysis and job matching. Parsing, classification and
// matching are delegated to the ML client.

pub mod handlers;
pub mod service;
