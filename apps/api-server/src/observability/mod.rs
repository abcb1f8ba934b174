//! Observability module - call recording and log throttling.

mod call_recorder;
mod log_gate;

pub use call_recorder::CallRecorder;
pub use log_gate::ThrottledLogGate;
