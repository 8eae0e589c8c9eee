pub mod security_headers;
pub mod session_gate;

pub use security_headers::SecurityHeaders;
pub use session_gate::SessionGate;
