pub mod gate;

pub use gate::{authorize, safe_next, signin_location, GateDecision};
