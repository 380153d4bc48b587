//! Note sequence generation: segments to notes, contour to pitch bends.

pub mod assembler;
pub mod bend;
pub mod sink;
pub mod timing;
pub mod types;
pub mod velocity;

pub use assembler::{Assembler, AssemblerConfig, PendingPair};
pub use bend::{BendEncoder, bend_value};
pub use sink::{NoteSink, Sequence};
pub use timing::TickClock;
pub use types::{Control, ControlEvent, NoteEvent};
pub use velocity::{CurveShape, VelocityCurve};
