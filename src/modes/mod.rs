//! Mode numbers and mode amplitude tables.

mod amplitudes;
mod header;

pub use amplitudes::{list_runs, ModeAmplitudes, ModeTable};
pub use header::{classify_header, extract_modes, Dialect, ModeSet, IMAGINARY_MARKER};
