mod registry;

pub use registry::{PeriodConfigError, PeriodError, PeriodRegistry};
