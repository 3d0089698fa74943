use crate::domain::server_timing::timing::Timing;
use std::fmt::{Display, Formatter};

pub mod timing;

/// Value of the `Server-Timing` response header.
#[derive(Debug, Clone, Default)]
pub struct ServerTiming {
    timings: Vec<Timing>,
}

impl Display for ServerTiming {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = self
            .timings
            .iter()
            .map(Timing::to_string)
            .collect::<Vec<String>>()
            .join(", ");

        write!(f, "{display}")
    }
}

impl ServerTiming {
    pub fn push(&mut self, timing: Timing) {
        self.timings.push(timing);
    }

    pub fn is_empty(&self) -> bool {
        self.timings.is_empty()
    }
}
