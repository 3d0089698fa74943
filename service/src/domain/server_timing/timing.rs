use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Timing {
    pub name: String,
    pub duration: String,
    pub description: Option<String>,
}

impl Display for Timing {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.description {
            Some(desc) => write!(f, "{};desc=\"{}\";dur={}", self.name, desc, self.duration),
            None => write!(f, "{};dur={}", self.name, self.duration),
        }
    }
}

impl Timing {
    pub fn new(name: &str, duration: Duration, description: Option<String>) -> Timing {
        let dur = duration.as_millis().to_string();
        Timing {
            name: name.to_string(),
            duration: dur,
            description,
        }
    }

    pub fn since(name: &str, start: Instant) -> Timing {
        Timing::new(name, start.elapsed(), None)
    }
}
