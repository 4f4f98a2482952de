//! Shared fixtures for unit tests

use crate::error::{Error, Result};
use crate::fetch::PageFetcher;
use crate::types::{Page, Record};
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

/// Scripted response for one page
#[derive(Debug, Clone)]
pub enum Step {
    Records(Vec<Record>),
    Status(u16),
    Malformed,
}

/// Fetcher that replays a script and records every requested page
///
/// Pages past the end of the script are empty.
#[derive(Debug)]
pub struct ScriptedFetcher {
    first_page: u32,
    steps: Vec<Step>,
    delay: Option<Duration>,
    requested: Mutex<Vec<u32>>,
}

impl ScriptedFetcher {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            first_page: 1,
            steps,
            delay: None,
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn pages(pages: Vec<Vec<Record>>) -> Self {
        Self::new(pages.into_iter().map(Step::Records).collect())
    }

    pub fn starting_at(mut self, first_page: u32) -> Self {
        self.first_page = first_page;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requested(&self) -> Vec<u32> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    fn first_page(&self) -> u32 {
        self.first_page
    }

    async fn fetch(&self, page: u32) -> Result<Page> {
        self.requested.lock().unwrap().push(page);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let step = (page - self.first_page) as usize;
        match self.steps.get(step) {
            Some(Step::Records(records)) => Ok(Page::new(page, records.clone())),
            Some(Step::Status(status)) => Err(Error::http_status(*status, "scripted failure")),
            Some(Step::Malformed) => Err(Error::decode(page, "scripted malformed body")),
            None => Ok(Page::empty(page)),
        }
    }
}

/// Record with the given name and abv
pub fn beer(name: &str, abv: f64) -> Record {
    Record::new(name, format!("{name} tagline"), abv, format!("{name} description"))
}
