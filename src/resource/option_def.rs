//! Option definition resource

use super::Entity;
use keakit::Client;
use keakit::reconcile::{Lifecycle, OptionDefLifecycle, OptionDefState};

impl Entity for OptionDefState {
    const KIND: &'static str = "option_def";
    const PHASE: u32 = 0;

    fn label(&self) -> String {
        format!("{}/{}", self.space, self.code)
    }

    fn read(&self, client: &Client, host: &str) -> keakit::Result<Option<Self>> {
        OptionDefLifecycle::new(client, host)?.read(&self.key())
    }

    fn create(&self, client: &Client, host: &str) -> keakit::Result<()> {
        OptionDefLifecycle::new(client, host)?.create(self).map(drop)
    }

    fn update(&self, client: &Client, host: &str) -> keakit::Result<()> {
        OptionDefLifecycle::new(client, host)?.update(self).map(drop)
    }

    fn delete(&self, client: &Client, host: &str) -> keakit::Result<()> {
        OptionDefLifecycle::new(client, host)?.delete(&self.key())
    }

    fn converged_with(&self, observed: &Self) -> bool {
        self == observed
    }
}
