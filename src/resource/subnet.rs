//! Subnet resource

use super::Entity;
use keakit::Client;
use keakit::reconcile::{Lifecycle, SubnetLifecycle, SubnetState};

impl Entity for SubnetState {
    const KIND: &'static str = "subnet";
    const PHASE: u32 = 1;

    fn label(&self) -> String {
        self.subnet.trim().to_string()
    }

    fn read(&self, client: &Client, host: &str) -> keakit::Result<Option<Self>> {
        SubnetLifecycle::new(client, host)?.read(&self.label())
    }

    fn create(&self, client: &Client, host: &str) -> keakit::Result<()> {
        SubnetLifecycle::new(client, host)?.create(self).map(drop)
    }

    fn update(&self, client: &Client, host: &str) -> keakit::Result<()> {
        SubnetLifecycle::new(client, host)?.update(self).map(drop)
    }

    fn delete(&self, client: &Client, host: &str) -> keakit::Result<()> {
        SubnetLifecycle::new(client, host)?.delete(&self.label())
    }

    fn converged_with(&self, observed: &Self) -> bool {
        SubnetState::converged_with(self, observed)
    }

    /// The derived ID is left out so it never shows up as a change
    fn render(&self) -> String {
        let shown = SubnetState {
            id: None,
            ..self.clone()
        };
        toml::to_string_pretty(&shown).unwrap_or_else(|_| format!("{shown:#?}"))
    }
}
