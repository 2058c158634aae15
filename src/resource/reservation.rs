//! Host reservation resource

use super::Entity;
use keakit::Client;
use keakit::reconcile::{Lifecycle, ReservationLifecycle, ReservationState};

impl Entity for ReservationState {
    const KIND: &'static str = "reservation";
    const PHASE: u32 = 2;

    fn label(&self) -> String {
        self.ip_address.trim().to_string()
    }

    fn read(&self, client: &Client, host: &str) -> keakit::Result<Option<Self>> {
        ReservationLifecycle::new(client, host)?.read(&self.key())
    }

    fn create(&self, client: &Client, host: &str) -> keakit::Result<()> {
        ReservationLifecycle::new(client, host)?.create(self).map(drop)
    }

    fn update(&self, client: &Client, host: &str) -> keakit::Result<()> {
        ReservationLifecycle::new(client, host)?.update(self).map(drop)
    }

    fn delete(&self, client: &Client, host: &str) -> keakit::Result<()> {
        ReservationLifecycle::new(client, host)?.delete(&self.key())
    }

    fn converged_with(&self, observed: &Self) -> bool {
        ReservationState::converged_with(self, observed)
    }
}
