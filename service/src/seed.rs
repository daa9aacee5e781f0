//! Startup seeding of demo reservations.

use reservation_core::{Reservation, ReservationError, ReservationRepository, ReservationService};
use tracing::info;

/// Clears the store and writes the demo names once the service is wired.
pub struct SampleDataInitializer<R: ReservationRepository> {
    service: ReservationService<R>,
}

impl<R: ReservationRepository> SampleDataInitializer<R> {
    /// Seed through `service`.
    #[must_use]
    pub const fn new(service: ReservationService<R>) -> Self {
        Self { service }
    }

    /// Delete everything, save `names` as one batch, then log what is stored.
    ///
    /// Returns the reservations read back after saving.
    ///
    /// # Errors
    ///
    /// Propagates the first failure of the three steps. A validation failure
    /// leaves the store empty.
    pub async fn ready<I>(&self, names: I) -> Result<Vec<Reservation<R::Id>>, ReservationError>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let repository = self.service.repository();

        let removed = repository.delete_all().await?;
        info!(removed, "Cleared reservations");

        self.service.save_all(names).await?;

        let all = repository.find_all().await?;
        for reservation in &all {
            info!("{reservation}");
        }
        Ok(all)
    }
}
