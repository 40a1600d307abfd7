//! A fixed-length sleep, used to compare real and virtual clocks.

use std::time::Duration;
use tour_env::TourContext;
use tracing::debug;

/// Default nap length.
pub const NAP: Duration = Duration::from_secs(5);

/// Sleeps [`NAP`] on the context's clock.
pub async fn nap<Ctx: TourContext>(ctx: &Ctx) {
    nap_for(ctx, NAP).await;
}

/// Sleeps `duration` on the context's clock.
pub async fn nap_for<Ctx: TourContext>(ctx: &Ctx, duration: Duration) {
    debug!(?duration, virtual_time = ctx.is_virtual(), "napping");
    ctx.sleep(duration).await;
}
