use std::{sync::Arc, time::Duration};

use subdesk_core::domain::repositories::{
    plans::PlanRepository, subscriptions::SubscriptionRepository, users::UserRepository,
};
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tracing::{debug, error, info};

use crate::usecases::subscriptions::SubscriptionUseCase;

/// Starts the periodic lapsed-subscription sweep. Returns `None` when `interval_secs` is 0.
pub fn spawn<S, P, U>(
    subscription_usecase: Arc<SubscriptionUseCase<S, P, U>>,
    interval_secs: u64,
) -> Option<JoinHandle<()>>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    if interval_secs == 0 {
        info!("expiry_sweeper: disabled");
        return None;
    }

    info!(interval_secs, "expiry_sweeper: starting");
    Some(tokio::spawn(sweep_loop(
        subscription_usecase,
        Duration::from_secs(interval_secs),
    )))
}

async fn sweep_loop<S, P, U>(subscription_usecase: Arc<SubscriptionUseCase<S, P, U>>, period: Duration)
where
    S: SubscriptionRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        run_once(&subscription_usecase).await;
    }
}

async fn run_once<S, P, U>(subscription_usecase: &SubscriptionUseCase<S, P, U>) -> usize
where
    S: SubscriptionRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    match subscription_usecase.sweep_lapsed().await {
        Ok(0) => {
            debug!("expiry_sweeper: nothing to expire");
            0
        }
        Ok(expired) => {
            info!(expired, "expiry_sweeper: expired lapsed subscriptions");
            expired
        }
        Err(err) => {
            error!(error = ?err, "expiry_sweeper: sweep failed");
            0
        }
    }
}
