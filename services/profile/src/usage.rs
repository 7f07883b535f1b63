//! Daily generation usage

use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use common::{error::DatabaseResult, time::DayWindow};

use crate::{models::UserId, repositories::ProfileRepository};

/// Counts a user's creations in the current local calendar day
#[derive(Clone)]
pub struct UsageCounter {
    repository: Arc<dyn ProfileRepository>,
    timezone: Tz,
}

impl UsageCounter {
    pub fn new(repository: Arc<dyn ProfileRepository>, timezone: Tz) -> Self {
        Self {
            repository,
            timezone,
        }
    }

    /// Creations made today in the reference timezone
    pub async fn count_today(&self, user_id: UserId) -> DatabaseResult<u32> {
        self.count_on(user_id, Utc::now()).await
    }

    /// Creations made on the local day containing `instant`
    pub async fn count_on(&self, user_id: UserId, instant: DateTime<Utc>) -> DatabaseResult<u32> {
        let window = DayWindow::containing(instant, self.timezone);
        self.repository.count_creations_today(user_id, window).await
    }
}
