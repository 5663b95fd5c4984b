//! # Shift Commands

use tracing::debug;

use crate::error::ApiError;
use crate::state::{DbState, SessionContext};
use till_core::ShiftRef;

/// Returns the session user's most recently started open shift.
pub async fn get_last_open_shift_for_current_user(
    db: &DbState,
    session: &SessionContext,
) -> Result<Option<ShiftRef>, ApiError> {
    debug!(user = %session.user(), "get_last_open_shift_for_current_user command");

    Ok(db.inner().shifts().last_open_for_user(session.user()).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use till_db::{Database, DbConfig};

    #[tokio::test]
    async fn test_latest_open_shift() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();
        db.shifts()
            .open_shift("SHIFT-A", "jane", now - Duration::hours(3))
            .await
            .unwrap();
        db.shifts().open_shift("SHIFT-B", "jane", now).await.unwrap();
        let db = DbState::new(db);

        let shift = get_last_open_shift_for_current_user(&db, &SessionContext::new("jane"))
            .await
            .unwrap();
        assert_eq!(shift, Some(ShiftRef("SHIFT-B".to_string())));

        let none = get_last_open_shift_for_current_user(&db, &SessionContext::new("sam"))
            .await
            .unwrap();
        assert_eq!(none, None);
    }
}
