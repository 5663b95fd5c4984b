//! # POS Defaults Commands

use tracing::debug;

use crate::error::ApiError;
use crate::state::{DbState, SessionContext};
use till_core::UserPosDefaults;

/// Returns the cost center and price list mapped to the session user, or
/// `None` when no administrator has mapped them yet.
pub async fn get_pos_user_defaults(
    db: &DbState,
    session: &SessionContext,
) -> Result<Option<UserPosDefaults>, ApiError> {
    debug!(user = %session.user(), "get_pos_user_defaults command");

    Ok(db.inner().pos_settings().user_defaults(session.user()).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use till_db::{Database, DbConfig};

    #[tokio::test]
    async fn test_defaults_for_mapped_and_unmapped_users() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let defaults = UserPosDefaults {
            cost_center: "Main".to_string(),
            price_list: Some("Standard".to_string()),
        };
        db.pos_settings().map_user("jane", &defaults).await.unwrap();
        let db = DbState::new(db);

        let found = get_pos_user_defaults(&db, &SessionContext::new("jane")).await.unwrap();
        assert_eq!(found, Some(defaults));

        let missing = get_pos_user_defaults(&db, &SessionContext::new("sam")).await.unwrap();
        assert_eq!(missing, None);
    }
}
