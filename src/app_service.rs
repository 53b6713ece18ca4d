use crate::config::BootstrapAdmin;
use crate::error::AppResult;
use crate::storage::entity::application::Model as ApplicationModel;
use crate::storage::entity::opening::Model as OpeningModel;
use crate::storage::entity::user::Role;
use crate::storage::repository::{ApplicationRepository, NewUser, OpeningRepository, UserRepository};
use log::info;
use sea_orm::DatabaseConnection;
use serde::Serialize;

const RECENT_LIMIT: u64 = 5;
const TOP_LIMIT: u64 = 5;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopOpening {
    pub opening: OpeningModel,
    pub application_count: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_openings: u64,
    pub active_openings: u64,
    pub total_applications: u64,
    pub recent_applications: Vec<ApplicationModel>,
    pub top_openings: Vec<TopOpening>,
}

pub async fn dashboard_stats(db: &DatabaseConnection) -> AppResult<DashboardStats> {
    let total_openings = OpeningRepository::count(db, false).await?;
    let active_openings = OpeningRepository::count(db, true).await?;
    let total_applications = ApplicationRepository::count(db, None).await?;
    let recent_applications = ApplicationRepository::recent(db, RECENT_LIMIT).await?;

    let mut top_openings = Vec::new();
    for row in ApplicationRepository::top_openings(db, TOP_LIMIT).await? {
        // An opening deleted between the two reads simply drops out.
        if let Some(opening) = OpeningRepository::find_by_id(db, row.opening_id).await? {
            top_openings.push(TopOpening {
                opening,
                application_count: row.count.max(0) as u64,
            });
        }
    }

    Ok(DashboardStats {
        total_openings,
        active_openings,
        total_applications,
        recent_applications,
        top_openings,
    })
}

pub async fn my_openings(db: &DatabaseConnection, user_id: i32) -> AppResult<Vec<OpeningModel>> {
    Ok(OpeningRepository::list_by_creator(db, user_id).await?)
}

/// Creates the first ADMIN when the users table is empty. Returns whether one was created.
pub async fn bootstrap_admin(db: &DatabaseConnection, admin: &BootstrapAdmin) -> AppResult<bool> {
    if UserRepository::count(db).await? > 0 {
        return Ok(false);
    }
    let user = UserRepository::create(
        db,
        NewUser {
            email: admin.email.trim().to_lowercase(),
            name: admin.name.clone(),
            role: Some(Role::Admin),
            is_active: Some(true),
        },
    )
    .await?;
    info!("bootstrap admin {} created with id {}", user.email, user.id);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::connection::connect_in_memory;
    use crate::storage::entity::application::YearOfStudy;
    use crate::test_support::{seed_admin, seed_form, seed_leader, seed_opening, submit};

    #[tokio::test]
    async fn stats_rank_openings_by_application_count() {
        let db = connect_in_memory().await;
        let admin = seed_admin(&db).await;
        let quiet = seed_opening(&db, admin.id, true).await;
        let busy = seed_opening(&db, admin.id, false).await;
        let quiet_schema = seed_form(&db, &quiet, admin.id, false, vec![]).await;
        let busy_schema = seed_form(&db, &busy, admin.id, false, vec![]).await;

        submit(&db, &quiet_schema, "q@example.com", "CS", YearOfStudy::First, vec![]).await;
        for i in 0..3 {
            submit(&db, &busy_schema, &format!("b{i}@example.com"), "IT", YearOfStudy::Second, vec![]).await;
        }

        let stats = dashboard_stats(&db).await.unwrap();
        assert_eq!(stats.total_openings, 2);
        assert_eq!(stats.active_openings, 1);
        assert_eq!(stats.total_applications, 4);
        assert_eq!(stats.recent_applications.len(), 4);
        assert_eq!(stats.top_openings[0].opening.id, busy.id);
        assert_eq!(stats.top_openings[0].application_count, 3);
        assert_eq!(stats.top_openings[1].application_count, 1);
    }

    #[tokio::test]
    async fn bootstrap_admin_only_seeds_an_empty_store() {
        let db = connect_in_memory().await;
        let cfg = BootstrapAdmin {
            email: "Root@Example.com".into(),
            name: "Root".into(),
        };
        assert!(bootstrap_admin(&db, &cfg).await.unwrap());
        assert!(!bootstrap_admin(&db, &cfg).await.unwrap());

        let root = UserRepository::find_by_email(&db, "root@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(root.role, Role::Admin);
        assert_eq!(UserRepository::count(&db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn my_openings_only_lists_own() {
        let db = connect_in_memory().await;
        let admin = seed_admin(&db).await;
        let leader = seed_leader(&db, "lead@example.com").await;
        seed_opening(&db, admin.id, true).await;
        let mine = seed_opening(&db, leader.id, true).await;

        let listed = my_openings(&db, leader.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, mine.id);
    }
}
