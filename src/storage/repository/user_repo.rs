use crate::storage::entity::user::{
    self, ActiveModel as UserActiveModel, Entity as User, Model as UserModel, Role,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

pub struct UserRepository;

impl UserRepository {
    pub async fn create(db: &DatabaseConnection, new: NewUser) -> Result<UserModel, sea_orm::DbErr> {
        let now = Utc::now().timestamp_millis();
        UserActiveModel {
            email: Set(new.email),
            name: Set(new.name),
            role: Set(new.role.unwrap_or(Role::Leader)),
            is_active: Set(new.is_active.unwrap_or(true)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    pub async fn find_by_id(
        db: &DatabaseConnection,
        id: i32,
    ) -> Result<Option<UserModel>, sea_orm::DbErr> {
        User::find_by_id(id).one(db).await
    }

    pub async fn find_by_email(
        db: &DatabaseConnection,
        email: &str,
    ) -> Result<Option<UserModel>, sea_orm::DbErr> {
        User::find()
            .filter(user::Column::Email.eq(email.to_string()))
            .one(db)
            .await
    }

    pub async fn list(
        db: &DatabaseConnection,
        role: Option<Role>,
        is_active: Option<bool>,
    ) -> Result<Vec<UserModel>, sea_orm::DbErr> {
        let mut query = User::find();
        if let Some(r) = role {
            query = query.filter(user::Column::Role.eq(r));
        }
        if let Some(a) = is_active {
            query = query.filter(user::Column::IsActive.eq(a));
        }
        query
            .order_by_asc(user::Column::CreatedAt)
            .order_by_asc(user::Column::Id)
            .all(db)
            .await
    }

    pub async fn count(db: &DatabaseConnection) -> Result<u64, sea_orm::DbErr> {
        User::find().count(db).await
    }

    pub async fn update(
        db: &DatabaseConnection,
        model: UserModel,
        patch: UserPatch,
    ) -> Result<UserModel, sea_orm::DbErr> {
        let mut am: UserActiveModel = model.into();
        if let Some(email) = patch.email {
            am.email = Set(email);
        }
        if let Some(name) = patch.name {
            am.name = Set(name);
        }
        if let Some(role) = patch.role {
            am.role = Set(role);
        }
        if let Some(active) = patch.is_active {
            am.is_active = Set(active);
        }
        am.updated_at = Set(Utc::now().timestamp_millis());
        am.update(db).await
    }

    pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<u64, sea_orm::DbErr> {
        let res = User::delete_by_id(id).exec(db).await?;
        Ok(res.rows_affected)
    }
}
