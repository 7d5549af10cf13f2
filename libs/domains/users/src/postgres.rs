use async_trait::async_trait;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::entity;
use crate::error::{UserError, UserResult};
use crate::models::User;
use crate::repository::UserRepository;

/// PostgreSQL implementation of UserRepository using SeaORM
#[derive(Clone)]
pub struct PgUserRepository {
    db: DatabaseConnection,
}

impl PgUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: User) -> UserResult<User> {
        let model = entity::ActiveModel::from(&user)
            .insert(&self.db)
            .await
            .map_err(|e| match UserError::from(e) {
                UserError::DuplicateEmail(_) => UserError::DuplicateEmail(user.email.clone()),
                other => other,
            })?;

        tracing::info!(user_id = %model.id, "Created user");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let model = entity::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(User::from))
    }

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let model = entity::Entity::find()
            .filter(entity::Column::Email.eq(email))
            .one(&self.db)
            .await?;
        Ok(model.map(User::from))
    }

    async fn get_by_verification_token(&self, token: &str) -> UserResult<Option<User>> {
        let model = entity::Entity::find()
            .filter(entity::Column::VerificationToken.eq(token))
            .one(&self.db)
            .await?;
        Ok(model.map(User::from))
    }

    async fn update_verification(&self, user: &User) -> UserResult<()> {
        let mut active = entity::verification_columns(user);
        active.id = Set(user.id);
        active.update(&self.db).await.map_err(|e| match e {
            sea_orm::DbErr::RecordNotUpdated => UserError::NotFound,
            other => other.into(),
        })?;
        Ok(())
    }
}
