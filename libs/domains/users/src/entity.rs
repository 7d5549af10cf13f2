use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;

use crate::models::{Role, User};

/// Sea-ORM Entity for the users table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub email_verified: bool,
    pub verification_token: Option<String>,
    pub verification_token_created_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub const TAG: &'static str = "auth";
}

impl From<Model> for User {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            password_hash: model.password_hash,
            role: model.role,
            email_verified: model.email_verified,
            verification_token: model.verification_token,
            verification_token_created_at: model.verification_token_created_at.map(Into::into),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

// New rows; timestamps come from column defaults
impl From<&User> for ActiveModel {
    fn from(user: &User) -> Self {
        ActiveModel {
            id: Set(user.id),
            email: Set(user.email.clone()),
            password_hash: Set(user.password_hash.clone()),
            role: Set(user.role),
            created_at: NotSet,
            updated_at: NotSet,
            ..verification_columns(user)
        }
    }
}

/// Active model touching only the verification columns
pub fn verification_columns(user: &User) -> ActiveModel {
    ActiveModel {
        email_verified: Set(user.email_verified),
        verification_token: Set(user.verification_token.clone()),
        verification_token_created_at: Set(user.verification_token_created_at.map(Into::into)),
        ..Default::default()
    }
}
