use sea_orm_migration::sea_query::extension::postgres::Type;
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Shared by clubs and events
        manager
            .create_type(
                Type::create()
                    .as_enum(SubmissionStatus::Enum)
                    .values([
                        SubmissionStatus::Scraped,
                        SubmissionStatus::Pending,
                        SubmissionStatus::Approved,
                        SubmissionStatus::Rejected,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_type(
                Type::create()
                    .as_enum(ClubType::Enum)
                    .values([ClubType::Wusa, ClubType::Athletics, ClubType::StudentSociety])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Clubs::Table)
                    .if_not_exists()
                    .col(pk_uuid(Clubs::Id))
                    .col(string(Clubs::ClubName))
                    .col(text(Clubs::Categories))
                    .col(string_null(Clubs::ClubPage))
                    .col(string_null(Clubs::Ig))
                    .col(string_null(Clubs::Discord))
                    .col(
                        ColumnDef::new(Clubs::ClubType)
                            .enumeration(
                                ClubType::Enum,
                                [ClubType::Wusa, ClubType::Athletics, ClubType::StudentSociety],
                            )
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Clubs::Status)
                            .enumeration(
                                SubmissionStatus::Enum,
                                [
                                    SubmissionStatus::Scraped,
                                    SubmissionStatus::Pending,
                                    SubmissionStatus::Approved,
                                    SubmissionStatus::Rejected,
                                ],
                            )
                            .not_null()
                            .default("pending"),
                    )
                    .col(uuid_null(Clubs::SubmittedBy))
                    .col(timestamp_with_time_zone_null(Clubs::SubmittedAt))
                    .col(uuid_null(Clubs::ReviewedBy))
                    .col(timestamp_with_time_zone_null(Clubs::ReviewedAt))
                    .col(text_null(Clubs::RejectionReason))
                    .col(
                        timestamp_with_time_zone(Clubs::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Clubs::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_clubs_submitted_by")
                            .from(Clubs::Table, Clubs::SubmittedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_clubs_reviewed_by")
                            .from(Clubs::Table, Clubs::ReviewedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                r#"
                ALTER TABLE clubs
                    ADD CONSTRAINT chk_clubs_rejection_reason
                    CHECK (status <> 'rejected' OR btrim(coalesce(rejection_reason, '')) <> '')
                "#,
            )
            .await?;

        // Visible club names are unique regardless of case
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE UNIQUE INDEX uq_clubs_visible_name
                    ON clubs (lower(club_name))
                    WHERE status IN ('scraped', 'approved')
                "#,
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_clubs_status")
                    .table(Clubs::Table)
                    .col(Clubs::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_clubs_submitted_by")
                    .table(Clubs::Table)
                    .col(Clubs::SubmittedBy)
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TRIGGER clubs_touch_updated_at
                    BEFORE UPDATE ON clubs
                    FOR EACH ROW
                    EXECUTE FUNCTION util.touch_updated_at()
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TRIGGER IF EXISTS clubs_touch_updated_at ON clubs")
            .await?;

        manager
            .drop_table(Table::drop().table(Clubs::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(ClubType::Enum).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(SubmissionStatus::Enum).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Clubs {
    Table,
    Id,
    ClubName,
    Categories,
    ClubPage,
    Ig,
    Discord,
    ClubType,
    Status,
    SubmittedBy,
    SubmittedAt,
    ReviewedBy,
    ReviewedAt,
    RejectionReason,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum SubmissionStatus {
    #[sea_orm(iden = "submission_status")]
    Enum,
    #[sea_orm(iden = "scraped")]
    Scraped,
    #[sea_orm(iden = "pending")]
    Pending,
    #[sea_orm(iden = "approved")]
    Approved,
    #[sea_orm(iden = "rejected")]
    Rejected,
}

#[derive(DeriveIden)]
enum ClubType {
    #[sea_orm(iden = "club_type")]
    Enum,
    #[sea_orm(iden = "WUSA")]
    Wusa,
    #[sea_orm(iden = "Athletics")]
    Athletics,
    #[sea_orm(iden = "Student Society")]
    StudentSociety,
}
