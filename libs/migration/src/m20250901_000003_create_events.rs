use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(pk_uuid(Events::Id))
                    .col(string_null(Events::ClubHandle))
                    .col(string_null(Events::Url))
                    .col(string(Events::Name))
                    .col(date(Events::Date))
                    .col(time(Events::StartTime))
                    .col(time_null(Events::EndTime))
                    .col(string(Events::Location))
                    .col(double_null(Events::Price))
                    .col(string_null(Events::Food))
                    .col(boolean(Events::Registration).default(false))
                    .col(string_null(Events::ImageUrl))
                    .col(text_null(Events::Description))
                    .col(json_binary_null(Events::Embedding))
                    .col(
                        timestamp_with_time_zone(Events::AddedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Events::ClubType)
                            .enumeration(
                                ClubType::Enum,
                                [ClubType::Wusa, ClubType::Athletics, ClubType::StudentSociety],
                            )
                            .null(),
                    )
                    .col(json_binary(Events::Reactions).default("{}"))
                    .col(text_null(Events::Notes))
                    .col(
                        ColumnDef::new(Events::Status)
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
                    .col(uuid_null(Events::SubmittedBy))
                    .col(timestamp_with_time_zone_null(Events::SubmittedAt))
                    .col(uuid_null(Events::ReviewedBy))
                    .col(timestamp_with_time_zone_null(Events::ReviewedAt))
                    .col(text_null(Events::RejectionReason))
                    .col(
                        timestamp_with_time_zone(Events::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_events_submitted_by")
                            .from(Events::Table, Events::SubmittedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_events_reviewed_by")
                            .from(Events::Table, Events::ReviewedBy)
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
                ALTER TABLE events
                    ADD CONSTRAINT chk_events_rejection_reason
                    CHECK (status <> 'rejected' OR btrim(coalesce(rejection_reason, '')) <> '')
                "#,
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_events_date_start_time")
                    .table(Events::Table)
                    .col(Events::Date)
                    .col(Events::StartTime)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_events_status")
                    .table(Events::Table)
                    .col(Events::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_events_submitted_by")
                    .table(Events::Table)
                    .col(Events::SubmittedBy)
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TRIGGER events_touch_updated_at
                    BEFORE UPDATE ON events
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
            .execute_unprepared("DROP TRIGGER IF EXISTS events_touch_updated_at ON events")
            .await?;

        manager
            .drop_table(Table::drop().table(Events::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Events {
    Table,
    Id,
    ClubHandle,
    Url,
    Name,
    Date,
    StartTime,
    EndTime,
    Location,
    Price,
    Food,
    Registration,
    ImageUrl,
    Description,
    Embedding,
    AddedAt,
    ClubType,
    Reactions,
    Notes,
    Status,
    SubmittedBy,
    SubmittedAt,
    ReviewedBy,
    ReviewedAt,
    RejectionReason,
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
