use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_customers_table::Migration),
            Box::new(m20250101_000002_create_materials_table::Migration),
            Box::new(m20250101_000003_create_quotes_table::Migration),
            Box::new(m20250101_000004_create_quote_line_items_table::Migration),
            Box::new(m20250101_000005_create_jobs_table::Migration),
            Box::new(m20250101_000006_create_orders_table::Migration),
            Box::new(m20250101_000007_create_job_materials_table::Migration),
            Box::new(m20250101_000008_create_job_costs_table::Migration),
            Box::new(m20250101_000009_create_audit_records_table::Migration),
        ]
    }
}

// Migration implementations

mod m20250101_000001_create_customers_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000001_create_customers_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Customers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Customers::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Customers::Name).string().not_null())
                        .col(
                            ColumnDef::new(Customers::Email)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Customers::Phone).string().null())
                        .col(ColumnDef::new(Customers::Company).string().null())
                        .col(ColumnDef::new(Customers::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Customers::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Customers::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Customers {
        Table,
        Id,
        Name,
        Email,
        Phone,
        Company,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250101_000002_create_materials_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000002_create_materials_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Materials::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Materials::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Materials::Name).string().not_null())
                        .col(
                            ColumnDef::new(Materials::Sku)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Materials::Unit).string().not_null())
                        .col(
                            ColumnDef::new(Materials::UnitCost)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Materials::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Materials::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Materials::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Materials {
        Table,
        Id,
        Name,
        Sku,
        Unit,
        UnitCost,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250101_000003_create_quotes_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000003_create_quotes_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Quotes::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Quotes::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Quotes::QuoteNumber)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Quotes::QuoteReference).string().not_null())
                        .col(
                            ColumnDef::new(Quotes::VersionNumber)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(
                            ColumnDef::new(Quotes::IsLatestVersion)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Quotes::ParentQuoteId).uuid().null())
                        .col(ColumnDef::new(Quotes::Status).string().not_null())
                        .col(ColumnDef::new(Quotes::CustomerId).uuid().not_null())
                        .col(ColumnDef::new(Quotes::CreatedBy).uuid().not_null())
                        .col(ColumnDef::new(Quotes::Title).string().not_null())
                        .col(ColumnDef::new(Quotes::Description).string().null())
                        .col(ColumnDef::new(Quotes::ValidUntil).timestamp().null())
                        .col(
                            ColumnDef::new(Quotes::TotalAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Quotes::LeadTimeWeeks).integer().null())
                        .col(ColumnDef::new(Quotes::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Quotes::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_quotes_reference")
                        .table(Quotes::Table)
                        .col(Quotes::QuoteReference)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_quotes_customer_id")
                        .table(Quotes::Table)
                        .col(Quotes::CustomerId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Quotes::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Quotes {
        Table,
        Id,
        QuoteNumber,
        QuoteReference,
        VersionNumber,
        IsLatestVersion,
        ParentQuoteId,
        Status,
        CustomerId,
        CreatedBy,
        Title,
        Description,
        ValidUntil,
        TotalAmount,
        LeadTimeWeeks,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250101_000004_create_quote_line_items_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000004_create_quote_line_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(QuoteLineItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(QuoteLineItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(QuoteLineItems::QuoteId).uuid().not_null())
                        .col(
                            ColumnDef::new(QuoteLineItems::Description)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(QuoteLineItems::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(QuoteLineItems::UnitPrice)
                                .decimal()
                                .not_null(),
                        )
                        .col(ColumnDef::new(QuoteLineItems::MaterialId).uuid().null())
                        .col(
                            ColumnDef::new(QuoteLineItems::Position)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(QuoteLineItems::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_quote_line_items_quote_id")
                        .table(QuoteLineItems::Table)
                        .col(QuoteLineItems::QuoteId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(QuoteLineItems::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum QuoteLineItems {
        Table,
        Id,
        QuoteId,
        Description,
        Quantity,
        UnitPrice,
        MaterialId,
        Position,
        CreatedAt,
    }
}

mod m20250101_000005_create_jobs_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000005_create_jobs_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Jobs::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Jobs::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Jobs::JobNumber)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Jobs::Title).string().not_null())
                        .col(ColumnDef::new(Jobs::CustomerId).uuid().not_null())
                        .col(ColumnDef::new(Jobs::Status).string().not_null())
                        .col(ColumnDef::new(Jobs::StartDate).timestamp().not_null())
                        .col(
                            ColumnDef::new(Jobs::ExpectedEndDate)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Jobs::Description).string().null())
                        .col(ColumnDef::new(Jobs::CreatedBy).uuid().not_null())
                        .col(ColumnDef::new(Jobs::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Jobs::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_jobs_customer_id")
                        .table(Jobs::Table)
                        .col(Jobs::CustomerId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Jobs::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Jobs {
        Table,
        Id,
        JobNumber,
        Title,
        CustomerId,
        Status,
        StartDate,
        ExpectedEndDate,
        Description,
        CreatedBy,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250101_000006_create_orders_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000006_create_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Orders::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Orders::OrderNumber)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Orders::QuoteRef).string().null())
                        .col(ColumnDef::new(Orders::SourceQuoteId).uuid().null())
                        .col(ColumnDef::new(Orders::CustomerId).uuid().not_null())
                        .col(ColumnDef::new(Orders::CustomerName).string().not_null())
                        .col(ColumnDef::new(Orders::Status).string().not_null())
                        .col(ColumnDef::new(Orders::JobId).uuid().null())
                        .col(
                            ColumnDef::new(Orders::TotalAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Orders::LeadTimeWeeks).integer().null())
                        .col(ColumnDef::new(Orders::Items).json().not_null())
                        .col(ColumnDef::new(Orders::Notes).string().null())
                        .col(ColumnDef::new(Orders::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Orders::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_customer_id")
                        .table(Orders::Table)
                        .col(Orders::CustomerId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_source_quote_id")
                        .table(Orders::Table)
                        .col(Orders::SourceQuoteId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Orders {
        Table,
        Id,
        OrderNumber,
        QuoteRef,
        SourceQuoteId,
        CustomerId,
        CustomerName,
        Status,
        JobId,
        TotalAmount,
        LeadTimeWeeks,
        Items,
        Notes,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250101_000007_create_job_materials_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000007_create_job_materials_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(JobMaterials::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(JobMaterials::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(JobMaterials::JobId).uuid().not_null())
                        .col(ColumnDef::new(JobMaterials::MaterialId).uuid().not_null())
                        .col(
                            ColumnDef::new(JobMaterials::QuantityNeeded)
                                .decimal()
                                .not_null(),
                        )
                        .col(ColumnDef::new(JobMaterials::UnitCost).decimal().not_null())
                        .col(
                            ColumnDef::new(JobMaterials::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_job_materials_job_id")
                        .table(JobMaterials::Table)
                        .col(JobMaterials::JobId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(JobMaterials::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum JobMaterials {
        Table,
        Id,
        JobId,
        MaterialId,
        QuantityNeeded,
        UnitCost,
        CreatedAt,
    }
}

mod m20250101_000008_create_job_costs_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000008_create_job_costs_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(JobCosts::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(JobCosts::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(JobCosts::JobId).uuid().not_null())
                        .col(ColumnDef::new(JobCosts::Category).string().not_null())
                        .col(ColumnDef::new(JobCosts::Description).string().not_null())
                        .col(ColumnDef::new(JobCosts::Amount).decimal().not_null())
                        .col(ColumnDef::new(JobCosts::IncurredAt).timestamp().not_null())
                        .col(ColumnDef::new(JobCosts::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_job_costs_job_id")
                        .table(JobCosts::Table)
                        .col(JobCosts::JobId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(JobCosts::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum JobCosts {
        Table,
        Id,
        JobId,
        Category,
        Description,
        Amount,
        IncurredAt,
        CreatedAt,
    }
}

mod m20250101_000009_create_audit_records_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000009_create_audit_records_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(AuditRecords::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(AuditRecords::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(AuditRecords::EntityType).string().not_null())
                        .col(ColumnDef::new(AuditRecords::EntityId).uuid().not_null())
                        .col(ColumnDef::new(AuditRecords::ChangeType).string().not_null())
                        .col(ColumnDef::new(AuditRecords::ActorId).uuid().not_null())
                        .col(ColumnDef::new(AuditRecords::Reason).string().null())
                        .col(ColumnDef::new(AuditRecords::Detail).json().null())
                        .col(
                            ColumnDef::new(AuditRecords::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_audit_records_entity")
                        .table(AuditRecords::Table)
                        .col(AuditRecords::EntityType)
                        .col(AuditRecords::EntityId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(AuditRecords::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum AuditRecords {
        Table,
        Id,
        EntityType,
        EntityId,
        ChangeType,
        ActorId,
        Reason,
        Detail,
        CreatedAt,
    }
}
