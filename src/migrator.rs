use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_useraccount_table::Migration),
            Box::new(m20240101_000002_create_profile_tables::Migration),
            Box::new(m20240101_000003_create_category_table::Migration),
            Box::new(m20240101_000004_create_product_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_useraccount_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_useraccount_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(UserAccount::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(UserAccount::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(UserAccount::Email)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(UserAccount::Password).string().not_null())
                        .col(ColumnDef::new(UserAccount::Phone).string())
                        .col(ColumnDef::new(UserAccount::RoleId).integer().not_null())
                        .col(
                            ColumnDef::new(UserAccount::Createdat)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(UserAccount::Updatedat).timestamp_with_time_zone())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(UserAccount::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum UserAccount {
        #[sea_orm(iden = "useraccount")]
        Table,
        Id,
        Email,
        Password,
        Phone,
        RoleId,
        Createdat,
        Updatedat,
    }
}

mod m20240101_000002_create_profile_tables {

    use sea_orm_migration::prelude::*;

    use super::m20240101_000001_create_useraccount_table::UserAccount;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_profile_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Customer::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Customer::UserId)
                                .integer()
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Customer::Fullname).string().not_null())
                        .col(ColumnDef::new(Customer::Address).string())
                        .col(ColumnDef::new(Customer::Dob).date())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_customer_user")
                                .from(Customer::Table, Customer::UserId)
                                .to(UserAccount::Table, UserAccount::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Employee::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Employee::UserId)
                                .integer()
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Employee::Fullname).string().not_null())
                        .col(ColumnDef::new(Employee::Address).string())
                        .col(ColumnDef::new(Employee::Dob).date())
                        .col(ColumnDef::new(Employee::HireDate).date())
                        .col(ColumnDef::new(Employee::Avatar).string())
                        .col(ColumnDef::new(Employee::Department).string())
                        .col(ColumnDef::new(Employee::Email).string())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_employee_user")
                                .from(Employee::Table, Employee::UserId)
                                .to(UserAccount::Table, UserAccount::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Manager::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Manager::UserId)
                                .integer()
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Manager::Fullname).string().not_null())
                        .col(ColumnDef::new(Manager::Address).string())
                        .col(ColumnDef::new(Manager::Dob).date())
                        .col(ColumnDef::new(Manager::Avatar).string())
                        .col(ColumnDef::new(Manager::Department).string())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_manager_user")
                                .from(Manager::Table, Manager::UserId)
                                .to(UserAccount::Table, UserAccount::Id),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Manager::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Employee::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Customer::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Customer {
        Table,
        UserId,
        Fullname,
        Address,
        Dob,
    }

    #[derive(DeriveIden)]
    enum Employee {
        Table,
        UserId,
        Fullname,
        Address,
        Dob,
        HireDate,
        Avatar,
        Department,
        Email,
    }

    #[derive(DeriveIden)]
    enum Manager {
        Table,
        UserId,
        Fullname,
        Address,
        Dob,
        Avatar,
        Department,
    }
}

mod m20240101_000003_create_category_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_category_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Category::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Category::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Category::Name)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Category::Slug).string().not_null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Category::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Category {
        Table,
        Id,
        Name,
        Slug,
    }
}

mod m20240101_000004_create_product_table {

    use sea_orm_migration::prelude::*;

    use super::m20240101_000003_create_category_table::Category;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_product_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Product::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Product::Id).string().not_null().primary_key())
                        .col(ColumnDef::new(Product::Name).string().not_null())
                        .col(ColumnDef::new(Product::CategoryId).integer().not_null())
                        .col(
                            ColumnDef::new(Product::Price)
                                .decimal_len(10, 2)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Product::Stock).integer().not_null())
                        .col(ColumnDef::new(Product::Description).text())
                        .col(ColumnDef::new(Product::Status).string())
                        .col(ColumnDef::new(Product::Images).text())
                        .col(ColumnDef::new(Product::Ingredients).text())
                        .col(ColumnDef::new(Product::NutritionInfo).text())
                        .col(ColumnDef::new(Product::ProvideId).integer().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_product_category")
                                .from(Product::Table, Product::CategoryId)
                                .to(Category::Table, Category::Id),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Product::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Product {
        Table,
        Id,
        Name,
        CategoryId,
        Price,
        Stock,
        Description,
        Status,
        Images,
        Ingredients,
        NutritionInfo,
        ProvideId,
    }
}
