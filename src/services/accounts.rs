use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::{
    db::DbPool,
    entities::{customer, employee, manager, user_account, UserRole},
    errors::ServiceError,
    events::{Event, EventSender},
};

/// Fullname sentinel for accounts that have no customer profile row.
const UNKNOWN_FULLNAME: &str = "Unknown";

/// Flattened view combining a login row with its role-selected profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Identity {
    pub id: i32,
    pub fullname: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

/// Read-side account view used by customer-facing profile pages. The
/// profile half may be missing; readers degrade instead of failing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerAccountView {
    pub id: i32,
    pub fullname: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub dob: Option<NaiveDate>,
    pub role: Option<UserRole>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewAccount {
    pub id: i32,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCustomerProfile {
    pub fullname: String,
}

/// Merged post-update view returned by [`AccountService::update_profile`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdatedProfile {
    pub id: i32,
    pub email: String,
    pub phone: Option<String>,
    pub fullname: String,
    pub address: Option<String>,
}

/// Employee view joining the login row with the employee profile. Carries
/// both the login email and the profile-local contact email.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeView {
    pub id: i32,
    pub fullname: String,
    pub login_email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub dob: Option<NaiveDate>,
    pub hire_date: Option<NaiveDate>,
    pub avatar: Option<String>,
    pub department: Option<String>,
    pub email: Option<String>,
    pub role: UserRole,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManagerView {
    pub id: i32,
    pub fullname: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub dob: Option<NaiveDate>,
    pub avatar: Option<String>,
    pub department: Option<String>,
    pub role: UserRole,
}

/// Fields accepted by the atomic profile update.
///
/// `dob` is partial: `None` leaves the stored date of birth untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateProfileInput {
    pub id: i32,
    pub email: String,
    pub phone: Option<String>,
    pub name: String,
    pub address: Option<String>,
    pub dob: Option<NaiveDate>,
}

/// Account directory: identity resolution across the login table and the
/// three role-specific profile tables, plus credential access.
#[derive(Clone)]
pub struct AccountService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl AccountService {
    /// Creates a new account service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Resolves a login row by email, then dispatches to the profile table
    /// selected by its role.
    ///
    /// Returns `Ok(None)` when the login row is missing, when the stored
    /// role maps to no known profile kind, or when the profile row itself is
    /// absent. The latter two are integrity gaps; they degrade to not-found
    /// so referential corruption cannot crash the caller.
    #[instrument(skip(self))]
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, ServiceError> {
        let db = &*self.db_pool;

        let Some(account) = user_account::Entity::find()
            .filter(user_account::Column::Email.eq(email))
            .one(db)
            .await?
        else {
            return Ok(None);
        };

        let Some(role) = UserRole::from_id(account.role_id) else {
            warn!(
                account_id = account.id,
                role_id = account.role_id,
                "login row carries an unknown role"
            );
            return Ok(None);
        };

        let fullname = match role {
            UserRole::Customer => customer::Entity::find_by_id(account.id)
                .one(db)
                .await?
                .map(|profile| profile.fullname),
            UserRole::Employee => employee::Entity::find_by_id(account.id)
                .one(db)
                .await?
                .map(|profile| profile.fullname),
            UserRole::Manager => manager::Entity::find_by_id(account.id)
                .one(db)
                .await?
                .map(|profile| profile.fullname),
        };

        let Some(fullname) = fullname else {
            warn!(account_id = account.id, ?role, "login row has no profile row");
            return Ok(None);
        };

        Ok(Some(Identity {
            id: account.id,
            fullname,
            email: account.email,
            password: account.password,
            role,
        }))
    }

    /// Role-named alias kept for callers that authenticate staff flows.
    pub async fn find_employee_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Identity>, ServiceError> {
        self.find_by_email(email).await
    }

    /// Role-named alias kept for callers that authenticate staff flows.
    pub async fn find_manager_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Identity>, ServiceError> {
        self.find_by_email(email).await
    }

    /// Resolves a login row by id and left-joins the customer profile.
    ///
    /// Unlike [`find_by_email`](Self::find_by_email) this read degrades
    /// gracefully: a missing profile yields the `"Unknown"` fullname
    /// sentinel instead of not-found.
    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: i32) -> Result<Option<CustomerAccountView>, ServiceError> {
        let db = &*self.db_pool;

        let Some((account, profile)) = user_account::Entity::find_by_id(id)
            .find_also_related(customer::Entity)
            .one(db)
            .await?
        else {
            return Ok(None);
        };

        let (fullname, address, dob) = match profile {
            Some(profile) => (profile.fullname, profile.address, profile.dob),
            None => (UNKNOWN_FULLNAME.to_string(), None, None),
        };

        Ok(Some(CustomerAccountView {
            id: account.id,
            fullname,
            email: account.email,
            phone: account.phone,
            address,
            dob,
            role: UserRole::from_id(account.role_id),
        }))
    }

    /// Inserts a new login row with the customer role and a server-assigned
    /// creation timestamp.
    ///
    /// Generic over the connection so a sign-up flow can run it on the same
    /// transaction as the subsequent profile insert.
    #[instrument(skip(self, conn, password))]
    pub async fn sign_up<C>(
        &self,
        conn: &C,
        email: &str,
        password: &str,
    ) -> Result<NewAccount, ServiceError>
    where
        C: ConnectionTrait,
    {
        let account = user_account::ActiveModel {
            email: Set(email.to_string()),
            password: Set(password.to_string()),
            role_id: Set(UserRole::Customer.id()),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        let inserted = account.insert(conn).await?;

        info!(account_id = inserted.id, "login row created");

        Ok(NewAccount {
            id: inserted.id,
            email: inserted.email,
        })
    }

    /// Inserts the customer profile row for an existing login.
    #[instrument(skip(self, conn))]
    pub async fn add_customer_profile<C>(
        &self,
        conn: &C,
        user_id: i32,
        fullname: &str,
    ) -> Result<NewCustomerProfile, ServiceError>
    where
        C: ConnectionTrait,
    {
        let profile = customer::ActiveModel {
            user_id: Set(user_id),
            fullname: Set(fullname.to_string()),
            ..Default::default()
        };

        let inserted = profile.insert(conn).await?;

        Ok(NewCustomerProfile {
            fullname: inserted.fullname,
        })
    }

    /// Sign-up flow: login row plus customer profile in one transaction.
    /// Either both rows exist afterward or neither does.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        fullname: &str,
    ) -> Result<NewAccount, ServiceError> {
        let txn = self.db_pool.begin().await?;

        let account = self.sign_up(&txn, email, password).await?;
        self.add_customer_profile(&txn, account.id, fullname).await?;

        txn.commit().await?;

        self.event_sender
            .send(Event::AccountCreated(account.id))
            .await
            .map_err(ServiceError::EventError)?;

        info!(account_id = account.id, "customer registered");

        Ok(account)
    }

    /// Atomic two-table profile update.
    ///
    /// Within one transaction: login email/phone plus the update timestamp,
    /// profile fullname/address, and dob only when a value was supplied.
    /// A failure in any step rolls back all of them; no caller observes a
    /// half-applied update.
    #[instrument(skip(self, input), fields(account_id = input.id))]
    pub async fn update_profile(
        &self,
        input: UpdateProfileInput,
    ) -> Result<UpdatedProfile, ServiceError> {
        let txn = self.db_pool.begin().await?;

        let account = user_account::Entity::find_by_id(input.id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Account {} not found", input.id)))?;

        let mut account: user_account::ActiveModel = account.into();
        account.email = Set(input.email);
        account.phone = Set(input.phone);
        account.updated_at = Set(Some(Utc::now()));
        let account = account.update(&txn).await?;

        let profile = customer::Entity::find_by_id(input.id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Customer profile for account {} not found",
                    input.id
                ))
            })?;

        let mut profile: customer::ActiveModel = profile.into();
        profile.fullname = Set(input.name);
        profile.address = Set(input.address);
        if let Some(dob) = input.dob {
            profile.dob = Set(Some(dob));
        }
        let profile = profile.update(&txn).await?;

        txn.commit().await?;

        self.event_sender
            .send(Event::ProfileUpdated(account.id))
            .await
            .map_err(ServiceError::EventError)?;

        info!(account_id = account.id, "profile updated");

        Ok(UpdatedProfile {
            id: account.id,
            email: account.email,
            phone: account.phone,
            fullname: profile.fullname,
            address: profile.address,
        })
    }

    /// Inner-join lookup: both the login row and the employee profile must
    /// exist, otherwise `Ok(None)`. Staff records are provisioned by
    /// administrative action, so a missing half is genuinely not-found.
    #[instrument(skip(self))]
    pub async fn find_employee_by_id(
        &self,
        id: i32,
    ) -> Result<Option<EmployeeView>, ServiceError> {
        let db = &*self.db_pool;

        let Some((account, profile)) = user_account::Entity::find_by_id(id)
            .find_also_related(employee::Entity)
            .one(db)
            .await?
        else {
            return Ok(None);
        };

        let Some(profile) = profile else {
            return Ok(None);
        };

        Ok(Some(EmployeeView {
            id: account.id,
            fullname: profile.fullname,
            login_email: account.email,
            phone: account.phone,
            address: profile.address,
            dob: profile.dob,
            hire_date: profile.hire_date,
            avatar: profile.avatar,
            department: profile.department,
            email: profile.email,
            role: UserRole::Employee,
        }))
    }

    /// Inner-join lookup for managers; same strictness as
    /// [`find_employee_by_id`](Self::find_employee_by_id).
    #[instrument(skip(self))]
    pub async fn find_manager_by_id(&self, id: i32) -> Result<Option<ManagerView>, ServiceError> {
        let db = &*self.db_pool;

        let Some((account, profile)) = user_account::Entity::find_by_id(id)
            .find_also_related(manager::Entity)
            .one(db)
            .await?
        else {
            return Ok(None);
        };

        let Some(profile) = profile else {
            return Ok(None);
        };

        Ok(Some(ManagerView {
            id: account.id,
            fullname: profile.fullname,
            email: account.email,
            phone: account.phone,
            address: profile.address,
            dob: profile.dob,
            avatar: profile.avatar,
            department: profile.department,
            role: UserRole::Manager,
        }))
    }

    /// Fetches the stored password hash for an account.
    #[instrument(skip(self))]
    pub async fn get_password(&self, id: i32) -> Result<Option<String>, ServiceError> {
        let db = &*self.db_pool;

        let password = user_account::Entity::find_by_id(id)
            .select_only()
            .column(user_account::Column::Password)
            .into_tuple::<String>()
            .one(db)
            .await?;

        Ok(password)
    }

    /// Unconditionally overwrites the stored password hash and touches the
    /// update timestamp. Current-password verification belongs to the
    /// calling authentication flow.
    #[instrument(skip(self, new_password))]
    pub async fn change_password(&self, id: i32, new_password: &str) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        user_account::Entity::update_many()
            .col_expr(user_account::Column::Password, Expr::value(new_password))
            .col_expr(user_account::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(user_account::Column::Id.eq(id))
            .exec(db)
            .await?;

        self.event_sender
            .send(Event::PasswordChanged(id))
            .await
            .map_err(ServiceError::EventError)?;

        info!(account_id = id, "password changed");

        Ok(())
    }
}
