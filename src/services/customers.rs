use crate::{
    db::DbPool,
    entities::customer::{self, Entity as CustomerEntity, Model as CustomerModel},
    errors::ServiceError,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCustomerRequest {
    #[validate(length(min = 1, max = 200, message = "Customer name is required"))]
    pub name: String,
    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CustomerResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<CustomerModel> for CustomerResponse {
    fn from(model: CustomerModel) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            phone: model.phone,
            company: model.company,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Service for managing customers.
///
/// Customers are not part of the audited entity set (quote/order/job), so
/// this service never touches the audit sink.
#[derive(Clone)]
pub struct CustomerService {
    db_pool: Arc<DbPool>,
}

impl CustomerService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<CustomerResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;

        let existing = CustomerEntity::find()
            .filter(customer::Column::Email.eq(request.email.clone()))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "A customer with email {} already exists",
                request.email
            )));
        }

        let model = customer::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            email: Set(request.email),
            phone: Set(request.phone),
            company: Set(request.company),
            ..Default::default()
        };

        let saved = model.insert(db).await.map_err(|e| {
            error!(error = %e, "Failed to create customer");
            ServiceError::from(e)
        })?;

        info!(customer_id = %saved.id, "Customer created");
        Ok(saved.into())
    }

    #[instrument(skip(self), fields(customer_id = %customer_id))]
    pub async fn get_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<CustomerResponse, ServiceError> {
        let customer = CustomerEntity::find_by_id(customer_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Customer with ID {customer_id} not found"))
            })?;

        Ok(customer.into())
    }

    #[instrument(skip(self))]
    pub async fn list_customers(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<CustomerResponse>, u64), ServiceError> {
        let paginator = CustomerEntity::find()
            .order_by_desc(customer::Column::CreatedAt)
            .paginate(&*self.db_pool, per_page);

        let total = paginator.num_items().await?;
        let customers = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((customers.into_iter().map(Into::into).collect(), total))
    }

    /// Resolves a customer by email first, then by exact name; creates one
    /// when an email is supplied and nothing matches. Used by the direct
    /// job-creation path when an order carries no usable customer.
    #[instrument(skip(self))]
    pub async fn find_or_create(
        &self,
        name: Option<&str>,
        email: Option<&str>,
    ) -> Result<CustomerModel, ServiceError> {
        let db = &*self.db_pool;

        if let Some(email) = email {
            if let Some(found) = CustomerEntity::find()
                .filter(customer::Column::Email.eq(email))
                .one(db)
                .await?
            {
                return Ok(found);
            }
        }

        if let Some(name) = name {
            if let Some(found) = CustomerEntity::find()
                .filter(customer::Column::Name.eq(name))
                .one(db)
                .await?
            {
                return Ok(found);
            }
        }

        match (name, email) {
            (Some(name), Some(email)) => {
                let model = customer::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    name: Set(name.to_string()),
                    email: Set(email.to_string()),
                    phone: Set(None),
                    company: Set(None),
                    ..Default::default()
                };
                let saved = model.insert(db).await?;
                warn!(customer_id = %saved.id, "Auto-created customer during job creation");
                Ok(saved)
            }
            _ => Err(ServiceError::ValidationError(
                "Customer could not be resolved; provide customer_id or a name and email"
                    .to_string(),
            )),
        }
    }
}
