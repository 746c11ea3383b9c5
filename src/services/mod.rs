pub mod audit_trail;
pub mod conversion;
pub mod customers;
pub mod jobs;
pub mod materials;
pub mod orders;
pub mod quotes;

use std::sync::Arc;
use uuid::Uuid;

use crate::audit::AuditSink;
use crate::db::DbPool;

/// Services layer that encapsulates business logic used by HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub customers: Arc<customers::CustomerService>,
    pub materials: Arc<materials::MaterialService>,
    pub quotes: Arc<quotes::QuoteService>,
    pub orders: Arc<orders::OrderService>,
    pub jobs: Arc<jobs::JobService>,
    pub conversion: Arc<conversion::ConversionService>,
    pub audit_trail: Arc<audit_trail::AuditTrailService>,
}

impl AppServices {
    pub fn new(
        db_pool: Arc<DbPool>,
        audit: Arc<dyn AuditSink>,
        default_lead_time_days: i64,
    ) -> Self {
        let customers = Arc::new(customers::CustomerService::new(db_pool.clone()));
        let materials = Arc::new(materials::MaterialService::new(db_pool.clone()));
        let quotes = Arc::new(quotes::QuoteService::new(db_pool.clone(), audit.clone()));
        let orders = Arc::new(orders::OrderService::new(db_pool.clone(), audit.clone()));
        let jobs = Arc::new(jobs::JobService::new(db_pool.clone(), audit.clone()));
        let conversion = Arc::new(conversion::ConversionService::new(
            db_pool.clone(),
            audit,
            default_lead_time_days,
        ));
        let audit_trail = Arc::new(audit_trail::AuditTrailService::new(db_pool));

        Self {
            customers,
            materials,
            quotes,
            orders,
            jobs,
            conversion,
            audit_trail,
        }
    }
}

/// Generates a short human-facing document number, e.g. `Q-4F9A21C3`.
pub(crate) fn generate_number(prefix: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{}-{}", prefix, id[..8].to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_numbers_carry_the_prefix() {
        let number = generate_number("Q");
        assert!(number.starts_with("Q-"));
        assert_eq!(number.len(), 10);

        let other = generate_number("Q");
        assert_ne!(number, other);
    }
}
