pub mod audit_record;
pub mod customer;
pub mod job;
pub mod job_cost;
pub mod job_material;
pub mod material;
pub mod order;
pub mod quote;
pub mod quote_line_item;

pub use audit_record::Entity as AuditRecord;
pub use customer::Entity as Customer;
pub use job::Entity as Job;
pub use job_cost::Entity as JobCost;
pub use job_material::Entity as JobMaterial;
pub use material::Entity as Material;
pub use order::Entity as Order;
pub use quote::Entity as Quote;
pub use quote_line_item::Entity as QuoteLineItem;
