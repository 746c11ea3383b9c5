//! Transition tables for the quote, order, and job state machines.

use rstest::rstest;
use shopflow_api::entities::job::JobStatus;
use shopflow_api::entities::order::OrderStatus;
use shopflow_api::entities::quote::QuoteStatus;

#[rstest]
#[case(QuoteStatus::Draft, QuoteStatus::Sent, true)]
#[case(QuoteStatus::Draft, QuoteStatus::Approved, true)]
#[case(QuoteStatus::Sent, QuoteStatus::Declined, true)]
#[case(QuoteStatus::Pending, QuoteStatus::Approved, true)]
#[case(QuoteStatus::Approved, QuoteStatus::Converted, true)]
#[case(QuoteStatus::Draft, QuoteStatus::Converted, false)]
#[case(QuoteStatus::Draft, QuoteStatus::Declined, false)]
#[case(QuoteStatus::Converted, QuoteStatus::Draft, false)]
#[case(QuoteStatus::Declined, QuoteStatus::Approved, false)]
#[case(QuoteStatus::Expired, QuoteStatus::Sent, false)]
fn quote_transitions(
    #[case] from: QuoteStatus,
    #[case] to: QuoteStatus,
    #[case] allowed: bool,
) {
    assert_eq!(from.can_transition_to(to), allowed, "{from:?} -> {to:?}");
}

#[rstest]
#[case(OrderStatus::Draft, OrderStatus::PendingApproval, true)]
#[case(OrderStatus::PendingApproval, OrderStatus::Approved, true)]
#[case(OrderStatus::Approved, OrderStatus::InProduction, true)]
#[case(OrderStatus::InProduction, OrderStatus::OnHold, true)]
#[case(OrderStatus::OnHold, OrderStatus::InProduction, true)]
#[case(OrderStatus::InProduction, OrderStatus::ReadyForDelivery, true)]
#[case(OrderStatus::ReadyForDelivery, OrderStatus::Completed, true)]
#[case(OrderStatus::Draft, OrderStatus::Cancelled, true)]
#[case(OrderStatus::ReadyForDelivery, OrderStatus::Cancelled, true)]
#[case(OrderStatus::Completed, OrderStatus::Cancelled, false)]
#[case(OrderStatus::Draft, OrderStatus::InProduction, false)]
#[case(OrderStatus::InProduction, OrderStatus::Approved, false)]
#[case(OrderStatus::Cancelled, OrderStatus::Draft, false)]
fn order_transitions(
    #[case] from: OrderStatus,
    #[case] to: OrderStatus,
    #[case] allowed: bool,
) {
    assert_eq!(from.can_transition_to(to), allowed, "{from:?} -> {to:?}");
}

#[rstest]
#[case(JobStatus::Draft, JobStatus::Pending, true)]
#[case(JobStatus::Draft, JobStatus::Active, true)]
#[case(JobStatus::Pending, JobStatus::Active, true)]
#[case(JobStatus::Active, JobStatus::Completed, true)]
#[case(JobStatus::Active, JobStatus::Canceled, true)]
#[case(JobStatus::Draft, JobStatus::Completed, false)]
#[case(JobStatus::Completed, JobStatus::Canceled, false)]
#[case(JobStatus::Canceled, JobStatus::Active, false)]
fn job_transitions(#[case] from: JobStatus, #[case] to: JobStatus, #[case] allowed: bool) {
    assert_eq!(from.can_transition_to(to), allowed, "{from:?} -> {to:?}");
}
