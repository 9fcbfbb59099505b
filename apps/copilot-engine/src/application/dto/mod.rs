//! Data Transfer Objects (DTOs)
//!
//! DTOs are used for API boundaries and use case inputs/outputs.

mod request_dto;
mod response_dto;

pub use request_dto::{DecisionRequest, ExecutePlanRequest, ProposePlanRequest};
pub use response_dto::{
    AuditTrailDto, DecisionResponseDto, ExecutionResultDto, PlanStatusDto, PlanView,
};
