use shared::{
    ApproveClaimResponse, ClaimStatus, NumberConflictNotice, PaymentClaim, PendingClaimsResponse,
    RejectClaimResponse, SubmitClaimResponse,
};

use crate::domain::commands::claims::{ApproveClaimResult, NumberConflict, RejectClaimResult};
use crate::domain::models::payment_claim::{
    ClaimStatus as DomainClaimStatus, PaymentClaim as DomainPaymentClaim,
};
use crate::io::rest::mappers::ticket_mapper::TicketMapper;

pub struct ClaimMapper;

impl ClaimMapper {
    /// Convert domain ClaimStatus to shared ClaimStatus
    pub fn status_to_dto(status: DomainClaimStatus) -> ClaimStatus {
        match status {
            DomainClaimStatus::Pending => ClaimStatus::Pending,
            DomainClaimStatus::Approved => ClaimStatus::Approved,
            DomainClaimStatus::Rejected => ClaimStatus::Rejected,
        }
    }

    /// Convert a domain claim to its DTO
    pub fn to_dto(claim: DomainPaymentClaim) -> PaymentClaim {
        PaymentClaim {
            id: claim.id,
            user_id: claim.member_id,
            amount: claim.amount,
            requested_number: claim.requested_number,
            cycle: claim.cycle,
            status: Self::status_to_dto(claim.status),
            created_at: claim.created_at.to_rfc3339(),
            processed_at: claim.processed_at.map(|t| t.to_rfc3339()),
        }
    }

    pub fn to_submit_response(claim: DomainPaymentClaim) -> SubmitClaimResponse {
        SubmitClaimResponse {
            claim: Self::to_dto(claim),
            success_message: "Payment recorded; an admin will review it shortly".to_string(),
        }
    }

    pub fn to_pending_response(claims: Vec<DomainPaymentClaim>) -> PendingClaimsResponse {
        PendingClaimsResponse {
            claims: claims.into_iter().map(Self::to_dto).collect(),
        }
    }

    pub fn to_approve_response(result: ApproveClaimResult) -> ApproveClaimResponse {
        let conflict = result.conflict.map(Self::conflict_to_dto);
        let number = result.ticket.number;
        ApproveClaimResponse {
            claim: Self::to_dto(result.claim),
            ticket: TicketMapper::to_dto(result.ticket),
            conflict,
            success_message: format!("Claim approved; lucky number {} is confirmed", number),
        }
    }

    pub fn to_reject_response(result: RejectClaimResult) -> RejectClaimResponse {
        RejectClaimResponse {
            claim: Self::to_dto(result.claim),
            success_message: "Claim rejected; any held number was released".to_string(),
        }
    }

    fn conflict_to_dto(conflict: NumberConflict) -> NumberConflictNotice {
        NumberConflictNotice {
            requested_number: conflict.requested_number,
            assigned_number: conflict.assigned_number,
            message: format!(
                "Number {} was already taken; number {} was assigned instead",
                conflict.requested_number, conflict.assigned_number
            ),
        }
    }
}
