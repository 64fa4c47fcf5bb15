use shared::{Member, MemberListResponse, MemberOverviewResponse, MemberResponse, MemberStatus};

use crate::domain::commands::members::MemberOverviewResult;
use crate::domain::models::member::{
    Member as DomainMember, MemberStatus as DomainMemberStatus,
};

pub struct MemberMapper;

impl MemberMapper {
    /// Convert domain MemberStatus to shared MemberStatus
    pub fn status_to_dto(status: DomainMemberStatus) -> MemberStatus {
        match status {
            DomainMemberStatus::Pending => MemberStatus::Pending,
            DomainMemberStatus::Verified => MemberStatus::Verified,
        }
    }

    /// Convert a domain member to its DTO
    pub fn to_dto(member: DomainMember) -> Member {
        Member {
            id: member.id,
            name: member.name,
            status: Self::status_to_dto(member.status),
            contribution: member.contribution,
            created_at: member.created_at.to_rfc3339(),
            updated_at: member.updated_at.to_rfc3339(),
        }
    }

    pub fn to_member_response(member: DomainMember) -> MemberResponse {
        let name = member.name.clone();
        MemberResponse {
            member: Self::to_dto(member),
            success_message: format!("Welcome to the equb, {}!", name),
        }
    }

    pub fn to_list_response(members: Vec<DomainMember>) -> MemberListResponse {
        MemberListResponse {
            members: members.into_iter().map(Self::to_dto).collect(),
        }
    }

    pub fn to_overview_response(overview: MemberOverviewResult) -> MemberOverviewResponse {
        MemberOverviewResponse {
            member: Self::to_dto(overview.member),
            cycle: overview.cycle,
            lucky_number: overview.lucky_number,
        }
    }
}
