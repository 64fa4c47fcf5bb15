use shared::{
    NumberBoardResponse, ReserveNumberResponse, TakenNumber, Ticket, TicketOrigin, TicketStatus,
};

use crate::domain::commands::tickets::NumberBoardResult;
use crate::domain::models::ticket::{
    AssignedBy as DomainAssignedBy, Ticket as DomainTicket, TicketState as DomainTicketState,
};

pub struct TicketMapper;

impl TicketMapper {
    /// Convert domain TicketState to shared TicketStatus
    pub fn state_to_dto(state: DomainTicketState) -> TicketStatus {
        match state {
            DomainTicketState::Pending => TicketStatus::Pending,
            DomainTicketState::Active => TicketStatus::Active,
            DomainTicketState::Void => TicketStatus::Void,
        }
    }

    /// Convert domain AssignedBy to shared TicketOrigin
    pub fn origin_to_dto(assigned_by: DomainAssignedBy) -> TicketOrigin {
        match assigned_by {
            DomainAssignedBy::User => TicketOrigin::User,
            DomainAssignedBy::System => TicketOrigin::System,
            DomainAssignedBy::Admin => TicketOrigin::Admin,
        }
    }

    /// Convert a domain ticket to its DTO
    pub fn to_dto(ticket: DomainTicket) -> Ticket {
        Ticket {
            id: ticket.id,
            ticket_number: ticket.number,
            cycle: ticket.cycle,
            user_id: ticket.owner_id,
            user_name: ticket.owner_name,
            status: Self::state_to_dto(ticket.state),
            assigned_by: Self::origin_to_dto(ticket.assigned_by),
            assigned_date: ticket.assigned_date.map(|d| d.to_string()),
        }
    }

    pub fn to_board_response(board: NumberBoardResult) -> NumberBoardResponse {
        NumberBoardResponse {
            cycle: board.cycle,
            capacity: board.capacity,
            active_count: board.active_count,
            taken: board
                .taken
                .into_iter()
                .map(|t| TakenNumber {
                    number: t.number,
                    status: Self::state_to_dto(t.state),
                    user_id: t.owner_id,
                    user_name: t.owner_name,
                })
                .collect(),
        }
    }

    pub fn to_reserve_response(ticket: DomainTicket) -> ReserveNumberResponse {
        let number = ticket.number;
        ReserveNumberResponse {
            ticket: Self::to_dto(ticket),
            success_message: format!("Lucky number {} is held for you pending payment review", number),
        }
    }
}
