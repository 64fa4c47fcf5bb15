use shared::{AdvanceCycleResponse, DrawScheduleResponse, EthiopianDateDto};

use crate::domain::commands::cycle::{AdvanceCycleResult, DrawScheduleResult};
use crate::domain::ethiopian_calendar::EthiopianDate;

pub struct DrawMapper;

impl DrawMapper {
    pub fn ethiopian_to_dto(date: EthiopianDate) -> EthiopianDateDto {
        EthiopianDateDto {
            year: date.year,
            month: date.month,
            day: date.day,
            display_en: date.format_en(),
            display_am: date.format_am(),
        }
    }

    pub fn to_schedule_response(result: DrawScheduleResult) -> DrawScheduleResponse {
        DrawScheduleResponse {
            cycle: result.settings.cycle,
            draw_date: result.settings.draw_date.to_string(),
            draw_date_ethiopian: Self::ethiopian_to_dto(result.settings.draw_date_ethiopian),
            days_remaining: result.days_remaining,
        }
    }

    pub fn to_advance_response(result: AdvanceCycleResult) -> AdvanceCycleResponse {
        AdvanceCycleResponse {
            cycle: result.settings.cycle,
            draw_date: result.settings.draw_date.to_string(),
            draw_date_ethiopian: Self::ethiopian_to_dto(result.settings.draw_date_ethiopian),
            members_reset: result.members_reset,
            success_message: format!(
                "Cycle {} opened; draw scheduled for {}",
                result.settings.cycle, result.settings.draw_date_display_en
            ),
        }
    }
}
