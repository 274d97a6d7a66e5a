use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("Invalid holiday date: month {month}, day {day}")]
    InvalidHolidayDate { month: u32, day: u32 },
    #[error("Holiday name must not be empty")]
    EmptyHolidayName,
}

pub type Result<T> = std::result::Result<T, CalendarError>;
