use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use crate::auth::JwtService;
use crate::models::duty::Duty;
use crate::models::hardware::{Hardware, HardwareStatus};
use crate::models::personnel::Personnel;
use crate::models::shift::Shift;
use crate::state::AppState;

pub const DUTY_LOCATION: &str = "28.6129166,77.2246388";

pub fn state() -> AppState {
    AppState::new(JwtService::new("engine-tests", 5))
}

pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, hour, minute, 0).unwrap()
}

pub fn duty(state: &AppState) -> Uuid {
    let duty = Duty {
        id: Uuid::new_v4(),
        title: "Republic Day parade".to_string(),
        description: "Crowd control".to_string(),
        venue: "Kartavya Path".to_string(),
        location: DUTY_LOCATION.to_string(),
        start_time: at(6, 0),
        end_time: at(23, 0),
        note: "Carry radios".to_string(),
        police_station: None,
        shifts: vec![],
    };
    let id = duty.id;
    state.duties.insert(id, duty);
    id
}

pub fn shift(state: &AppState, duty: Uuid, start: DateTime<Utc>, end: DateTime<Utc>) -> Uuid {
    let shift = Shift {
        id: Uuid::new_v4(),
        shift_name: format!("{}-{}", start.format("%H:%M"), end.format("%H:%M")),
        duty,
        start_time: start,
        end_time: end,
        distance_radius: 250.0,
        hardwares_attached: vec![],
        personnel_assigned: vec![],
        issue_reported: vec![],
        version: 0,
    };
    let id = shift.id;
    state.shifts.insert(id, shift);
    if let Some(mut duty) = state.duties.get_mut(&duty) {
        duty.shifts.push(id);
    }
    id
}

pub fn personnel(state: &AppState, sid: &str) -> Uuid {
    let personnel = Personnel {
        id: Uuid::new_v4(),
        sid: sid.to_string(),
        user: None,
        official_name: format!("Officer {sid}"),
        designation: "Constable".to_string(),
        photograph: "photo.jpg".to_string(),
        dob: NaiveDate::from_ymd_opt(1990, 5, 17).unwrap(),
        blood_group: "O+".to_string(),
        identification_mark: "none".to_string(),
        posted_at: "Central".to_string(),
        address: "Delhi".to_string(),
    };
    let id = personnel.id;
    state.personnel.insert(id, personnel);
    id
}

pub fn hardware(state: &AppState, external_id: &str, secret: &str) -> Uuid {
    let hardware = Hardware {
        id: Uuid::new_v4(),
        hardware_id: external_id.to_string(),
        secret: secret.to_string(),
        name: format!("Reader {external_id}"),
        description: "Gate RFID reader".to_string(),
        kind: "rfid".to_string(),
        status: HardwareStatus::Idle,
        attached_to_shift: None,
    };
    let id = hardware.id;
    state.hardware.insert(id, hardware);
    id
}
