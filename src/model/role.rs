use derive_more::Display;

#[derive(Debug, Display, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Admin = 1,
    HrOfficer = 2,
    PayrollOfficer = 3,
    Employee = 4,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::HrOfficer),
            3 => Some(Role::PayrollOfficer),
            4 => Some(Role::Employee),
            _ => None,
        }
    }
}
