use core::fmt::{self, Display, Formatter};

/// SMTP reply codes produced at the acceptance boundary
#[repr(u32)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Debug)]
pub enum Status {
    Ok = 250,
    ActionUnavailable = 451,
    /// Mailbox unavailable (not found, no access)
    Error = 550,
    MailboxNameNotAllowed = 553,
    Unknown(u32),
}

impl Status {
    /// Checks if the status is a permanent rejection
    #[must_use]
    pub fn is_permanent(self) -> bool {
        u32::from(self) >= 500
    }

    /// Checks if the status is a temporary rejection
    #[must_use]
    pub fn is_temporary(self) -> bool {
        (400..500).contains(&u32::from(self))
    }
}

impl From<u32> for Status {
    fn from(value: u32) -> Self {
        match value {
            250 => Self::Ok,
            451 => Self::ActionUnavailable,
            550 => Self::Error,
            553 => Self::MailboxNameNotAllowed,
            _ => Self::Unknown(value),
        }
    }
}

impl From<Status> for u32 {
    fn from(value: Status) -> Self {
        match value {
            Status::Ok => 250,
            Status::ActionUnavailable => 451,
            Status::Error => 550,
            Status::MailboxNameNotAllowed => 553,
            Status::Unknown(v) => v,
        }
    }
}

impl Display for Status {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(fmt, "{}", u32::from(*self))
    }
}
