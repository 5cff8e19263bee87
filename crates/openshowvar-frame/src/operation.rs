/// Request operation, encoded as the first payload byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Read,
    Write,
}

impl Operation {
    /// Wire flag for a read request.
    pub const READ_FLAG: u8 = 0;
    /// Wire flag for a write request.
    pub const WRITE_FLAG: u8 = 1;

    /// Supplying a value makes the request a write.
    pub fn for_value(value: Option<&[u8]>) -> Self {
        match value {
            Some(v) if !v.is_empty() => Operation::Write,
            _ => Operation::Read,
        }
    }

    pub fn flag(self) -> u8 {
        match self {
            Operation::Read => Self::READ_FLAG,
            Operation::Write => Self::WRITE_FLAG,
        }
    }

    pub fn from_flag(flag: u8) -> Option<Self> {
        match flag {
            Self::READ_FLAG => Some(Operation::Read),
            Self::WRITE_FLAG => Some(Operation::Write),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Read => "read",
            Operation::Write => "write",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
