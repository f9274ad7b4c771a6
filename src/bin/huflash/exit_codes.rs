pub const EXIT_OK: i32 = 0;
pub const EXIT_INVALID_ROM: i32 = 10;
pub const EXIT_PORT_FAILED: i32 = 11;
pub const EXIT_PROTOCOL_FAILED: i32 = 12;
pub const EXIT_CANCELLED: i32 = 13;
pub const EXIT_UNEXPECTED: i32 = 20;
